// src/config.rs

//! Settings resolved from the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::cli::Args;
use crate::constants::SEARCH_DEBOUNCE_MS;
use crate::data_loader::FileFormat;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub file: Option<PathBuf>,
    pub format: FileFormat,
    pub delimiter: char,
    pub row_cap: usize,
    pub all_columns: bool,
    pub search_enabled: bool,
    pub search_debounce: Duration,
    pub numeric_columns: Vec<String>,
    pub filters: Vec<(String, String)>,
    pub export: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn from_args(args: &Args) -> Self {
        let format = args
            .format
            .or_else(|| args.file.as_deref().and_then(format_from_path))
            .unwrap_or(FileFormat::Csv);
        let config = ViewerConfig {
            file: args.file.clone(),
            format,
            delimiter: args.delimiter.unwrap_or_else(|| format.delimiter()),
            row_cap: args.row_cap,
            all_columns: args.all_columns,
            search_enabled: args.search,
            search_debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            numeric_columns: args.numeric_columns.clone(),
            filters: args.filters.clone(),
            export: args.export.clone(),
        };
        debug!(?config, "configuration resolved");
        config
    }
}

fn format_from_path(path: &Path) -> Option<FileFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(FileFormat::from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn format_follows_extension_unless_given() {
        let args = Args::try_parse_from(["csvview", "data.tsv"]).unwrap();
        let config = ViewerConfig::from_args(&args);
        assert_eq!(config.format, FileFormat::Tsv);
        assert_eq!(config.delimiter, '\t');

        let args = Args::try_parse_from(["csvview", "data.tsv", "-b", "csv", "-d", ";"]).unwrap();
        let config = ViewerConfig::from_args(&args);
        assert_eq!(config.format, FileFormat::Csv);
        assert_eq!(config.delimiter, ';');
    }

    #[test]
    fn defaults() {
        let config = ViewerConfig::from_args(&Args::try_parse_from(["csvview"]).unwrap());
        assert_eq!(config.format, FileFormat::Csv);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.row_cap, 1000);
        assert_eq!(config.search_debounce, Duration::from_millis(200));
        assert!(!config.search_enabled);
    }
}
