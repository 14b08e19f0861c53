// src/cli.rs

//! Command-line arguments and logging setup.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::{DEFAULT_ROW_CAP, LOG_TARGET};
use crate::data_loader::FileFormat;
use crate::error::ViewerError;

/// Terminal viewer for delimited text files with per-column filters.
#[derive(Debug, Clone, Parser)]
#[command(name = "csvview", version, about)]
pub struct Args {
    /// File to open on start. Another one can be opened from inside the viewer.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Input format (csv or tsv). Defaults to the file extension.
    #[arg(short = 'b', long = "format", value_name = "FORMAT")]
    pub format: Option<FileFormat>,

    /// Cell separator, overriding the format's own.
    #[arg(short = 'd', long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Maximum number of rows drawn.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_ROW_CAP)]
    pub row_cap: usize,

    /// Show every header of the file instead of the built-in column layout.
    #[arg(long)]
    pub all_columns: bool,

    /// Show the global search bar.
    #[arg(long)]
    pub search: bool,

    /// Initial column filter, e.g. `grade=gold`. Repeatable.
    #[arg(short = 'f', long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Filter COLUMN with a numeric at-least threshold instead of text. Repeatable.
    #[arg(long = "numeric", value_name = "COLUMN")]
    pub numeric_columns: Vec<String>,

    /// Write the filtered rows to this CSV file and exit without opening the viewer.
    #[arg(short = 'o', long = "export", value_name = "PATH", requires = "file")]
    pub export: Option<PathBuf>,

    /// Log level (`RUST_LOG` takes precedence).
    #[arg(long, value_name = "LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Log file for the interactive viewer, which owns the terminal.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Parses `COLUMN=VALUE`. The value may itself contain `=`.
pub fn parse_filter(raw: &str) -> Result<(String, String), ViewerError> {
    match raw.split_once('=') {
        Some((column, value)) if !column.is_empty() => {
            Ok((column.to_string(), value.to_string()))
        }
        Some(_) => Err(ViewerError::InvalidFilter {
            raw: raw.to_string(),
            reason: "missing column name".to_string(),
        }),
        None => Err(ViewerError::InvalidFilter {
            raw: raw.to_string(),
            reason: "expected COLUMN=VALUE".to_string(),
        }),
    }
}

/// Installs the global subscriber. Export mode logs to stderr; the viewer
/// logs only when given a log file, since stderr is the drawn terminal.
pub fn init_logging(args: &Args) -> Result<(), ViewerError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, args.log_level)));

    if args.export.is_some() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else if let Some(path) = &args.log_file {
        let file = File::create(path).map_err(|source| ViewerError::Write {
            path: path.clone(),
            source,
        })?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_argument() {
        assert_eq!(
            parse_filter("grade=gold").unwrap(),
            ("grade".to_string(), "gold".to_string())
        );
        assert_eq!(parse_filter("a=b=c").unwrap().1, "b=c");
        assert_eq!(parse_filter("type=").unwrap().1, "");
        assert!(parse_filter("=x").is_err());
        assert!(parse_filter("grade").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "csvview", "numbers.csv", "-f", "grade=gold", "-f", "type=prepaid", "--row-cap", "5",
            "-b", "tsv", "-o", "out.csv", "--numeric", "msisdn",
        ])
        .unwrap();
        assert_eq!(args.filters.len(), 2);
        assert_eq!(args.row_cap, 5);
        assert_eq!(args.format, Some(FileFormat::Tsv));
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
        assert_eq!(args.log_level, Level::INFO);
        assert_eq!(args.numeric_columns, vec!["msisdn"]);
    }

    #[test]
    fn export_requires_file() {
        assert!(Args::try_parse_from(["csvview", "-o", "out.csv"]).is_err());
    }
}
