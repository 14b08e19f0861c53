// src/data_loader.rs

//! Naive delimited-text parser.
//!
//! The first line holds the headers, every following `\n`-separated line is a
//! record. Fields are split on the delimiter with no trimming and no quote
//! handling, so a delimiter inside quotes still splits the field.

use std::collections::HashMap;

use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_DELIMITER, TSV_DELIMITER};

/// One parsed line. Cells are aligned with [`TableData::headers`]; `None`
/// means the line ended before reaching that header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    cells: Vec<Option<String>>,
}

impl Record {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Record { cells }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableData {
    /// Distinct header names in order of first appearance.
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl TableData {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        TableData { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell of `row` under header `name`. Unknown headers read as missing.
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.records.get(row)?.get(col)
    }
}

/// Splits `text` into headers and records.
///
/// A header repeated in the header line keeps its first position, but the
/// cell of its last occurrence wins. A completely empty line produces a
/// record with every cell missing; extra cells beyond the header count are
/// dropped.
pub fn parse_csv(text: &str, delimiter: char) -> TableData {
    // Without a newline the header line loses its last character and the
    // whole text is also read as the single record.
    let (header_line, body) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => {
            let cut = text.char_indices().last().map_or(0, |(i, _)| i);
            (&text[..cut], text)
        }
    };

    let raw_headers: Vec<&str> = header_line.split(delimiter).collect();
    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let slots: Vec<usize> = raw_headers
        .iter()
        .map(|&h| {
            *positions.entry(h).or_insert_with(|| {
                headers.push(h.to_string());
                headers.len() - 1
            })
        })
        .collect();

    let records: Vec<Record> = body
        .split('\n')
        .map(|line| {
            let mut cells = vec![None; headers.len()];
            if !line.is_empty() {
                let values: Vec<&str> = line.split(delimiter).collect();
                for (i, &slot) in slots.iter().enumerate() {
                    cells[slot] = values.get(i).map(|v| v.to_string());
                }
            }
            Record::new(cells)
        })
        .collect();

    if raw_headers.len() != headers.len() {
        debug!(
            raw = raw_headers.len(),
            distinct = headers.len(),
            "duplicate header names collapsed"
        );
    }
    debug!(headers = headers.len(), records = records.len(), "parsed table");

    TableData::new(headers, records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Tsv,
}

impl FileFormat {
    /// Picks a format from a file extension. The extension is only a hint:
    /// anything unrecognised is read as CSV.
    pub fn from_extension(extension: &str) -> FileFormat {
        match extension.to_lowercase().as_str() {
            "csv" => FileFormat::Csv,
            "tsv" | "tab" => FileFormat::Tsv,
            other => {
                warn!(extension = other, "unrecognised file extension, reading as csv");
                FileFormat::Csv
            }
        }
    }

    pub fn delimiter(self) -> char {
        match self {
            FileFormat::Csv => DEFAULT_DELIMITER,
            FileFormat::Tsv => TSV_DELIMITER,
        }
    }
}

pub trait DataLoader: Send + Sync {
    fn parse(&self, text: &str) -> TableData;
}

pub struct DelimitedLoader {
    pub delimiter: char,
}

impl DataLoader for DelimitedLoader {
    fn parse(&self, text: &str) -> TableData {
        parse_csv(text, self.delimiter)
    }
}

/// Loader for `format`, with `delimiter` overriding the format's own separator.
pub fn get_loader(format: FileFormat, delimiter: Option<char>) -> Box<dyn DataLoader> {
    Box::new(DelimitedLoader {
        delimiter: delimiter.unwrap_or_else(|| format.delimiter()),
    })
}
