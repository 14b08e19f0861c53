// src/export.rs

//! Writes the rows a view currently shows back out as CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{Result, ViewerError};
use crate::virtual_table::VirtualTable;

/// Writes one header row (the schema accessors) and every visible row.
/// The row cap does not apply here. Missing cells become empty fields.
/// Returns the number of data rows written.
pub fn export_visible<W: Write>(view: &VirtualTable, writer: W) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);
    let columns: Vec<_> = view.schema().columns().collect();

    out.write_record(columns.iter().map(|c| c.accessor.as_str()))?;
    for &row in view.visible_rows() {
        out.write_record(columns.iter().map(|c| view.cell(row, c).unwrap_or("")))?;
    }
    out.flush()?;
    Ok(view.visible_rows().len())
}

pub fn export_to_path(view: &VirtualTable, path: &Path) -> Result<usize> {
    let file = File::create(path).map_err(|source| ViewerError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let written = export_visible(view, file)?;
    info!(path = %path.display(), rows = written, "exported visible rows");
    Ok(written)
}
