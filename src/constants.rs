// src/constants.rs

//! Default values shared by the command line, the widget model and the UI.

/// Cell separator used when none is given.
pub const DEFAULT_DELIMITER: char = ',';

/// Separator for the `tsv` format.
pub const TSV_DELIMITER: char = '\t';

/// Maximum number of rows drawn. Rows beyond this are silently not shown.
pub const DEFAULT_ROW_CAP: usize = 1000;

/// Quiet period before a global search edit takes effect.
pub const SEARCH_DEBOUNCE_MS: u64 = 200;

/// Width given to every table column.
pub const COLUMN_WIDTH: u16 = 22;

/// Event poll interval of the UI loop.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Log target used when building the default `EnvFilter`.
pub const LOG_TARGET: &str = "csvview";
