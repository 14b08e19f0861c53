// src/lib.rs

//! csvview: a terminal viewer for delimited text files.
//!
//! - [`data_loader`] splits file text into headers and records
//! - [`filter`] holds the per-column predicates and the global search
//! - [`virtual_table`] derives the visible rows from data and filter state
//! - [`loader`] reads files on the tokio runtime
//! - [`tui_app`] draws the table and handles keys

pub mod cli;
pub mod columns;
pub mod config;
pub mod constants;
pub mod data_loader;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod tui_app;
pub mod virtual_table;

pub use error::{Result, ViewerError};
