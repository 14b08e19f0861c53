// src/filter.rs

//! Column filter predicates, filter state and the global search.
//!
//! Every column carries one [`FilterKind`]. A row is visible when it passes
//! every active column filter and, if a search is set, the global search.
//! Filters whose value no longer makes sense for their kind are dropped
//! by [`FilterState::prune`] before each evaluation.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::columns::ColumnSchema;
use crate::data_loader::TableData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FilterKind {
    /// Case-insensitive starts-with. Missing cells always pass.
    Prefix,
    /// Exact match against one of the values seen in the column.
    Select,
    /// Numeric `cell >= value`. Cleared when the value is not a number.
    GreaterThan,
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Numeric value of a present cell. An empty or blank cell counts as 0.
fn cell_number(cell: &str) -> Option<f64> {
    if cell.trim().is_empty() {
        Some(0.0)
    } else {
        parse_number(cell)
    }
}

impl FilterKind {
    /// True when `value` is not usable for this kind and the filter should
    /// be removed instead of applied.
    pub fn auto_remove(self, value: &str) -> bool {
        match self {
            FilterKind::Prefix | FilterKind::Select => value.is_empty(),
            FilterKind::GreaterThan => parse_number(value).is_none(),
        }
    }

    pub fn matches(self, cell: Option<&str>, value: &str) -> bool {
        match self {
            FilterKind::Prefix => match cell {
                Some(cell) => cell.to_lowercase().starts_with(&value.to_lowercase()),
                None => true,
            },
            FilterKind::Select => cell == Some(value),
            FilterKind::GreaterThan => {
                match (cell.and_then(cell_number), parse_number(value)) {
                    (Some(cell), Some(threshold)) => cell >= threshold,
                    _ => false,
                }
            }
        }
    }

    /// The next kind in declaration order, wrapping around.
    pub fn next(self) -> FilterKind {
        let kinds: Vec<FilterKind> = FilterKind::iter().collect();
        let index = kinds.iter().position(|&k| k == self).unwrap_or(0);
        kinds[(index + 1) % kinds.len()]
    }

    /// Whether the filter is edited by typing (as opposed to picking an option).
    pub fn is_free_text(self) -> bool {
        !matches!(self, FilterKind::Select)
    }
}

/// Active filter values keyed by column accessor. A column without an entry
/// is unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    filters: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter for `column`. An empty value removes it.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.clear(column);
        } else {
            debug!(column, value = value.as_str(), "filter set");
            self.filters.insert(column.to_string(), value);
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.filters.get(column).map(String::as_str)
    }

    pub fn clear(&mut self, column: &str) {
        if self.filters.remove(column).is_some() {
            debug!(column, "filter cleared");
        }
    }

    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Drops every filter whose value is invalid for its column's kind.
    /// Filters on columns outside `schema` are left alone.
    pub fn prune(&mut self, schema: &ColumnSchema) {
        self.filters.retain(|column, value| match schema.find(column) {
            Some(def) if def.filter.auto_remove(value) => {
                debug!(column = column.as_str(), value = value.as_str(), kind = %def.filter, "filter auto-removed");
                false
            }
            _ => true,
        });
    }

    /// Does `row` pass every active filter, ignoring the one on `skip`?
    pub fn passes(
        &self,
        schema: &ColumnSchema,
        table: &TableData,
        row: usize,
        skip: Option<&str>,
    ) -> bool {
        self.filters
            .iter()
            .filter(|(column, _)| Some(column.as_str()) != skip)
            .all(|(column, value)| match schema.find(column) {
                Some(def) => def.filter.matches(table.value(row, column), value),
                None => true,
            })
    }
}

/// Case-insensitive substring match across every schema column. Missing
/// cells never match; an empty query matches everything.
pub fn search_matches(schema: &ColumnSchema, table: &TableData, row: usize, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    schema.columns().any(|def| {
        table
            .value(row, &def.accessor)
            .map_or(false, |cell| cell.to_lowercase().contains(&query))
    })
}

/// Holds back a value until no newer one arrived for the quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Releases the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.duration_since(*at) >= self.quiet => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
