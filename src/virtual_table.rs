// src/virtual_table.rs

use tracing::{debug, info};

use crate::columns::{ColumnDef, ColumnSchema};
use crate::data_loader::TableData;
use crate::error::{Result, ViewerError};
use crate::filter::{search_matches, FilterKind, FilterState};

/// The table widget model: loaded records, the columns shown, the filter
/// state and the rows currently visible. Every mutation re-derives the
/// visible rows, so readers never see a stale view.
pub struct VirtualTable {
    data: TableData,
    schema: ColumnSchema,
    follow_headers: bool,
    kind_overrides: Vec<(String, FilterKind)>,
    filters: FilterState,
    search: String,
    row_cap: usize,
    visible: Vec<usize>,
}

impl VirtualTable {
    pub fn new(data: TableData, schema: ColumnSchema, row_cap: usize) -> Self {
        let mut table = VirtualTable {
            data,
            schema,
            follow_headers: false,
            kind_overrides: Vec::new(),
            filters: FilterState::new(),
            search: String::new(),
            row_cap,
            visible: Vec::new(),
        };
        table.refresh();
        table
    }

    /// A table whose columns are the loaded file's own headers, rebuilt on
    /// every data replacement.
    pub fn from_headers(data: TableData, row_cap: usize) -> Self {
        let schema = ColumnSchema::from_headers(&data.headers);
        let mut table = Self::new(data, schema, row_cap);
        table.follow_headers = true;
        table
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn row_cap(&self) -> usize {
        self.row_cap
    }

    /// Swaps in a freshly loaded table. Active filters and the search stay
    /// applied to the new records.
    pub fn replace_data(&mut self, data: TableData) {
        info!(
            records = data.len(),
            previous = self.data.len(),
            filters = self.filters.len(),
            "table data replaced"
        );
        if self.follow_headers {
            self.schema = ColumnSchema::from_headers(&data.headers);
            for (column, kind) in &self.kind_overrides {
                self.schema.set_filter_kind(column, *kind);
            }
        }
        self.data = data;
        self.refresh();
    }

    /// Switches the filter used for `column`. The choice is kept when a
    /// header-following schema is rebuilt for new data.
    pub fn set_filter_kind(&mut self, column: &str, kind: FilterKind) -> Result<()> {
        if !self.schema.set_filter_kind(column, kind) {
            return Err(ViewerError::UnknownColumn {
                column: column.to_string(),
            });
        }
        self.kind_overrides.retain(|(c, _)| c != column);
        self.kind_overrides.push((column.to_string(), kind));
        self.refresh();
        Ok(())
    }

    /// Sets (or with an empty value, removes) the filter on `column`.
    pub fn set_filter(&mut self, column: &str, value: &str) -> Result<()> {
        if self.schema.find(column).is_none() {
            return Err(ViewerError::UnknownColumn {
                column: column.to_string(),
            });
        }
        self.filters.set(column, value);
        self.refresh();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
        self.refresh();
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.filters.prune(&self.schema);
        self.visible = (0..self.data.len())
            .filter(|&row| {
                self.filters.passes(&self.schema, &self.data, row, None)
                    && search_matches(&self.schema, &self.data, row, &self.search)
            })
            .collect();
        debug!(visible = self.visible.len(), total = self.data.len(), "view refreshed");
    }

    /// Indices of every record passing the filters and the search.
    pub fn visible_rows(&self) -> &[usize] {
        &self.visible
    }

    /// The visible rows that are actually drawn.
    pub fn rendered_rows(&self) -> &[usize] {
        &self.visible[..self.visible.len().min(self.row_cap)]
    }

    pub fn is_truncated(&self) -> bool {
        self.visible.len() > self.row_cap
    }

    /// Rows passing every active filter except the one on `column`.
    pub fn pre_filtered_rows(&self, column: &str) -> Vec<usize> {
        (0..self.data.len())
            .filter(|&row| self.filters.passes(&self.schema, &self.data, row, Some(column)))
            .collect()
    }

    /// Distinct values of `column`, in first-seen order, over the rows that
    /// the other filters let through. Missing cells are not an option.
    pub fn select_options(&self, column: &str) -> Vec<String> {
        let mut options: Vec<String> = Vec::new();
        for row in self.pre_filtered_rows(column) {
            if let Some(value) = self.data.value(row, column) {
                if !options.iter().any(|o| o == value) {
                    options.push(value.to_string());
                }
            }
        }
        options
    }

    pub fn cell(&self, row: usize, column: &ColumnDef) -> Option<&str> {
        self.data.value(row, &column.accessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::parse_csv;

    fn sample() -> TableData {
        parse_csv(
            "msisdn,grade,type,reserved_at\n\
             0811,gold,prepaid,2021-01-01\n\
             0812,silver,postpaid,2021-02-01\n\
             0813,gold,postpaid,2021-03-01\n\
             0814,bronze,prepaid,2021-03-05",
            ',',
        )
    }

    #[test]
    fn select_options_follow_other_filters() {
        let mut view = VirtualTable::new(sample(), ColumnSchema::standard(), 1000);
        assert_eq!(view.select_options("grade"), vec!["gold", "silver", "bronze"]);

        view.set_filter("type", "prepaid").unwrap();
        let mut grades = view.select_options("grade");
        grades.sort();
        assert_eq!(grades, vec!["bronze", "gold"]);
        // a column's own filter does not narrow its options
        assert_eq!(view.select_options("type"), vec!["prepaid", "postpaid"]);
    }

    #[test]
    fn filters_survive_data_replacement() {
        let mut view = VirtualTable::new(sample(), ColumnSchema::standard(), 1000);
        view.set_filter("grade", "gold").unwrap();
        assert_eq!(view.visible_rows(), &[0, 2]);

        view.replace_data(parse_csv("msisdn,grade\n1,silver\n2,gold", ','));
        assert_eq!(view.data().len(), 2);
        assert_eq!(view.filters().get("grade"), Some("gold"));
        assert_eq!(view.visible_rows(), &[1]);
    }

    #[test]
    fn rendering_is_capped() {
        let mut text = String::from("msisdn,grade");
        for i in 0..1500 {
            text.push_str(&format!("\n{},gold", i));
        }
        let view = VirtualTable::new(parse_csv(&text, ','), ColumnSchema::standard(), 1000);
        assert_eq!(view.visible_rows().len(), 1500);
        assert_eq!(view.rendered_rows().len(), 1000);
        assert!(view.is_truncated());
    }

    #[test]
    fn unknown_column_is_rejected() {
        let mut view = VirtualTable::new(sample(), ColumnSchema::standard(), 1000);
        assert!(matches!(
            view.set_filter("nope", "x"),
            Err(ViewerError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn invalid_threshold_is_dropped_on_refresh() {
        let mut view = VirtualTable::new(sample(), ColumnSchema::standard(), 1000);
        view.set_filter_kind("msisdn", FilterKind::GreaterThan).unwrap();
        view.set_filter("msisdn", "813").unwrap();
        assert_eq!(view.visible_rows(), &[2, 3]);
        view.set_filter("msisdn", "x").unwrap();
        assert_eq!(view.filters().get("msisdn"), None);
        assert_eq!(view.visible_rows().len(), 4);
    }

    #[test]
    fn search_narrows_visible_rows() {
        let mut view = VirtualTable::new(sample(), ColumnSchema::standard(), 1000);
        view.set_search("2021-03");
        assert_eq!(view.visible_rows(), &[2, 3]);
        view.set_search("");
        assert_eq!(view.visible_rows().len(), 4);
    }

    #[test]
    fn header_following_schema_rebuilds() {
        let mut view = VirtualTable::from_headers(sample(), 1000);
        assert_eq!(view.schema().column_count(), 4);
        view.replace_data(parse_csv("x,y\n1,2", ','));
        assert_eq!(view.schema().column_count(), 2);
        assert_eq!(view.schema().find("x").map(|c| c.filter), Some(FilterKind::Prefix));

        view.set_filter_kind("y", FilterKind::GreaterThan).unwrap();
        view.replace_data(parse_csv("x,y,z\n1,2,3", ','));
        assert_eq!(view.schema().find("y").map(|c| c.filter), Some(FilterKind::GreaterThan));
    }
}
