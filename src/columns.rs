// src/columns.rs

//! Column schema: which fields are shown, under which group header, and
//! which filter each one gets.

use crate::filter::FilterKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Label drawn in the column header row.
    pub header: String,
    /// Header name looked up in the parsed table. Also the filter key.
    pub accessor: String,
    pub filter: FilterKind,
}

impl ColumnDef {
    pub fn new(header: &str, accessor: &str, filter: FilterKind) -> Self {
        ColumnDef {
            header: header.to_string(),
            accessor: accessor.to_string(),
            filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub header: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub groups: Vec<ColumnGroup>,
}

impl ColumnSchema {
    /// The built-in number/info layout.
    pub fn standard() -> Self {
        ColumnSchema {
            groups: vec![
                ColumnGroup {
                    header: "Number".to_string(),
                    columns: vec![ColumnDef::new("msisdn", "msisdn", FilterKind::Prefix)],
                },
                ColumnGroup {
                    header: "Info".to_string(),
                    columns: vec![
                        ColumnDef::new("grade", "grade", FilterKind::Select),
                        ColumnDef::new("Type", "type", FilterKind::Select),
                        ColumnDef::new("Reserved At", "reserved_at", FilterKind::Prefix),
                    ],
                },
            ],
        }
    }

    /// One ungrouped prefix-filtered column per header of the loaded file.
    pub fn from_headers(headers: &[String]) -> Self {
        ColumnSchema {
            groups: vec![ColumnGroup {
                header: String::new(),
                columns: headers
                    .iter()
                    .map(|h| ColumnDef::new(h, h, FilterKind::Prefix))
                    .collect(),
            }],
        }
    }

    /// Leaf columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.groups.iter().flat_map(|g| g.columns.iter())
    }

    pub fn column_count(&self) -> usize {
        self.columns().count()
    }

    pub fn find(&self, accessor: &str) -> Option<&ColumnDef> {
        self.columns().find(|c| c.accessor == accessor)
    }

    /// Changes the filter kind of `accessor`. Returns false if no such column.
    pub fn set_filter_kind(&mut self, accessor: &str, kind: FilterKind) -> bool {
        match self
            .groups
            .iter_mut()
            .flat_map(|g| g.columns.iter_mut())
            .find(|c| c.accessor == accessor)
        {
            Some(def) => {
                def.filter = kind;
                true
            }
            None => false,
        }
    }

    pub fn column_at(&self, index: usize) -> Option<&ColumnDef> {
        self.columns().nth(index)
    }
}
