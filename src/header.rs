use std::collections::HashMap;

use crate::workbook::{Cell, Sheet};

/// Placeholder text -> column index, read from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: HashMap<String, u32>,
}

impl HeaderMapping {
    /// Reads row 0. Only non-empty text cells become placeholders; a header
    /// repeated in a later column takes that later column.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut columns = HashMap::new();
        if let Some(last) = sheet.last_column() {
            for col in 0..=last {
                if let Cell::Text(name) = sheet.cell(0, col) {
                    if !name.is_empty() {
                        columns.insert(name.to_string(), col);
                    }
                }
            }
        }
        tracing::debug!(placeholders = columns.len(), "header row parsed");
        Self { columns }
    }

    pub fn column(&self, placeholder: &str) -> Option<u32> {
        self.columns.get(placeholder).copied()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for HeaderMapping {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
