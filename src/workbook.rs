use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::error::GenError;

/// Typed view of a single cell, as far as substitution cares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Integer(i64),
    Other,
}

impl Cell<'_> {
    /// Text used for filenames and substitutions.
    ///
    /// Numbers lose their fractional part (truncated toward zero, no rounding),
    /// blanks, booleans, errors and formula cells give an empty string.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => (*s).to_string(),
            Cell::Number(n) => (n.trunc() as i64).to_string(),
            Cell::Integer(n) => n.to_string(),
            Cell::Other => String::new(),
        }
    }
}

/// First sheet of a workbook, detached from the file handle.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    values: Range<Data>,
    formulas: Option<Range<String>>,
}

impl Sheet {
    pub fn open_first(path: &Path) -> Result<Self, GenError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| GenError::OpenWorkbook {
            path: path.to_path_buf(),
            source,
        })?;

        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| GenError::NoSheets {
                path: path.to_path_buf(),
            })?;

        let values = workbook
            .worksheet_range(&name)
            .map_err(|source| GenError::ReadSheet {
                sheet: name.clone(),
                source,
            })?;

        // formula cells count as "other"; a missing formula layer means no formulas
        let formulas = match workbook.worksheet_formula(&name) {
            Ok(range) => Some(range),
            Err(err) => {
                tracing::debug!(sheet = %name, error = %err, "formula layer unavailable");
                None
            }
        };

        tracing::debug!(sheet = %name, size = ?values.get_size(), "sheet loaded");
        Ok(Self {
            name,
            values,
            formulas,
        })
    }

    /// Builds a sheet from literal rows, row 0 first.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut values = if height == 0 || width == 0 {
            Range::empty()
        } else {
            Range::new((0, 0), (height as u32 - 1, width as u32 - 1))
        };
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                values.set_value((r as u32, c as u32), value);
            }
        }
        Self::from_range(name, values)
    }

    /// Wraps a value range whose positions are absolute sheet coordinates.
    pub fn from_range(name: impl Into<String>, values: Range<Data>) -> Self {
        Self {
            name: name.into(),
            values,
            formulas: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the last used row, `None` for an empty sheet.
    pub fn last_row(&self) -> Option<u32> {
        self.values.end().map(|(row, _)| row)
    }

    pub fn last_column(&self) -> Option<u32> {
        self.values.end().map(|(_, col)| col)
    }

    /// Cell at an absolute (0-based) sheet position.
    pub fn cell(&self, row: u32, col: u32) -> Cell<'_> {
        if self.has_formula(row, col) {
            return Cell::Other;
        }
        match self.values.get_value((row, col)) {
            Some(Data::String(s)) => Cell::Text(s),
            Some(Data::Float(n)) => Cell::Number(*n),
            Some(Data::Int(n)) => Cell::Integer(*n),
            Some(Data::DateTime(dt)) => Cell::Number(dt.as_f64()),
            _ => Cell::Other,
        }
    }

    /// Rows after the header that hold at least one value, in sheet order.
    pub fn data_rows(&self) -> impl Iterator<Item = u32> + '_ {
        let last = self.last_row().unwrap_or(0);
        (1..=last).filter(move |&row| !self.is_blank_row(row))
    }

    fn is_blank_row(&self, row: u32) -> bool {
        let (Some((_, first_col)), Some((_, last_col))) = (self.values.start(), self.values.end())
        else {
            return true;
        };
        (first_col..=last_col).all(|col| {
            matches!(self.values.get_value((row, col)), None | Some(Data::Empty))
                && !self.has_formula(row, col)
        })
    }

    fn has_formula(&self, row: u32, col: u32) -> bool {
        self.formulas
            .as_ref()
            .and_then(|f| f.get_value((row, col)))
            .is_some_and(|f| !f.is_empty())
    }
}
