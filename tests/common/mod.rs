#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Cell written into a fixture workbook.
pub enum V {
    S(&'static str),
    N(f64),
    B(bool),
    F(&'static str),
    /// Serial number shown with a date format.
    Date(f64),
    Blank,
}

fn cell_ref(col_1_based: usize, row_1_based: usize) -> String {
    let mut col = col_1_based;
    let mut name = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        name.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    let name: String = name.chars().rev().collect();
    format!("{name}{row_1_based}")
}

/// Writes `rows` into the first sheet of a new xlsx file at `path`.
pub fn write_workbook(path: &Path, rows: &[Vec<V>]) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_active_sheet_mut();

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let addr = cell_ref(c + 1, r + 1);
            let cell = sheet.get_cell_mut(addr.as_str());
            match value {
                V::S(s) => {
                    cell.set_value_string(*s);
                }
                V::N(n) => {
                    cell.set_value_number(*n);
                }
                V::B(b) => {
                    cell.set_value_bool(*b);
                }
                V::F(f) => {
                    cell.set_formula(*f);
                }
                V::Date(n) => {
                    cell.set_value_number(*n);
                    cell.get_style_mut()
                        .get_number_format_mut()
                        .set_format_code("yyyy-mm-dd");
                }
                V::Blank => {}
            }
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

pub fn write_template(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

/// Only subdirectory of `root`, i.e. the folder a run created.
pub fn single_output_dir(root: &Path) -> PathBuf {
    let dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(dirs.len(), 1, "expected one output folder, got {dirs:?}");
    dirs.into_iter().next().unwrap()
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
