use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::RowError;
use crate::template::{Renderer, Template};
use crate::workbook::Sheet;

/// Where the template text comes from for each row.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Read once before the run.
    Cached(Template),
    /// Read again for every row; a failed read renders from empty text.
    Reload(PathBuf),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Refuse to replace files already on disk.
    pub no_clobber: bool,
}

#[derive(Debug)]
pub enum RowOutcome {
    Written {
        row: u32,
        file_name: String,
        path: PathBuf,
    },
    /// Written, but from an empty template because the re-read failed.
    Degraded {
        row: u32,
        file_name: String,
        path: PathBuf,
        error: RowError,
    },
    Skipped {
        row: u32,
        error: RowError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub written: usize,
    pub skipped: usize,
}

/// State of one generation run: the sheet, the renderer and every filename
/// produced so far.
pub struct Session<'a> {
    sheet: &'a Sheet,
    renderer: Renderer,
    template: TemplateSource,
    output_dir: PathBuf,
    options: Options,
    seen: HashSet<String>,
}

impl<'a> Session<'a> {
    pub fn new(
        sheet: &'a Sheet,
        renderer: Renderer,
        template: TemplateSource,
        output_dir: PathBuf,
        options: Options,
    ) -> Self {
        Self {
            sheet,
            renderer,
            template,
            output_dir,
            options,
            seen: HashSet::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Processes every data row in order, handing each outcome to `report`
    /// as soon as it is known.
    pub fn run(&mut self, mut report: impl FnMut(&RowOutcome)) -> Summary {
        let mut summary = Summary::default();
        let rows: Vec<u32> = self.sheet.data_rows().collect();
        for row in rows {
            let outcome = self.process_row(row);
            match outcome {
                RowOutcome::Skipped { .. } => summary.skipped += 1,
                _ => summary.written += 1,
            }
            report(&outcome);
        }
        summary
    }

    pub fn process_row(&mut self, row: u32) -> RowOutcome {
        let file_name = self.sheet.cell(row, 0).render();

        if !self.seen.insert(file_name.clone()) {
            tracing::debug!(row, file = %file_name, "duplicate filename");
            return RowOutcome::Skipped {
                row,
                error: RowError::DuplicateFileName(file_name),
            };
        }
        if let Err(error) = check_file_name(&file_name) {
            return RowOutcome::Skipped { row, error };
        }

        let (text, read_error) = match &self.template {
            TemplateSource::Cached(template) => (template.text().to_string(), None),
            TemplateSource::Reload(path) => match Template::read(path) {
                Ok(template) => (template.text().to_string(), None),
                Err(source) => (
                    String::new(),
                    Some(RowError::TemplateRead {
                        path: path.clone(),
                        source,
                    }),
                ),
            },
        };

        let sheet = self.sheet;
        let content = self
            .renderer
            .render(&text, |col| sheet.cell(row, col).render());

        let path = self.output_dir.join(&file_name);
        if let Err(error) = self.write(&path, &content) {
            return RowOutcome::Skipped { row, error };
        }

        match read_error {
            None => RowOutcome::Written {
                row,
                file_name,
                path,
            },
            Some(error) => RowOutcome::Degraded {
                row,
                file_name,
                path,
                error,
            },
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), RowError> {
        let result = if self.options.no_clobber {
            create_new_with(path, |file| file.write_all(content.as_bytes()))
        } else {
            fs::write(path, content)
        };

        result.map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => RowError::AlreadyExists(path.to_path_buf()),
            _ => RowError::Write {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

/// Creates `path`, which must not exist yet, and fills it. A failed fill
/// removes the file again so a later `--no-clobber` run can still write it.
fn create_new_with<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    fill(&mut file).inspect_err(|_| {
        drop(file);
        let _ = fs::remove_file(path);
    })
}

/// Rejects names that cannot be a plain file inside the output folder.
fn check_file_name(name: &str) -> Result<(), RowError> {
    if name.is_empty() {
        return Err(RowError::EmptyFileName);
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(RowError::UnsafeFileName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderMapping;
    use calamine::Data;
    use tempfile::TempDir;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn sheet(rows: Vec<Vec<Data>>) -> Sheet {
        Sheet::from_rows("Sheet1", rows)
    }

    fn session<'a>(sheet: &'a Sheet, dir: &TempDir, template: &str, options: Options) -> Session<'a> {
        let renderer = Renderer::new(HeaderMapping::from_sheet(sheet)).unwrap();
        Session::new(
            sheet,
            renderer,
            TemplateSource::Cached(Template::from_text(template)),
            dir.path().to_path_buf(),
            options,
        )
    }

    #[test]
    fn writes_one_file_per_row() {
        let dir = TempDir::new().unwrap();
        let sheet = sheet(vec![
            vec![text("file"), text("<id>")],
            vec![text("a.txt"), Data::Float(3.0)],
            vec![text("b.txt"), Data::Float(4.7)],
        ]);
        let mut s = session(&sheet, &dir, "id=<id>", Options::default());

        let summary = s.run(|_| {});

        assert_eq!(summary, Summary { written: 2, skipped: 0 });
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "id=3\n");
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "id=4\n");
    }

    #[test]
    fn duplicate_filename_keeps_the_first_row() {
        let dir = TempDir::new().unwrap();
        let sheet = sheet(vec![
            vec![text("file"), text("V")],
            vec![text("same.txt"), text("first")],
            vec![text("same.txt"), text("second")],
        ]);
        let mut s = session(&sheet, &dir, "V", Options::default());

        let mut outcomes = Vec::new();
        let summary = s.run(|o| outcomes.push(format!("{o:?}")));

        assert_eq!(summary, Summary { written: 1, skipped: 1 });
        assert!(outcomes[1].contains("DuplicateFileName"));
        assert_eq!(fs::read_to_string(dir.path().join("same.txt")).unwrap(), "first\n");
    }

    #[test]
    fn numeric_filename_is_truncated() {
        let dir = TempDir::new().unwrap();
        let sheet = sheet(vec![vec![text("file")], vec![Data::Float(17.9)]]);
        let mut s = session(&sheet, &dir, "x", Options::default());

        assert!(matches!(s.process_row(1), RowOutcome::Written { ref file_name, .. } if file_name == "17"));
    }

    #[test]
    fn empty_and_unsafe_filenames_are_skipped() {
        let dir = TempDir::new().unwrap();
        let sheet = sheet(vec![
            vec![text("file"), text("v")],
            vec![Data::Bool(true), text("x")],
            vec![text("../escape.txt"), text("x")],
        ]);
        let mut s = session(&sheet, &dir, "v", Options::default());

        assert!(matches!(
            s.process_row(1),
            RowOutcome::Skipped { error: RowError::EmptyFileName, .. }
        ));
        assert!(matches!(
            s.process_row(2),
            RowOutcome::Skipped { error: RowError::UnsafeFileName(_), .. }
        ));
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }

    #[test]
    fn existing_file_is_overwritten_by_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "old").unwrap();
        let sheet = sheet(vec![vec![text("file")], vec![text("a.txt")]]);
        let mut s = session(&sheet, &dir, "new", Options::default());

        assert!(matches!(s.process_row(1), RowOutcome::Written { .. }));
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "new\n");
    }

    #[test]
    fn no_clobber_leaves_existing_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "old").unwrap();
        let sheet = sheet(vec![vec![text("file")], vec![text("a.txt")]]);
        let mut s = session(&sheet, &dir, "new", Options { no_clobber: true });

        assert!(matches!(
            s.process_row(1),
            RowOutcome::Skipped { error: RowError::AlreadyExists(_), .. }
        ));
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "old");
    }

    #[test]
    fn failed_fill_removes_the_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("half.txt");

        let err = create_new_with(&path, |file| {
            file.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert!(!path.exists());
        create_new_with(&path, |file| file.write_all(b"whole")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "whole");
    }

    #[test]
    fn write_failure_does_not_stop_the_run() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("taken")).unwrap();
        let sheet = sheet(vec![
            vec![text("file")],
            vec![text("taken")],
            vec![text("ok.txt")],
        ]);
        let mut s = session(&sheet, &dir, "body", Options::default());

        let summary = s.run(|_| {});

        assert_eq!(summary, Summary { written: 1, skipped: 1 });
        assert!(dir.path().join("ok.txt").is_file());
    }

    #[test]
    fn reload_failure_writes_empty_content() {
        let dir = TempDir::new().unwrap();
        let sheet = sheet(vec![vec![text("file")], vec![text("a.txt")]]);
        let renderer = Renderer::new(HeaderMapping::from_sheet(&sheet)).unwrap();
        let mut s = Session::new(
            &sheet,
            renderer,
            TemplateSource::Reload(dir.path().join("missing.tmpl")),
            dir.path().to_path_buf(),
            Options::default(),
        );

        assert!(matches!(
            s.process_row(1),
            RowOutcome::Degraded { error: RowError::TemplateRead { .. }, .. }
        ));
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "");
    }

    #[test]
    fn reload_reads_template_for_each_row() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("t.tmpl");
        fs::write(&template, "one").unwrap();
        let sheet = sheet(vec![vec![text("file")], vec![text("a")], vec![text("b")]]);
        let renderer = Renderer::new(HeaderMapping::from_sheet(&sheet)).unwrap();
        let mut s = Session::new(
            &sheet,
            renderer,
            TemplateSource::Reload(template.clone()),
            dir.path().to_path_buf(),
            Options::default(),
        );

        s.process_row(1);
        fs::write(&template, "two").unwrap();
        s.process_row(2);

        assert_eq!(fs::read_to_string(dir.path().join("a")).unwrap(), "one\n");
        assert_eq!(fs::read_to_string(dir.path().join("b")).unwrap(), "two\n");
    }
}
