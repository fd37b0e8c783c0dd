use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_SPREADSHEET: u8 = 2;
pub const EXIT_TEMPLATE: u8 = 3;
pub const EXIT_OUTPUT: u8 = 4;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("cannot open spreadsheet {}", path.display())]
    OpenWorkbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("spreadsheet has no sheets: {}", path.display())]
    NoSheets { path: PathBuf },

    #[error("cannot read sheet {sheet}")]
    ReadSheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot read template {}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot compile placeholder pattern")]
    Placeholders(#[source] regex::Error),

    #[error("cannot create output folder {}", path.display())]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot determine working directory")]
    WorkingDir(#[source] io::Error),
}

impl GenError {
    pub fn exit_code(&self) -> u8 {
        match self {
            GenError::OpenWorkbook { .. } | GenError::NoSheets { .. } | GenError::ReadSheet { .. } => {
                EXIT_SPREADSHEET
            }
            GenError::ReadTemplate { .. } | GenError::Placeholders(_) => EXIT_TEMPLATE,
            GenError::OutputFolder { .. } | GenError::WorkingDir(_) => EXIT_OUTPUT,
        }
    }
}

/// Errors that affect a single data row; the run carries on.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("Duplicate filename detected - {0}")]
    DuplicateFileName(String),

    #[error("first column is empty, no filename")]
    EmptyFileName,

    #[error("filename {0:?} points outside the output folder")]
    UnsafeFileName(String),

    #[error("{} already exists, not overwritten", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
