//! Batch text generation from a spreadsheet and a placeholder template.
//!
//! The header row of the first sheet names the placeholders; every following
//! row becomes one file, named by its first column, inside a timestamped
//! output folder.

pub mod cli;
pub mod error;
pub mod header;
pub mod logging;
pub mod output;
pub mod session;
pub mod template;
pub mod workbook;

pub use error::{GenError, RowError};
pub use header::HeaderMapping;
pub use session::{Options, RowOutcome, Session, Summary, TemplateSource};
pub use template::{Renderer, Template};
pub use workbook::{Cell, Sheet};
