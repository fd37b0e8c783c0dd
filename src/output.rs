use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::GenError;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File name without its final extension; a name without one is kept whole.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

pub fn folder_name(input: &Path, at: &NaiveDateTime) -> String {
    format!("{}_{}", base_name(input), at.format(TIMESTAMP_FORMAT))
}

/// Creates `<root>/<base>_<yyyyMMdd_HHmmss>` stamped with the local time.
pub fn create_output_folder(root: &Path, input: &Path) -> Result<PathBuf, GenError> {
    let now = Local::now().naive_local();
    let dir = root.join(folder_name(input, &now));
    fs::create_dir_all(&dir).map_err(|source| GenError::OutputFolder {
        path: dir.clone(),
        source,
    })?;
    tracing::debug!(path = %dir.display(), "output folder ready");
    Ok(dir)
}
