use std::fs;
use std::io;
use std::path::Path;

use regex::{Captures, Regex};

use crate::error::GenError;
use crate::header::HeaderMapping;

/// Template text with every line terminated by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, GenError> {
        Self::read(path).map_err(|source| GenError::ReadTemplate {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Template::load`], but hands back the bare io error for per-row use.
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::from_text(&String::from_utf8_lossy(&bytes)))
    }

    pub fn from_text(raw: &str) -> Self {
        Self {
            text: normalize_lines(raw),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `\r\n`, `\r` and `\n` all end a line; each line comes back followed by `\n`.
/// A final line without terminator gains one, empty input stays empty.
pub fn normalize_lines(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len() + 1);
    for line in unified.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Replaces placeholders in a single pass.
///
/// At each position the longest matching placeholder wins, and substituted
/// values are never scanned again, so the result does not depend on the order
/// of the header mapping.
#[derive(Debug, Clone)]
pub struct Renderer {
    mapping: HeaderMapping,
    pattern: Option<Regex>,
}

impl Renderer {
    pub fn new(mapping: HeaderMapping) -> Result<Self, GenError> {
        let mut placeholders: Vec<&str> = mapping.placeholders().collect();
        placeholders.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if placeholders.is_empty() {
            None
        } else {
            let alternation = placeholders
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation).map_err(GenError::Placeholders)?)
        };

        Ok(Self { mapping, pattern })
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn render<F>(&self, text: &str, mut value_of: F) -> String
    where
        F: FnMut(u32) -> String,
    {
        let Some(re) = &self.pattern else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &Captures| {
            self.mapping
                .column(&caps[0])
                .map(&mut value_of)
                .unwrap_or_default()
        })
        .into_owned()
    }
}
