//! Document writers: the output side of the render pipeline.

pub mod markdown;
pub mod toc;

use crate::error::{ConfigError, Result};
use std::fmt;
use std::str::FromStr;

/// Column alignment shared by every table in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TableAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TableAlign::Left => "left",
            TableAlign::Center => "center",
            TableAlign::Right => "right",
        }
    }
}

impl FromStr for TableAlign {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(TableAlign::Left),
            "center" => Ok(TableAlign::Center),
            "right" => Ok(TableAlign::Right),
            _ => Err(ConfigError::InvalidAlignment(s.to_string())),
        }
    }
}

impl fmt::Display for TableAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table with a header row; every row has `header.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub align: TableAlign,
}

impl Table {
    pub fn columns(&self) -> usize {
        self.header.len()
    }

    /// Header and rows as one row-major cell list.
    pub fn cells(&self) -> Vec<&str> {
        self.header
            .iter()
            .chain(self.rows.iter().flatten())
            .map(String::as_str)
            .collect()
    }
}

/// Structured output consumed by the render commands.
///
/// Writers buffer everything; nothing reaches the output target before
/// [`flush`](DocumentWriter::flush).
pub trait DocumentWriter {
    /// Heading at `level` (1 = top).
    fn new_header(&mut self, level: usize, title: &str);
    fn new_paragraph(&mut self, text: &str);
    fn insert_code(&mut self, code: &str, language: &str);
    fn new_table(&mut self, table: Table);
    /// Generate a table of contents from the headings written so far, down
    /// to `depth`.
    fn new_table_of_contents(&mut self, title: &str, depth: usize);
    fn flush(&mut self) -> Result<()>;
}
