//! GitHub-flavored markdown writer.
//!
//! Blocks are buffered in document order and joined by blank lines. The table
//! of contents is generated from the recorded headings when the document is
//! rendered, so it can be requested after the body has been written and still
//! land above it.

use super::toc::{escape_inline, render_toc_item, Slugger};
use super::{DocumentWriter, Table, TableAlign};
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
struct Heading {
    level: usize,
    title: String,
}

#[derive(Debug)]
enum Block {
    Heading(usize),
    Text(String),
}

#[derive(Debug)]
pub struct MarkdownWriter {
    path: PathBuf,
    title: Option<String>,
    author: Option<String>,
    headings: Vec<Heading>,
    blocks: Vec<Block>,
    toc: Option<(String, usize)>,
}

impl MarkdownWriter {
    /// Writer targeting `path`; an empty `title` or `author` is omitted.
    pub fn new(path: impl Into<PathBuf>, title: &str, author: &str) -> Self {
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            path: path.into(),
            title: non_empty(title),
            author: non_empty(author),
            headings: Vec::new(),
            blocks: Vec::new(),
            toc: None,
        }
    }

    /// The full document as it will be written by `flush`.
    pub fn render(&self) -> String {
        let mut slugger = Slugger::default();
        let mut sections: Vec<String> = Vec::new();

        if let Some(title) = &self.title {
            slugger.slug(title);
            sections.push(format!("# {}", escape_inline(title)));
        }
        if let Some(author) = &self.author {
            sections.push(format!("*{}*", author));
        }

        let toc_at = sections.len();
        if let Some((title, _)) = &self.toc {
            slugger.slug(title);
        }
        let anchors: Vec<String> = self.headings.iter().map(|h| slugger.slug(&h.title)).collect();

        if let Some((title, depth)) = &self.toc {
            sections.insert(toc_at, self.render_toc(title, *depth, &anchors));
        }

        for block in &self.blocks {
            match block {
                Block::Heading(i) => {
                    let heading = &self.headings[*i];
                    sections.push(format!(
                        "{} {}",
                        "#".repeat(heading.level),
                        escape_inline(&heading.title)
                    ));
                }
                Block::Text(text) => sections.push(text.clone()),
            }
        }

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    fn render_toc(&self, title: &str, depth: usize, anchors: &[String]) -> String {
        let mut lines = vec![format!("## {}", escape_inline(title)), String::new()];
        let top = self
            .headings
            .iter()
            .map(|h| h.level)
            .min()
            .unwrap_or(1);
        for (heading, anchor) in self.headings.iter().zip(anchors) {
            if heading.level <= depth {
                lines.push(render_toc_item(heading.level - top, &heading.title, anchor));
            }
        }
        lines.join("\n")
    }
}

fn alignment_cell(align: TableAlign) -> &'static str {
    match align {
        TableAlign::Left => ":---",
        TableAlign::Center => ":---:",
        TableAlign::Right => "---:",
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn table_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    let cells: Vec<String> = cells.into_iter().map(escape_cell).collect();
    format!("| {} |", cells.join(" | "))
}

impl DocumentWriter for MarkdownWriter {
    fn new_header(&mut self, level: usize, title: &str) {
        self.headings.push(Heading {
            level: level.clamp(1, 6),
            title: title.to_string(),
        });
        self.blocks.push(Block::Heading(self.headings.len() - 1));
    }

    fn new_paragraph(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.blocks.push(Block::Text(text.to_string()));
        }
    }

    fn insert_code(&mut self, code: &str, language: &str) {
        self.blocks
            .push(Block::Text(format!("```{}\n{}\n```", language, code.trim_end())));
    }

    fn new_table(&mut self, table: Table) {
        let columns = table.columns();
        if columns == 0 {
            return;
        }
        let cells = table.cells();
        let mut rows = cells.chunks(columns);

        let mut lines = Vec::new();
        if let Some(header) = rows.next() {
            lines.push(table_row(header.iter().copied()));
        }
        lines.push(table_row(std::iter::repeat(alignment_cell(table.align)).take(columns)));
        lines.extend(rows.map(|row| table_row(row.iter().copied())));
        self.blocks.push(Block::Text(lines.join("\n")));
    }

    fn new_table_of_contents(&mut self, title: &str, depth: usize) {
        self.toc = Some((title.to_string(), depth.clamp(1, 6)));
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&self.path, self.render()).map_err(|e| Error::io(&self.path, e))?;
        tracing::info!(path = %self.path.display(), "wrote document");
        Ok(())
    }
}
