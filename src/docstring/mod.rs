//! Docstring parsing: dispatch by style, fail soft.
//!
//! [`parse`] is strict and reports malformed text as a [`ParseError`].
//! [`parse_docstring`] is what the source adapters call: it logs the error
//! and falls back to an empty [`Docstring`] so one bad comment never aborts a
//! documentation run.

mod epydoc;
mod google;
mod numpy;
mod rest;

use crate::error::ConfigError;
use crate::model::{Docstring, NameDescriptionType};
use std::fmt;
use std::str::FromStr;

/// Supported docstring conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocstringStyle {
    /// Try every style and keep the richest result
    Auto,
    #[default]
    Google,
    Numpy,
    Epydoc,
    /// reStructuredText fields, also known as Sphinx style
    Rest,
}

impl DocstringStyle {
    /// Concrete styles in the order [`DocstringStyle::Auto`] tries them.
    const CONCRETE: [DocstringStyle; 4] = [
        DocstringStyle::Rest,
        DocstringStyle::Google,
        DocstringStyle::Numpy,
        DocstringStyle::Epydoc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocstringStyle::Auto => "auto",
            DocstringStyle::Google => "google",
            DocstringStyle::Numpy => "numpy",
            DocstringStyle::Epydoc => "epydoc",
            DocstringStyle::Rest => "rest",
        }
    }
}

impl FromStr for DocstringStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DocstringStyle::Auto),
            "google" => Ok(DocstringStyle::Google),
            "numpy" | "numpydoc" => Ok(DocstringStyle::Numpy),
            "epydoc" => Ok(DocstringStyle::Epydoc),
            "rest" | "sphinx" => Ok(DocstringStyle::Rest),
            _ => Err(ConfigError::UnsupportedStyle(s.to_string())),
        }
    }
}

impl fmt::Display for DocstringStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed docstring text for the requested style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// One `name`/`type`/`description` record as written in the docstring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    pub name: Option<String>,
    pub type_name: Option<String>,
    pub description: Option<String>,
}

impl Field {
    fn into_row(self) -> NameDescriptionType {
        NameDescriptionType::new(
            self.name.as_deref(),
            self.type_name.as_deref(),
            self.description.as_deref(),
        )
    }
}

/// Raw fields extracted from a docstring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedDocstring {
    pub description: String,
    pub params: Vec<Field>,
    pub returns: Option<Field>,
    pub raises: Vec<Field>,
}

impl ParsedDocstring {
    /// Number of structured fields, used to rank styles in auto mode.
    fn meta_count(&self) -> usize {
        self.params.len() + self.raises.len() + usize::from(self.returns.is_some())
    }

    pub fn into_docstring(self) -> Docstring {
        Docstring {
            summary: self.description,
            args: self.params.into_iter().map(Field::into_row).collect(),
            returns: self.returns.map(Field::into_row),
            raises: self.raises.into_iter().map(Field::into_row).collect(),
        }
    }
}

/// Parse docstring `text` written in `style`.
pub fn parse(text: &str, style: DocstringStyle) -> Result<ParsedDocstring, ParseError> {
    let text = clean_docstring(text);
    match style {
        DocstringStyle::Google => google::parse(&text),
        DocstringStyle::Numpy => numpy::parse(&text),
        DocstringStyle::Epydoc => epydoc::parse(&text),
        DocstringStyle::Rest => rest::parse(&text),
        DocstringStyle::Auto => parse_auto(&text),
    }
}

/// Run every style; keep the successful result with the most fields.
fn parse_auto(text: &str) -> Result<ParsedDocstring, ParseError> {
    let mut best: Option<ParsedDocstring> = None;
    let mut first_error: Option<ParseError> = None;

    for style in DocstringStyle::CONCRETE {
        match parse(text, style) {
            Ok(parsed) => {
                let better = best
                    .as_ref()
                    .map_or(true, |b| parsed.meta_count() > b.meta_count());
                if better {
                    best = Some(parsed);
                }
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match (best, first_error) {
        (Some(parsed), _) => Ok(parsed),
        (None, Some(e)) => Err(e),
        (None, None) => Ok(ParsedDocstring::default()),
    }
}

/// Result of adapting raw docstring text into the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocstringOutcome {
    Parsed(Docstring),
    /// The text could not be parsed; holds the empty docstring.
    Fallback(Docstring),
}

impl DocstringOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, DocstringOutcome::Fallback(_))
    }

    pub fn into_docstring(self) -> Docstring {
        match self {
            DocstringOutcome::Parsed(d) | DocstringOutcome::Fallback(d) => d,
        }
    }
}

/// Convert raw docstring text into a [`Docstring`], never failing.
///
/// `location` identifies the docstring in the warning logged on failure.
pub fn parse_docstring(raw: &str, style: DocstringStyle, location: &str) -> DocstringOutcome {
    match parse(raw, style) {
        Ok(parsed) => DocstringOutcome::Parsed(parsed.into_docstring()),
        Err(e) => {
            tracing::warn!(%location, %style, error = %e, "failed to parse docstring");
            DocstringOutcome::Fallback(Docstring::default())
        }
    }
}

// -- Shared text helpers ------------------------------------------------------

/// Normalize docstring indentation the way Python's `inspect.cleandoc` does.
///
/// The first line is left-stripped, the common indentation of the remaining
/// lines is removed, and leading/trailing blank lines are dropped.
pub fn clean_docstring(text: &str) -> String {
    let expanded = expand_tabs(text);
    let lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min();

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim_end_matches('\r');
        if i == 0 {
            cleaned.push(line.trim_start().to_string());
        } else if let Some(margin) = margin {
            cleaned.push(drop_indent(line, margin).to_string());
        } else {
            cleaned.push(line.to_string());
        }
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let start = cleaned
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(cleaned.len());
    cleaned[start..].join("\n")
}

/// Replace tabs with spaces up to the next multiple of 8 columns.
pub(crate) fn expand_tabs(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = 8 - column % 8;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Count of leading whitespace characters.
pub(crate) fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Remove up to `width` leading whitespace characters.
pub(crate) fn drop_indent(line: &str, width: usize) -> &str {
    let mut cut = 0;
    for (taken, (idx, c)) in line.char_indices().enumerate() {
        if taken == width || !c.is_whitespace() {
            return &line[idx..];
        }
        cut = idx + c.len_utf8();
    }
    &line[cut..]
}

/// Remove the common indentation of `lines`, ignoring blank lines.
pub(crate) fn dedent(lines: &[&str]) -> Vec<String> {
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| drop_indent(l, margin).trim_end().to_string())
        .collect()
}

/// Join lines and trim; `None` when nothing is left.
pub(crate) fn join_text(lines: &[String]) -> Option<String> {
    let text = lines.join("\n").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Strip a trailing `optional` marker from a type, e.g. `bool, optional`.
pub(crate) fn clean_type(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without = trimmed
        .strip_suffix("optional")
        .map(|t| t.trim_end().trim_end_matches(',').trim_end())
        .unwrap_or(trimmed);
    if without.is_empty() {
        None
    } else {
        Some(without.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_names() {
        assert_eq!("google".parse::<DocstringStyle>().unwrap(), DocstringStyle::Google);
        assert_eq!("Sphinx".parse::<DocstringStyle>().unwrap(), DocstringStyle::Rest);
        assert_eq!("rest".parse::<DocstringStyle>().unwrap(), DocstringStyle::Rest);
        assert_eq!("numpy".parse::<DocstringStyle>().unwrap(), DocstringStyle::Numpy);
        assert!("javadoc".parse::<DocstringStyle>().is_err());
    }

    #[test]
    fn cleandoc_removes_common_indent() {
        let raw = "Summary line\n\n        Args:\n            x (int): value\n    ";
        assert_eq!(clean_docstring(raw), "Summary line\n\nArgs:\n    x (int): value");
    }

    #[test]
    fn cleandoc_strips_blank_edges() {
        assert_eq!(clean_docstring("\n\n   Text\n   more\n\n"), "Text\nmore");
        assert_eq!(clean_docstring("   "), "");
    }

    #[test]
    fn cleandoc_is_idempotent() {
        let once = clean_docstring("First\n    second\n      third");
        assert_eq!(clean_docstring(&once), once);
    }

    #[test]
    fn tabs_expand_to_eight_columns() {
        assert_eq!(expand_tabs("\tx"), "        x");
        assert_eq!(expand_tabs("ab\tx"), "ab      x");
    }

    #[test]
    fn optional_marker_is_dropped() {
        assert_eq!(clean_type("bool, optional").as_deref(), Some("bool"));
        assert_eq!(clean_type("int").as_deref(), Some("int"));
        assert_eq!(clean_type("optional"), None);
    }

    #[test]
    fn fail_soft_returns_empty_docstring() {
        let outcome = parse_docstring(
            "Summary\n\nArgs:\n    missing the separator\n",
            DocstringStyle::Google,
            "mod.py:3",
        );
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_docstring(), Docstring::default());
    }

    #[test]
    fn auto_picks_richest_style() {
        let text = "Do things.\n\n:param x: the x\n:param y: the y\n:returns: nothing\n";
        let parsed = parse(text, DocstringStyle::Auto).unwrap();
        assert_eq!(parsed.params.len(), 2);
        assert!(parsed.returns.is_some());

        let text = "Do things.\n\nArgs:\n    x (int): the x\n";
        let parsed = parse(text, DocstringStyle::Auto).unwrap();
        assert_eq!(parsed.params[0].type_name.as_deref(), Some("int"));
    }

    #[test]
    fn plain_summary_parses_in_every_style() {
        for style in DocstringStyle::CONCRETE {
            let parsed = parse("Just a summary.", style).unwrap();
            assert_eq!(parsed.description, "Just a summary.");
            assert_eq!(parsed.meta_count(), 0);
        }
    }
}
