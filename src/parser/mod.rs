//! Parser module: dispatch by source language and docstring style.

pub mod python;

use crate::docstring::DocstringStyle;
use crate::error::{ConfigError, Result};
use crate::model::{DocDir, DocFile};
use python::PythonAdapter;
use std::path::Path;

/// Turns source files into the canonical model.
pub trait SourceParser {
    /// Language name, also used to tag code blocks.
    fn language(&self) -> &'static str;
    fn parse_file(&self, path: &Path) -> Result<DocFile>;
    /// Walk `root` depth-first; empty directories are kept.
    fn parse_dir(&self, root: &Path) -> Result<DocDir>;
}

/// Supported (language, styles) pairs. Languages with no styles are reserved.
pub const PARSERS: &[(&str, &[&str])] = &[
    ("python", &["auto", "google", "numpy", "epydoc", "rest", "sphinx"]),
    ("java", &[]),
    ("cpp", &[]),
];

/// Resolve the parser for `language` and docstring `style`.
pub fn select(language: &str, style: &str) -> std::result::Result<Box<dyn SourceParser>, ConfigError> {
    let unsupported = || ConfigError::UnsupportedParser {
        language: language.to_string(),
        style: style.to_string(),
    };

    let language_key = language.to_ascii_lowercase();
    let style_key = style.to_ascii_lowercase();
    let listed = PARSERS
        .iter()
        .any(|(lang, styles)| *lang == language_key && styles.contains(&style_key.as_str()));
    if !listed {
        return Err(unsupported());
    }

    match language_key.as_str() {
        "python" => {
            let style: DocstringStyle = style_key.parse().map_err(|_| unsupported())?;
            Ok(Box::new(PythonAdapter::new(style)))
        }
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_styles_resolve() {
        for style in ["auto", "google", "numpy", "epydoc", "rest", "sphinx", "Google"] {
            let parser = select("python", style).unwrap();
            assert_eq!(parser.language(), "python");
        }
    }

    #[test]
    fn unknown_language_names_both_inputs() {
        let err = select("cobol", "google").err().unwrap();
        assert_eq!(err.to_string(), "no matching parser for language=cobol, style=google");
    }

    #[test]
    fn reserved_language_is_unsupported() {
        assert!(matches!(
            select("java", "google"),
            Err(ConfigError::UnsupportedParser { .. })
        ));
    }

    #[test]
    fn unknown_style_is_unsupported() {
        assert!(matches!(
            select("python", "doxygen"),
            Err(ConfigError::UnsupportedParser { .. })
        ));
    }
}
