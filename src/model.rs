//! Data model for parsed source code, independent of language and output format.
//!
//! Everything here is produced once by a source adapter, read by the renderer,
//! and dropped after the document is written.

use std::path::PathBuf;

/// Access modifier of a function, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessType {
    #[default]
    Public,
    Protected,
    /// Not produced by the Python adapter.
    Private,
}

impl AccessType {
    /// Classify a name by the single-leading-underscore convention.
    ///
    /// `_helper` is protected; `__init__`, `__private` and `helper` are public.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with('_') && !name.starts_with("__") {
            AccessType::Protected
        } else {
            AccessType::Public
        }
    }
}

/// One documentation row: a parameter, return value, exception or variable.
///
/// Line breaks are collapsed on construction so every field fits in a table
/// cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameDescriptionType {
    pub name: Option<String>,
    pub type_name: Option<String>,
    pub description: Option<String>,
}

impl NameDescriptionType {
    pub fn new(
        name: Option<&str>,
        type_name: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        Self {
            name: name.map(collapse_lines),
            type_name: type_name.map(collapse_lines),
            description: description.map(collapse_lines),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Join the lines of `text` with single spaces.
fn collapse_lines(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parsed docstring. The default value is the fallback for unparseable text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Docstring {
    pub summary: String,
    pub args: Vec<NameDescriptionType>,
    pub returns: Option<NameDescriptionType>,
    pub raises: Vec<NameDescriptionType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub name: String,
    /// Signature as written in the source, e.g. `def area(self) -> float:`
    pub signature: String,
    pub access: AccessType,
    pub docstring: Option<Docstring>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassDeclaration {
    pub name: String,
    pub signature: String,
    pub docstring: Option<Docstring>,
    /// The special-init method, pulled out of `methods`.
    pub constructor: Option<FunctionDeclaration>,
    /// Literal class-level bindings.
    pub class_variables: Vec<NameDescriptionType>,
    /// Attributes documented in the class docstring.
    pub member_variables: Vec<NameDescriptionType>,
    pub methods: Vec<FunctionDeclaration>,
    /// Nested classes.
    pub subclasses: Vec<ClassDeclaration>,
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocFile {
    pub name: String,
    pub path: PathBuf,
    pub docstring: Option<Docstring>,
    pub classes: Vec<ClassDeclaration>,
    pub functions: Vec<FunctionDeclaration>,
}

/// A parsed source directory, mirroring the filesystem tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocDir {
    pub name: String,
    pub path: PathBuf,
    pub files: Vec<DocFile>,
    pub subdirs: Vec<DocDir>,
}

impl DocDir {
    /// Number of files in this directory and all subdirectories.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.subdirs.iter().map(DocDir::file_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_single_underscore_is_protected() {
        assert_eq!(AccessType::from_name("_helper"), AccessType::Protected);
    }

    #[test]
    fn access_dunder_and_plain_are_public() {
        assert_eq!(AccessType::from_name("__init__"), AccessType::Public);
        assert_eq!(AccessType::from_name("__mangled"), AccessType::Public);
        assert_eq!(AccessType::from_name("helper"), AccessType::Public);
        assert_eq!(AccessType::from_name(""), AccessType::Public);
    }

    #[test]
    fn line_breaks_collapse_to_spaces() {
        let row = NameDescriptionType::new(
            Some("likes_spam"),
            Some("bool"),
            Some("A boolean indicating if we like\n    SPAM or not."),
        );
        assert_eq!(row.description(), "A boolean indicating if we like SPAM or not.");
    }

    #[test]
    fn text_without_line_breaks_is_unchanged() {
        let row = NameDescriptionType::new(Some("  eggs "), None, Some("count  of eggs"));
        assert_eq!(row.name(), "  eggs ");
        assert_eq!(row.description(), "count  of eggs");
        assert_eq!(row.type_name(), "");
    }

    #[test]
    fn crlf_breaks_collapse_too() {
        let row = NameDescriptionType::new(None, Some("Dict[str,\r\n int]"), None);
        assert_eq!(row.type_name(), "Dict[str, int]");
    }

    #[test]
    fn file_count_is_recursive() {
        let file = DocFile {
            name: "a".into(),
            path: PathBuf::from("a.py"),
            docstring: None,
            classes: vec![],
            functions: vec![],
        };
        let dir = DocDir {
            name: "root".into(),
            path: PathBuf::from("root"),
            files: vec![file.clone()],
            subdirs: vec![DocDir {
                name: "sub".into(),
                path: PathBuf::from("root/sub"),
                files: vec![file.clone(), file],
                subdirs: vec![],
            }],
        };
        assert_eq!(dir.file_count(), 3);
    }
}
