//! Python declaration extraction on top of the tree-sitter grammar.
//!
//! Only the direct statements of a module or class body are looked at:
//! function and class definitions (decorated or not), variable bindings, and
//! the string literals that document them. Nothing is evaluated.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

const BYTE_ORDER_MARK: char = '\u{feff}';

// -- Raw declarations ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocstring {
    /// Literal contents, escapes resolved, indentation untouched
    pub content: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModule {
    pub name: String,
    pub path: PathBuf,
    pub docstring: Option<RawDocstring>,
    pub members: Vec<RawMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMember {
    Function(RawFunction),
    Class(RawClass),
    Variable(RawVariable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
    /// Bare `*` or `/` marker
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParam {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFunction {
    pub name: String,
    pub line: usize,
    pub is_async: bool,
    /// PEP 695 list, brackets included: `[T]`
    pub type_params: Option<String>,
    pub params: Vec<RawParam>,
    pub return_type: Option<String>,
    pub decorators: Vec<String>,
    pub docstring: Option<RawDocstring>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClass {
    pub name: String,
    pub line: usize,
    pub type_params: Option<String>,
    pub bases: Vec<String>,
    pub metaclass: Option<String>,
    pub decorators: Vec<String>,
    pub docstring: Option<RawDocstring>,
    pub members: Vec<RawMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariable {
    pub name: String,
    pub line: usize,
    pub annotation: Option<String>,
    pub docstring: Option<RawDocstring>,
}

// -- Public API ---------------------------------------------------------------

/// Read and scan a Python source file.
pub fn parse_module(path: &Path) -> Result<RawModule> {
    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_source(path, &source)
}

/// Scan Python `source`; `path` names the module and locates errors.
pub fn parse_source(path: &Path, source: &str) -> Result<RawModule> {
    let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
    let tree = parse_tree(path, source)?;
    let root = tree.root_node();

    if let Some(bad) = first_error(root) {
        let message = if bad.is_missing() {
            format!("missing '{}'", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(syntax_error(path, line_of(bad), &message));
    }

    let scanner = Scanner { source };
    let body = statements(root);
    let docstring = scanner.leading_docstring(&body);
    let rest = if docstring.is_some() { &body[1..] } else { &body[..] };

    Ok(RawModule {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        docstring,
        members: scanner.members(rest),
    })
}

// -- Tree ---------------------------------------------------------------------

fn parse_tree(path: &Path, source: &str) -> Result<Tree> {
    let language: Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Grammar(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| syntax_error(path, 1, "parsing was cancelled"))
}

fn syntax_error(path: &Path, line: usize, message: &str) -> Error {
    Error::Syntax {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    }
}

/// First error or missing node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Named children of a body or list, comments left out.
fn statements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let nodes = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    nodes
}

// -- Members ------------------------------------------------------------------

struct Scanner<'s> {
    source: &'s str,
}

impl<'s> Scanner<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    /// Node text on a single line, for signatures.
    fn flat(&self, node: Node<'_>) -> String {
        let text = self.text(node);
        if text.contains('\n') {
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            text.to_string()
        }
    }

    /// The string literal a bare expression statement consists of.
    fn docstring(&self, stmt: Node<'_>) -> Option<RawDocstring> {
        if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
            return None;
        }
        let literal = stmt
            .named_child(0)
            .filter(|n| matches!(n.kind(), "string" | "concatenated_string"))?;
        string_literal(self.text(literal)).map(|content| RawDocstring {
            content,
            line: line_of(stmt),
        })
    }

    fn leading_docstring(&self, body: &[Node<'_>]) -> Option<RawDocstring> {
        body.first().and_then(|stmt| self.docstring(*stmt))
    }

    fn members(&self, body: &[Node<'_>]) -> Vec<RawMember> {
        let mut members = Vec::new();
        let mut i = 0;

        while i < body.len() {
            let stmt = body[i];
            i += 1;

            let member = match stmt.kind() {
                "function_definition" => self.function(stmt, Vec::new()).map(RawMember::Function),
                "class_definition" => self.class(stmt, Vec::new()).map(RawMember::Class),
                "decorated_definition" => self.decorated(stmt),
                "expression_statement" => self.variable(stmt).map(|mut variable| {
                    // A string right after a binding documents it
                    if let Some(doc) = body.get(i).and_then(|next| self.docstring(*next)) {
                        variable.docstring = Some(doc);
                        i += 1;
                    }
                    RawMember::Variable(variable)
                }),
                _ => None,
            };
            members.extend(member);
        }

        members
    }

    fn decorated(&self, node: Node<'_>) -> Option<RawMember> {
        let decorators = statements(node)
            .into_iter()
            .filter(|n| n.kind() == "decorator")
            .map(|n| decorator_name(self.text(n)).to_string())
            .collect();

        let definition = node.child_by_field_name("definition")?;
        match definition.kind() {
            "function_definition" => self.function(definition, decorators).map(RawMember::Function),
            "class_definition" => self.class(definition, decorators).map(RawMember::Class),
            _ => None,
        }
    }

    fn function(&self, node: Node<'_>, decorators: Vec<String>) -> Option<RawFunction> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let body = node
            .child_by_field_name("body")
            .map(statements)
            .unwrap_or_default();

        Some(RawFunction {
            name,
            line: line_of(node),
            is_async: node.child(0).is_some_and(|c| c.kind() == "async"),
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|t| self.flat(t)),
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.params(p))
                .unwrap_or_default(),
            return_type: node.child_by_field_name("return_type").map(|t| self.flat(t)),
            decorators,
            docstring: self.leading_docstring(&body),
        })
    }

    fn params(&self, node: Node<'_>) -> Vec<RawParam> {
        statements(node)
            .into_iter()
            .filter_map(|param| self.param(param))
            .collect()
    }

    fn param(&self, node: Node<'_>) -> Option<RawParam> {
        let (head, annotation, default) = match node.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => (node, None, None),
            "typed_parameter" => (node.named_child(0)?, node.child_by_field_name("type"), None),
            "default_parameter" => (
                node.child_by_field_name("name")?,
                None,
                node.child_by_field_name("value"),
            ),
            "typed_default_parameter" => (
                node.child_by_field_name("name")?,
                node.child_by_field_name("type"),
                node.child_by_field_name("value"),
            ),
            "positional_separator" | "keyword_separator" => {
                return Some(RawParam {
                    name: self.text(node).to_string(),
                    kind: ParamKind::Separator,
                    annotation: None,
                    default: None,
                })
            }
            _ => return None,
        };

        let head = self.text(head);
        let (kind, name) = if let Some(name) = head.strip_prefix("**") {
            (ParamKind::VarKeyword, name)
        } else if let Some(name) = head.strip_prefix('*') {
            (ParamKind::VarPositional, name)
        } else {
            (ParamKind::Positional, head)
        };

        Some(RawParam {
            name: name.trim().to_string(),
            kind,
            annotation: annotation.map(|t| self.flat(t)),
            default: default.map(|v| self.flat(v)),
        })
    }

    fn class(&self, node: Node<'_>, decorators: Vec<String>) -> Option<RawClass> {
        let name = self.text(node.child_by_field_name("name")?).to_string();

        let mut bases = Vec::new();
        let mut metaclass = None;
        if let Some(arguments) = node.child_by_field_name("superclasses") {
            for argument in statements(arguments) {
                if argument.kind() != "keyword_argument" {
                    bases.push(self.flat(argument));
                    continue;
                }
                let key = argument.child_by_field_name("name").map(|k| self.text(k));
                if key == Some("metaclass") {
                    metaclass = argument.child_by_field_name("value").map(|v| self.flat(v));
                }
            }
        }

        let body = node
            .child_by_field_name("body")
            .map(statements)
            .unwrap_or_default();
        let docstring = self.leading_docstring(&body);
        let rest = if docstring.is_some() { &body[1..] } else { &body[..] };

        Some(RawClass {
            name,
            line: line_of(node),
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|t| self.flat(t)),
            bases,
            metaclass,
            decorators,
            docstring,
            members: self.members(rest),
        })
    }

    /// `name = value`, `name: T = value` or `name: T`.
    fn variable(&self, stmt: Node<'_>) -> Option<RawVariable> {
        if stmt.named_child_count() != 1 {
            return None;
        }
        let assignment = stmt.named_child(0).filter(|n| n.kind() == "assignment")?;
        let target = assignment
            .child_by_field_name("left")
            .filter(|n| n.kind() == "identifier")?;

        Some(RawVariable {
            name: self.text(target).to_string(),
            line: line_of(stmt),
            annotation: assignment.child_by_field_name("type").map(|t| self.flat(t)),
            docstring: None,
        })
    }
}

/// `@cache(maxsize=2)` -> `cache`
fn decorator_name(text: &str) -> &str {
    let text = text.trim().trim_start_matches('@');
    text.split('(').next().unwrap_or(text).trim()
}

// -- String literals ----------------------------------------------------------

/// Contents of a statement made only of (possibly concatenated) plain string
/// literals; `None` for anything else, including f-strings and bytes.
fn string_literal(text: &str) -> Option<String> {
    let mut rest = text.trim();
    let mut content = String::new();
    let mut found = false;

    while !rest.is_empty() {
        let quote_at = rest.find(['\'', '"'])?;
        let prefix = &rest[..quote_at];
        if prefix.len() > 2 || !prefix.chars().all(|c| matches!(c, 'r' | 'R' | 'u' | 'U')) {
            return None;
        }
        let raw = prefix.contains(['r', 'R']);

        let body = &rest[quote_at..];
        let quote = &body[..1];
        let delim = if body.starts_with(&quote.repeat(3)) {
            quote.repeat(3)
        } else {
            quote.to_string()
        };
        let inner = &body[delim.len()..];
        let end = find_delim(inner, &delim)?;

        let literal = &inner[..end];
        if raw {
            content.push_str(literal);
        } else {
            content.push_str(&unescape(literal));
        }
        rest = inner[end + delim.len()..].trim_start();
        found = true;
    }

    found.then_some(content)
}

fn find_delim(text: &str, delim: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if text[i..].starts_with(delim) {
            return Some(i);
        }
    }
    None
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
