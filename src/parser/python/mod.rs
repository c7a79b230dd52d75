//! Python source adapter: raw declarations to the canonical model.

pub mod syntax;

use super::SourceParser;
use crate::docstring::{parse_docstring, DocstringStyle};
use crate::error::{Error, Result};
use crate::model::{
    AccessType, ClassDeclaration, DocDir, DocFile, Docstring, FunctionDeclaration,
    NameDescriptionType,
};
use std::fs;
use std::path::Path;
use syntax::{ParamKind, RawClass, RawDocstring, RawFunction, RawMember, RawParam};
use tracing::debug;

const EXTENSION: &str = "py";

/// Name of the special-init method pulled out as a class's constructor.
pub const CONSTRUCTOR_NAME: &str = "__init__";

#[derive(Debug, Clone, Copy)]
pub struct PythonAdapter {
    style: DocstringStyle,
}

impl PythonAdapter {
    pub fn new(style: DocstringStyle) -> Self {
        Self { style }
    }

    fn docstring(&self, raw: &RawDocstring, path: &Path) -> Docstring {
        let location = format!("{}:{}", path.display(), raw.line);
        parse_docstring(&raw.content, self.style, &location).into_docstring()
    }

    fn function(&self, raw: &RawFunction, path: &Path) -> FunctionDeclaration {
        FunctionDeclaration {
            name: raw.name.clone(),
            signature: function_signature(raw),
            access: AccessType::from_name(&raw.name),
            docstring: raw.docstring.as_ref().map(|d| self.docstring(d, path)),
        }
    }

    fn class(&self, raw: &RawClass, path: &Path) -> ClassDeclaration {
        let docstring = raw.docstring.as_ref().map(|d| self.docstring(d, path));
        let mut class = ClassDeclaration {
            name: raw.name.clone(),
            signature: class_signature(raw),
            member_variables: docstring.as_ref().map(|d| d.args.clone()).unwrap_or_default(),
            docstring,
            ..Default::default()
        };

        for member in &raw.members {
            match member {
                RawMember::Function(f) if f.name == CONSTRUCTOR_NAME => {
                    class.constructor = Some(self.function(f, path));
                }
                RawMember::Function(f) => class.methods.push(self.function(f, path)),
                RawMember::Class(c) => class.subclasses.push(self.class(c, path)),
                RawMember::Variable(v) => class.class_variables.push(NameDescriptionType::new(
                    Some(&v.name),
                    v.annotation.as_deref(),
                    v.docstring.as_ref().map(|d| d.content.trim()),
                )),
            }
        }
        class
    }
}

impl SourceParser for PythonAdapter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn parse_file(&self, path: &Path) -> Result<DocFile> {
        debug!(path = %path.display(), style = self.style.as_str(), "parsing module");
        let module = syntax::parse_module(path)?;

        let mut classes = Vec::new();
        let mut functions = Vec::new();
        for member in &module.members {
            match member {
                RawMember::Class(c) => classes.push(self.class(c, path)),
                RawMember::Function(f) => functions.push(self.function(f, path)),
                RawMember::Variable(_) => {}
            }
        }

        Ok(DocFile {
            name: module.name,
            path: fs::canonicalize(path).map_err(|e| Error::io(path, e))?,
            docstring: module.docstring.as_ref().map(|d| self.docstring(d, path)),
            classes,
            functions,
        })
    }

    fn parse_dir(&self, root: &Path) -> Result<DocDir> {
        let path = fs::canonicalize(root).map_err(|e| Error::io(root, e))?;
        let mut entries = fs::read_dir(root)
            .map_err(|e| Error::io(root, e))?
            .map(|entry| entry.map(|e| e.path()).map_err(|e| Error::io(root, e)))
            .collect::<Result<Vec<_>>>()?;
        entries.sort();

        let mut dir = DocDir {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            path,
            files: Vec::new(),
            subdirs: Vec::new(),
        };

        for entry in entries {
            let meta = fs::symlink_metadata(&entry).map_err(|e| Error::io(&entry, e))?;
            if meta.is_dir() {
                dir.subdirs.push(self.parse_dir(&entry)?);
            } else if entry.is_file() && entry.extension().is_some_and(|e| e == EXTENSION) {
                dir.files.push(self.parse_file(&entry)?);
            } else if meta.file_type().is_symlink() && entry.is_dir() {
                debug!(path = %entry.display(), "skipping symlinked directory");
            }
        }

        Ok(dir)
    }
}

// -- Signatures ---------------------------------------------------------------

fn render_param(param: &RawParam) -> String {
    let mut out = match param.kind {
        ParamKind::VarPositional => format!("*{}", param.name),
        ParamKind::VarKeyword => format!("**{}", param.name),
        ParamKind::Positional | ParamKind::Separator => param.name.clone(),
    };
    if let Some(annotation) = &param.annotation {
        out.push_str(": ");
        out.push_str(annotation);
    }
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

/// `def name[T](params) -> ret:`
pub fn function_signature(raw: &RawFunction) -> String {
    let params: Vec<String> = raw.params.iter().map(render_param).collect();
    let mut signature = format!(
        "{}def {}{}({})",
        if raw.is_async { "async " } else { "" },
        raw.name,
        raw.type_params.as_deref().unwrap_or(""),
        params.join(", ")
    );
    if let Some(ret) = &raw.return_type {
        signature.push_str(" -> ");
        signature.push_str(ret);
    }
    signature.push(':');
    signature
}

/// Decorators on their own lines, then `class Name[T](bases, metaclass=M):`.
pub fn class_signature(raw: &RawClass) -> String {
    let mut signature: String = raw.decorators.iter().map(|d| format!("@{}\n", d)).collect();
    signature.push_str("class ");
    signature.push_str(&raw.name);
    if let Some(type_params) = &raw.type_params {
        signature.push_str(type_params);
    }

    let mut args = raw.bases.clone();
    if let Some(metaclass) = &raw.metaclass {
        args.push(format!("metaclass={}", metaclass));
    }
    if !args.is_empty() {
        signature.push('(');
        signature.push_str(&args.join(", "));
        signature.push(')');
    }
    signature.push(':');
    signature
}
