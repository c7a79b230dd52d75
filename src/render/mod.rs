//! Render commands: the tree-walk from the model into a [`DocumentWriter`].
//!
//! Every command is built with a heading level and the entity it documents,
//! then executed against a [`RenderContext`]. Container commands run their
//! children one level deeper, in the order the [`RenderPlan`] lists them.

mod class;
mod function;

pub use class::{
    constructor_signature, ClassCommand, ClassVarCommand, ConstructorCommand, InnerClassCommand,
    InstanceVarCommand, MethodsCommand,
};
pub use function::{ArgsCommand, FunctionCommand, ParamTableCommand, RaisesCommand, ReturnsCommand};

use crate::error::{ConfigError, Error, Result};
use crate::model::{ClassDeclaration, DocFile, Docstring};
use crate::writer::{DocumentWriter, TableAlign};

/// Markdown heading depth, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MAX: u8 = 6;
    pub const TOP: HeadingLevel = HeadingLevel(1);

    /// Levels below 1 are rejected; levels above 6 are clamped to 6.
    pub fn new(level: i64) -> Result<Self> {
        if level < 1 {
            return Err(Error::InvalidLevel(level));
        }
        Ok(Self(level.min(i64::from(Self::MAX)) as u8))
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// One level down, still clamped to 6.
    pub fn deeper(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }
}

/// Read-only toggle snapshot handed down the whole walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub src_language: String,
    pub table_align: TableAlign,
    pub table_of_contents: bool,
    pub constructors: bool,
    pub class_vars: bool,
    pub instance_vars: bool,
    pub inner_classes: bool,
    pub methods: bool,
    pub file_overview: bool,
    pub public_only: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            src_language: "python".to_string(),
            table_align: TableAlign::Left,
            table_of_contents: false,
            constructors: true,
            class_vars: true,
            instance_vars: true,
            inner_classes: true,
            methods: true,
            file_overview: true,
            public_only: false,
        }
    }
}

impl RenderSettings {
    /// Flip the boolean setting called `field`.
    pub fn toggle(&mut self, field: &str) -> std::result::Result<(), ConfigError> {
        let flag = match field {
            "table_of_contents" => &mut self.table_of_contents,
            "constructors" => &mut self.constructors,
            "class_vars" => &mut self.class_vars,
            "instance_vars" => &mut self.instance_vars,
            "inner_classes" => &mut self.inner_classes,
            "methods" => &mut self.methods,
            "file_overview" => &mut self.file_overview,
            "public_only" => &mut self.public_only,
            // the last four live on the document builder
            "src_language" | "table_align" | "title" | "author" | "toc_depth" | "toc_title" => {
                return Err(ConfigError::NotBoolean(field.to_string()))
            }
            _ => return Err(ConfigError::UnknownField(field.to_string())),
        };
        *flag = !*flag;
        Ok(())
    }
}

// -- Section selectors --------------------------------------------------------

/// Sections of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSection {
    Classes,
    Functions,
}

/// Sections run under every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSection {
    Constructor,
    InnerClasses,
    ClassVariables,
    InstanceVariables,
    Methods,
}

/// Sections run under every documented function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocstringSection {
    Args,
    Raises,
    Returns,
}

impl FileSection {
    pub fn run(self, ctx: &mut RenderContext<'_>, file: &DocFile, level: HeadingLevel) {
        match self {
            FileSection::Classes => {
                if file.classes.is_empty() {
                    return;
                }
                ctx.writer.new_header(level.get(), "Classes");
                for class in &file.classes {
                    ClassCommand::at(level.deeper(), class).execute(ctx);
                }
            }
            FileSection::Functions => {
                if file.functions.is_empty() {
                    return;
                }
                ctx.writer.new_header(level.get(), "Functions");
                for function in &file.functions {
                    FunctionCommand::at(level.deeper(), function).execute(ctx);
                }
            }
        }
    }
}

impl ClassSection {
    pub fn run(self, ctx: &mut RenderContext<'_>, class: &ClassDeclaration, level: HeadingLevel) {
        match self {
            ClassSection::Constructor => ConstructorCommand::at(level, class).execute(ctx),
            ClassSection::InnerClasses => InnerClassCommand::at(level, class).execute(ctx),
            ClassSection::ClassVariables => ClassVarCommand::at(level, class).execute(ctx),
            ClassSection::InstanceVariables => InstanceVarCommand::at(level, class).execute(ctx),
            ClassSection::Methods => MethodsCommand::at(level, class).execute(ctx),
        }
    }
}

impl DocstringSection {
    pub fn run(self, ctx: &mut RenderContext<'_>, docstring: &Docstring, level: HeadingLevel) {
        match self {
            DocstringSection::Args => ArgsCommand::at(level, docstring).execute(ctx),
            DocstringSection::Raises => RaisesCommand::at(level, docstring).execute(ctx),
            DocstringSection::Returns => ReturnsCommand::at(level, docstring).execute(ctx),
        }
    }
}

/// Which sections run, in order, at each level of the walk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderPlan {
    pub file: Vec<FileSection>,
    pub class: Vec<ClassSection>,
    pub function: Vec<DocstringSection>,
}

impl RenderPlan {
    /// Every section in the default order.
    pub fn all() -> Self {
        Self {
            file: vec![FileSection::Classes, FileSection::Functions],
            class: vec![
                ClassSection::Constructor,
                ClassSection::ClassVariables,
                ClassSection::InstanceVariables,
                ClassSection::Methods,
                ClassSection::InnerClasses,
            ],
            function: vec![
                DocstringSection::Args,
                DocstringSection::Returns,
                DocstringSection::Raises,
            ],
        }
    }
}

/// Shared state of one render pass.
pub struct RenderContext<'a> {
    pub writer: &'a mut dyn DocumentWriter,
    pub settings: &'a RenderSettings,
    pub plan: &'a RenderPlan,
}

/// One unit of the render walk.
pub trait Command {
    fn level(&self) -> HeadingLevel;
    fn execute(&self, ctx: &mut RenderContext<'_>);
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::*;

    pub fn row(name: Option<&str>, type_name: &str, description: &str) -> NameDescriptionType {
        NameDescriptionType::new(name, Some(type_name), Some(description))
    }

    pub fn function(name: &str, docstring: Option<Docstring>) -> FunctionDeclaration {
        FunctionDeclaration {
            name: name.to_string(),
            signature: format!("def {}(self):", name),
            access: AccessType::from_name(name),
            docstring,
        }
    }

    pub fn documented() -> Docstring {
        Docstring {
            summary: "Does a thing".to_string(),
            args: vec![row(Some("x"), "int", "the x")],
            returns: Some(row(None, "bool", "whether it worked")),
            raises: vec![row(None, "ValueError", "on bad x")],
        }
    }

    pub fn class() -> ClassDeclaration {
        ClassDeclaration {
            name: "MyClass".to_string(),
            signature: "class MyClass(Base):".to_string(),
            docstring: Some(Docstring {
                summary: "A class".to_string(),
                ..Default::default()
            }),
            constructor: Some(FunctionDeclaration {
                name: "__init__".to_string(),
                signature: "def __init__(self, size: int = 1):".to_string(),
                access: AccessType::Public,
                docstring: None,
            }),
            class_variables: vec![row(Some("LIMIT"), "int", "upper bound")],
            member_variables: vec![row(Some("size"), "int", "the size")],
            methods: vec![function("grow", Some(documented())), function("_shrink", None)],
            subclasses: vec![ClassDeclaration {
                name: "Inner".to_string(),
                signature: "class Inner:".to_string(),
                ..Default::default()
            }],
        }
    }
}
