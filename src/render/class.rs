//! Class command and the class-section commands run beneath it.

use super::function::{FunctionCommand, ParamTableCommand};
use super::{Command, HeadingLevel, RenderContext};
use crate::error::Result;
use crate::model::ClassDeclaration;

/// Heading, signature, summary, then the configured class sections.
#[derive(Debug)]
pub struct ClassCommand<'a> {
    level: HeadingLevel,
    class: &'a ClassDeclaration,
}

impl<'a> ClassCommand<'a> {
    pub fn new(level: i64, class: &'a ClassDeclaration) -> Result<Self> {
        Ok(Self::at(HeadingLevel::new(level)?, class))
    }

    pub(crate) fn at(level: HeadingLevel, class: &'a ClassDeclaration) -> Self {
        Self { level, class }
    }
}

impl Command for ClassCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        ctx.writer.new_header(self.level.get(), &self.class.name);
        ctx.writer
            .insert_code(&self.class.signature, &ctx.settings.src_language);

        if let Some(docstring) = &self.class.docstring {
            if !docstring.summary.is_empty() {
                ctx.writer.new_paragraph(&docstring.summary);
            }
        }

        let plan = ctx.plan;
        for section in &plan.class {
            section.run(ctx, self.class, self.level.deeper());
        }
    }
}

/// Rewrite `def __init__(self, x):` of class `Name` into `Name(x)`.
///
/// Signatures that don't look like a method definition are returned as is.
pub fn constructor_signature(class_name: &str, signature: &str) -> String {
    let Some(open) = signature.find('(') else {
        return signature.to_string();
    };
    let Some(close) = find_closing(signature, open) else {
        return signature.to_string();
    };

    let mut params: Vec<&str> = split_top_level(&signature[open + 1..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let is_self = params
        .first()
        .map(|p| p.split([':', '=']).next().unwrap_or("").trim() == "self")
        .unwrap_or(false);
    if is_self {
        params.remove(0);
    }

    format!("{}({})", class_name, params.join(", "))
}

// -- Signature text ---------------------------------------------------------

/// Walk `text` outside string literals, tracking bracket depth.
///
/// `visit(index, char, depth)` is called for every code character; returning
/// `true` stops the walk and yields that index.
fn walk_code(text: &str, mut visit: impl FnMut(usize, char, usize) -> bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<(u8, bool)> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some((q, triple)) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q && (!triple || (bytes.get(i + 1) == Some(&q) && bytes.get(i + 2) == Some(&q))) {
                quote = None;
                i += if triple { 3 } else { 1 };
                continue;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => {
                let triple = bytes.get(i + 1) == Some(&b) && bytes.get(i + 2) == Some(&b);
                quote = Some((b, triple));
                i += if triple { 3 } else { 1 };
                continue;
            }
            _ => {}
        }
        let c = b as char;
        if b.is_ascii() && visit(i, c, depth) {
            return Some(i);
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the bracket closing the one at `open`.
fn find_closing(text: &str, open: usize) -> Option<usize> {
    let mut base = None;
    walk_code(text, |i, c, depth| {
        if i == open {
            base = Some(depth);
            return false;
        }
        matches!(base, Some(d) if depth == d + 1 && matches!(c, ')' | ']' | '}'))
    })
}

/// Split `text` on `sep` at bracket depth zero.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut cuts = Vec::new();
    walk_code(text, |i, c, depth| {
        if depth == 0 && c == sep {
            cuts.push(i);
        }
        false
    });

    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(&text[start..cut]);
        start = cut + sep.len_utf8();
    }
    parts.push(&text[start..]);
    parts
}

// -- Class sections -----------------------------------------------------------

macro_rules! class_section {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<'a> {
            level: HeadingLevel,
            class: &'a ClassDeclaration,
        }

        impl<'a> $name<'a> {
            pub fn new(level: i64, class: &'a ClassDeclaration) -> Result<Self> {
                Ok(Self::at(HeadingLevel::new(level)?, class))
            }

            pub(crate) fn at(level: HeadingLevel, class: &'a ClassDeclaration) -> Self {
                Self { level, class }
            }
        }
    };
}

class_section!(
    /// Nested classes, one level below an "Inner Classes" heading.
    InnerClassCommand
);
class_section!(
    /// The constructor, shown as a call of the class.
    ConstructorCommand
);
class_section!(
    /// "Class Variables" table.
    ClassVarCommand
);
class_section!(
    /// "Member Variables" table, from the class docstring.
    InstanceVarCommand
);
class_section!(
    /// Methods, one level below a "Methods" heading.
    MethodsCommand
);

impl Command for InnerClassCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if self.class.subclasses.is_empty() || !ctx.settings.inner_classes {
            return;
        }
        ctx.writer.new_header(self.level.get(), "Inner Classes");
        for subclass in &self.class.subclasses {
            ClassCommand::at(self.level.deeper(), subclass).execute(ctx);
        }
    }
}

impl Command for ConstructorCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if !ctx.settings.constructors {
            return;
        }
        let Some(constructor) = &self.class.constructor else {
            return;
        };
        let signature = constructor_signature(&self.class.name, &constructor.signature);
        FunctionCommand::at(self.level, constructor)
            .with_display("Constructor", signature)
            .execute(ctx);
    }
}

impl Command for ClassVarCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if self.class.class_variables.is_empty() || !ctx.settings.class_vars {
            return;
        }
        ctx.writer.new_header(self.level.get(), "Class Variables");
        ParamTableCommand::at(self.level, &self.class.class_variables).execute(ctx);
    }
}

impl Command for InstanceVarCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if self.class.member_variables.is_empty() || !ctx.settings.instance_vars {
            return;
        }
        ctx.writer.new_header(self.level.get(), "Member Variables");
        ParamTableCommand::at(self.level, &self.class.member_variables).execute(ctx);
    }
}

impl Command for MethodsCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if self.class.methods.is_empty() || !ctx.settings.methods {
            return;
        }
        ctx.writer.new_header(self.level.get(), "Methods");
        for method in &self.class.methods {
            FunctionCommand::at(self.level.deeper(), method).execute(ctx);
        }
    }
}
