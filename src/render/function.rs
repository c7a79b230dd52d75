//! Function and docstring commands.

use super::{Command, HeadingLevel, RenderContext};
use crate::error::Result;
use crate::model::{AccessType, Docstring, FunctionDeclaration, NameDescriptionType};
use crate::writer::Table;
use std::borrow::Cow;

/// Heading, signature, summary, then the configured docstring sections.
#[derive(Debug)]
pub struct FunctionCommand<'a> {
    level: HeadingLevel,
    function: &'a FunctionDeclaration,
    title: Cow<'a, str>,
    signature: Cow<'a, str>,
}

impl<'a> FunctionCommand<'a> {
    pub fn new(level: i64, function: &'a FunctionDeclaration) -> Result<Self> {
        Ok(Self::at(HeadingLevel::new(level)?, function))
    }

    pub(crate) fn at(level: HeadingLevel, function: &'a FunctionDeclaration) -> Self {
        Self {
            level,
            function,
            title: Cow::Borrowed(&function.name),
            signature: Cow::Borrowed(&function.signature),
        }
    }

    /// Render under a different heading and signature without touching the
    /// declaration.
    pub fn with_display(mut self, title: impl Into<Cow<'a, str>>, signature: String) -> Self {
        self.title = title.into();
        self.signature = Cow::Owned(signature);
        self
    }
}

impl Command for FunctionCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if ctx.settings.public_only && self.function.access != AccessType::Public {
            return;
        }

        ctx.writer.new_header(self.level.get(), &self.title);
        ctx.writer
            .insert_code(&self.signature, &ctx.settings.src_language);

        if let Some(docstring) = &self.function.docstring {
            ctx.writer.new_paragraph(&docstring.summary);
            let plan = ctx.plan;
            for section in &plan.function {
                section.run(ctx, docstring, self.level.deeper());
            }
        }
    }
}

/// Table over name/type/description rows; the Name column only appears when
/// some row has a name.
#[derive(Debug)]
pub struct ParamTableCommand<'a> {
    level: HeadingLevel,
    rows: &'a [NameDescriptionType],
}

impl<'a> ParamTableCommand<'a> {
    pub fn new(level: i64, rows: &'a [NameDescriptionType]) -> Result<Self> {
        Ok(Self::at(HeadingLevel::new(level)?, rows))
    }

    pub(crate) fn at(level: HeadingLevel, rows: &'a [NameDescriptionType]) -> Self {
        Self { level, rows }
    }

    fn table(&self, ctx: &RenderContext<'_>) -> Table {
        let named = self.rows.iter().any(|r| !r.name().is_empty());

        let mut header = Vec::with_capacity(3);
        if named {
            header.push("Name".to_string());
        }
        header.push("Type".to_string());
        header.push("Description".to_string());

        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = Vec::with_capacity(3);
                if named {
                    cells.push(r.name().to_string());
                }
                cells.push(r.type_name().to_string());
                cells.push(r.description().to_string());
                cells
            })
            .collect();

        Table {
            header,
            rows,
            align: ctx.settings.table_align,
        }
    }
}

impl Command for ParamTableCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        let table = self.table(ctx);
        ctx.writer.new_table(table);
    }
}

// -- Docstring sections -------------------------------------------------------

/// "Args" heading and parameter table.
#[derive(Debug)]
pub struct ArgsCommand<'a> {
    level: HeadingLevel,
    docstring: &'a Docstring,
}

impl<'a> ArgsCommand<'a> {
    pub fn new(level: i64, docstring: &'a Docstring) -> Result<Self> {
        Ok(Self::at(HeadingLevel::new(level)?, docstring))
    }

    pub(crate) fn at(level: HeadingLevel, docstring: &'a Docstring) -> Self {
        Self { level, docstring }
    }
}

impl Command for ArgsCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if self.docstring.args.is_empty() {
            return;
        }
        ctx.writer.new_header(self.level.get(), "Args");
        ParamTableCommand::at(self.level, &self.docstring.args).execute(ctx);
    }
}

/// "Raises" heading and exception table.
#[derive(Debug)]
pub struct RaisesCommand<'a> {
    level: HeadingLevel,
    docstring: &'a Docstring,
}

impl<'a> RaisesCommand<'a> {
    pub fn new(level: i64, docstring: &'a Docstring) -> Result<Self> {
        Ok(Self::at(HeadingLevel::new(level)?, docstring))
    }

    pub(crate) fn at(level: HeadingLevel, docstring: &'a Docstring) -> Self {
        Self { level, docstring }
    }
}

impl Command for RaisesCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        if self.docstring.raises.is_empty() {
            return;
        }
        ctx.writer.new_header(self.level.get(), "Raises");
        ParamTableCommand::at(self.level, &self.docstring.raises).execute(ctx);
    }
}

/// "Return" heading and a two-column type/description table.
#[derive(Debug)]
pub struct ReturnsCommand<'a> {
    level: HeadingLevel,
    docstring: &'a Docstring,
}

impl<'a> ReturnsCommand<'a> {
    pub fn new(level: i64, docstring: &'a Docstring) -> Result<Self> {
        Ok(Self::at(HeadingLevel::new(level)?, docstring))
    }

    pub(crate) fn at(level: HeadingLevel, docstring: &'a Docstring) -> Self {
        Self { level, docstring }
    }
}

impl Command for ReturnsCommand<'_> {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn execute(&self, ctx: &mut RenderContext<'_>) {
        let Some(returns) = &self.docstring.returns else {
            return;
        };
        ctx.writer.new_header(self.level.get(), "Return");
        ctx.writer.new_table(Table {
            header: vec!["Type".to_string(), "Description".to_string()],
            rows: vec![vec![
                returns.type_name().to_string(),
                returns.description().to_string(),
            ]],
            align: ctx.settings.table_align,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::{documented, function, row};
    use crate::render::{DocstringSection, RenderPlan, RenderSettings};
    use crate::writer::recording::{Event, RecordingWriter};
    use crate::writer::TableAlign;
    use pretty_assertions::assert_eq;

    fn run(command: &dyn Command, settings: &RenderSettings, plan: &RenderPlan) -> RecordingWriter {
        let mut writer = RecordingWriter::default();
        let mut ctx = RenderContext {
            writer: &mut writer,
            settings,
            plan,
        };
        command.execute(&mut ctx);
        writer
    }

    #[test]
    fn every_command_validates_its_level() {
        let f = function("f", None);
        let doc = documented();
        for level in [0, -1] {
            assert!(FunctionCommand::new(level, &f).is_err());
            assert!(ArgsCommand::new(level, &doc).is_err());
            assert!(RaisesCommand::new(level, &doc).is_err());
            assert!(ReturnsCommand::new(level, &doc).is_err());
            assert!(ParamTableCommand::new(level, &doc.args).is_err());
        }
        for (level, stored) in [(1, 1), (6, 6), (7, 6)] {
            assert_eq!(FunctionCommand::new(level, &f).unwrap().level().get(), stored);
            assert_eq!(ArgsCommand::new(level, &doc).unwrap().level().get(), stored);
            assert_eq!(RaisesCommand::new(level, &doc).unwrap().level().get(), stored);
            assert_eq!(ReturnsCommand::new(level, &doc).unwrap().level().get(), stored);
            assert_eq!(ParamTableCommand::new(level, &doc.args).unwrap().level().get(), stored);
        }
    }

    #[test]
    fn param_table_has_name_column_when_any_row_is_named() {
        let rows = vec![row(None, "int", "a"), row(Some("b"), "str", "b")];
        let cmd = ParamTableCommand::new(1, &rows).unwrap();
        let writer = run(&cmd, &RenderSettings::default(), &RenderPlan::default());
        let table = writer.tables()[0];
        assert_eq!(table.header, vec!["Name", "Type", "Description"]);
        assert_eq!(table.rows[0], vec!["", "int", "a"]);
        assert_eq!(table.rows[1], vec!["b", "str", "b"]);
    }

    #[test]
    fn param_table_drops_name_column_when_unnamed() {
        let rows = vec![row(None, "ValueError", "bad"), row(Some(""), "KeyError", "missing")];
        let writer = run(
            &ParamTableCommand::new(1, &rows).unwrap(),
            &RenderSettings::default(),
            &RenderPlan::default(),
        );
        assert_eq!(writer.tables()[0].header, vec!["Type", "Description"]);
        assert_eq!(writer.tables()[0].rows.len(), 2);

        let writer = run(
            &ParamTableCommand::new(1, &[]).unwrap(),
            &RenderSettings::default(),
            &RenderPlan::default(),
        );
        assert_eq!(writer.tables()[0].header, vec!["Type", "Description"]);
        assert!(writer.tables()[0].rows.is_empty());
    }

    #[test]
    fn table_uses_configured_alignment() {
        let settings = RenderSettings {
            table_align: TableAlign::Right,
            ..Default::default()
        };
        let doc = documented();
        let writer = run(&ReturnsCommand::new(2, &doc).unwrap(), &settings, &RenderPlan::default());
        assert_eq!(writer.tables()[0].align, TableAlign::Right);
    }

    #[test]
    fn returns_is_a_two_by_two_table() {
        let doc = documented();
        let writer = run(
            &ReturnsCommand::new(3, &doc).unwrap(),
            &RenderSettings::default(),
            &RenderPlan::default(),
        );
        assert_eq!(writer.headers(), vec![(3, "Return")]);
        assert_eq!(
            writer.tables()[0].cells(),
            vec!["Type", "Description", "bool", "whether it worked"]
        );
    }

    #[test]
    fn empty_sections_emit_nothing() {
        let doc = Docstring::default();
        let settings = RenderSettings::default();
        let plan = RenderPlan::default();
        assert!(run(&ArgsCommand::new(1, &doc).unwrap(), &settings, &plan).events.is_empty());
        assert!(run(&RaisesCommand::new(1, &doc).unwrap(), &settings, &plan).events.is_empty());
        assert!(run(&ReturnsCommand::new(1, &doc).unwrap(), &settings, &plan).events.is_empty());
    }

    #[test]
    fn function_runs_docstring_sections_in_plan_order() {
        let f = function("grow", Some(documented()));
        let plan = RenderPlan {
            function: vec![DocstringSection::Raises, DocstringSection::Args],
            ..Default::default()
        };
        let writer = run(&FunctionCommand::new(2, &f).unwrap(), &RenderSettings::default(), &plan);
        assert_eq!(writer.headers(), vec![(2, "grow"), (3, "Raises"), (3, "Args")]);
        assert_eq!(
            writer.events[1],
            Event::Code("def grow(self):".to_string(), "python".to_string())
        );
        assert_eq!(writer.events[2], Event::Paragraph("Does a thing".to_string()));
    }

    #[test]
    fn undocumented_function_has_heading_and_code_only() {
        let f = function("bare", None);
        let writer = run(
            &FunctionCommand::new(1, &f).unwrap(),
            &RenderSettings::default(),
            &RenderPlan::all(),
        );
        assert_eq!(writer.events.len(), 2);
    }

    #[test]
    fn public_only_hides_protected_functions() {
        let settings = RenderSettings {
            public_only: true,
            ..Default::default()
        };
        let hidden = function("_helper", Some(documented()));
        let shown = function("helper", None);
        let plan = RenderPlan::all();
        assert!(run(&FunctionCommand::new(1, &hidden).unwrap(), &settings, &plan).events.is_empty());
        assert_eq!(
            run(&FunctionCommand::new(1, &shown).unwrap(), &settings, &plan).headers(),
            vec![(1, "helper")]
        );
    }
}
