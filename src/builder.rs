//! Document builder: configuration and the top-level walk.
//!
//! Everything that can be wrong with a configuration is rejected by the
//! `configure_*` / `enable_*` / `toggle` / `align_tables` calls, so a builder
//! that reaches [`DocumentBuilder::build`] only fails on I/O or syntax errors.

use crate::error::{ConfigError, Error, Result};
use crate::model::{DocDir, DocFile};
use crate::parser::{self, SourceParser};
use crate::render::{
    ClassSection, DocstringSection, FileSection, HeadingLevel, RenderContext, RenderPlan,
    RenderSettings,
};
use crate::writer::markdown::MarkdownWriter;
use crate::writer::DocumentWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_TOC_TITLE: &str = "Contents";
pub const DEFAULT_TOC_DEPTH: usize = 1;

pub struct DocumentBuilder {
    parser: Option<Box<dyn SourceParser>>,
    src: Option<PathBuf>,
    output: Option<PathBuf>,
    recursive: bool,
    title: String,
    author: String,
    toc_title: String,
    toc_depth: usize,
    settings: RenderSettings,
    plan: RenderPlan,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Builder with default settings and no sections.
    pub fn new() -> Self {
        Self {
            parser: None,
            src: None,
            output: None,
            recursive: false,
            title: String::new(),
            author: String::new(),
            toc_title: DEFAULT_TOC_TITLE.to_string(),
            toc_depth: DEFAULT_TOC_DEPTH,
            settings: RenderSettings::default(),
            plan: RenderPlan::default(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    // -- Configuration --------------------------------------------------------

    /// Document title and author; empty strings are left out.
    pub fn configure_metadata(mut self, title: &str, author: &str) -> Self {
        self.title = title.to_string();
        self.author = author.to_string();
        self
    }

    /// Select the source parser for `language` and docstring `style`.
    pub fn configure_src(mut self, language: &str, style: &str) -> Result<Self> {
        let parser = parser::select(language, style)?;
        self.settings.src_language = parser.language().to_string();
        self.parser = Some(parser);
        Ok(self)
    }

    pub fn configure_io(
        mut self,
        src: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        recursive: bool,
    ) -> Result<Self> {
        let src = src.into();
        if !src.exists() {
            return Err(ConfigError::SourceNotFound(src).into());
        }
        self.src = Some(src);
        self.output = Some(output.into());
        self.recursive = recursive;
        Ok(self)
    }

    pub fn enable_toc(mut self, depth: i64, title: &str) -> Result<Self> {
        if !(1..=6).contains(&depth) {
            return Err(ConfigError::InvalidTocDepth(depth).into());
        }
        self.settings.table_of_contents = true;
        self.toc_depth = depth as usize;
        self.toc_title = title.to_string();
        Ok(self)
    }

    /// Flip the boolean setting named `field`.
    pub fn toggle(mut self, field: &str) -> Result<Self> {
        self.settings.toggle(field)?;
        Ok(self)
    }

    pub fn align_tables(mut self, align: &str) -> Result<Self> {
        self.settings.table_align = align.parse()?;
        Ok(self)
    }

    pub fn add_file_command(mut self, section: FileSection) -> Self {
        self.plan.file.push(section);
        self
    }

    pub fn add_class_command(mut self, section: ClassSection) -> Self {
        self.plan.class.push(section);
        self
    }

    pub fn add_function_command(mut self, section: DocstringSection) -> Self {
        self.plan.function.push(section);
        self
    }

    /// Append every section of `plan`, keeping its order.
    pub fn add_commands(self, plan: &RenderPlan) -> Self {
        let builder = plan.file.iter().fold(self, |b, s| b.add_file_command(*s));
        let builder = plan.class.iter().fold(builder, |b, s| b.add_class_command(*s));
        plan.function
            .iter()
            .fold(builder, |b, s| b.add_function_command(*s))
    }

    // -- Building -------------------------------------------------------------

    /// Parse the input, render it and write the markdown document.
    pub fn build(&self) -> Result<()> {
        let output = self
            .output
            .as_deref()
            .ok_or(ConfigError::NotConfigured("input and output paths"))?;
        let mut writer = MarkdownWriter::new(output, &self.title, &self.author);
        self.render_into(&mut writer)?;
        writer.flush()
    }

    /// Parse the input and render it into `writer` without flushing.
    pub fn render_into(&self, writer: &mut dyn DocumentWriter) -> Result<()> {
        let parser = self
            .parser
            .as_deref()
            .ok_or(ConfigError::NotConfigured("source language"))?;
        let src = self
            .src
            .as_deref()
            .ok_or(ConfigError::NotConfigured("input and output paths"))?;

        info!(src = %src.display(), recursive = self.recursive, "building documentation");

        // Parse everything before the first write
        let input = if src.is_dir() {
            let dir = parser.parse_dir(src)?;
            debug!(files = dir.file_count(), "parsed directory");
            Input::Dir(dir)
        } else {
            Input::File(parser.parse_file(src)?)
        };

        let mut ctx = RenderContext {
            writer,
            settings: &self.settings,
            plan: &self.plan,
        };
        match &input {
            Input::File(file) => build_single_file(&mut ctx, file, HeadingLevel::TOP),
            Input::Dir(dir) => build_dir(&mut ctx, dir, HeadingLevel::TOP, self.recursive),
        }

        if self.settings.table_of_contents {
            ctx.writer
                .new_table_of_contents(&self.toc_title, self.toc_depth);
        }
        Ok(())
    }
}

enum Input {
    File(DocFile),
    Dir(DocDir),
}

/// Overview, then the configured file sections, all at `level`.
fn build_single_file(ctx: &mut RenderContext<'_>, file: &DocFile, level: HeadingLevel) {
    debug!(file = %file.name, "rendering file");
    if ctx.settings.file_overview {
        if let Some(docstring) = &file.docstring {
            if !docstring.summary.is_empty() {
                ctx.writer.new_header(level.get(), "Overview");
                ctx.writer.new_paragraph(&docstring.summary);
            }
        }
    }

    let plan = ctx.plan;
    for section in &plan.file {
        section.run(ctx, file, level);
    }
}

/// Files of `dir` under their own headings. When `recursive`, the directory
/// gets a heading too and subdirectories follow its files, one level deeper.
fn build_dir(ctx: &mut RenderContext<'_>, dir: &DocDir, level: HeadingLevel, recursive: bool) {
    let file_heading = if recursive {
        ctx.writer.new_header(level.get(), &format!("{}/", dir.name));
        level.deeper()
    } else {
        level
    };

    for file in &dir.files {
        ctx.writer.new_header(file_heading.get(), &file.name);
        build_single_file(ctx, file, file_heading.deeper());
    }

    if recursive {
        for subdir in &dir.subdirs {
            build_dir(ctx, subdir, level.deeper(), recursive);
        }
    }
}

/// `root` and every directory below it, depth-first, sorted by name.
pub fn walk_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![root.to_path_buf()];
    let mut entries = fs::read_dir(root)
        .map_err(|e| Error::io(root, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| Error::io(root, e)))
        .collect::<Result<Vec<_>>>()?;
    entries.sort();

    for entry in entries {
        let meta = fs::symlink_metadata(&entry).map_err(|e| Error::io(&entry, e))?;
        if meta.is_dir() {
            dirs.extend(walk_dirs(&entry)?);
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderPlan;
    use crate::writer::recording::RecordingWriter;
    use crate::writer::TableAlign;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}/tests/fixtures/python/{}",
            env!("CARGO_MANIFEST_DIR"),
            name
        ))
    }

    fn builder(src: &Path, recursive: bool) -> DocumentBuilder {
        DocumentBuilder::new()
            .configure_src("python", "google")
            .unwrap()
            .configure_io(src, "README.md", recursive)
            .unwrap()
            .add_commands(&RenderPlan::all())
    }

    fn render(builder: &DocumentBuilder) -> RecordingWriter {
        let mut writer = RecordingWriter::default();
        builder.render_into(&mut writer).unwrap();
        writer
    }

    #[test]
    fn configure_io_requires_existing_source() {
        let err = DocumentBuilder::new()
            .configure_io("/definitely/not/here.py", "out.md", false)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(ConfigError::SourceNotFound(_))));
    }

    #[test]
    fn configure_src_rejects_unknown_pairs() {
        let err = DocumentBuilder::new()
            .configure_src("python", "doxygen")
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "no matching parser for language=python, style=doxygen"
        );
    }

    #[test]
    fn toc_depth_bounds() {
        assert!(DocumentBuilder::new().enable_toc(0, "Contents").is_err());
        assert!(DocumentBuilder::new().enable_toc(7, "Contents").is_err());
        let b = DocumentBuilder::new().enable_toc(6, "Index").unwrap();
        assert!(b.settings().table_of_contents);
    }

    #[test]
    fn toggle_and_alignment() {
        let b = DocumentBuilder::new()
            .toggle("public_only")
            .unwrap()
            .align_tables("center")
            .unwrap();
        assert!(b.settings().public_only);
        assert_eq!(b.settings().table_align, TableAlign::Center);

        let err = DocumentBuilder::new().toggle("title").err().unwrap();
        assert_eq!(err.to_string(), "the setting 'title' is not a boolean");
        assert!(DocumentBuilder::new().align_tables("middle").is_err());
    }

    #[test]
    fn build_without_configuration_fails() {
        let mut writer = RecordingWriter::default();
        let err = DocumentBuilder::new().render_into(&mut writer).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotConfigured(_))));
        assert!(writer.events.is_empty());
    }

    #[test]
    fn single_file_heading_order() {
        let b = builder(&fixture("package/shapes.py"), false);
        let writer = render(&b);
        assert_eq!(
            writer.headers(),
            vec![
                (1, "Overview"),
                (1, "Classes"),
                (2, "Square"),
                (3, "Constructor"),
                (3, "Methods"),
                (4, "area"),
            ]
        );
    }

    #[test]
    fn command_order_beats_declaration_order() {
        let b = DocumentBuilder::new()
            .configure_src("python", "google")
            .unwrap()
            .configure_io(fixture("example_google.py"), "README.md", false)
            .unwrap()
            .toggle("file_overview")
            .unwrap()
            .add_file_command(FileSection::Classes)
            .add_file_command(FileSection::Functions)
            .add_class_command(ClassSection::Methods)
            .add_class_command(ClassSection::Constructor);
        let writer = render(&b);
        let headers: Vec<&str> = writer.headers().into_iter().map(|(_, t)| t).collect();
        assert_eq!(
            headers,
            vec![
                "Classes",
                "ExampleEnum",
                "ExampleOuterClass",
                "Methods",
                "example_method",
                "_protected_method",
                "Constructor",
                "Functions",
                "example_function",
                "_hidden_function",
            ]
        );
    }

    #[test]
    fn directory_levels() {
        let flat = render(&builder(&fixture("package"), false));
        let flat_headers = flat.headers();
        assert_eq!(flat_headers[0], (1, "__init__"));
        assert_eq!(flat_headers[1], (2, "Overview"));
        assert!(flat_headers.contains(&(1, "shapes")));
        assert!(!flat_headers.iter().any(|(_, t)| *t == "util"));

        let deep = render(&builder(&fixture("package"), true));
        let deep_headers = deep.headers();
        assert_eq!(deep_headers[0], (1, "package/"));
        assert_eq!(deep_headers[1], (2, "__init__"));
        assert!(deep_headers.contains(&(2, "empty/")));
        assert!(deep_headers.contains(&(2, "sub/")));
        assert!(deep_headers.contains(&(3, "util")));
        assert!(deep_headers.contains(&(4, "Functions")));
    }

    #[test]
    fn toc_is_requested_after_the_walk() {
        let b = builder(&fixture("package/shapes.py"), false)
            .enable_toc(2, "Contents")
            .unwrap();
        let writer = render(&b);
        assert_eq!(
            writer.events.last(),
            Some(&crate::writer::recording::Event::Toc("Contents".to_string(), 2))
        );
    }

    #[test]
    fn build_writes_markdown() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("docs/README.md");
        DocumentBuilder::new()
            .configure_src("python", "google")
            .unwrap()
            .configure_io(fixture("package/shapes.py"), &out, false)
            .unwrap()
            .configure_metadata("Shapes", "")
            .add_commands(&RenderPlan::all())
            .build()
            .unwrap();

        let doc = fs::read_to_string(&out).unwrap();
        assert!(doc.starts_with("# Shapes\n\n# Overview\n\nGeometric shapes\n"));
        assert!(doc.contains("```python\nSquare(side: float)\n```"));
    }

    #[test]
    fn walk_dirs_is_depth_first_and_sorted() {
        let tmp = TempDir::new().unwrap();
        for dir in ["b", "a/y", "a/x"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        let dirs: Vec<PathBuf> = walk_dirs(tmp.path())
            .unwrap()
            .into_iter()
            .map(|d| d.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from(""),
                PathBuf::from("a"),
                PathBuf::from("a/x"),
                PathBuf::from("a/y"),
                PathBuf::from("b"),
            ]
        );
    }
}
