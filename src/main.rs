//! doctopi — generate Markdown documentation from Python source files.
//!
//! Two modes:
//!
//! - `doctopi generate-config [-o doctopi.toml]` writes the default configuration
//! - `doctopi markdown -i src/ -o README.md` renders documentation

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use doctopi::builder::{self, DocumentBuilder};
use doctopi::config::{Config, DEFAULT_CONFIG, DEFAULT_CONFIG_FILE};
use doctopi::registry::CommandRegistry;
use doctopi::render::RenderPlan;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_OUTPUT: &str = "README.md";

#[derive(Parser)]
#[command(
    name = "doctopi",
    version,
    about = "Generate Markdown documentation from Python source code and docstrings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    GenerateConfig {
        /// Destination of the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },

    /// Render Markdown documentation
    Markdown(MarkdownArgs),
}

#[derive(Args)]
struct MarkdownArgs {
    /// Source file or directory
    #[arg(short, long)]
    input: PathBuf,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Configuration file (defaults to ./doctopi.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Language of the source files
    #[arg(short = 'l', long)]
    src_language: Option<String>,

    /// Docstring style: auto, google, numpy, epydoc, rest or sphinx
    #[arg(short, long)]
    docstring_style: Option<String>,

    /// Document subdirectories too, one heading per directory
    #[arg(short, long)]
    recursive: bool,

    /// Write one document into every directory below the input
    #[arg(long, conflicts_with = "recursive")]
    per_directory: bool,

    /// Document title
    #[arg(short, long)]
    title: Option<String>,

    /// Document author
    #[arg(short, long)]
    author: Option<String>,

    /// Deepest heading level in the table of contents (1-6)
    #[arg(long, allow_negative_numbers = true)]
    toc_depth: Option<i64>,

    /// Table of contents heading
    #[arg(long)]
    toc_title: Option<String>,

    /// Table alignment: left, center or right
    #[arg(long)]
    table_align: Option<String>,

    #[arg(long)]
    no_table_of_contents: bool,

    #[arg(long)]
    no_constructors: bool,

    #[arg(long)]
    no_class_vars: bool,

    #[arg(long)]
    no_instance_vars: bool,

    #[arg(long)]
    no_inner_classes: bool,

    #[arg(long)]
    no_methods: bool,

    /// Leave out the module docstring overview
    #[arg(long)]
    no_file_overview: bool,

    /// Only document public classes and functions
    #[arg(long)]
    public_only: bool,
}

/// Settings after layering command-line flags over the configuration.
#[derive(Debug, PartialEq)]
struct Options {
    src_language: String,
    docstring_style: String,
    title: String,
    author: String,
    table_align: String,
    toc: Option<(i64, String)>,
    /// Builder toggles that end up disabled.
    disabled: Vec<&'static str>,
    public_only: bool,
}

impl Options {
    fn resolve(args: &MarkdownArgs, config: &Config) -> Self {
        let content = &config.content;
        let sections = [
            ("constructors", content.constructors && !args.no_constructors),
            ("class_vars", content.class_vars && !args.no_class_vars),
            ("instance_vars", content.instance_vars && !args.no_instance_vars),
            ("inner_classes", content.inner_classes && !args.no_inner_classes),
            ("methods", content.methods && !args.no_methods),
            ("file_overview", content.overview && !args.no_file_overview),
        ];

        let toc = &config.table_of_contents;
        let toc = (toc.enabled && !args.no_table_of_contents).then(|| {
            (
                args.toc_depth.unwrap_or(toc.depth),
                args.toc_title.clone().unwrap_or_else(|| toc.title.clone()),
            )
        });

        Self {
            src_language: pick(&args.src_language, &config.main.src_language),
            docstring_style: pick(&args.docstring_style, &config.main.docstring_style),
            title: pick(&args.title, &config.markdown.title),
            author: pick(&args.author, &config.markdown.author),
            table_align: pick(&args.table_align, &config.markdown.table_align),
            toc,
            disabled: sections
                .into_iter()
                .filter(|(_, enabled)| !enabled)
                .map(|(field, _)| field)
                .collect(),
            public_only: content.public_only || args.public_only,
        }
    }

    /// A fully configured builder. All configuration errors surface here.
    fn builder(
        &self,
        plan: &RenderPlan,
        input: &Path,
        output: &Path,
        recursive: bool,
        title: &str,
    ) -> Result<DocumentBuilder> {
        let mut builder = DocumentBuilder::new()
            .add_commands(plan)
            .configure_src(&self.src_language, &self.docstring_style)?
            .configure_io(input, output, recursive)?
            .align_tables(&self.table_align)?
            .configure_metadata(title, &self.author);

        for field in &self.disabled {
            builder = builder.toggle(field)?;
        }
        if self.public_only {
            builder = builder.toggle("public_only")?;
        }
        if let Some((depth, toc_title)) = &self.toc {
            builder = builder.enable_toc(*depth, toc_title)?;
        }
        Ok(builder)
    }
}

fn pick(cli: &Option<String>, config: &str) -> String {
    cli.clone().unwrap_or_else(|| config.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::GenerateConfig { output } => generate_config(output),
        Commands::Markdown(args) => markdown(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn generate_config(output: &Path) -> Result<()> {
    fs::write(output, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), "wrote default configuration");
    Ok(())
}

fn markdown(args: &MarkdownArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let options = Options::resolve(args, &config);
    let organization = &config.organization;
    let plan = CommandRegistry::markdown().plan(
        &organization.file_docs,
        &organization.class_docs,
        &organization.function_docs,
    )?;

    if !args.per_directory {
        let builder = options.builder(&plan, &args.input, &args.output, args.recursive, &options.title)?;
        return builder
            .build()
            .with_context(|| format!("failed to document {}", args.input.display()));
    }

    if !args.input.is_dir() {
        bail!("--per-directory needs a directory, got {}", args.input.display());
    }
    let file_name = args
        .output
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    // configure every document before writing any of them
    let builders = builder::walk_dirs(&args.input)?
        .into_iter()
        .map(|dir| {
            let title = dir_title(&dir);
            options.builder(&plan, &dir, &dir.join(&file_name), false, &title)
        })
        .collect::<Result<Vec<_>>>()?;

    for builder in &builders {
        builder.build()?;
    }
    Ok(())
}

fn dir_title(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// An explicit `--config` must exist; otherwise `./doctopi.toml` is optional.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) if !path.is_file() => {
            bail!("config file {} does not exist", path.display())
        }
        Some(path) => Some(path),
        None => Some(Path::new(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };
    Ok(Config::load(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn markdown_args(args: &[&str]) -> MarkdownArgs {
        let cli = Cli::try_parse_from(["doctopi", "markdown"].iter().chain(args).copied()).unwrap();
        match cli.command {
            Commands::Markdown(args) => args,
            Commands::GenerateConfig { .. } => panic!("expected markdown"),
        }
    }

    fn defaults() -> Config {
        Config::load(None).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_config_defaults_to_doctopi_toml() {
        let cli = Cli::try_parse_from(["doctopi", "generate-config"]).unwrap();
        match cli.command {
            Commands::GenerateConfig { output } => assert_eq!(output, PathBuf::from("doctopi.toml")),
            Commands::Markdown(_) => panic!("expected generate-config"),
        }
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["doctopi", "markdown"]).is_err());
    }

    #[test]
    fn recursive_modes_conflict() {
        assert!(Cli::try_parse_from(["doctopi", "markdown", "-i", "src", "-r", "--per-directory"]).is_err());
    }

    #[test]
    fn config_values_are_used_without_flags() {
        let options = Options::resolve(&markdown_args(&["-i", "src"]), &defaults());
        assert_eq!(
            options,
            Options {
                src_language: "python".into(),
                docstring_style: "google".into(),
                title: String::new(),
                author: String::new(),
                table_align: "left".into(),
                toc: Some((1, "Contents".into())),
                disabled: vec![],
                public_only: false,
            }
        );
    }

    #[test]
    fn flags_override_config() {
        let args = markdown_args(&[
            "-i", "src", "-d", "numpy", "-t", "API", "--toc-depth", "3", "--table-align", "right",
            "--no-methods", "--no-file-overview", "--public-only",
        ]);
        let options = Options::resolve(&args, &defaults());
        assert_eq!(options.docstring_style, "numpy");
        assert_eq!(options.title, "API");
        assert_eq!(options.table_align, "right");
        assert_eq!(options.toc, Some((3, "Contents".into())));
        assert_eq!(options.disabled, vec!["methods", "file_overview"]);
        assert!(options.public_only);
    }

    #[test]
    fn flags_cannot_reenable_what_config_disables() {
        let mut config = defaults();
        config.content.methods = false;
        config.content.public_only = true;
        config.table_of_contents.enabled = false;

        let options = Options::resolve(&markdown_args(&["-i", "src", "--toc-depth", "2"]), &config);
        assert_eq!(options.disabled, vec!["methods"]);
        assert!(options.public_only);
        assert_eq!(options.toc, None);
    }

    #[test]
    fn negative_toc_depth_parses_and_is_rejected_by_the_builder() {
        let args = markdown_args(&["-i", ".", "--toc-depth", "-1"]);
        let options = Options::resolve(&args, &defaults());
        let err = options
            .builder(&RenderPlan::all(), Path::new("."), Path::new("out.md"), false, "")
            .err()
            .unwrap();
        assert!(err.to_string().contains("between 1 and 6"));
    }

    #[test]
    fn dir_title_uses_the_directory_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("pkg");
        fs::create_dir(&dir).unwrap();
        assert_eq!(dir_title(&dir), "pkg");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/doctopi.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
