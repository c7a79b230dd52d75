//! Error types for doctopi.
//!
//! Configuration errors are raised before anything is rendered, so a failed
//! run never leaves a partial document behind.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for doctopi operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Heading level handed to a render command was below 1
    #[error("heading level must be at least 1, got {0}")]
    InvalidLevel(i64),

    /// Source file could not be scanned
    #[error("{}:{line}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The bundled grammar does not match the tree-sitter runtime
    #[error("failed to load the python grammar: {0}")]
    Grammar(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Invalid configuration. Every variant names the offending input.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown section in config '{0}'")]
    UnknownSection(String),

    #[error("unknown key '{key}' in section '{section}'")]
    UnknownKey { section: String, key: String },

    #[error("invalid value '{value}' for key '{key}' in section '{section}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    #[error("no matching parser for language={language}, style={style}")]
    UnsupportedParser { language: String, style: String },

    #[error("unknown docstring style '{0}', expected auto, google, numpy, epydoc, rest or sphinx")]
    UnsupportedStyle(String),

    #[error("unknown command '{name}' in {list} (expected one of: {expected})")]
    UnknownCommand {
        name: String,
        list: String,
        expected: String,
    },

    #[error("command '{name}' cannot be used in {list}")]
    MisplacedCommand { name: String, list: String },

    #[error("alignment must be one of 'left', 'center', or 'right', got '{0}'")]
    InvalidAlignment(String),

    #[error("table of contents depth must be between 1 and 6, got {0}")]
    InvalidTocDepth(i64),

    #[error("the setting '{0}' does not exist")]
    UnknownField(String),

    #[error("the setting '{0}' is not a boolean")]
    NotBoolean(String),

    #[error("\"{}\" path does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("{0} must be configured before building")]
    NotConfigured(&'static str),

    #[error("failed to parse config {}: {message}", path.display())]
    Toml { path: PathBuf, message: String },
}

/// Result type alias for doctopi operations
pub type Result<T> = std::result::Result<T, Error>;
