//! doctopi — generate Markdown documentation from Python source code.
//!
//! The pipeline has three stages:
//!
//! - [`parser`] turns source files into the [`model`] entity tree,
//!   parsing docstrings with [`docstring`] along the way;
//! - [`render`] walks that tree with a configurable sequence of commands;
//! - [`writer`] collects the output and writes the document.
//!
//! [`builder::DocumentBuilder`] ties the stages together.

pub mod builder;
pub mod config;
pub mod docstring;
pub mod error;
pub mod model;
pub mod parser;
pub mod registry;
pub mod render;
pub mod writer;

pub use error::{ConfigError, Error, Result};
