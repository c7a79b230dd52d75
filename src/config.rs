//! Layered TOML configuration.
//!
//! The embedded `default.toml` is both the default values and the schema: a
//! user file may override any subset of it, but every section and key it names
//! must exist in the defaults and keep the default's type.

use crate::error::{ConfigError, Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The built-in configuration, written out by `generate-config`.
pub const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "doctopi.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub main: MainSection,
    pub organization: OrganizationSection,
    pub markdown: MarkdownSection,
    pub table_of_contents: TocSection,
    pub content: ContentSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MainSection {
    pub src_language: String,
    pub docstring_style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationSection {
    pub file_docs: Vec<String>,
    pub class_docs: Vec<String>,
    pub function_docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkdownSection {
    pub title: String,
    pub author: String,
    pub table_align: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TocSection {
    pub enabled: bool,
    pub depth: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentSection {
    pub constructors: bool,
    pub class_vars: bool,
    pub instance_vars: bool,
    pub methods: bool,
    pub inner_classes: bool,
    pub overview: bool,
    pub public_only: bool,
}

impl Config {
    /// Defaults overlaid with the file at `path`, if any.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                Self::from_layers(Some((path, &text)))
            }
            None => Self::from_layers(None),
        }
    }

    /// Defaults overlaid with `text`; `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        Self::from_layers(Some((origin, text)))
    }

    fn from_layers(user: Option<(&Path, &str)>) -> Result<Self> {
        let default_origin = PathBuf::from("<built-in>");
        let mut table = parse_table(DEFAULT_CONFIG, &default_origin)?;

        if let Some((origin, text)) = user {
            merge(&mut table, parse_table(text, origin)?)?;
            tracing::debug!(path = %origin.display(), "loaded config");
        }

        let origin = user.map_or(default_origin, |(p, _)| p.to_path_buf());
        toml::Value::Table(table).try_into().map_err(|e: toml::de::Error| {
            ConfigError::Toml {
                path: origin,
                message: e.to_string(),
            }
            .into()
        })
    }
}

fn parse_table(text: &str, origin: &Path) -> Result<toml::Table> {
    toml::from_str(text).map_err(|e: toml::de::Error| {
        ConfigError::Toml {
            path: origin.to_path_buf(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Overlay `user` onto `defaults`, rejecting anything the defaults don't know.
fn merge(defaults: &mut toml::Table, user: toml::Table) -> std::result::Result<(), ConfigError> {
    for (section, values) in user {
        let Some(toml::Value::Table(target)) = defaults.get_mut(&section) else {
            return Err(ConfigError::UnknownSection(section));
        };
        let toml::Value::Table(values) = values else {
            return Err(ConfigError::InvalidValue {
                value: values.to_string(),
                key: section.clone(),
                section,
            });
        };

        for (key, value) in values {
            let Some(current) = target.get(&key) else {
                return Err(ConfigError::UnknownKey { section, key });
            };
            let shown = value.to_string();
            let Some(value) = normalize(current, value) else {
                return Err(ConfigError::InvalidValue {
                    section,
                    key,
                    value: shown,
                });
            };
            target.insert(key, value);
        }
    }
    Ok(())
}

/// Coerce `value` to the type of `current`; `"yes"`/`"no"` count as booleans.
fn normalize(current: &toml::Value, value: toml::Value) -> Option<toml::Value> {
    match (current, value) {
        (toml::Value::Boolean(_), toml::Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" => Some(toml::Value::Boolean(true)),
            "no" | "false" => Some(toml::Value::Boolean(false)),
            _ => None,
        },
        (current, value) if current.type_str() == value.type_str() => Some(value),
        _ => None,
    }
}
