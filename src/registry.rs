//! Configuration names of the render sections.

use crate::error::ConfigError;
use crate::render::{ClassSection, DocstringSection, FileSection, RenderPlan};
use std::collections::BTreeMap;

/// A section selector for one of the three command lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    File(FileSection),
    Class(ClassSection),
    Function(DocstringSection),
}

/// Table from configuration names to section selectors, built once at startup.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Selector>,
}

impl CommandRegistry {
    /// Commands understood by the markdown builder.
    pub fn markdown() -> Self {
        let commands = [
            ("classes", Selector::File(FileSection::Classes)),
            ("functions", Selector::File(FileSection::Functions)),
            ("constructor", Selector::Class(ClassSection::Constructor)),
            ("inner_classes", Selector::Class(ClassSection::InnerClasses)),
            ("class_variables", Selector::Class(ClassSection::ClassVariables)),
            ("instance_variables", Selector::Class(ClassSection::InstanceVariables)),
            ("methods", Selector::Class(ClassSection::Methods)),
            ("arguments", Selector::Function(DocstringSection::Args)),
            ("raises", Selector::Function(DocstringSection::Raises)),
            ("returns", Selector::Function(DocstringSection::Returns)),
        ];
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Selector> {
        self.commands.get(name.trim()).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    fn lookup(&self, name: &str, list: &str) -> Result<Selector, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::UnknownCommand {
            name: name.to_string(),
            list: list.to_string(),
            expected: self.names().collect::<Vec<_>>().join(", "),
        })
    }

    fn misplaced(name: &str, list: &str) -> ConfigError {
        ConfigError::MisplacedCommand {
            name: name.to_string(),
            list: list.to_string(),
        }
    }

    /// Resolve the three configured command lists into a plan.
    pub fn plan<S: AsRef<str>>(
        &self,
        file_docs: &[S],
        class_docs: &[S],
        function_docs: &[S],
    ) -> Result<RenderPlan, ConfigError> {
        let mut plan = RenderPlan::default();

        for name in file_docs.iter().map(AsRef::as_ref) {
            match self.lookup(name, "file_docs")? {
                Selector::File(section) => plan.file.push(section),
                _ => return Err(Self::misplaced(name, "file_docs")),
            }
        }
        for name in class_docs.iter().map(AsRef::as_ref) {
            match self.lookup(name, "class_docs")? {
                Selector::Class(section) => plan.class.push(section),
                _ => return Err(Self::misplaced(name, "class_docs")),
            }
        }
        for name in function_docs.iter().map(AsRef::as_ref) {
            match self.lookup(name, "function_docs")? {
                Selector::Function(section) => plan.function.push(section),
                _ => return Err(Self::misplaced(name, "function_docs")),
            }
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn markdown_registry_knows_every_command() {
        let registry = CommandRegistry::markdown();
        assert_eq!(registry.names().count(), 10);
        assert_eq!(
            registry.get("methods"),
            Some(Selector::Class(ClassSection::Methods))
        );
        assert_eq!(registry.get("nope"), None);
    }

    #[test]
    fn plan_keeps_configured_order() {
        let registry = CommandRegistry::markdown();
        let plan = registry
            .plan(
                &["functions", "classes"],
                &["methods", "constructor"],
                &["returns", "arguments"],
            )
            .unwrap();
        assert_eq!(plan.file, vec![FileSection::Functions, FileSection::Classes]);
        assert_eq!(plan.class, vec![ClassSection::Methods, ClassSection::Constructor]);
        assert_eq!(
            plan.function,
            vec![DocstringSection::Returns, DocstringSection::Args]
        );
    }

    #[test]
    fn unknown_command_names_the_list() {
        let registry = CommandRegistry::markdown();
        let err = registry.plan(&["classes"], &["bogus"], &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown command 'bogus' in class_docs (expected one of: arguments, class_variables, \
             classes, constructor, functions, inner_classes, instance_variables, \
             methods, raises, returns)"
        );
    }

    #[test]
    fn misplaced_command_is_rejected() {
        let registry = CommandRegistry::markdown();
        let err = registry.plan(&["methods"], &[], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MisplacedCommand { ref name, .. } if name == "methods"));
    }
}
