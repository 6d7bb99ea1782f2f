//! Commands indexed by name and arity.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use crate::command::Command;
use crate::error::{ConfigError, InvocationError};

/// Read-only after [`RegistryBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, BTreeMap<usize, Command>>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Find the variant of `name` taking `arity` arguments.
    pub fn resolve(&self, name: &str, arity: usize) -> Result<&Command, InvocationError> {
        let variants = self
            .commands
            .get(name)
            .ok_or_else(|| InvocationError::CommandNotFound {
                name: name.to_string(),
            })?;
        variants
            .get(&arity)
            .ok_or_else(|| InvocationError::ArityMismatch {
                name: name.to_string(),
                supplied: arity,
            })
    }

    pub fn get(&self, name: &str, arity: usize) -> Option<&Command> {
        self.commands.get(name)?.get(&arity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Variants registered under `name`, by ascending arity.
    pub fn variants<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Command> + 'a {
        self.commands
            .get(name)
            .into_iter()
            .flat_map(|variants| variants.values())
    }

    /// Every command, by name and then arity.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values().flat_map(|variants| variants.values())
    }

    /// Number of distinct command names.
    pub fn names(&self) -> usize {
        self.commands.len()
    }

    /// Number of command slots.
    pub fn len(&self) -> usize {
        self.commands.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: Vec<Command>,
}

impl RegistryBuilder {
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    /// Index the commands. Two commands with equal name and arity are
    /// rejected.
    pub fn build(self) -> Result<CommandRegistry, ConfigError> {
        let mut commands: BTreeMap<String, BTreeMap<usize, Command>> = BTreeMap::new();
        for command in self.commands {
            let name = command.name().to_string();
            let arity = command.arity();
            match commands.entry(name.clone()).or_default().entry(arity) {
                Entry::Occupied(_) => return Err(ConfigError::DuplicateCommand { name, arity }),
                Entry::Vacant(slot) => {
                    debug!(command = %name, arity, "registered command");
                    slot.insert(command);
                }
            }
        }
        Ok(CommandRegistry { commands })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::TypeRegistry;

    fn command(name: &str, code: i32, params: usize) -> Command {
        let mut builder = Command::builder(name);
        for _ in 0..params {
            builder = builder.param::<i32>();
        }
        builder
            .action(move |_, _| Ok(code))
            .build(&TypeRegistry::with_primitives())
            .unwrap()
    }

    #[test]
    fn test_overloads_by_arity() {
        let registry = CommandRegistry::builder()
            .command(command("add", 1, 1))
            .command(command("add", 2, 2))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), 1);

        let mut out = Vec::new();
        let one = registry.resolve("add", 1).unwrap();
        assert_eq!(one.call(&["1"], &mut out).unwrap(), 1);
        let two = registry.resolve("add", 2).unwrap();
        assert_eq!(two.call(&["1", "2"], &mut out).unwrap(), 2);
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let err = CommandRegistry::builder()
            .command(command("add", 1, 2))
            .command(command("add", 2, 2))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateCommand {
                name: "add".to_string(),
                arity: 2
            }
        );
    }

    #[test]
    fn test_resolve_failures() {
        let registry = CommandRegistry::builder()
            .commands([command("add", 0, 2)])
            .build()
            .unwrap();

        assert!(matches!(
            registry.resolve("sub", 2),
            Err(InvocationError::CommandNotFound { .. })
        ));
        assert!(matches!(
            registry.resolve("add", 3),
            Err(InvocationError::ArityMismatch { supplied: 3, .. })
        ));
        assert!(registry.contains("add"));
        assert!(registry.get("add", 2).is_some());
        assert!(registry.get("add", 1).is_none());
    }

    #[test]
    fn test_iteration_order() {
        let registry = CommandRegistry::builder()
            .command(command("b", 0, 1))
            .command(command("a", 0, 2))
            .command(command("b", 0, 0))
            .command(command("a", 0, 0))
            .build()
            .unwrap();

        let order: Vec<(String, usize)> = registry
            .iter()
            .map(|c| (c.name().to_string(), c.arity()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".to_string(), 0),
                ("a".to_string(), 2),
                ("b".to_string(), 0),
                ("b".to_string(), 1),
            ]
        );
        assert_eq!(registry.variants("b").count(), 2);
        assert_eq!(registry.variants("zzz").count(), 0);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CommandRegistry::builder().build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
