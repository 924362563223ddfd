use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::SynthesisError;
use crate::ir::Command;
use crate::parse::spec::ApiSchema;

use super::synthesize::synthesize;

/// Eligible commands keyed by name. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, Command>,
}

impl CommandRegistry {
    pub fn build(schema: &ApiSchema) -> Result<Self, SynthesisError> {
        Self::build_with_reserved(schema, &[])
    }

    /// Build the registry, treating `reserved` names (front-end built-ins) as
    /// already taken.
    pub fn build_with_reserved(
        schema: &ApiSchema,
        reserved: &[&str],
    ) -> Result<Self, SynthesisError> {
        let mut commands: IndexMap<String, Command> = IndexMap::new();

        for command in synthesize(schema).into_iter().filter(Command::is_eligible) {
            if reserved.contains(&command.name.as_str()) {
                return Err(SynthesisError::DuplicateCommand {
                    second: describe(&command),
                    name: command.name,
                    first: "built-in command".to_string(),
                });
            }
            match commands.entry(command.name.clone()) {
                Entry::Occupied(existing) => {
                    return Err(SynthesisError::DuplicateCommand {
                        name: command.name.clone(),
                        first: describe(existing.get()),
                        second: describe(&command),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(command);
                }
            }
        }

        log::debug!("registered {} commands", commands.len());
        Ok(Self { commands })
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn describe(command: &Command) -> String {
    format!("{} {}", command.method, command.path)
}
