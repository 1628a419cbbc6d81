//! Command registry
//!
//! Commands are registered once at startup. Insertion order is selection
//! order and an index, once handed out, stays valid for the lifetime of the
//! registry.

use std::fmt;

use crate::error::{ActionError, RegistryError};
use crate::mode::ModeId;

/// What a command asks the state machine to do after running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Action done, stay on the command list
    Done,
    /// Push a frame for this mode
    EnterMode(ModeId),
}

/// Command callback
pub type Action = Box<dyn FnMut() -> Result<CommandOutcome, ActionError> + Send>;

pub struct Command {
    name: String,
    action: Action,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&mut self) -> Result<CommandOutcome, ActionError> {
        (self.action)()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command and return its index
    ///
    /// Names are case-sensitive; registering the same name twice fails and
    /// leaves the registry unchanged.
    pub fn register<F>(&mut self, name: impl Into<String>, action: F) -> Result<usize, RegistryError>
    where
        F: FnMut() -> Result<CommandOutcome, ActionError> + Send + 'static,
    {
        let name = name.into();
        if self.commands.iter().any(|c| c.name == name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.commands.push(Command {
            name,
            action: Box::new(action),
        });
        Ok(self.commands.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Command> {
        self.commands.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command names in selection order
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }
}
