//! Error types for the menu core

use std::any::Any;
use std::path::PathBuf;

use thiserror::Error;

use crate::mode::ModeId;

/// Registration-time failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command `{0}` is already registered")]
    DuplicateName(String),
    #[error("mode `{0}` already has a handler")]
    DuplicateMode(ModeId),
}

/// Failure reported by a command callback or a mode handler
///
/// The state machine contains these at the dispatch boundary; they become a
/// notification, never a change of navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActionError(String);

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    /// Build an error from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self(message)
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
