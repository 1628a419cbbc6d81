//! Host error types

use detent_core::{ConfigError, RegistryError};
use thiserror::Error;

/// Failures of the physical connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("encoder device not found")]
    DeviceNotFound,
    #[error("device I/O error: {0}")]
    Io(String),
    #[error("device disconnected")]
    Disconnected,
}

/// Startup failures of the daemon
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
