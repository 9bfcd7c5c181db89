use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for registry/simulation/storage layers.
#[derive(Debug, Error)]
pub enum PayoffError {
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Duplicate card nickname: {0}")]
    DuplicateCard(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, PayoffError>;

impl From<std::io::Error> for PayoffError {
    fn from(err: std::io::Error) -> Self {
        PayoffError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PayoffError {
    fn from(err: serde_json::Error) -> Self {
        PayoffError::Storage(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] PayoffError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}
