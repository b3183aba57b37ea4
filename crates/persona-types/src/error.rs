use thiserror::Error;

use crate::personality::Factor;

/// Errors surfaced by registry and editor operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing store could not be opened or read.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Saving failed. The in-memory registry still holds the change.
    #[error("failed to save registry: {0}")]
    WriteError(String),

    #[error("bot '{0}' not found")]
    BotNotFound(String),

    #[error("unknown personality factor '{0}'")]
    FactorNotFound(String),

    #[error("value {value} for factor {factor} is outside the 1..=10 range")]
    OutOfRange { factor: Factor, value: i64 },

    #[error("invalid bot name: {0}")]
    InvalidName(String),

    #[error("invalid import: {0}")]
    InvalidImport(String),
}

impl RegistryError {
    /// True for both unknown-bot and unknown-factor errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::BotNotFound(_) | RegistryError::FactorNotFound(_)
        )
    }
}

/// Errors from store operations (used by the `RegistryStore` port in persona-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store contents are corrupt: {0}")]
    Corrupt(String),

    #[error("write failed: {0}")]
    Write(String),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => RegistryError::StorageUnavailable(msg),
            StoreError::Corrupt(msg) => {
                RegistryError::StorageUnavailable(format!("corrupt registry: {msg}"))
            }
            StoreError::Write(msg) => RegistryError::WriteError(msg),
        }
    }
}

/// A raw value that does not fit the sten scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("score {0} is outside the 1..=10 sten range")]
pub struct ScoreOutOfRange(pub i64);
