use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorCode {
    InvalidInput,
    InsufficientFunds,
    AmountOutOfRange,
    NotConnected,
    AlreadyConnected,
    PaymentFailed,
    Network,
    Generic,
}

/// Error shape the wallet engine reports back across its interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct EngineError {
    pub code: EngineErrorCode,
    pub message: String,
}

impl EngineError {
    pub fn new(code: EngineErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(EngineErrorCode::InvalidInput, message)
    }

    pub fn not_connected() -> Self {
        Self::new(EngineErrorCode::NotConnected, "engine is not connected")
    }

    /// Text suitable for inline display, without the code prefix.
    pub fn user_message(&self) -> &str {
        &self.message
    }
}
