use shared::error::EngineError;
use thiserror::Error;

pub const CONNECT_FAILED_MESSAGE: &str =
    "Failed to connect wallet. Please check your mnemonic and try again.";
pub const SAVED_PHRASE_FAILED_MESSAGE: &str =
    "Failed to connect with saved mnemonic. Please try again.";
pub const REFRESH_FAILED_MESSAGE: &str = "Failed to refresh wallet data.";
pub const INVALID_PHRASE_MESSAGE: &str = "Please enter a valid 12 or 24-word recovery phrase";

#[derive(Debug, Error)]
pub enum WalletError {
    /// Phrase rejected or engine refused the session.
    #[error("{0}")]
    Connection(String),
    /// Info or payment list refresh failed; snapshots are left untouched.
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    Validation(String),
    /// The command needs a live engine session.
    #[error("wallet is not connected")]
    NotConnected,
    #[error("local storage failure: {0}")]
    Storage(String),
}

/// Best user-facing text for an engine call failure.
pub fn engine_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<EngineError>() {
        Some(engine) => engine.user_message().to_string(),
        None => err.to_string(),
    }
}
