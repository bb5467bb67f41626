//! UI/backend events and error modeling for the wallet GUI.

use wallet_core::{notify::Notification, RecoveryPhrase, WalletError, WalletSnapshot};

pub enum UiEvent {
    Info(String),
    Snapshot(Box<WalletSnapshot>),
    Notification(Notification),
    PhraseGenerated(RecoveryPhrase),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Connection,
    Transport,
    Payment,
    Storage,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Onboarding,
    Connect,
    Refresh,
    Sync,
    Disconnect,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::BackendStartup => "Startup",
            Self::Onboarding => "Setup",
            Self::Connect => "Connect",
            Self::Refresh => "Refresh",
            Self::Sync => "Sync",
            Self::Disconnect => "Disconnect",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("storage")
            || message_lower.contains("sqlite")
            || message_lower.contains("database")
        {
            UiErrorCategory::Storage
        } else if message_lower.contains("insufficient")
            || message_lower.contains("payment")
            || message_lower.contains("invoice")
        {
            UiErrorCategory::Payment
        } else if message_lower.contains("invalid")
            || message_lower.contains("mnemonic")
            || message_lower.contains("phrase")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("network")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("connect") {
            UiErrorCategory::Connection
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_wallet_error(context: UiErrorContext, err: &WalletError) -> Self {
        let category = match err {
            WalletError::Connection(_) | WalletError::NotConnected => UiErrorCategory::Connection,
            WalletError::Fetch(_) => UiErrorCategory::Transport,
            WalletError::Validation(_) => UiErrorCategory::Validation,
            WalletError::Storage(_) => UiErrorCategory::Storage,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    /// Connection losses send the user back through onboarding.
    pub fn requires_reconnect(&self) -> bool {
        self.category == UiErrorCategory::Connection
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn banner_text(&self) -> String {
        format!("{}: {}", self.context.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_command_processor_disconnect_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::Sync,
            "Backend command processor disconnected (possible startup/runtime failure)",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(!err.requires_reconnect());
    }

    #[test]
    fn storage_startup_failure_is_storage() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: could not open wallet storage: sqlite busy",
        );
        assert_eq!(err.category(), UiErrorCategory::Storage);
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }

    #[test]
    fn wallet_errors_map_by_variant() {
        let err = UiError::from_wallet_error(UiErrorContext::Sync, &WalletError::NotConnected);
        assert_eq!(err.category(), UiErrorCategory::Connection);
        assert!(err.requires_reconnect());
        assert_eq!(err.banner_text(), "Sync: wallet is not connected");

        let err = UiError::from_wallet_error(
            UiErrorContext::Disconnect,
            &WalletError::Storage("disk full".to_string()),
        );
        assert_eq!(err.category(), UiErrorCategory::Storage);
        assert_eq!(err.message(), "local storage failure: disk full");
    }

    #[test]
    fn payment_words_win_over_validation_words() {
        let err = UiError::from_message(UiErrorContext::Refresh, "invalid invoice amount");
        assert_eq!(err.category(), UiErrorCategory::Payment);
    }
}
