//! Wallet session controller and payment flows over an external engine.

pub mod config;
pub mod controller;
pub mod details;
pub mod engine;
pub mod error;
pub mod flows;
pub mod format;
pub mod mnemonic;
pub mod notify;
pub mod service;
pub mod simulated;
pub mod store;

pub use config::{load_settings, WalletSettings};
pub use controller::{Screen, WalletController, WalletEvent, WalletSnapshot};
pub use engine::{EngineConnector, EventListener, WalletEngine};
pub use error::WalletError;
pub use mnemonic::RecoveryPhrase;
pub use simulated::SimulatedConnector;
pub use store::{MemoryPhraseStore, PhraseStore};
