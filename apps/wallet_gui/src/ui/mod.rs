//! UI layer for the wallet GUI: app shell, screens, dialogs, widgets, and theme.

pub mod app;
pub mod dialogs;
pub mod screens;
pub mod theme;
pub mod widgets;

pub use app::{PersistedGuiSettings, WalletGuiApp, SETTINGS_STORAGE_KEY};
