use std::{path::PathBuf, time::Duration};

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use shared::protocol::LiquidNetwork;
use wallet_core::WalletSettings;

use backend_bridge::{
    commands::BackendCommand,
    runtime::{self, EngineOptions},
};
use controller::events::UiEvent;
use ui::{PersistedGuiSettings, WalletGuiApp, SETTINGS_STORAGE_KEY};

const APP_NAME: &str = "Liquid Wallet";

#[derive(Parser, Debug)]
#[command(name = "wallet_gui", about = "Desktop wallet for Liquid and Lightning payments")]
struct Args {
    /// mainnet, testnet or regtest
    #[arg(long, value_parser = parse_network)]
    network: Option<LiquidNetwork>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    fiat_currency: Option<String>,
    /// Funds credited to a fresh regtest wallet.
    #[arg(long, default_value_t = 250_000)]
    starting_balance_sat: u64,
    /// Seconds before a simulated payment settles.
    #[arg(long, default_value_t = 3)]
    settle_delay_secs: u64,
}

fn parse_network(value: &str) -> Result<LiquidNetwork, String> {
    LiquidNetwork::parse(value).ok_or_else(|| format!("unknown network `{value}`"))
}

impl Args {
    fn apply(&self, mut settings: WalletSettings) -> WalletSettings {
        if let Some(network) = self.network {
            settings.network = network;
        }
        if let Some(data_dir) = &self.data_dir {
            settings.data_dir = data_dir.clone();
        }
        if let Some(currency) = self.fiat_currency.as_deref().map(str::trim) {
            if !currency.is_empty() {
                settings.fiat_currency = currency.to_ascii_uppercase();
            }
        }
        settings
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            starting_balance_sat: self.starting_balance_sat,
            settle_delay: Duration::from_secs(self.settle_delay_secs),
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = args.apply(wallet_core::load_settings());
    tracing::info!(
        network = settings.network.as_str(),
        fiat_currency = %settings.fiat_currency,
        "starting wallet gui"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let backend = runtime::launch(cmd_rx, ui_tx, settings.clone(), args.engine_options());
    let shutdown_tx = cmd_tx.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([480.0, 820.0])
            .with_min_inner_size([380.0, 560.0]),
        ..Default::default()
    };
    let result = eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedGuiSettings>(&text).ok())
            });
            Ok(Box::new(WalletGuiApp::new(
                cmd_tx,
                ui_rx,
                &settings,
                persisted_settings,
            )))
        }),
    );

    // Keeps the stored phrase; only the live session is torn down.
    if shutdown_tx.send(BackendCommand::Shutdown).is_ok() && backend.join().is_err() {
        tracing::error!("backend worker panicked during shutdown");
    }
    result
}
