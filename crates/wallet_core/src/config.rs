use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use shared::protocol::{BlockchainExplorer, EngineConfig, LiquidNetwork};

pub const SETTINGS_FILE_NAME: &str = "wallet.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct WalletSettings {
    pub network: LiquidNetwork,
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub liquid_explorer_url: String,
    pub bitcoin_explorer_url: String,
    pub fiat_currency: String,
    pub fiat_poll_interval: Duration,
    pub payment_timeout: Duration,
    pub toast_duration: Duration,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            network: LiquidNetwork::Regtest,
            data_dir: default_data_dir(),
            api_key: None,
            liquid_explorer_url: "http://localhost:3120/api".into(),
            bitcoin_explorer_url: "http://localhost:3002/api".into(),
            fiat_currency: "USD".into(),
            fiat_poll_interval: Duration::from_secs(30),
            payment_timeout: Duration::from_secs(15),
            toast_duration: Duration::from_secs(5),
        }
    }
}

impl WalletSettings {
    pub fn database_url(&self) -> String {
        storage::sqlite_url_for_path(&self.data_dir.join("wallet.db"))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            liquid_explorer: BlockchainExplorer::Esplora {
                url: self.liquid_explorer_url.clone(),
                use_waterfalls: true,
            },
            bitcoin_explorer: BlockchainExplorer::Esplora {
                url: self.bitcoin_explorer_url.clone(),
                use_waterfalls: false,
            },
            working_dir: self
                .data_dir
                .join("engine")
                .join(self.network.as_str())
                .to_string_lossy()
                .into_owned(),
            cache_dir: None,
            network: self.network,
            payment_timeout_sec: self.payment_timeout.as_secs(),
            sync_service_url: None,
            zero_conf_max_amount_sat: None,
            breez_api_key: self.api_key.clone(),
            use_default_external_input_parsers: true,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("liquid_wallet")
}

pub fn load_settings() -> WalletSettings {
    let file_contents = fs::read_to_string(SETTINGS_FILE_NAME).ok();
    let env: HashMap<String, String> = std::env::vars().collect();
    load_settings_from(file_contents.as_deref(), &env)
}

/// Defaults, then `wallet.toml`, then environment. Malformed values are skipped.
pub fn load_settings_from(file_contents: Option<&str>, env: &HashMap<String, String>) -> WalletSettings {
    let mut settings = WalletSettings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<toml::Table>(raw) {
            Ok(table) => {
                for (key, value) in table {
                    let text = match value {
                        toml::Value::String(text) => text,
                        toml::Value::Integer(number) => number.to_string(),
                        other => {
                            tracing::warn!(key = %key, value = %other, "ignoring unsupported settings value");
                            continue;
                        }
                    };
                    apply_setting(&mut settings, &key, &text);
                }
            }
            Err(err) => tracing::warn!("failed to parse {SETTINGS_FILE_NAME}: {err}"),
        }
    }

    for (key, names) in ENV_OVERRIDES {
        for name in *names {
            if let Some(value) = env.get(*name) {
                apply_setting(&mut settings, key, value);
            }
        }
    }

    settings
}

/// Unprefixed names first so `WALLET__*` wins when both are set.
const ENV_OVERRIDES: &[(&str, &[&str])] = &[
    ("network", &["WALLET_NETWORK", "WALLET__NETWORK"]),
    ("data_dir", &["WALLET_DATA_DIR", "WALLET__DATA_DIR"]),
    ("api_key", &["BREEZ_API_KEY", "WALLET__API_KEY"]),
    ("liquid_explorer_url", &["WALLET__LIQUID_EXPLORER_URL"]),
    ("bitcoin_explorer_url", &["WALLET__BITCOIN_EXPLORER_URL"]),
    ("fiat_currency", &["WALLET__FIAT_CURRENCY"]),
    ("fiat_poll_interval_secs", &["WALLET__FIAT_POLL_INTERVAL_SECS"]),
    ("payment_timeout_secs", &["WALLET__PAYMENT_TIMEOUT_SECS"]),
    ("toast_duration_secs", &["WALLET__TOAST_DURATION_SECS"]),
];

fn apply_setting(settings: &mut WalletSettings, key: &str, value: &str) {
    let value = value.trim();
    match key {
        "network" => match LiquidNetwork::parse(value) {
            Some(network) => settings.network = network,
            None => tracing::warn!(value, "unknown network in settings"),
        },
        "data_dir" if !value.is_empty() => settings.data_dir = PathBuf::from(value),
        "api_key" => settings.api_key = (!value.is_empty()).then(|| value.to_string()),
        "liquid_explorer_url" if !value.is_empty() => {
            settings.liquid_explorer_url = value.to_string()
        }
        "bitcoin_explorer_url" if !value.is_empty() => {
            settings.bitcoin_explorer_url = value.to_string()
        }
        "fiat_currency" if !value.is_empty() => settings.fiat_currency = value.to_ascii_uppercase(),
        "fiat_poll_interval_secs" => {
            if let Some(duration) = parse_secs(key, value) {
                settings.fiat_poll_interval = duration;
            }
        }
        "payment_timeout_secs" => {
            if let Some(duration) = parse_secs(key, value) {
                settings.payment_timeout = duration;
            }
        }
        "toast_duration_secs" => {
            if let Some(duration) = parse_secs(key, value) {
                settings.toast_duration = duration;
            }
        }
        _ => tracing::debug!(key, "ignoring unknown settings key"),
    }
}

fn parse_secs(key: &str, value: &str) -> Option<Duration> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => {
            tracing::warn!(key, value, "expected a positive number of seconds");
            None
        }
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}
