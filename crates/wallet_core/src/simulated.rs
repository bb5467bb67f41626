//! In-process regtest engine for running the wallet without the real backend.
//!
//! Balances and payments live in memory only. Invoices it generates are
//! "paid" by a fake counterparty after `settle_delay`, which drives the same
//! pending/succeeded event sequence a real engine emits.

use std::{
    collections::{hash_map::DefaultHasher, HashMap},
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{ListenerId, MSATS_PER_SAT, SATS_PER_BTC},
    error::{EngineError, EngineErrorCode},
    protocol::{
        BitcoinAddressData, BlockchainInfo, ConnectRequest, GetInfoResponse, InputType,
        LightningPaymentLimitsResponse, Limits, LiquidAddressData, LiquidNetwork, ListPaymentsRequest, LnInvoice, LnOffer, LnUrlPayRequestData, Network,
        OnchainPaymentLimitsResponse, PayAmount, Payment, PaymentDetails, PaymentMethod,
        PaymentState, PaymentType, PrepareReceiveRequest, PrepareReceiveResponse,
        PrepareSendRequest, PrepareSendResponse, Rate, ReceiveAmount, ReceivePaymentRequest,
        ReceivePaymentResponse, SdkEvent, SendDestination, SendPaymentRequest,
        SendPaymentResponse, WalletInfo,
    },
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::engine::{EngineConnector, EventListener, WalletEngine};

const BECH32_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const LIQUID_ASSET_ID: &str = "5ac9f65c0efcc4775e0baec4ec03abdde22473cd3cf33c0419ca290e0751b225";

const LIGHTNING_LIMITS: Limits = Limits {
    min_sat: 1_000,
    max_sat: 25_000_000,
    max_zero_conf_sat: 0,
};
const ONCHAIN_LIMITS: Limits = Limits {
    min_sat: 25_000,
    max_sat: 25_000_000,
    max_zero_conf_sat: 0,
};

const LIQUID_SEND_FEE_SAT: u64 = 26;
const SYNC_DELAY: Duration = Duration::from_millis(250);

pub struct SimulatedConnector {
    starting_balance_sat: u64,
    settle_delay: Duration,
}

impl Default for SimulatedConnector {
    fn default() -> Self {
        Self {
            starting_balance_sat: 250_000,
            settle_delay: Duration::from_secs(3),
        }
    }
}

impl SimulatedConnector {
    pub fn new(starting_balance_sat: u64, settle_delay: Duration) -> Self {
        Self {
            starting_balance_sat,
            settle_delay,
        }
    }
}

#[async_trait]
impl EngineConnector for SimulatedConnector {
    async fn connect(&self, request: ConnectRequest) -> Result<Arc<dyn WalletEngine>> {
        let identity = match (&request.mnemonic, &request.seed) {
            (Some(mnemonic), _) => {
                bip39::Mnemonic::parse_normalized(mnemonic)
                    .map_err(|e| EngineError::invalid_input(format!("invalid mnemonic: {e}")))?;
                short_hash(mnemonic)
            }
            (None, Some(seed)) if !seed.is_empty() => short_hash(seed),
            _ => {
                return Err(EngineError::invalid_input("mnemonic or seed is required").into());
            }
        };

        info!(
            network = request.config.network.as_str(),
            fingerprint = %identity,
            "simulated engine session opened"
        );
        let engine = SimulatedEngine::new(
            request.config.network,
            identity,
            self.starting_balance_sat,
            self.settle_delay,
        );
        Ok(Arc::new(engine))
    }
}

struct SimState {
    connected: bool,
    fingerprint: String,
    pubkey: String,
    payments: Vec<Payment>,
    listeners: HashMap<ListenerId, Arc<dyn EventListener>>,
    liquid_tip: u32,
    bitcoin_tip: u32,
}

impl SimState {
    fn balance_sat(&self) -> u64 {
        self.payments.iter().fold(0u64, |balance, payment| {
            match (payment.payment_type, payment.status) {
                (PaymentType::Receive, PaymentState::Complete) => {
                    balance.saturating_add(payment.amount_sat)
                }
                (PaymentType::Send, PaymentState::Complete | PaymentState::Pending) => balance
                    .saturating_sub(payment.amount_sat.saturating_add(payment.fees_sat)),
                _ => balance,
            }
        })
    }

    fn pending_sat(&self, payment_type: PaymentType) -> u64 {
        self.payments
            .iter()
            .filter(|payment| {
                payment.payment_type == payment_type && payment.status == PaymentState::Pending
            })
            .map(|payment| payment.amount_sat)
            .sum()
    }

    fn listeners(&self) -> Vec<Arc<dyn EventListener>> {
        self.listeners.values().cloned().collect()
    }
}

pub struct SimulatedEngine {
    state: Arc<Mutex<SimState>>,
    network: LiquidNetwork,
    settle_delay: Duration,
}

impl SimulatedEngine {
    pub fn new(
        network: LiquidNetwork,
        fingerprint: String,
        starting_balance_sat: u64,
        settle_delay: Duration,
    ) -> Self {
        let mut payments = Vec::new();
        if starting_balance_sat > 0 {
            payments.push(Payment {
                destination: None,
                tx_id: Some(random_hex()),
                timestamp: now_secs() - 3_600,
                amount_sat: starting_balance_sat,
                fees_sat: 0,
                swapper_fees_sat: None,
                payment_type: PaymentType::Receive,
                status: PaymentState::Complete,
                details: PaymentDetails::Liquid {
                    destination: liquid_address(network),
                    description: "Regtest faucet".to_string(),
                    asset_id: LIQUID_ASSET_ID.to_string(),
                    lnurl_info: None,
                },
            });
        }

        Self {
            state: Arc::new(Mutex::new(SimState {
                connected: true,
                pubkey: format!("02{}{}", random_hex(), random_hex()),
                fingerprint,
                payments,
                listeners: HashMap::new(),
                liquid_tip: 1_500,
                bitcoin_tip: 350,
            })),
            network,
            settle_delay,
        }
    }

    async fn connected_state(&self) -> Result<tokio::sync::MutexGuard<'_, SimState>> {
        let state = self.state.lock().await;
        if !state.connected {
            return Err(EngineError::not_connected().into());
        }
        Ok(state)
    }

    fn bitcoin_network(&self) -> Network {
        match self.network {
            LiquidNetwork::Mainnet => Network::Bitcoin,
            LiquidNetwork::Testnet => Network::Testnet,
            LiquidNetwork::Regtest => Network::Regtest,
        }
    }

    fn invoice_prefix(&self) -> &'static str {
        match self.network {
            LiquidNetwork::Mainnet => "lnbc",
            LiquidNetwork::Testnet => "lntb",
            LiquidNetwork::Regtest => "lnbcrt",
        }
    }

    fn bitcoin_address(&self) -> String {
        let prefix = match self.network {
            LiquidNetwork::Mainnet => "bc1q",
            LiquidNetwork::Testnet => "tb1q",
            LiquidNetwork::Regtest => "bcrt1q",
        };
        format!("{prefix}{}", bech32_noise(38))
    }

    fn parse_input(&self, raw: &str) -> std::result::Result<InputType, EngineError> {
        let input = raw.trim();
        let lower = input.to_ascii_lowercase();
        let lower = lower.strip_prefix("lightning:").unwrap_or(&lower);
        let network = self.bitcoin_network();

        if ["lnbcrt", "lntbs", "lntb", "lnbc"]
            .iter()
            .any(|prefix| lower.starts_with(prefix))
        {
            let Some(amount_msat) = bolt11_amount_msat(lower) else {
                return Ok(InputType::Bolt11 {
                    invoice: self.invoice_from(lower, None),
                });
            };
            return Ok(InputType::Bolt11 {
                invoice: self.invoice_from(lower, Some(amount_msat)),
            });
        }

        if lower.starts_with("lno1") {
            return Ok(InputType::Bolt12Offer {
                offer: LnOffer {
                    offer: lower.to_string(),
                    chains: Vec::new(),
                    min_amount: None,
                    description: None,
                    issuer: None,
                },
                bip353_address: None,
            });
        }

        if lower.starts_with("lnurl") {
            return Ok(InputType::LnUrlPay {
                data: LnUrlPayRequestData {
                    callback: "http://localhost/lnurlp/callback".to_string(),
                    min_sendable: MSATS_PER_SAT,
                    max_sendable: LIGHTNING_LIMITS.max_sat * MSATS_PER_SAT,
                    metadata_str: "[[\"text/plain\",\"simulated\"]]".to_string(),
                    comment_allowed: 0,
                    domain: "localhost".to_string(),
                    ln_address: None,
                },
                bip353_address: None,
            });
        }

        let (scheme, body) = match input.split_once(':') {
            Some((scheme, body)) if !scheme.contains('/') => (scheme.to_ascii_lowercase(), body),
            _ => (String::new(), input),
        };
        let (address, query) = body.split_once('?').unwrap_or((body, ""));
        let address_lower = address.to_ascii_lowercase();
        let amount_sat = query_param(query, "amount").and_then(btc_to_sat);
        let label = query_param(query, "label").map(str::to_string);
        let message = query_param(query, "message").map(str::to_string);

        let looks_liquid = ["lq1", "ex1", "el1", "tlq1", "tex1"]
            .iter()
            .any(|prefix| address_lower.starts_with(prefix));
        if scheme == "liquidnetwork" || scheme == "liquidtestnet" || (scheme.is_empty() && looks_liquid) {
            return Ok(InputType::LiquidAddress {
                address: LiquidAddressData {
                    address: address.to_string(),
                    network,
                    asset_id: query_param(query, "assetid").map(str::to_string),
                    amount: amount_sat.map(|sat| sat as f64 / SATS_PER_BTC as f64),
                    amount_sat,
                    label,
                    message,
                },
            });
        }

        let looks_bitcoin = ["bc1", "tb1", "bcrt1"]
            .iter()
            .any(|prefix| address_lower.starts_with(prefix));
        if scheme == "bitcoin" || (scheme.is_empty() && looks_bitcoin) {
            return Ok(InputType::BitcoinAddress {
                address: BitcoinAddressData {
                    address: address.to_string(),
                    network,
                    amount_sat,
                    label,
                    message,
                },
            });
        }

        if scheme == "http" || scheme == "https" || lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(InputType::Url {
                url: input.to_string(),
            });
        }

        if input.len() == 66 && input.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Ok(InputType::NodeId {
                node_id: input.to_string(),
            });
        }

        Err(EngineError::invalid_input("unrecognized payment input"))
    }

    fn invoice_from(&self, bolt11: &str, amount_msat: Option<u64>) -> LnInvoice {
        LnInvoice {
            bolt11: bolt11.to_string(),
            network: self.bitcoin_network(),
            payee_pubkey: format!("03{}", short_hash(&bolt11)),
            payment_hash: format!("{}{}", short_hash(&("hash", bolt11)), short_hash(&bolt11)),
            description: None,
            amount_msat,
            timestamp: now_secs().max(0) as u64,
            expiry: 3_600,
            min_final_cltv_expiry_delta: 18,
        }
    }

    async fn emit(&self, event: SdkEvent) {
        let listeners = self.state.lock().await.listeners();
        emit_to(&listeners, event);
    }

    /// Completes a payment after the settle delay. With `announce_pending` the
    /// payment first turns pending halfway through, as an incoming payer would.
    fn schedule_settlement(&self, tx_id: String, announce_pending: bool) {
        let state: Weak<Mutex<SimState>> = Arc::downgrade(&self.state);
        let delay = self.settle_delay;
        tokio::spawn(async move {
            if announce_pending {
                tokio::time::sleep(delay / 2).await;
                let Some(state) = state.upgrade() else {
                    return;
                };
                let (listeners, payment) = {
                    let mut guard = state.lock().await;
                    if !guard.connected {
                        return;
                    }
                    let payment = guard
                        .payments
                        .iter_mut()
                        .find(|payment| payment.tx_id.as_deref() == Some(tx_id.as_str()))
                        .map(|payment| {
                            payment.status = PaymentState::Pending;
                            payment.clone()
                        });
                    (guard.listeners(), payment)
                };
                if let Some(payment) = payment {
                    emit_to(&listeners, SdkEvent::PaymentPending { details: payment });
                }
                tokio::time::sleep(delay / 2).await;
            } else {
                tokio::time::sleep(delay).await;
            }

            let Some(state) = state.upgrade() else {
                return;
            };
            let (listeners, settled) = {
                let mut guard = state.lock().await;
                if !guard.connected {
                    return;
                }
                guard.liquid_tip += 1;
                let settled = guard
                    .payments
                    .iter_mut()
                    .find(|payment| payment.tx_id.as_deref() == Some(tx_id.as_str()))
                    .map(|payment| {
                        payment.status = PaymentState::Complete;
                        payment.clone()
                    });
                (guard.listeners(), settled)
            };
            if let Some(payment) = settled {
                debug!(tx_id = %tx_id, amount_sat = payment.amount_sat, "simulated payment settled");
                emit_to(&listeners, SdkEvent::PaymentSucceeded { details: payment });
                emit_to(&listeners, SdkEvent::Synced);
            }
        });
    }
}

fn emit_to(listeners: &[Arc<dyn EventListener>], event: SdkEvent) {
    for listener in listeners {
        listener.on_event(event.clone());
    }
}

#[async_trait]
impl WalletEngine for SimulatedEngine {
    async fn get_info(&self) -> Result<GetInfoResponse> {
        let state = self.connected_state().await?;
        Ok(GetInfoResponse {
            wallet_info: WalletInfo {
                balance_sat: state.balance_sat(),
                pending_send_sat: state.pending_sat(PaymentType::Send),
                pending_receive_sat: state.pending_sat(PaymentType::Receive),
                fingerprint: state.fingerprint.clone(),
                pubkey: state.pubkey.clone(),
                asset_balances: Vec::new(),
            },
            blockchain_info: BlockchainInfo {
                liquid_tip: state.liquid_tip,
                bitcoin_tip: state.bitcoin_tip,
            },
        })
    }

    async fn list_payments(&self, request: ListPaymentsRequest) -> Result<Vec<Payment>> {
        let state = self.connected_state().await?;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|payment| {
                request
                    .filters
                    .as_ref()
                    .map_or(true, |types| types.contains(&payment.payment_type))
                    && request
                        .states
                        .as_ref()
                        .map_or(true, |states| states.contains(&payment.status))
                    && request
                        .from_timestamp
                        .map_or(true, |from| payment.timestamp >= from)
                    && request.to_timestamp.map_or(true, |to| payment.timestamp < to)
            })
            .cloned()
            .collect();

        if request.sort_ascending.unwrap_or(false) {
            payments.sort_by_key(|payment| payment.timestamp);
        } else {
            payments.sort_by_key(|payment| std::cmp::Reverse(payment.timestamp));
        }

        let offset = request.offset.unwrap_or(0) as usize;
        let limit = request.limit.map_or(usize::MAX, |limit| limit as usize);
        Ok(payments.into_iter().skip(offset).take(limit).collect())
    }

    async fn parse(&self, input: &str) -> Result<InputType> {
        self.connected_state().await?;
        Ok(self.parse_input(input)?)
    }

    async fn prepare_send_payment(&self, request: PrepareSendRequest) -> Result<PrepareSendResponse> {
        let balance = self.connected_state().await?.balance_sat();
        let parsed = self.parse_input(&request.destination)?;
        let requested = match request.amount {
            Some(PayAmount::Bitcoin {
                receiver_amount_sat,
            }) => Some(receiver_amount_sat),
            Some(PayAmount::Drain) => Some(balance.saturating_sub(LIQUID_SEND_FEE_SAT)),
            Some(PayAmount::Asset { .. }) => {
                return Err(EngineError::invalid_input("asset payments are not supported").into())
            }
            None => None,
        };

        let (destination, amount_sat, fees_sat) = match parsed {
            InputType::Bolt11 { invoice } => {
                let amount_sat = invoice
                    .amount_sat()
                    .or(requested)
                    .ok_or_else(|| EngineError::invalid_input("amount is required"))?;
                if !LIGHTNING_LIMITS.contains(amount_sat) {
                    return Err(EngineError::new(
                        EngineErrorCode::AmountOutOfRange,
                        format!(
                            "amount must be between {} and {} sats",
                            LIGHTNING_LIMITS.min_sat, LIGHTNING_LIMITS.max_sat
                        ),
                    )
                    .into());
                }
                let fees = lightning_send_fee(amount_sat);
                (
                    SendDestination::Bolt11 {
                        invoice,
                        bip353_address: None,
                    },
                    amount_sat,
                    fees,
                )
            }
            InputType::LiquidAddress { mut address } => {
                let amount_sat = requested
                    .or(address.amount_sat)
                    .ok_or_else(|| EngineError::invalid_input("amount is required"))?;
                address.amount_sat = Some(amount_sat);
                (
                    SendDestination::LiquidAddress {
                        address_data: address,
                        bip353_address: None,
                    },
                    amount_sat,
                    LIQUID_SEND_FEE_SAT,
                )
            }
            other => {
                return Err(EngineError::invalid_input(format!(
                    "cannot send to {} input",
                    other.kind()
                ))
                .into())
            }
        };

        if amount_sat.saturating_add(fees_sat) > balance {
            return Err(EngineError::new(
                EngineErrorCode::InsufficientFunds,
                format!("insufficient funds: balance is {balance} sats"),
            )
            .into());
        }

        Ok(PrepareSendResponse {
            destination,
            fees_sat: Some(fees_sat),
            estimated_asset_fees: None,
        })
    }

    async fn send_payment(&self, request: SendPaymentRequest) -> Result<SendPaymentResponse> {
        let prepared = request.prepare_response;
        let fees_sat = prepared.fees_sat.unwrap_or(0);
        let tx_id = random_hex();
        let (amount_sat, details, destination, is_lightning) = match &prepared.destination {
            SendDestination::Bolt11 { invoice, .. } => (
                invoice.amount_sat().unwrap_or(0),
                PaymentDetails::Lightning {
                    swap_id: bech32_noise(12),
                    description: invoice.description.clone().unwrap_or_default(),
                    liquid_expiration_blockheight: 1_500 + 720,
                    preimage: Some(random_hex()),
                    invoice: Some(invoice.bolt11.clone()),
                    bolt12_offer: None,
                    payment_hash: Some(invoice.payment_hash.clone()),
                    destination_pubkey: Some(invoice.payee_pubkey.clone()),
                    lnurl_info: None,
                    claim_tx_id: None,
                    refund_tx_id: None,
                    refund_tx_amount_sat: None,
                },
                invoice.bolt11.clone(),
                true,
            ),
            SendDestination::LiquidAddress { address_data, .. } => (
                address_data.amount_sat.unwrap_or(0),
                PaymentDetails::Liquid {
                    destination: address_data.address.clone(),
                    description: address_data.message.clone().unwrap_or_default(),
                    asset_id: LIQUID_ASSET_ID.to_string(),
                    lnurl_info: None,
                },
                address_data.address.clone(),
                false,
            ),
            SendDestination::Bolt12 { .. } => {
                return Err(EngineError::new(
                    EngineErrorCode::PaymentFailed,
                    "bolt12 offers are not supported",
                )
                .into())
            }
        };

        let payment = {
            let mut state = self.connected_state().await?;
            let balance = state.balance_sat();
            if amount_sat.saturating_add(fees_sat) > balance {
                return Err(EngineError::new(
                    EngineErrorCode::InsufficientFunds,
                    format!("insufficient funds: balance is {balance} sats"),
                )
                .into());
            }
            let payment = Payment {
                destination: Some(destination),
                tx_id: Some(tx_id.clone()),
                timestamp: now_secs(),
                amount_sat,
                fees_sat,
                swapper_fees_sat: is_lightning.then_some(fees_sat),
                payment_type: PaymentType::Send,
                status: PaymentState::Pending,
                details,
            };
            state.payments.push(payment.clone());
            payment
        };

        self.emit(SdkEvent::PaymentPending {
            details: payment.clone(),
        })
        .await;
        self.schedule_settlement(tx_id, false);
        Ok(SendPaymentResponse { payment })
    }

    async fn prepare_receive_payment(
        &self,
        request: PrepareReceiveRequest,
    ) -> Result<PrepareReceiveResponse> {
        self.connected_state().await?;
        let amount_sat = match &request.amount {
            Some(ReceiveAmount::Bitcoin { payer_amount_sat }) => Some(*payer_amount_sat),
            Some(ReceiveAmount::Asset { .. }) => {
                return Err(EngineError::invalid_input("asset receives are not supported").into())
            }
            None => None,
        };

        let (limits, fees_sat) = match request.payment_method {
            PaymentMethod::Lightning => {
                let amount = amount_sat
                    .ok_or_else(|| EngineError::invalid_input("amount is required for lightning"))?;
                (Some(LIGHTNING_LIMITS), lightning_receive_fee(amount))
            }
            PaymentMethod::BitcoinAddress => {
                let amount = amount_sat.unwrap_or(ONCHAIN_LIMITS.min_sat);
                (Some(ONCHAIN_LIMITS), onchain_receive_fee(amount))
            }
            PaymentMethod::LiquidAddress => (None, 0),
        };

        if let (Some(limits), Some(amount)) = (limits, amount_sat) {
            if !limits.contains(amount) {
                return Err(EngineError::new(
                    EngineErrorCode::AmountOutOfRange,
                    format!(
                        "amount must be between {} and {} sats",
                        limits.min_sat, limits.max_sat
                    ),
                )
                .into());
            }
        }

        Ok(PrepareReceiveResponse {
            payment_method: request.payment_method,
            amount: request.amount,
            fees_sat,
            min_payer_amount_sat: limits.map(|limits| limits.min_sat),
            max_payer_amount_sat: limits.map(|limits| limits.max_sat),
            swapper_feerate: limits.map(|_| 0.1),
        })
    }

    async fn receive_payment(
        &self,
        request: ReceivePaymentRequest,
    ) -> Result<ReceivePaymentResponse> {
        let prepared = request.prepare_response;
        let amount_sat = match prepared.amount {
            Some(ReceiveAmount::Bitcoin { payer_amount_sat }) => payer_amount_sat,
            _ => 0,
        };
        let description = request.description.unwrap_or_default();
        let tx_id = random_hex();
        let swap_id = bech32_noise(12);

        let (destination, details) = match prepared.payment_method {
            PaymentMethod::Lightning => {
                // 1 sat is 10 nano-btc in the invoice amount.
                let bolt11 = format!(
                    "{}{}n1p{}",
                    self.invoice_prefix(),
                    amount_sat * 10,
                    bech32_noise(180)
                );
                let details = PaymentDetails::Lightning {
                    swap_id,
                    description: description.clone(),
                    liquid_expiration_blockheight: 1_500 + 720,
                    preimage: Some(random_hex()),
                    invoice: Some(bolt11.clone()),
                    bolt12_offer: None,
                    payment_hash: Some(random_hex()),
                    destination_pubkey: None,
                    lnurl_info: None,
                    claim_tx_id: None,
                    refund_tx_id: None,
                    refund_tx_amount_sat: None,
                };
                (bolt11, details)
            }
            PaymentMethod::BitcoinAddress => {
                let address = self.bitcoin_address();
                let uri = format!("bitcoin:{address}?amount={}", sat_to_btc(amount_sat));
                let details = PaymentDetails::Bitcoin {
                    swap_id,
                    description: description.clone(),
                    auto_accepted_fees: false,
                    liquid_expiration_blockheight: Some(1_500 + 1_440),
                    bitcoin_expiration_blockheight: Some(350 + 144),
                    claim_tx_id: None,
                    refund_tx_id: None,
                    refund_tx_amount_sat: None,
                };
                (uri, details)
            }
            PaymentMethod::LiquidAddress => {
                let address = liquid_address(self.network);
                let details = PaymentDetails::Liquid {
                    destination: address.clone(),
                    description: description.clone(),
                    asset_id: LIQUID_ASSET_ID.to_string(),
                    lnurl_info: None,
                };
                (address, details)
            }
        };

        if amount_sat > 0 {
            let mut state = self.connected_state().await?;
            state.payments.push(Payment {
                destination: Some(destination.clone()),
                tx_id: Some(tx_id.clone()),
                timestamp: now_secs(),
                amount_sat: amount_sat.saturating_sub(prepared.fees_sat),
                fees_sat: prepared.fees_sat,
                swapper_fees_sat: None,
                payment_type: PaymentType::Receive,
                status: PaymentState::Created,
                details,
            });
            drop(state);
            // The fake payer shows up halfway through the settle delay.
            self.schedule_settlement(tx_id, true);
        } else {
            self.connected_state().await?;
        }

        Ok(ReceivePaymentResponse { destination })
    }

    async fn fetch_lightning_limits(&self) -> Result<LightningPaymentLimitsResponse> {
        self.connected_state().await?;
        Ok(LightningPaymentLimitsResponse {
            send: LIGHTNING_LIMITS,
            receive: LIGHTNING_LIMITS,
        })
    }

    async fn fetch_onchain_limits(&self) -> Result<OnchainPaymentLimitsResponse> {
        self.connected_state().await?;
        Ok(OnchainPaymentLimitsResponse {
            send: ONCHAIN_LIMITS,
            receive: ONCHAIN_LIMITS,
        })
    }

    async fn fetch_fiat_rates(&self) -> Result<Vec<Rate>> {
        let state = self.connected_state().await?;
        // Nudge the rate with the chain tip so polling is visible.
        let drift = f64::from(state.liquid_tip % 100);
        Ok(vec![
            Rate {
                coin: "USD".to_string(),
                value: 65_000.0 + drift,
            },
            Rate {
                coin: "EUR".to_string(),
                value: 60_000.0 + drift,
            },
            Rate {
                coin: "GBP".to_string(),
                value: 51_500.0 + drift,
            },
        ])
    }

    async fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> Result<ListenerId> {
        let id = ListenerId(uuid::Uuid::new_v4().to_string());
        self.connected_state()
            .await?
            .listeners
            .insert(id.clone(), Arc::clone(&listener));

        // The real engine reports its first sync shortly after start.
        let state = Arc::downgrade(&self.state);
        let listener_id = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SYNC_DELAY).await;
            let Some(state) = state.upgrade() else {
                return;
            };
            let still_registered = {
                let guard = state.lock().await;
                guard.connected && guard.listeners.contains_key(&listener_id)
            };
            if still_registered {
                listener.on_event(SdkEvent::Synced);
            }
        });
        Ok(id)
    }

    async fn remove_event_listener(&self, id: &ListenerId) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.listeners.remove(id).is_none() {
            return Err(EngineError::invalid_input(format!("unknown listener {id}")).into());
        }
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        let listeners = {
            let mut state = self.connected_state().await?;
            state.liquid_tip += 1;
            state.listeners()
        };
        emit_to(&listeners, SdkEvent::Synced);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.connected = false;
        state.listeners.clear();
        info!(fingerprint = %state.fingerprint, "simulated engine session closed");
        Ok(())
    }
}

fn lightning_send_fee(amount_sat: u64) -> u64 {
    // 0.1% routing plus a flat claim fee.
    amount_sat.div_ceil(1_000) + 19
}

fn lightning_receive_fee(amount_sat: u64) -> u64 {
    (amount_sat * 25).div_ceil(10_000) + 19
}

fn onchain_receive_fee(amount_sat: u64) -> u64 {
    amount_sat.div_ceil(1_000) + 143
}

fn bolt11_amount_msat(invoice: &str) -> Option<u64> {
    let separator = invoice.rfind('1')?;
    let hrp = &invoice[..separator];
    let amount = ["lnbcrt", "lntbs", "lntb", "lnbc"]
        .iter()
        .find_map(|prefix| hrp.strip_prefix(prefix))?;
    let last = amount.chars().last()?;
    let (digits, multiplier) = if matches!(last, 'm' | 'u' | 'n' | 'p') {
        (&amount[..amount.len() - 1], Some(last))
    } else {
        (amount, None)
    };
    let value: u64 = digits.parse().ok()?;
    match multiplier {
        None => value.checked_mul(100_000_000_000),
        Some('m') => value.checked_mul(100_000_000),
        Some('u') => value.checked_mul(100_000),
        Some('n') => value.checked_mul(100),
        Some('p') => Some(value / 10),
        Some(_) => None,
    }
}

fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        key.eq_ignore_ascii_case(name).then_some(value)
    })
}

/// "0.00012" -> 12_000.
fn btc_to_sat(value: &str) -> Option<u64> {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if fraction.len() > 8 {
        return None;
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<8}").parse().ok()?
    };
    whole.checked_mul(SATS_PER_BTC)?.checked_add(fraction)
}

fn sat_to_btc(amount_sat: u64) -> String {
    let formatted = format!("{}.{:08}", amount_sat / SATS_PER_BTC, amount_sat % SATS_PER_BTC);
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn liquid_address(network: LiquidNetwork) -> String {
    let prefix = match network {
        LiquidNetwork::Mainnet => "lq1qq",
        LiquidNetwork::Testnet => "tlq1qq",
        LiquidNetwork::Regtest => "el1qq",
    };
    format!("{prefix}{}", bech32_noise(90))
}

fn short_hash<T: Hash + ?Sized>(value: &T) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}

fn random_hex() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn bech32_noise(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for byte in uuid::Uuid::new_v4().as_bytes() {
            if out.len() == len {
                break;
            }
            out.push(BECH32_CHARSET[(*byte as usize) % BECH32_CHARSET.len()] as char);
        }
    }
    out
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
#[path = "tests/simulated_tests.rs"]
mod tests;
