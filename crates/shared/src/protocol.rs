//! Request, response and event types of the wallet engine interface.
//!
//! Everything here serializes to the engine's JSON shape: camelCase fields and
//! a `type` discriminant on tagged unions.

use serde::{Deserialize, Serialize};

use crate::domain::{Rail, MSATS_PER_SAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LiquidNetwork {
    Mainnet,
    Testnet,
    #[default]
    Regtest,
}

impl LiquidNetwork {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "liquid" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            "regtest" => Some(Self::Regtest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Network {
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BlockchainExplorer {
    Esplora { url: String, use_waterfalls: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub liquid_explorer: BlockchainExplorer,
    pub bitcoin_explorer: BlockchainExplorer,
    pub working_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    pub network: LiquidNetwork,
    pub payment_timeout_sec: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_conf_max_amount_sat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breez_api_key: Option<String>,
    pub use_default_external_input_parsers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub config: EngineConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Vec<u8>>,
}

impl ConnectRequest {
    pub fn with_mnemonic(config: EngineConfig, mnemonic: impl Into<String>) -> Self {
        Self {
            config,
            mnemonic: Some(mnemonic.into()),
            passphrase: None,
            seed: None,
        }
    }

    pub fn with_seed(config: EngineConfig, seed: Vec<u8>) -> Self {
        Self {
            config,
            mnemonic: None,
            passphrase: None,
            seed: Some(seed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub asset_id: String,
    pub balance_sat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub balance_sat: u64,
    pub pending_send_sat: u64,
    pub pending_receive_sat: u64,
    pub fingerprint: String,
    pub pubkey: String,
    #[serde(default)]
    pub asset_balances: Vec<AssetBalance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainInfo {
    pub liquid_tip: u32,
    pub bitcoin_tip: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInfoResponse {
    pub wallet_info: WalletInfo,
    pub blockchain_info: BlockchainInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentType {
    Receive,
    Send,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentState {
    Created,
    Pending,
    Complete,
    Failed,
    TimedOut,
    Refundable,
    RefundPending,
    WaitingFeeAcceptance,
}

impl PaymentState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::TimedOut => "Timed out",
            Self::Refundable => "Refundable",
            Self::RefundPending => "Refund pending",
            Self::WaitingFeeAcceptance => "Waiting fee acceptance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnUrlInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ln_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lnurl_pay_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lnurl_pay_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lnurl_withdraw_endpoint: Option<String>,
}

/// Rail-specific payment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PaymentDetails {
    Lightning {
        swap_id: String,
        description: String,
        liquid_expiration_blockheight: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preimage: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        invoice: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bolt12_offer: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment_hash: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination_pubkey: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lnurl_info: Option<LnUrlInfo>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        claim_tx_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refund_tx_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refund_tx_amount_sat: Option<u64>,
    },
    Liquid {
        destination: String,
        description: String,
        asset_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lnurl_info: Option<LnUrlInfo>,
    },
    Bitcoin {
        swap_id: String,
        description: String,
        auto_accepted_fees: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        liquid_expiration_blockheight: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bitcoin_expiration_blockheight: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        claim_tx_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refund_tx_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refund_tx_amount_sat: Option<u64>,
    },
}

impl PaymentDetails {
    pub fn rail(&self) -> Rail {
        match self {
            Self::Lightning { .. } => Rail::Lightning,
            Self::Liquid { .. } => Rail::Liquid,
            Self::Bitcoin { .. } => Rail::Bitcoin,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Lightning { description, .. }
            | Self::Liquid { description, .. }
            | Self::Bitcoin { description, .. } => description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    /// Unix seconds.
    pub timestamp: i64,
    pub amount_sat: u64,
    pub fees_sat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapper_fees_sat: Option<u64>,
    pub payment_type: PaymentType,
    pub status: PaymentState,
    pub details: PaymentDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<PaymentType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<PaymentState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_ascending: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Amount {
    Bitcoin {
        amount_msat: u64,
    },
    Currency {
        iso4217_code: String,
        fractional_amount: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnInvoice {
    pub bolt11: String,
    pub network: Network,
    pub payee_pubkey: String,
    pub payment_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_msat: Option<u64>,
    pub timestamp: u64,
    pub expiry: u64,
    pub min_final_cltv_expiry_delta: u64,
}

impl LnInvoice {
    pub fn amount_sat(&self) -> Option<u64> {
        self.amount_msat.map(|msat| msat / MSATS_PER_SAT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnOffer {
    pub offer: String,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidAddressData {
    pub address: String,
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_sat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinAddressData {
    pub address: String,
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_sat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnUrlPayRequestData {
    pub callback: String,
    pub min_sendable: u64,
    pub max_sendable: u64,
    pub metadata_str: String,
    pub comment_allowed: u16,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ln_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnUrlWithdrawRequestData {
    pub callback: String,
    pub k1: String,
    pub default_description: String,
    pub min_withdrawable: u64,
    pub max_withdrawable: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LnUrlAuthRequestData {
    pub k1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub domain: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LnUrlErrorData {
    pub reason: String,
}

/// What the engine recognized a piece of user text as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputType {
    BitcoinAddress {
        address: BitcoinAddressData,
    },
    LiquidAddress {
        address: LiquidAddressData,
    },
    Bolt11 {
        invoice: LnInvoice,
    },
    Bolt12Offer {
        offer: LnOffer,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bip353_address: Option<String>,
    },
    NodeId {
        node_id: String,
    },
    Url {
        url: String,
    },
    LnUrlPay {
        data: LnUrlPayRequestData,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bip353_address: Option<String>,
    },
    LnUrlWithdraw {
        data: LnUrlWithdrawRequestData,
    },
    LnUrlAuth {
        data: LnUrlAuthRequestData,
    },
    LnUrlError {
        data: LnUrlErrorData,
    },
}

impl InputType {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BitcoinAddress { .. } => "bitcoin_address",
            Self::LiquidAddress { .. } => "liquid_address",
            Self::Bolt11 { .. } => "bolt11",
            Self::Bolt12Offer { .. } => "bolt12_offer",
            Self::NodeId { .. } => "node_id",
            Self::Url { .. } => "url",
            Self::LnUrlPay { .. } => "lnurl_pay",
            Self::LnUrlWithdraw { .. } => "lnurl_withdraw",
            Self::LnUrlAuth { .. } => "lnurl_auth",
            Self::LnUrlError { .. } => "lnurl_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PayAmount {
    Bitcoin {
        receiver_amount_sat: u64,
    },
    Asset {
        asset_id: String,
        receiver_amount: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimate_asset_fees: Option<bool>,
    },
    Drain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSendRequest {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<PayAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SendDestination {
    LiquidAddress {
        address_data: LiquidAddressData,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bip353_address: Option<String>,
    },
    Bolt11 {
        invoice: LnInvoice,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bip353_address: Option<String>,
    },
    Bolt12 {
        offer: LnOffer,
        receiver_amount_sat: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bip353_address: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSendResponse {
    pub destination: SendDestination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_sat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_asset_fees: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPaymentRequest {
    pub prepare_response: PrepareSendResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_asset_fees: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPaymentResponse {
    pub payment: Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    #[default]
    Lightning,
    BitcoinAddress,
    LiquidAddress,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lightning => "Lightning",
            Self::BitcoinAddress => "Bitcoin address",
            Self::LiquidAddress => "Liquid address",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReceiveAmount {
    Bitcoin {
        payer_amount_sat: u64,
    },
    Asset {
        asset_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payer_amount: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareReceiveRequest {
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<ReceiveAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareReceiveResponse {
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<ReceiveAmount>,
    pub fees_sat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_payer_amount_sat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payer_amount_sat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapper_feerate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivePaymentRequest {
    pub prepare_response: PrepareReceiveResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_description_hash: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivePaymentResponse {
    pub destination: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub min_sat: u64,
    pub max_sat: u64,
    pub max_zero_conf_sat: u64,
}

impl Limits {
    pub fn contains(&self, amount_sat: u64) -> bool {
        amount_sat >= self.min_sat && amount_sat <= self.max_sat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightningPaymentLimitsResponse {
    pub send: Limits,
    pub receive: Limits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainPaymentLimitsResponse {
    pub send: Limits,
    pub receive: Limits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub coin: String,
    pub value: f64,
}

/// Notifications pushed by the engine to registered listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SdkEvent {
    PaymentFailed { details: Payment },
    PaymentPending { details: Payment },
    PaymentRefundable { details: Payment },
    PaymentRefunded { details: Payment },
    PaymentRefundPending { details: Payment },
    PaymentSucceeded { details: Payment },
    PaymentWaitingConfirmation { details: Payment },
    PaymentWaitingFeeAcceptance { details: Payment },
    Synced,
    DataSynced { did_pull_new_records: bool },
}

impl SdkEvent {
    pub fn payment(&self) -> Option<&Payment> {
        match self {
            Self::PaymentFailed { details }
            | Self::PaymentPending { details }
            | Self::PaymentRefundable { details }
            | Self::PaymentRefunded { details }
            | Self::PaymentRefundPending { details }
            | Self::PaymentSucceeded { details }
            | Self::PaymentWaitingConfirmation { details }
            | Self::PaymentWaitingFeeAcceptance { details } => Some(details),
            Self::Synced | Self::DataSynced { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PaymentFailed { .. } => "payment_failed",
            Self::PaymentPending { .. } => "payment_pending",
            Self::PaymentRefundable { .. } => "payment_refundable",
            Self::PaymentRefunded { .. } => "payment_refunded",
            Self::PaymentRefundPending { .. } => "payment_refund_pending",
            Self::PaymentSucceeded { .. } => "payment_succeeded",
            Self::PaymentWaitingConfirmation { .. } => "payment_waiting_confirmation",
            Self::PaymentWaitingFeeAcceptance { .. } => "payment_waiting_fee_acceptance",
            Self::Synced => "synced",
            Self::DataSynced { .. } => "data_synced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sdk_event_uses_engine_discriminants() {
        let synced: SdkEvent = serde_json::from_value(json!({ "type": "synced" })).expect("synced");
        assert_eq!(synced, SdkEvent::Synced);

        let data_synced: SdkEvent =
            serde_json::from_value(json!({ "type": "dataSynced", "didPullNewRecords": true }))
                .expect("data synced");
        assert_eq!(
            data_synced,
            SdkEvent::DataSynced {
                did_pull_new_records: true
            }
        );
    }

    #[test]
    fn payment_event_carries_rail_details() {
        let raw = json!({
            "type": "paymentSucceeded",
            "details": {
                "timestamp": 1_700_000_000,
                "amountSat": 2500,
                "feesSat": 12,
                "paymentType": "receive",
                "status": "complete",
                "details": {
                    "type": "lightning",
                    "swapId": "swap-1",
                    "description": "coffee",
                    "liquidExpirationBlockheight": 1200,
                    "preimage": "aa"
                }
            }
        });

        let event: SdkEvent = serde_json::from_value(raw).expect("event");
        let payment = event.payment().expect("payment payload");
        assert_eq!(payment.amount_sat, 2500);
        assert_eq!(payment.payment_type, PaymentType::Receive);
        assert_eq!(payment.details.rail(), Rail::Lightning);
        assert_eq!(payment.details.description(), "coffee");
        assert_eq!(event.kind(), "payment_succeeded");
    }

    #[test]
    fn timed_out_state_serializes_camel_case() {
        let value = serde_json::to_value(PaymentState::TimedOut).expect("state");
        assert_eq!(value, json!("timedOut"));
        let value = serde_json::to_value(PaymentState::WaitingFeeAcceptance).expect("state");
        assert_eq!(value, json!("waitingFeeAcceptance"));
    }

    #[test]
    fn prepare_send_request_matches_engine_shape() {
        let request = PrepareSendRequest {
            destination: "lnbcrt1".to_string(),
            amount: Some(PayAmount::Bitcoin {
                receiver_amount_sat: 1500,
            }),
        };
        let value = serde_json::to_value(&request).expect("request");
        assert_eq!(
            value,
            json!({
                "destination": "lnbcrt1",
                "amount": { "type": "bitcoin", "receiverAmountSat": 1500 }
            })
        );
    }

    #[test]
    fn bolt11_input_without_amount_reports_none() {
        let raw = json!({
            "type": "bolt11",
            "invoice": {
                "bolt11": "lnbcrt1p0",
                "network": "regtest",
                "payeePubkey": "02ab",
                "paymentHash": "ff",
                "timestamp": 1,
                "expiry": 3600,
                "minFinalCltvExpiryDelta": 18
            }
        });
        let input: InputType = serde_json::from_value(raw).expect("input");
        match input {
            InputType::Bolt11 { invoice } => assert_eq!(invoice.amount_sat(), None),
            other => panic!("unexpected input type: {other:?}"),
        }
    }

    #[test]
    fn connect_request_omits_unused_credentials() {
        let config = EngineConfig {
            liquid_explorer: BlockchainExplorer::Esplora {
                url: "http://localhost:3120".to_string(),
                use_waterfalls: true,
            },
            bitcoin_explorer: BlockchainExplorer::Esplora {
                url: "http://localhost:3002".to_string(),
                use_waterfalls: false,
            },
            working_dir: "/tmp/wallet".to_string(),
            cache_dir: None,
            network: LiquidNetwork::Regtest,
            payment_timeout_sec: 15,
            sync_service_url: None,
            zero_conf_max_amount_sat: None,
            breez_api_key: None,
            use_default_external_input_parsers: true,
        };
        let value = serde_json::to_value(ConnectRequest::with_seed(config, vec![1, 2])).expect("req");
        assert!(value.get("mnemonic").is_none());
        assert_eq!(value["seed"], json!([1, 2]));
        assert_eq!(value["config"]["liquidExplorer"]["useWaterfalls"], json!(true));
    }

    #[test]
    fn limits_bounds_are_inclusive() {
        let limits = Limits {
            min_sat: 100,
            max_sat: 200,
            max_zero_conf_sat: 0,
        };
        assert!(limits.contains(100));
        assert!(limits.contains(200));
        assert!(!limits.contains(99));
        assert!(!limits.contains(201));
    }
}
