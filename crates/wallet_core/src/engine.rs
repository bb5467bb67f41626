//! Seams to the external wallet engine.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::ListenerId,
    protocol::{
        ConnectRequest, GetInfoResponse, InputType, LightningPaymentLimitsResponse,
        ListPaymentsRequest, OnchainPaymentLimitsResponse, Payment, PrepareReceiveRequest,
        PrepareReceiveResponse, PrepareSendRequest, PrepareSendResponse, Rate,
        ReceivePaymentRequest, ReceivePaymentResponse, SdkEvent, SendPaymentRequest,
        SendPaymentResponse,
    },
};

/// Receives engine notifications. Called from engine-owned tasks.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: SdkEvent);
}

/// A connected engine session.
#[async_trait]
pub trait WalletEngine: Send + Sync {
    async fn get_info(&self) -> Result<GetInfoResponse>;
    async fn list_payments(&self, request: ListPaymentsRequest) -> Result<Vec<Payment>>;
    async fn parse(&self, input: &str) -> Result<InputType>;
    async fn prepare_send_payment(&self, request: PrepareSendRequest) -> Result<PrepareSendResponse>;
    async fn send_payment(&self, request: SendPaymentRequest) -> Result<SendPaymentResponse>;
    async fn prepare_receive_payment(
        &self,
        request: PrepareReceiveRequest,
    ) -> Result<PrepareReceiveResponse>;
    async fn receive_payment(&self, request: ReceivePaymentRequest)
        -> Result<ReceivePaymentResponse>;
    async fn fetch_lightning_limits(&self) -> Result<LightningPaymentLimitsResponse>;
    async fn fetch_onchain_limits(&self) -> Result<OnchainPaymentLimitsResponse>;
    async fn fetch_fiat_rates(&self) -> Result<Vec<Rate>>;
    async fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> Result<ListenerId>;
    async fn remove_event_listener(&self, id: &ListenerId) -> Result<()>;
    async fn sync(&self) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
}

#[async_trait]
pub trait EngineConnector: Send + Sync {
    async fn connect(&self, request: ConnectRequest) -> Result<Arc<dyn WalletEngine>>;
}
