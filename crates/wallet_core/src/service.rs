//! Adapter that turns wallet actions into engine calls.

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::{
    domain::ListenerId,
    error::EngineError,
    protocol::{
        ConnectRequest, EngineConfig, GetInfoResponse, InputType,
        LightningPaymentLimitsResponse, ListPaymentsRequest, OnchainPaymentLimitsResponse, Payment,
        PrepareReceiveRequest, PrepareReceiveResponse, PrepareSendRequest, PrepareSendResponse,
        Rate, ReceivePaymentRequest, ReceivePaymentResponse, SendPaymentRequest,
        SendPaymentResponse,
    },
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    engine::{EngineConnector, EventListener, WalletEngine},
    mnemonic::RecoveryPhrase,
};

pub struct WalletService {
    connector: Arc<dyn EngineConnector>,
    config: EngineConfig,
    engine: RwLock<Option<Arc<dyn WalletEngine>>>,
}

impl WalletService {
    pub fn new(connector: Arc<dyn EngineConnector>, config: EngineConfig) -> Self {
        Self {
            connector,
            config,
            engine: RwLock::new(None),
        }
    }

    /// Opens an engine session, replacing any existing one.
    pub async fn init_wallet(&self, phrase: &RecoveryPhrase) -> Result<()> {
        if self.is_connected().await {
            self.disconnect().await?;
        }

        let request = ConnectRequest::with_mnemonic(self.config.clone(), phrase.expose());
        let engine = self
            .connector
            .connect(request)
            .await
            .context("engine connect failed")?;
        *self.engine.write().await = Some(engine);
        info!(network = self.config.network.as_str(), "wallet engine connected");
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.engine.read().await.is_some()
    }

    async fn engine(&self) -> Result<Arc<dyn WalletEngine>> {
        self.engine
            .read()
            .await
            .clone()
            .ok_or_else(|| EngineError::not_connected().into())
    }

    pub async fn get_wallet_info(&self) -> Result<GetInfoResponse> {
        self.engine().await?.get_info().await
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        self.engine()
            .await?
            .list_payments(ListPaymentsRequest::default())
            .await
    }

    pub async fn parse_input(&self, input: &str) -> Result<InputType> {
        self.engine().await?.parse(input).await
    }

    pub async fn prepare_send_payment(
        &self,
        request: PrepareSendRequest,
    ) -> Result<PrepareSendResponse> {
        self.engine().await?.prepare_send_payment(request).await
    }

    pub async fn send_payment(&self, prepare_response: PrepareSendResponse) -> Result<SendPaymentResponse> {
        self.engine()
            .await?
            .send_payment(SendPaymentRequest {
                prepare_response,
                use_asset_fees: None,
            })
            .await
    }

    pub async fn prepare_receive_payment(
        &self,
        request: PrepareReceiveRequest,
    ) -> Result<PrepareReceiveResponse> {
        self.engine().await?.prepare_receive_payment(request).await
    }

    pub async fn receive_payment(
        &self,
        prepare_response: PrepareReceiveResponse,
        description: Option<String>,
    ) -> Result<ReceivePaymentResponse> {
        self.engine()
            .await?
            .receive_payment(ReceivePaymentRequest {
                prepare_response,
                description,
                use_description_hash: None,
            })
            .await
    }

    pub async fn fetch_lightning_limits(&self) -> Result<LightningPaymentLimitsResponse> {
        self.engine().await?.fetch_lightning_limits().await
    }

    pub async fn fetch_onchain_limits(&self) -> Result<OnchainPaymentLimitsResponse> {
        self.engine().await?.fetch_onchain_limits().await
    }

    pub async fn fetch_fiat_rates(&self) -> Result<Vec<Rate>> {
        self.engine().await?.fetch_fiat_rates().await
    }

    pub async fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> Result<ListenerId> {
        self.engine().await?.add_event_listener(listener).await
    }

    pub async fn remove_event_listener(&self, id: &ListenerId) -> Result<()> {
        self.engine().await?.remove_event_listener(id).await
    }

    pub async fn sync(&self) -> Result<()> {
        self.engine().await?.sync().await
    }

    /// Drops the session even if the engine reports an error while closing.
    pub async fn disconnect(&self) -> Result<()> {
        let Some(engine) = self.engine.write().await.take() else {
            return Ok(());
        };
        if let Err(err) = engine.disconnect().await {
            warn!("engine disconnect reported an error: {err:#}");
            return Err(err);
        }
        info!("wallet engine disconnected");
        Ok(())
    }
}
