//! Session lifecycle, data refresh and dialog flows for one wallet.
//!
//! The controller owns at most one engine session. Each state change is
//! published as a full [`WalletSnapshot`] on a broadcast channel; the GUI only
//! ever renders the latest snapshot it received.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use anyhow::Result;
use shared::{
    domain::{ListenerId, SATS_PER_BTC},
    protocol::{
        GetInfoResponse, PayAmount, Payment, PaymentMethod, PaymentType, PrepareReceiveRequest,
        ReceiveAmount, SdkEvent,
    },
};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
    config::WalletSettings,
    engine::{EngineConnector, EventListener},
    error::{
        engine_message, WalletError, CONNECT_FAILED_MESSAGE, INVALID_PHRASE_MESSAGE,
        REFRESH_FAILED_MESSAGE, SAVED_PHRASE_FAILED_MESSAGE,
    },
    flows::{
        receive::{GeneratedRequest, ReceiveFlow, ReceiveLimits},
        send::{
            payment_failed_message, prepare_request_for, quote_failed_message, SendFlow,
            SendOutcome, SendQuote, INVALID_INPUT_MESSAGE,
        },
        FlowId,
    },
    mnemonic::RecoveryPhrase,
    notify::{notification_for, Notification},
    service::WalletService,
    store::PhraseStore,
};

/// Liquid addresses carry no swap, so only the supply bounds the amount.
const LIQUID_RECEIVE_LIMITS: ReceiveLimits = ReceiveLimits {
    min_sat: 1,
    max_sat: 21_000_000 * SATS_PER_BTC,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Restore,
    Generate,
    Wallet,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalletSnapshot {
    pub screen: Screen,
    pub connected: bool,
    pub loading: bool,
    /// Set by a restore until the engine reports its first sync.
    pub restoring: bool,
    pub error: Option<String>,
    pub restore_error: Option<String>,
    pub info: Option<GetInfoResponse>,
    pub payments: Vec<Payment>,
    pub fiat_rate: Option<f64>,
    pub send: Option<SendFlow>,
    pub receive: Option<ReceiveFlow>,
}

impl WalletSnapshot {
    /// Drops everything that belongs to a live session. Onboarding screens stay.
    fn reset_session(&mut self) {
        self.connected = false;
        self.info = None;
        self.payments.clear();
        self.fiat_rate = None;
        self.send = None;
        self.receive = None;
        if self.screen == Screen::Wallet {
            self.screen = Screen::Home;
        }
    }

    fn send_flow(&mut self, id: FlowId) -> Option<&mut SendFlow> {
        self.send.as_mut().filter(|flow| flow.id() == id)
    }

    fn receive_flow(&mut self, id: FlowId) -> Option<&mut ReceiveFlow> {
        self.receive.as_mut().filter(|flow| flow.id() == id)
    }
}

#[derive(Debug, Clone)]
pub enum WalletEvent {
    StateChanged(WalletSnapshot),
    Notification(Notification),
}

/// Forwards engine callbacks into the controller's event task.
struct ChannelListener {
    tx: mpsc::UnboundedSender<SdkEvent>,
}

impl EventListener for ChannelListener {
    fn on_event(&self, event: SdkEvent) {
        if self.tx.send(event).is_err() {
            debug!("engine event dropped: session already closed");
        }
    }
}

struct ActiveSession {
    listener_id: ListenerId,
    event_task: JoinHandle<()>,
    fiat_task: JoinHandle<()>,
}

pub struct WalletController {
    service: WalletService,
    store: Arc<dyn PhraseStore>,
    fiat_currency: String,
    fiat_poll_interval: Duration,
    state: Mutex<WalletSnapshot>,
    session: Mutex<Option<ActiveSession>>,
    /// Serializes connect and disconnect. Never taken by event handling.
    lifecycle: Mutex<()>,
    next_flow_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
}

impl WalletController {
    pub fn new(
        connector: Arc<dyn EngineConnector>,
        store: Arc<dyn PhraseStore>,
        settings: &WalletSettings,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            service: WalletService::new(connector, settings.engine_config()),
            store,
            fiat_currency: settings.fiat_currency.clone(),
            fiat_poll_interval: settings.fiat_poll_interval,
            state: Mutex::new(WalletSnapshot::default()),
            session: Mutex::new(None),
            lifecycle: Mutex::new(()),
            next_flow_id: AtomicU64::new(1),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WalletSnapshot {
        self.state.lock().await.clone()
    }

    /// Applies `change` and publishes the resulting snapshot.
    async fn update<R>(&self, change: impl FnOnce(&mut WalletSnapshot) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.lock().await;
            let result = change(&mut state);
            (result, state.clone())
        };
        let _ = self.events.send(WalletEvent::StateChanged(snapshot));
        result
    }

    fn allocate_flow_id(&self) -> FlowId {
        FlowId(self.next_flow_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Reconnects with the stored phrase, or lands on the welcome screen.
    pub async fn startup(self: &Arc<Self>) {
        let phrase = match self.store.load_phrase().await {
            Ok(phrase) => phrase,
            Err(err) => {
                warn!("failed to read stored recovery phrase: {err:#}");
                None
            }
        };

        let Some(phrase) = phrase else {
            self.update(|state| state.screen = Screen::Home).await;
            return;
        };

        info!("stored recovery phrase found, reconnecting");
        self.update(|state| {
            state.loading = true;
            state.error = None;
        })
        .await;

        if let Err(err) = self.open_session(&phrase).await {
            warn!("reconnect with stored phrase failed: {err:#}");
            if let Err(err) = self.store.clear_phrase().await {
                warn!("failed to clear stored recovery phrase: {err:#}");
            }
            self.update(|state| {
                state.loading = false;
                state.screen = Screen::Home;
                state.error = Some(SAVED_PHRASE_FAILED_MESSAGE.to_string());
            })
            .await;
        }
    }

    pub async fn navigate(&self, screen: Screen) {
        self.update(|state| {
            if screen == Screen::Wallet && !state.connected {
                return;
            }
            state.screen = screen;
            state.error = None;
            state.restore_error = None;
        })
        .await;
    }

    /// Fresh 24-word phrase for the create screen. Nothing is stored yet.
    pub async fn generate_phrase(&self) -> Result<RecoveryPhrase, WalletError> {
        let phrase =
            RecoveryPhrase::generate().map_err(|err| WalletError::Validation(err.to_string()))?;
        self.navigate(Screen::Generate).await;
        Ok(phrase)
    }

    pub async fn restore_wallet(self: &Arc<Self>, text: &str) -> Result<(), WalletError> {
        let phrase = match RecoveryPhrase::parse(text) {
            Ok(phrase) => phrase,
            Err(err) => {
                debug!("restore rejected: {err}");
                self.update(|state| {
                    state.restore_error = Some(INVALID_PHRASE_MESSAGE.to_string());
                })
                .await;
                return Err(WalletError::Validation(INVALID_PHRASE_MESSAGE.to_string()));
            }
        };
        self.update(|state| state.restore_error = None).await;
        self.connect(phrase, true).await
    }

    pub async fn create_wallet(self: &Arc<Self>, phrase: RecoveryPhrase) -> Result<(), WalletError> {
        self.connect(phrase, false).await
    }

    pub async fn connect(
        self: &Arc<Self>,
        phrase: RecoveryPhrase,
        restore: bool,
    ) -> Result<(), WalletError> {
        self.update(|state| {
            state.loading = true;
            state.error = None;
            state.restoring = restore;
        })
        .await;

        match self.open_session(&phrase).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(restore, "wallet connect failed: {err:#}");
                if let Err(err) = self.store.clear_phrase().await {
                    warn!("failed to clear stored recovery phrase: {err:#}");
                }
                // Any previous session was closed before the attempt.
                self.update(|state| {
                    state.reset_session();
                    state.loading = false;
                    state.restoring = false;
                    state.error = Some(CONNECT_FAILED_MESSAGE.to_string());
                })
                .await;
                Err(WalletError::Connection(CONNECT_FAILED_MESSAGE.to_string()))
            }
        }
    }

    async fn open_session(self: &Arc<Self>, phrase: &RecoveryPhrase) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;
        self.close_session().await;

        self.service.init_wallet(phrase).await?;
        if let Err(err) = self.start_session(phrase).await {
            if let Err(close_err) = self.service.disconnect().await {
                warn!("failed to close half-open engine session: {close_err:#}");
            }
            return Err(err);
        }
        Ok(())
    }

    async fn start_session(self: &Arc<Self>, phrase: &RecoveryPhrase) -> Result<()> {
        self.store.save_phrase(phrase).await?;
        let info = self.service.get_wallet_info().await?;
        let payments = self.service.list_payments().await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let listener_id = self
            .service
            .add_event_listener(Arc::new(ChannelListener { tx }))
            .await?;

        info!(
            balance_sat = info.wallet_info.balance_sat,
            payments = payments.len(),
            "wallet session started"
        );
        // Both tasks check `connected` before writing, so it must be set first.
        self.update(|state| {
            state.connected = true;
            state.loading = false;
            state.error = None;
            state.screen = Screen::Wallet;
            state.info = Some(info);
            state.payments = payments;
        })
        .await;

        let event_task = self.spawn_event_task(rx);
        let fiat_task = self.spawn_fiat_poller();
        *self.session.lock().await = Some(ActiveSession {
            listener_id,
            event_task,
            fiat_task,
        });
        Ok(())
    }

    /// Stops background work and releases the engine. The poller is awaited,
    /// so no rate request is issued after this returns.
    async fn close_session(&self) {
        let active = self.session.lock().await.take();
        if let Some(ActiveSession {
            listener_id,
            event_task,
            fiat_task,
        }) = active
        {
            fiat_task.abort();
            let _ = fiat_task.await;
            if let Err(err) = self.service.remove_event_listener(&listener_id).await {
                warn!(listener = %listener_id, "failed to remove engine listener: {err:#}");
            }
            event_task.abort();
            let _ = event_task.await;
        }

        if let Err(err) = self.service.disconnect().await {
            warn!("engine disconnect failed: {err:#}");
        }
    }

    /// Ends the session and forgets the stored phrase.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.close_session().await;
        let cleared = self.store.clear_phrase().await;
        self.update(|state| *state = WalletSnapshot::default()).await;
        info!("wallet disconnected");
        cleared.map_err(|err| WalletError::Storage(err.to_string()))
    }

    /// Releases the session on exit. The stored phrase is kept for next start.
    pub async fn shutdown(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.close_session().await;
        self.update(|state| {
            state.connected = false;
            state.send = None;
            state.receive = None;
        })
        .await;
    }

    /// Re-reads info and history. A no-op without a session.
    pub async fn refresh(&self, show_loading: bool) -> Result<(), WalletError> {
        if !self.service.is_connected().await {
            return Ok(());
        }
        if show_loading {
            self.update(|state| state.loading = true).await;
        }

        let fetched = async {
            let info = self.service.get_wallet_info().await?;
            let payments = self.service.list_payments().await?;
            anyhow::Ok((info, payments))
        }
        .await;

        match fetched {
            Ok((info, payments)) => {
                self.update(|state| {
                    if show_loading {
                        state.loading = false;
                    }
                    // A late result must not repopulate a closed session.
                    if !state.connected {
                        return;
                    }
                    state.info = Some(info);
                    state.payments = payments;
                    if state.error.as_deref() == Some(REFRESH_FAILED_MESSAGE) {
                        state.error = None;
                    }
                })
                .await;
                Ok(())
            }
            Err(err) => {
                warn!("wallet refresh failed: {err:#}");
                self.update(|state| {
                    if show_loading {
                        state.loading = false;
                    }
                    if state.connected {
                        state.error = Some(REFRESH_FAILED_MESSAGE.to_string());
                    }
                })
                .await;
                Err(WalletError::Fetch(REFRESH_FAILED_MESSAGE.to_string()))
            }
        }
    }

    /// Asks the engine to sync now; the resulting event refreshes the view.
    pub async fn sync_now(&self) -> Result<(), WalletError> {
        if !self.service.is_connected().await {
            return Err(WalletError::NotConnected);
        }
        if let Err(err) = self.service.sync().await {
            warn!("manual sync failed: {err:#}");
            return Err(WalletError::Fetch(engine_message(&err)));
        }
        Ok(())
    }

    fn spawn_event_task(
        self: &Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<SdkEvent>,
    ) -> JoinHandle<()> {
        let controller: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.handle_engine_event(event).await;
            }
        })
    }

    /// Handles one engine event to completion before the next is read.
    pub async fn handle_engine_event(&self, event: SdkEvent) {
        debug!(kind = event.kind(), "engine event");

        if let Some(notification) = notification_for(&event) {
            let _ = self.events.send(WalletEvent::Notification(notification));
        }

        let refresh = match &event {
            SdkEvent::Synced => {
                self.update(|state| state.restoring = false).await;
                true
            }
            SdkEvent::DataSynced {
                did_pull_new_records,
            } => *did_pull_new_records,
            SdkEvent::PaymentSucceeded { details } => {
                if details.payment_type == PaymentType::Receive {
                    self.dismiss_paid_invoice().await;
                }
                true
            }
            SdkEvent::PaymentPending { .. } | SdkEvent::PaymentWaitingConfirmation { .. } => {
                self.dismiss_paid_invoice().await;
                true
            }
            SdkEvent::PaymentFailed { .. }
            | SdkEvent::PaymentRefundable { .. }
            | SdkEvent::PaymentRefundPending { .. }
            | SdkEvent::PaymentRefunded { .. }
            | SdkEvent::PaymentWaitingFeeAcceptance { .. } => true,
        };

        if refresh {
            let _ = self.refresh(false).await;
        }
    }

    /// Closes a receive dialog that is showing an invoice. The caller refreshes.
    async fn dismiss_paid_invoice(&self) {
        self.update(|state| {
            if state
                .receive
                .as_ref()
                .is_some_and(ReceiveFlow::shows_invoice)
            {
                state.receive = None;
            }
        })
        .await;
    }

    fn spawn_fiat_poller(self: &Arc<Self>) -> JoinHandle<()> {
        let controller: Weak<Self> = Arc::downgrade(self);
        let period = self.fiat_poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.poll_fiat_rate().await;
            }
        })
    }

    async fn poll_fiat_rate(&self) {
        match self.service.fetch_fiat_rates().await {
            Ok(rates) => {
                let rate = rates
                    .iter()
                    .find(|rate| rate.coin.eq_ignore_ascii_case(&self.fiat_currency))
                    .map(|rate| rate.value);
                if rate.is_none() {
                    debug!(currency = %self.fiat_currency, "no fiat rate for configured currency");
                }
                self.update(|state| {
                    if state.connected {
                        state.fiat_rate = rate;
                    }
                })
                .await;
            }
            Err(err) => warn!("fiat rate fetch failed: {err:#}"),
        }
    }

    pub async fn open_send(&self) -> Option<FlowId> {
        let id = self.allocate_flow_id();
        self.update(|state| {
            if !state.connected {
                return None;
            }
            state.send = Some(SendFlow::new(id));
            Some(id)
        })
        .await
    }

    /// Parses and quotes the destination; the result lands on the same flow only.
    pub async fn submit_send_input(&self, flow_id: FlowId, text: &str) {
        let destination = self
            .update(|state| {
                state
                    .send_flow(flow_id)
                    .and_then(|flow| flow.submit_input(text))
            })
            .await;
        let Some(destination) = destination else {
            return;
        };

        let quote = self.quote_send(&destination).await;
        self.update(|state| {
            if let Some(flow) = state.send_flow(flow_id) {
                match quote {
                    Ok(quote) => flow.quoted(quote),
                    Err(message) => flow.fail_input(message),
                }
            }
        })
        .await;
    }

    async fn quote_send(&self, destination: &str) -> Result<SendQuote, String> {
        let input = self.service.parse_input(destination).await.map_err(|err| {
            debug!("destination rejected by parser: {err:#}");
            INVALID_INPUT_MESSAGE.to_string()
        })?;
        let request = prepare_request_for(destination, &input)?;
        let amount_sat = match &request.amount {
            Some(PayAmount::Bitcoin {
                receiver_amount_sat,
            }) => *receiver_amount_sat,
            _ => 0,
        };
        let response = self
            .service
            .prepare_send_payment(request)
            .await
            .map_err(|err| quote_failed_message(&engine_message(&err)))?;

        Ok(SendQuote {
            destination: destination.to_string(),
            amount_sat,
            fees_sat: response.fees_sat.unwrap_or(0),
            prepare_response: response,
        })
    }

    pub async fn send_back(&self, flow_id: FlowId) {
        self.update(|state| {
            if let Some(flow) = state.send_flow(flow_id) {
                flow.back();
            }
        })
        .await;
    }

    pub async fn confirm_send(&self, flow_id: FlowId) {
        let prepared = self
            .update(|state| state.send_flow(flow_id).and_then(SendFlow::confirm))
            .await;
        let Some(prepared) = prepared else {
            return;
        };

        let outcome = match self.service.send_payment(prepared).await {
            Ok(response) => {
                info!(amount_sat = response.payment.amount_sat, "payment submitted");
                SendOutcome::Success {
                    payment: response.payment,
                }
            }
            Err(err) => {
                warn!("payment failed: {err:#}");
                SendOutcome::Failure {
                    message: payment_failed_message(&engine_message(&err)),
                }
            }
        };

        self.update(|state| {
            if let Some(flow) = state.send_flow(flow_id) {
                flow.finish(outcome);
            }
        })
        .await;
    }

    pub async fn close_send(&self, flow_id: FlowId) {
        let closed = self
            .update(|state| {
                let open = state.send.as_ref().is_some_and(|flow| flow.id() == flow_id);
                if open {
                    state.send = None;
                }
                open
            })
            .await;
        if closed {
            let _ = self.refresh(false).await;
        }
    }

    pub async fn open_receive(&self, method: PaymentMethod) -> Option<FlowId> {
        let id = self.allocate_flow_id();
        let opened = self
            .update(|state| {
                if !state.connected {
                    return false;
                }
                state.receive = Some(ReceiveFlow::new(id, method));
                true
            })
            .await;
        if !opened {
            return None;
        }

        let limits = self.fetch_receive_limits(method).await;
        self.update(|state| {
            if let Some(flow) = state.receive_flow(id) {
                flow.limits_loaded(limits);
            }
        })
        .await;
        Some(id)
    }

    async fn fetch_receive_limits(&self, method: PaymentMethod) -> Result<ReceiveLimits, String> {
        let limits = match method {
            PaymentMethod::Lightning => self
                .service
                .fetch_lightning_limits()
                .await
                .map(|limits| limits.receive.into()),
            PaymentMethod::BitcoinAddress => self
                .service
                .fetch_onchain_limits()
                .await
                .map(|limits| limits.receive.into()),
            PaymentMethod::LiquidAddress => Ok(LIQUID_RECEIVE_LIMITS),
        };
        limits.map_err(|err| {
            warn!(method = method.label(), "failed to fetch receive limits: {err:#}");
            engine_message(&err)
        })
    }

    pub async fn generate_receive(&self, flow_id: FlowId, amount_text: &str, description: &str) {
        let request = self
            .update(|state| {
                state
                    .receive_flow(flow_id)
                    .and_then(|flow| flow.begin_generate(amount_text))
            })
            .await;
        let Some(request) = request else {
            return;
        };

        let generated = self.create_receive_request(request, description).await;
        self.update(|state| {
            if let Some(flow) = state.receive_flow(flow_id) {
                flow.generated(generated);
            }
        })
        .await;
    }

    async fn create_receive_request(
        &self,
        request: PrepareReceiveRequest,
        description: &str,
    ) -> Result<GeneratedRequest, String> {
        let amount_sat = match &request.amount {
            Some(ReceiveAmount::Bitcoin { payer_amount_sat }) => *payer_amount_sat,
            _ => 0,
        };
        let prepared = self
            .service
            .prepare_receive_payment(request)
            .await
            .map_err(|err| engine_message(&err))?;
        let fees_sat = prepared.fees_sat;
        let description = description.trim();
        let response = self
            .service
            .receive_payment(
                prepared,
                (!description.is_empty()).then(|| description.to_string()),
            )
            .await
            .map_err(|err| engine_message(&err))?;

        Ok(GeneratedRequest {
            destination: response.destination,
            fees_sat,
            amount_sat,
        })
    }

    pub async fn close_receive(&self, flow_id: FlowId) {
        let closed = self
            .update(|state| {
                let open = state
                    .receive
                    .as_ref()
                    .is_some_and(|flow| flow.id() == flow_id);
                if open {
                    state.receive = None;
                }
                open
            })
            .await;
        if closed {
            let _ = self.refresh(false).await;
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
