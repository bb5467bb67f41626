use std::sync::{
    atomic::{AtomicBool, AtomicUsize},
    Mutex as StdMutex,
};

use async_trait::async_trait;
use shared::{
    error::EngineError,
    protocol::{
        BlockchainInfo, ConnectRequest, InputType, LightningPaymentLimitsResponse,
        Limits, LiquidAddressData, ListPaymentsRequest, LnInvoice, Network,
        OnchainPaymentLimitsResponse, PaymentDetails, PaymentState, PrepareReceiveResponse,
        PrepareSendRequest, PrepareSendResponse, Rate, ReceivePaymentRequest,
        ReceivePaymentResponse, SendDestination, SendPaymentRequest, SendPaymentResponse,
        WalletInfo,
    },
};

use super::*;
use crate::{
    engine::WalletEngine,
    flows::{
        receive::ReceiveStep,
        send::{SendStep, MISSING_INVOICE_AMOUNT_MESSAGE},
    },
    notify::ToastKind,
    store::MemoryPhraseStore,
};

const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[derive(Default)]
struct Recorder {
    connects: AtomicUsize,
    get_info: AtomicUsize,
    list_payments: AtomicUsize,
    prepare_send: AtomicUsize,
    fiat_requests: AtomicUsize,
    listeners_added: AtomicUsize,
    listeners_active: AtomicUsize,
    disconnects: AtomicUsize,
    fail_connect: AtomicBool,
    fail_info: AtomicBool,
    fail_limits: AtomicBool,
    listener: StdMutex<Option<Arc<dyn EventListener>>>,
    parse_result: StdMutex<Option<InputType>>,
}

impl Recorder {
    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn emit(&self, event: SdkEvent) {
        let listener = self.listener.lock().expect("listener lock").clone();
        listener.expect("no engine listener registered").on_event(event);
    }
}

struct TestConnector {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl EngineConnector for TestConnector {
    async fn connect(&self, request: ConnectRequest) -> Result<Arc<dyn WalletEngine>> {
        Recorder::bump(&self.recorder.connects);
        assert!(request.mnemonic.is_some());
        if self.recorder.fail_connect.load(Ordering::SeqCst) {
            return Err(EngineError::invalid_input("invalid mnemonic").into());
        }
        Ok(Arc::new(TestEngine {
            recorder: Arc::clone(&self.recorder),
        }))
    }
}

struct TestEngine {
    recorder: Arc<Recorder>,
}

fn test_payment(payment_type: PaymentType) -> Payment {
    Payment {
        destination: None,
        tx_id: Some("tx-1".to_string()),
        timestamp: 1_700_000_000,
        amount_sat: 5_000,
        fees_sat: 12,
        swapper_fees_sat: None,
        payment_type,
        status: PaymentState::Pending,
        details: PaymentDetails::Lightning {
            swap_id: "swap-1".to_string(),
            description: String::new(),
            liquid_expiration_blockheight: 100,
            preimage: None,
            invoice: None,
            bolt12_offer: None,
            payment_hash: None,
            destination_pubkey: None,
            lnurl_info: None,
            claim_tx_id: None,
            refund_tx_id: None,
            refund_tx_amount_sat: None,
        },
    }
}

fn liquid_input(amount_sat: Option<u64>) -> InputType {
    InputType::LiquidAddress {
        address: LiquidAddressData {
            address: "el1qqtest".to_string(),
            network: Network::Regtest,
            asset_id: None,
            amount: None,
            amount_sat,
            label: None,
            message: None,
        },
    }
}

const TEST_LIMITS: Limits = Limits {
    min_sat: 1_000,
    max_sat: 100_000,
    max_zero_conf_sat: 0,
};

#[async_trait]
impl WalletEngine for TestEngine {
    async fn get_info(&self) -> Result<GetInfoResponse> {
        Recorder::bump(&self.recorder.get_info);
        if self.recorder.fail_info.load(Ordering::SeqCst) {
            return Err(EngineError::new(shared::error::EngineErrorCode::Network, "offline").into());
        }
        Ok(GetInfoResponse {
            wallet_info: WalletInfo {
                balance_sat: 1_000,
                pending_send_sat: 0,
                pending_receive_sat: 0,
                fingerprint: "abcd".to_string(),
                pubkey: "02ff".to_string(),
                asset_balances: Vec::new(),
            },
            blockchain_info: BlockchainInfo {
                liquid_tip: 1,
                bitcoin_tip: 1,
            },
        })
    }

    async fn list_payments(&self, _request: ListPaymentsRequest) -> Result<Vec<Payment>> {
        Recorder::bump(&self.recorder.list_payments);
        Ok(Vec::new())
    }

    async fn parse(&self, _input: &str) -> Result<InputType> {
        self.recorder
            .parse_result
            .lock()
            .expect("parse lock")
            .clone()
            .ok_or_else(|| EngineError::invalid_input("unrecognized").into())
    }

    async fn prepare_send_payment(&self, request: PrepareSendRequest) -> Result<PrepareSendResponse> {
        Recorder::bump(&self.recorder.prepare_send);
        let amount_sat = match request.amount {
            Some(PayAmount::Bitcoin {
                receiver_amount_sat,
            }) => receiver_amount_sat,
            _ => 0,
        };
        let InputType::LiquidAddress { mut address } = liquid_input(Some(amount_sat)) else {
            unreachable!("liquid_input builds a liquid address");
        };
        address.amount_sat = Some(amount_sat);
        Ok(PrepareSendResponse {
            destination: SendDestination::LiquidAddress {
                address_data: address,
                bip353_address: None,
            },
            fees_sat: Some(26),
            estimated_asset_fees: None,
        })
    }

    async fn send_payment(&self, _request: SendPaymentRequest) -> Result<SendPaymentResponse> {
        Ok(SendPaymentResponse {
            payment: test_payment(PaymentType::Send),
        })
    }

    async fn prepare_receive_payment(
        &self,
        request: PrepareReceiveRequest,
    ) -> Result<PrepareReceiveResponse> {
        Ok(PrepareReceiveResponse {
            payment_method: request.payment_method,
            amount: request.amount,
            fees_sat: 12,
            min_payer_amount_sat: None,
            max_payer_amount_sat: None,
            swapper_feerate: None,
        })
    }

    async fn receive_payment(
        &self,
        _request: ReceivePaymentRequest,
    ) -> Result<ReceivePaymentResponse> {
        Ok(ReceivePaymentResponse {
            destination: "lnbcrt50u1ptest".to_string(),
        })
    }

    async fn fetch_lightning_limits(&self) -> Result<LightningPaymentLimitsResponse> {
        if self.recorder.fail_limits.load(Ordering::SeqCst) {
            return Err(EngineError::new(shared::error::EngineErrorCode::Network, "offline").into());
        }
        Ok(LightningPaymentLimitsResponse {
            send: TEST_LIMITS,
            receive: TEST_LIMITS,
        })
    }

    async fn fetch_onchain_limits(&self) -> Result<OnchainPaymentLimitsResponse> {
        Ok(OnchainPaymentLimitsResponse {
            send: TEST_LIMITS,
            receive: TEST_LIMITS,
        })
    }

    async fn fetch_fiat_rates(&self) -> Result<Vec<Rate>> {
        Recorder::bump(&self.recorder.fiat_requests);
        Ok(vec![
            Rate {
                coin: "EUR".to_string(),
                value: 45_000.0,
            },
            Rate {
                coin: "USD".to_string(),
                value: 50_000.0,
            },
        ])
    }

    async fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> Result<ListenerId> {
        Recorder::bump(&self.recorder.listeners_added);
        Recorder::bump(&self.recorder.listeners_active);
        *self.recorder.listener.lock().expect("listener lock") = Some(listener);
        Ok(ListenerId("listener-1".to_string()))
    }

    async fn remove_event_listener(&self, _id: &ListenerId) -> Result<()> {
        self.recorder.listeners_active.fetch_sub(1, Ordering::SeqCst);
        self.recorder.listener.lock().expect("listener lock").take();
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        Recorder::bump(&self.recorder.disconnects);
        Ok(())
    }
}

struct Harness {
    controller: Arc<WalletController>,
    recorder: Arc<Recorder>,
    store: Arc<MemoryPhraseStore>,
}

fn harness_with_store(store: MemoryPhraseStore) -> Harness {
    let recorder = Arc::new(Recorder::default());
    let store = Arc::new(store);
    let settings = WalletSettings {
        fiat_poll_interval: Duration::from_secs(30),
        ..WalletSettings::default()
    };
    let controller = WalletController::new(
        Arc::new(TestConnector {
            recorder: Arc::clone(&recorder),
        }),
        store.clone(),
        &settings,
    );
    Harness {
        controller,
        recorder,
        store,
    }
}

fn harness() -> Harness {
    harness_with_store(MemoryPhraseStore::default())
}

fn phrase() -> RecoveryPhrase {
    RecoveryPhrase::parse(PHRASE).expect("valid phrase")
}

/// Lets spawned tasks drain. With a paused clock this returns only once the
/// runtime has nothing else to do.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

fn drain(rx: &mut broadcast::Receiver<WalletEvent>) -> Vec<WalletEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn connected_harness() -> Harness {
    let harness = harness();
    harness
        .controller
        .create_wallet(phrase())
        .await
        .expect("connect");
    settle().await;
    harness
}

#[tokio::test(start_paused = true)]
async fn stored_phrase_connects_once_before_wallet_screen() {
    let harness = harness_with_store(MemoryPhraseStore::with_phrase(phrase()));
    let mut rx = harness.controller.subscribe_events();

    harness.controller.startup().await;

    assert_eq!(Recorder::count(&harness.recorder.connects), 1);
    let snapshots: Vec<WalletSnapshot> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            WalletEvent::StateChanged(snapshot) => Some(snapshot),
            WalletEvent::Notification(_) => None,
        })
        .collect();
    let first_wallet = snapshots
        .iter()
        .position(|snapshot| snapshot.screen == Screen::Wallet)
        .expect("wallet screen reached");
    assert!(snapshots[..first_wallet].iter().any(|snapshot| snapshot.loading));

    let snapshot = harness.controller.snapshot().await;
    assert!(snapshot.connected);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.info.map(|info| info.wallet_info.balance_sat), Some(1_000));
}

#[tokio::test(start_paused = true)]
async fn failed_reconnect_clears_stored_phrase() {
    let harness = harness_with_store(MemoryPhraseStore::with_phrase(phrase()));
    harness.recorder.fail_connect.store(true, Ordering::SeqCst);

    harness.controller.startup().await;

    let snapshot = harness.controller.snapshot().await;
    assert_eq!(snapshot.screen, Screen::Home);
    assert_eq!(snapshot.error.as_deref(), Some(SAVED_PHRASE_FAILED_MESSAGE));
    assert!(!snapshot.loading);
    assert!(harness.store.load_phrase().await.expect("load").is_none());
}

#[tokio::test(start_paused = true)]
async fn startup_without_phrase_lands_on_home() {
    let harness = harness();
    harness.controller.startup().await;
    assert_eq!(Recorder::count(&harness.recorder.connects), 0);
    assert_eq!(harness.controller.snapshot().await.screen, Screen::Home);
}

#[tokio::test(start_paused = true)]
async fn exactly_one_listener_while_connected() {
    let harness = connected_harness().await;
    assert_eq!(Recorder::count(&harness.recorder.listeners_active), 1);
    assert!(harness.store.load_phrase().await.expect("load").is_some());

    // Reconnecting tears the first session down before opening the next.
    harness
        .controller
        .create_wallet(phrase())
        .await
        .expect("reconnect");
    assert_eq!(Recorder::count(&harness.recorder.listeners_added), 2);
    assert_eq!(Recorder::count(&harness.recorder.listeners_active), 1);
    assert_eq!(Recorder::count(&harness.recorder.disconnects), 1);

    harness.controller.disconnect().await.expect("disconnect");
    assert_eq!(Recorder::count(&harness.recorder.listeners_active), 0);
    assert_eq!(Recorder::count(&harness.recorder.disconnects), 2);
    assert!(harness.store.load_phrase().await.expect("load").is_none());

    let snapshot = harness.controller.snapshot().await;
    assert_eq!(snapshot.screen, Screen::Home);
    assert!(!snapshot.connected);
    assert!(snapshot.info.is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_keeps_stored_phrase() {
    let harness = connected_harness().await;
    harness.controller.shutdown().await;
    assert_eq!(Recorder::count(&harness.recorder.listeners_active), 0);
    assert!(harness.store.load_phrase().await.expect("load").is_some());
}

#[tokio::test(start_paused = true)]
async fn synced_event_triggers_one_silent_refresh() {
    let harness = connected_harness().await;
    let info_before = Recorder::count(&harness.recorder.get_info);
    let payments_before = Recorder::count(&harness.recorder.list_payments);
    let mut rx = harness.controller.subscribe_events();

    harness.recorder.emit(SdkEvent::Synced);
    settle().await;

    assert_eq!(Recorder::count(&harness.recorder.get_info), info_before + 1);
    assert_eq!(Recorder::count(&harness.recorder.list_payments), payments_before + 1);
    let events = drain(&mut rx);
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| match event {
        WalletEvent::StateChanged(snapshot) => !snapshot.loading,
        WalletEvent::Notification(_) => false,
    }));
}

#[tokio::test(start_paused = true)]
async fn data_synced_without_new_records_is_ignored() {
    let harness = connected_harness().await;
    let info_before = Recorder::count(&harness.recorder.get_info);

    harness.recorder.emit(SdkEvent::DataSynced {
        did_pull_new_records: false,
    });
    settle().await;
    assert_eq!(Recorder::count(&harness.recorder.get_info), info_before);

    harness.recorder.emit(SdkEvent::DataSynced {
        did_pull_new_records: true,
    });
    settle().await;
    assert_eq!(Recorder::count(&harness.recorder.get_info), info_before + 1);
}

#[tokio::test(start_paused = true)]
async fn wrong_word_count_never_reaches_engine() {
    let harness = harness();
    let result = harness.controller.restore_wallet("one two three").await;

    assert!(matches!(result, Err(WalletError::Validation(_))));
    assert_eq!(Recorder::count(&harness.recorder.connects), 0);
    assert_eq!(
        harness.controller.snapshot().await.restore_error.as_deref(),
        Some(INVALID_PHRASE_MESSAGE)
    );
}

#[tokio::test(start_paused = true)]
async fn restore_flag_clears_on_first_sync() {
    let harness = harness();
    harness
        .controller
        .restore_wallet(&PHRASE.to_uppercase())
        .await
        .expect("restore");
    assert!(harness.controller.snapshot().await.restoring);

    harness.recorder.emit(SdkEvent::Synced);
    settle().await;
    assert!(!harness.controller.snapshot().await.restoring);
}

#[tokio::test(start_paused = true)]
async fn failure_after_engine_opened_closes_session() {
    let harness = harness();
    harness.recorder.fail_info.store(true, Ordering::SeqCst);

    let result = harness.controller.create_wallet(phrase()).await;

    assert!(matches!(result, Err(WalletError::Connection(_))));
    assert_eq!(Recorder::count(&harness.recorder.disconnects), 1);
    assert_eq!(Recorder::count(&harness.recorder.listeners_active), 0);
    let snapshot = harness.controller.snapshot().await;
    assert_eq!(snapshot.error.as_deref(), Some(CONNECT_FAILED_MESSAGE));
    assert_eq!(snapshot.screen, Screen::Home);
    assert!(!snapshot.connected);
    assert!(!snapshot.loading);
}

#[tokio::test(start_paused = true)]
async fn refresh_failure_keeps_stale_snapshot() {
    let harness = connected_harness().await;
    harness.recorder.fail_info.store(true, Ordering::SeqCst);

    let result = harness.controller.refresh(true).await;

    assert!(matches!(result, Err(WalletError::Fetch(_))));
    let snapshot = harness.controller.snapshot().await;
    assert!(snapshot.info.is_some());
    assert!(!snapshot.loading);
    assert_eq!(snapshot.error.as_deref(), Some(REFRESH_FAILED_MESSAGE));
}

#[tokio::test(start_paused = true)]
async fn refresh_without_session_does_nothing() {
    let harness = harness();
    harness.controller.refresh(true).await.expect("no-op");
    assert_eq!(Recorder::count(&harness.recorder.get_info), 0);
}

#[tokio::test(start_paused = true)]
async fn invoice_without_amount_blocks_confirmation() {
    let harness = connected_harness().await;
    *harness.recorder.parse_result.lock().expect("parse lock") = Some(InputType::Bolt11 {
        invoice: LnInvoice {
            bolt11: "lnbcrt1ptest".to_string(),
            network: Network::Regtest,
            payee_pubkey: "02aa".to_string(),
            payment_hash: "00".to_string(),
            description: None,
            amount_msat: None,
            timestamp: 0,
            expiry: 3_600,
            min_final_cltv_expiry_delta: 18,
        },
    });

    let flow_id = harness.controller.open_send().await.expect("send dialog");
    harness
        .controller
        .submit_send_input(flow_id, "lnbcrt1ptest")
        .await;

    let snapshot = harness.controller.snapshot().await;
    let flow = snapshot.send.expect("flow open");
    assert_eq!(
        flow.step(),
        &SendStep::Input {
            error: Some(MISSING_INVOICE_AMOUNT_MESSAGE.to_string()),
            pending: false
        }
    );
    assert_eq!(Recorder::count(&harness.recorder.prepare_send), 0);
}

#[tokio::test(start_paused = true)]
async fn send_flow_quotes_and_completes() {
    let harness = connected_harness().await;
    *harness.recorder.parse_result.lock().expect("parse lock") = Some(liquid_input(Some(2_000)));

    let flow_id = harness.controller.open_send().await.expect("send dialog");
    harness
        .controller
        .submit_send_input(flow_id, "liquidnetwork:el1qqtest?amount=0.00002")
        .await;
    match harness.controller.snapshot().await.send.expect("flow").step() {
        SendStep::Confirm(quote) => {
            assert_eq!(quote.amount_sat, 2_000);
            assert_eq!(quote.fees_sat, 26);
            assert_eq!(quote.total_sat(), 2_026);
        }
        other => panic!("expected confirm step, got {other:?}"),
    }

    harness.controller.confirm_send(flow_id).await;
    assert!(matches!(
        harness.controller.snapshot().await.send.expect("flow").step(),
        SendStep::Result(SendOutcome::Success { .. })
    ));

    let info_before = Recorder::count(&harness.recorder.get_info);
    harness.controller.close_send(flow_id).await;
    assert!(harness.controller.snapshot().await.send.is_none());
    assert_eq!(Recorder::count(&harness.recorder.get_info), info_before + 1);
}

#[tokio::test(start_paused = true)]
async fn results_for_a_closed_dialog_are_dropped() {
    let harness = connected_harness().await;
    *harness.recorder.parse_result.lock().expect("parse lock") = Some(liquid_input(Some(2_000)));

    let stale = harness.controller.open_send().await.expect("first dialog");
    harness.controller.close_send(stale).await;
    let current = harness.controller.open_send().await.expect("second dialog");
    assert_ne!(stale, current);

    harness.controller.submit_send_input(stale, "el1qqtest").await;
    let flow = harness.controller.snapshot().await.send.expect("flow");
    assert_eq!(flow.id(), current);
    assert_eq!(
        flow.step(),
        &SendStep::Input {
            error: None,
            pending: false
        }
    );
}

#[tokio::test(start_paused = true)]
async fn pending_event_closes_invoice_and_notifies() {
    let harness = connected_harness().await;
    let flow_id = harness
        .controller
        .open_receive(PaymentMethod::Lightning)
        .await
        .expect("receive dialog");
    harness
        .controller
        .generate_receive(flow_id, "5000", "coffee")
        .await;
    let flow = harness.controller.snapshot().await.receive.expect("flow");
    match flow.step() {
        ReceiveStep::Invoice(request) => {
            assert_eq!(request.destination, "lnbcrt50u1ptest");
            assert_eq!(
                request.fee_note().as_deref(),
                Some("A fee of 12 sats is applied to this invoice.")
            );
        }
        other => panic!("expected invoice step, got {other:?}"),
    }

    let info_before = Recorder::count(&harness.recorder.get_info);
    let mut rx = harness.controller.subscribe_events();
    harness.recorder.emit(SdkEvent::PaymentPending {
        details: test_payment(PaymentType::Receive),
    });
    settle().await;

    assert!(harness.controller.snapshot().await.receive.is_none());
    assert_eq!(Recorder::count(&harness.recorder.get_info), info_before + 1);
    let notification = drain(&mut rx)
        .into_iter()
        .find_map(|event| match event {
            WalletEvent::Notification(notification) => Some(notification),
            WalletEvent::StateChanged(_) => None,
        })
        .expect("processing notification");
    assert_eq!(notification.kind, ToastKind::Info);
    assert_eq!(notification.title, "Payment Processing: 5,000 sats");
}

#[tokio::test(start_paused = true)]
async fn receive_amount_outside_limits_stays_on_input() {
    let harness = connected_harness().await;
    let flow_id = harness
        .controller
        .open_receive(PaymentMethod::Lightning)
        .await
        .expect("receive dialog");

    harness.controller.generate_receive(flow_id, "10", "").await;

    let flow = harness.controller.snapshot().await.receive.expect("flow");
    assert_eq!(flow.step(), &ReceiveStep::Input);
    assert_eq!(
        flow.error(),
        Some("Amount must be between 1000 and 100000 sats")
    );
}

#[tokio::test(start_paused = true)]
async fn limits_failure_uses_fallback_range() {
    let harness = connected_harness().await;
    harness.recorder.fail_limits.store(true, Ordering::SeqCst);

    harness
        .controller
        .open_receive(PaymentMethod::Lightning)
        .await
        .expect("receive dialog");

    let flow = harness.controller.snapshot().await.receive.expect("flow");
    assert_eq!(flow.step(), &ReceiveStep::Input);
    assert_eq!(flow.limits().max_sat, 1_000_000);
    assert_eq!(
        flow.error(),
        Some(crate::flows::receive::LIMITS_FAILED_MESSAGE)
    );
}

#[tokio::test(start_paused = true)]
async fn fiat_rate_polls_on_interval_until_disconnect() {
    let harness = connected_harness().await;
    assert_eq!(Recorder::count(&harness.recorder.fiat_requests), 1);
    assert_eq!(harness.controller.snapshot().await.fiat_rate, Some(50_000.0));

    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(Recorder::count(&harness.recorder.fiat_requests), 2);

    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(Recorder::count(&harness.recorder.fiat_requests), 3);

    harness.controller.disconnect().await.expect("disconnect");
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(Recorder::count(&harness.recorder.fiat_requests), 3);
    assert_eq!(harness.controller.snapshot().await.fiat_rate, None);
}

#[tokio::test(start_paused = true)]
async fn dialogs_need_a_session() {
    let harness = harness();
    assert_eq!(harness.controller.open_send().await, None);
    assert_eq!(
        harness.controller.open_receive(PaymentMethod::Lightning).await,
        None
    );
}

#[tokio::test(start_paused = true)]
async fn navigation_clears_errors_and_guards_wallet_screen() {
    let harness = harness();
    let _ = harness.controller.restore_wallet("one two three").await;
    assert!(harness.controller.snapshot().await.restore_error.is_some());

    harness.controller.navigate(Screen::Wallet).await;
    assert_eq!(harness.controller.snapshot().await.screen, Screen::Home);

    harness.controller.navigate(Screen::Restore).await;
    let snapshot = harness.controller.snapshot().await;
    assert_eq!(snapshot.screen, Screen::Restore);
    assert!(snapshot.restore_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn generated_phrase_is_not_stored_until_created() {
    let harness = harness();
    let generated = harness.controller.generate_phrase().await.expect("phrase");

    assert_eq!(generated.word_count(), 24);
    assert_eq!(harness.controller.snapshot().await.screen, Screen::Generate);
    assert!(harness.store.load_phrase().await.expect("load").is_none());
    assert_eq!(Recorder::count(&harness.recorder.connects), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_sync_needs_a_session() {
    let harness = harness();
    assert!(matches!(
        harness.controller.sync_now().await,
        Err(WalletError::NotConnected)
    ));

    let harness = connected_harness().await;
    harness.controller.sync_now().await.expect("sync");
}

#[tokio::test(start_paused = true)]
async fn failed_reconnect_drops_the_previous_session() {
    let harness = connected_harness().await;
    assert!(harness.controller.snapshot().await.fiat_rate.is_some());
    harness.recorder.fail_connect.store(true, Ordering::SeqCst);

    let result = harness.controller.create_wallet(phrase()).await;

    assert!(matches!(result, Err(WalletError::Connection(_))));
    assert_eq!(Recorder::count(&harness.recorder.listeners_active), 0);
    let snapshot = harness.controller.snapshot().await;
    assert!(!snapshot.connected);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.screen, Screen::Home);
    assert!(snapshot.info.is_none());
    assert!(snapshot.payments.is_empty());
    assert_eq!(snapshot.fiat_rate, None);
    assert_eq!(snapshot.error.as_deref(), Some(CONNECT_FAILED_MESSAGE));
    assert_eq!(harness.controller.open_send().await, None);
}

#[tokio::test(start_paused = true)]
async fn refresh_failing_after_disconnect_raises_no_banner() {
    let harness = connected_harness().await;
    harness.recorder.fail_info.store(true, Ordering::SeqCst);
    // The engine is still attached but the snapshot was already reset, as
    // when a disconnect lands while a silent refresh is in flight.
    harness
        .controller
        .update(|state| *state = WalletSnapshot::default())
        .await;

    let result = harness.controller.refresh(false).await;

    assert!(matches!(result, Err(WalletError::Fetch(_))));
    let snapshot = harness.controller.snapshot().await;
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.screen, Screen::Home);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn first_fiat_rate_is_kept_on_multi_thread_runtime() {
    for _ in 0..50 {
        let harness = harness();
        harness
            .controller
            .create_wallet(phrase())
            .await
            .expect("connect");

        let mut rate = None;
        for _ in 0..200 {
            rate = harness.controller.snapshot().await.fiat_rate;
            if rate.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert_eq!(rate, Some(50_000.0));
        assert_eq!(Recorder::count(&harness.recorder.fiat_requests), 1);
        harness.controller.shutdown().await;
    }
}
