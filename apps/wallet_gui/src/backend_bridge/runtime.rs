//! Backend worker thread: owns the tokio runtime and the wallet controller.

use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use storage::Storage;
use tokio::sync::broadcast::{self, error::RecvError};
use wallet_core::{
    EngineConnector, SimulatedConnector, WalletController, WalletError, WalletEvent,
    WalletSettings,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Knobs for the in-process regtest engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub starting_balance_sat: u64,
    pub settle_delay: Duration,
}

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: WalletSettings,
    engine: EngineOptions,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(run_backend(cmd_rx, ui_tx, settings, engine));
    })
}

async fn run_backend(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: WalletSettings,
    engine: EngineOptions,
) {
    let database_url = settings.database_url();
    let storage = match Storage::new(&database_url).await {
        Ok(storage) => storage,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: could not open wallet storage: {err:#}"),
            )));
            tracing::error!(database_url = %database_url, "failed to open wallet storage: {err:#}");
            return;
        }
    };

    let connector: Arc<dyn EngineConnector> = Arc::new(SimulatedConnector::new(
        engine.starting_balance_sat,
        engine.settle_delay,
    ));
    let controller = WalletController::new(connector, Arc::new(storage), &settings);
    let forwarder = tokio::spawn(forward_wallet_events(
        Arc::clone(&controller),
        controller.subscribe_events(),
        ui_tx.clone(),
    ));
    tracing::info!(
        network = settings.network.as_str(),
        data_dir = %settings.data_dir.display(),
        "backend worker ready"
    );
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

    {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.startup().await });
    }

    while let Ok(cmd) = cmd_rx.recv() {
        if matches!(cmd, BackendCommand::Shutdown) {
            break;
        }
        let controller = Arc::clone(&controller);
        let ui_tx = ui_tx.clone();
        tokio::spawn(async move { handle_command(&controller, cmd, &ui_tx).await });
    }

    controller.shutdown().await;
    forwarder.abort();
    tracing::info!("backend worker stopped");
}

async fn forward_wallet_events(
    controller: Arc<WalletController>,
    mut events: broadcast::Receiver<WalletEvent>,
    ui_tx: Sender<UiEvent>,
) {
    loop {
        let event = match events.recv().await {
            Ok(WalletEvent::StateChanged(snapshot)) => UiEvent::Snapshot(Box::new(snapshot)),
            Ok(WalletEvent::Notification(notification)) => UiEvent::Notification(notification),
            Err(RecvError::Lagged(skipped)) => {
                // Snapshots are whole-state, so the latest one covers the gap.
                tracing::warn!(skipped, "ui event forwarder lagged");
                UiEvent::Snapshot(Box::new(controller.snapshot().await))
            }
            Err(RecvError::Closed) => break,
        };
        let _ = ui_tx.try_send(event);
    }
}

async fn handle_command(
    controller: &Arc<WalletController>,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    let name = cmd.name();
    let result = match cmd {
        BackendCommand::Navigate(screen) => {
            controller.navigate(screen).await;
            Ok(())
        }
        BackendCommand::GeneratePhrase => match controller.generate_phrase().await {
            Ok(phrase) => {
                let _ = ui_tx.try_send(UiEvent::PhraseGenerated(phrase));
                Ok(())
            }
            Err(err) => Err((UiErrorContext::Onboarding, err)),
        },
        BackendCommand::CreateWallet { phrase } => controller
            .create_wallet(phrase)
            .await
            .map_err(|err| (UiErrorContext::Connect, err)),
        BackendCommand::RestoreWallet { phrase_text } => controller
            .restore_wallet(&phrase_text)
            .await
            .map_err(|err| (UiErrorContext::Connect, err)),
        BackendCommand::Refresh => controller
            .refresh(true)
            .await
            .map_err(|err| (UiErrorContext::Refresh, err)),
        BackendCommand::SyncNow => controller
            .sync_now()
            .await
            .map_err(|err| (UiErrorContext::Sync, err)),
        BackendCommand::Disconnect => controller
            .disconnect()
            .await
            .map_err(|err| (UiErrorContext::Disconnect, err)),
        BackendCommand::OpenSend => {
            controller.open_send().await;
            Ok(())
        }
        BackendCommand::SubmitSendInput { flow_id, text } => {
            controller.submit_send_input(flow_id, &text).await;
            Ok(())
        }
        BackendCommand::SendBack { flow_id } => {
            controller.send_back(flow_id).await;
            Ok(())
        }
        BackendCommand::ConfirmSend { flow_id } => {
            controller.confirm_send(flow_id).await;
            Ok(())
        }
        BackendCommand::CloseSend { flow_id } => {
            controller.close_send(flow_id).await;
            Ok(())
        }
        BackendCommand::OpenReceive { method } => {
            controller.open_receive(method).await;
            Ok(())
        }
        BackendCommand::GenerateReceive {
            flow_id,
            amount_text,
            description,
        } => {
            controller
                .generate_receive(flow_id, &amount_text, &description)
                .await;
            Ok(())
        }
        BackendCommand::CloseReceive { flow_id } => {
            controller.close_receive(flow_id).await;
            Ok(())
        }
        BackendCommand::Shutdown => {
            controller.shutdown().await;
            Ok(())
        }
    };

    if let Err((context, err)) = result {
        if shown_in_snapshot(&err) {
            tracing::debug!(command = name, "command failed: {err}");
        } else {
            tracing::warn!(command = name, "command failed: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_wallet_error(context, &err)));
        }
    }
}

/// Connect, phrase and refresh failures already carry their banner text in
/// the next snapshot.
fn shown_in_snapshot(err: &WalletError) -> bool {
    match err {
        WalletError::Connection(_) | WalletError::Validation(_) => true,
        WalletError::Fetch(message) => message == wallet_core::error::REFRESH_FAILED_MESSAGE,
        WalletError::NotConnected | WalletError::Storage(_) => false,
    }
}
