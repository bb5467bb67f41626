//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL_MESSAGE: &str = "UI command queue is full; please retry";
pub const BACKEND_GONE_MESSAGE: &str =
    "Backend command processor disconnected (possible startup/runtime failure); restart the wallet";

/// Queues `cmd` without blocking the frame. Returns whether it was accepted;
/// on failure `status` carries the reason.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend queue full");
            *status = QUEUE_FULL_MESSAGE.to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = BACKEND_GONE_MESSAGE.to_string();
            false
        }
    }
}
