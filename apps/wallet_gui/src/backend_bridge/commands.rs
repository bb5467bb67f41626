//! Backend commands queued from UI to backend worker.

use shared::protocol::PaymentMethod;
use wallet_core::{flows::FlowId, RecoveryPhrase, Screen};
use zeroize::Zeroizing;

pub enum BackendCommand {
    Navigate(Screen),
    GeneratePhrase,
    CreateWallet {
        phrase: RecoveryPhrase,
    },
    RestoreWallet {
        phrase_text: Zeroizing<String>,
    },
    Refresh,
    SyncNow,
    Disconnect,
    OpenSend,
    SubmitSendInput {
        flow_id: FlowId,
        text: String,
    },
    SendBack {
        flow_id: FlowId,
    },
    ConfirmSend {
        flow_id: FlowId,
    },
    CloseSend {
        flow_id: FlowId,
    },
    OpenReceive {
        method: PaymentMethod,
    },
    GenerateReceive {
        flow_id: FlowId,
        amount_text: String,
        description: String,
    },
    CloseReceive {
        flow_id: FlowId,
    },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::GeneratePhrase => "generate_phrase",
            Self::CreateWallet { .. } => "create_wallet",
            Self::RestoreWallet { .. } => "restore_wallet",
            Self::Refresh => "refresh",
            Self::SyncNow => "sync_now",
            Self::Disconnect => "disconnect",
            Self::OpenSend => "open_send",
            Self::SubmitSendInput { .. } => "submit_send_input",
            Self::SendBack { .. } => "send_back",
            Self::ConfirmSend { .. } => "confirm_send",
            Self::CloseSend { .. } => "close_send",
            Self::OpenReceive { .. } => "open_receive",
            Self::GenerateReceive { .. } => "generate_receive",
            Self::CloseReceive { .. } => "close_receive",
            Self::Shutdown => "shutdown",
        }
    }
}
