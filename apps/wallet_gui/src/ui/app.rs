//! App shell: event intake, persisted settings, and per-frame routing.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::protocol::PaymentMethod;
use wallet_core::{
    details::PaymentDetailsView, flows::FlowId, notify::ToastCenter, RecoveryPhrase, Screen,
    WalletSettings, WalletSnapshot,
};
use zeroize::Zeroizing;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

use super::{theme, widgets::QrMatrix};

pub const SETTINGS_STORAGE_KEY: &str = "wallet_gui.settings";

const IDLE_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedGuiSettings {
    pub show_btc_units: bool,
    pub hide_balance: bool,
    pub text_scale: f32,
    pub receive_method: PaymentMethod,
}

impl Default for PersistedGuiSettings {
    fn default() -> Self {
        Self {
            show_btc_units: false,
            hide_balance: false,
            text_scale: 1.0,
            receive_method: PaymentMethod::Lightning,
        }
    }
}

impl PersistedGuiSettings {
    fn sanitized(mut self) -> Self {
        self.text_scale = self
            .text_scale
            .clamp(theme::MIN_TEXT_SCALE, theme::MAX_TEXT_SCALE);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusBannerSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub(crate) struct StatusBanner {
    pub(crate) severity: StatusBannerSeverity,
    pub(crate) message: String,
}

pub struct WalletGuiApp {
    pub(crate) cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    pub(crate) snapshot: WalletSnapshot,
    pub(crate) toasts: ToastCenter,
    pub(crate) status: String,
    pub(crate) status_banner: Option<StatusBanner>,
    pub(crate) generated_phrase: Option<RecoveryPhrase>,
    pub(crate) phrase_acknowledged: bool,
    pub(crate) restore_input: Zeroizing<String>,
    pub(crate) send_input: String,
    pub(crate) receive_amount: String,
    pub(crate) receive_description: String,
    pub(crate) details: Option<PaymentDetailsView>,
    pub(crate) qr_cache: Option<(String, Result<QrMatrix, String>)>,
    pub(crate) list_scroll_offset: f32,
    pub(crate) settings: PersistedGuiSettings,
    applied_text_scale: Option<f32>,
    pub(crate) fiat_currency: String,
    pub(crate) network_label: &'static str,
}

impl WalletGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        wallet_settings: &WalletSettings,
        persisted_settings: Option<PersistedGuiSettings>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            snapshot: WalletSnapshot::default(),
            toasts: ToastCenter::new(wallet_settings.toast_duration),
            status: "Starting wallet...".to_string(),
            status_banner: None,
            generated_phrase: None,
            phrase_acknowledged: false,
            restore_input: Zeroizing::new(String::new()),
            send_input: String::new(),
            receive_amount: String::new(),
            receive_description: String::new(),
            details: None,
            qr_cache: None,
            list_scroll_offset: 0.0,
            settings: persisted_settings.unwrap_or_default().sanitized(),
            applied_text_scale: None,
            fiat_currency: wallet_settings.fiat_currency.clone(),
            network_label: wallet_settings.network.as_str(),
        }
    }

    pub(crate) fn dispatch(&mut self, cmd: BackendCommand) {
        if !dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Warning,
                message: self.status.clone(),
            });
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Snapshot(snapshot) => self.apply_snapshot(*snapshot),
                UiEvent::Notification(notification) => {
                    self.toasts.push(notification, Instant::now());
                }
                UiEvent::PhraseGenerated(phrase) => {
                    self.generated_phrase = Some(phrase);
                    self.phrase_acknowledged = false;
                }
                UiEvent::Error(err) => self.show_error(&err),
            }
        }
    }

    fn show_error(&mut self, err: &UiError) {
        tracing::warn!(
            category = ?err.category(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        if err.requires_reconnect() {
            self.status = "Connection lost; reconnect your wallet to continue".to_string();
        }
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: err.banner_text(),
        });
    }

    fn apply_snapshot(&mut self, next: WalletSnapshot) {
        let previous = std::mem::replace(&mut self.snapshot, next);

        if self.snapshot.error != previous.error {
            match &self.snapshot.error {
                Some(message) => {
                    self.status_banner = Some(StatusBanner {
                        severity: StatusBannerSeverity::Error,
                        message: message.clone(),
                    });
                }
                None => {
                    let cleared = previous.error.as_deref();
                    if self
                        .status_banner
                        .as_ref()
                        .is_some_and(|banner| Some(banner.message.as_str()) == cleared)
                    {
                        self.status_banner = None;
                    }
                }
            }
        }

        if self.snapshot.connected && !previous.connected {
            self.restore_input = Zeroizing::new(String::new());
            self.generated_phrase = None;
            self.status = "Wallet connected".to_string();
        }
        if !self.snapshot.connected && previous.connected {
            self.details = None;
            self.list_scroll_offset = 0.0;
            self.status = "Wallet disconnected".to_string();
        }
        // The phrase event can overtake the snapshot that opens the screen.
        if previous.screen == Screen::Generate && self.snapshot.screen != Screen::Generate {
            self.generated_phrase = None;
        }

        if flow_id_changed(
            previous.send.as_ref().map(|flow| flow.id()),
            self.snapshot.send.as_ref().map(|flow| flow.id()),
        ) {
            self.send_input.clear();
        }
        if flow_id_changed(
            previous.receive.as_ref().map(|flow| flow.id()),
            self.snapshot.receive.as_ref().map(|flow| flow.id()),
        ) {
            self.receive_amount.clear();
            self.receive_description.clear();
            self.qr_cache = None;
        }
    }

    /// Encodes at most once per distinct destination.
    pub(crate) fn qr_for(&mut self, destination: &str) -> &Result<QrMatrix, String> {
        let entry = match self.qr_cache.take() {
            Some((cached, matrix)) if cached == destination => (cached, matrix),
            _ => (destination.to_string(), QrMatrix::encode(destination)),
        };
        &self.qr_cache.insert(entry).1
    }

    fn apply_text_scale_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_text_scale == Some(self.settings.text_scale) {
            return;
        }
        ctx.set_visuals(theme::wallet_visuals());
        ctx.style_mut(|style| {
            style.text_styles = theme::scaled_text_styles(self.settings.text_scale);
        });
        self.applied_text_scale = Some(self.settings.text_scale);
    }

    pub(crate) fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
                StatusBannerSeverity::Warning => (
                    egui::Color32::from_rgb(110, 84, 36),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(190, 150, 70)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.toasts.expire(now);
        for id in super::widgets::show_toasts(ctx, self.toasts.active()) {
            self.toasts.dismiss(id);
        }
    }

    fn next_repaint(&self) -> Duration {
        self.toasts
            .next_expiry(Instant::now())
            .map_or(IDLE_REPAINT, |expiry| expiry.min(IDLE_REPAINT))
    }
}

fn flow_id_changed(previous: Option<FlowId>, next: Option<FlowId>) -> bool {
    next.is_some() && previous != next
}

impl eframe::App for WalletGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_text_scale_if_needed(ctx);

        match self.snapshot.screen {
            Screen::Home => self.show_home_screen(ctx),
            Screen::Restore => self.show_restore_screen(ctx),
            Screen::Generate => self.show_generate_screen(ctx),
            Screen::Wallet => self.show_wallet_screen(ctx),
        }

        if self.snapshot.screen == Screen::Wallet {
            self.show_send_dialog(ctx);
            self.show_receive_dialog(ctx);
            self.show_details_dialog(ctx);
        }
        self.show_toasts(ctx);

        ctx.request_repaint_after(self.next_repaint());
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use wallet_core::{
        flows::send::SendFlow,
        notify::{Notification, ToastKind},
    };

    fn app() -> (WalletGuiApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let app = WalletGuiApp::new(cmd_tx, ui_rx, &WalletSettings::default(), None);
        (app, cmd_rx, ui_tx)
    }

    fn snapshot(edit: impl FnOnce(&mut WalletSnapshot)) -> UiEvent {
        let mut snapshot = WalletSnapshot::default();
        edit(&mut snapshot);
        UiEvent::Snapshot(Box::new(snapshot))
    }

    #[test]
    fn persisted_settings_tolerate_missing_fields_and_clamp_scale() {
        let settings: PersistedGuiSettings =
            serde_json::from_str(r#"{"text_scale": 3.0}"#).expect("settings");
        let settings = settings.sanitized();
        assert_eq!(settings.text_scale, theme::MAX_TEXT_SCALE);
        assert_eq!(settings.receive_method, PaymentMethod::Lightning);
        assert!(!settings.show_btc_units);
    }

    #[test]
    fn controller_error_raises_and_clears_banner() {
        let (mut app, _cmd_rx, ui_tx) = app();
        ui_tx
            .try_send(snapshot(|s| s.error = Some("Failed to refresh wallet data.".into())))
            .expect("send");
        app.process_ui_events();
        assert_eq!(
            app.status_banner.as_ref().map(|banner| banner.message.as_str()),
            Some("Failed to refresh wallet data.")
        );

        ui_tx.try_send(snapshot(|_| {})).expect("send");
        app.process_ui_events();
        assert!(app.status_banner.is_none());
    }

    #[test]
    fn new_send_flow_starts_with_empty_input() {
        let (mut app, _cmd_rx, ui_tx) = app();
        app.send_input = "left over".to_string();
        ui_tx
            .try_send(snapshot(|s| s.send = Some(SendFlow::new(FlowId(4)))))
            .expect("send");
        app.process_ui_events();
        assert!(app.send_input.is_empty());

        app.send_input = "typing".to_string();
        ui_tx
            .try_send(snapshot(|s| s.send = Some(SendFlow::new(FlowId(4)))))
            .expect("send");
        app.process_ui_events();
        assert_eq!(app.send_input, "typing");
    }

    #[test]
    fn connecting_wipes_onboarding_secrets() {
        let (mut app, _cmd_rx, ui_tx) = app();
        app.restore_input = Zeroizing::new("abandon ".repeat(12));
        ui_tx
            .try_send(snapshot(|s| {
                s.connected = true;
                s.screen = Screen::Wallet;
            }))
            .expect("send");
        app.process_ui_events();
        assert!(app.restore_input.is_empty());
        assert!(app.generated_phrase.is_none());
    }

    #[test]
    fn notifications_become_toasts_and_shorten_repaint() {
        let (mut app, _cmd_rx, ui_tx) = app();
        assert_eq!(app.next_repaint(), IDLE_REPAINT);
        ui_tx
            .try_send(UiEvent::Notification(Notification::new(
                ToastKind::Success,
                "Payment Received: 10 sats",
                None,
            )))
            .expect("send");
        app.process_ui_events();
        assert_eq!(app.toasts.active().len(), 1);
        assert!(app.next_repaint() <= IDLE_REPAINT);
    }

    #[test]
    fn failed_dispatch_shows_warning_banner() {
        let (mut app, cmd_rx, _ui_tx) = app();
        drop(cmd_rx);
        app.dispatch(BackendCommand::Refresh);
        let banner = app.status_banner.expect("banner");
        assert_eq!(banner.severity, StatusBannerSeverity::Warning);
    }

    #[test]
    fn qr_is_reencoded_only_for_new_destination() {
        let (mut app, _cmd_rx, _ui_tx) = app();
        assert!(app.qr_for("el1qqfirst").is_ok());
        let first = app.qr_cache.clone();
        assert!(app.qr_for("el1qqfirst").is_ok());
        assert_eq!(app.qr_cache, first);
        assert!(app.qr_for("el1qqsecond").is_ok());
        assert_ne!(app.qr_cache, first);
    }
}
