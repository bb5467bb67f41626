//! Onboarding and wallet screens.

use eframe::egui;
use shared::protocol::{Payment, PaymentMethod, PaymentType};
use wallet_core::{
    details::PaymentDetailsView,
    format::{
        fiat_value, format_btc, format_sats, format_time_ago, header_layout, signed_amount,
        tx_description, tx_icon, tx_tone,
    },
    Screen,
};
use zeroize::Zeroizing;

use crate::backend_bridge::commands::BackendCommand;

use super::{
    app::WalletGuiApp,
    theme,
    widgets::{busy_row, error_label},
};

const ONBOARDING_WIDTH: f32 = 380.0;
const BALANCE_TEXT_SIZE: f32 = 32.0;
const HIDDEN_BALANCE: &str = "\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}";

pub(crate) fn amount_label(amount_sat: u64, btc_units: bool) -> String {
    if btc_units {
        format!("{} BTC", format_btc(amount_sat))
    } else {
        format!("{} sats", format_sats(amount_sat))
    }
}

fn payment_amount_label(payment: &Payment, btc_units: bool) -> String {
    if !btc_units {
        return format!("{} sats", signed_amount(payment));
    }
    let sign = match payment.payment_type {
        PaymentType::Receive => '+',
        PaymentType::Send => '-',
    };
    format!("{sign} {} BTC", format_btc(payment.amount_sat))
}

enum PhraseAction {
    Back,
    Regenerate,
    Create,
}

impl WalletGuiApp {
    fn onboarding_header(&self, ui: &mut egui::Ui, title: &str, subtitle: &str) {
        let top_space = (ui.available_height() * 0.1).clamp(12.0, 80.0);
        ui.add_space(top_space);
        ui.heading(egui::RichText::new(title).size(26.0).strong());
        ui.label(egui::RichText::new(subtitle).color(theme::MUTED_TEXT));
        ui.add_space(18.0);
    }

    pub(crate) fn show_home_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.vertical_centered(|ui| {
                ui.set_max_width(ONBOARDING_WIDTH);
                let subtitle = format!(
                    "Lightning and Liquid payments on {}",
                    self.network_label
                );
                self.onboarding_header(ui, "Liquid Wallet", &subtitle);

                if self.snapshot.loading {
                    busy_row(ui, "Connecting to your wallet...");
                    return;
                }

                let button_size = [ONBOARDING_WIDTH * 0.75, 40.0];
                if ui
                    .add_sized(button_size, egui::Button::new("Create New Wallet"))
                    .clicked()
                {
                    self.dispatch(BackendCommand::GeneratePhrase);
                }
                ui.add_space(8.0);
                if ui
                    .add_sized(button_size, egui::Button::new("Restore Existing Wallet"))
                    .clicked()
                {
                    self.dispatch(BackendCommand::Navigate(Screen::Restore));
                }
                ui.add_space(18.0);
                ui.label(egui::RichText::new(&self.status).small().color(theme::MUTED_TEXT));
            });
        });
    }

    pub(crate) fn show_restore_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.vertical_centered(|ui| {
                ui.set_max_width(ONBOARDING_WIDTH);
                self.onboarding_header(
                    ui,
                    "Restore Wallet",
                    "Enter your 12 or 24-word recovery phrase.",
                );
            });

            let busy = self.snapshot.loading;
            ui.add_enabled(
                !busy,
                egui::TextEdit::multiline(&mut *self.restore_input)
                    .id_salt("restore_phrase")
                    .hint_text("word1 word2 word3 ...")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );
            if let Some(message) = self.snapshot.restore_error.clone() {
                error_label(ui, &message);
            }
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Back")).clicked() {
                    self.restore_input = Zeroizing::new(String::new());
                    self.dispatch(BackendCommand::Navigate(Screen::Home));
                }
                let ready = !busy && !self.restore_input.trim().is_empty();
                if ui.add_enabled(ready, egui::Button::new("Restore")).clicked() {
                    let phrase_text = Zeroizing::new(self.restore_input.to_string());
                    self.dispatch(BackendCommand::RestoreWallet { phrase_text });
                }
            });
            if busy {
                busy_row(ui, "Restoring wallet...");
            }
        });
    }

    pub(crate) fn show_generate_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.vertical_centered(|ui| {
                ui.set_max_width(ONBOARDING_WIDTH);
                self.onboarding_header(
                    ui,
                    "Your Recovery Phrase",
                    "Write these words down in order and keep them somewhere safe. \
                     Anyone with this phrase can spend your funds.",
                );
            });

            let Some(phrase) = self.generated_phrase.as_ref() else {
                busy_row(ui, "Generating phrase...");
                return;
            };

            theme::card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                egui::Grid::new("recovery_phrase_words")
                    .num_columns(3)
                    .spacing([18.0, 8.0])
                    .show(ui, |ui| {
                        for (index, word) in phrase.words().iter().enumerate() {
                            ui.label(egui::RichText::new(format!("{:>2}. {word}", index + 1)).monospace());
                            if (index + 1) % 3 == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });
            ui.add_space(10.0);
            ui.checkbox(
                &mut self.phrase_acknowledged,
                "I have written down my recovery phrase",
            );
            ui.add_space(10.0);

            let busy = self.snapshot.loading;
            let mut action = None;
            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Back")).clicked() {
                    action = Some(PhraseAction::Back);
                }
                if ui.add_enabled(!busy, egui::Button::new("New Phrase")).clicked() {
                    action = Some(PhraseAction::Regenerate);
                }
                let ready = !busy && self.phrase_acknowledged;
                if ui.add_enabled(ready, egui::Button::new("Create Wallet")).clicked() {
                    action = Some(PhraseAction::Create);
                }
            });
            if busy {
                busy_row(ui, "Creating wallet...");
            }

            match action {
                Some(PhraseAction::Back) => {
                    self.generated_phrase = None;
                    self.dispatch(BackendCommand::Navigate(Screen::Home));
                }
                Some(PhraseAction::Regenerate) => self.dispatch(BackendCommand::GeneratePhrase),
                Some(PhraseAction::Create) => {
                    if let Some(phrase) = self.generated_phrase.clone() {
                        self.dispatch(BackendCommand::CreateWallet { phrase });
                    }
                }
                None => {}
            }
        });
    }

    pub(crate) fn show_wallet_screen(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("wallet_top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Wallet");
                ui.label(egui::RichText::new(self.network_label).color(theme::MUTED_TEXT));
                if self.snapshot.loading {
                    ui.spinner();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Disconnect").clicked() {
                        self.dispatch(BackendCommand::Disconnect);
                    }
                    if ui.button("Sync").on_hover_text("Ask the engine to sync now").clicked() {
                        self.dispatch(BackendCommand::SyncNow);
                    }
                    if ui.button("Refresh").clicked() {
                        self.dispatch(BackendCommand::Refresh);
                    }
                    ui.menu_button("View", |ui| {
                        ui.checkbox(&mut self.settings.show_btc_units, "Show amounts in BTC");
                        ui.checkbox(&mut self.settings.hide_balance, "Hide balance");
                        ui.add(
                            egui::Slider::new(
                                &mut self.settings.text_scale,
                                theme::MIN_TEXT_SCALE..=theme::MAX_TEXT_SCALE,
                            )
                            .text("Text size"),
                        );
                    });
                });
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("wallet_status_bar").show(ctx, |ui| {
            let tip = self
                .snapshot
                .info
                .as_ref()
                .map(|info| {
                    format!(
                        "Liquid tip {} \u{b7} Bitcoin tip {}",
                        info.blockchain_info.liquid_tip, info.blockchain_info.bitcoin_tip
                    )
                })
                .unwrap_or_default();
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.status).small().color(theme::MUTED_TEXT));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(tip).small().color(theme::MUTED_TEXT));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            if self.snapshot.restoring {
                busy_row(ui, "Restoring wallet, waiting for the first sync...");
                ui.add_space(6.0);
            }
            self.show_balance_header(ui);
            ui.add_space(10.0);
            self.show_payment_actions(ui);
            ui.add_space(12.0);
            self.show_transactions(ui);
        });
    }

    fn show_balance_header(&self, ui: &mut egui::Ui) {
        let layout = header_layout(self.list_scroll_offset);
        let wallet_info = self.snapshot.info.as_ref().map(|info| &info.wallet_info);
        let balance = wallet_info.map_or(0, |info| info.balance_sat);
        let btc_units = self.settings.show_btc_units;
        let hidden = self.settings.hide_balance;

        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Balance").color(theme::MUTED_TEXT));
                let balance_text = if hidden {
                    HIDDEN_BALANCE.to_string()
                } else {
                    amount_label(balance, btc_units)
                };
                ui.label(
                    egui::RichText::new(balance_text)
                        .size(BALANCE_TEXT_SIZE * layout.balance_scale * self.settings.text_scale)
                        .strong(),
                );
                if let (Some(rate), false) = (self.snapshot.fiat_rate, hidden) {
                    ui.label(
                        egui::RichText::new(format!(
                            "\u{2248} {} {}",
                            fiat_value(balance, rate),
                            self.fiat_currency
                        ))
                        .color(theme::MUTED_TEXT),
                    );
                }

                let Some(info) = wallet_info else {
                    return;
                };
                if layout.pending_opacity <= 0.0 || hidden {
                    return;
                }
                let faded = |color: egui::Color32| color.gamma_multiply(layout.pending_opacity);
                if info.pending_receive_sat > 0 {
                    ui.label(
                        egui::RichText::new(format!(
                            "Pending receive: +{}",
                            amount_label(info.pending_receive_sat, btc_units)
                        ))
                        .color(faded(theme::POSITIVE)),
                    );
                }
                if info.pending_send_sat > 0 {
                    ui.label(
                        egui::RichText::new(format!(
                            "Pending send: -{}",
                            amount_label(info.pending_send_sat, btc_units)
                        ))
                        .color(faded(theme::NEGATIVE)),
                    );
                }
            });
        });
    }

    fn show_payment_actions(&mut self, ui: &mut egui::Ui) {
        ui.columns(2, |columns| {
            let width = columns[0].available_width();
            if columns[0]
                .add_sized([width, 36.0], egui::Button::new("Send"))
                .clicked()
            {
                self.dispatch(BackendCommand::OpenSend);
            }

            columns[1].horizontal(|ui| {
                let combo_width = (ui.available_width() * 0.5).max(90.0);
                egui::ComboBox::from_id_salt("receive_method")
                    .width(combo_width)
                    .selected_text(self.settings.receive_method.label())
                    .show_ui(ui, |ui| {
                        for method in [
                            PaymentMethod::Lightning,
                            PaymentMethod::BitcoinAddress,
                            PaymentMethod::LiquidAddress,
                        ] {
                            ui.selectable_value(
                                &mut self.settings.receive_method,
                                method,
                                method.label(),
                            );
                        }
                    });
                let width = ui.available_width();
                if ui
                    .add_sized([width, 36.0], egui::Button::new("Receive"))
                    .clicked()
                {
                    self.dispatch(BackendCommand::OpenReceive {
                        method: self.settings.receive_method,
                    });
                }
            });
        });
    }

    fn show_transactions(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Transactions").strong());
        ui.add_space(4.0);
        if self.snapshot.payments.is_empty() {
            ui.label(egui::RichText::new("No transactions yet").color(theme::MUTED_TEXT));
            self.list_scroll_offset = 0.0;
            return;
        }

        let now = chrono::Utc::now().timestamp();
        let btc_units = self.settings.show_btc_units;
        let payments = &self.snapshot.payments;
        let output = egui::ScrollArea::vertical()
            .id_salt("transactions")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let mut opened = None;
                for payment in payments {
                    let color = theme::tone_color(tx_tone(payment));
                    let response = egui::Frame::NONE
                        .fill(ui.visuals().faint_bg_color)
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(tx_icon(payment.payment_type))
                                        .size(20.0)
                                        .strong()
                                        .color(color),
                                );
                                ui.vertical(|ui| {
                                    ui.label(tx_description(payment));
                                    ui.label(
                                        egui::RichText::new(format_time_ago(now, payment.timestamp))
                                            .small()
                                            .color(theme::MUTED_TEXT),
                                    );
                                });
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        ui.label(
                                            egui::RichText::new(payment_amount_label(
                                                payment, btc_units,
                                            ))
                                            .color(color),
                                        );
                                    },
                                );
                            });
                        })
                        .response
                        .interact(egui::Sense::click())
                        .on_hover_cursor(egui::CursorIcon::PointingHand);
                    if response.clicked() {
                        opened = Some(PaymentDetailsView::new(payment));
                    }
                    ui.add_space(4.0);
                }
                opened
            });

        self.list_scroll_offset = output.state.offset.y;
        if let Some(view) = output.inner {
            self.details = Some(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{PaymentDetails, PaymentState};

    fn sent(amount_sat: u64) -> Payment {
        Payment {
            destination: None,
            tx_id: None,
            timestamp: 0,
            amount_sat,
            fees_sat: 0,
            swapper_fees_sat: None,
            payment_type: PaymentType::Send,
            status: PaymentState::Complete,
            details: PaymentDetails::Liquid {
                destination: "el1".to_string(),
                description: String::new(),
                asset_id: "asset".to_string(),
                lnurl_info: None,
            },
        }
    }

    #[test]
    fn amounts_switch_units() {
        assert_eq!(amount_label(1_234_567, false), "1,234,567 sats");
        assert_eq!(amount_label(1_234_567, true), "0.01234567 BTC");
    }

    #[test]
    fn payment_rows_keep_sign_in_both_units() {
        assert_eq!(payment_amount_label(&sent(2_500), false), "- 2,500 sats");
        assert_eq!(payment_amount_label(&sent(2_500), true), "- 0.00002500 BTC");
    }
}
