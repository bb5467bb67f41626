//! Send, receive and payment-detail windows drawn over the wallet screen.

use eframe::egui;
use wallet_core::{
    details::DetailField,
    flows::{
        receive::ReceiveStep,
        send::{SendOutcome, SendStep},
    },
    format::format_sats,
};

use crate::backend_bridge::commands::BackendCommand;

use super::{
    app::WalletGuiApp,
    screens::amount_label,
    theme,
    widgets::{busy_row, copy_button, error_label, qr_code},
};

const DIALOG_WIDTH: f32 = 360.0;
const QR_SIDE: f32 = 240.0;

fn dialog_window<'open>(title: &str) -> egui::Window<'open> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(DIALOG_WIDTH)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

fn summary_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.label(egui::RichText::new(label).color(theme::MUTED_TEXT));
    ui.label(egui::RichText::new(value).strong());
    ui.end_row();
}

/// Shortens long invoices and addresses to head and tail.
pub(crate) fn abbreviate(text: &str, keep: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= keep * 2 + 3 {
        return text.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}

impl WalletGuiApp {
    pub(crate) fn show_send_dialog(&mut self, ctx: &egui::Context) {
        let Some(flow) = self.snapshot.send.clone() else {
            return;
        };
        let flow_id = flow.id();
        let btc_units = self.settings.show_btc_units;
        let mut open = true;
        let mut command = None;

        dialog_window("Send Payment")
            .open(&mut open)
            .show(ctx, |ui| match flow.step() {
                SendStep::Input { error, pending } => {
                    ui.label("Paste an invoice, offer or address");
                    ui.add_enabled(
                        !pending,
                        egui::TextEdit::multiline(&mut self.send_input)
                            .id_salt("send_destination")
                            .hint_text("lnbc... / lq1... / bitcoin:...")
                            .desired_rows(3)
                            .desired_width(f32::INFINITY),
                    );
                    if let Some(message) = error {
                        error_label(ui, message);
                    }
                    ui.add_space(8.0);
                    if *pending {
                        busy_row(ui, "Estimating fee...");
                    } else if ui.button("Continue").clicked() {
                        command = Some(BackendCommand::SubmitSendInput {
                            flow_id,
                            text: self.send_input.clone(),
                        });
                    }
                }
                SendStep::Confirm(quote) => {
                    egui::Grid::new("send_confirm_summary")
                        .num_columns(2)
                        .spacing([16.0, 6.0])
                        .show(ui, |ui| {
                            summary_row(ui, "To", &abbreviate(&quote.destination, 14));
                            summary_row(ui, "Amount", &amount_label(quote.amount_sat, btc_units));
                            summary_row(ui, "Fee", &amount_label(quote.fees_sat, btc_units));
                            summary_row(ui, "Total", &amount_label(quote.total_sat(), btc_units));
                        });
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Back").clicked() {
                            command = Some(BackendCommand::SendBack { flow_id });
                        }
                        if ui.button("Confirm Payment").clicked() {
                            command = Some(BackendCommand::ConfirmSend { flow_id });
                        }
                    });
                }
                SendStep::Processing(quote) => {
                    busy_row(
                        ui,
                        &format!(
                            "Sending {}...",
                            amount_label(quote.amount_sat, btc_units)
                        ),
                    );
                }
                SendStep::Result(SendOutcome::Success { payment }) => {
                    ui.label(
                        egui::RichText::new("Payment sent")
                            .size(18.0)
                            .strong()
                            .color(theme::POSITIVE),
                    );
                    ui.label(format!(
                        "{} plus {} sats in fees",
                        amount_label(payment.amount_sat, btc_units),
                        format_sats(payment.fees_sat)
                    ));
                    ui.add_space(8.0);
                    if ui.button("Done").clicked() {
                        command = Some(BackendCommand::CloseSend { flow_id });
                    }
                }
                SendStep::Result(SendOutcome::Failure { message }) => {
                    error_label(ui, message);
                    ui.add_space(8.0);
                    if ui.button("Close").clicked() {
                        command = Some(BackendCommand::CloseSend { flow_id });
                    }
                }
            });

        if !open {
            command = Some(BackendCommand::CloseSend { flow_id });
        }
        if let Some(command) = command {
            self.dispatch(command);
        }
    }

    pub(crate) fn show_receive_dialog(&mut self, ctx: &egui::Context) {
        let Some(flow) = self.snapshot.receive.clone() else {
            return;
        };
        let flow_id = flow.id();
        let mut open = true;
        let mut command = None;
        let title = format!("Receive via {}", flow.method().label());

        dialog_window(&title)
            .id(egui::Id::new("receive_dialog"))
            .open(&mut open)
            .show(ctx, |ui| {
                match flow.step() {
                    ReceiveStep::LoadingLimits => busy_row(ui, "Loading limits..."),
                    ReceiveStep::Input => {
                        let limits = flow.limits();
                        ui.label(
                            egui::RichText::new(format!(
                                "Min {} sats \u{b7} Max {} sats",
                                format_sats(limits.min_sat),
                                format_sats(limits.max_sat)
                            ))
                            .color(theme::MUTED_TEXT),
                        );
                        ui.add_space(4.0);
                        ui.label("Amount (sats)");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.receive_amount)
                                .id_salt("receive_amount")
                                .hint_text("e.g. 10000")
                                .desired_width(f32::INFINITY),
                        );
                        ui.label("Description");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.receive_description)
                                .id_salt("receive_description")
                                .hint_text("optional")
                                .desired_width(f32::INFINITY),
                        );
                        if let Some(message) = flow.error() {
                            error_label(ui, message);
                        }
                        ui.add_space(8.0);
                        if ui.button("Generate").clicked() {
                            command = Some(BackendCommand::GenerateReceive {
                                flow_id,
                                amount_text: self.receive_amount.clone(),
                                description: self.receive_description.clone(),
                            });
                        }
                    }
                    ReceiveStep::Generating => busy_row(ui, "Generating request..."),
                    ReceiveStep::Invoice(request) => {
                        ui.vertical_centered(|ui| {
                            match self.qr_for(&request.destination) {
                                Ok(matrix) => {
                                    qr_code(ui, matrix, QR_SIDE);
                                }
                                Err(reason) => {
                                    tracing::warn!("could not render payment request as QR: {reason}");
                                    error_label(ui, "QR code unavailable for this request");
                                }
                            }
                            ui.add_space(6.0);
                            ui.label(format!("{} sats", format_sats(request.amount_sat)));
                        });
                        ui.add_space(6.0);
                        ui.horizontal_wrapped(|ui| {
                            ui.label(
                                egui::RichText::new(abbreviate(&request.destination, 20))
                                    .monospace(),
                            );
                            copy_button(ui, &request.destination);
                        });
                        if let Some(note) = request.fee_note() {
                            ui.label(egui::RichText::new(note).color(theme::PENDING));
                        }
                        ui.label(
                            egui::RichText::new("Waiting for payment...")
                                .small()
                                .color(theme::MUTED_TEXT),
                        );
                    }
                }
            });

        if !open {
            command = Some(BackendCommand::CloseReceive { flow_id });
        }
        if let Some(command) = command {
            self.dispatch(command);
        }
    }

    pub(crate) fn show_details_dialog(&mut self, ctx: &egui::Context) {
        let Some(view) = self.details.as_ref() else {
            return;
        };
        let mut open = true;
        let mut toggled: Option<DetailField> = None;

        dialog_window("Payment Details")
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new("payment_details_summary")
                    .num_columns(2)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        summary_row(ui, "Amount", &view.amount);
                        summary_row(ui, "Fee", &view.fee);
                        summary_row(ui, "Date", &view.date_time);
                        summary_row(ui, "Status", &view.status);
                    });
                ui.add_space(8.0);
                ui.separator();
                for entry in &view.fields {
                    let label = entry.field.label();
                    let action = if entry.visible { "Hide" } else { "Show" };
                    if ui.button(format!("{action} {label}")).clicked() {
                        toggled = Some(entry.field);
                    }
                    if entry.visible {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(egui::RichText::new(&entry.value).monospace().small());
                            copy_button(ui, &entry.value);
                        });
                    }
                    ui.add_space(4.0);
                }
            });

        if !open {
            self.details = None;
        } else if let (Some(field), Some(view)) = (toggled, self.details.as_mut()) {
            view.toggle(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_left_alone() {
        assert_eq!(abbreviate("el1qq", 4), "el1qq");
        assert_eq!(abbreviate("abcdefghijk", 4), "abcdefghijk");
    }

    #[test]
    fn long_text_keeps_head_and_tail() {
        assert_eq!(abbreviate("lnbcrt500u1pabcdefghijklmnop", 6), "lnbcrt...klmnop");
    }
}
