//! Small reusable widgets: QR codes, toasts, copy buttons.

use arboard::Clipboard;
use eframe::egui;
use qrcode::{Color, QrCode};
use wallet_core::notify::Toast;

use super::theme;

/// Modules of white border around the code, per the QR quiet zone rule.
const QUIET_ZONE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(data: &str) -> Result<Self, String> {
        let code = QrCode::new(data.as_bytes()).map_err(|err| err.to_string())?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();
        Ok(Self { width, dark })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }
}

pub fn qr_code(ui: &mut egui::Ui, matrix: &QrMatrix, side: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
    if !ui.is_rect_visible(rect) {
        return response;
    }
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 6.0, egui::Color32::WHITE);

    let modules = matrix.width() + QUIET_ZONE * 2;
    let module = side / modules as f32;
    for y in 0..matrix.width() {
        for x in 0..matrix.width() {
            if matrix.is_dark(x, y) {
                let min = rect.min
                    + egui::vec2(
                        (x + QUIET_ZONE) as f32 * module,
                        (y + QUIET_ZONE) as f32 * module,
                    );
                // Slight overlap hides hairline seams between modules.
                let cell = egui::Rect::from_min_size(min, egui::vec2(module + 0.5, module + 0.5));
                painter.rect_filled(cell, 0.0, egui::Color32::BLACK);
            }
        }
    }
    response
}

/// Copies through the OS clipboard, falling back to egui's own.
pub fn copy_text(ctx: &egui::Context, text: &str) {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => {}
        Err(err) => {
            tracing::debug!("system clipboard unavailable, using egui clipboard: {err}");
            ctx.copy_text(text.to_string());
        }
    }
}

pub fn copy_button(ui: &mut egui::Ui, text: &str) -> bool {
    let clicked = ui.small_button("Copy").on_hover_text("Copy to clipboard").clicked();
    if clicked {
        copy_text(ui.ctx(), text);
    }
    clicked
}

/// Draws active toasts bottom-right. Returns the ids the user dismissed.
pub fn show_toasts(ctx: &egui::Context, toasts: &[Toast]) -> Vec<u64> {
    let mut dismissed = Vec::new();
    if toasts.is_empty() {
        return dismissed;
    }

    egui::Area::new(egui::Id::new("wallet_toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_max_width(300.0);
            for toast in toasts {
                let (fill, stroke) = theme::toast_colors(toast.notification.kind);
                egui::Frame::NONE
                    .fill(fill)
                    .stroke(stroke)
                    .corner_radius(8.0)
                    .inner_margin(egui::Margin::symmetric(10, 8))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.label(
                                    egui::RichText::new(&toast.notification.title)
                                        .strong()
                                        .color(egui::Color32::WHITE),
                                );
                                if let Some(detail) = &toast.notification.detail {
                                    ui.label(egui::RichText::new(detail).color(theme::MUTED_TEXT));
                                }
                            });
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                                if ui.small_button("\u{2715}").clicked() {
                                    dismissed.push(toast.id);
                                }
                            });
                        });
                    });
                ui.add_space(6.0);
            }
        });
    dismissed
}

pub fn busy_row(ui: &mut egui::Ui, label: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(label);
    });
}

pub fn error_label(ui: &mut egui::Ui, message: &str) {
    ui.label(egui::RichText::new(message).color(theme::NEGATIVE));
}
