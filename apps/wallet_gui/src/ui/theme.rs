//! Colors and visuals for the wallet window.

use std::collections::BTreeMap;

use eframe::egui;
use wallet_core::{format::TxTone, notify::ToastKind};

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 153, 255);
pub const POSITIVE: egui::Color32 = egui::Color32::from_rgb(67, 181, 129);
pub const NEGATIVE: egui::Color32 = egui::Color32::from_rgb(237, 66, 69);
pub const PENDING: egui::Color32 = egui::Color32::from_rgb(250, 166, 26);
pub const MUTED_TEXT: egui::Color32 = egui::Color32::from_rgb(148, 155, 164);

const APP_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(18, 20, 26);
const CARD_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(28, 31, 39);
const CARD_STROKE: egui::Color32 = egui::Color32::from_rgb(48, 52, 63);

pub const MIN_TEXT_SCALE: f32 = 0.8;
pub const MAX_TEXT_SCALE: f32 = 1.4;

pub fn tone_color(tone: TxTone) -> egui::Color32 {
    match tone {
        TxTone::Positive => POSITIVE,
        TxTone::Negative => NEGATIVE,
        TxTone::Pending => PENDING,
    }
}

/// Fill and stroke for a toast card.
pub fn toast_colors(kind: ToastKind) -> (egui::Color32, egui::Stroke) {
    let accent = match kind {
        ToastKind::Success => POSITIVE,
        ToastKind::Error => NEGATIVE,
        ToastKind::Warning => PENDING,
        ToastKind::Info => ACCENT,
    };
    (
        lighten_color(APP_BACKGROUND, 0.08),
        egui::Stroke::new(1.5, accent),
    )
}

pub fn card_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(CARD_BACKGROUND)
        .stroke(egui::Stroke::new(1.0, CARD_STROKE))
        .corner_radius(12.0)
        .inner_margin(egui::Margin::same(14))
}

pub fn lighten_color(c: egui::Color32, t: f32) -> egui::Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |channel: u8| -> u8 {
        let channel = channel as f32;
        (channel + (255.0 - channel) * t).round().clamp(0.0, 255.0) as u8
    };
    egui::Color32::from_rgba_unmultiplied(mix(c.r()), mix(c.g()), mix(c.b()), c.a())
}

pub fn wallet_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = APP_BACKGROUND;
    visuals.window_fill = CARD_BACKGROUND;
    visuals.extreme_bg_color = lighten_color(APP_BACKGROUND, 0.03);
    visuals.faint_bg_color = CARD_BACKGROUND;
    visuals.window_stroke = egui::Stroke::new(1.0, CARD_STROKE);
    visuals.hyperlink_color = ACCENT;
    visuals.selection.bg_fill = ACCENT;
    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.hovered.bg_fill = ACCENT.gamma_multiply(0.85);
    visuals.window_corner_radius = egui::CornerRadius::same(12);
    visuals.menu_corner_radius = egui::CornerRadius::same(8);
    visuals
}

pub fn scaled_text_styles(text_scale: f32) -> BTreeMap<egui::TextStyle, egui::FontId> {
    let mut styles = egui::Style::default().text_styles;
    for font in styles.values_mut() {
        font.size *= text_scale;
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_are_distinguishable() {
        assert_ne!(tone_color(TxTone::Positive), tone_color(TxTone::Negative));
        assert_ne!(tone_color(TxTone::Pending), tone_color(TxTone::Negative));
    }

    #[test]
    fn lighten_moves_toward_white_and_keeps_alpha() {
        let base = egui::Color32::from_rgba_unmultiplied(0, 100, 200, 255);
        assert_eq!(lighten_color(base, 0.0), base);
        assert_eq!(lighten_color(base, 1.0), egui::Color32::WHITE);
        assert_eq!(lighten_color(base, 2.0), egui::Color32::WHITE);
    }

    #[test]
    fn error_toasts_use_negative_stroke() {
        let (_, stroke) = toast_colors(ToastKind::Error);
        assert_eq!(stroke.color, NEGATIVE);
    }
}
