//! Display helpers for balances, history rows and the wallet header.

use shared::{
    domain::{Rail, SATS_PER_BTC},
    protocol::{Payment, PaymentState, PaymentType},
};

/// Scroll distance over which the wallet header collapses, in points.
pub const HEADER_COLLAPSE_DISTANCE: f32 = 100.0;

/// "1234567" -> "1,234,567".
pub fn format_sats(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_btc(amount_sat: u64) -> String {
    format!(
        "{}.{:08}",
        amount_sat / SATS_PER_BTC,
        amount_sat % SATS_PER_BTC
    )
}

pub fn fiat_value(amount_sat: u64, rate: f64) -> String {
    format!("{:.2}", amount_sat as f64 / SATS_PER_BTC as f64 * rate)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Relative age of a unix timestamp. Months are 30 days and years 365.
pub fn format_time_ago(now: i64, timestamp: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 86_400;
    const MONTH: i64 = 2_592_000;
    const YEAR: i64 = 31_536_000;

    let diff = (now - timestamp).max(0);
    if diff < MINUTE {
        format!("{diff} seconds ago")
    } else if diff < HOUR {
        plural(diff / MINUTE, "minute")
    } else if diff < DAY {
        plural(diff / HOUR, "hour")
    } else if diff < MONTH {
        plural(diff / DAY, "day")
    } else if diff < YEAR {
        plural(diff / MONTH, "month")
    } else {
        plural(diff / YEAR, "year")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxTone {
    Positive,
    Negative,
    Pending,
}

pub fn tx_tone(payment: &Payment) -> TxTone {
    match (payment.status, payment.payment_type) {
        (PaymentState::Failed | PaymentState::TimedOut, _) => TxTone::Negative,
        (PaymentState::Pending | PaymentState::Created, _) => TxTone::Pending,
        (_, PaymentType::Receive) => TxTone::Positive,
        (_, PaymentType::Send) => TxTone::Negative,
    }
}

pub fn tx_icon(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::Receive => "+",
        PaymentType::Send => "\u{2212}",
    }
}

/// "+ 1,500" for receives, "- 1,500" for sends.
pub fn signed_amount(payment: &Payment) -> String {
    let sign = match payment.payment_type {
        PaymentType::Receive => '+',
        PaymentType::Send => '-',
    };
    format!("{sign} {}", format_sats(payment.amount_sat))
}

pub fn tx_description(payment: &Payment) -> String {
    let description = payment.details.description().trim();
    if !description.is_empty() {
        return description.to_string();
    }
    match payment.details.rail() {
        Rail::Lightning => "Lightning Payment",
        Rail::Liquid => "Liquid Payment",
        Rail::Bitcoin => "Bitcoin Payment",
    }
    .to_string()
}

/// Header appearance for a given scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderLayout {
    pub progress: f32,
    pub pending_opacity: f32,
    pub balance_scale: f32,
}

pub fn header_layout(scroll_offset: f32) -> HeaderLayout {
    let progress = (scroll_offset / HEADER_COLLAPSE_DISTANCE).clamp(0.0, 1.0);
    let pending_opacity = (1.0 - progress * 2.0).max(0.0);
    let balance_scale = if progress <= 0.5 {
        1.0
    } else {
        (1.0 - (progress - 0.5)).max(0.8)
    };
    HeaderLayout {
        progress,
        pending_opacity,
        balance_scale,
    }
}
