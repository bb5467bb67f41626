use chrono::{DateTime, Local, TimeZone};
use shared::protocol::{Payment, PaymentDetails};

use crate::format::{format_sats, signed_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    SwapId,
    Invoice,
    Preimage,
    DestinationPubkey,
    TxId,
    Destination,
    AssetId,
}

impl DetailField {
    pub fn label(self) -> &'static str {
        match self {
            Self::SwapId => "Swap ID",
            Self::Invoice => "Invoice",
            Self::Preimage => "Payment Preimage",
            Self::DestinationPubkey => "Destination Public Key",
            Self::TxId => "Transaction ID",
            Self::Destination => "Destination",
            Self::AssetId => "Asset ID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsibleField {
    pub field: DetailField,
    pub value: String,
    pub visible: bool,
}

/// Everything the payment details dialog renders, hidden fields collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetailsView {
    pub amount: String,
    pub fee: String,
    pub date_time: String,
    pub status: String,
    pub fields: Vec<CollapsibleField>,
}

impl PaymentDetailsView {
    pub fn new(payment: &Payment) -> Self {
        Self::with_zone(payment, &Local)
    }

    pub fn with_zone<Tz: TimeZone>(payment: &Payment, zone: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut fields = Vec::new();
        let mut push = |field: DetailField, value: Option<&String>| {
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                fields.push(CollapsibleField {
                    field,
                    value: value.clone(),
                    visible: false,
                });
            }
        };

        match &payment.details {
            PaymentDetails::Lightning {
                swap_id,
                invoice,
                preimage,
                destination_pubkey,
                ..
            } => {
                push(DetailField::SwapId, Some(swap_id));
                push(DetailField::Invoice, invoice.as_ref());
                push(DetailField::Preimage, preimage.as_ref());
                push(DetailField::DestinationPubkey, destination_pubkey.as_ref());
                push(DetailField::TxId, payment.tx_id.as_ref());
            }
            PaymentDetails::Liquid {
                destination,
                asset_id,
                ..
            } => {
                push(DetailField::TxId, payment.tx_id.as_ref());
                push(DetailField::Destination, Some(destination));
                push(DetailField::AssetId, Some(asset_id));
            }
            PaymentDetails::Bitcoin { swap_id, .. } => {
                push(DetailField::TxId, payment.tx_id.as_ref());
                push(DetailField::SwapId, Some(swap_id));
            }
        }

        Self {
            amount: format!("{} sats", signed_amount(payment)),
            fee: format!("{} sats", format_sats(payment.fees_sat)),
            date_time: format_date_time(payment.timestamp, zone),
            status: payment.status.label().to_string(),
            fields,
        }
    }

    pub fn toggle(&mut self, field: DetailField) {
        if let Some(entry) = self.fields.iter_mut().find(|entry| entry.field == field) {
            entry.visible = !entry.visible;
        }
    }

    pub fn is_visible(&self, field: DetailField) -> bool {
        self.fields
            .iter()
            .any(|entry| entry.field == field && entry.visible)
    }
}

fn format_date_time<Tz: TimeZone>(timestamp: i64, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc
            .with_timezone(zone)
            .format("%B %-d, %Y, %H:%M:%S")
            .to_string(),
        None => "Unknown".to_string(),
    }
}
