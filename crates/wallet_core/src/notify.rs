use std::time::{Duration, Instant};

use shared::protocol::{Payment, PaymentType, SdkEvent};

use crate::format::format_sats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: ToastKind,
    pub title: String,
    pub detail: Option<String>,
}

impl Notification {
    pub fn new(kind: ToastKind, title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail,
        }
    }
}

fn rail_detail(payment: &Payment) -> String {
    format!("via {}", payment.details.rail().label())
}

/// The transient notice an engine event deserves, if any.
pub fn notification_for(event: &SdkEvent) -> Option<Notification> {
    match event {
        SdkEvent::PaymentSucceeded { details } => {
            let amount = format_sats(details.amount_sat);
            let title = match details.payment_type {
                PaymentType::Receive => format!("Payment Received: {amount} sats"),
                PaymentType::Send => format!("Payment Sent: {amount} sats"),
            };
            Some(Notification::new(
                ToastKind::Success,
                title,
                Some(rail_detail(details)),
            ))
        }
        SdkEvent::PaymentFailed { details } => Some(Notification::new(
            ToastKind::Error,
            "Payment Failed",
            Some(rail_detail(details)),
        )),
        SdkEvent::PaymentPending { details } | SdkEvent::PaymentWaitingConfirmation { details } => {
            Some(Notification::new(
                ToastKind::Info,
                format!("Payment Processing: {} sats", format_sats(details.amount_sat)),
                Some("Your payment is being processed...".to_string()),
            ))
        }
        SdkEvent::PaymentRefundable { details } => Some(Notification::new(
            ToastKind::Warning,
            "Payment Refundable",
            Some(format!(
                "{} sats can be refunded",
                format_sats(details.amount_sat)
            )),
        )),
        SdkEvent::PaymentRefundPending { details } => Some(Notification::new(
            ToastKind::Info,
            "Refund Pending",
            Some(rail_detail(details)),
        )),
        SdkEvent::PaymentRefunded { details } => Some(Notification::new(
            ToastKind::Info,
            "Payment Refunded",
            Some(format!("{} sats returned", format_sats(details.amount_sat))),
        )),
        SdkEvent::PaymentWaitingFeeAcceptance { details } => Some(Notification::new(
            ToastKind::Warning,
            "Fee Acceptance Required",
            Some(format!(
                "Fees changed for a {} sats payment",
                format_sats(details.amount_sat)
            )),
        )),
        SdkEvent::Synced | SdkEvent::DataSynced { .. } => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
    pub created_at: Instant,
}

/// Visible toasts, oldest first.
#[derive(Debug)]
pub struct ToastCenter {
    next_id: u64,
    lifetime: Duration,
    toasts: Vec<Toast>,
}

impl ToastCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            next_id: 1,
            lifetime,
            toasts: Vec::new(),
        }
    }

    pub fn push(&mut self, notification: Notification, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            notification,
            created_at: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.created_at) < lifetime);
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    /// Time until the oldest toast expires, for repaint scheduling.
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.toasts
            .iter()
            .map(|toast| {
                self.lifetime
                    .saturating_sub(now.saturating_duration_since(toast.created_at))
            })
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{PaymentDetails, PaymentState};

    fn payment(payment_type: PaymentType, details: PaymentDetails) -> Payment {
        Payment {
            destination: None,
            tx_id: None,
            timestamp: 0,
            amount_sat: 1_234,
            fees_sat: 0,
            swapper_fees_sat: None,
            payment_type,
            status: PaymentState::Pending,
            details,
        }
    }

    fn liquid() -> PaymentDetails {
        PaymentDetails::Liquid {
            destination: "el1".to_string(),
            description: String::new(),
            asset_id: "asset".to_string(),
            lnurl_info: None,
        }
    }

    #[test]
    fn received_payment_names_amount_and_rail() {
        let event = SdkEvent::PaymentSucceeded {
            details: payment(PaymentType::Receive, liquid()),
        };
        let notification = notification_for(&event).expect("notification");
        assert_eq!(notification.kind, ToastKind::Success);
        assert_eq!(notification.title, "Payment Received: 1,234 sats");
        assert_eq!(notification.detail.as_deref(), Some("via Liquid"));
    }

    #[test]
    fn sent_payment_uses_sent_title() {
        let event = SdkEvent::PaymentSucceeded {
            details: payment(PaymentType::Send, liquid()),
        };
        assert_eq!(
            notification_for(&event).expect("notification").title,
            "Payment Sent: 1,234 sats"
        );
    }

    #[test]
    fn pending_and_waiting_confirmation_share_processing_notice() {
        for event in [
            SdkEvent::PaymentPending {
                details: payment(PaymentType::Receive, liquid()),
            },
            SdkEvent::PaymentWaitingConfirmation {
                details: payment(PaymentType::Receive, liquid()),
            },
        ] {
            let notification = notification_for(&event).expect("notification");
            assert_eq!(notification.kind, ToastKind::Info);
            assert_eq!(notification.title, "Payment Processing: 1,234 sats");
            assert_eq!(
                notification.detail.as_deref(),
                Some("Your payment is being processed...")
            );
        }
    }

    #[test]
    fn sync_events_are_silent() {
        assert_eq!(notification_for(&SdkEvent::Synced), None);
        assert_eq!(
            notification_for(&SdkEvent::DataSynced {
                did_pull_new_records: true
            }),
            None
        );
    }

    #[test]
    fn toasts_expire_after_lifetime_and_ids_increase() {
        let start = Instant::now();
        let mut center = ToastCenter::new(Duration::from_secs(5));
        let first = center.push(
            Notification::new(ToastKind::Info, "one", None),
            start,
        );
        let second = center.push(
            Notification::new(ToastKind::Error, "two", None),
            start + Duration::from_secs(3),
        );
        assert!(second > first);

        center.expire(start + Duration::from_secs(5));
        assert_eq!(center.active().len(), 1);
        assert_eq!(center.active()[0].id, second);
        assert_eq!(
            center.next_expiry(start + Duration::from_secs(5)),
            Some(Duration::from_secs(3))
        );

        center.dismiss(second);
        assert!(center.active().is_empty());
        assert_eq!(center.next_expiry(start), None);
    }
}
