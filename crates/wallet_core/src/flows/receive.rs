//! Receive dialog: limits, amount entry, generation, invoice display.

use shared::protocol::{Limits, PaymentMethod, PrepareReceiveRequest, ReceiveAmount};

use super::FlowId;

pub const LIMITS_FAILED_MESSAGE: &str = "Failed to fetch payment limits. Please try again.";

/// Bounds used until the engine reports real limits, and after it fails to.
pub const FALLBACK_LIMITS: ReceiveLimits = ReceiveLimits {
    min_sat: 1,
    max_sat: 1_000_000,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveLimits {
    pub min_sat: u64,
    pub max_sat: u64,
}

impl From<Limits> for ReceiveLimits {
    fn from(value: Limits) -> Self {
        Self {
            min_sat: value.min_sat,
            max_sat: value.max_sat,
        }
    }
}

impl ReceiveLimits {
    pub fn out_of_range_message(&self) -> String {
        format!(
            "Amount must be between {} and {} sats",
            self.min_sat, self.max_sat
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRequest {
    pub destination: String,
    pub fees_sat: u64,
    pub amount_sat: u64,
}

impl GeneratedRequest {
    pub fn fee_note(&self) -> Option<String> {
        (self.fees_sat > 0)
            .then(|| format!("A fee of {} sats is applied to this invoice.", self.fees_sat))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveStep {
    LoadingLimits,
    Input,
    Generating,
    Invoice(GeneratedRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveFlow {
    id: FlowId,
    method: PaymentMethod,
    limits: ReceiveLimits,
    error: Option<String>,
    step: ReceiveStep,
}

impl ReceiveFlow {
    pub fn new(id: FlowId, method: PaymentMethod) -> Self {
        Self {
            id,
            method,
            limits: FALLBACK_LIMITS,
            error: None,
            step: ReceiveStep::LoadingLimits,
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn limits(&self) -> ReceiveLimits {
        self.limits
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn step(&self) -> &ReceiveStep {
        &self.step
    }

    pub fn shows_invoice(&self) -> bool {
        matches!(self.step, ReceiveStep::Invoice(_))
    }

    /// A failed lookup still moves to input, on fallback limits.
    pub fn limits_loaded(&mut self, limits: Result<ReceiveLimits, String>) {
        if self.step != ReceiveStep::LoadingLimits {
            return;
        }
        match limits {
            Ok(limits) => {
                self.limits = limits;
                self.error = None;
            }
            Err(_) => {
                self.limits = FALLBACK_LIMITS;
                self.error = Some(LIMITS_FAILED_MESSAGE.to_string());
            }
        }
        self.step = ReceiveStep::Input;
    }

    pub fn validate_amount(&self, text: &str) -> Result<u64, String> {
        match text.trim().parse::<u64>() {
            Ok(amount) if amount >= self.limits.min_sat && amount <= self.limits.max_sat => {
                Ok(amount)
            }
            _ => Err(self.limits.out_of_range_message()),
        }
    }

    /// Validates and moves to generating. `None` leaves the flow on input
    /// with the validation message set.
    pub fn begin_generate(&mut self, amount_text: &str) -> Option<PrepareReceiveRequest> {
        if self.step != ReceiveStep::Input {
            return None;
        }
        match self.validate_amount(amount_text) {
            Ok(amount_sat) => {
                self.error = None;
                self.step = ReceiveStep::Generating;
                Some(PrepareReceiveRequest {
                    payment_method: self.method,
                    amount: Some(ReceiveAmount::Bitcoin {
                        payer_amount_sat: amount_sat,
                    }),
                })
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn generated(&mut self, result: Result<GeneratedRequest, String>) {
        if self.step != ReceiveStep::Generating {
            return;
        }
        match result {
            Ok(request) => {
                self.error = None;
                self.step = ReceiveStep::Invoice(request);
            }
            Err(reason) => {
                self.error = Some(format!("Failed to generate invoice: {reason}"));
                self.step = ReceiveStep::Input;
            }
        }
    }
}
