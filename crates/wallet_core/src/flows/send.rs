//! Send dialog: input, confirm, processing, result.

use shared::protocol::{InputType, PayAmount, Payment, PrepareSendRequest, PrepareSendResponse};

use super::FlowId;

pub const EMPTY_DESTINATION_MESSAGE: &str = "Please enter a payment destination";
pub const MISSING_INVOICE_AMOUNT_MESSAGE: &str = "Invoice does not specify an amount";
pub const MISSING_ADDRESS_AMOUNT_MESSAGE: &str = "Address does not specify an amount";
pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported payment format";
pub const INVALID_INPUT_MESSAGE: &str = "Invalid payment information";

#[derive(Debug, Clone, PartialEq)]
pub struct SendQuote {
    pub destination: String,
    pub amount_sat: u64,
    pub fees_sat: u64,
    pub prepare_response: PrepareSendResponse,
}

impl SendQuote {
    pub fn total_sat(&self) -> u64 {
        self.amount_sat.saturating_add(self.fees_sat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Success { payment: Payment },
    Failure { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendStep {
    Input {
        error: Option<String>,
        pending: bool,
    },
    Confirm(SendQuote),
    Processing(SendQuote),
    Result(SendOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendFlow {
    id: FlowId,
    input: String,
    step: SendStep,
}

impl SendFlow {
    pub fn new(id: FlowId) -> Self {
        Self {
            id,
            input: String::new(),
            step: SendStep::Input {
                error: None,
                pending: false,
            },
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn step(&self) -> &SendStep {
        &self.step
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.step,
            SendStep::Input { pending: true, .. } | SendStep::Processing(_)
        )
    }

    /// Accepts raw destination text. Returns the trimmed destination to parse,
    /// or `None` when the input step rejected it.
    pub fn submit_input(&mut self, text: &str) -> Option<String> {
        if !matches!(self.step, SendStep::Input { pending: false, .. }) {
            return None;
        }
        let destination = text.trim();
        self.input = destination.to_string();
        if destination.is_empty() {
            self.fail_input(EMPTY_DESTINATION_MESSAGE);
            return None;
        }
        self.step = SendStep::Input {
            error: None,
            pending: true,
        };
        Some(destination.to_string())
    }

    pub fn fail_input(&mut self, message: impl Into<String>) {
        self.step = SendStep::Input {
            error: Some(message.into()),
            pending: false,
        };
    }

    pub fn quoted(&mut self, quote: SendQuote) {
        if matches!(self.step, SendStep::Input { pending: true, .. }) {
            self.step = SendStep::Confirm(quote);
        }
    }

    /// Only the confirm step can go back.
    pub fn back(&mut self) -> bool {
        if matches!(self.step, SendStep::Confirm(_)) {
            self.step = SendStep::Input {
                error: None,
                pending: false,
            };
            true
        } else {
            false
        }
    }

    /// Moves to processing and hands back the quote to submit.
    pub fn confirm(&mut self) -> Option<PrepareSendResponse> {
        let SendStep::Confirm(quote) = &self.step else {
            return None;
        };
        let quote = quote.clone();
        let response = quote.prepare_response.clone();
        self.step = SendStep::Processing(quote);
        Some(response)
    }

    pub fn finish(&mut self, outcome: SendOutcome) {
        if matches!(self.step, SendStep::Processing(_)) {
            self.step = SendStep::Result(outcome);
        }
    }
}

/// Maps a parsed destination to the quote request, or the message shown
/// on the input step.
pub fn prepare_request_for(destination: &str, input: &InputType) -> Result<PrepareSendRequest, String> {
    match input {
        InputType::Bolt11 { invoice } => {
            let Some(amount_sat) = invoice.amount_sat() else {
                return Err(MISSING_INVOICE_AMOUNT_MESSAGE.to_string());
            };
            Ok(PrepareSendRequest {
                destination: invoice.bolt11.clone(),
                amount: Some(PayAmount::Bitcoin {
                    receiver_amount_sat: amount_sat,
                }),
            })
        }
        InputType::LiquidAddress { address } => {
            let Some(amount_sat) = address.amount_sat else {
                return Err(MISSING_ADDRESS_AMOUNT_MESSAGE.to_string());
            };
            Ok(PrepareSendRequest {
                destination: destination.to_string(),
                amount: Some(PayAmount::Bitcoin {
                    receiver_amount_sat: amount_sat,
                }),
            })
        }
        InputType::BitcoinAddress { .. }
        | InputType::Bolt12Offer { .. }
        | InputType::NodeId { .. }
        | InputType::Url { .. }
        | InputType::LnUrlPay { .. }
        | InputType::LnUrlWithdraw { .. }
        | InputType::LnUrlAuth { .. }
        | InputType::LnUrlError { .. } => Err(UNSUPPORTED_FORMAT_MESSAGE.to_string()),
    }
}

pub fn quote_failed_message(reason: &str) -> String {
    format!("Failed to estimate fee: {reason}")
}

pub fn payment_failed_message(reason: &str) -> String {
    format!("Payment failed: {reason}")
}
