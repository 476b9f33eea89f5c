//! Unified checkout error taxonomy.
//!
//! Every terminal saga failure is one of these kinds, and each kind
//! maps to exactly one user-facing message via
//! [`CheckoutError::user_message`]. The distinction between "nothing
//! was created" and "a partial order now exists" is load-bearing:
//! result reporting clears the cart only in the latter case.

use core::fmt;

use thiserror::Error;

use tienda_core::OrderId;

use crate::checkout::SagaStep;
use crate::gateway::GatewayError;

/// Everything wrong with a submission, collected before any network
/// call is made.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationIssues {
    /// The cart has no lines.
    pub empty_cart: bool,
    /// Required fields that are missing or invalid, by wire name.
    pub missing_fields: Vec<&'static str>,
}

impl ValidationIssues {
    /// Whether the submission passed validation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.empty_cart && self.missing_fields.is_empty()
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.empty_cart {
            parts.push("cart is empty".to_string());
        }
        if !self.missing_fields.is_empty() {
            parts.push(format!(
                "missing required fields: {}",
                self.missing_fields.join(", ")
            ));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Terminal outcome kinds of a checkout submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Missing/invalid required fields or an empty cart. Caught before
    /// any network call; recoverable by user correction in place.
    #[error("validation failed: {0}")]
    Validation(ValidationIssues),

    /// A saga step failed against the remote boundary. Resources
    /// created by earlier steps are not rolled back.
    #[error("{step} failed: {source}")]
    Step {
        /// The step that failed.
        step: SagaStep,
        /// The underlying gateway failure.
        source: GatewayError,
    },

    /// The order was created but one or more order lines failed. A
    /// real (incomplete) order now exists remotely; no client-side
    /// remediation is defined, so this is flagged for manual
    /// reconciliation.
    #[error("order {order_id} was created but {failed} of {attempted} line items failed")]
    PartialOrder {
        order_id: OrderId,
        failed: usize,
        attempted: usize,
    },

    /// A submission is already in flight; duplicate concurrent
    /// submissions from the same cart are rejected.
    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

impl CheckoutError {
    /// A single human-readable message for the customer.
    ///
    /// Server-provided detail is surfaced verbatim when present;
    /// transport failures get a generic "could not reach the server"
    /// message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(issues) => {
                if issues.empty_cart && issues.missing_fields.is_empty() {
                    "Your cart is empty.".to_string()
                } else if issues.empty_cart {
                    format!(
                        "Your cart is empty and some fields are incomplete: {}.",
                        issues.missing_fields.join(", ")
                    )
                } else {
                    format!(
                        "Please complete the required fields: {}.",
                        issues.missing_fields.join(", ")
                    )
                }
            }
            Self::Step { source, .. } => match source {
                GatewayError::Network(_) => {
                    "Could not reach the server. Please check your connection and try again."
                        .to_string()
                }
                GatewayError::Server { message, .. } if !message.is_empty() => message.clone(),
                GatewayError::Server { .. } | GatewayError::Decode(_) => {
                    "The server could not process your order. Please try again.".to_string()
                }
            },
            Self::PartialOrder { order_id, .. } => format!(
                "Your order #{order_id} was received, but some items could not be recorded. \
                 Please contact support with your order number."
            ),
            Self::SubmissionInFlight => "Your order is already being processed.".to_string(),
        }
    }
}
