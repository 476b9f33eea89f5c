//! The checkout saga and result reporting.
//!
//! Converting a cart into a durable order takes a sequence of
//! dependent create-operations against a backend with no multi-step
//! transaction guarantee: client, then (for home delivery) address,
//! then bill, then order, then one line per cart entry. Each step's
//! identifier feeds the next, each step can fail independently, and
//! nothing is rolled back on failure - the saga's job is ordering,
//! validation, and honest failure reporting.
//!
//! [`CheckoutSaga::run`] drives one submission attempt to a terminal
//! outcome; [`report::finalize`] turns that outcome into what the UI
//! needs (and clears the cart exactly when an order record exists).

pub mod report;
mod saga;

pub use report::CheckoutOutcome;
pub use saga::{CheckoutSaga, Compensator, NoCompensation, SagaProgress};

use core::fmt;

use rust_decimal::Decimal;

use tienda_core::{DeliveryMethod, OrderId, PaymentMethod};

/// Customer data collected at checkout.
///
/// Fields are raw form input; validation happens at submission time.
/// The shipping address is only required for home delivery.
#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub shipping_address: Option<String>,
}

/// One checkout submission: customer data plus fulfillment choices.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub delivery_method: DeliveryMethod,
    /// Recorded as a label only; never sent to a payment processor.
    pub payment_method: PaymentMethod,
}

/// What a successful submission carries for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub total: Decimal,
}

/// The sequential creation steps, in submission order.
///
/// `CreatingAddress` is skipped when the delivery method does not
/// require one. Failure is terminal at whichever step it occurs.
/// Order-line failures are not a step failure: by the time lines go
/// out an order record exists, so they report as a partial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaStep {
    CreatingClient,
    CreatingAddress,
    CreatingBill,
    CreatingOrder,
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreatingClient => "client creation",
            Self::CreatingAddress => "address creation",
            Self::CreatingBill => "bill creation",
            Self::CreatingOrder => "order creation",
        };
        f.write_str(name)
    }
}
