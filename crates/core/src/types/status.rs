//! Delivery, payment, and order status enums with their wire encodings.
//!
//! The remote boundary encodes delivery methods as small integer codes
//! and payment methods / order statuses as lowercase labels. The serde
//! attributes here are the single source of truth for those encodings.

use serde::{Deserialize, Serialize};

/// How the customer receives their order.
///
/// Determines whether a shipping address is required and whether a
/// shipping fee applies. Serialized as the backend's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "u8", try_from = "u8")]
pub enum DeliveryMethod {
    /// Pick up by car without leaving the vehicle.
    DriveThru,
    /// In-store pickup.
    OnHand,
    /// Shipped to the customer's address.
    #[default]
    HomeDelivery,
}

impl DeliveryMethod {
    /// The numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::DriveThru => 1,
            Self::OnHand => 2,
            Self::HomeDelivery => 3,
        }
    }

    /// Whether this delivery method requires a shipping address.
    #[must_use]
    pub const fn requires_address(self) -> bool {
        matches!(self, Self::HomeDelivery)
    }
}

impl From<DeliveryMethod> for u8 {
    fn from(method: DeliveryMethod) -> Self {
        method.code()
    }
}

impl TryFrom<u8> for DeliveryMethod {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::DriveThru),
            2 => Ok(Self::OnHand),
            3 => Ok(Self::HomeDelivery),
            other => Err(format!("unknown delivery method code: {other}")),
        }
    }
}

/// How the customer intends to pay.
///
/// Recorded as a label only; no payment processor is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Transfer,
    Cash,
}

/// Lifecycle status of a remote order.
///
/// Orders are always created as [`Pending`](Self::Pending); the later
/// statuses are driven by the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}
