//! Price computation rules.
//!
//! [`compute_totals`] is a pure function over a cart snapshot and a
//! delivery selection: no side effects, no I/O, bit-identical results
//! for identical inputs. All amounts are decimal; nothing here is
//! rounded or truncated.
//!
//! # Shipping policy
//!
//! Home delivery pays a flat [`HOME_DELIVERY_FEE`] when the subtotal is
//! below [`FREE_SHIPPING_THRESHOLD`], and ships free at or above it.
//! Drive-thru and in-store pickup never pay shipping. The historical
//! storefront shipped two inconsistent variants of this rule; this is
//! the consolidated policy, kept as named constants so it reads as
//! configuration rather than magic numbers.

use rust_decimal::Decimal;

use tienda_core::DeliveryMethod;

use crate::cart::{CartLine, CartSnapshot};

/// Tax rate applied to the subtotal (16%). Not configurable at runtime.
pub const TAX_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

/// Subtotal at or above which home delivery ships free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Flat shipping fee for home delivery below the free-shipping
/// threshold.
pub const HOME_DELIVERY_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Derived totals for a cart snapshot and delivery selection.
///
/// Never persisted independently of the cart it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Compute subtotal, tax, shipping, and total for a snapshot.
///
/// `total = subtotal + tax + shipping` exactly.
#[must_use]
pub fn compute_totals(snapshot: &CartSnapshot, delivery: DeliveryMethod) -> PriceBreakdown {
    let subtotal: Decimal = snapshot.lines().iter().map(CartLine::line_total).sum();
    let tax = subtotal * TAX_RATE;
    let shipping = shipping_fee(subtotal, delivery);
    let total = subtotal + tax + shipping;

    PriceBreakdown {
        subtotal,
        tax,
        shipping,
        total,
    }
}

fn shipping_fee(subtotal: Decimal, delivery: DeliveryMethod) -> Decimal {
    match delivery {
        DeliveryMethod::DriveThru | DeliveryMethod::OnHand => Decimal::ZERO,
        DeliveryMethod::HomeDelivery => {
            if subtotal < FREE_SHIPPING_THRESHOLD {
                HOME_DELIVERY_FEE
            } else {
                Decimal::ZERO
            }
        }
    }
}
