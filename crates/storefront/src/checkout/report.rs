//! Terminal saga outcome reporting.
//!
//! [`finalize`] is the one place that decides what happens to the cart
//! after a submission attempt: the cart is cleared exactly when an
//! order record exists remotely (full success or partial failure), and
//! left untouched otherwise so the customer can correct and resubmit
//! with their items and form input intact.

use tracing::error;

use tienda_core::OrderId;

use crate::cart::{CartStorage, CartStore};
use crate::error::CheckoutError;

use super::OrderConfirmation;

/// What the UI gets after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Order placed in full; cart cleared. Display stays on the
    /// confirmation until the user navigates away.
    Confirmed(OrderConfirmation),

    /// An order record exists but some line items are missing; cart
    /// cleared. Distinct from [`Failed`](Self::Failed) because the
    /// customer has a real order number to quote.
    PartiallyRecorded {
        order_id: OrderId,
        message: String,
    },

    /// Nothing usable was created; cart and form input untouched.
    Failed { message: String },
}

/// Turn a saga result into a [`CheckoutOutcome`], clearing the cart
/// when an order record exists.
///
/// A cart-clear failure is logged and swallowed: the order was placed,
/// and that is what the customer needs to hear.
pub fn finalize<S: CartStorage>(
    result: Result<OrderConfirmation, CheckoutError>,
    cart: &mut CartStore<S>,
) -> CheckoutOutcome {
    match result {
        Ok(confirmation) => {
            if let Err(e) = cart.clear() {
                error!(error = %e, "order placed but cart could not be cleared");
            }
            CheckoutOutcome::Confirmed(confirmation)
        }
        Err(err @ CheckoutError::PartialOrder { order_id, .. }) => {
            if let Err(e) = cart.clear() {
                error!(error = %e, "partial order recorded but cart could not be cleared");
            }
            CheckoutOutcome::PartiallyRecorded {
                order_id,
                message: err.user_message(),
            }
        }
        Err(err) => CheckoutOutcome::Failed {
            message: err.user_message(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{CartStore, MemoryStorage, ProductRef};
    use crate::error::ValidationIssues;
    use rust_decimal::Decimal;
    use tienda_core::ProductId;

    fn loaded_cart() -> CartStore<MemoryStorage> {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(
            ProductRef {
                id: ProductId::new(1),
                name: "Yerba".to_string(),
                unit_price: Decimal::new(100, 0),
            },
            1,
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_success_clears_cart() {
        let mut cart = loaded_cart();
        let confirmation = OrderConfirmation {
            order_id: OrderId::new(42),
            total: Decimal::new(116, 0),
        };

        let outcome = finalize(Ok(confirmation), &mut cart);
        assert_eq!(outcome, CheckoutOutcome::Confirmed(confirmation));
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_partial_order_clears_cart_and_names_order() {
        let mut cart = loaded_cart();
        let outcome = finalize(
            Err(CheckoutError::PartialOrder {
                order_id: OrderId::new(42),
                failed: 1,
                attempted: 2,
            }),
            &mut cart,
        );

        let CheckoutOutcome::PartiallyRecorded { order_id, .. } = outcome else {
            panic!("expected partial outcome");
        };
        assert_eq!(order_id, OrderId::new(42));
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_failure_leaves_cart_intact() {
        let mut cart = loaded_cart();
        let outcome = finalize(
            Err(CheckoutError::Validation(ValidationIssues {
                empty_cart: false,
                missing_fields: vec!["client_email"],
            })),
            &mut cart,
        );

        assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
        assert_eq!(cart.load().len(), 1);
    }
}
