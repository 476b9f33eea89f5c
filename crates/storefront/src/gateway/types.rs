//! Wire types for the order gateway.
//!
//! Request bodies mirror the backend's schemas field for field; decimal
//! amounts travel as JSON strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tienda_core::{
    BillId, CategoryId, ClientId, DeliveryMethod, Email, OrderId, OrderStatus, ProductId,
};

/// Body for the create-client operation.
#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub name: String,
    pub lastname: String,
    pub email: Email,
    pub telephone: String,
}

/// Body for the create-address operation.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    /// Free-text shipping address.
    pub description: String,
    pub client_id: ClientId,
}

/// Body for the create-bill operation.
#[derive(Debug, Clone, Serialize)]
pub struct NewBill {
    pub total: Decimal,
    pub client_id: ClientId,
}

/// Body for the create-order operation.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub client_id: ClientId,
    pub bill_id: BillId,
    pub delivery_method: DeliveryMethod,
    pub status: OrderStatus,
}

/// Body for the create-order-line operation.
///
/// `price` is the unit price captured at order time, not a live catalog
/// lookup, so the customer keeps the price they were shown.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// Body for the update-order-status operation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// The identifier every create-operation responds with.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Created {
    pub id: i32,
}

/// A catalog product, as listed by the gateway. Read-only to this core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// A catalog category, as listed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
