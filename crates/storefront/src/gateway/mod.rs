//! The REST boundary to the remote order API.
//!
//! # Architecture
//!
//! The checkout saga talks to the backend exclusively through the
//! [`OrderGateway`] trait - the five dependent create-operations it
//! needs - so tests can script the boundary without a network. The
//! production implementation is [`HttpOrderGateway`], a `reqwest` JSON
//! client that also exposes the catalog reads and the admin-side order
//! status update.
//!
//! The backend offers no transaction across these operations; each call
//! stands alone, and a created resource stays created even when a later
//! call fails.

mod http;
pub mod types;

pub use http::HttpOrderGateway;

use thiserror::Error;

use tienda_core::{AddressId, BillId, ClientId, OrderId, OrderLineId};

use types::{NewAddress, NewBill, NewClient, NewOrder, NewOrderLine};

/// Errors that can occur when calling the remote boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure: no response arrived (includes the
    /// bounded request timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The boundary responded with a failure status. `message` carries
    /// the server-provided detail when one was present, otherwise the
    /// raw body.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A success response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this failure never reached the server (or the response
    /// never arrived), as opposed to the server rejecting the request.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// The remote boundary's create-operations, in the order the checkout
/// saga issues them.
///
/// Every operation is a single JSON POST that responds with the created
/// resource's identifier. Implementations must not retry internally;
/// retry policy belongs to the caller.
#[allow(async_fn_in_trait)]
pub trait OrderGateway {
    /// Create a client record.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    async fn create_client(&self, client: &NewClient) -> Result<ClientId, GatewayError>;

    /// Create a shipping address tied to a client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    async fn create_address(&self, address: &NewAddress) -> Result<AddressId, GatewayError>;

    /// Create a bill for the computed total.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    async fn create_bill(&self, bill: &NewBill) -> Result<BillId, GatewayError>;

    /// Create the order referencing the client and bill.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    async fn create_order(&self, order: &NewOrder) -> Result<OrderId, GatewayError>;

    /// Create one order line. Lines are independent of each other and
    /// may be issued concurrently.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    async fn create_order_line(&self, line: &NewOrderLine) -> Result<OrderLineId, GatewayError>;
}

impl<G: OrderGateway + ?Sized> OrderGateway for &G {
    async fn create_client(&self, client: &NewClient) -> Result<ClientId, GatewayError> {
        (**self).create_client(client).await
    }

    async fn create_address(&self, address: &NewAddress) -> Result<AddressId, GatewayError> {
        (**self).create_address(address).await
    }

    async fn create_bill(&self, bill: &NewBill) -> Result<BillId, GatewayError> {
        (**self).create_bill(bill).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<OrderId, GatewayError> {
        (**self).create_order(order).await
    }

    async fn create_order_line(&self, line: &NewOrderLine) -> Result<OrderLineId, GatewayError> {
        (**self).create_order_line(line).await
    }
}
