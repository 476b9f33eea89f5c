//! Tienda storefront core library.
//!
//! This crate holds the cart-to-order checkout pipeline of the Tienda
//! storefront: the persisted shopping cart, the price computation
//! rules, and the checkout saga that turns a cart into a durable order
//! by issuing a sequence of dependent create-operations against the
//! remote boundary.
//!
//! # Architecture
//!
//! - [`cart`] - Cart state container over an injectable storage medium
//! - [`pricing`] - Pure subtotal/tax/shipping/total computation
//! - [`gateway`] - The REST boundary: the [`gateway::OrderGateway`]
//!   trait and its `reqwest`-backed implementation
//! - [`checkout`] - The checkout saga and result reporting
//!
//! The remote API offers no multi-step transaction guarantee, so the
//! client is solely responsible for ordering, validation, and failure
//! reporting. See [`checkout`] for the exact failure semantics.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod pricing;
pub mod telemetry;
