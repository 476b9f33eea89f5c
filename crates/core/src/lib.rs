//! Tienda Core - Shared types library.
//!
//! This crate provides the common types used across the Tienda
//! storefront components. It contains only types and traits - no I/O,
//! no HTTP clients - so it stays lightweight and can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus
//!   the delivery/payment/status enums with their wire encodings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
