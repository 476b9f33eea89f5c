//! Cart state container.
//!
//! [`CartStore`] owns the mapping from product to selected quantity and
//! persists it through an injected [`CartStorage`] after every
//! mutation. Persistence is the sole source of truth across reloads:
//! the store holds no state that cannot be reconstructed from the
//! persisted form, and corrupt persisted data is treated as an empty
//! cart rather than surfaced as an error.

mod storage;

pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use tienda_core::ProductId;

/// Errors that can occur when mutating the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// A mutation would leave a line with a non-positive quantity.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The persisted form could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Denormalized product data captured when a line is added.
///
/// Unit price and display name are frozen at add-time so the customer
/// keeps the price they were shown even if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
}

/// One line of the cart: a product and its selected quantity.
///
/// Invariant: at most one line per product id, quantity never below 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The full, currently-persisted set of selected products and
/// quantities at a point in time.
///
/// Serializes as a plain JSON array of lines, which is exactly the
/// persisted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// Create a snapshot from a sequence of lines.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not total item count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Cart state container over an injectable storage medium.
///
/// Every mutation persists the updated snapshot synchronously before
/// returning.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    snapshot: Option<CartSnapshot>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store over `storage`. Nothing is read until
    /// [`load`](Self::load) is called.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            snapshot: None,
        }
    }

    /// The current snapshot, restoring it from persisted storage if
    /// none is held in memory.
    ///
    /// Returns an empty snapshot if no prior state exists or the stored
    /// value is corrupt; corruption is logged, never surfaced as an
    /// error.
    pub fn load(&mut self) -> &CartSnapshot {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.restore());
        }
        // Just populated above.
        self.snapshot.get_or_insert_with(CartSnapshot::default)
    }

    fn restore(&self) -> CartSnapshot {
        let stored = match self.storage.load(CART_STORAGE_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to read persisted cart, starting empty");
                return CartSnapshot::default();
            }
        };

        match stored {
            None => CartSnapshot::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "corrupt persisted cart, starting empty");
                CartSnapshot::default()
            }),
        }
    }

    /// Add `delta` units of `product` to the cart.
    ///
    /// If a line for the product exists its quantity is incremented,
    /// otherwise a new line is inserted. The updated snapshot is
    /// persisted before returning.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if the resulting quantity
    /// would be non-positive (the cart is left unchanged), or
    /// [`CartError::Storage`] if persisting fails.
    pub fn add(&mut self, product: ProductRef, delta: i32) -> Result<(), CartError> {
        self.load();
        let snapshot = self.snapshot.get_or_insert_with(CartSnapshot::default);

        let existing = snapshot
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id);

        match existing {
            Some(line) => {
                let updated = i64::from(line.quantity) + i64::from(delta);
                let updated = u32::try_from(updated).ok().filter(|q| *q >= 1);
                match updated {
                    Some(quantity) => line.quantity = quantity,
                    None => return Err(CartError::InvalidQuantity),
                }
            }
            None => {
                let quantity = u32::try_from(delta)
                    .ok()
                    .filter(|q| *q >= 1)
                    .ok_or(CartError::InvalidQuantity)?;
                snapshot.lines.push(CartLine {
                    product_id: product.id,
                    name: product.name,
                    unit_price: product.unit_price,
                    quantity,
                });
            }
        }

        self.persist()
    }

    /// Replace the quantity of the line at `index`.
    ///
    /// Out-of-range indexes are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity < 1`; the
    /// line is left unchanged.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        self.load();
        let snapshot = self.snapshot.get_or_insert_with(CartSnapshot::default);
        let Some(line) = snapshot.lines.get_mut(index) else {
            return Ok(());
        };
        line.quantity = quantity;

        self.persist()
    }

    /// Delete the line at `index`. Out-of-range indexes are a no-op,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if persisting fails.
    pub fn remove(&mut self, index: usize) -> Result<(), CartError> {
        self.load();
        let snapshot = self.snapshot.get_or_insert_with(CartSnapshot::default);
        if index >= snapshot.lines.len() {
            return Ok(());
        }
        snapshot.lines.remove(index);

        self.persist()
    }

    /// Empty the cart and remove the persisted form.
    ///
    /// Used by checkout result reporting once an order record exists.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the persisted form cannot be
    /// removed.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.snapshot = Some(CartSnapshot::default());
        self.storage.remove(CART_STORAGE_KEY)?;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), CartError> {
        let snapshot = self.snapshot.get_or_insert_with(CartSnapshot::default);
        let raw = serde_json::to_string(snapshot).map_err(|e| {
            // Serializing a plain Vec of lines cannot realistically
            // fail; treat it as an I/O-class failure if it ever does.
            StorageError::Io(std::io::Error::other(e))
        })?;
        self.storage.save(CART_STORAGE_KEY, &raw)?;
        Ok(())
    }
}
