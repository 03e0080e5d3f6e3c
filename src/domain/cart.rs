use serde::{Deserialize, Serialize};

/// Product price in minor currency units (kopecks/cents).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(u64);

impl Price {
    pub fn new(value: u64) -> Self {
        Price(value)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }

    /// Line total for `quantity` units at this price.
    pub fn times(&self, quantity: u32) -> u64 {
        self.0 * u64::from(quantity)
    }
}

/// One stored cart row. Invariant: quantity is never 0; a line that
/// would reach 0 is deleted instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub user_id: u32,
    pub product_id: u32,
    pub quantity: u32,
}

/// A cart line joined against the catalog, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineView {
    pub product_id: u32,
    pub name: String,
    pub price: Price,
    pub photo: String,
    pub info: String,
    pub quantity: u32,
    pub line_total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: u64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemRequest {
    pub product_id: u32,
}
