use serde::{Deserialize, Serialize};

use crate::domain::cart::Price;

/// Catalog entry. Owned by the external catalog provider; this core
/// only ever reads products, never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: Price,
    pub photo: String,
    pub info: String,
    pub category: String,
}
