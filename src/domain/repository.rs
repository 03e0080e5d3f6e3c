use anyhow::Result;
use async_trait::async_trait;

use crate::domain::cart::CartLine;
use crate::domain::catalog::Product;
use crate::domain::user::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user, assigning its id. The uniqueness check and
    /// the insert must be one atomic step; a duplicate email fails
    /// with `DomainError::DuplicateEmail`.
    async fn insert(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: u32) -> Result<Option<User>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Increment-or-insert for `(user_id, product_id)`. The
    /// read-modify-write must be atomic per key so concurrent adds
    /// never lose increments. Returns the resulting quantity.
    async fn add(&self, user_id: u32, product_id: u32) -> Result<u32>;
    /// Decrement-or-delete. Absent line is a no-op. Returns the
    /// remaining quantity, 0 meaning the line is gone.
    async fn remove(&self, user_id: u32, product_id: u32) -> Result<u32>;
    /// Removes every line for the user.
    async fn clear(&self, user_id: u32) -> Result<()>;
    /// Snapshot of the user's lines, ordered by product_id.
    async fn lines(&self, user_id: u32) -> Result<Vec<CartLine>>;
}

/// External read-only catalog. This core never writes products.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn get_product(&self, id: u32) -> Result<Option<Product>>;
    async fn get_products_by_category(&self, category: &str) -> Result<Vec<Product>>;
    async fn get_products_by_category_paginated(
        &self,
        category: &str,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Product>>;
    async fn count_products_in_category(&self, category: &str) -> Result<u64>;
}
