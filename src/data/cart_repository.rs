use crate::domain::cart::CartLine;
use crate::domain::repository::CartRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// In-memory cart ledger keyed by `(user_id, product_id)`. Every
/// read-modify-write runs under one write lock, which serializes
/// conflicting operations on the same key; concurrent adds therefore
/// never lose increments.
#[derive(Clone)]
pub struct InMemoryCartRepository {
    storage: Arc<RwLock<HashMap<(u32, u32), u32>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCartRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    #[instrument(skip(self))]
    async fn add(&self, user_id: u32, product_id: u32) -> Result<u32> {
        trace!("Acquiring write lock for cart storage");
        let mut storage = self.storage.write().await;
        let quantity = storage
            .entry((user_id, product_id))
            .and_modify(|q| *q += 1)
            .or_insert(1);
        debug!(user_id, product_id, quantity = *quantity, "Cart line incremented");
        Ok(*quantity)
    }

    #[instrument(skip(self))]
    async fn remove(&self, user_id: u32, product_id: u32) -> Result<u32> {
        let mut storage = self.storage.write().await;
        let key = (user_id, product_id);
        match storage.get_mut(&key) {
            Some(quantity) if *quantity > 1 => {
                *quantity -= 1;
                let remaining = *quantity;
                debug!(user_id, product_id, quantity = remaining, "Cart line decremented");
                Ok(remaining)
            }
            Some(_) => {
                // Quantity 1: the line is deleted, never stored at 0.
                storage.remove(&key);
                debug!(user_id, product_id, "Cart line deleted");
                Ok(0)
            }
            None => {
                trace!(user_id, product_id, "Remove on absent cart line is a no-op");
                Ok(0)
            }
        }
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: u32) -> Result<()> {
        let mut storage = self.storage.write().await;
        let before = storage.len();
        storage.retain(|(uid, _), _| *uid != user_id);
        debug!(user_id, removed = before - storage.len(), "Cart cleared");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn lines(&self, user_id: u32) -> Result<Vec<CartLine>> {
        let storage = self.storage.read().await;
        let mut lines: Vec<CartLine> = storage
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|((uid, pid), quantity)| CartLine {
                user_id: *uid,
                product_id: *pid,
                quantity: *quantity,
            })
            .collect();
        // Stable order for a given snapshot.
        lines.sort_by_key(|line| line.product_id);
        Ok(lines)
    }
}
