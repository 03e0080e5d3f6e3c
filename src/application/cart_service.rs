use crate::domain::cart::{CartLineView, CartView};
use crate::domain::error::DomainError;
use crate::domain::repository::{CartRepository, CatalogProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct CartService<C: CartRepository, P: CatalogProvider> {
    cart_repository: Arc<C>,
    catalog: Arc<P>,
}

impl<C: CartRepository, P: CatalogProvider> CartService<C, P> {
    pub fn new(cart_repository: Arc<C>, catalog: Arc<P>) -> Self {
        Self {
            cart_repository,
            catalog,
        }
    }

    /// Adds one unit of the product to the user's cart. The product
    /// must exist in the catalog.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: u32, product_id: u32) -> Result<()> {
        if self.catalog.get_product(product_id).await?.is_none() {
            warn!(product_id, "Add rejected, product not in catalog");
            return Err(DomainError::ProductNotFound.into());
        }
        let quantity = self.cart_repository.add(user_id, product_id).await?;
        info!(user_id, product_id, quantity, "Product added to cart");
        Ok(())
    }

    /// Removes one unit; a missing line is a no-op, not an error.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: u32, product_id: u32) -> Result<()> {
        let remaining = self.cart_repository.remove(user_id, product_id).await?;
        info!(user_id, product_id, remaining, "Product removed from cart");
        Ok(())
    }

    /// Empties the cart, e.g. after checkout completes.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: u32) -> Result<()> {
        self.cart_repository.clear(user_id).await?;
        info!(user_id, "Cart cleared");
        Ok(())
    }

    /// Joins ledger lines against the catalog. A line whose product
    /// has vanished from the catalog is skipped with a warning rather
    /// than aborting the whole view.
    #[instrument(skip(self))]
    pub async fn view(&self, user_id: u32) -> Result<CartView> {
        let lines = self.cart_repository.lines(user_id).await?;
        let mut views = Vec::with_capacity(lines.len());
        let mut total = 0u64;

        for line in lines {
            let Some(product) = self.catalog.get_product(line.product_id).await? else {
                warn!(
                    user_id,
                    product_id = line.product_id,
                    "Cart line references a product missing from the catalog, skipping"
                );
                continue;
            };
            let line_total = product.price.times(line.quantity);
            total += line_total;
            views.push(CartLineView {
                product_id: product.id,
                name: product.name,
                price: product.price,
                photo: product.photo,
                info: product.info,
                quantity: line.quantity,
                line_total,
            });
        }

        debug!(user_id, lines = views.len(), total, "Cart view assembled");
        Ok(CartView {
            lines: views,
            total,
        })
    }
}
