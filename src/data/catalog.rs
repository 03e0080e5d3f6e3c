use crate::domain::catalog::Product;
use crate::domain::repository::CatalogProvider;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Read-only in-memory catalog, seeded once at startup. BTreeMap keeps
/// category listings in id order, which makes pagination stable.
#[derive(Clone)]
pub struct InMemoryCatalog {
    products: Arc<BTreeMap<u32, Product>>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products.values().filter(move |p| p.category == category)
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn get_product(&self, id: u32) -> Result<Option<Product>> {
        trace!(product_id = id, "Catalog lookup");
        Ok(self.products.get(&id).cloned())
    }

    async fn get_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        Ok(self.in_category(category).cloned().collect())
    }

    async fn get_products_by_category_paginated(
        &self,
        category: &str,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Product>> {
        // An offset past the end yields an empty page, never a panic.
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(self
            .in_category(category)
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_products_in_category(&self, category: &str) -> Result<u64> {
        Ok(self.in_category(category).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::Price;

    fn product(id: u32, category: &str) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            price: Price::new(1000 * u64::from(id)),
            photo: format!("/static/{}.jpg", id),
            info: "".to_string(),
            category: category.to_string(),
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            product(1, "tea"),
            product(2, "tea"),
            product(3, "coffee"),
            product(4, "tea"),
            product(5, "tea"),
        ])
    }

    #[tokio::test]
    async fn test_get_product_by_id() {
        let found = catalog().get_product(3).await.unwrap().unwrap();
        assert_eq!(found.category, "coffee");
    }

    #[tokio::test]
    async fn test_get_product_unknown_id_is_none() {
        assert!(catalog().get_product(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_listing_in_id_order() {
        let products = catalog().get_products_by_category("tea").await.unwrap();
        let ids: Vec<u32> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_pagination_slices_category() {
        let catalog = catalog();
        let page = catalog
            .get_products_by_category_paginated("tea", 2, 2)
            .await
            .unwrap();
        let ids: Vec<u32> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_pagination_offset_past_the_end_is_empty() {
        let catalog = catalog();
        let page = catalog
            .get_products_by_category_paginated("tea", 6, u64::MAX)
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_count_in_category() {
        let catalog = catalog();
        assert_eq!(catalog.count_products_in_category("tea").await.unwrap(), 4);
        assert_eq!(
            catalog.count_products_in_category("coffee").await.unwrap(),
            1
        );
        assert_eq!(catalog.count_products_in_category("nope").await.unwrap(), 0);
    }
}
