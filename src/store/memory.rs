use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::CatalogError;
use crate::models::{Product, ProductDraft, ProductPatch};

use super::CatalogStore;

struct Inner {
    products: Vec<Product>,
    next_id: i32,
}

/// Process-memory store. The default backend for development and tests;
/// contents are lost on restart.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_seed(Vec::new())
    }

    /// Start from an existing catalog; id assignment continues past the
    /// highest seeded id.
    pub fn with_seed(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(Inner { products, next_id }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.inner.read().await.products.clone())
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let product = Product::from_draft(id, draft);
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Product, CatalogError> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("Product with id {} not found", id)))?;

        product.apply_patch(patch);
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);

        if inner.products.len() == before {
            return Err(CatalogError::NotFound(format!(
                "Product with id {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>, CatalogError> {
        let mut inner = self.inner.write().await;
        let products: Vec<Product> = drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| Product::from_draft(i as i32 + 1, draft))
            .collect();

        inner.next_id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        inner.products = products.clone();
        Ok(products)
    }

    async fn check(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            description: "desc".into(),
            quantity: "1 tote".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_assigns_fresh_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A")).await.unwrap();
        let b = store.insert(draft("B")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reused() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.insert(draft("B")).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let err = store.delete(a.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn replace_all_with_empty_set_empties_the_catalog() {
        let store = MemoryStore::with_seed(crate::models::fallback_catalog());
        store.replace_all(Vec::new()).await.unwrap();
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_all_reassigns_ids_from_one() {
        let store = MemoryStore::with_seed(crate::models::fallback_catalog());
        let replaced = store
            .replace_all(vec![draft("X"), draft("Y")])
            .await
            .unwrap();
        assert_eq!(replaced[0].id, 1);
        assert_eq!(replaced[1].id, 2);

        let next = store.insert(draft("Z")).await.unwrap();
        assert_eq!(next.id, 3);
    }
}
