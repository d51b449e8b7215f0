use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::CatalogError;
use crate::models::{fallback_catalog, Product, ProductDraft, ProductPatch};

use super::CatalogStore;

/// Flat-file store: the whole catalog serialized as a JSON array.
///
/// A missing file yields the default catalog, matching the behavior the
/// serverless functions had before a first save. A file that exists but
/// fails to parse is a store failure, not an empty catalog.
///
/// Writes go through a mutex so two mutations cannot interleave their
/// read-modify-write cycles within this process.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let products: Vec<Product> = serde_json::from_slice(&bytes)?;
                Ok(products)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "catalog file absent, serving defaults");
                Ok(fallback_catalog())
            }
            Err(err) => Err(CatalogError::store_unavailable(format!(
                "failed to read {}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    async fn save(&self, products: &[Product]) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|err| {
                    CatalogError::store_unavailable(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        err
                    ))
                })?;
            }
        }

        let data = serde_json::to_vec_pretty(products)?;
        tokio::fs::write(&self.path, data).await.map_err(|err| {
            CatalogError::store_unavailable(format!(
                "failed to write {}: {}",
                self.path.display(),
                err
            ))
        })?;

        debug!(path = %self.path.display(), count = products.len(), "catalog saved");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for FileStore {
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        self.load().await
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load().await?;

        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = Product::from_draft(id, draft);
        products.push(product.clone());

        self.save(&products).await?;
        Ok(product)
    }

    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Product, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load().await?;

        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("Product with id {} not found", id)))?;
        product.apply_patch(patch);
        let updated = product.clone();

        self.save(&products).await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load().await?;

        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(CatalogError::NotFound(format!(
                "Product with id {} not found",
                id
            )));
        }

        self.save(&products).await
    }

    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let products: Vec<Product> = drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| Product::from_draft(i as i32 + 1, draft))
            .collect();

        self.save(&products).await?;
        Ok(products)
    }

    async fn check(&self) -> Result<(), CatalogError> {
        // The file may legitimately not exist yet; only its directory needs
        // to be usable.
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CatalogError::store_unavailable(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            description: "desc".into(),
            quantity: "1 tote".into(),
            ..Default::default()
        }
    }

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("products.json"))
    }

    #[tokio::test]
    async fn missing_file_serves_default_catalog() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let products = store.fetch_all().await.unwrap();
        assert_eq!(products.len(), 10);
    }

    #[tokio::test]
    async fn saved_empty_catalog_is_distinct_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.replace_all(Vec::new()).await.unwrap();
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");

        let store = FileStore::new(&path);
        store.replace_all(Vec::new()).await.unwrap();
        let added = store.insert(draft("Toluene")).await.unwrap();

        let reopened = FileStore::new(&path);
        let products = reopened.fetch_all().await.unwrap();
        assert_eq!(products, vec![added]);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_store_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }

    #[tokio::test]
    async fn update_missing_id_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.replace_all(Vec::new()).await.unwrap();

        let err = store
            .update(42, ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
