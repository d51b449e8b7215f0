//! Interchangeable backing stores for the product catalog.
//!
//! Every adapter satisfies [`CatalogStore`]; the active one is selected by
//! configuration at startup, never by runtime type inspection. Callers go
//! through the façade in `services::catalog`, which owns validation and the
//! degraded-read fallback.

pub mod file;
pub mod memory;
pub mod rest;
pub mod sql;

use async_trait::async_trait;

use crate::errors::CatalogError;
use crate::models::{Product, ProductDraft, ProductPatch};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use sql::SqlStore;

/// Contract every backing store implements: get-all, add, update, delete,
/// replace-all, plus a reachability probe for readiness checks.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Full catalog in insertion order. The single source of truth.
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError>;

    /// Persist a new record and return it with its assigned id.
    /// Ids are never reused, even after deletion.
    async fn insert(&self, draft: ProductDraft) -> Result<Product, CatalogError>;

    /// Merge the supplied fields onto the existing record.
    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Product, CatalogError>;

    /// Hard delete; `NotFound` if the id is absent.
    async fn delete(&self, id: i32) -> Result<(), CatalogError>;

    /// Destroy the current catalog and insert a new set, reassigning ids.
    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>, CatalogError>;

    /// Cheap reachability probe used by the readiness endpoint.
    async fn check(&self) -> Result<(), CatalogError>;
}
