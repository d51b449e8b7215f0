use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, EntityTrait, ModelTrait, QueryOrder, TransactionTrait,
};
use tracing::{error, instrument};

use crate::db::DbPool;
use crate::entities::product::{self, Column as ProductColumn, Entity as ProductEntity};
use crate::errors::CatalogError;
use crate::models::{Product, ProductDraft, ProductPatch};

use super::CatalogStore;

/// Relational store backed by sea-orm. Id assignment is delegated to the
/// database's auto-increment.
pub struct SqlStore {
    db_pool: Arc<DbPool>,
}

impl SqlStore {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn find_model(&self, id: i32) -> Result<product::Model, CatalogError> {
        ProductEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(product_id = %id, error = %e, "database error when finding product");
                CatalogError::Database(e)
            })?
            .ok_or_else(|| CatalogError::NotFound(format!("Product with id {} not found", id)))
    }
}

fn draft_into_active_model(draft: ProductDraft) -> product::ActiveModel {
    product::ActiveModel {
        name: Set(draft.name),
        description: Set(draft.description),
        quantity: Set(draft.quantity),
        category: Set(draft.category),
        cas_number: Set(draft.cas),
        location: Set(draft.location),
        manufacturer: Set(draft.manufacturer),
        purity: Set(draft.purity),
        ..Default::default()
    }
}

#[async_trait]
impl CatalogStore for SqlStore {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        let models = ProductEntity::find()
            .order_by_asc(ProductColumn::Id)
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "database error when fetching products");
                CatalogError::Database(e)
            })?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn insert(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let model = draft_into_active_model(draft)
            .insert(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "database error when inserting product");
                CatalogError::Database(e)
            })?;

        Ok(model.into())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Product, CatalogError> {
        let mut active: product::ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(quantity) = patch.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(category) = patch.category {
            active.category = Set(Some(category));
        }
        if let Some(cas) = patch.cas {
            active.cas_number = Set(Some(cas));
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(manufacturer) = patch.manufacturer {
            active.manufacturer = Set(Some(manufacturer));
        }
        if let Some(purity) = patch.purity {
            active.purity = Set(Some(purity));
        }

        let model = active.update(&*self.db_pool).await.map_err(|e| {
            error!(product_id = %id, error = %e, "database error when updating product");
            CatalogError::Database(e)
        })?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let model = self.find_model(id).await?;

        model.delete(&*self.db_pool).await.map_err(|e| {
            error!(product_id = %id, error = %e, "database error when deleting product");
            CatalogError::Database(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>, CatalogError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "failed to open transaction for bulk replace");
            CatalogError::Database(e)
        })?;

        ProductEntity::delete_many().exec(&txn).await.map_err(|e| {
            error!(error = %e, "database error when clearing products");
            CatalogError::Database(e)
        })?;

        let mut inserted = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let model = draft_into_active_model(draft)
                .insert(&txn)
                .await
                .map_err(|e| {
                    error!(error = %e, "database error during bulk insert");
                    CatalogError::Database(e)
                })?;
            inserted.push(Product::from(model));
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, "failed to commit bulk replace");
            CatalogError::Database(e)
        })?;

        Ok(inserted)
    }

    async fn check(&self) -> Result<(), CatalogError> {
        crate::db::check_connection(&self.db_pool)
            .await
            .map_err(|e| CatalogError::store_unavailable(e.to_string()))
    }
}
