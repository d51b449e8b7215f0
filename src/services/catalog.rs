use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::errors::CatalogError;
use crate::events::{Event, EventSender};
use crate::models::{fallback_catalog, Product, ProductDraft, ProductPatch};
use crate::store::CatalogStore;

/// Catalog read result. `degraded` means the store was unreachable and the
/// fixed fallback list is being served; an empty `products` with
/// `degraded == false` is a real, empty catalog.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub products: Vec<Product>,
    pub degraded: bool,
}

/// Single access point over whichever store is configured.
///
/// Owns the required-field validation, degrades reads to the fallback list
/// instead of failing, and emits a catalog-changed event after every
/// successful mutation. Event delivery is best-effort; a full or closed
/// channel never fails the mutation that triggered it.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    events: EventSender,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, events: EventSender) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Full catalog, or the fallback list with `degraded` set when the
    /// store is unreachable. Never errors.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> CatalogView {
        match self.store.fetch_all().await {
            Ok(products) => CatalogView {
                products,
                degraded: false,
            },
            Err(err) => {
                error!(error = %err, "catalog store unreachable, serving fallback list");
                CatalogView {
                    products: fallback_catalog(),
                    degraded: true,
                }
            }
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let draft = validate_draft(draft)?;
        let product = self.store.insert(draft).await?;

        info!(product_id = product.id, name = %product.name, "product added");
        self.emit(Event::ProductAdded(product.id)).await;
        Ok(product)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: i32,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        let patch = validate_patch(patch)?;
        let product = self.store.update(id, patch).await?;

        info!(product_id = id, "product updated");
        self.emit(Event::ProductUpdated(id)).await;
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> Result<(), CatalogError> {
        self.store.delete(id).await?;

        info!(product_id = id, "product deleted");
        self.emit(Event::ProductDeleted(id)).await;
        Ok(())
    }

    /// Bulk replace: from the caller's view the catalog is either fully
    /// replaced or unchanged. Drafts are validated before the store is
    /// touched so a bad record cannot leave a half-replaced catalog.
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub async fn replace_all(
        &self,
        drafts: Vec<ProductDraft>,
    ) -> Result<Vec<Product>, CatalogError> {
        let drafts = drafts
            .into_iter()
            .map(validate_draft)
            .collect::<Result<Vec<_>, _>>()?;

        let products = self.store.replace_all(drafts).await?;

        info!(count = products.len(), "catalog replaced");
        self.emit(Event::CatalogReplaced(products.len())).await;
        Ok(products)
    }

    async fn emit(&self, event: Event) {
        if let Err(err) = self.events.send(event).await {
            warn!(error = %err, "dropping catalog event, side effects will lag");
        }
    }
}

/// Required fields must be non-empty after trimming; the trimmed values are
/// what gets persisted.
fn validate_draft(mut draft: ProductDraft) -> Result<ProductDraft, CatalogError> {
    draft.name = required_field("name", &draft.name)?;
    draft.description = required_field("description", &draft.description)?;
    draft.quantity = required_field("quantity", &draft.quantity)?;
    Ok(draft)
}

/// Supplied required fields obey the same non-empty rule as on create.
fn validate_patch(mut patch: ProductPatch) -> Result<ProductPatch, CatalogError> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(required_field("name", &name)?);
    }
    if let Some(description) = patch.description.take() {
        patch.description = Some(required_field("description", &description)?);
    }
    if let Some(quantity) = patch.quantity.take() {
        patch.quantity = Some(required_field("quantity", &quantity)?);
    }
    Ok(patch)
}

fn required_field(field: &str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(format!(
            "{} is required and must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}
