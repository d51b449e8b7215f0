use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::CatalogError;
use crate::handlers::AppState;
use crate::models::{Product, ProductDraft, ProductPatch};

/// Product payload as the admin panel sends it; any id is ignored on
/// create and reassigned on bulk save.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingProduct {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub quantity: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cas: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub purity: Option<String>,
}

impl IncomingProduct {
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            category: self.category,
            cas: self.cas,
            location: self.location,
            manufacturer: self.manufacturer,
            purity: self.purity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManageProductsRequest {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    products: Option<Vec<IncomingProduct>>,
}

#[derive(Serialize)]
struct CatalogResponse {
    success: bool,
    products: Vec<Product>,
    /// True when the store was unreachable and the fallback list is served.
    degraded: bool,
    timestamp: String,
}

#[derive(Serialize)]
struct SaveResponse {
    success: bool,
    message: String,
    #[serde(rename = "productCount")]
    product_count: usize,
    timestamp: String,
}

async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.catalog.list_products().await;
    Json(CatalogResponse {
        success: true,
        products: view.products,
        degraded: view.degraded,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Bulk save, the shape the admin panel speaks: `{ action: "save",
/// products: [...] }`. Anything else is a 400.
async fn save_catalog(
    State(state): State<AppState>,
    Json(request): Json<ManageProductsRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let products = match (request.action.as_deref(), request.products) {
        (Some("save"), Some(products)) => products,
        _ => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request" })),
            )
                .into_response())
        }
    };

    let drafts = products.into_iter().map(IncomingProduct::into_draft).collect();
    let saved = state.catalog.replace_all(drafts).await?;

    Ok(Json(SaveResponse {
        success: true,
        message: "Products saved successfully".to_string(),
        product_count: saved.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
    .into_response())
}

async fn create_product(
    State(state): State<AppState>,
    Json(incoming): Json<IncomingProduct>,
) -> Result<impl IntoResponse, CatalogError> {
    let product = state.catalog.add_product(incoming.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, CatalogError> {
    let product = state.catalog.update_product(id, patch).await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, CatalogError> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/manage-products", get(get_catalog).post(save_catalog))
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}
