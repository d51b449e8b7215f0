use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;
use crate::handlers::products::IncomingProduct;
use crate::handlers::AppState;
use crate::models::Product;
use crate::services::sitemap::generate_sitemap;

#[derive(Debug, Deserialize)]
struct UpdateSitemapRequest {
    products: Vec<IncomingProduct>,
}

#[derive(Serialize)]
struct UpdateSitemapResponse {
    success: bool,
    sitemap: String,
    #[serde(rename = "productCount")]
    product_count: usize,
    timestamp: String,
}

/// Regenerate the sitemap from a caller-supplied product list and persist
/// it. The list stands on its own; the stored catalog is not consulted.
async fn update_sitemap(
    State(state): State<AppState>,
    Json(request): Json<UpdateSitemapRequest>,
) -> Result<Json<UpdateSitemapResponse>, CatalogError> {
    let products: Vec<Product> = request
        .products
        .into_iter()
        .enumerate()
        .map(|(i, incoming)| {
            let id = incoming.id.unwrap_or(i as i32 + 1);
            Product::from_draft(id, incoming.into_draft())
        })
        .collect();

    let today = chrono::Utc::now().date_naive();
    let xml = generate_sitemap(&products, &state.config.base_url, today);
    state.publisher.write(&xml).await?;

    Ok(Json(UpdateSitemapResponse {
        success: true,
        sitemap: xml,
        product_count: products.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Live sitemap document generated from the current catalog.
async fn serve_sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.catalog.list_products().await;
    let today = chrono::Utc::now().date_naive();
    let xml = generate_sitemap(&view.products, &state.config.base_url, today);

    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/update-sitemap", post(update_sitemap))
        .route("/sitemap.xml", get(serve_sitemap))
}
