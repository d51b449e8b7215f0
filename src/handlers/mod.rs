pub mod health;
pub mod notify;
pub mod products;
pub mod sitemap;

use axum::Router;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// All HTTP routes, composed the same way regardless of backend.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(sitemap::routes())
        .merge(notify::routes())
        .nest("/health", health::routes())
}
