use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Serialize;

use crate::handlers::AppState;
use crate::services::notifications::ChannelReport;

#[derive(Serialize)]
struct NotifyResponse {
    success: bool,
    message: String,
    results: Vec<ChannelReport>,
    timestamp: String,
}

/// Fire the relay for the public sitemap URL. Always 200: per-channel
/// outcomes are in `results`, a failed channel is not an API failure.
async fn notify_search_engines(State(state): State<AppState>) -> impl IntoResponse {
    let sitemap_url = format!(
        "{}/sitemap.xml",
        state.config.base_url.trim_end_matches('/')
    );
    let results = state.relay.notify(&sitemap_url).await;

    Json(NotifyResponse {
        success: true,
        message: "Search engine notifications sent".to_string(),
        results,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/notify-search-engines", post(notify_search_engines))
}
