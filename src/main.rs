use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use http::HeaderValue;
use tokio::{signal, sync::mpsc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use tychem_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Select the catalog backend; the rest of the application only ever
    // sees the CatalogStore trait.
    let store: Arc<dyn api::store::CatalogStore> =
        match cfg.store_backend.to_ascii_lowercase().as_str() {
            "file" => {
                info!(path = %cfg.products_file, "using file catalog store");
                Arc::new(api::store::FileStore::new(&cfg.products_file))
            }
            "database" => {
                let db = api::db::establish_connection_from_app_config(&cfg).await?;
                if cfg.auto_migrate {
                    api::db::run_migrations(&db).await.map_err(|e| {
                        error!("Failed running migrations: {}", e);
                        e
                    })?;
                }
                info!("using database catalog store");
                Arc::new(api::store::SqlStore::new(Arc::new(db)))
            }
            "rest" => {
                let endpoint = cfg
                    .rest_endpoint
                    .clone()
                    .context("rest backend requires rest_endpoint")?;
                let api_key = cfg
                    .rest_api_key
                    .clone()
                    .context("rest backend requires rest_api_key")?;
                info!(%endpoint, "using REST catalog store");
                Arc::new(api::store::RestStore::new(endpoint, &api_key)?)
            }
            _ => {
                info!("using in-memory catalog store seeded with defaults");
                Arc::new(api::store::MemoryStore::with_seed(
                    api::models::fallback_catalog(),
                ))
            }
        };

    // Init events
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = api::events::EventSender::new(event_tx);

    let publisher = Arc::new(api::services::sitemap::SitemapPublisher::new(
        &cfg.sitemap_path,
    ));
    let relay = Arc::new(api::services::notifications::NotificationRelay::new(
        api::services::notifications::RelayConfig::from_app_config(&cfg),
    ));

    if cfg.notify_search_engines {
        info!("search engine notification enabled");
    } else {
        info!("search engine notification disabled by configuration");
    }

    // Spawn the side-effect worker that keeps the sitemap in step with the
    // catalog and pings search engines.
    let effects = api::events::SideEffects {
        store: store.clone(),
        publisher: publisher.clone(),
        relay: cfg.notify_search_engines.then(|| relay.clone()),
        base_url: cfg.base_url.clone(),
    };
    tokio::spawn(api::events::process_events(event_rx, effects));

    let catalog = Arc::new(api::services::catalog::CatalogService::new(
        store,
        event_sender,
    ));

    // Compose shared app state
    let app_state = api::AppState {
        config: cfg.clone(),
        catalog,
        publisher,
        relay,
    };

    // Build CORS layer from config
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    let cors_layer = if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        error!("Missing CORS configuration; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        return Err(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .into(),
        );
    };

    let app = api::handlers::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .layer(TimeoutLayer::new(Duration::from_secs(
            cfg.request_timeout_secs,
        )))
        .with_state(app_state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("tychem-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
