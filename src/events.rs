//! Catalog change events and the background worker that turns them into
//! sitemap/notification side effects.
//!
//! Mutations never wait on these: the façade pushes an event onto the
//! channel and returns; the worker regenerates the sitemap and fires the
//! relay on its own time, swallowing (but logging) every failure.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::services::notifications::NotificationRelay;
use crate::services::sitemap::{generate_sitemap, SitemapPublisher};
use crate::store::CatalogStore;

/// Catalog change notifications emitted by the façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductAdded(i32),
    ProductUpdated(i32),
    ProductDeleted(i32),
    CatalogReplaced(usize),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Everything the worker needs to refresh the sitemap after a change.
pub struct SideEffects {
    pub store: Arc<dyn CatalogStore>,
    pub publisher: Arc<SitemapPublisher>,
    /// `None` disables search-engine notification entirely.
    pub relay: Option<Arc<NotificationRelay>>,
    pub base_url: String,
}

impl SideEffects {
    pub fn sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.base_url.trim_end_matches('/'))
    }

    /// Regenerate and persist the sitemap from the current catalog, then
    /// tell search engines. Errors are logged, never propagated.
    async fn refresh_sitemap(&self) {
        let products = match self.store.fetch_all().await {
            Ok(products) => products,
            Err(err) => {
                warn!(error = %err, "skipping sitemap refresh, catalog unreadable");
                return;
            }
        };

        let today = chrono::Utc::now().date_naive();
        let xml = generate_sitemap(&products, &self.base_url, today);

        if let Err(err) = self.publisher.write(&xml).await {
            warn!(error = %err, "failed to persist regenerated sitemap");
            return;
        }
        info!(products = products.len(), "sitemap regenerated");

        if let Some(relay) = &self.relay {
            let reports = relay.notify(&self.sitemap_url()).await;
            debug!(?reports, "search engine notification reports");
        }
    }
}

/// Consume catalog events until the channel closes.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>, effects: SideEffects) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "processing catalog event");
        effects.refresh_sitemap().await;
    }
    debug!("event channel closed, side-effect worker exiting");
}
