use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::AppConfig;

const DEFAULT_INDEXNOW_ENDPOINT: &str = "https://api.indexnow.org/indexnow";
const DEFAULT_PING_ENDPOINTS: [(&str, &str); 2] = [
    ("Google", "https://www.google.com/ping"),
    ("Bing", "https://www.bing.com/ping"),
];
const CHANNEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Succeeded,
    Failed,
    SkippedNotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub service: String,
    pub status: ChannelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ChannelReport {
    fn succeeded(service: &str, status_code: u16) -> Self {
        Self {
            service: service.to_string(),
            status: ChannelStatus::Succeeded,
            status_code: Some(status_code),
            detail: None,
        }
    }

    fn failed(service: &str, status_code: Option<u16>, detail: String) -> Self {
        Self {
            service: service.to_string(),
            status: ChannelStatus::Failed,
            status_code,
            detail: Some(detail),
        }
    }

    fn skipped(service: &str) -> Self {
        Self {
            service: service.to_string(),
            status: ChannelStatus::SkippedNotConfigured,
            status_code: None,
            detail: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IndexNow push endpoint.
    pub indexnow_endpoint: String,
    /// Host the IndexNow key is registered for; channel is skipped if absent.
    pub indexnow_host: Option<String>,
    pub indexnow_key: Option<String>,
    /// Legacy `?sitemap=` ping endpoints, attempted independently.
    pub ping_endpoints: Vec<(String, String)>,
}

impl RelayConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            indexnow_endpoint: DEFAULT_INDEXNOW_ENDPOINT.to_string(),
            indexnow_host: config.indexnow_host.clone(),
            indexnow_key: config.indexnow_key.clone(),
            ping_endpoints: DEFAULT_PING_ENDPOINTS
                .iter()
                .map(|&(name, endpoint)| (name.to_string(), endpoint.to_string()))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct IndexNowSubmission<'a> {
    host: &'a str,
    key: &'a str,
    #[serde(rename = "urlList")]
    url_list: [&'a str; 1],
}

/// Best-effort fan-out announcing a sitemap change to search engines.
///
/// Channels run independently; no retries, no backoff. The call itself
/// never fails, it only reports per-channel outcomes.
pub struct NotificationRelay {
    http: reqwest::Client,
    config: RelayConfig,
}

impl NotificationRelay {
    pub fn new(config: RelayConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CHANNEL_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    #[instrument(skip(self))]
    pub async fn notify(&self, sitemap_url: &str) -> Vec<ChannelReport> {
        let mut tasks: Vec<BoxFuture<'_, ChannelReport>> =
            Vec::with_capacity(1 + self.config.ping_endpoints.len());

        tasks.push(Box::pin(self.submit_indexnow(sitemap_url)));
        for (name, endpoint) in &self.config.ping_endpoints {
            tasks.push(Box::pin(self.ping(name, endpoint, sitemap_url)));
        }

        let reports = join_all(tasks).await;
        for report in &reports {
            match report.status {
                ChannelStatus::Succeeded => {
                    info!(service = %report.service, "sitemap notification delivered")
                }
                ChannelStatus::Failed => warn!(
                    service = %report.service,
                    detail = report.detail.as_deref().unwrap_or(""),
                    "sitemap notification failed"
                ),
                ChannelStatus::SkippedNotConfigured => {}
            }
        }
        reports
    }

    async fn submit_indexnow(&self, sitemap_url: &str) -> ChannelReport {
        const SERVICE: &str = "IndexNow";

        let (host, key) = match (&self.config.indexnow_host, &self.config.indexnow_key) {
            (Some(host), Some(key)) => (host, key),
            _ => return ChannelReport::skipped(SERVICE),
        };

        let submission = IndexNowSubmission {
            host,
            key,
            url_list: [sitemap_url],
        };

        match self
            .http
            .post(&self.config.indexnow_endpoint)
            .json(&submission)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                ChannelReport::succeeded(SERVICE, response.status().as_u16())
            }
            Ok(response) => ChannelReport::failed(
                SERVICE,
                Some(response.status().as_u16()),
                format!("endpoint responded with {}", response.status()),
            ),
            Err(err) => ChannelReport::failed(SERVICE, None, err.to_string()),
        }
    }

    async fn ping(&self, service: &str, endpoint: &str, sitemap_url: &str) -> ChannelReport {
        let url = match Url::parse_with_params(endpoint, &[("sitemap", sitemap_url)]) {
            Ok(url) => url,
            Err(err) => return ChannelReport::failed(service, None, err.to_string()),
        };

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                ChannelReport::succeeded(service, response.status().as_u16())
            }
            Ok(response) => ChannelReport::failed(
                service,
                Some(response.status().as_u16()),
                format!("endpoint responded with {}", response.status()),
            ),
            Err(err) => ChannelReport::failed(service, None, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn indexnow_without_credentials_is_skipped_not_failed() {
        let relay = NotificationRelay::new(RelayConfig {
            indexnow_endpoint: DEFAULT_INDEXNOW_ENDPOINT.to_string(),
            indexnow_host: None,
            indexnow_key: None,
            ping_endpoints: Vec::new(),
        });

        let reports = relay.notify("https://tychem.net/sitemap.xml").await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, ChannelStatus::SkippedNotConfigured);
    }

    #[tokio::test]
    async fn unreachable_ping_endpoint_reports_failure_without_erroring() {
        let relay = NotificationRelay::new(RelayConfig {
            indexnow_endpoint: DEFAULT_INDEXNOW_ENDPOINT.to_string(),
            indexnow_host: None,
            indexnow_key: None,
            ping_endpoints: vec![(
                "Google".to_string(),
                // Reserved port on localhost, nothing listens here.
                "http://127.0.0.1:1/ping".to_string(),
            )],
        });

        let reports = relay.notify("https://tychem.net/sitemap.xml").await;
        let ping = reports.iter().find(|r| r.service == "Google").unwrap();
        assert_eq!(ping.status, ChannelStatus::Failed);
        assert!(ping.detail.is_some());
    }
}
