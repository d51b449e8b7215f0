use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::errors::CatalogError;
use crate::models::{Product, ProductDraft, ProductPatch};

use super::CatalogStore;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Store backed by a hosted row API (PostgREST conventions: `?select=`,
/// `?id=eq.N`, `Prefer: return=representation`).
///
/// Credentials are a URL + key pair supplied through configuration; every
/// transport failure maps to `StoreUnavailable` so reads can degrade.
pub struct RestStore {
    http: reqwest::Client,
    endpoint: String,
}

/// Row shape on the wire; `cas` is stored under `cas_number` server-side.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    id: i32,
    name: String,
    description: String,
    quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cas_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purity: Option<String>,
}

impl From<Row> for Product {
    fn from(row: Row) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            quantity: row.quantity,
            category: row.category,
            cas: row.cas_number,
            location: row.location,
            manufacturer: row.manufacturer,
            purity: row.purity,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    description: &'a str,
    quantity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cas_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manufacturer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purity: Option<&'a str>,
}

impl<'a> InsertRow<'a> {
    fn from_draft(draft: &'a ProductDraft) -> Self {
        Self {
            name: &draft.name,
            description: &draft.description,
            quantity: &draft.quantity,
            category: draft.category.as_deref(),
            cas_number: draft.cas.as_deref(),
            location: draft.location.as_deref(),
            manufacturer: draft.manufacturer.as_deref(),
            purity: draft.purity.as_deref(),
        }
    }
}

impl RestStore {
    pub fn new(endpoint: impl Into<String>, api_key: &str) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(api_key)
            .map_err(|_| CatalogError::store_unavailable("REST store api key is not a valid header value"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| CatalogError::store_unavailable("REST store api key is not a valid header value"))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::store_unavailable(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn rows_url(&self) -> String {
        format!("{}/products", self.endpoint)
    }

    async fn expect_rows(&self, response: reqwest::Response) -> Result<Vec<Row>, CatalogError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "REST store rejected request");
            return Err(CatalogError::store_unavailable(format!(
                "store responded with {}",
                status
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogStore for RestStore {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .http
            .get(self.rows_url())
            .query(&[("select", "*"), ("order", "id.asc")])
            .send()
            .await?;

        let rows = self.expect_rows(response).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn insert(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let response = self
            .http
            .post(self.rows_url())
            .header("Prefer", "return=representation")
            .json(&InsertRow::from_draft(&draft))
            .send()
            .await?;

        let mut rows = self.expect_rows(response).await?;
        rows.pop()
            .map(Product::from)
            .ok_or_else(|| CatalogError::store_unavailable("store returned no row for insert"))
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Product, CatalogError> {
        let mut body = serde_json::Map::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                body.insert(key.to_string(), serde_json::Value::String(v));
            }
        };
        set("name", patch.name);
        set("description", patch.description);
        set("quantity", patch.quantity);
        set("category", patch.category);
        set("cas_number", patch.cas);
        set("location", patch.location);
        set("manufacturer", patch.manufacturer);
        set("purity", patch.purity);

        let response = self
            .http
            .patch(self.rows_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&serde_json::Value::Object(body))
            .send()
            .await?;

        let mut rows = self.expect_rows(response).await?;
        rows.pop()
            .map(Product::from)
            .ok_or_else(|| CatalogError::NotFound(format!("Product with id {} not found", id)))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let response = self
            .http
            .delete(self.rows_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let rows = self.expect_rows(response).await?;
        if rows.is_empty() {
            return Err(CatalogError::NotFound(format!(
                "Product with id {} not found",
                id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>, CatalogError> {
        // Delete-all-then-insert; the brief inconsistent window is accepted.
        let response = self
            .http
            .delete(self.rows_url())
            .query(&[("id", "gt.0")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::store_unavailable(format!(
                "store responded with {} while clearing catalog",
                status
            )));
        }

        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<InsertRow<'_>> = drafts.iter().map(InsertRow::from_draft).collect();
        let response = self
            .http
            .post(self.rows_url())
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let rows = self.expect_rows(response).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn check(&self) -> Result<(), CatalogError> {
        let response = self
            .http
            .get(self.rows_url())
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CatalogError::store_unavailable(format!(
                "store responded with {}",
                response.status()
            )))
        }
    }
}
