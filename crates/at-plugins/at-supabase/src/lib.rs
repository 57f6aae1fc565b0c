//! # at-supabase
//!
//! Hosted backend adapter: the PostgREST table API for portfolio rows and
//! the storage API for uploaded media. Both are reached with the project's
//! anonymous key; access control lives on the backend.

use std::time::Duration;

use async_trait::async_trait;
use at_core::error::BackendError;
use at_core::load::CatalogQuery;
use at_core::models::{ItemDraft, ItemId, PortfolioItem};
use at_core::traits::{ObjectStore, PortfolioRepo};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("anonymous key is not a valid header value")]
    InvalidKey,

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Connection settings for one project.
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: SecretString,
    pub table: String,
    pub bucket: String,
    pub timeout: Duration,
}

/// One HTTP client serving both ports. Built once and shared.
pub struct SupabaseClient {
    http: Client,
    base: Url,
    table: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, ClientError> {
        let base = parse_base(&config.url)?;

        let key = config.anon_key.expose_secret();
        let mut apikey = HeaderValue::from_str(key).map_err(|_| ClientError::InvalidKey)?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| ClientError::InvalidKey)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, base, table: config.table, bucket: config.bucket })
    }

    fn table_url(&self) -> Result<Url, BackendError> {
        self.endpoint(&format!("rest/v1/{}", self.table))
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|err| BackendError::new(format!("invalid endpoint {path}: {err}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::new(err.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from(response).await)
        }
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<PortfolioItem>, BackendError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|err| BackendError::new(format!("unexpected response body: {err}")))
    }
}

fn parse_base(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    // join() replaces the last segment unless the base ends in a slash
    let normalized = if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    let url = Url::parse(&normalized).map_err(|err| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl { url: raw.to_string(), reason: "not a base URL".into() });
    }
    Ok(url)
}

/// PostgREST `order` parameter, nulls last on every key.
fn order_param(query: &CatalogQuery) -> Option<String> {
    let keys: Vec<String> = query
        .order
        .iter()
        .map(|sort| {
            let direction = if sort.ascending { "asc" } else { "desc" };
            format!("{}.{direction}.nullslast", sort.key.column())
        })
        .collect();
    (!keys.is_empty()).then(|| keys.join(","))
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Both APIs answer failures with a JSON body carrying `message`.
async fn error_from(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });
    BackendError::with_status(status.as_u16(), message)
}

#[async_trait]
impl PortfolioRepo for SupabaseClient {
    async fn list(&self, query: &CatalogQuery) -> Result<Vec<PortfolioItem>, BackendError> {
        let mut params = vec![("select", "*".to_string())];
        if query.featured_only {
            params.push(("is_featured", "eq.true".to_string()));
        }
        if let Some(order) = order_param(query) {
            params.push(("order", order));
        }

        let request = self.http.get(self.table_url()?).query(&params);
        self.rows(request).await
    }

    async fn insert(&self, draft: &ItemDraft) -> Result<PortfolioItem, BackendError> {
        let request = self
            .http
            .post(self.table_url()?)
            .header("Prefer", "return=representation")
            .json(&[draft]);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::new("insert returned no row"))
    }

    async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<PortfolioItem, BackendError> {
        let request = self
            .http
            .patch(self.table_url()?)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(draft);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::with_status(404, format!("No portfolio item with id {id}")))
    }

    async fn delete(&self, id: &ItemId) -> Result<(), BackendError> {
        let request = self.http.delete(self.table_url()?).query(&[("id", format!("eq.{id}"))]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{path}", self.bucket))?;
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(data);
        self.send(request).await?;
        tracing::debug!(bucket = %self.bucket, %path, "object stored");
        Ok(())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        self.endpoint(&format!("storage/v1/object/public/{}/{path}", self.bucket))
            .ok()
            .map(String::from)
    }
}
