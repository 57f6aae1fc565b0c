//! # Core Traits (Ports)
//!
//! Any backend plugin must implement these traits to be used by the binary.
//! Adapters are constructed once at start-up and shared behind `Arc`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BackendError;
use crate::load::CatalogQuery;
use crate::models::{ItemDraft, ItemId, PortfolioItem};

/// Table access for portfolio items.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PortfolioRepo: Send + Sync {
    /// Returns every row matching the query, in the query's order.
    async fn list(&self, query: &CatalogQuery) -> Result<Vec<PortfolioItem>, BackendError>;

    /// Inserts one record; the backend assigns `id` and `created_at`.
    async fn insert(&self, draft: &ItemDraft) -> Result<PortfolioItem, BackendError>;

    /// Replaces every client-writable field of the record with `id`.
    async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<PortfolioItem, BackendError>;

    async fn delete(&self, id: &ItemId) -> Result<(), BackendError>;
}

/// Object storage for uploaded media.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` at `path`. Must fail if an object already exists there.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), BackendError>;

    /// Returns the publicly fetchable URL for a stored path, if one can be built.
    fn public_url(&self, path: &str) -> Option<String>;
}

/// The backend collaborator as a whole.
#[derive(Clone)]
pub struct Backend {
    pub repo: Arc<dyn PortfolioRepo>,
    pub store: Arc<dyn ObjectStore>,
}

impl Backend {
    pub fn new(repo: Arc<dyn PortfolioRepo>, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }
}
