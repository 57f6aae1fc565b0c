//! # Catalog Reader
//!
//! Each view issues its own read when it is rendered; there is no cache and
//! no retry. The outcome is an explicit [`LoadState`].

use std::sync::Arc;

use crate::error::BackendError;
use crate::models::PortfolioItem;
use crate::traits::PortfolioRepo;

/// Lifecycle of one asynchronous read.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    /// Backend message, verbatim.
    Failure(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Idle | LoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failure(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, BackendError>> for LoadState<T> {
    fn from(result: Result<T, BackendError>) -> Self {
        match result {
            Ok(data) => LoadState::Success(data),
            Err(err) => LoadState::Failure(err.message),
        }
    }
}

/// Columns a catalog read may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Category,
    Order,
}

impl SortKey {
    /// Backend column name.
    pub fn column(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Category => "category",
            SortKey::Order => "order",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortOrder {
    pub fn asc(key: SortKey) -> Self {
        Self { key, ascending: true }
    }

    pub fn desc(key: SortKey) -> Self {
        Self { key, ascending: false }
    }
}

/// What a view asks the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Restrict to `is_featured = true`.
    pub featured_only: bool,
    /// Applied left to right; nulls sort last.
    pub order: Vec<SortOrder>,
}

impl CatalogQuery {
    /// Home-page highlights, newest first.
    pub fn featured() -> Self {
        Self {
            featured_only: true,
            order: vec![SortOrder::desc(SortKey::CreatedAt)],
        }
    }

    /// The full portfolio, by category then manual order.
    pub fn full_catalog() -> Self {
        Self {
            featured_only: false,
            order: vec![SortOrder::asc(SortKey::Category), SortOrder::asc(SortKey::Order)],
        }
    }

    /// Every item for the admin table, newest first.
    pub fn admin_table() -> Self {
        Self {
            featured_only: false,
            order: vec![SortOrder::desc(SortKey::CreatedAt)],
        }
    }
}

/// Issues one read against the repo and tracks its state.
pub struct CatalogReader {
    repo: Arc<dyn PortfolioRepo>,
    query: CatalogQuery,
    state: LoadState<Vec<PortfolioItem>>,
}

impl CatalogReader {
    pub fn new(repo: Arc<dyn PortfolioRepo>, query: CatalogQuery) -> Self {
        Self { repo, query, state: LoadState::Idle }
    }

    pub fn state(&self) -> &LoadState<Vec<PortfolioItem>> {
        &self.state
    }

    pub fn into_state(self) -> LoadState<Vec<PortfolioItem>> {
        self.state
    }

    /// Runs the read once. Failures are logged and kept as the state; they
    /// are never retried.
    pub async fn load(&mut self) -> &LoadState<Vec<PortfolioItem>> {
        self.state = LoadState::Loading;
        let result = self.repo.list(&self.query).await;
        match &result {
            Ok(items) => tracing::debug!(
                featured_only = self.query.featured_only,
                count = items.len(),
                "catalog read completed"
            ),
            Err(err) => tracing::warn!(
                featured_only = self.query.featured_only,
                status = ?err.status,
                error = %err,
                "catalog read failed"
            ),
        }
        self.state = result.into();
        &self.state
    }
}
