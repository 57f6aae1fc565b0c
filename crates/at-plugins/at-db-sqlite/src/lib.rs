//! # at-db-sqlite Implementation
//!
//! Maps the `portfolio_items` table between SQLite and the `at-core` models,
//! for running without the hosted backend. The database assigns nothing:
//! ids are UUID v7 strings and `created_at` is stamped on insert.

use std::str::FromStr;

use async_trait::async_trait;
use at_core::error::BackendError;
use at_core::load::CatalogQuery;
use at_core::models::{ItemDraft, ItemId, PortfolioItem};
use at_core::traits::PortfolioRepo;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS portfolio_items (
    id          TEXT PRIMARY KEY NOT NULL,
    created_at  TEXT NOT NULL,
    category    TEXT NOT NULL,
    title       TEXT NOT NULL,
    description TEXT,
    image_url   TEXT NOT NULL DEFAULT '',
    video_url   TEXT,
    "order"     INTEGER,
    is_featured INTEGER NOT NULL DEFAULT 0
)"#;

const COLUMNS: &str =
    r#"id, created_at, category, title, description, image_url, video_url, "order", is_featured"#;

pub struct SqlitePortfolioRepo {
    pool: SqlitePool,
}

impl SqlitePortfolioRepo {
    /// Opens (creating if needed) the database and ensures the table exists.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every connection to :memory: is a separate database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        tracing::debug!("portfolio_items table ready");
        Ok(Self { pool })
    }
}

fn backend_error(err: sqlx::Error) -> BackendError {
    tracing::error!(error = %err, "sqlite query failed");
    BackendError::new(err.to_string())
}

fn row_to_item(row: &SqliteRow) -> Result<PortfolioItem, sqlx::Error> {
    Ok(PortfolioItem {
        id: ItemId::new(row.try_get::<String, _>("id")?),
        created_at: row.try_get("created_at")?,
        category: row.try_get("category")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        video_url: row.try_get("video_url")?,
        order: row.try_get("order")?,
        is_featured: row.try_get("is_featured")?,
    })
}

/// `ORDER BY` for a query. Column names come from a closed set.
fn order_clause(query: &CatalogQuery) -> String {
    if query.order.is_empty() {
        return String::new();
    }
    let keys: Vec<String> = query
        .order
        .iter()
        .map(|sort| {
            let direction = if sort.ascending { "ASC" } else { "DESC" };
            format!("\"{}\" {direction} NULLS LAST", sort.key.column())
        })
        .collect();
    format!(" ORDER BY {}", keys.join(", "))
}

#[async_trait]
impl PortfolioRepo for SqlitePortfolioRepo {
    async fn list(&self, query: &CatalogQuery) -> Result<Vec<PortfolioItem>, BackendError> {
        let filter = if query.featured_only { " WHERE is_featured = 1" } else { "" };
        let sql = format!("SELECT {COLUMNS} FROM portfolio_items{filter}{}", order_clause(query));

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(backend_error)?;
        rows.iter()
            .map(row_to_item)
            .collect::<Result<_, _>>()
            .map_err(backend_error)
    }

    async fn insert(&self, draft: &ItemDraft) -> Result<PortfolioItem, BackendError> {
        let sql = format!(
            r#"INSERT INTO portfolio_items ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7().to_string())
            .bind(Utc::now())
            .bind(&draft.category)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.image_url)
            .bind(&draft.video_url)
            .bind(draft.order)
            .bind(draft.is_featured)
            .fetch_one(&self.pool)
            .await
            .map_err(backend_error)?;
        row_to_item(&row).map_err(backend_error)
    }

    async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<PortfolioItem, BackendError> {
        let sql = format!(
            r#"UPDATE portfolio_items
               SET category = ?, title = ?, description = ?, image_url = ?, video_url = ?, "order" = ?, is_featured = ?
               WHERE id = ?
               RETURNING {COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&draft.category)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.image_url)
            .bind(&draft.video_url)
            .bind(draft.order)
            .bind(draft.is_featured)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        match row {
            Some(row) => row_to_item(&row).map_err(backend_error),
            None => Err(BackendError::with_status(404, format!("No portfolio item with id {id}"))),
        }
    }

    async fn delete(&self, id: &ItemId) -> Result<(), BackendError> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        if result.rows_affected() == 0 {
            tracing::debug!(%id, "delete matched no rows");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqlitePortfolioRepo {
        SqlitePortfolioRepo::new("sqlite::memory:").await.unwrap()
    }

    fn draft(title: &str, category: &str, order: Option<i32>, featured: bool) -> ItemDraft {
        ItemDraft {
            category: category.into(),
            title: title.into(),
            image_url: format!("/uploads/{title}.png"),
            order,
            is_featured: featured,
            ..ItemDraft::default()
        }
    }

    fn titles(items: &[PortfolioItem]) -> Vec<&str> {
        items.iter().map(|item| item.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_schema_setup_is_idempotent() {
        let repo = repo().await;
        let again = SqlitePortfolioRepo::with_pool(repo.pool.clone()).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let repo = repo().await;
        let saved = repo.insert(&draft("wolf", "Logo", Some(2), true)).await.unwrap();

        assert!(Uuid::parse_str(saved.id.as_str()).is_ok());
        assert_eq!(saved.order, Some(2));
        assert!(saved.is_featured);
        assert_eq!(saved.description, None);
    }

    #[tokio::test]
    async fn test_featured_filter_and_catalog_order() {
        let repo = repo().await;
        repo.insert(&draft("b2", "Banner", None, false)).await.unwrap();
        repo.insert(&draft("l2", "Logo", Some(2), true)).await.unwrap();
        repo.insert(&draft("b1", "Banner", Some(1), true)).await.unwrap();
        repo.insert(&draft("l1", "Logo", Some(1), false)).await.unwrap();

        let featured = repo.list(&CatalogQuery::featured()).await.unwrap();
        let mut featured_titles = titles(&featured);
        featured_titles.sort();
        assert_eq!(featured_titles, vec!["b1", "l2"]);

        let catalog = repo.list(&CatalogQuery::full_catalog()).await.unwrap();
        assert_eq!(titles(&catalog), vec!["b1", "b2", "l1", "l2"]);
    }

    #[tokio::test]
    async fn test_repeated_reads_are_equal() {
        let repo = repo().await;
        repo.insert(&draft("a", "Emotes", Some(1), true)).await.unwrap();
        repo.insert(&draft("b", "Emotes", None, true)).await.unwrap();

        let first = repo.list(&CatalogQuery::full_catalog()).await.unwrap();
        let second = repo.list(&CatalogQuery::full_catalog()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(titles(&first), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_reports_missing_rows() {
        let repo = repo().await;
        let saved = repo.insert(&draft("wolf", "Logo", None, false)).await.unwrap();

        let mut changed = saved.draft();
        changed.title = "red wolf".into();
        changed.video_url = Some("/uploads/wolf.mp4".into());
        let updated = repo.update(&saved.id, &changed).await.unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.title, "red wolf");
        assert_eq!(updated.created_at, saved.created_at);

        let missing = repo.update(&ItemId::new("nope"), &changed).await.unwrap_err();
        assert_eq!(missing.status, Some(404));
    }

    #[tokio::test]
    async fn test_delete_removes_the_row() {
        let repo = repo().await;
        let saved = repo.insert(&draft("wolf", "Logo", None, false)).await.unwrap();

        repo.delete(&saved.id).await.unwrap();
        assert!(repo.list(&CatalogQuery::admin_table()).await.unwrap().is_empty());
        repo.delete(&saved.id).await.unwrap();
    }
}
