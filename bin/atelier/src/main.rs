//! # Atelier Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use at_api::{configure_routes, middleware, AppState};
use at_config::{LogFormat, Settings};
use at_core::{Backend, ObjectStore, PortfolioRepo};
use tracing_subscriber::EnvFilter;

#[cfg(not(any(feature = "backend-supabase", all(feature = "db-sqlite", feature = "storage-local"))))]
compile_error!("enable `backend-supabase`, or both `db-sqlite` and `storage-local`");

#[cfg(feature = "db-sqlite")]
use at_db_sqlite::SqlitePortfolioRepo;

#[cfg(feature = "storage-local")]
use at_storage_local::LocalObjectStore;

#[cfg(all(feature = "backend-supabase", not(all(feature = "db-sqlite", feature = "storage-local"))))]
use at_supabase::{SupabaseClient, SupabaseConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(settings.log.format);

    let backend = build_backend(&settings).await?;
    let state = web::Data::new(AppState::new(backend, settings.server.max_upload_bytes));

    #[cfg(feature = "storage-local")]
    let uploads = (settings.local.public_prefix.clone(), settings.local.storage_root.clone());

    let addr = (settings.server.host.clone(), settings.server.port);
    tracing::info!(host = %addr.0, port = addr.1, "atelier starting");

    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .wrap(middleware::security_headers());

        // must precede the catch-all scope
        #[cfg(feature = "storage-local")]
        let app = app.service(actix_files::Files::new(&uploads.0, &uploads.1));

        app.configure(configure_routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Human => builder.init(),
    }
}

/// Builds the adapters once; they are shared by every worker.
async fn build_backend(settings: &Settings) -> anyhow::Result<Backend> {
    #[cfg(all(feature = "backend-supabase", not(all(feature = "db-sqlite", feature = "storage-local"))))]
    let hosted = {
        let (url, anon_key) = settings.backend.credentials()?;
        let client = SupabaseClient::new(SupabaseConfig {
            url: url.to_string(),
            anon_key: anon_key.clone(),
            table: settings.backend.table.clone(),
            bucket: settings.backend.bucket.clone(),
            timeout: std::time::Duration::from_secs(settings.backend.timeout_secs),
        })?;
        tracing::info!(%url, table = %settings.backend.table, bucket = %settings.backend.bucket, "hosted backend configured");
        Arc::new(client)
    };

    #[cfg(feature = "db-sqlite")]
    let repo: Arc<dyn PortfolioRepo> = {
        let repo = SqlitePortfolioRepo::new(&settings.local.database_url)
            .await
            .with_context(|| format!("opening {}", settings.local.database_url))?;
        tracing::info!(database = %settings.local.database_url, "sqlite repository ready");
        Arc::new(repo)
    };
    #[cfg(not(feature = "db-sqlite"))]
    let repo: Arc<dyn PortfolioRepo> = hosted.clone();

    #[cfg(feature = "storage-local")]
    let store: Arc<dyn ObjectStore> = {
        let store = LocalObjectStore::new(
            settings.local.storage_root.clone(),
            settings.local.public_prefix.clone(),
        );
        tracing::info!(root = %store.root().display(), "local object store ready");
        Arc::new(store)
    };
    #[cfg(not(feature = "storage-local"))]
    let store: Arc<dyn ObjectStore> = hosted;

    Ok(Backend::new(repo, store))
}
