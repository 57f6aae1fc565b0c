//! # at-api Handlers
//!
//! Each page issues its own catalog read on render. Admin mutations drive
//! [`AdminService`]: success redirects to `/admin`, failure re-renders the
//! page around the posted form.

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use askama::Template;
use at_core::presentation::{filter_chips, CatalogView, FEATURED_SECTION_LIMIT};
use at_core::{
    AdminForm, AdminService, AppError, Backend, CatalogQuery, CatalogReader, CategoryFilter,
    Confirmation, DeleteOutcome, ItemId, LoadState, PortfolioItem, PriorityList,
};
use at_ui::{AdminTable, AdminTemplate, ConfirmDeleteTemplate, FormView, HomeTemplate, PortfolioTemplate};
use serde::Deserialize;

use crate::error::{status_of, ApiError};
use crate::multipart::decode_admin_form;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub backend: Backend,
    pub admin: AdminService,
    /// Per-field cap on multipart bodies.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(backend: Backend, max_upload_bytes: usize) -> Self {
        let admin = AdminService::new(&backend);
        Self { backend, admin, max_upload_bytes }
    }

    async fn read(&self, query: CatalogQuery) -> LoadState<Vec<PortfolioItem>> {
        let mut reader = CatalogReader::new(Arc::clone(&self.backend.repo), query);
        reader.load().await;
        reader.into_state()
    }
}

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub edit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub confirm: Option<String>,
}

/// Renders the featured sections on `/`.
pub async fn home(data: web::Data<AppState>) -> HttpResponse {
    let state = data.read(CatalogQuery::featured()).await;
    let view = CatalogView::build(
        &state,
        &CategoryFilter::All,
        &PriorityList::featured(),
        Some(FEATURED_SECTION_LIMIT),
    );
    render(StatusCode::OK, &HomeTemplate { title: "Home", view: &view })
}

/// Renders the full catalog, optionally narrowed to one category.
pub async fn portfolio(data: web::Data<AppState>, query: web::Query<PortfolioQuery>) -> HttpResponse {
    let filter = CategoryFilter::from_token(query.category.as_deref());
    let priority = PriorityList::catalog();

    let state = data.read(CatalogQuery::full_catalog()).await;
    let view = CatalogView::build(&state, &filter, &priority, None);
    let chips = filter_chips(&state, &filter, &priority);

    render(StatusCode::OK, &PortfolioTemplate { title: "Portfolio", view: &view, chips: &chips })
}

/// The admin page. `?edit={id}` loads that record into the form.
pub async fn admin(data: web::Data<AppState>, query: web::Query<AdminQuery>) -> HttpResponse {
    let table = data.admin.refresh().await;

    let mut form = AdminForm::new();
    if let Some(id) = query.edit.as_deref() {
        match table.data().and_then(|items| items.iter().find(|item| item.id.as_str() == id)) {
            Some(item) => form.begin_edit(item),
            None => tracing::warn!(%id, "edit requested for an item not in the table"),
        }
    }

    render_admin(StatusCode::OK, &form, &table, None)
}

/// Creates or updates one item from the multipart admin form.
pub async fn submit_item(data: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse, ApiError> {
    let decoded = decode_admin_form(payload, data.max_upload_bytes).await?;
    let mut form = decoded.form;

    if let Some(err) = decoded.rejected.first() {
        return Ok(render_failure(&data, &form, err).await);
    }

    match data.admin.submit(&mut form).await {
        Ok(outcome) => {
            tracing::debug!(id = %outcome.saved.id, "redirecting after save");
            Ok(see_other("/admin"))
        }
        Err(err) => Ok(render_failure(&data, &form, &err).await),
    }
}

/// Asks for confirmation before anything is sent.
pub async fn confirm_delete(path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    render(StatusCode::OK, &ConfirmDeleteTemplate { title: "Delete Item", id: &id })
}

/// Deletes one item, but only when the form carries `confirm=yes`.
pub async fn delete_item(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<DeleteForm>,
) -> HttpResponse {
    let id = ItemId::new(path.into_inner());
    let confirmation = match form.confirm.as_deref() {
        Some("yes") => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    };

    match data.admin.delete(&id, confirmation).await {
        Ok(DeleteOutcome::Skipped | DeleteOutcome::Deleted { .. }) => see_other("/admin"),
        Err(err) => render_failure(&data, &AdminForm::new(), &err).await,
    }
}

/// Re-renders the admin page around `form`, unchanged, with the error shown.
async fn render_failure(data: &AppState, form: &AdminForm, err: &AppError) -> HttpResponse {
    let table = data.admin.refresh().await;
    let message = err.to_string();
    render_admin(status_of(err), form, &table, Some(&message))
}

fn render_admin(
    status: StatusCode,
    form: &AdminForm,
    table: &LoadState<Vec<PortfolioItem>>,
    error: Option<&str>,
) -> HttpResponse {
    let template = AdminTemplate {
        title: "Admin",
        form: FormView::of(form),
        table: AdminTable::of(table),
        error,
    };
    render(status, &template)
}

fn render<T: Template>(status: StatusCode, template: &T) -> HttpResponse {
    match template.render() {
        Ok(html) => HttpResponse::build(status).content_type(ContentType::html()).body(html),
        Err(err) => {
            tracing::error!(error = %err, "template rendering failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
