//! # at-ui
//!
//! Askama templates for the public portfolio views and the admin page.

use askama::Template;
use at_core::admin::{AdminForm, MediaSlot};
use at_core::category::KnownCategory;
use at_core::load::LoadState;
use at_core::models::PortfolioItem;
use at_core::presentation::{CatalogView, FilterChip, MediaView};

/// Home page: the featured sections.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate<'a> {
    pub title: &'a str,
    pub view: &'a CatalogView,
}

/// The full portfolio with its category filter.
#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate<'a> {
    pub title: &'a str,
    pub view: &'a CatalogView,
    pub chips: &'a [FilterChip],
}

/// The admin form plus the table of every item.
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate<'a> {
    pub title: &'a str,
    pub form: FormView,
    pub table: AdminTable,
    /// Last mutation failure, shown above the table.
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate<'a> {
    pub title: &'a str,
    pub id: &'a str,
}

/// An `<option>` of the category select.
pub struct CategoryOption {
    pub label: &'static str,
    pub selected: bool,
}

/// The form buffer flattened into input values.
pub struct FormView {
    pub editing_id: Option<String>,
    pub title: String,
    pub category: String,
    pub categories: Vec<CategoryOption>,
    pub description: String,
    pub image_url: String,
    pub video_url: String,
    pub order: String,
    pub is_featured: bool,
    pub image_preview: Option<String>,
    pub video_preview: Option<String>,
    /// Names of files picked but not yet uploaded.
    pub staged_image: Option<String>,
    pub staged_video: Option<String>,
}

impl FormView {
    pub fn of(form: &AdminForm) -> Self {
        let buffer = form.buffer();
        Self {
            editing_id: form.editing_id().map(ToString::to_string),
            title: buffer.title.clone(),
            category: buffer.category.clone(),
            categories: KnownCategory::ALL
                .into_iter()
                .map(|known| CategoryOption {
                    label: known.label(),
                    selected: known.label() == buffer.category,
                })
                .collect(),
            description: buffer.description.clone().unwrap_or_default(),
            image_url: buffer.image_url.clone(),
            video_url: buffer.video_url.clone().unwrap_or_default(),
            order: buffer.order.map(|order| order.to_string()).unwrap_or_default(),
            is_featured: buffer.is_featured,
            image_preview: form.preview_url(MediaSlot::Image).map(str::to_string),
            video_preview: form.preview_url(MediaSlot::Video).map(str::to_string),
            staged_image: form.staged(MediaSlot::Image).map(|file| file.file_name.clone()),
            staged_video: form.staged(MediaSlot::Video).map(|file| file.file_name.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// The buffer's category when it is not one of the fixed options.
    pub fn custom_category(&self) -> Option<&str> {
        let listed = self.categories.iter().any(|option| option.selected);
        (!listed && !self.category.is_empty()).then_some(self.category.as_str())
    }
}

pub struct AdminRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub is_featured: bool,
    pub media: MediaView,
}

impl AdminRow {
    pub fn of(item: &PortfolioItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            category: item.category.clone(),
            is_featured: item.is_featured,
            media: MediaView::of(item),
        }
    }
}

/// The admin table's read state.
pub enum AdminTable {
    Loading,
    Failed(String),
    Rows(Vec<AdminRow>),
}

impl AdminTable {
    pub fn of(state: &LoadState<Vec<PortfolioItem>>) -> Self {
        match state {
            LoadState::Idle | LoadState::Loading => AdminTable::Loading,
            LoadState::Failure(message) => AdminTable::Failed(message.clone()),
            LoadState::Success(items) => AdminTable::Rows(items.iter().map(AdminRow::of).collect()),
        }
    }
}
