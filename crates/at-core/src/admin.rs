//! # Admin Mutation Flow
//!
//! One form buffer, either creating a new item or editing an existing one.
//! Submitting uploads any staged media, resolves public URLs, writes the
//! record and re-reads the admin table. Any failure leaves the buffer and
//! the staged files exactly as they were.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::load::{CatalogQuery, CatalogReader, LoadState};
use crate::models::{ItemDraft, ItemId, PortfolioItem};
use crate::traits::{Backend, ObjectStore, PortfolioRepo};

/// Directory inside the bucket that receives uploads.
pub const UPLOAD_PREFIX: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Creating,
    Editing(ItemId),
}

/// Which media field a staged file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Image,
    Video,
}

impl MediaSlot {
    pub fn noun(self) -> &'static str {
        match self {
            MediaSlot::Image => "image",
            MediaSlot::Video => "video",
        }
    }
}

/// A file the user picked but that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl StagedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self { file_name: file_name.into(), content_type, data }
    }

    /// Text after the last dot of the original name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Declared content type, else a guess from the extension.
    pub fn content_type(&self) -> String {
        match &self.content_type {
            Some(declared) if !declared.is_empty() => declared.clone(),
            _ => mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string(),
        }
    }

    /// Collision-resistant object path: a UUID v7 (millisecond timestamp
    /// plus random bits) keeping the original extension.
    pub fn object_path(&self) -> String {
        let stem = Uuid::now_v7().simple();
        match self.extension() {
            Some(ext) => format!("{UPLOAD_PREFIX}/{stem}.{ext}"),
            None => format!("{UPLOAD_PREFIX}/{stem}"),
        }
    }
}

/// The admin form's in-memory state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminForm {
    mode: FormMode,
    buffer: ItemDraft,
    image: Option<StagedFile>,
    video: Option<StagedFile>,
}

impl AdminForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing `item`: the buffer takes its current values and any
    /// staged files are dropped.
    pub fn begin_edit(&mut self, item: &PortfolioItem) {
        self.mode = FormMode::Editing(item.id.clone());
        self.buffer = item.draft();
        self.image = None;
        self.video = None;
    }

    /// Targets an existing record without loading its values, for a buffer
    /// rebuilt from a posted form.
    pub fn resume_edit(&mut self, id: ItemId) {
        self.mode = FormMode::Editing(id);
    }

    /// Back to an empty "new item" form.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn editing_id(&self) -> Option<&ItemId> {
        match &self.mode {
            FormMode::Editing(id) => Some(id),
            FormMode::Creating => None,
        }
    }

    pub fn buffer(&self) -> &ItemDraft {
        &self.buffer
    }

    /// Applies one control's value to the buffer. `order` maps an empty
    /// input to null; `is_featured` accepts checkbox values.
    pub fn apply_field(&mut self, name: &str, value: &str) -> Result<()> {
        let invalid = || AppError::Invalid { field: name.to_string(), value: value.to_string() };

        match name {
            "title" => self.buffer.title = value.to_string(),
            "category" => self.buffer.category = value.to_string(),
            "description" => self.buffer.description = non_empty(value),
            "image_url" => self.buffer.image_url = value.to_string(),
            "video_url" => self.buffer.video_url = non_empty(value),
            "order" => {
                self.buffer.order = match value.trim() {
                    "" => None,
                    digits => Some(digits.parse().map_err(|_| invalid())?),
                }
            }
            "is_featured" => {
                self.buffer.is_featured = match value {
                    "on" | "true" | "1" => true,
                    "" | "off" | "false" | "0" => false,
                    _ => return Err(invalid()),
                }
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Stages (or with `None`, clears) the file for a media slot.
    pub fn stage(&mut self, slot: MediaSlot, file: Option<StagedFile>) {
        match slot {
            MediaSlot::Image => self.image = file,
            MediaSlot::Video => self.video = file,
        }
    }

    pub fn staged(&self, slot: MediaSlot) -> Option<&StagedFile> {
        match slot {
            MediaSlot::Image => self.image.as_ref(),
            MediaSlot::Video => self.video.as_ref(),
        }
    }

    /// URL to preview for a slot: the current buffer value, if any.
    pub fn preview_url(&self, slot: MediaSlot) -> Option<&str> {
        match slot {
            MediaSlot::Image => non_blank(&self.buffer.image_url),
            MediaSlot::Video => self.buffer.video_url.as_deref().and_then(non_blank),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether the user confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub saved: PortfolioItem,
    /// The admin table re-read after the write.
    pub table: LoadState<Vec<PortfolioItem>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Not confirmed; nothing was sent.
    Skipped,
    Deleted { table: LoadState<Vec<PortfolioItem>> },
}

/// Runs admin mutations against the backend. Each [`AdminForm`] is borrowed
/// mutably for its whole submission; across forms, at most one mutation per
/// stored record may be in flight.
pub struct AdminService {
    repo: Arc<dyn PortfolioRepo>,
    store: Arc<dyn ObjectStore>,
    in_flight: Mutex<HashSet<ItemId>>,
}

impl AdminService {
    pub fn new(backend: &Backend) -> Self {
        Self {
            repo: Arc::clone(&backend.repo),
            store: Arc::clone(&backend.store),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Re-reads every item for the admin table.
    pub async fn refresh(&self) -> LoadState<Vec<PortfolioItem>> {
        let mut reader = CatalogReader::new(Arc::clone(&self.repo), CatalogQuery::admin_table());
        reader.load().await;
        reader.into_state()
    }

    /// Uploads staged media, writes the record, re-reads the table and
    /// resets the form. On error the form is untouched.
    pub async fn submit(&self, form: &mut AdminForm) -> Result<SubmitOutcome> {
        let _guard = match &form.mode {
            FormMode::Editing(id) => Some(RecordGuard::acquire(&self.in_flight, id)?),
            FormMode::Creating => None,
        };

        let mut draft = form.buffer.clone();
        if let Some(file) = &form.image {
            draft.image_url = self.upload(MediaSlot::Image, file).await?;
        }
        if let Some(file) = &form.video {
            draft.video_url = Some(self.upload(MediaSlot::Video, file).await?);
        }

        let written = match &form.mode {
            FormMode::Editing(id) => self.repo.update(id, &draft).await,
            FormMode::Creating => self.repo.insert(&draft).await,
        };
        let saved = written.map_err(|err| {
            tracing::error!(mode = ?form.mode, error = %err, "portfolio item write failed");
            AppError::write(err)
        })?;
        tracing::info!(id = %saved.id, category = %saved.category, "portfolio item saved");

        form.cancel();
        let table = self.refresh().await;
        Ok(SubmitOutcome { saved, table })
    }

    /// Deletes one item once confirmed; the list is re-read afterwards.
    pub async fn delete(&self, id: &ItemId, confirmation: Confirmation) -> Result<DeleteOutcome> {
        if confirmation == Confirmation::Declined {
            return Ok(DeleteOutcome::Skipped);
        }
        let _guard = RecordGuard::acquire(&self.in_flight, id)?;

        self.repo.delete(id).await.map_err(|err| {
            tracing::error!(%id, error = %err, "portfolio item delete failed");
            AppError::write(err)
        })?;
        tracing::info!(%id, "portfolio item deleted");

        Ok(DeleteOutcome::Deleted { table: self.refresh().await })
    }

    async fn upload(&self, slot: MediaSlot, file: &StagedFile) -> Result<String> {
        let path = file.object_path();
        let content_type = file.content_type();

        self.store
            .upload(&path, file.data.clone(), &content_type)
            .await
            .map_err(|err| {
                tracing::error!(slot = slot.noun(), %path, error = %err, "media upload failed");
                AppError::upload(err)
            })?;

        // no rollback: the object stays orphaned if resolution fails
        self.store.public_url(&path).ok_or_else(|| {
            tracing::error!(slot = slot.noun(), %path, "public URL unavailable after upload");
            AppError::UrlResolution(slot.noun())
        })
    }
}

/// Marks one record as being mutated; released when the mutation ends,
/// however it ends.
struct RecordGuard<'a> {
    held: &'a Mutex<HashSet<ItemId>>,
    id: ItemId,
}

impl<'a> RecordGuard<'a> {
    fn acquire(held: &'a Mutex<HashSet<ItemId>>, id: &ItemId) -> Result<Self> {
        let mut ids = held.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.clone()) {
            tracing::warn!(%id, "overlapping mutation rejected");
            return Err(AppError::Busy(id.to_string()));
        }
        Ok(Self { held, id: id.clone() })
    }
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
