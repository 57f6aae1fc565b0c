//! # Domain Models
//!
//! A portfolio item is the only entity. The backend owns `id` and
//! `created_at`; everything else is written as a full record from an
//! [`ItemDraft`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque backend identifier. Hosted tables may hand out UUIDs or integers,
/// so both are accepted and carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => ItemId(text),
            Raw::Number(number) => ItemId(number.to_string()),
        })
    }
}

/// One catalog entry as stored in the `portfolio_items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: ItemId,
    pub created_at: DateTime<Utc>,
    /// Free text; by convention one of the admin form's fixed categories.
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Static image; may be empty when a video carries the item.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Manual secondary sort within a category.
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
}

/// The media representation that wins when an item is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Media<'a> {
    Video(&'a str),
    Image(&'a str),
}

impl PortfolioItem {
    /// Video takes precedence over the image whenever a non-blank URL is set.
    pub fn media(&self) -> Media<'_> {
        match self.video_url.as_deref().map(str::trim) {
            Some(video) if !video.is_empty() => Media::Video(video),
            _ => Media::Image(&self.image_url),
        }
    }

    /// Copies the client-writable fields into a fresh draft.
    pub fn draft(&self) -> ItemDraft {
        ItemDraft {
            category: self.category.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            video_url: self.video_url.clone(),
            order: self.order,
            is_featured: self.is_featured,
        }
    }
}

/// The client-writable part of a [`PortfolioItem`]; the admin form buffer and
/// the body of every insert or full-record update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub video_url: Option<String>,
    pub order: Option<i32>,
    pub is_featured: bool,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
