//! View models for the portfolio surfaces: section blurbs, media selection
//! and the loading/error/empty/sections states a page can be in.

use crate::catalog::{filter_options, CategoryFilter, CategoryGroups};
use crate::category::{Category, KnownCategory, PriorityList};
use crate::load::LoadState;
use crate::models::{Media, PortfolioItem};

/// Most tiles a home-page featured section shows.
pub const FEATURED_SECTION_LIMIT: usize = 16;

pub const DEFAULT_CATEGORY_BLURB: &str =
    "Explore our collection of premium designs crafted for streamers worldwide";

pub const DEFAULT_ITEM_DESCRIPTION: &str = "Premium design crafted for streamers";

/// Two-line marketing copy under a section heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blurb {
    pub headline: &'static str,
    pub tagline: Option<&'static str>,
}

pub fn category_blurb(label: &str) -> Blurb {
    let (headline, tagline) = match Category::parse(label) {
        Category::Known(KnownCategory::Logo) => (
            "Custom Gaming Logos Designed to Define Your Identity.",
            "Strong, unique, and perfectly crafted to represent your brand.",
        ),
        Category::Known(KnownCategory::Banner) => (
            "Eye-Catching Banners That Make Your Profile Stand Out.",
            "Designed for YouTube, Twitch, Discord, and all gaming platforms.",
        ),
        Category::Known(KnownCategory::Overlays) => (
            "Stream-Ready Overlays for a Professional, Clean Look.",
            "Enhance your stream with premium, well-designed graphics.",
        ),
        Category::Known(KnownCategory::Emotes) => (
            "Custom Emotes That Express Your Personality.",
            "Cute, fun, expressive emotes made for Twitch & Discord.",
        ),
        Category::Known(KnownCategory::HandDrawn) => (
            "Hand-Drawn Illustrations Crafted With Detail & Creativity.",
            "Original artwork made with passion, style, and artistic depth.",
        ),
        Category::Known(KnownCategory::AnimatedEmotes) => (
            "Dynamic Emotes That Bring Your Personality to Life.",
            "Engage your audience with vibrant animated expressions.",
        ),
        _ => return Blurb { headline: DEFAULT_CATEGORY_BLURB, tagline: None },
    };
    Blurb { headline, tagline: Some(tagline) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaView {
    pub is_video: bool,
    pub src: String,
    pub alt: String,
}

impl MediaView {
    pub fn of(item: &PortfolioItem) -> Self {
        let (is_video, src) = match item.media() {
            Media::Video(src) => (true, src),
            Media::Image(src) => (false, src),
        };
        Self { is_video, src: src.to_string(), alt: item.title.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub media: MediaView,
}

impl Tile {
    pub fn of(item: &PortfolioItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            description: item
                .description
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ITEM_DESCRIPTION.to_string()),
            category: item.category.clone(),
            media: MediaView::of(item),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: String,
    pub blurb: Blurb,
    pub tiles: Vec<Tile>,
}

/// What a portfolio surface renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView {
    Loading,
    Failed(String),
    /// Read succeeded with nothing to show.
    Empty,
    Sections(Vec<Section>),
}

impl CatalogView {
    /// Filters, groups and orders a read's result. `limit` caps the tiles
    /// per section.
    pub fn build(
        state: &LoadState<Vec<PortfolioItem>>,
        filter: &CategoryFilter,
        priority: &PriorityList,
        limit: Option<usize>,
    ) -> Self {
        let items = match state {
            LoadState::Idle | LoadState::Loading => return CatalogView::Loading,
            LoadState::Failure(message) => return CatalogView::Failed(message.clone()),
            LoadState::Success(items) => items,
        };

        let groups = CategoryGroups::build(filter.apply(items), priority);
        let sections: Vec<Section> = groups
            .sections()
            .map(|(category, items)| Section {
                category: category.to_string(),
                blurb: category_blurb(category),
                tiles: items
                    .iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(|item| Tile::of(item))
                    .collect(),
            })
            .collect();

        if sections.is_empty() {
            CatalogView::Empty
        } else {
            CatalogView::Sections(sections)
        }
    }
}

/// One filter button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub token: String,
    pub label: String,
    pub selected: bool,
}

/// Filter buttons for a read's result; empty until data arrives.
pub fn filter_chips(
    state: &LoadState<Vec<PortfolioItem>>,
    selected: &CategoryFilter,
    priority: &PriorityList,
) -> Vec<FilterChip> {
    let Some(items) = state.data() else {
        return Vec::new();
    };
    filter_options(items, priority)
        .into_iter()
        .map(|option| FilterChip {
            token: option.token().to_string(),
            label: option.label().to_string(),
            selected: option == *selected,
        })
        .collect()
}
