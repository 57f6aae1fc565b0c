//! # Categories
//!
//! Items carry a free-text category label. The admin form offers a fixed set
//! of labels, modelled here as [`KnownCategory`]; labels written by hand or by
//! older clients are recognised through a small alias table.

use std::cmp::Ordering;
use std::fmt;

/// The admin form's canonical category list, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCategory {
    Logo,
    Emotes,
    AnimatedEmotes,
    Banner,
    Overlays,
    HandDrawn,
    Model3d,
    Model2d,
    Intros,
    Outros,
}

impl KnownCategory {
    pub const ALL: [KnownCategory; 10] = [
        KnownCategory::Logo,
        KnownCategory::Emotes,
        KnownCategory::AnimatedEmotes,
        KnownCategory::Banner,
        KnownCategory::Overlays,
        KnownCategory::HandDrawn,
        KnownCategory::Model3d,
        KnownCategory::Model2d,
        KnownCategory::Intros,
        KnownCategory::Outros,
    ];

    /// The label written to the backend when this category is picked.
    pub fn label(self) -> &'static str {
        match self {
            KnownCategory::Logo => "Logo",
            KnownCategory::Emotes => "Emotes",
            KnownCategory::AnimatedEmotes => "Animated Emotes",
            KnownCategory::Banner => "Banner",
            KnownCategory::Overlays => "Overlays",
            KnownCategory::HandDrawn => "Hand-drawn",
            KnownCategory::Model3d => "3D Model",
            KnownCategory::Model2d => "2D Model",
            KnownCategory::Intros => "Intros",
            KnownCategory::Outros => "Outros",
        }
    }

    /// Case-, dash- and plural-tolerant lookup.
    pub fn from_label(raw: &str) -> Option<Self> {
        let key = raw
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let category = match key.as_str() {
            "logo" | "logos" => KnownCategory::Logo,
            "emote" | "emotes" => KnownCategory::Emotes,
            "animated emote" | "animated emotes" => KnownCategory::AnimatedEmotes,
            "banner" | "banners" => KnownCategory::Banner,
            "overlay" | "overlays" => KnownCategory::Overlays,
            "hand drawn" | "hand drawns" | "hand drawn art" => KnownCategory::HandDrawn,
            "3d model" | "3d models" => KnownCategory::Model3d,
            "2d model" | "2d models" => KnownCategory::Model2d,
            "intro" | "intros" => KnownCategory::Intros,
            "outro" | "outros" => KnownCategory::Outros,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for KnownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A parsed category label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Known(KnownCategory),
    Other(String),
}

impl Category {
    pub fn parse(raw: &str) -> Self {
        match KnownCategory::from_label(raw) {
            Some(known) => Category::Known(known),
            None => Category::Other(raw.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Category::Known(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Known(known) => f.write_str(known.label()),
            Category::Other(raw) => f.write_str(raw),
        }
    }
}

/// Hand-authored section order. Listed categories come first in list order;
/// the rest follow alphabetically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityList(Vec<Category>);

impl PriorityList {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(labels.into_iter().map(|label| Category::parse(label.as_ref())).collect())
    }

    /// Section order of the home-page featured view.
    pub fn featured() -> Self {
        Self(
            [
                KnownCategory::Logo,
                KnownCategory::Banner,
                KnownCategory::Overlays,
                KnownCategory::Emotes,
                KnownCategory::HandDrawn,
                KnownCategory::AnimatedEmotes,
            ]
            .into_iter()
            .map(Category::Known)
            .collect(),
        )
    }

    /// Section and filter order of the full portfolio view.
    pub fn catalog() -> Self {
        Self(
            [
                KnownCategory::Logo,
                KnownCategory::Banner,
                KnownCategory::Overlays,
                KnownCategory::HandDrawn,
                KnownCategory::Emotes,
                KnownCategory::AnimatedEmotes,
            ]
            .into_iter()
            .map(Category::Known)
            .collect(),
        )
    }

    pub fn rank(&self, label: &str) -> Option<usize> {
        let category = Category::parse(label);
        self.0.iter().position(|listed| *listed == category)
    }

    /// Total order over labels; use with a stable sort so that labels
    /// comparing equal keep their input order.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) => ra.cmp(&rb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => collate(a, b),
        }
    }
}

/// Case-insensitive comparison, the ordering a browser's `localeCompare`
/// gives for the labels this site uses.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip_for_every_known_category() {
        for known in KnownCategory::ALL {
            assert_eq!(KnownCategory::from_label(known.label()), Some(known));
        }
    }

    #[test]
    fn test_hand_drawn_spellings_are_recognised() {
        for raw in ["Hand Drawn", "Hand-drawns", "hand-drawn art", "  HAND   DRAWN "] {
            assert_eq!(Category::parse(raw), Category::Known(KnownCategory::HandDrawn), "{raw}");
        }
    }

    #[test]
    fn test_unknown_label_is_kept_verbatim() {
        let category = Category::parse("Sticker Packs");
        assert!(!category.is_known());
        assert_eq!(category.to_string(), "Sticker Packs");
    }

    #[test]
    fn test_listed_categories_sort_before_unlisted() {
        let priority = PriorityList::new(["Logo", "Banner"]);
        assert_eq!(priority.compare("Banner", "Alpha"), Ordering::Less);
        assert_eq!(priority.compare("Alpha", "Logo"), Ordering::Greater);
        assert_eq!(priority.compare("Logo", "Banner"), Ordering::Less);
    }

    #[test]
    fn test_unlisted_categories_collate_case_insensitively() {
        let priority = PriorityList::new(Vec::<&str>::new());
        assert_eq!(priority.compare("intros", "Outros"), Ordering::Less);
        assert_eq!(priority.compare("2D Model", "3D Model"), Ordering::Less);
        assert_eq!(priority.compare("Stickers", "stickers"), Ordering::Equal);
    }

    #[test]
    fn test_featured_and_catalog_lists_differ_on_emotes() {
        let featured = PriorityList::featured();
        let catalog = PriorityList::catalog();
        assert_eq!(featured.compare("Emotes", "Hand Drawn"), Ordering::Less);
        assert_eq!(catalog.compare("Emotes", "Hand Drawn"), Ordering::Greater);
    }
}
