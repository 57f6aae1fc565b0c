//! atelier/crates/at-core/src/lib.rs
//!
//! The central domain logic and port definitions for the Atelier portfolio.

pub mod admin;
pub mod catalog;
pub mod category;
pub mod error;
pub mod load;
pub mod models;
pub mod presentation;
pub mod traits;

// Re-exporting for easier access in other crates
pub use admin::*;
pub use catalog::*;
pub use category::*;
pub use error::*;
pub use load::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;

    #[test]
    fn test_item_deserializes_from_backend_row() {
        let row = serde_json::json!({
            "id": "5b0c8a9e-5c1e-4a61-9d55-3f1d1a0a2c11",
            "created_at": "2024-03-01T12:30:00.000000+00:00",
            "category": "Logo",
            "title": "Wolf crest",
            "description": null,
            "image_url": "https://cdn.example/wolf.png",
            "video_url": null,
            "order": 3,
            "is_featured": true
        });
        let item: PortfolioItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.id.as_str(), "5b0c8a9e-5c1e-4a61-9d55-3f1d1a0a2c11");
        assert_eq!(item.order, Some(3));
        assert!(item.is_featured);
        assert_eq!(item.media(), Media::Image("https://cdn.example/wolf.png"));
    }

    #[test]
    fn test_numeric_id_is_carried_as_text() {
        let row = serde_json::json!({
            "id": 42,
            "created_at": "2024-03-01T12:30:00Z",
            "category": "Banner",
            "title": "Twitch banner",
            "image_url": null,
            "video_url": "https://cdn.example/banner.mp4"
        });
        let item: PortfolioItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.id.as_str(), "42");
        assert_eq!(item.image_url, "");
        assert!(!item.is_featured);
        assert_eq!(item.media(), Media::Video("https://cdn.example/banner.mp4"));
    }
}
