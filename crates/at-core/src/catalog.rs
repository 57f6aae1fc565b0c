//! # Grouping and Filtering
//!
//! Pure transformations from a fetched item sequence to the sections a view
//! renders. Nothing here is persisted; it is recomputed on every read.

use std::collections::HashMap;

use crate::category::{Category, PriorityList};
use crate::models::PortfolioItem;

/// Items bucketed by their category label, plus the section order.
#[derive(Debug, Clone, Default)]
pub struct CategoryGroups<'a> {
    groups: HashMap<&'a str, Vec<&'a PortfolioItem>>,
    order: Vec<&'a str>,
}

impl<'a> CategoryGroups<'a> {
    /// Groups `items` by exact category label. Input order is preserved
    /// inside each group; groups are ordered by `priority`.
    pub fn build<I>(items: I, priority: &PriorityList) -> Self
    where
        I: IntoIterator<Item = &'a PortfolioItem>,
    {
        let mut groups: HashMap<&'a str, Vec<&'a PortfolioItem>> = HashMap::new();
        let mut order = Vec::new();

        for item in items {
            let bucket = groups.entry(item.category.as_str()).or_insert_with(|| {
                order.push(item.category.as_str());
                Vec::new()
            });
            bucket.push(item);
        }

        // stable: equal labels keep first-seen order
        order.sort_by(|a, b| priority.compare(a, b));

        Self { groups, order }
    }

    /// Section labels in render order.
    pub fn order(&self) -> &[&'a str] {
        &self.order
    }

    pub fn get(&self, category: &str) -> Option<&[&'a PortfolioItem]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    /// Non-empty sections in render order.
    pub fn sections(&self) -> impl Iterator<Item = (&'a str, &[&'a PortfolioItem])> + '_ {
        self.order.iter().filter_map(|category| {
            self.groups
                .get(category)
                .filter(|items| !items.is_empty())
                .map(|items| (*category, items.as_slice()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }
}

/// A user's category selection. `All` is the no-filter sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub const ALL_TOKEN: &'static str = "All";

    /// Reads a selection token, e.g. from a query string.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            None | Some("") => CategoryFilter::All,
            Some(token) if token == Self::ALL_TOKEN => CategoryFilter::All,
            Some(token) => CategoryFilter::Only(token.to_string()),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            CategoryFilter::All => Self::ALL_TOKEN,
            CategoryFilter::Only(category) => category,
        }
    }

    /// Button text for this selection.
    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "All Work",
            CategoryFilter::Only(category) => category,
        }
    }

    pub fn matches(&self, item: &PortfolioItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == *category,
        }
    }

    /// The matching subsequence; `All` passes everything through in order.
    pub fn apply<'a>(&self, items: &'a [PortfolioItem]) -> Vec<&'a PortfolioItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Selectable filters for the fetched data: `All` first, then every label
/// present in `items`, ordered by `priority`.
pub fn filter_options(items: &[PortfolioItem], priority: &PriorityList) -> Vec<CategoryFilter> {
    let mut present: Vec<&str> = Vec::new();
    for item in items {
        if !present.contains(&item.category.as_str()) {
            present.push(&item.category);
        }
    }
    present.sort_by(|a, b| priority.compare(a, b));

    for label in present.iter().filter(|label| !Category::parse(label).is_known()) {
        tracing::debug!(category = %label, "non-canonical category label in catalog data");
    }

    std::iter::once(CategoryFilter::All)
        .chain(present.into_iter().map(|label| CategoryFilter::Only(label.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;
    use chrono::Utc;

    fn item(id: &str, category: &str, order: Option<i32>) -> PortfolioItem {
        PortfolioItem {
            id: ItemId::new(id),
            created_at: Utc::now(),
            category: category.to_string(),
            title: format!("item {id}"),
            description: None,
            image_url: format!("https://cdn.example/{id}.png"),
            video_url: None,
            order,
            is_featured: false,
        }
    }

    fn flatten<'a>(groups: &CategoryGroups<'a>) -> Vec<&'a PortfolioItem> {
        groups.sections().flat_map(|(_, items)| items.iter().copied()).collect()
    }

    fn ids(items: &[&PortfolioItem]) -> Vec<String> {
        items.iter().map(|item| item.id.to_string()).collect()
    }

    #[test]
    fn test_grouping_keeps_input_order_inside_a_category() {
        let items = vec![
            item("a", "Logo", Some(2)),
            item("b", "Logo", Some(1)),
            item("c", "Banner", None),
        ];
        let priority = PriorityList::new(["Logo", "Banner"]);
        let groups = CategoryGroups::build(&items, &priority);

        assert_eq!(groups.order(), &["Logo", "Banner"]);
        assert_eq!(ids(groups.get("Logo").unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_listed_categories_come_before_unlisted_regardless_of_input() {
        let items = vec![
            item("1", "Aardvarks", None),
            item("2", "Banner", None),
            item("3", "Zines", None),
            item("4", "Logo", None),
        ];
        let priority = PriorityList::new(["Logo", "Banner"]);
        let groups = CategoryGroups::build(&items, &priority);

        assert_eq!(groups.order(), &["Logo", "Banner", "Aardvarks", "Zines"]);
    }

    #[test]
    fn test_unlisted_ties_keep_first_seen_order() {
        let items = vec![item("1", "stickers", None), item("2", "Stickers", None)];
        let groups = CategoryGroups::build(&items, &PriorityList::new(["Logo"]));

        assert_eq!(groups.order(), &["stickers", "Stickers"]);
    }

    #[test]
    fn test_flatten_is_a_permutation_of_the_input() {
        let items = vec![
            item("1", "Emotes", None),
            item("2", "Logo", None),
            item("3", "Intros", None),
            item("4", "Emotes", None),
            item("5", "Logo", None),
        ];
        let groups = CategoryGroups::build(&items, &PriorityList::catalog());

        let mut flattened = ids(&flatten(&groups));
        flattened.sort();
        assert_eq!(flattened, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_empty_input_has_no_sections() {
        let items: Vec<PortfolioItem> = Vec::new();
        let groups = CategoryGroups::build(&items, &PriorityList::catalog());
        assert!(groups.is_empty());
        assert_eq!(groups.sections().count(), 0);
    }

    #[test]
    fn test_filter_all_is_identity() {
        let items = vec![item("1", "Logo", None), item("2", "Banner", None), item("3", "Logo", None)];
        let filtered = CategoryFilter::All.apply(&items);
        assert_eq!(ids(&filtered), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_filter_only_keeps_exact_matches() {
        let items = vec![item("1", "Logo", None), item("2", "Banner", None), item("3", "Logo", None)];
        let filtered = CategoryFilter::Only("Logo".into()).apply(&items);
        assert_eq!(ids(&filtered), vec!["1", "3"]);

        let none = CategoryFilter::Only("logo".into()).apply(&items);
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_token_parsing() {
        assert_eq!(CategoryFilter::from_token(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_token(Some("All")), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_token(Some(" ")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_token(Some("Banner")),
            CategoryFilter::Only("Banner".into())
        );
        assert_eq!(CategoryFilter::All.label(), "All Work");
    }

    #[test]
    fn test_filter_options_follow_the_data() {
        let items = vec![
            item("1", "Emotes", None),
            item("2", "Stickers", None),
            item("3", "Logo", None),
            item("4", "Emotes", None),
        ];
        let options = filter_options(&items, &PriorityList::catalog());
        let tokens: Vec<&str> = options.iter().map(CategoryFilter::token).collect();
        assert_eq!(tokens, vec!["All", "Logo", "Emotes", "Stickers"]);

        let empty = filter_options(&[], &PriorityList::catalog());
        assert_eq!(empty, vec![CategoryFilter::All]);
    }
}
