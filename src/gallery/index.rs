//! Group resolution for the photo gallery.
//!
//! A click on a gallery card opens the lightbox on a *group* of slides. The
//! group is either the expansion of the clicked item's own sub-items (an
//! event's photo set) or every item sharing the clicked item's category.
//! Groups are rebuilt on every click and never cached.

use tracing::debug;

use crate::error::GalleryError;
use crate::models::{file_name_of, GalleryItem, Slide};

/// A non-empty, ordered run of slides shown together in the lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    slides: Vec<Slide>,
}

impl Group {
    /// Fails with `EmptyGroup` when `slides` is empty.
    pub fn new(slides: Vec<Slide>) -> Result<Self, GalleryError> {
        if slides.is_empty() {
            return Err(GalleryError::EmptyGroup);
        }
        Ok(Self { slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false for a constructed group.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.slides.iter()
    }
}

/// How a group was formed; decided once per click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    SubItems,
    Category,
}

/// Output of [`GalleryIndex::resolve_group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub group: Group,
    pub start: usize,
    pub grouping: Grouping,
}

/// Which categories the gallery grid shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

pub struct GalleryIndex;

impl GalleryIndex {
    /// Resolves the group a clicked item belongs to and where to start in it.
    pub fn resolve_group(
        items: &[GalleryItem],
        clicked: &GalleryItem,
    ) -> Result<ResolvedGroup, GalleryError> {
        if items.is_empty() {
            return Err(GalleryError::EmptyGroup);
        }

        let resolved = if clicked.has_sub_items() {
            Self::expand_sub_items(clicked)?
        } else {
            Self::group_by_category(items, clicked)?
        };

        debug!(
            item = clicked.id,
            grouping = ?resolved.grouping,
            len = resolved.group.len(),
            start = resolved.start,
            "Resolved gallery group"
        );
        Ok(resolved)
    }

    fn expand_sub_items(clicked: &GalleryItem) -> Result<ResolvedGroup, GalleryError> {
        // Every slide shares the parent's description.
        let slides: Vec<Slide> = clicked
            .sub_items
            .iter()
            .enumerate()
            .map(|(i, media)| Slide {
                id: i as i64 + 1,
                title: format!("{} {}", clicked.title, i + 1),
                description: clicked.description.clone(),
                category: clicked.category.clone(),
                media: media.clone(),
            })
            .collect();

        // Thumbnails and sub-item lists may use different path prefixes.
        let clicked_file = clicked.media_file_name();
        let start = slides
            .iter()
            .position(|slide| file_name_of(&slide.media) == clicked_file)
            .unwrap_or(0);

        Ok(ResolvedGroup {
            group: Group::new(slides)?,
            start,
            grouping: Grouping::SubItems,
        })
    }

    fn group_by_category(
        items: &[GalleryItem],
        clicked: &GalleryItem,
    ) -> Result<ResolvedGroup, GalleryError> {
        let members: Vec<&GalleryItem> = items
            .iter()
            .filter(|item| item.category == clicked.category)
            .collect();

        let start = members
            .iter()
            .position(|item| item.id == clicked.id)
            .unwrap_or(0);

        let slides = members.into_iter().map(Slide::from).collect();
        Ok(ResolvedGroup {
            group: Group::new(slides)?,
            start,
            grouping: Grouping::Category,
        })
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(items: &[GalleryItem]) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for item in items {
            if !seen.iter().any(|c| c == &item.category) {
                seen.push(item.category.clone());
            }
        }
        seen
    }

    /// One card per category for the gallery grid: the first item of each.
    ///
    /// With `CategoryFilter::All` the categories follow `category_order`
    /// (or first appearance when the order is empty); categories without
    /// items are skipped.
    pub fn representatives<'a>(
        items: &'a [GalleryItem],
        filter: &CategoryFilter,
        category_order: &[String],
    ) -> Vec<&'a GalleryItem> {
        let categories: Vec<String> = match filter {
            CategoryFilter::Only(category) => vec![category.clone()],
            CategoryFilter::All if category_order.is_empty() => Self::categories(items),
            CategoryFilter::All => category_order.to_vec(),
        };

        categories
            .iter()
            .filter_map(|category| items.iter().find(|item| &item.category == category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, category: &str) -> GalleryItem {
        GalleryItem::new(id, format!("Item {id}"), category, format!("/p/{id}.png"))
    }

    fn event_item() -> GalleryItem {
        GalleryItem::new(
            7,
            "Mediteraneo",
            "Live",
            "/thumbs/mediteraneo3.png",
        )
        .with_description("Festival set")
        .with_sub_items([
            "/photos/med/mediteraneo1.png",
            "/photos/med/mediteraneo2.svg",
            "/photos/med/mediteraneo3.png",
            "/photos/med/mediteraneo4.png",
        ])
    }

    #[test]
    fn test_category_grouping_scenario() {
        let items = vec![item(1, "A"), item(2, "A"), item(3, "B")];
        let resolved = GalleryIndex::resolve_group(&items, &items[1]).unwrap();

        assert_eq!(resolved.grouping, Grouping::Category);
        let ids: Vec<i64> = resolved.group.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(resolved.start, 1);
    }

    #[test]
    fn test_category_grouping_preserves_relative_order() {
        let items = vec![
            item(5, "B"),
            item(1, "A"),
            item(9, "B"),
            item(2, "C"),
            item(4, "B"),
        ];
        for clicked in items.iter().filter(|i| i.category == "B") {
            let resolved = GalleryIndex::resolve_group(&items, clicked).unwrap();
            let ids: Vec<i64> = resolved.group.iter().map(|s| s.id).collect();
            assert_eq!(ids, vec![5, 9, 4]);
            assert_eq!(resolved.group.get(resolved.start).unwrap().id, clicked.id);
        }
    }

    #[test]
    fn test_sub_item_expansion() {
        let clicked = event_item();
        let items = vec![item(1, "Portraits"), clicked.clone()];
        let resolved = GalleryIndex::resolve_group(&items, &clicked).unwrap();

        assert_eq!(resolved.grouping, Grouping::SubItems);
        assert_eq!(resolved.group.len(), 4);
        // Matched by filename despite the differing prefix.
        assert_eq!(resolved.start, 2);

        let third = resolved.group.get(2).unwrap();
        assert_eq!(third.title, "Mediteraneo 3");
        assert_eq!(third.id, 3);
        assert_eq!(third.category, "Live");
        assert_eq!(third.media, "/photos/med/mediteraneo3.png");
        assert!(resolved
            .group
            .iter()
            .all(|s| s.description == "Festival set"));
    }

    #[test]
    fn test_sub_item_start_defaults_to_zero() {
        let mut clicked = event_item();
        clicked.media = "/thumbs/cover.png".into();
        let resolved = GalleryIndex::resolve_group(&[clicked.clone()], &clicked).unwrap();
        assert_eq!(resolved.start, 0);
    }

    #[test]
    fn test_filename_match_is_exact_not_substring() {
        let clicked = GalleryItem::new(1, "Set", "Live", "/t/shot1.png")
            .with_sub_items(["/a/shot10.png", "/a/shot1.png"]);
        let resolved = GalleryIndex::resolve_group(&[clicked.clone()], &clicked).unwrap();
        assert_eq!(resolved.start, 1);
    }

    #[test]
    fn test_empty_items_fail() {
        let clicked = item(1, "A");
        assert_eq!(
            GalleryIndex::resolve_group(&[], &clicked),
            Err(GalleryError::EmptyGroup)
        );
    }

    #[test]
    fn test_unknown_category_fails() {
        let items = vec![item(1, "A")];
        let stranger = item(2, "Z");
        assert_eq!(
            GalleryIndex::resolve_group(&items, &stranger),
            Err(GalleryError::EmptyGroup)
        );
    }

    #[test]
    fn test_missing_clicked_defaults_to_zero() {
        let items = vec![item(1, "A"), item(2, "A")];
        let stranger = item(99, "A");
        let resolved = GalleryIndex::resolve_group(&items, &stranger).unwrap();
        assert_eq!(resolved.start, 0);
        assert_eq!(resolved.group.len(), 2);
    }

    #[test]
    fn test_group_rejects_empty() {
        assert_eq!(Group::new(Vec::new()), Err(GalleryError::EmptyGroup));
    }

    #[test]
    fn test_representatives() {
        let items = vec![
            item(1, "Portraits"),
            item(2, "Live"),
            item(3, "Portraits"),
            item(4, "Backstage"),
        ];
        let order: Vec<String> = ["Live", "Studio", "Portraits", "Backstage"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let all = GalleryIndex::representatives(&items, &CategoryFilter::All, &order);
        let ids: Vec<i64> = all.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1, 4]);

        let only = GalleryIndex::representatives(
            &items,
            &CategoryFilter::Only("Portraits".into()),
            &order,
        );
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, 1);

        let empty = GalleryIndex::representatives(
            &items,
            &CategoryFilter::Only("Studio".into()),
            &order,
        );
        assert!(empty.is_empty());

        let natural = GalleryIndex::representatives(&items, &CategoryFilter::All, &[]);
        let ids: Vec<i64> = natural.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }
}
