//! Page catalog generation
//!
//! Turns the built-in picture list and the uploaded picture list into the
//! ordered sequence of leaves that make up the book. Leaf 0 is always the
//! cover and the last leaf is always the back cover; every picture appears
//! exactly once in between, two per leaf.

use bevy::prelude::*;

/// Identifier of the front cover texture
pub const COVER_ID: &str = "book-cover";
/// Identifier of the back cover texture, also pads an unpaired last picture
pub const BACK_ID: &str = "book-back";

/// Returns true for the identifiers that name the two covers
pub fn is_reserved(id: &str) -> bool {
    id == COVER_ID || id == BACK_ID
}

/// One physical leaf of the book
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageDescriptor {
    pub front: String,
    pub back: String,
}

impl PageDescriptor {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.front == id || self.back == id
    }
}

/// Build the leaves for `local ++ remote`, keeping the input order.
pub fn generate<L, R>(local: &[L], remote: &[R]) -> Vec<PageDescriptor>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let all: Vec<&str> = local
        .iter()
        .map(AsRef::as_ref)
        .chain(remote.iter().map(AsRef::as_ref))
        .collect();

    let mut pages = Vec::with_capacity(all.len().div_ceil(2) + 2);
    pages.push(PageDescriptor::new(COVER_ID, BACK_ID));

    for pair in all.chunks(2) {
        let back = pair.get(1).copied().unwrap_or(BACK_ID);
        pages.push(PageDescriptor::new(pair[0], back));
    }

    pages.push(PageDescriptor::new(BACK_ID, BACK_ID));
    pages
}

/// The current leaves of the book, shared by every page instance
#[derive(Resource, Debug, Clone, Default)]
pub struct PageCatalog {
    pub pages: Vec<PageDescriptor>,
    /// Remote ids the catalog was last generated from
    remote_ids: Vec<String>,
}

impl PageCatalog {
    pub fn new(local: &[String], remote: &[String]) -> Self {
        Self {
            pages: generate(local, remote),
            remote_ids: remote.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn remote_ids(&self) -> &[String] {
        &self.remote_ids
    }

    /// Regenerate when the remote id list differs from the last one.
    /// Returns whether the pages changed.
    pub fn refresh(&mut self, local: &[String], remote: &[String]) -> bool {
        if self.remote_ids == remote && !self.pages.is_empty() {
            return false;
        }
        let pages = generate(local, remote);
        self.remote_ids = remote.to_vec();
        if pages == self.pages {
            return false;
        }
        debug!(
            "Regenerated page catalog: {} leaves from {} local and {} remote pictures",
            pages.len(),
            local.len(),
            remote.len()
        );
        self.pages = pages;
        true
    }

    /// One-based page number of the leaf holding `id`, as shown in the detail view
    pub fn page_number_of(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.contains(id)).map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|n| n.to_string()).collect()
    }

    #[test]
    fn empty_inputs_give_both_covers() {
        let pages = generate::<&str, &str>(&[], &[]);
        assert_eq!(
            pages,
            vec![
                PageDescriptor::new(COVER_ID, BACK_ID),
                PageDescriptor::new(BACK_ID, BACK_ID),
            ]
        );
    }

    #[test]
    fn odd_count_pads_last_leaf_with_back_cover() {
        let pages = generate(&["2", "3", "4"], &[] as &[&str]);
        assert_eq!(
            pages,
            vec![
                PageDescriptor::new(COVER_ID, BACK_ID),
                PageDescriptor::new("2", "3"),
                PageDescriptor::new("4", BACK_ID),
                PageDescriptor::new(BACK_ID, BACK_ID),
            ]
        );
    }

    #[test]
    fn leaf_count_and_single_appearance_hold_for_many_sizes() {
        for local_count in 0..6 {
            for remote_count in 0..6 {
                let local = ids(1..=local_count);
                let remote: Vec<String> =
                    (0..remote_count).map(|n| format!("r{n}")).collect();
                let pages = generate(&local, &remote);
                let n = local_count + remote_count;
                assert_eq!(pages.len(), n.div_ceil(2) + 2);

                let seen: Vec<&str> = pages[1..pages.len() - 1]
                    .iter()
                    .flat_map(|p| [p.front.as_str(), p.back.as_str()])
                    .filter(|id| !is_reserved(id))
                    .collect();
                let expected: Vec<&str> = local
                    .iter()
                    .chain(remote.iter())
                    .map(String::as_str)
                    .collect();
                assert_eq!(seen, expected);
            }
        }
    }

    #[test]
    fn remote_pictures_follow_local_ones() {
        let pages = generate(&["1"], &["1700000000000"]);
        assert_eq!(pages[1], PageDescriptor::new("1", "1700000000000"));
    }

    #[test]
    fn refresh_only_reports_real_changes() {
        let local = ids(1..=3);
        let mut catalog = PageCatalog::new(&local, &[]);
        assert!(!catalog.refresh(&local, &[]));
        assert!(catalog.refresh(&local, &["a".to_string()]));
        assert_eq!(catalog.pages[2], PageDescriptor::new("3", "a"));
        assert!(!catalog.refresh(&local, &["a".to_string()]));
        assert_eq!(catalog.remote_ids(), ["a".to_string()]);
    }

    #[test]
    fn page_number_counts_from_one() {
        let catalog = PageCatalog::new(&ids(1..=4), &[]);
        assert_eq!(catalog.page_number_of(COVER_ID), Some(1));
        assert_eq!(catalog.page_number_of("3"), Some(3));
        assert_eq!(catalog.page_number_of("missing"), None);
    }
}
