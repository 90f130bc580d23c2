use std::collections::HashSet;

use serde::Serialize;

use crate::domain::ScrapedItem;

/// Ordered collection of scraped items, unique by link.
///
/// Items without a link can never be proven duplicates and are always kept.
#[derive(Debug, Clone, Default)]
pub struct ScrapedSet {
    items: Vec<ScrapedItem>,
    links: HashSet<String>,
}

/// Counts shown after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrapeStats {
    pub items: usize,
    pub unique_links: usize,
    pub prices_found: usize,
}

impl ScrapedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items whose link has not been seen yet.
    ///
    /// Returns exactly the items that were appended, in discovery order.
    pub fn extend_unique(&mut self, batch: Vec<ScrapedItem>) -> Vec<ScrapedItem> {
        let mut appended = Vec::new();

        for item in batch {
            if let Some(ref link) = item.link {
                if !self.links.insert(link.clone()) {
                    continue;
                }
            }
            appended.push(item);
        }

        self.items.extend(appended.iter().cloned());
        appended
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ScrapedItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ScrapedItem> {
        self.items
    }

    pub fn stats(&self) -> ScrapeStats {
        ScrapeStats::from_items(&self.items)
    }
}

impl ScrapeStats {
    pub fn from_items(items: &[ScrapedItem]) -> Self {
        let unique_links = items
            .iter()
            .filter_map(|item| item.link.as_deref())
            .collect::<HashSet<_>>()
            .len();

        Self {
            items: items.len(),
            unique_links,
            prices_found: items.iter().filter(|item| item.price.is_some()).count(),
        }
    }
}
