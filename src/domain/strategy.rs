use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a listing advances to more items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Pagination,
    InfiniteScroll,
    SinglePage,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageType::Pagination => "pagination",
            PageType::InfiniteScroll => "infinite_scroll",
            PageType::SinglePage => "single_page",
        };
        f.write_str(name)
    }
}

/// Navigation behaviour, carrying the next-button selector only where it means something
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Pagination { next_button_selector: String },
    InfiniteScroll,
    SinglePage,
}

/// Scraping strategy inferred once per run from the first page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    item_container_selector: String,
    navigation: Navigation,
}

impl Strategy {
    /// Returns `None` when the container selector is blank
    pub fn new(item_container_selector: impl Into<String>, navigation: Navigation) -> Option<Self> {
        let item_container_selector: String = item_container_selector.into();
        let item_container_selector = item_container_selector.trim().to_string();
        if item_container_selector.is_empty() {
            return None;
        }

        let navigation = match navigation {
            Navigation::Pagination {
                next_button_selector,
            } if next_button_selector.trim().is_empty() => Navigation::SinglePage,
            Navigation::Pagination {
                next_button_selector,
            } => Navigation::Pagination {
                next_button_selector: next_button_selector.trim().to_string(),
            },
            other => other,
        };

        Some(Self {
            item_container_selector,
            navigation,
        })
    }

    pub fn single_page(item_container_selector: impl Into<String>) -> Option<Self> {
        Self::new(item_container_selector, Navigation::SinglePage)
    }

    pub fn item_container_selector(&self) -> &str {
        &self.item_container_selector
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn page_type(&self) -> PageType {
        match self.navigation {
            Navigation::Pagination { .. } => PageType::Pagination,
            Navigation::InfiniteScroll => PageType::InfiniteScroll,
            Navigation::SinglePage => PageType::SinglePage,
        }
    }

    pub fn next_button_selector(&self) -> Option<&str> {
        match &self.navigation {
            Navigation::Pagination {
                next_button_selector,
            } => Some(next_button_selector),
            _ => None,
        }
    }
}

/// Flat strategy as returned by the language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResponse {
    pub page_type: PageType,
    pub item_container_selector: String,
    #[serde(default)]
    pub next_button_selector: Option<String>,
}

impl StrategyResponse {
    /// Convert to a [`Strategy`]; `None` if the container selector is blank.
    ///
    /// A pagination answer without a next-button selector cannot paginate,
    /// so it degrades to a single page.
    pub fn into_strategy(self) -> Option<Strategy> {
        let navigation = match self.page_type {
            PageType::Pagination => match self.next_button_selector {
                Some(selector) if !selector.trim().is_empty() => Navigation::Pagination {
                    next_button_selector: selector,
                },
                _ => {
                    warn!("Pagination strategy has no next-button selector, treating as single page");
                    Navigation::SinglePage
                }
            },
            PageType::InfiniteScroll => Navigation::InfiniteScroll,
            PageType::SinglePage => Navigation::SinglePage,
        };
        Strategy::new(self.item_container_selector, navigation)
    }
}

impl From<&Strategy> for StrategyResponse {
    fn from(strategy: &Strategy) -> Self {
        Self {
            page_type: strategy.page_type(),
            item_container_selector: strategy.item_container_selector.clone(),
            next_button_selector: strategy.next_button_selector().map(String::from),
        }
    }
}
