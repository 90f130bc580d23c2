use serde::{Deserialize, Serialize};

/// Title used when no heading or anchor text is found
pub const UNKNOWN_TITLE: &str = "Unknown";

/// One record extracted from a repeated item container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedItem {
    pub title: String,
    pub price: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl ScrapedItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            link: None,
            snippet: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn has_known_title(&self) -> bool {
        self.title != UNKNOWN_TITLE
    }

    /// An item is worth keeping when it carries a real title or a price
    pub fn is_useful(&self) -> bool {
        self.has_known_title() || self.price.is_some()
    }
}
