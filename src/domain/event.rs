use serde::Serialize;

use crate::domain::ScrapedItem;

/// Incremental output of a scrape run, in emission order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ScrapeEvent {
    /// Human-readable progress note
    Status(String),
    /// Fraction of the page budget used, in `[0, 1]`
    Progress(f64),
    /// Items appended to the result set by the latest page
    Data(Vec<ScrapedItem>),
    /// The full result set; always the last event of a completed run
    Complete(Vec<ScrapedItem>),
}

impl ScrapeEvent {
    pub fn status(message: impl Into<String>) -> Self {
        ScrapeEvent::Status(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeEvent::Status(_) => "status",
            ScrapeEvent::Progress(_) => "progress",
            ScrapeEvent::Data(_) => "data",
            ScrapeEvent::Complete(_) => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScrapeEvent::Complete(_))
    }
}
