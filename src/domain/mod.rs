pub mod event;
pub mod item;
pub mod scraped_set;
pub mod strategy;

pub use event::ScrapeEvent;
pub use item::{ScrapedItem, UNKNOWN_TITLE};
pub use scraped_set::{ScrapeStats, ScrapedSet};
pub use strategy::{Navigation, PageType, Strategy, StrategyResponse};
