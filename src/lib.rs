//! # smartscrape
//!
//! An AI-assisted web scraper: point it at a listing page and a language
//! model works out which elements are the repeated items and how to reach
//! the next page.
//!
//! ## Architecture
//!
//! ```text
//! Browser → Snapshotter → Strategy Resolver → Orchestrator ⇄ Extractor → Events
//! ```
//!
//! - [`scraper`]: Chrome session, page cleaning, item extraction and the run loop
//! - [`provider`]: Language-model strategy inference and summaries
//! - [`cli`]: Command-line front end consuming the event stream
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=...
//!
//! # Scrape two pages and save the results
//! smartscrape run https://books.toscrape.com/ --max-pages 2 --output books.csv
//!
//! # Ask for a report on an earlier export
//! smartscrape summarize books.csv
//!
//! # Log out of everything
//! smartscrape clear-session
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the provider,
/// strategy resolver and orchestrator.
pub mod app;

/// Command-line interface using clap.
///
/// - `run <url>` - Scrape a page, optionally exporting and summarizing
/// - `summarize <file>` - Report on a JSON or CSV export
/// - `clear-session` - Delete the browser profile
pub mod cli;

/// Configuration loaded from `~/.config/smartscrape/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`ScrapedItem`](domain::ScrapedItem): One extracted record
/// - [`Strategy`](domain::Strategy): Item selector plus navigation mode
/// - [`ScrapeEvent`](domain::ScrapeEvent): Progress messages of a run
pub mod domain;

/// Language-model provider seam.
///
/// - [`StrategyProvider`](provider::StrategyProvider): Async trait for page analysis
/// - [`OpenAiProvider`](provider::OpenAiProvider): reqwest-based implementation
/// - [`StrategyResolver`](provider::StrategyResolver): Fallbacks around the provider
pub mod provider;

/// Browser-driven scraping.
///
/// Uses Chrome via chromiumoxide with a persistent profile so that logins
/// survive between runs.
///
/// - [`Orchestrator`](scraper::Orchestrator): The scrape state machine
/// - [`ItemExtractor`](scraper::ItemExtractor): Title, price and link heuristics
/// - [`BrowserLauncher`](scraper::BrowserLauncher): Async trait for browser sessions
pub mod scraper;

#[cfg(test)]
mod testing;
