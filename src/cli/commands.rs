use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use url::Url;

use crate::app::{AppContext, Result, ScrapeError};
use crate::domain::{ScrapeEvent, ScrapeStats, ScrapedItem};
use crate::scraper::{RunRequest, ScraperConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Check that `url` is an absolute http(s) URL
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ScrapeError::Other(format!(
            "Unsupported URL scheme '{}': only http and https pages can be scraped",
            scheme
        ))),
    }
}

/// Run one scrape, printing events as they arrive, and return the final items.
///
/// `max_pages` and `headless` fall back to the configured values when `None`.
pub async fn run_scrape(
    ctx: &AppContext,
    url: &str,
    max_pages: Option<u32>,
    headless: Option<bool>,
) -> Result<Vec<ScrapedItem>> {
    let url = validate_url(url)?;
    let request = RunRequest::new(
        url.as_str(),
        max_pages.unwrap_or(ctx.config.scraper.max_pages),
        headless.unwrap_or(ctx.config.scraper.headless),
    );

    let mut events = ctx.orchestrator.run(request);
    let mut last_status = String::new();
    let mut complete = None;

    while let Some(event) = events.recv().await {
        match event {
            ScrapeEvent::Status(message) => {
                println!("{}", message);
                last_status = message;
            }
            ScrapeEvent::Progress(progress) => {
                println!("[{:>3.0}%]", progress * 100.0);
            }
            ScrapeEvent::Data(items) => {
                for item in &items {
                    println!(
                        "  + {}{}",
                        item.title,
                        item.price
                            .as_deref()
                            .map(|p| format!(" ({})", p))
                            .unwrap_or_default()
                    );
                }
            }
            ScrapeEvent::Complete(items) => complete = Some(items),
        }
    }

    let items = complete.ok_or_else(|| {
        let reason = last_status
            .strip_prefix("Error: ")
            .unwrap_or("run ended without results");
        ScrapeError::Other(format!("Scrape failed: {}", reason))
    })?;

    print_stats(&ScrapeStats::from_items(&items));
    Ok(items)
}

fn print_stats(stats: &ScrapeStats) {
    println!(
        "Scraped {} items ({} unique links, {} with prices)",
        stats.items, stats.unique_links, stats.prices_found
    );
}

/// Print a model-written report on `items`
pub async fn print_summary(ctx: &AppContext, items: &[ScrapedItem]) -> Result<()> {
    if items.is_empty() {
        println!("Nothing to summarize");
        return Ok(());
    }

    println!("Generating summary...");
    let summary = ctx.resolver.summarize(items).await;
    println!("\n{}", summary);
    Ok(())
}

pub async fn summarize_file(ctx: &AppContext, path: &Path) -> Result<()> {
    let items = load_items(path)?;
    println!("Loaded {} items from {}", items.len(), path.display());
    print_summary(ctx, &items).await
}

/// A directory gets a timestamped CSV file name inside it
fn output_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        path.join(format!("scraped_data_{}.csv", stamp))
    } else {
        path.to_path_buf()
    }
}

/// Write items as JSON or CSV, chosen by the file extension.
///
/// Returns the path written.
pub fn export_items(items: &[ScrapedItem], path: &Path) -> Result<PathBuf> {
    let path = output_file(path);
    match ExportFormat::from_path(&path) {
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(items)?;
            fs::write(&path, json)?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(&path)?;
            for item in items {
                writer.serialize(item)?;
            }
            writer.flush()?;
        }
    }

    println!("Saved {} items to {}", items.len(), path.display());
    Ok(path)
}

pub fn load_items(path: &Path) -> Result<Vec<ScrapedItem>> {
    match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        ExportFormat::Csv => {
            let mut reader = csv::Reader::from_path(path)?;
            let items = reader
                .deserialize()
                .collect::<std::result::Result<Vec<ScrapedItem>, _>>()?;
            Ok(items)
        }
    }
}

/// Delete the persistent browser profile
pub fn clear_session(config: &ScraperConfig) -> Result<()> {
    let dir = &config.session_dir;
    if !dir.exists() {
        println!("No browser session at {}", dir.display());
        return Ok(());
    }

    fs::remove_dir_all(dir)?;
    println!("Removed browser session at {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::domain::Strategy;
    use crate::testing::{product_cards, FakeLauncher, FakePage, FakeProvider};

    fn sample_items() -> Vec<ScrapedItem> {
        vec![
            ScrapedItem::new("A Light in the Attic")
                .with_price("£51.77")
                .with_link("catalogue/a-light-in-the-attic_1000/index.html")
                .with_snippet("A Light in the Attic £51.77 In stock"),
            ScrapedItem::new("Unknown").with_snippet("Contact us for pricing"),
        ]
    }

    fn fake_context(launcher: FakeLauncher, provider: FakeProvider) -> AppContext {
        let mut config = Config::default();
        config.scraper.settle_delay_ms = 0;
        config.scraper.selector_timeout_ms = 0;
        AppContext::with_components(config, Arc::new(provider), Arc::new(launcher)).unwrap()
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://books.toscrape.com/").is_ok());
        assert!(matches!(
            validate_url("books.toscrape.com"),
            Err(ScrapeError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(ScrapeError::Other(_))
        ));
    }

    #[test]
    fn test_export_json_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        export_items(&sample_items(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"price\": \"£51.77\""));
        assert_eq!(load_items(&path).unwrap(), sample_items());
    }

    #[test]
    fn test_export_csv_has_header_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.CSV");

        export_items(&sample_items(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("title,price,link,snippet"));
        assert!(content.contains("Unknown,,,Contact us for pricing"));

        assert_eq!(load_items(&path).unwrap(), sample_items());
    }

    #[test]
    fn test_export_into_directory_uses_timestamped_csv() {
        let dir = tempfile::tempdir().unwrap();

        let written = export_items(&sample_items(), dir.path()).unwrap();
        assert_eq!(written.parent(), Some(dir.path()));
        let name = written.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("scraped_data_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(load_items(&written).unwrap().len(), 2);
    }

    #[test]
    fn test_clear_session_removes_profile() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("browser_session");
        fs::create_dir_all(session_dir.join("Default")).unwrap();
        fs::write(session_dir.join("Default").join("Cookies"), b"x").unwrap();

        let config = ScraperConfig {
            session_dir: session_dir.clone(),
            ..Default::default()
        };
        clear_session(&config).unwrap();
        assert!(!session_dir.exists());

        // Clearing twice is fine
        clear_session(&config).unwrap();
    }

    #[tokio::test]
    async fn test_run_scrape_returns_items() {
        let launcher = FakeLauncher::new(vec![
            FakePage::new().with_elements("div.card", product_cards("lamp", 3)),
        ]);
        let provider = FakeProvider::with_strategy(Strategy::single_page("div.card").unwrap());
        let ctx = fake_context(launcher.clone(), provider);

        let items = run_scrape(&ctx, "https://shop.test/lamps", Some(1), Some(true))
            .await
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].price.as_deref(), Some("$0.99"));
        assert_eq!(launcher.log().opened.as_ref().map(|o| o.1), Some(true));
    }

    #[tokio::test]
    async fn test_headed_flag_overrides_headless_config() {
        let launcher = FakeLauncher::new(vec![
            FakePage::new().with_elements("div.card", product_cards("lamp", 1)),
        ]);
        let provider = FakeProvider::with_strategy(Strategy::single_page("div.card").unwrap());
        let mut config = Config::default();
        config.scraper.headless = true;
        config.scraper.settle_delay_ms = 0;
        config.scraper.selector_timeout_ms = 0;
        let ctx =
            AppContext::with_components(config, Arc::new(provider), Arc::new(launcher.clone()))
                .unwrap();

        run_scrape(&ctx, "https://shop.test/", None, Some(false))
            .await
            .unwrap();
        assert_eq!(launcher.log().opened.as_ref().map(|o| o.1), Some(false));

        run_scrape(&ctx, "https://shop.test/", None, None)
            .await
            .unwrap();
        assert_eq!(launcher.log().opened.as_ref().map(|o| o.1), Some(true));
    }

    #[tokio::test]
    async fn test_run_scrape_reports_failure() {
        let launcher = FakeLauncher::new(vec![]).failing_open();
        let ctx = fake_context(launcher, FakeProvider::failing());

        match run_scrape(&ctx, "https://shop.test/", None, None).await {
            Err(ScrapeError::Other(message)) => assert!(message.contains("profile is locked")),
            other => panic!("expected failure, got {:?}", other.map(|i| i.len())),
        }
    }

    #[tokio::test]
    async fn test_summarize_file_uses_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        export_items(&sample_items(), &path).unwrap();

        let provider = Arc::new(FakeProvider::failing().with_summary("## Report"));
        let mut config = Config::default();
        config.scraper.settle_delay_ms = 0;
        let ctx = AppContext::with_components(
            config,
            provider.clone(),
            Arc::new(FakeLauncher::default()),
        )
        .unwrap();

        summarize_file(&ctx, &path).await.unwrap();
        let sent = provider.last_summary_input().unwrap();
        assert!(sent.contains("A Light in the Attic"));
    }
}
