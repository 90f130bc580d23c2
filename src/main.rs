use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smartscrape::app::AppContext;
use smartscrape::cli::{commands, headless_override, Cli, Commands};
use smartscrape::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            url,
            max_pages,
            headless,
            headed,
            output,
            summary,
        } => {
            let ctx = AppContext::new(config)?;
            let headless = headless_override(headless, headed);
            let items = commands::run_scrape(&ctx, &url, max_pages, headless).await?;
            if let Some(path) = output {
                commands::export_items(&items, &path)?;
            }
            if summary {
                commands::print_summary(&ctx, &items).await?;
            }
        }
        Commands::Summarize { path } => {
            let ctx = AppContext::new(config)?;
            commands::summarize_file(&ctx, &path).await?;
        }
        Commands::ClearSession => {
            commands::clear_session(&config.scraper)?;
        }
    }

    Ok(())
}
