pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "smartscrape")]
#[command(about = "An AI-assisted web scraper", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a listing page
    Run {
        /// URL of the page to scrape
        url: String,

        /// Page budget, inclusive (default from config)
        #[arg(short, long)]
        max_pages: Option<u32>,

        /// Run the browser without a window
        #[arg(long, conflicts_with = "headed")]
        headless: bool,

        /// Show the browser window even if the config says headless
        #[arg(long)]
        headed: bool,

        /// Write the results to a .json or .csv file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ask the model for a short report on the results
        #[arg(long)]
        summary: bool,
    },
    /// Summarize previously exported results
    Summarize {
        /// Path to a .json or .csv export
        path: PathBuf,
    },
    /// Delete the persistent browser profile (logs out of every site)
    ClearSession,
}

/// `--headless` / `--headed` as an override of the configured mode
pub fn headless_override(headless: bool, headed: bool) -> Option<bool> {
    match (headless, headed) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
