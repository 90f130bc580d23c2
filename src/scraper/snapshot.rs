use ::scraper::{Html, Selector};

use crate::app::Result;
use crate::scraper::extractor::parse_selector;
use crate::scraper::{BrowserSession, ScraperConfig};

/// Produces noise-free page markup for strategy inference
pub struct PageSnapshotter {
    noise_selector: Option<Selector>,
    body_selector: Selector,
}

impl PageSnapshotter {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let noise_selector = if config.noise_selectors.is_empty() {
            None
        } else {
            Some(parse_selector(&config.noise_selectors.join(", "))?)
        };

        Ok(Self {
            noise_selector,
            body_selector: parse_selector("body")?,
        })
    }

    /// Wait for the page to load and return its cleaned markup.
    ///
    /// The live page is left untouched; cleaning happens on a copy.
    pub async fn snapshot(&self, session: &dyn BrowserSession) -> Result<String> {
        session.wait_for_load().await?;
        let markup = session.content().await?;
        Ok(self.clean_html(&markup))
    }

    /// Strip noise elements with their subtrees and return the body markup
    pub fn clean_html(&self, markup: &str) -> String {
        let mut document = Html::parse_document(markup);

        if let Some(ref noise) = self.noise_selector {
            let noisy: Vec<_> = document.select(noise).map(|el| el.id()).collect();
            for id in noisy {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }

        document
            .select(&self.body_selector)
            .next()
            .map(|body| body.html())
            .unwrap_or_else(|| document.html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Shop</title><style>.x { color: red }</style></head>
<body>
  <nav><a href="/">Home</a></nav>
  <script>window.track = true;</script>
  <main>
    <article class="card"><h3>Widget</h3><svg><path d="M0"/></svg></article>
    <noscript>Enable JS</noscript>
    <iframe src="/ads"></iframe>
  </main>
  <footer><nav>Footer links</nav></footer>
</body>
</html>"#;

    fn snapshotter() -> PageSnapshotter {
        PageSnapshotter::new(&ScraperConfig::default()).unwrap()
    }

    #[test]
    fn test_noise_removed_with_subtrees() {
        let cleaned = snapshotter().clean_html(PAGE);
        for noise in ["<script", "<style", "<svg", "<noscript", "<iframe", "<footer", "<nav"] {
            assert!(!cleaned.contains(noise), "{} should be stripped", noise);
        }
        assert!(!cleaned.contains("Footer links"));
        assert!(!cleaned.contains("window.track"));
    }

    #[test]
    fn test_returns_body_only() {
        let cleaned = snapshotter().clean_html(PAGE);
        assert!(cleaned.starts_with("<body"));
        assert!(!cleaned.contains("<title>"));
        assert!(cleaned.contains(r#"<article class="card"><h3>Widget</h3></article>"#));
    }

    #[test]
    fn test_empty_noise_list_keeps_everything() {
        let config = ScraperConfig {
            noise_selectors: Vec::new(),
            ..Default::default()
        };
        let cleaned = PageSnapshotter::new(&config).unwrap().clean_html(PAGE);
        assert!(cleaned.contains("<nav>"));
        assert!(cleaned.contains("<script>"));
    }
}
