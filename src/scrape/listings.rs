// src/scrape/listings.rs
//
// Content fetcher: renders every collected listing URL, reduces the page
// to visible text, runs schema extraction and accumulates the rows into
// Property_Scraping.csv. Failed items are skipped, not retried; progress
// is saved periodically so a crashed run keeps most of its work.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use scraper::{ElementRef, Html};
use std::time::Duration;
use url::Url;

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::models::{ListingLink, RawListing};
use crate::scrape::extract::ExtractionClient;
use crate::scrape::render::RenderClient;

const SAVE_EVERY: usize = 25;

pub async fn scrape_listings(cfg: &PipelineConfig) -> Result<usize> {
    let links: Vec<ListingLink> = artifacts::read_csv(&cfg.links_path())
        .context("Property links not found; run the link collector first")?;
    info!("Scraping {} listings", links.len());

    let render = RenderClient::from_config(cfg)?;
    let extractor = ExtractionClient::from_config(cfg)?;
    let base = Url::parse(&cfg.site_base_url).context("Invalid site base URL")?;

    let bar = ProgressBar::new(links.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{pos}/{len} [{elapsed_precise}] {bar:40} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut rows: Vec<RawListing> = Vec::new();
    for (idx, link) in links.iter().enumerate() {
        let listing_url = match base.join(&link.property_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping unparseable URL {}: {}", link.property_url, e);
                bar.inc(1);
                continue;
            }
        };

        match scrape_one(&render, &extractor, listing_url.as_str()).await {
            Ok(listing) => rows.push(listing),
            Err(e) => warn!("Error at index {}: {:#}", idx, e),
        }

        if (idx + 1) % SAVE_EVERY == 0 && !rows.is_empty() {
            artifacts::write_csv(&cfg.scraped_path(), &rows)?;
            debug!("Progress saved at index {} ({} rows)", idx, rows.len());
        }

        bar.inc(1);
        tokio::time::sleep(Duration::from_secs(cfg.listing_delay_secs)).await;
    }
    bar.finish_and_clear();

    artifacts::write_csv(&cfg.scraped_path(), &rows)?;
    info!(
        "Saved {} scraped listings to {}",
        rows.len(),
        cfg.scraped_path().display()
    );
    Ok(rows.len())
}

async fn scrape_one(
    render: &RenderClient,
    extractor: &ExtractionClient,
    url: &str,
) -> Result<RawListing> {
    let html = render.browser_html(url).await?;
    let text = visible_text(&html);
    let value = extractor.extract_listing(&text).await?;
    Ok(RawListing::from_extracted(&value, url))
}

/// Reduces an HTML document to its visible text: script, style and
/// noscript subtrees are dropped, the rest is concatenated with single
/// spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_visible_text(document.root_element(), &mut out);
    out.trim_end().to_string()
}

fn collect_visible_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let tag = child_element.value().name();
            if tag != "script" && tag != "style" && tag != "noscript" {
                collect_visible_text(child_element, out);
            }
        } else if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                out.push(' ');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let html = r#"
            <html><head><style>.x { color: red }</style></head>
            <body>
              <h1>Rumah Dijual</h1>
              <script>var tracking = "secret";</script>
              <p>Harga 1.5 M, <b>SHM</b></p>
              <noscript>enable js</noscript>
            </body></html>"#;
        let text = visible_text(html);
        assert!(text.contains("Rumah Dijual"));
        assert!(text.contains("Harga 1.5 M, SHM"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("enable js"));
    }

    #[test]
    fn test_visible_text_collapses_whitespace() {
        let text = visible_text("<p>  a  </p><p>\n\nb\n</p>");
        assert_eq!(text, "a b");
    }
}
