// src/scrape/links.rs
//
// Link collector: paginates the listing-search site and writes the
// per-listing titles and URLs to link_properties.csv. A page that fails to
// fetch is skipped with a warning; there are no retries.

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use scraper::{Html, Selector};
use std::time::Duration;

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::models::ListingLink;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub async fn collect_links(cfg: &PipelineConfig) -> Result<usize> {
    info!("Scraping process started...");
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let mut all_links: Vec<ListingLink> = Vec::new();
    for page in cfg.scrape_start_page..=cfg.scrape_end_page {
        let page_url = cfg.search_page_url.replace("{page}", &page.to_string());
        info!("Processing page {}...", page);

        match fetch_page(&client, &page_url).await {
            Ok(html) => {
                let links = parse_property_links(&html)?;
                info!("Page {}: {} properties found", page, links.len());
                all_links.extend(links);
            }
            Err(e) => warn!("Skipping page {} due to fetch failure: {:#}", page, e),
        }

        tokio::time::sleep(Duration::from_secs(cfg.page_delay_secs)).await;
    }

    if all_links.is_empty() {
        warn!("No property links collected");
        return Ok(0);
    }

    artifacts::write_csv(&cfg.links_path(), &all_links)?;
    info!(
        "Saved {} property links to {}",
        all_links.len(),
        cfg.links_path().display()
    );
    Ok(all_links.len())
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("{url} returned status {status}"));
    }
    response.text().await.context("Failed to read page body")
}

/// Extracts `(title, url)` pairs from the listing cards of a search page.
pub fn parse_property_links(html: &str) -> Result<Vec<ListingLink>> {
    let card_selector = Selector::parse("div.card-featured__middle-section")
        .map_err(|e| anyhow!("Invalid card selector: {e}"))?;
    let link_selector =
        Selector::parse("a[title]").map_err(|e| anyhow!("Invalid link selector: {e}"))?;

    let document = Html::parse_document(html);
    let mut links = Vec::new();
    for card in document.select(&card_selector) {
        if let Some(anchor) = card.select(&link_selector).next() {
            let title = anchor.value().attr("title");
            let href = anchor.value().attr("href");
            if let (Some(title), Some(href)) = (title, href) {
                links.push(ListingLink {
                    property_title: title.to_string(),
                    property_url: href.to_string(),
                });
            }
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="card-featured__middle-section">
            <a title="Rumah Minimalis di Depok" href="/properti/depok/hos111/">link</a>
          </div>
          <div class="card-featured__middle-section">
            <a title="Rumah Mewah Jakarta" href="/properti/jakarta/hos222/">link</a>
          </div>
          <div class="other-card"><a title="ignored" href="/nope/">x</a></div>
        </body></html>"#;

    #[test]
    fn test_parse_property_links_extracts_cards_only() {
        let links = parse_property_links(PAGE).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].property_title, "Rumah Minimalis di Depok");
        assert_eq!(links[0].property_url, "/properti/depok/hos111/");
        assert_eq!(links[1].property_url, "/properti/jakarta/hos222/");
    }

    #[test]
    fn test_parse_property_links_empty_page() {
        assert!(parse_property_links("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn test_anchor_without_title_is_skipped() {
        let page = r#"<div class="card-featured__middle-section"><a href="/x/">no title</a></div>"#;
        assert!(parse_property_links(page).unwrap().is_empty());
    }
}
