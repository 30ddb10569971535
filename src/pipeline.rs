use reqwest::Client;
use rusqlite::Connection;
use tracing::{error, info};

use crate::{db, extractor, fetcher};

/// What a single scrape run produced. Failures are folded in here rather
/// than propagated; the process carries on either way.
pub struct Outcome {
    pub stored: bool,
    pub reason: Option<String>,
}

impl Outcome {
    fn failed(reason: String) -> Self {
        Outcome {
            stored: false,
            reason: Some(reason),
        }
    }
}

/// Fetch one URL, extract its content and append it to the store.
///
/// A fetch or parse failure aborts the run before the store is touched.
/// A write failure is reported but may leave a partial batch behind.
pub async fn run(client: &Client, conn: &Connection, url: &str) -> Outcome {
    info!("Scraping {}", url);

    let raw = match fetcher::fetch(client, url).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("{}", e);
            return Outcome::failed(e.to_string());
        }
    };

    let content = match extractor::extract(&raw) {
        Ok(content) => content,
        Err(e) => {
            error!("{}", e);
            return Outcome::failed(e.to_string());
        }
    };

    info!("Page title: {}", content.title);
    info!(
        "Extracted {} headings, {} paragraphs, {} images, {} links",
        content.headings.len(),
        content.paragraphs.len(),
        content.images.len(),
        content.links.len()
    );

    match db::append(conn, &content) {
        Ok(()) => {
            info!("Stored scraped content");
            Outcome {
                stored: true,
                reason: None,
            }
        }
        Err(e) => {
            error!("Failed to store scraped content: {}", e);
            Outcome::failed(e.to_string())
        }
    }
}
