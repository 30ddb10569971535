use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1,h2,h3,h4,h5,h6").unwrap());
static PARAGRAPH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static IMAGE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

const NO_TITLE: &str = "No Title Found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Structured record sets extracted from one raw page.
///
/// `title` is diagnostic only; it is logged by the pipeline but never stored.
#[derive(Debug, Default)]
pub struct PageContent {
    pub title: String,
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    pub images: Vec<String>,
    pub links: Vec<Link>,
}

/// Parse raw page bytes and pull out headings, paragraphs, image sources
/// and links, in document order.
///
/// The only hard failure is a byte stream that is not text at all; missing
/// elements just produce empty record sets.
pub fn extract(raw: &[u8]) -> Result<PageContent> {
    let markup = std::str::from_utf8(raw).map_err(|e| {
        Error::Parse(format!("invalid UTF-8 at byte {}", e.valid_up_to()))
    })?;
    let doc = Html::parse_document(markup);

    let title = doc
        .select(&TITLE_SEL)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_else(|| NO_TITLE.to_string());

    // Heading elements with no text still yield an empty string on purpose.
    let headings = doc
        .select(&HEADING_SEL)
        .map(|el| element_text(&el))
        .collect();

    let paragraphs = doc
        .select(&PARAGRAPH_SEL)
        .map(|el| element_text(&el))
        .collect();

    // Images without a src are skipped outright, not recorded as empty.
    let images = doc
        .select(&IMAGE_SEL)
        .filter_map(|el| el.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect();

    let mut links = Vec::new();
    for el in doc.select(&ANCHOR_SEL) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.contains("mailto:") {
            continue;
        }
        links.push(Link {
            text: element_text(&el),
            href: href.to_string(),
        });
    }

    Ok(PageContent {
        title,
        headings,
        paragraphs,
        images,
        links,
    })
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
