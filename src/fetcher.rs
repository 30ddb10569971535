use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::error::{Error, Result};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Build a client that presents a desktop-browser profile. Clears the
/// header-based bot checks most news sites run in front of their pages.
pub fn client() -> anyhow::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let client = Client::builder()
        .user_agent(BROWSER_UA)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// GET one page. Anything other than HTTP 200 is a fetch failure and the
/// caller must not proceed to extraction.
pub async fn fetch(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("Request to {} failed: {}", url, e);
            return Err(Error::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            });
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        warn!("Failed to fetch {}: status {}", url, status.as_u16());
        return Err(Error::Fetch {
            url: url.to_string(),
            reason: format!("status {}", status.as_u16()),
        });
    }

    let body = response.bytes().await.map_err(|e| Error::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    info!("Fetched {} ({} bytes)", url, body.len());
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ok_status_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<h1>hi</h1>")
            .create_async()
            .await;

        let client = client().unwrap();
        let body = fetch(&client, &format!("{}/page", server.url())).await.unwrap();
        assert_eq!(body, b"<h1>hi</h1>");
    }

    #[tokio::test]
    async fn non_200_status_is_a_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = client().unwrap();
        let err = fetch(&client, &format!("{}/gone", server.url())).await.unwrap_err();
        match err {
            Error::Fetch { reason, .. } => assert!(reason.contains("404")),
            other => panic!("expected fetch failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_error_is_a_fetch_failure() {
        let client = client().unwrap();
        let err = fetch(&client, "http://127.0.0.1:1/unreachable").await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
