// Content download with sanitize-then-retry semantics
//
// CDN URLs observed on post pages often embed byte-range parameters that
// make the origin serve a partial object. The fetcher strips them first and
// falls back to the original URL when the origin rejects the stripped form
// (some signature schemes cover the range parameters).

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;

use super::errors::ExtractError;
use super::models::FetchedMedia;
use super::sanitize::strip_range_params;

/// Desktop-browser user agent sent with every page fetch and download
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Referer naming the origin site; media CDNs refuse referer-less requests
pub const POST_REFERER: &str = "https://www.instagram.com/";

/// One download attempt may take this long before it fails outright
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Statuses indicating a byte-range or signature rejection, worth exactly
/// one retry with the unsanitized URL
const RETRY_STATUSES: [u16; 3] = [403, 404, 416];

pub struct MediaFetcher {
    client: Client,
}

impl MediaFetcher {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::REFERER, HeaderValue::from_static(POST_REFERER));

        Self {
            client: Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .default_headers(headers)
                .timeout(DOWNLOAD_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Download `url`, preferring its sanitized form. Retries the original
    /// exactly once when the sanitized form is rejected with a range-style
    /// status; any other status >= 400 is terminal.
    pub async fn fetch(&self, url: &str) -> Result<FetchedMedia, ExtractError> {
        let sanitized = strip_range_params(url);
        let response = self.client.get(&sanitized).send().await?;
        let status = response.status().as_u16();

        if RETRY_STATUSES.contains(&status) && sanitized != url {
            eprintln!(
                "[Fetcher] HTTP {} on sanitized URL, retrying original",
                status
            );
            let retry = self.client.get(url).send().await?;
            return Self::read_body(retry).await;
        }
        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> Result<FetchedMedia, ExtractError> {
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ExtractError::DownloadFailed { status });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Stream instead of buffering the response whole; media objects can
        // run to tens of megabytes.
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        Ok(FetchedMedia {
            bytes,
            content_type,
            status,
        })
    }
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}
