//! Page retrieval.
//!
//! The controller depends only on the [`PageFetcher`] trait: give it a URL,
//! get back decoded page text or a [`FetchError`]. [`HttpFetcher`] is the
//! network implementation; tests substitute an in-memory one.
//!
//! Fetches are awaited one at a time. There is no retry policy, a failure is
//! returned to the caller as-is.

use crate::config::USER_AGENT;
use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, StatusCode};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// The site writes document identifiers and numeric ranges with a
/// non-breaking hyphen; extraction patterns expect a plain ASCII one.
const NON_BREAKING_HYPHEN: &str = "&#8209;";

/// Trait for fetching page text.
///
/// Implementors return the page decoded as UTF-8 with [`normalize_page_text`]
/// applied, or an error for any status other than `200 OK`.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Decode-side normalization applied to every fetched page.
pub fn normalize_page_text(text: &str) -> String {
    text.replace(NON_BREAKING_HYPHEN, "-")
}

/// [`PageFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with the browser-like headers the site expects.
    ///
    /// # Arguments
    ///
    /// * `proxy` - Optional proxy URL applied to both http and https traffic
    pub fn new(proxy: Option<&str>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(request_err)?;
        let status = resp.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Non-OK response; nothing downloaded");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(request_err)?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::Decode {
            url: url.to_string(),
        })?;
        let text = normalize_page_text(&text);

        info!(
            bytes = text.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        debug!(preview = %truncate_for_log(&text, 200), "Page preview");
        Ok(text)
    }
}
