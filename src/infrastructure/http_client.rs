//! Page fetcher over a cookie-keeping HTTP session
//!
//! One `HttpClient` owns one cookie store. Every request made through the
//! same client replays the cookies set by earlier responses, which is what
//! lets the add-to-cart POST and the cart view GET see the session opened by
//! the product page GET.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, redirect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::parsing::ParsedDocument;
use super::scrape_error::{ScrapeError, ScrapeResult};

/// HTTP client configuration for the scraping session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
    /// Redirects followed per request; 0 disables redirect following
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: super::config::defaults::USER_AGENT.to_string(),
            accept_language: super::config::defaults::ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: super::config::defaults::REQUEST_TIMEOUT_SECONDS,
            max_redirects: super::config::defaults::MAX_REDIRECTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One page request. A POST always carries a form body, a GET never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    method: HttpMethod,
    form: Option<BTreeMap<String, String>>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            form: None,
        }
    }

    pub fn post(url: impl Into<String>, form: BTreeMap<String, String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            form: Some(form),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn form(&self) -> Option<&BTreeMap<String, String>> {
        self.form.as_ref()
    }
}

/// The only I/O boundary of the pipeline
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issue the request on the shared session and parse the final response body
    async fn fetch(&self, request: FetchRequest) -> ScrapeResult<ParsedDocument>;
}

/// reqwest-backed page fetcher with its own cookie store
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid accept language")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .redirect(if config.max_redirects > 0 {
                redirect::Policy::limited(config.max_redirects)
            } else {
                redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, request: FetchRequest) -> ScrapeResult<ParsedDocument> {
        let url = request.url();
        info!("Fetching URL: {} ({:?})", url, request.method());

        let builder = match (request.method(), request.form()) {
            (HttpMethod::Post, Some(form)) => self.client.post(url).form(form),
            (HttpMethod::Post, None) => self.client.post(url),
            (HttpMethod::Get, _) => self.client.get(url),
        };

        let response = builder.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            ScrapeError::request_failed(url, e.to_string())
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::request_failed(&final_url, format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            if body.trim().is_empty() {
                warn!("HTTP {} with empty body: {}", status, final_url);
                return Err(ScrapeError::http_status(&final_url, status.as_u16()));
            }
            warn!("HTTP {} from {}, parsing the body anyway", status, final_url);
        }

        if final_url != url {
            debug!("Redirected: {} -> {}", url, final_url);
        }
        debug!("Fetched {} ({}, {} bytes)", final_url, status, body.len());

        Ok(ParsedDocument::parse(final_url, &body))
    }
}
