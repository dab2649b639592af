//! Scraper API backend
//!
//! Client for a RapidAPI-style YouTube scraping service. The API turns
//! a video id into a short-lived download link; this backend then
//! fetches that link itself and hands the chain an already-open byte
//! stream. A failed secondary fetch counts as this backend declining,
//! not as terminal failure.

use crate::chain::AudioBackend;
use crate::error::{Error, Result};
use crate::models::AudioLocator;
use crate::validate::video_id_from_url;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default scraping API host
pub const DEFAULT_API_HOST: &str = "youtube-mp36.p.rapidapi.com";

/// Default timeout for the metadata (`/dl`) request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Response shape of the scraper's `/dl` endpoint
#[derive(Debug, Deserialize)]
struct ScraperResponse {
    status: Option<String>,
    link: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    msg: Option<String>,
}

/// Credentialed scraping API backend
///
/// The client is stateless; credentials and the API base URL are fixed
/// at construction. Use [`ScraperBackend::builder`] to point `api_base`
/// at a test double.
#[derive(Debug, Clone)]
pub struct ScraperBackend {
    client: Client,
    api_base: String,
    api_host: String,
    api_key: String,
    request_timeout: Duration,
}

impl ScraperBackend {
    /// Creates a builder for configuring the backend
    pub fn builder() -> ScraperBackendBuilder {
        ScraperBackendBuilder::default()
    }

    /// The API base URL this backend talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Asks the scraping API for a download link
    async fn request_download_link(&self, video_id: &str) -> Result<ScraperResponse> {
        let endpoint = format!("{}/dl", self.api_base);
        let response = self
            .client
            .get(&endpoint)
            .timeout(self.request_timeout)
            .query(&[("id", video_id)])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AudioBackend for ScraperBackend {
    fn name(&self) -> &'static str {
        "scraper-api"
    }

    async fn resolve(&self, url: &str) -> Result<AudioLocator> {
        let parsed = Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;
        let video_id = video_id_from_url(&parsed).ok_or(Error::MissingField("video id"))?;

        let payload = self.request_download_link(&video_id).await?;

        if payload.status.as_deref() != Some("ok") {
            let msg = payload
                .msg
                .unwrap_or_else(|| "scraper API reported failure".to_string());
            return Err(Error::Extraction(msg));
        }

        let link = payload
            .link
            .filter(|l| !l.is_empty())
            .ok_or(Error::MissingField("link"))?;

        debug!(video_id, "Scraper API returned download link, fetching bytes");

        // Secondary fetch: open the byte stream ourselves. Failure here
        // is a decline, so the chain falls through to the next backend.
        let audio = self.client.get(&link).send().await?;
        if !audio.status().is_success() {
            return Err(Error::UpstreamStatus(audio.status().as_u16()));
        }

        let mime_type = audio
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| "audio/mpeg".to_string());
        let content_length = audio.content_length();

        let stream = audio
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)))
            .boxed();

        let mut locator = AudioLocator::stream(stream).with_mime_type(mime_type);
        if let Some(title) = payload.title {
            locator = locator.with_title(title);
        }
        if let Some(duration) = payload.duration {
            locator = locator.with_duration_seconds(duration as u64);
        }
        if let Some(length) = content_length {
            locator = locator.with_content_length(length);
        }

        Ok(locator)
    }
}

/// Builder for [`ScraperBackend`]
#[derive(Debug, Default)]
pub struct ScraperBackendBuilder {
    api_key: Option<String>,
    api_host: Option<String>,
    api_base: Option<String>,
    client: Option<Client>,
    timeout: Option<Duration>,
}

impl ScraperBackendBuilder {
    /// Sets the API key (required)
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API host (default: youtube-mp36.p.rapidapi.com)
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    /// Overrides the API base URL (useful for tests)
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Uses a custom reqwest client (shared connection pools, proxies)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the timeout for the metadata request. The audio stream
    /// opened afterwards is not covered; it is bounded per-read instead.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the backend
    ///
    /// Fails with `MissingCredentials` when no API key was provided.
    pub fn build(self) -> Result<ScraperBackend> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredentials)?;
        let api_host = self
            .api_host
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let api_base = self
            .api_base
            .unwrap_or_else(|| format!("https://{api_host}"));

        let request_timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        // No total timeout on the client: the byte stream opened in
        // resolve() is consumed later by the relay, and a client-wide
        // deadline would cut long transfers short.
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
                .read_timeout(DEFAULT_READ_TIMEOUT)
                .build()?,
        };

        Ok(ScraperBackend {
            client,
            api_base,
            api_host,
            api_key,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_an_api_key() {
        assert!(matches!(
            ScraperBackend::builder().build(),
            Err(Error::MissingCredentials)
        ));
        assert!(matches!(
            ScraperBackend::builder().api_key("   ").build(),
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn builder_derives_base_url_from_host() {
        let backend = ScraperBackend::builder()
            .api_key("secret")
            .api_host("scraper.example.com")
            .build()
            .unwrap();
        assert_eq!(backend.api_base(), "https://scraper.example.com");
    }

    #[test]
    fn explicit_base_url_wins() {
        let backend = ScraperBackend::builder()
            .api_key("secret")
            .api_base("http://127.0.0.1:9999")
            .build()
            .unwrap();
        assert_eq!(backend.api_base(), "http://127.0.0.1:9999");
    }
}
