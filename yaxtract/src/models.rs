//! Data model for the resolution and relay pipeline
//!
//! All of these are ephemeral, owned by a single request's lifetime.
//! Nothing here is cached or shared across requests.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Boxed byte stream produced by a backend that already opened the
/// upstream connection itself.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Where the resolved audio bytes live
pub enum AudioSource {
    /// An already-open byte stream (the backend performed the fetch)
    Stream(ByteStream),
    /// A direct download URL, not fetched yet
    RemoteUrl(String),
}

// Custom Debug - a boxed stream has nothing useful to display
impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSource::Stream(_) => f.debug_tuple("Stream").field(&"..").finish(),
            AudioSource::RemoteUrl(url) => f.debug_tuple("RemoteUrl").field(url).finish(),
        }
    }
}

/// The resolved result of one backend attempt
///
/// Exactly one locator (or none) is produced per request. Metadata is
/// best-effort: backends fill in what the upstream reports.
#[derive(Debug)]
pub struct AudioLocator {
    pub source: AudioSource,
    pub mime_type: Option<String>,
    pub bitrate: Option<u64>,
    pub title: Option<String>,
    pub duration_seconds: Option<u64>,
    pub content_length: Option<u64>,
}

impl AudioLocator {
    /// Locator around a direct download URL
    pub fn remote_url(url: impl Into<String>) -> Self {
        Self {
            source: AudioSource::RemoteUrl(url.into()),
            mime_type: None,
            bitrate: None,
            title: None,
            duration_seconds: None,
            content_length: None,
        }
    }

    /// Locator around an already-open byte stream
    pub fn stream(stream: ByteStream) -> Self {
        Self {
            source: AudioSource::Stream(stream),
            mime_type: None,
            bitrate: None,
            title: None,
            duration_seconds: None,
            content_length: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration_seconds(mut self, duration: u64) -> Self {
        self.duration_seconds = Some(duration);
        self
    }

    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }
}

/// Audio format description embedded in the JSON fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormatInfo {
    pub mime_type: Option<String>,
    pub bitrate: Option<u64>,
}

/// JSON payload returned when the relay cannot stream the bytes itself
///
/// This is a deliberate fallback, not an error: the caller can retrieve
/// the audio from `download_url` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
    pub download_url: String,
    pub title: Option<String>,
    pub duration: Option<u64>,
    pub format: AudioFormatInfo,
}

/// Request body for `POST /extract-audio`
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub url: String,
}
