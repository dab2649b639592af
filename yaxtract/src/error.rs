//! Error types for the extraction pipeline

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or relaying audio
///
/// Backend-level variants (`Http`, `Json`, `UpstreamStatus`, ...) never
/// reach the HTTP surface on their own: the resolver chain converts each
/// of them into a decline and moves on. Only `InvalidUrl` and
/// `AllBackendsFailed` are user visible.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// URL did not match a known YouTube host
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// A backend response lacked a required field
    #[error("Missing field in backend response: {0}")]
    MissingField(&'static str),

    /// No audio-only format was available for the video
    #[error("No audio format available for this video")]
    NoAudioFormat,

    /// Extraction library or tool reported a failure
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Scraper API credentials are required but absent
    #[error("Scraper API credentials are not configured")]
    MissingCredentials,

    /// A backend attempt exceeded its deadline
    #[error("Backend attempt timed out after {0}s")]
    BackendTimeout(u64),

    /// Every backend in the chain declined
    #[error("All backends failed; last error from {backend}: {message}")]
    AllBackendsFailed {
        backend: &'static str,
        message: String,
    },
}

impl Error {
    /// Create an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }
}
