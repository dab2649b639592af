//! yt-dlp backend
//!
//! Shells out to the yt-dlp executable, whose extractor ecosystem is the
//! most resilient to YouTube's bot detection. Runs with `--dump-json`
//! only: no download, just metadata plus the best-audio direct URL.

use crate::chain::AudioBackend;
use crate::error::{Error, Result};
use crate::models::AudioLocator;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Default executable name, resolved through PATH
pub const DEFAULT_PROGRAM: &str = "yt-dlp";

/// Subset of yt-dlp's JSON dump that the relay needs
#[derive(Debug, Deserialize)]
struct YtDlpJson {
    url: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    abr: Option<f64>,
    ext: Option<String>,
}

/// Extraction backend driving the yt-dlp subprocess
pub struct YtDlpBackend {
    program: String,
}

impl YtDlpBackend {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    /// Uses a specific yt-dlp binary instead of searching PATH
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for YtDlpBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a yt-dlp container extension to a MIME type
fn mime_for_ext(ext: &str) -> String {
    match ext {
        "webm" => "audio/webm".to_string(),
        "m4a" | "mp4" => "audio/mp4".to_string(),
        "mp3" => "audio/mpeg".to_string(),
        "opus" | "ogg" | "oga" => "audio/ogg".to_string(),
        other => format!("audio/{other}"),
    }
}

#[async_trait]
impl AudioBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn resolve(&self, url: &str) -> Result<AudioLocator> {
        let output = Command::new(&self.program)
            .args(["--dump-json", "--no-playlist", "--no-warnings", "-f", "bestaudio"])
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("yt-dlp exited with an error")
                .to_string();
            return Err(Error::Extraction(diagnostic));
        }

        let meta: YtDlpJson = serde_json::from_slice(&output.stdout)?;
        let link = meta
            .url
            .filter(|u| !u.is_empty())
            .ok_or(Error::MissingField("url"))?;

        debug!(ext = ?meta.ext, abr = ?meta.abr, "yt-dlp resolved best audio");

        let mut locator = AudioLocator::remote_url(link);
        if let Some(ext) = meta.ext.as_deref() {
            locator = locator.with_mime_type(mime_for_ext(ext));
        }
        if let Some(title) = meta.title {
            locator = locator.with_title(title);
        }
        if let Some(duration) = meta.duration {
            locator = locator.with_duration_seconds(duration.round() as u64);
        }
        if let Some(abr) = meta.abr {
            locator = locator.with_bitrate(abr.round() as u64);
        }

        Ok(locator)
    }
}
