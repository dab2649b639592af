//! rusty_ytdl backend
//!
//! General-purpose extraction: asks the library for video info, then
//! picks the audio-only format with the highest declared audio bitrate.
//! The locator carries the format's direct URL; the relay performs the
//! actual fetch.

use crate::chain::AudioBackend;
use crate::error::{Error, Result};
use crate::models::AudioLocator;
use async_trait::async_trait;
use rusty_ytdl::{Video, VideoOptions, VideoQuality, VideoSearchOptions};
use tracing::debug;

/// Extraction backend built on the rusty_ytdl library
pub struct YtdlBackend {
    options: VideoOptions,
}

impl YtdlBackend {
    pub fn new() -> Self {
        Self {
            options: VideoOptions {
                quality: VideoQuality::HighestAudio,
                filter: VideoSearchOptions::Audio,
                ..Default::default()
            },
        }
    }
}

impl Default for YtdlBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioBackend for YtdlBackend {
    fn name(&self) -> &'static str {
        "rusty_ytdl"
    }

    async fn resolve(&self, url: &str) -> Result<AudioLocator> {
        let video = Video::new_with_options(url, self.options.clone())
            .map_err(|e| Error::Extraction(e.to_string()))?;

        let info = video
            .get_info()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        // Highest-audio policy: single criterion, library ordering
        // breaks ties.
        let format = info
            .formats
            .iter()
            .filter(|f| f.has_audio && !f.has_video)
            .max_by_key(|f| f.audio_bitrate.unwrap_or(0))
            .ok_or(Error::NoAudioFormat)?;

        if format.url.is_empty() {
            return Err(Error::MissingField("format url"));
        }

        debug!(
            itag = format.itag,
            audio_bitrate = ?format.audio_bitrate,
            "Selected audio format"
        );

        let mut locator = AudioLocator::remote_url(format.url.clone())
            .with_mime_type(format.mime_type.mime.to_string())
            .with_title(info.video_details.title.clone());

        if let Some(bitrate) = format.audio_bitrate {
            locator = locator.with_bitrate(bitrate);
        }
        if let Ok(duration) = info.video_details.length_seconds.parse::<u64>() {
            locator = locator.with_duration_seconds(duration);
        }

        Ok(locator)
    }
}
