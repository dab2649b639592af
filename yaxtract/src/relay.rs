//! Relay: turns an [`AudioLocator`] into an HTTP response
//!
//! The relay is split into two phases. `plan()` is the only fallible
//! part: it performs the upstream fetch (when the locator is a remote
//! URL) and decides between a prepared streaming response and the JSON
//! download-info fallback. Once a streaming response leaves `plan()`,
//! headers are committed; a later stream error can only be logged and
//! the connection dropped.

use crate::models::{AudioFormatInfo, AudioLocator, AudioSource, ByteStream, DownloadInfo};
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Browser identification sent on the relay fetch; some CDN endpoints
/// reject requests without one.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Origin header value expected by YouTube's CDN
pub const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// Connection deadline for the relay fetch
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline between successive reads on the relayed stream. A total
/// request timeout would abort long audio transfers mid-stream, so only
/// the gap between chunks is bounded.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_MIME_TYPE: &str = "audio/webm";
const ATTACHMENT_DISPOSITION: &str = "attachment; filename=\"audio.webm\"";

/// Builds an HTTP client suited to relaying: bounded connect and
/// per-read deadlines, no total request timeout.
pub fn relay_client(connect_timeout: Duration, read_timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Outcome of the decide phase
enum RelayPlan {
    /// Headers + body ready to stream
    Stream(Response),
    /// Streaming was not possible; hand the caller the URL instead
    Download(DownloadInfo),
}

/// Relays a locator with full semantics: stream when possible, degrade
/// to the JSON download payload when the upstream fetch fails.
pub async fn relay(http: &Client, source_url: &str, locator: AudioLocator) -> Response {
    match plan(http, source_url, locator).await {
        RelayPlan::Stream(response) => response,
        RelayPlan::Download(info) => Json(info).into_response(),
    }
}

/// Relays a locator in streaming-only mode (the GET variant): remote
/// URLs become a redirect, open streams are forwarded. No JSON fallback.
pub fn relay_streaming_only(locator: AudioLocator) -> Response {
    let AudioLocator {
        source,
        mime_type,
        content_length,
        ..
    } = locator;

    match source {
        AudioSource::RemoteUrl(url) => Redirect::temporary(&url).into_response(),
        AudioSource::Stream(stream) => streaming_response(mime_type, content_length, stream),
    }
}

async fn plan(http: &Client, source_url: &str, locator: AudioLocator) -> RelayPlan {
    let AudioLocator {
        source,
        mime_type,
        bitrate,
        title,
        duration_seconds,
        content_length,
    } = locator;

    match source {
        AudioSource::Stream(stream) => {
            RelayPlan::Stream(streaming_response(mime_type, content_length, stream))
        }
        AudioSource::RemoteUrl(url) => {
            match fetch_upstream(http, source_url, &url).await {
                Ok(response) => {
                    let length = content_length.or(response.content_length());
                    let stream = response
                        .bytes_stream()
                        .map(|chunk| {
                            chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
                        })
                        .boxed();
                    RelayPlan::Stream(streaming_response(mime_type, length, stream))
                }
                Err(err) => {
                    // Deliberate fallback: the caller can fetch the URL
                    // itself.
                    info!(error = %err, "Direct streaming failed, returning download URL instead");
                    RelayPlan::Download(DownloadInfo {
                        download_url: url,
                        title,
                        duration: duration_seconds,
                        format: AudioFormatInfo { mime_type, bitrate },
                    })
                }
            }
        }
    }
}

/// Fetches the resolved audio URL with the headers the platform expects
async fn fetch_upstream(
    http: &Client,
    source_url: &str,
    audio_url: &str,
) -> Result<reqwest::Response, crate::error::Error> {
    let response = http
        .get(audio_url)
        .header(header::REFERER, source_url)
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .header(header::ORIGIN, YOUTUBE_ORIGIN)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(crate::error::Error::UpstreamStatus(
            response.status().as_u16(),
        ));
    }

    Ok(response)
}

/// Builds the streaming response: headers from the locator metadata,
/// body forwarding chunks as they arrive.
fn streaming_response(
    mime_type: Option<String>,
    content_length: Option<u64>,
    stream: ByteStream,
) -> Response {
    let mut headers = HeaderMap::new();

    let content_type = mime_type
        .as_deref()
        .and_then(|m| HeaderValue::from_str(m).ok())
        .unwrap_or(HeaderValue::from_static(DEFAULT_MIME_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(ATTACHMENT_DISPOSITION),
    );
    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    let body = Body::from_stream(monitored_stream(stream));
    (headers, body).into_response()
}

/// Wraps the byte stream so a mid-stream error is logged before the
/// stream closes. At this point headers are already sent; dropping the
/// connection is the only option left.
fn monitored_stream(stream: ByteStream) -> impl futures::Stream<Item = std::io::Result<bytes::Bytes>> {
    futures::stream::unfold((stream, false), |(mut stream, done)| async move {
        if done {
            return None;
        }

        match stream.next().await {
            Some(Ok(chunk)) => Some((Ok(chunk), (stream, false))),
            Some(Err(e)) => {
                warn!(error = %e, "Audio stream interrupted after headers were sent");
                Some((Err(e), (stream, true)))
            }
            None => None,
        }
    })
}
