//! End-to-end tests for the REST surface, using mock backends and
//! in-process router calls (no sockets except wiremock upstreams)

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yaxtract::chain::{AudioBackend, ResolverChain};
use yaxtract::models::AudioLocator;
use yaxtract::relay::relay_client;
use yaxtract::{create_router, Error, ExtractState, Result};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// What a mock backend should produce on each call
#[derive(Clone)]
enum MockOutcome {
    RemoteUrl(String),
    Chunks(Vec<&'static [u8]>, &'static str),
    Fail(&'static str),
}

struct MockBackend {
    name: &'static str,
    outcome: MockOutcome,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    fn new(name: &'static str, outcome: MockOutcome) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn resolve(&self, _url: &str) -> Result<AudioLocator> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::RemoteUrl(url) => Ok(AudioLocator::remote_url(url.clone())
                .with_title("Mock Song")
                .with_duration_seconds(212)
                .with_bitrate(160)
                .with_mime_type("audio/webm")),
            MockOutcome::Chunks(chunks, mime) => {
                let stream = futures::stream::iter(
                    chunks
                        .clone()
                        .into_iter()
                        .map(|c| Ok(Bytes::from_static(c))),
                )
                .boxed();
                Ok(AudioLocator::stream(stream).with_mime_type(*mime))
            }
            MockOutcome::Fail(message) => Err(Error::extraction(*message)),
        }
    }
}

fn state_with(backends: Vec<Arc<MockBackend>>) -> ExtractState {
    let backends = backends
        .into_iter()
        .map(|b| b as Arc<dyn AudioBackend>)
        .collect();
    ExtractState::new(Arc::new(ResolverChain::new(backends)))
}

fn post_request(url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract-audio")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "url": url }).to_string()))
        .unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_always_returns_fixed_shape() {
    let app = create_router(state_with(vec![]));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response.into_body()).await;
    assert_eq!(value, json!({ "status": "ok", "service": "yaxtract" }));
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_backend_runs() {
    let spy = MockBackend::new("spy", MockOutcome::Fail("should not run"));
    let app = create_router(state_with(vec![spy.clone()]));

    let response = app
        .oneshot(post_request("https://vimeo.com/12345"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response.into_body()).await;
    assert!(value["error"].as_str().unwrap().contains("Invalid YouTube URL"));
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn missing_url_in_body_returns_400() {
    let spy = MockBackend::new("spy", MockOutcome::Fail("should not run"));
    let app = create_router(state_with(vec![spy.clone()]));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/extract-audio")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response.into_body()).await;
    assert_eq!(value["error"], "URL is required");
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn fallback_uses_second_backend_without_leaking_first_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audio.webm"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/webm")
                .set_body_bytes(b"second-backend-audio".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let failing = MockBackend::new("scraper", MockOutcome::Fail("scraper blew up"));
    let succeeding = MockBackend::new(
        "ytdl",
        MockOutcome::RemoteUrl(format!("{}/audio.webm", mock_server.uri())),
    );
    let app = create_router(state_with(vec![failing.clone(), succeeding.clone()]));

    let response = app.oneshot(post_request(WATCH_URL)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/webm"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"second-backend-audio");
    assert_eq!(failing.call_count(), 1);
    assert_eq!(succeeding.call_count(), 1);
}

#[tokio::test]
async fn remote_url_with_failing_fetch_degrades_to_json_payload() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audio.webm"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let audio_url = format!("{}/audio.webm", mock_server.uri());
    let backend = MockBackend::new("ytdl", MockOutcome::RemoteUrl(audio_url.clone()));
    let app = create_router(state_with(vec![backend]));

    let response = app.oneshot(post_request(WATCH_URL)).await.unwrap();

    // Deliberate fallback, not an error
    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response.into_body()).await;
    assert_eq!(value["downloadUrl"], audio_url);
    assert_eq!(value["title"], "Mock Song");
    assert_eq!(value["duration"], 212);
    assert_eq!(value["format"]["mimeType"], "audio/webm");
    assert_eq!(value["format"]["bitrate"], 160);
}

#[tokio::test]
async fn stalled_upstream_times_out_and_degrades_to_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audio.webm"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/webm")
                .set_body_bytes(b"too-late".to_vec())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let audio_url = format!("{}/audio.webm", mock_server.uri());
    let backend = MockBackend::new("ytdl", MockOutcome::RemoteUrl(audio_url.clone()));
    let state = state_with(vec![backend]).with_http_client(relay_client(
        Duration::from_millis(100),
        Duration::from_millis(100),
    ));
    let app = create_router(state);

    // Upstream never answers within the read deadline; the request must
    // still complete, with the download payload.
    let response = app.oneshot(post_request(WATCH_URL)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response.into_body()).await;
    assert_eq!(value["downloadUrl"], audio_url);
}

#[tokio::test]
async fn open_stream_locator_forwards_bytes_unmodified_and_in_order() {
    let backend = MockBackend::new(
        "scraper",
        MockOutcome::Chunks(vec![b"first-", b"second-", b"third"], "audio/mpeg"),
    );
    let app = create_router(state_with(vec![backend]));

    let response = app.oneshot(post_request(WATCH_URL)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"first-second-third");
}

#[tokio::test]
async fn exhausted_chain_returns_500_with_last_diagnostic() {
    let first = MockBackend::new("scraper", MockOutcome::Fail("first diagnostic"));
    let last = MockBackend::new("yt-dlp", MockOutcome::Fail("last diagnostic"));
    let app = create_router(state_with(vec![first, last]));

    let response = app.oneshot(post_request(WATCH_URL)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let value = body_json(response.into_body()).await;
    assert_eq!(value["error"], "Failed to extract audio");
    let details = value["details"].as_str().unwrap();
    assert!(details.contains("last diagnostic"));
    assert!(!details.contains("first diagnostic"));
}

#[tokio::test]
async fn identical_requests_yield_identical_response_shape() {
    let backend = MockBackend::new(
        "scraper",
        MockOutcome::Chunks(vec![b"deterministic"], "audio/mpeg"),
    );
    let app = create_router(state_with(vec![backend]));

    let first = app.clone().oneshot(post_request(WATCH_URL)).await.unwrap();
    let second = app.oneshot(post_request(WATCH_URL)).await.unwrap();

    assert_eq!(first.status(), second.status());
    assert_eq!(
        first.headers().get(header::CONTENT_TYPE),
        second.headers().get(header::CONTENT_TYPE)
    );
    let first_bytes = axum::body::to_bytes(first.into_body(), usize::MAX)
        .await
        .unwrap();
    let second_bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn get_variant_redirects_remote_url_locators() {
    let backend = MockBackend::new(
        "ytdl",
        MockOutcome::RemoteUrl("https://cdn.example.com/audio.webm".to_string()),
    );
    let app = create_router(state_with(vec![backend]));

    let uri = format!(
        "/extract-audio?url={}",
        "https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3DdQw4w9WgXcQ"
    );
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://cdn.example.com/audio.webm"
    );
}

#[tokio::test]
async fn get_variant_requires_url_parameter() {
    let app = create_router(state_with(vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/extract-audio")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response.into_body()).await;
    assert_eq!(value["error"], "URL query parameter is required");
}

#[tokio::test]
async fn get_variant_streams_open_stream_locators() {
    let backend = MockBackend::new(
        "scraper",
        MockOutcome::Chunks(vec![b"streamed-directly"], "audio/mpeg"),
    );
    let app = create_router(state_with(vec![backend]));

    let uri = format!(
        "/extract-audio?url={}",
        "https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ"
    );
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"streamed-directly");
}
