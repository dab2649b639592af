//! YouTube audio extraction and relay pipeline for YAXtract
//!
//! This crate resolves a YouTube URL into playable audio through an
//! ordered chain of backends, then relays the result over HTTP:
//!
//! 1. **Scraper API** - a credentialed third-party scraping service
//!    (skipped when no API key is configured); resolves a download link
//!    and opens the byte stream itself
//! 2. **rusty_ytdl** - library metadata + format lookup, highest audio
//!    bitrate wins
//! 3. **yt-dlp** - subprocess extraction, most resilient to bot
//!    detection
//!
//! Each backend failure is caught at the chain boundary and the next
//! candidate is tried; only exhaustion of the whole chain surfaces as an
//! error. The relay streams bytes when it can and degrades to a JSON
//! payload carrying the direct URL when it cannot.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use yaxtract::backends::YtdlBackend;
//! use yaxtract::chain::ResolverChain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chain = ResolverChain::new(vec![Arc::new(YtdlBackend::new())]);
//!
//!     let locator = chain
//!         .resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("Resolved: {:?} ({:?})", locator.title, locator.mime_type);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Server integration
//!
//! The [`YaxtractExt`] trait wires the whole pipeline into a
//! `yaxserver::Server`:
//!
//! ```no_run
//! use yaxserver::ServerBuilder;
//! use yaxtract::YaxtractExt;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut server = ServerBuilder::new_configured().build();
//! server.init_yaxtract().await?;
//! server.start().await;
//! # Ok(())
//! # }
//! ```

pub mod api_rest;
pub mod backends;
pub mod chain;
pub mod config_ext;
pub mod error;
pub mod models;
pub mod relay;
pub mod server_ext;
pub mod validate;

mod server_impl;

// Re-exports
pub use api_rest::{create_router, ExtractState, SERVICE_NAME};
pub use backends::{assemble_chain, ScraperBackend, ScraperBackendBuilder, YtDlpBackend, YtdlBackend};
pub use chain::{AudioBackend, ResolverChain};
pub use config_ext::YaxConfigExt;
pub use error::{Error, Result};
pub use models::{
    AudioFormatInfo, AudioLocator, AudioSource, ByteStream, DownloadInfo, ExtractRequest,
};
pub use server_ext::YaxtractExt;
pub use validate::{validate_watch_url, video_id_from_url};
