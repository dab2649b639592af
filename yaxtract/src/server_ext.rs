//! yaxserver extension for the extraction API
//!
//! Extension trait adding the extraction routes to a `yaxserver::Server`
//! without yaxserver depending on this crate.

use crate::api_rest::ExtractState;
use anyhow::Result;

/// Trait extending yaxserver with the extraction endpoints
///
/// # Routes registered
///
/// - `GET /health` - Service liveness, fixed shape
/// - `POST /extract-audio` - Resolve and stream (or JSON fallback)
/// - `GET /extract-audio?url=...` - Resolve and stream/redirect
///
/// # Example
///
/// ```rust,no_run
/// use yaxserver::ServerBuilder;
/// use yaxtract::YaxtractExt;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut server = ServerBuilder::new_configured().build();
///
///     server.init_yaxtract().await?;
///
///     server.start().await;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait YaxtractExt {
    /// Builds the resolver chain from configuration and registers the
    /// HTTP routes
    ///
    /// The scraper backend is constructed only when an API key is
    /// configured; otherwise the chain starts at the rusty_ytdl backend.
    async fn init_yaxtract(&mut self) -> Result<ExtractState>;
}

// Implementation lives in server_impl.rs, keeping this module free of
// the wiring details.
