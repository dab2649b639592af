//! Backend implementations, in chain priority order
//!
//! - [`scraper`]: credentialed third-party scraping API (skipped when no
//!   API key is configured)
//! - [`ytdl`]: rusty_ytdl metadata + format lookup
//! - [`ytdlp`]: yt-dlp subprocess, best at surviving bot detection

use crate::chain::{AudioBackend, ResolverChain};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod scraper;
pub mod ytdl;
pub mod ytdlp;

pub use scraper::{ScraperBackend, ScraperBackendBuilder};
pub use ytdl::YtdlBackend;
pub use ytdlp::YtDlpBackend;

/// Assembles the default backend chain
///
/// The scraper backend is included, in first position, only when an API
/// key is provided; the library and subprocess backends always follow.
pub fn assemble_chain(
    scraper_api_key: Option<String>,
    scraper_api_host: &str,
    attempt_timeout: Duration,
) -> Result<ResolverChain> {
    let mut backends: Vec<Arc<dyn AudioBackend>> = Vec::new();

    match scraper_api_key {
        Some(api_key) => {
            let scraper = ScraperBackend::builder()
                .api_key(api_key)
                .api_host(scraper_api_host)
                .build()?;
            info!(api_host = scraper_api_host, "Scraper API backend enabled");
            backends.push(Arc::new(scraper));
        }
        None => {
            info!("No scraper API key configured, skipping scraper backend");
        }
    }

    backends.push(Arc::new(YtdlBackend::new()));
    backends.push(Arc::new(YtDlpBackend::new()));

    Ok(ResolverChain::new(backends).with_attempt_timeout(attempt_timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_without_key_has_no_scraper_backend() {
        let chain = assemble_chain(None, "scraper.test", Duration::from_secs(5)).unwrap();
        assert_eq!(chain.backend_names(), vec!["rusty_ytdl", "yt-dlp"]);
    }

    #[test]
    fn chain_with_key_puts_the_scraper_first() {
        let chain = assemble_chain(
            Some("secret".to_string()),
            "scraper.test",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            chain.backend_names(),
            vec!["scraper-api", "rusty_ytdl", "yt-dlp"]
        );
    }
}
