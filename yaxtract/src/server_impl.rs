//! Implementation of `YaxtractExt` for `yaxserver::Server`

use crate::api_rest::{create_router, ExtractState};
use crate::backends::assemble_chain;
use crate::config_ext::YaxConfigExt;
use crate::server_ext::YaxtractExt;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use yaxconfig::get_config;

impl YaxtractExt for yaxserver::Server {
    async fn init_yaxtract(&mut self) -> Result<ExtractState> {
        let config = get_config();

        let chain = assemble_chain(
            config.get_scraper_api_key()?,
            &config.get_scraper_api_host()?,
            config.get_extract_backend_timeout()?,
        )?;
        info!(backends = ?chain.backend_names(), "Resolver chain ready");

        let state = ExtractState::new(Arc::new(chain));
        self.add_router("/", create_router(state.clone())).await;

        Ok(state)
    }
}
