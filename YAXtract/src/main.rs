use tracing::info;
use yaxserver::{Server, init_logging};
use yaxtract::YaxtractExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1: Infrastructure ==========

    init_logging();

    let mut server = Server::new_configured();

    server
        .add_route("/info", || async {
            serde_json::json!({"version": env!("CARGO_PKG_VERSION")})
        })
        .await;

    // ========== PHASE 2: Extraction pipeline ==========

    info!("🎵 Initializing audio extraction pipeline...");
    let state = server.init_yaxtract().await?;
    info!(
        "✅ Resolver chain ready with {} backend(s)",
        state.chain.len()
    );

    // ========== PHASE 3: Server startup ==========

    info!("🌐 Starting HTTP server...");
    server.start().await;

    let info = server.info();
    info!(
        "✅ YAXtract is ready! Health check: http://{}:{}/health",
        info.base_url, info.http_port
    );
    info!(
        "Extract endpoint: POST http://{}:{}/extract-audio",
        info.base_url, info.http_port
    );
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
