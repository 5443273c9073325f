use anyhow::Result;
use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService},
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use similarity_checker::build_checker;
use similarity_checker::config::Config;
use similarity_checker::service::SimilarityService;
use similarity_checker::transport::{GeminiTransport, Transport};
use similarity_checker::web;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to stderr for MCP compatibility
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::load());

    // Missing credential is fatal before anything is served
    config.require_api_key()?;
    let transport: Arc<dyn Transport> =
        Arc::new(GeminiTransport::new(&config.gemini, config.request_timeout())?);
    let checker = Arc::new(build_checker(&config, transport));
    let service = SimilarityService::new(checker.clone(), config.clone());

    // Choose transport: stdio (default) or http
    let transport = std::env::var("SC_TRANSPORT").unwrap_or_else(|_| "stdio".to_string());
    match transport.as_str() {
        "http" | "streamable_http" => {
            let bind: SocketAddr = std::env::var("SC_HTTP_BIND")
                .unwrap_or_else(|_| "127.0.0.1:8787".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SC_HTTP_BIND (expected host:port): {e}"))?;
            let path = std::env::var("SC_HTTP_PATH").unwrap_or_else(|_| "/mcp".to_string());
            let bearer_token = std::env::var("SC_BEARER_TOKEN").ok();

            let svc_factory_service = service.clone();
            let session_manager: rmcp::transport::streamable_http_server::session::local::LocalSessionManager = Default::default();
            let http_service: StreamableHttpService<SimilarityService, _> =
                StreamableHttpService::new(
                    move || Ok(svc_factory_service.clone()),
                    Arc::new(session_manager),
                    StreamableHttpServerConfig {
                        stateful_mode: true,
                        sse_keep_alive: Some(Duration::from_secs(15)),
                    },
                );

            let mut router = web::router(checker).nest_service(path.as_str(), http_service);
            if let Some(expected) = bearer_token.clone() {
                router = web::require_bearer(router, expected);
            }

            let listener = tokio::net::TcpListener::bind(bind).await?;
            tracing::info!(
                %bind,
                path = %path,
                auth = %bearer_token.as_deref().map(|_| "bearer").unwrap_or("none"),
                "Starting similarity checker HTTP server"
            );

            axum::serve(listener, router).await?;
            Ok(())
        }
        _ => {
            tracing::info!("main: Service created, starting server on stdio transport");
            let server = service.serve(stdio()).await?;
            tracing::info!("main: Server started, waiting for connection to close");
            server.waiting().await?;
            tracing::info!("main: Server connection closed");
            Ok(())
        }
    }
}
