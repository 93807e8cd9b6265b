use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sora_gateway::{
    GatewayConfig, client::OpenAiClient, credential::CredentialResolver, handler::AppState,
    router::build_router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sora-gateway", version, about = "HTTP gateway for the OpenAI Sora video API")]
struct Args {
    /// TOML config file; environment variables are used when omitted
    #[arg(short, long, env = "SORA_GATEWAY_CONFIG")]
    config: Option<String>,

    /// Interface to bind (overrides HOST / the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT / the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the built frontend (index.html + assets/)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sora_gateway=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::from_env()?,
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.static_dir {
        config.frontend.static_dir = dir;
    }
    config.validate()?;

    let provider = Arc::new(OpenAiClient::new(&config.upstream)?);
    let credentials = CredentialResolver::from_config(&config.credentials);

    info!("Starting Sora gateway...");
    info!("  Upstream: {}", config.upstream.base_url);
    info!("  Alias credential: {}", credentials.has_alias());
    info!("  CORS origins: {:?}", config.cors.allowed_origins());

    let state = Arc::new(AppState::new(provider, credentials));
    let app = build_router(state, &config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
