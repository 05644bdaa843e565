//! HeyDoc token issuer — serves `GET /token` for the web client.

use heydoc_auth::{IssuerConfig, TokenIssuer};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Configuration: refuse to start without signing material.
    let config = IssuerConfig::from_env().inspect_err(|e| {
        error!(error = %e, "invalid issuer configuration");
    })?;

    info!(
        server_url = %config.server_url,
        api_key = %config.api_key,
        ttl_secs = config.token_ttl_secs,
        agent = %config.agent_name,
        "issuer configured"
    );

    let issuer = TokenIssuer::new(&config);
    let app = heydoc_auth::router(issuer);

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, "token issuer listening");
    axum::serve(listener, app).await?;

    Ok(())
}
