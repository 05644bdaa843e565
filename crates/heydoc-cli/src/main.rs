mod claims;
mod console;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use heydoc_models::{ParticipantIdentity, RoomId};
use heydoc_sdk::{
    generate_local_identity, BootstrapConfig, BootstrapController, ConnectionState,
    HttpTokenSource, TokenRequest, TokenSource,
};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleMedia;

#[derive(Parser, Debug)]
#[command(name = "heydoc")]
#[command(about = "HeyDoc voice room client")]
#[command(author, version, long_about = None)]
struct Cli {
    /// Token issuer base URL (overrides HEYDOC_TOKEN_URL)
    #[arg(long)]
    token_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Request one credential and print it with its claims
    Token {
        /// Room to request access to (defaults to HEYDOC_ROOM)
        #[arg(long)]
        room: Option<RoomId>,

        /// Identity the credential is minted for
        #[arg(long)]
        username: ParticipantIdentity,

        /// Request an agent credential, which dispatches the voice agent
        #[arg(long)]
        agent: bool,
    },
    /// Run the full bootstrap and stay in the room until Ctrl-C
    Connect {
        /// Local identity (defaults to a random Web-User-N)
        #[arg(long)]
        identity: Option<ParticipantIdentity>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = BootstrapConfig::from_env()?;
    if let Some(url) = cli.token_url {
        config.token_url = url;
    }

    match cli.command {
        Commands::Token {
            room,
            username,
            agent,
        } => {
            let room = room.unwrap_or_else(|| config.room.clone());
            let request = if agent {
                TokenRequest::agent(room, username)
            } else {
                TokenRequest::user(room, username)
            };
            print_token(&config, &request).await
        }
        Commands::Connect { identity } => {
            let identity = identity.unwrap_or_else(generate_local_identity);
            connect(&config, identity).await
        }
    }
}

async fn print_token(config: &BootstrapConfig, request: &TokenRequest) -> anyhow::Result<()> {
    let source = HttpTokenSource::new(config.token_url.clone());
    let issued = source
        .fetch_token(request)
        .await
        .with_context(|| format!("requesting token from {}", config.token_url))?;

    println!("{}", issued.token());
    let claims = claims::decode_unverified(issued.token())?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    Ok(())
}

async fn connect(config: &BootstrapConfig, identity: ParticipantIdentity) -> anyhow::Result<()> {
    let (media, media_events) = ConsoleMedia::new();
    let source = HttpTokenSource::new(config.token_url.clone());
    let controller = BootstrapController::new(config, identity.clone(), source, media);

    println!("connecting to '{}' as {identity}", config.room);

    let mut states = controller.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            match state.error_message() {
                Some(cause) => println!("state: failed ({cause})"),
                None => println!("state: {state}"),
            }
        }
    });

    tokio::spawn({
        let controller = controller.clone();
        async move { controller.pump_media_events(media_events).await }
    });

    if let ConnectionState::Failed { cause } = controller.connect().await {
        bail!(cause);
    }

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    controller.disconnect().await;
    Ok(())
}
