use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use parley_client::config::DEFAULT_SERVER_URL;
use parley_client::{
    ClientConfig, ClientEngine, JoinError, StaticMedia, TracingSurface, WebRtcNegotiator,
};
use parley_server::ServerConfig;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley", version, about = "Room-based WebRTC signaling relay")]
struct Cli {
    /// Used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        #[arg(long, env = "BIND_HOST")]
        host: Option<IpAddr>,
    },

    /// Join a room as a headless peer with synthetic media.
    Peer {
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,

        /// Prompted for when omitted.
        #[arg(long)]
        room: Option<String>,

        #[arg(long)]
        audio_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Serve { port, host } => run_server(port, host).await,
        Commands::Peer {
            server,
            room,
            audio_only,
        } => run_peer(server, room, audio_only).await,
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_server(port: Option<u16>, host: Option<IpAddr>) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }

    println!(
        "{} {}",
        "📡 Parley relay on".green().bold(),
        format!("ws://{}/ws", config.bind_addr).cyan()
    );

    tokio::select! {
        result = parley_server::serve(config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

async fn run_peer(server: String, room: Option<String>, audio_only: bool) -> Result<()> {
    let room = match room {
        Some(room) => room,
        None => Input::<String>::new()
            .with_prompt("Room name")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read room name")?,
    };

    let config = ClientConfig::default().with_server_url(server);
    let channel = parley_client::connect(&config.server_url)
        .await
        .with_context(|| format!("Failed to reach {}", config.server_url))?;

    let media = if audio_only {
        StaticMedia::audio_only()
    } else {
        StaticMedia::audio_video()
    };
    let mut engine = ClientEngine::new(
        &config,
        Arc::new(media),
        Arc::new(WebRtcNegotiator::new()?),
        Arc::new(TracingSurface::new()),
        channel.outbound,
    );

    match engine.join_room(&room) {
        Ok(()) => println!("{} {}", "🚪 Joining room".green().bold(), room.cyan()),
        Err(e @ JoinError::EmptyRoomName) => {
            println!("{}", e.to_string().red());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    tokio::select! {
        _ = engine.run(channel.inbound) => {
            println!("{}", "Signaling server closed the connection".yellow());
        }
        _ = tokio::signal::ctrl_c() => {
            engine.leave().await;
            println!("{}", "👋 Left the room".green());
        }
    }

    Ok(())
}
