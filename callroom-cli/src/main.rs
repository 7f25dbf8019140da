use anyhow::Result;
use callroom_core::IceServerConfig;
use callroom_server::{DEFAULT_STUN_SERVER, MemoryHistory, Server, ServerConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// WebRTC signaling relay: rooms, offer/answer/candidate forwarding and room chat.
#[derive(Parser, Debug)]
#[command(name = "callroom", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "CALLROOM_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Browser origin allowed to call the HTTP API (any origin if unset).
    #[arg(long, env = "CALLROOM_CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Capacity of the room coordinator's command queue.
    #[arg(long, env = "CALLROOM_QUEUE", default_value_t = 1024)]
    queue: usize,

    /// STUN server URLs advertised to clients, comma separated.
    #[arg(long, env = "CALLROOM_STUN", value_delimiter = ',', default_value = DEFAULT_STUN_SERVER)]
    stun: Vec<String>,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "CALLROOM_LOG", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let mut ice_servers = Vec::new();
        let stun: Vec<String> = self.stun.into_iter().filter(|u| !u.is_empty()).collect();
        if !stun.is_empty() {
            ice_servers.push(IceServerConfig {
                urls: stun,
                username: None,
                credential: None,
            });
        }
        if let Some(turn_url) = self.turn_url {
            ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: self.turn_username,
                credential: self.turn_credential,
            });
        }

        ServerConfig {
            bind_addr: self.bind,
            cors_origin: self.cors_origin,
            command_queue: self.queue,
            ice_servers,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Initializing signaling server...");
    let config = cli.into_config();
    if config.ice_servers.is_empty() {
        warn!("No ICE servers configured; clients only get host candidates");
    }

    let server = Server::bind(config, Arc::new(MemoryHistory::new())).await?;
    server.run_until(shutdown_signal()).await
}
