use callroom_core::IceServerConfig;
use std::net::SocketAddr;

pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

/// Runtime settings for the signaling server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Exact origin allowed by CORS. `None` allows any origin without credentials.
    pub cors_origin: Option<String>,
    /// Capacity of the coordinator's command queue.
    pub command_queue: usize,
    /// STUN/TURN servers advertised to every client on connect.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cors_origin: None,
            command_queue: 1024,
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_SERVER.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}
