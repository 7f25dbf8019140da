use anyhow::{Context, Result, bail};
use callroom_core::ConnectionId;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A browser stand-in speaking the JSON frame protocol over a real WebSocket.
pub struct TestClient {
    pub connection_id: ConnectionId,
    /// The `ice_config` body received right after the welcome.
    pub ice_config: Value,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and consume the welcome + ice_config greeting.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("WebSocket handshake failed")?;

        let mut client = Self {
            connection_id: ConnectionId::new(),
            ice_config: Value::Null,
            stream,
        };

        let welcome = client.next_json(super::SIGNAL_TIMEOUT_MS).await?;
        if welcome["op"] != "welcome" {
            bail!("expected welcome, got {}", welcome);
        }
        client.connection_id = welcome["d"]["connection_id"]
            .as_str()
            .context("welcome without connection_id")?
            .parse()
            .context("connection_id is not a UUID")?;

        let ice = client.next_json(super::SIGNAL_TIMEOUT_MS).await?;
        if ice["op"] != "ice_config" {
            bail!("expected ice_config, got {}", ice);
        }
        client.ice_config = ice["d"].clone();

        Ok(client)
    }

    pub async fn send_text(&mut self, frame: &str) -> Result<()> {
        self.stream
            .send(Message::Text(frame.to_owned().into()))
            .await
            .context("Failed to send frame")
    }

    /// Next text frame parsed as JSON.
    pub async fn next_json(&mut self, timeout_ms: u64) -> Result<Value> {
        let timeout = std::time::Duration::from_millis(timeout_ms);
        loop {
            let next = tokio::time::timeout(timeout, self.stream.next())
                .await
                .context("Timeout waiting for frame")?;
            match next {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).context("Frame is not JSON");
                }
                Some(Ok(Message::Close(_))) | None => bail!("Connection closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("WebSocket error"),
            }
        }
    }

    /// Returns true if no text frame arrives within `ms`.
    pub async fn stays_silent(&mut self, ms: u64) -> bool {
        self.next_json(ms).await.is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream
            .close(None)
            .await
            .context("Failed to close WebSocket")
    }
}
