//! WebSocket Server
//!
//! Each connection gets its own event subscription. Every `NetworkEvent` is
//! forwarded as a JSON text frame; there is no replay, so clients only see
//! events published after they connect. A client that falls behind the
//! channel capacity skips the missed events.

use futures::{SinkExt, StreamExt};
use pos_network::Network;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// WebSocket Server
pub struct WebSocketServer {
    network: Arc<Network>,
}

impl WebSocketServer {
    pub fn new(network: Arc<Network>) -> Self {
        Self { network }
    }

    /// Run the WebSocket server
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already-bound listener
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        tracing::info!("WebSocket server listening on {}", listener.local_addr()?);

        while let Ok((stream, peer_addr)) = listener.accept().await {
            let network = self.network.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, network).await {
                    tracing::warn!("WebSocket connection error from {}: {}", peer_addr, e);
                }
            });
        }

        Ok(())
    }
}

/// Stream events to one client until either side closes
async fn handle_connection(stream: TcpStream, network: Arc<Network>) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Events published before this point are not delivered to this client
    let mut events = network.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = serde_json::to_string(&event)?;
                    ws_sender.send(Message::Text(text)).await?;
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("WebSocket client lagged {} events", n);
                }
                Err(RecvError::Closed) => break,
            },
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
        }
    }

    tracing::debug!("WebSocket client disconnected");
    Ok(())
}
