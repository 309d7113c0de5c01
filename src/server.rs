//! WebSocket listener.
//!
//! Accepts TCP connections, performs the WebSocket handshake, and spawns one
//! session task per client. All sessions share one [`ServerState`]: the
//! process-wide document store and the analyzer.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing::{error, info, warn};

use crate::analyzer::Analyzer;
use crate::document::DocumentStore;
use crate::session::Session;

/// State shared by every session.
pub struct ServerState {
    pub documents: DocumentStore,
    pub analyzer: Arc<dyn Analyzer>,
}

impl ServerState {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            documents: DocumentStore::new(),
            analyzer,
        }
    }
}

/// The listening server.
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl Server {
    /// Bind the listener. Pass port 0 to let the OS pick one (used by the
    /// integration tests).
    pub async fn bind(addr: &str, analyzer: Arc<dyn Analyzer>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: Arc::new(ServerState::new(analyzer)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Handshake failures and accept errors are
    /// logged and never stop the loop.
    pub async fn run(self) -> std::io::Result<()> {
        info!("listening on {}", self.local_addr()?);
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("accept failed: {e}");
                    continue;
                }
            };
            let state = self.state.clone();
            tokio::spawn(async move {
                match accept_async(stream).await {
                    Ok(websocket) => Session::run(websocket, state).await,
                    Err(e) => warn!("websocket handshake with {peer} failed: {e}"),
                }
            });
        }
    }
}
