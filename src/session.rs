//! Per-connection protocol session.
//!
//! Each session wraps one full-duplex WebSocket and runs the protocol state
//! machine: `Unconnected -> Initializing -> Ready -> Closed`. Inbound frames
//! are decoded and dispatched here; outbound traffic is queued on a channel
//! drained by a dedicated writer task, so handlers never block on the
//! transport. A malformed frame never terminates the connection, and a
//! handler failure in one session never affects other sessions or the shared
//! document store.

use std::collections::HashMap;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{DocumentError, ProtocolError};
use crate::protocol::envelope::{
    self, error_codes, methods, ClientNotification, ClientRequest, Inbound, Notification, Response,
};
use crate::protocol::types::{
    ApplyEditParams, DidChangeParams, DidOpenParams, InitializeParams, InitializeResult,
    PublishDiagnosticsParams, ServerCapabilities, ServerInfo, WorkspaceEdit,
};
use crate::server::ServerState;

/// Protocol state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Initializing,
    Ready,
    Closed,
}

/// One connected client. Owns its channel and dispatch state; owns no
/// documents.
pub struct Session {
    id: Uuid,
    state: SessionState,
    outbound: mpsc::UnboundedSender<Message>,
    server: Arc<ServerState>,
}

impl Session {
    fn new(outbound: mpsc::UnboundedSender<Message>, server: Arc<ServerState>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Unconnected,
            outbound,
            server,
        }
    }

    /// Drive one accepted WebSocket until the client disconnects.
    pub async fn run(stream: WebSocketStream<TcpStream>, server: Arc<ServerState>) {
        let (mut write, mut read) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

        let writer = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    debug!("writer stopped: {e}");
                    break;
                }
            }
            let _ = write.close().await;
        });

        let mut session = Session::new(outbound_tx, server);
        session.state = SessionState::Initializing;
        let id = session.id;
        info!("session {id}: client connected");

        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => session.handle_frame(text.as_str()).await,
                Ok(Message::Binary(_)) => {
                    debug!("session {id}: ignoring binary frame");
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("session {id}: transport error: {e}");
                    break;
                }
            }
        }

        session.state = SessionState::Closed;
        drop(session);
        let _ = writer.await;
        info!("session {id}: client disconnected");
    }

    /// Decode and dispatch one text frame.
    async fn handle_frame(&mut self, raw: &str) {
        match envelope::decode(raw) {
            Ok(Inbound::Request { id, request }) => self.handle_request(id, request).await,
            Ok(Inbound::Notification(notification)) => {
                self.handle_notification(notification).await
            }
            Err(failure) => {
                warn!("session {}: undecodable frame: {}", self.id, failure.error);
                if let Some(id) = failure.id {
                    self.respond_error(id, &failure.error);
                }
            }
        }
    }

    async fn handle_request(&mut self, id: Value, request: ClientRequest) {
        match request {
            ClientRequest::Initialize(params) => self.handle_initialize(id, params),
            ClientRequest::Shutdown => {
                if self.state != SessionState::Ready {
                    self.respond_error(id, &ProtocolError::NotInitialized);
                    return;
                }
                info!("session {}: shutdown requested", self.id);
                self.respond_ok(id, Value::Null);
            }
            ClientRequest::Unknown { method } => {
                self.respond_error(id, &ProtocolError::MethodNotFound(method));
            }
        }
    }

    fn handle_initialize(&mut self, id: Value, params: InitializeParams) {
        if self.state == SessionState::Ready {
            warn!("session {}: duplicate initialize", self.id);
            self.respond_error(id, &ProtocolError::AlreadyInitialized);
            return;
        }
        if let Some(client) = &params.client_info {
            info!(
                "session {}: initialize from {} {}",
                self.id,
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }
        self.state = SessionState::Ready;
        self.respond_ok(
            id,
            InitializeResult {
                capabilities: ServerCapabilities::default(),
                server_info: Some(ServerInfo {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: Some(env!("CARGO_PKG_VERSION").to_string()),
                }),
            },
        );
    }

    async fn handle_notification(&mut self, notification: ClientNotification) {
        match notification {
            ClientNotification::Initialized => {
                debug!("session {}: client reports initialized", self.id);
            }
            ClientNotification::DidOpen(params) => {
                if self.state != SessionState::Ready {
                    warn!("session {}: didOpen before initialize, dropping", self.id);
                    return;
                }
                if let Err(e) = self.open_document(params).await {
                    warn!("session {}: didOpen failed: {e}", self.id);
                }
            }
            ClientNotification::DidChange(params) => {
                if self.state != SessionState::Ready {
                    warn!("session {}: didChange before initialize, dropping", self.id);
                    return;
                }
                if let Err(e) = self.apply_change(params).await {
                    warn!("session {}: didChange failed: {e}", self.id);
                }
            }
            ClientNotification::Unknown { method } => {
                debug!("session {}: ignoring unknown notification {method}", self.id);
            }
        }
    }

    /// `textDocument/didOpen`: register the document and, when the client
    /// supplied text, apply it as the first revision. Always re-publishes
    /// diagnostics so a freshly connected editor gets decorations for content
    /// that matched before any keystroke.
    async fn open_document(&self, params: DidOpenParams) -> Result<(), DocumentError> {
        let item = params.text_document;
        let document = self.server.documents.open(&item.uri).await?;
        let mut guard = document.lock().await;
        if let Some(text) = item.text {
            guard.apply_full_text(text);
        }
        info!(
            "session {}: opened {} at version {}",
            self.id, guard.uri, guard.version
        );
        self.publish_analysis(&guard.uri, &guard.text);
        Ok(())
    }

    /// `textDocument/didChange`: whole-document replacement. The document is
    /// opened on first sight (open is idempotent), then text replace, version
    /// increment, analysis, and outbound queueing all happen under the
    /// per-URI lock, so concurrent changes to the same URI from other
    /// sessions serialize cleanly. Queueing is non-blocking; the lock is
    /// never held across an await.
    async fn apply_change(&self, params: DidChangeParams) -> Result<(), DocumentError> {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.into_iter().next_back() else {
            warn!("session {}: didChange for {uri} without content", self.id);
            return Ok(());
        };

        let document = self.server.documents.open(&uri).await?;
        let mut guard = document.lock().await;
        guard.apply_full_text(change.text);
        debug!(
            "session {}: {uri} updated to version {}",
            self.id, guard.version
        );
        self.publish_analysis(&uri, &guard.text);
        Ok(())
    }

    /// Run the analyzer and queue the resulting notifications. Diagnostics
    /// are always published, even when empty, so the client can clear stale
    /// decorations; an applyEdit is queued only when there is something to
    /// apply. On analyzer failure the already-applied document update stands
    /// and both notifications are suppressed.
    fn publish_analysis(&self, uri: &str, text: &str) {
        let analysis = match self.server.analyzer.analyze(text) {
            Ok(analysis) => analysis,
            Err(e) => {
                error!("session {}: analyzer failed for {uri}: {e}", self.id);
                return;
            }
        };

        debug!(
            "session {}: {uri} -> {} diagnostics, {} edits",
            self.id,
            analysis.diagnostics.len(),
            analysis.edits.len()
        );

        self.notify(
            methods::PUBLISH_DIAGNOSTICS,
            PublishDiagnosticsParams {
                uri: uri.to_string(),
                diagnostics: analysis.diagnostics,
            },
        );

        if !analysis.edits.is_empty() {
            let mut changes = HashMap::new();
            changes.insert(uri.to_string(), analysis.edits);
            self.notify(
                methods::APPLY_EDIT,
                ApplyEditParams {
                    edit: WorkspaceEdit { changes },
                },
            );
        }
    }

    fn notify<P: Serialize>(&self, method: &str, params: P) {
        let params = match serde_json::to_value(params) {
            Ok(params) => params,
            Err(e) => {
                error!("session {}: failed to encode {method} params: {e}", self.id);
                return;
            }
        };
        match Notification::new(method, params).encode() {
            Ok(body) => {
                let _ = self.outbound.send(Message::text(body));
            }
            Err(e) => error!("session {}: failed to encode {method}: {e}", self.id),
        }
    }

    fn respond_ok<R: Serialize>(&self, id: Value, result: R) {
        match serde_json::to_value(result) {
            Ok(value) => self.send_response(Response::success(id, value)),
            Err(e) => {
                error!("session {}: failed to encode result: {e}", self.id);
                self.send_response(Response::error(
                    id,
                    error_codes::SERVER_ERROR,
                    e.to_string(),
                ));
            }
        }
    }

    fn respond_error(&self, id: Value, error: &ProtocolError) {
        self.send_response(Response::error(id, error.code(), error.to_string()));
    }

    fn send_response(&self, response: Response) {
        match response.encode() {
            Ok(body) => {
                let _ = self.outbound.send(Message::text(body));
            }
            Err(e) => error!("session {}: failed to encode response: {e}", self.id),
        }
    }
}
