//! JSON-RPC 2.0 envelope handling.
//!
//! Inbound frames are decoded into a tagged [`Inbound`] value: each known
//! method maps to one variant carrying its own typed params, and unknown
//! methods land in explicit `Unknown` variants so the dispatcher handles them
//! exhaustively. Outbound traffic is responses and notifications only; this
//! server never initiates a request toward the client.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::types::{DidChangeParams, DidOpenParams, InitializeParams};

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes, plus the application codes this server
/// reports.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Generic application failure; the message carries the underlying error.
    pub const SERVER_ERROR: i32 = -32000;
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    pub const ALREADY_INITIALIZED: i32 = -32003;
}

/// Method names consumed and produced by the server.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "initialized";
    pub const SHUTDOWN: &str = "shutdown";
    pub const DID_OPEN: &str = "textDocument/didOpen";
    pub const DID_CHANGE: &str = "textDocument/didChange";
    pub const PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";
    pub const APPLY_EDIT: &str = "textDocument/applyEdit";
}

/// A decoded inbound message.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Carried an id; exactly one response must be produced.
    Request { id: Value, request: ClientRequest },
    /// No id; no response channel exists.
    Notification(ClientNotification),
}

/// Requests the server understands.
#[derive(Debug, Clone)]
pub enum ClientRequest {
    Initialize(InitializeParams),
    Shutdown,
    Unknown { method: String },
}

/// Notifications the server understands.
#[derive(Debug, Clone)]
pub enum ClientNotification {
    Initialized,
    DidOpen(DidOpenParams),
    DidChange(DidChangeParams),
    Unknown { method: String },
}

/// A frame that could not be decoded. `id` is whatever was recoverable from
/// the raw payload; when present, the session can still answer with a
/// response error instead of dropping the frame silently.
#[derive(Debug)]
pub struct DecodeFailure {
    pub id: Option<Value>,
    pub error: ProtocolError,
}

/// Decode one text frame into a typed inbound message.
pub fn decode(raw: &str) -> Result<Inbound, DecodeFailure> {
    let value: Value = serde_json::from_str(raw).map_err(|e| DecodeFailure {
        id: None,
        error: ProtocolError::Parse(e.to_string()),
    })?;

    let id = value.get("id").cloned().filter(|id| !id.is_null());

    let Some(object) = value.as_object() else {
        return Err(DecodeFailure {
            id: None,
            error: ProtocolError::InvalidRequest,
        });
    };

    let Some(method) = object.get("method").and_then(Value::as_str) else {
        return Err(DecodeFailure {
            id,
            error: ProtocolError::InvalidRequest,
        });
    };

    let params = object.get("params").cloned();

    match id {
        Some(id) => {
            let request = ClientRequest::from_parts(method, params)
                .map_err(|error| DecodeFailure { id: Some(id.clone()), error })?;
            Ok(Inbound::Request { id, request })
        }
        None => {
            let notification = ClientNotification::from_parts(method, params)
                .map_err(|error| DecodeFailure { id: None, error })?;
            Ok(Inbound::Notification(notification))
        }
    }
}

impl ClientRequest {
    fn from_parts(method: &str, params: Option<Value>) -> Result<Self, ProtocolError> {
        match method {
            methods::INITIALIZE => Ok(Self::Initialize(decode_params(method, params)?)),
            methods::SHUTDOWN => Ok(Self::Shutdown),
            other => Ok(Self::Unknown {
                method: other.to_string(),
            }),
        }
    }
}

impl ClientNotification {
    fn from_parts(method: &str, params: Option<Value>) -> Result<Self, ProtocolError> {
        match method {
            methods::INITIALIZED => Ok(Self::Initialized),
            methods::DID_OPEN => Ok(Self::DidOpen(decode_params(method, params)?)),
            methods::DID_CHANGE => Ok(Self::DidChange(decode_params(method, params)?)),
            other => Ok(Self::Unknown {
                method: other.to_string(),
            }),
        }
    }
}

fn decode_params<T: DeserializeOwned>(
    method: &str,
    params: Option<Value>,
) -> Result<T, ProtocolError> {
    let value = match params {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidParams {
        method: method.to_string(),
        detail: e.to_string(),
    })
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

/// JSON-RPC error object for outgoing responses.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
}

impl Response {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outgoing JSON-RPC notification (no id, no response expected).
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_initialize_request() {
        let inbound =
            decode(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"capabilities":{}}}"#)
                .unwrap();
        match inbound {
            Inbound::Request { id, request } => {
                assert_eq!(id, json!(1));
                assert!(matches!(request, ClientRequest::Initialize(_)));
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn decode_initialize_without_params() {
        let inbound = decode(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#).unwrap();
        assert!(matches!(
            inbound,
            Inbound::Request {
                request: ClientRequest::Initialize(_),
                ..
            }
        ));
    }

    #[test]
    fn decode_did_change_notification() {
        let inbound = decode(
            r#"{"jsonrpc":"2.0","method":"textDocument/didChange","params":{"textDocument":{"uri":"inmemory://document.txt","version":2},"contentChanges":[{"text":"hello"}]}}"#,
        )
        .unwrap();
        match inbound {
            Inbound::Notification(ClientNotification::DidChange(params)) => {
                assert_eq!(params.text_document.uri, "inmemory://document.txt");
                assert_eq!(params.content_changes[0].text, "hello");
            }
            other => panic!("expected didChange, got {other:?}"),
        }
    }

    #[test]
    fn decode_unknown_method() {
        let inbound = decode(r#"{"jsonrpc":"2.0","id":7,"method":"foo"}"#).unwrap();
        match inbound {
            Inbound::Request {
                request: ClientRequest::Unknown { method },
                ..
            } => assert_eq!(method, "foo"),
            other => panic!("expected unknown request, got {other:?}"),
        }

        let inbound = decode(r#"{"jsonrpc":"2.0","method":"bar"}"#).unwrap();
        assert!(matches!(
            inbound,
            Inbound::Notification(ClientNotification::Unknown { .. })
        ));
    }

    #[test]
    fn decode_rejects_non_json_without_id() {
        let failure = decode("this is not json").unwrap_err();
        assert!(failure.id.is_none());
        assert_eq!(failure.error.code(), error_codes::PARSE_ERROR);
    }

    #[test]
    fn decode_recovers_id_from_invalid_envelope() {
        let failure = decode(r#"{"jsonrpc":"2.0","id":9,"method":123}"#).unwrap_err();
        assert_eq!(failure.id, Some(json!(9)));
        assert_eq!(failure.error.code(), error_codes::INVALID_REQUEST);
    }

    #[test]
    fn decode_rejects_bad_params_keeping_id() {
        let failure = decode(
            r#"{"jsonrpc":"2.0","id":3,"method":"initialize","params":"not an object"}"#,
        )
        .unwrap_err();
        assert_eq!(failure.id, Some(json!(3)));
        assert_eq!(failure.error.code(), error_codes::INVALID_PARAMS);
    }

    #[test]
    fn null_id_is_a_notification() {
        let inbound = decode(r#"{"jsonrpc":"2.0","id":null,"method":"initialized"}"#).unwrap();
        assert!(matches!(
            inbound,
            Inbound::Notification(ClientNotification::Initialized)
        ));
    }

    #[test]
    fn response_encode_shapes() {
        let ok = Response::success(json!(1), json!({"data": "test"}))
            .encode()
            .unwrap();
        assert!(ok.contains(r#""jsonrpc":"2.0""#));
        assert!(ok.contains(r#""result""#));
        assert!(!ok.contains(r#""error""#));

        let err = Response::error(json!(7), error_codes::METHOD_NOT_FOUND, "method not found: foo")
            .encode()
            .unwrap();
        assert!(err.contains(r#""code":-32601"#));
        assert!(!err.contains(r#""result""#));
    }

    #[test]
    fn notification_encode_has_no_id() {
        let encoded = Notification::new(methods::PUBLISH_DIAGNOSTICS, json!({"diagnostics": []}))
            .encode()
            .unwrap();
        assert!(encoded.contains(r#""method":"textDocument/publishDiagnostics""#));
        assert!(!encoded.contains(r#""id""#));
    }
}
