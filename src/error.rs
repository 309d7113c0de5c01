//! Error taxonomy for the server core.
//!
//! Every error here is recoverable: protocol failures become response errors
//! (or are dropped when the inbound message carried no id), document and
//! analyzer failures are logged at the dispatch boundary. Nothing in this
//! module terminates a session or the process.

use thiserror::Error;

use crate::protocol::envelope::error_codes;

/// Failures in the JSON-RPC layer: malformed envelopes, unknown methods,
/// out-of-state requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request envelope")]
    InvalidRequest,

    #[error("invalid params for {method}: {detail}")]
    InvalidParams { method: String, detail: String },

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("server not initialized")]
    NotInitialized,

    #[error("initialize received more than once")]
    AlreadyInitialized,
}

impl ProtocolError {
    /// The JSON-RPC error code reported to the client.
    pub fn code(&self) -> i32 {
        match self {
            ProtocolError::Parse(_) => error_codes::PARSE_ERROR,
            ProtocolError::InvalidRequest => error_codes::INVALID_REQUEST,
            ProtocolError::InvalidParams { .. } => error_codes::INVALID_PARAMS,
            ProtocolError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            ProtocolError::NotInitialized => error_codes::SERVER_NOT_INITIALIZED,
            ProtocolError::AlreadyInitialized => error_codes::ALREADY_INITIALIZED,
        }
    }
}

/// Failures when operating on the shared document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("unknown document: {0}")]
    Unknown(String),

    #[error("document uri must not be empty")]
    EmptyUri,
}

/// Failures raised by a pluggable analyzer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("analysis failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_codes() {
        assert_eq!(ProtocolError::Parse("bad".into()).code(), -32700);
        assert_eq!(ProtocolError::InvalidRequest.code(), -32600);
        assert_eq!(
            ProtocolError::InvalidParams {
                method: "textDocument/didChange".into(),
                detail: "missing field".into(),
            }
            .code(),
            -32602
        );
        assert_eq!(ProtocolError::MethodNotFound("foo".into()).code(), -32601);
        assert_eq!(ProtocolError::NotInitialized.code(), -32002);
        assert_eq!(ProtocolError::AlreadyInitialized.code(), -32003);
    }

    #[test]
    fn document_error_display() {
        let err = DocumentError::Unknown("inmemory://document.txt".into());
        assert_eq!(err.to_string(), "unknown document: inmemory://document.txt");
    }
}
