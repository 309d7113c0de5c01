//! Protocol payload type definitions.
//!
//! Positions follow editor-widget conventions: zero-based lines, characters
//! counted in UTF-16 code units.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A position in a text document (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed).
    pub line: u32,
    /// Character offset in the line, in UTF-16 code units (0-indexed).
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A range in a text document; `start <= end` in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Start position (inclusive).
    pub start: Position,
    /// End position (exclusive).
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Diagnostic severities (integers on the wire, per LSP convention).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde_repr::Serialize_repr,
    serde_repr::Deserialize_repr,
)]
#[repr(u8)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

/// An advisory annotation over a range of a document. Never mutates the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub source: String,
}

/// A proposed replacement of `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Client identification sent with `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// `initialize` request params. Everything is optional; an empty object is a
/// valid handshake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

/// How the server expects document content to be synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSyncKind {
    /// Every change carries the whole document text.
    Full,
}

/// Capabilities advertised in the `initialize` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    pub document_sync: DocumentSyncKind,
    pub diagnostic_provider: bool,
    pub edit_provider: bool,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            document_sync: DocumentSyncKind::Full,
            diagnostic_provider: true,
            edit_provider: true,
        }
    }
}

/// `initialize` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Document reference carried by `textDocument/didChange`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    /// The client's own version counter; informational only, the server
    /// keeps its authoritative counter in the document store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

/// Document payload carried by `textDocument/didOpen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One element of `contentChanges`; always a whole-document replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChange {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenParams {
    pub text_document: TextDocumentItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidChangeParams {
    pub text_document: VersionedTextDocumentIdentifier,
    pub content_changes: Vec<ContentChange>,
}

/// `textDocument/publishDiagnostics` params. Sent after every accepted
/// change, including with an empty list so clients can clear stale markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Edits grouped per document URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceEdit {
    pub changes: HashMap<String, Vec<TextEdit>>,
}

/// `textDocument/applyEdit` params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyEditParams {
    pub edit: WorkspaceEdit,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn severity_serializes_as_integer() {
        let value = serde_json::to_value(DiagnosticSeverity::Information).unwrap();
        assert_eq!(value, json!(3));
    }

    #[test]
    fn text_edit_uses_camel_case() {
        let edit = TextEdit {
            range: Range::new(Position::new(0, 7), Position::new(0, 12)),
            new_text: "😊".to_string(),
        };
        let value = serde_json::to_value(&edit).unwrap();
        assert_eq!(
            value,
            json!({
                "range": {
                    "start": {"line": 0, "character": 7},
                    "end": {"line": 0, "character": 12},
                },
                "newText": "😊",
            })
        );
    }

    #[test]
    fn capabilities_advertise_full_document_sync() {
        let value = serde_json::to_value(ServerCapabilities::default()).unwrap();
        assert_eq!(value["documentSync"], json!("full"));
        assert_eq!(value["diagnosticProvider"], json!(true));
        assert_eq!(value["editProvider"], json!(true));
    }

    #[test]
    fn did_change_params_decode() {
        let params: DidChangeParams = serde_json::from_value(json!({
            "textDocument": {"uri": "inmemory://document.txt", "version": 4},
            "contentChanges": [{"text": "The sky is blue"}],
        }))
        .unwrap();
        assert_eq!(params.text_document.uri, "inmemory://document.txt");
        assert_eq!(params.text_document.version, Some(4));
        assert_eq!(params.content_changes.len(), 1);
        assert_eq!(params.content_changes[0].text, "The sky is blue");
    }

    #[test]
    fn initialize_params_tolerate_empty_object() {
        let params: InitializeParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.client_info.is_none());
    }
}
