//! JSON-RPC 2.0 wire protocol.
//!
//! - [`types`] - payload types (Position, Range, Diagnostic, TextEdit, params)
//! - [`envelope`] - message envelopes, method names, and inbound decoding

pub mod envelope;
pub mod types;
