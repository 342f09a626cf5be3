//! Error types for the server layer.

use bankbox_ledger::LedgerError;
use bankbox_protocol::ProtocolError;

/// Top-level server errors.
///
/// Ledger rejections never surface here — they become `error_message`
/// payloads for the requesting client. This enum is for the conditions
/// that end a connection or stop the server itself.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding the listen address failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The WebSocket upgrade handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),

    /// A protocol-level error (encode/decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A ledger-level error escaped the request path.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
