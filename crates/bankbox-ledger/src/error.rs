//! Error types for the ledger layer.

use bankbox_protocol::{ConnectionId, RoomCode};

/// Errors that can occur while managing rooms or applying transactions.
///
/// Every variant is terminal for the single request that caused it: the
/// ledger is never left half-mutated, and the message is surfaced to the
/// originating connection only. The `Display` strings double as the
/// user-facing `error_message` payloads, so they are written for players,
/// not for logs.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No room exists under the given code.
    #[error("room {0} does not exist")]
    RoomNotFound(RoomCode),

    /// The requesting connection is not bound to any player in the room
    /// (stale connection, or the client skipped `join_game`).
    #[error("you are not seated in this room")]
    SenderNotFound(ConnectionId),

    /// The transfer target is missing or unknown in the room.
    #[error("receiver not found")]
    ReceiverNotFound,

    /// The amount is non-numeric, zero, or negative.
    #[error("amount must be a positive whole number")]
    InvalidAmount,

    /// The sender's balance does not cover the requested amount.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The sender already has a transaction in flight; this one was
    /// rejected without touching the ledger.
    #[error("still processing your previous transaction")]
    Busy,

    /// Code generation exhausted its retry budget. The only server-side
    /// fault in the taxonomy — logged at error level by the manager.
    #[error("could not allocate a room code, please try again")]
    CodeGenerationFailed,
}
