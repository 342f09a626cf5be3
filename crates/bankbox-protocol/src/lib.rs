//! Wire protocol for Bankbox.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RoomSnapshot`],
//!   identity newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits between the transport (raw WebSocket frames) and
//! the ledger (rooms and balances). It knows nothing about connections or
//! game rules — only how messages are shaped.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Amount, ClientMessage, ConnectionId, GameSettings, JoinAction,
    JoinGameRequest, PlayerSnapshot, RoomCode, RoomSnapshot, ServerMessage,
    TransactionKind, TransactionRequest, UpdateRequest,
};
