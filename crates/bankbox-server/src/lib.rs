//! The Bankbox server: WebSocket front door and broadcast glue.
//!
//! This crate wires the pieces together: an accept loop hands each
//! incoming WebSocket to a per-connection handler task, the handler
//! decodes [`ClientMessage`](bankbox_protocol::ClientMessage)s and drives
//! the ledger behind a lock, and the [`ConnectionRegistry`] fans the
//! resulting snapshots out to every member of the affected room.
//!
//! The ledger itself stays synchronous; everything async lives here.

mod error;
mod handler;
mod registry;
mod server;

pub use error::ServerError;
pub use registry::{ConnectionRegistry, OutboundSender};
pub use server::{BankboxServer, BankboxServerBuilder};
