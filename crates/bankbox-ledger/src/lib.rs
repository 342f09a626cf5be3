//! The Bankbox ledger: rooms, players, and the transaction engine.
//!
//! This crate is the authoritative core of the system. It owns every
//! invariant worth having:
//!
//! - money is conserved between players (only bank operations mint or
//!   absorb cash),
//! - debt never goes negative,
//! - a player's requests are applied one at a time ([`ProcessingState`]),
//! - history is bounded with FIFO eviction.
//!
//! Everything here is synchronous and self-contained — no sockets, no
//! tasks. The server layer drives it from behind a lock and handles
//! delivery of the snapshots it produces.
//!
//! # Key types
//!
//! - [`RoomManager`] — creates rooms, admits players, applies transactions
//! - [`RoomStore`] — owned, injectable repository of all live rooms
//! - [`Room`] / [`Player`] — the data model
//! - [`engine`] — validate-then-mutate transaction processing
//! - [`LedgerError`] — everything that can go wrong, one variant each

mod codes;
mod error;
pub mod engine;
mod manager;
mod player;
mod room;
mod store;

pub use error::LedgerError;
pub use manager::RoomManager;
pub use player::{Player, ProcessingState};
pub use room::{HISTORY_CAP, Room};
pub use store::RoomStore;
