//! Player state: the per-seat record inside a room.

use bankbox_protocol::{ConnectionId, PlayerSnapshot};

/// Whether a player currently has a transaction being applied.
///
/// An explicit two-state machine rather than a boolean so the "never
/// double-apply" guard is visible in the type. The transition is always
/// `Idle → Processing → Idle`; the engine releases the state
/// unconditionally on both success and failure, so `Processing` never
/// outlives a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingState {
    /// No transaction in flight; requests are accepted.
    #[default]
    Idle,

    /// A transaction from this player is being validated or applied;
    /// further requests are rejected as busy.
    Processing,
}

impl ProcessingState {
    /// Returns `true` while a transaction is in flight.
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// One seat at the table.
///
/// Identity is the `name` — unique per room, chosen at join time, and the
/// key a returning player presents to reclaim their seat. The
/// `connection` is merely where that player can be reached *right now*;
/// it is rebound on every reconnect.
#[derive(Debug, Clone)]
pub struct Player {
    /// Currently-bound connection; a routing hint, not an identity.
    pub connection: ConnectionId,

    /// Stable identity key within the room. Case-sensitive.
    pub name: String,

    /// Display accent. Cosmetic; no invariant.
    pub color: String,

    /// Liquid cash. None of the four operations can drive this negative.
    pub balance: i64,

    /// Amount owed to the bank. Invariant: never negative.
    pub debt: i64,

    /// `true` for exactly one player per room — the creator. Carried for
    /// display; the server grants it no extra authority.
    pub is_host: bool,

    /// Transaction guard. Internal only; never serialized.
    pub processing: ProcessingState,
}

impl Player {
    /// Creates a freshly seated player with no debt and an idle guard.
    pub fn new(
        connection: ConnectionId,
        name: impl Into<String>,
        color: impl Into<String>,
        balance: i64,
        is_host: bool,
    ) -> Self {
        Self {
            connection,
            name: name.into(),
            color: color.into(),
            balance,
            debt: 0,
            is_host,
            processing: ProcessingState::default(),
        }
    }

    /// The externalized view of this player. The processing guard is
    /// deliberately absent — snapshots carry only decision-grade state.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.connection,
            name: self.name.clone(),
            color: self.color.clone(),
            balance: self.balance,
            debt: self.debt,
            is_host: self.is_host,
        }
    }
}
