//! Core wire types for the Bankbox protocol.
//!
//! Every message is a tagged JSON object: `{"type": "<event>", "data": …}`.
//! The tag carries the event name (`join_game`, `game_updated`, …) and the
//! payload rides in `data`, mirroring how the mobile clients emit and
//! listen for named events. Field names on payloads are camelCase so the
//! JSON reads naturally on the client side.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier for a live connection, assigned by the server at accept time.
///
/// This is a routing hint, not a stable identity: a player keeps their seat
/// across reconnects by re-joining with the same display name, at which
/// point their `ConnectionId` is rebound. It appears on the wire as the
/// `id` field of a player snapshot and as the `targetId` of a peer-to-peer
/// transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A room's short join code: four characters from `A–Z0–9`, always stored
/// uppercase.
///
/// The code doubles as the room's broadcast-channel name. Client input is
/// normalized through [`RoomCode::new`], so `"ab3k"` and `"AB3K"` address
/// the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Builds a code from client input, trimming whitespace and folding to
    /// uppercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the canonical uppercase form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game settings
// ---------------------------------------------------------------------------

/// Per-room monetary settings, fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Cash every player starts with.
    pub initial_balance: i64,

    /// Salary credited by a "collect salary" transaction. The server always
    /// applies this figure, never a client-supplied amount.
    pub go_reward: i64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            initial_balance: 1500,
            go_reward: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// The four monetary operations a player can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Transfer cash from the sender to another player.
    P2p,
    /// Borrow from the bank: cash and debt both increase.
    BankLoan,
    /// Pay the bank: cash decreases, debt is reduced by at most the amount.
    BankPay,
    /// Collect salary: the room's `go_reward` is credited.
    BankGo,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::P2p => "P2P",
            Self::BankLoan => "BANK_LOAN",
            Self::BankPay => "BANK_PAY",
            Self::BankGo => "BANK_GO",
        };
        f.write_str(name)
    }
}

/// A transaction amount as it arrives on the wire.
///
/// Mobile form inputs send amounts as strings; programmatic clients send
/// JSON integers. Both are accepted and resolved through
/// [`Amount::as_positive`]. Fractional numbers decode (so the request can
/// be answered) but never validate — this game has no cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Amount {
    /// Returns the amount as a strictly positive integer, or `None` when it
    /// is non-numeric, fractional, zero, or negative.
    pub fn as_positive(&self) -> Option<i64> {
        let value = match self {
            Self::Int(n) => Some(*n),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse::<i64>().ok(),
        }?;
        (value > 0).then_some(value)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One player's public state inside a room snapshot.
///
/// `id` is the player's *current* connection — the value to use as
/// `targetId` when paying them. Transient engine state (the per-player
/// processing flag) is deliberately not part of this type: snapshots carry
/// only what clients may base decisions on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: ConnectionId,
    pub name: String,
    pub color: String,
    pub balance: i64,
    pub debt: i64,
    pub is_host: bool,
}

/// The full state of a room, pushed to every member after each change.
///
/// Always a complete snapshot, never a diff — rooms are bounded by the
/// seats at a physical table, so the simplicity is worth the bandwidth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub settings: GameSettings,
    pub players: Vec<PlayerSnapshot>,
    pub history: Vec<String>,
}

// ---------------------------------------------------------------------------
// Client → server messages
// ---------------------------------------------------------------------------

/// Payload of a `join_game` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    /// Display name; the stable identity key within a room.
    pub player_name: String,

    /// Whether to create a fresh room or join an existing one.
    pub action: JoinAction,

    /// Code of the room to join. Required for `JOIN`, ignored for `CREATE`.
    #[serde(default)]
    pub room_code: Option<String>,

    /// Display accent, cosmetic only.
    #[serde(default)]
    pub color: Option<String>,

    /// Room settings, honored only for `CREATE`; defaulted when absent.
    #[serde(default)]
    pub settings: Option<GameSettings>,
}

/// Discriminator for `join_game`: create a room or join by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinAction {
    Create,
    Join,
}

/// Payload of a `make_transaction` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Room the sender believes they are in.
    pub room_code: String,

    /// Receiving player's connection id; only meaningful for `P2P`.
    #[serde(default)]
    pub target_id: Option<ConnectionId>,

    /// Requested amount. Ignored (overridden server-side) for `BANK_GO`.
    pub amount: Amount,

    /// Which monetary operation to apply.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Payload of a `request_update` event: explicit resend by room code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub room_code: String,
}

/// Everything a client can send.
///
/// `#[serde(tag = "type", content = "data")]` produces adjacently tagged
/// JSON — `{"type": "join_game", "data": {…}}` — so the event name is
/// inspectable without touching the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a room or join (possibly rejoin) an existing one.
    JoinGame(JoinGameRequest),

    /// Apply a monetary transaction in the sender's room.
    MakeTransaction(TransactionRequest),

    /// Ask for a resend of a specific room's snapshot.
    RequestUpdate(UpdateRequest),

    /// Ask for a resend of whichever room this connection is bound to.
    /// Carries no payload; the server infers the room from the connection.
    RequestUpdateBySocket,
}

// ---------------------------------------------------------------------------
// Server → client messages
// ---------------------------------------------------------------------------

/// Everything the server can send.
///
/// `JoinSuccess` and `TransactionSuccess` are unicast acknowledgments to
/// the requester, distinct from the `GameUpdated` broadcast, so a client
/// can leave its "waiting" state even if the broadcast is delayed.
/// `ErrorMessage` is only ever unicast — failures are never broadcast to
/// the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Admission acknowledgment carrying the room the caller just entered.
    JoinSuccess(RoomSnapshot),

    /// The requester's transaction was applied.
    TransactionSuccess,

    /// Human-readable failure report for a single request.
    ErrorMessage(String),

    /// Full room snapshot, multicast to every member after a state change.
    GameUpdated(RoomSnapshot),
}

// =========================================================================
// Tests
// =========================================================================
