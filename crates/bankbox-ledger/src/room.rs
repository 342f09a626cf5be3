//! Room state: one game session and its player ledger.

use std::collections::VecDeque;

use bankbox_protocol::{ConnectionId, GameSettings, RoomCode, RoomSnapshot};

use crate::Player;

/// Maximum retained history entries; the oldest are evicted FIFO.
pub const HISTORY_CAP: usize = 50;

/// One game session: a code, its settings, the seated players, and a
/// bounded event history.
///
/// Players are kept in seating order (a `Vec`, not a map) — the order is
/// what clients display, and a table never holds more than a handful of
/// seats, so linear lookups are fine. Players are never removed while the
/// room exists; a vanished connection just leaves a stale `connection`
/// field until the owner rejoins.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    settings: GameSettings,
    players: Vec<Player>,
    history: VecDeque<String>,
}

impl Room {
    /// Creates a room with its host already seated.
    pub(crate) fn new(
        code: RoomCode,
        settings: GameSettings,
        host: Player,
    ) -> Self {
        Self {
            code,
            settings,
            players: vec![host],
            history: VecDeque::new(),
        }
    }

    /// The room's join code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// The monetary settings fixed at creation.
    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    /// All players in seating order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// History entries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Looks up a player by display name (the stable identity).
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Looks up a player by their currently-bound connection.
    pub fn player_by_connection(
        &self,
        connection: ConnectionId,
    ) -> Option<&Player> {
        self.players.iter().find(|p| p.connection == connection)
    }

    /// Returns `true` if any player is currently bound to `connection`.
    pub fn is_member(&self, connection: ConnectionId) -> bool {
        self.player_by_connection(connection).is_some()
    }

    /// The connections currently bound to this room's players — the
    /// broadcast recipients for a `game_updated` push.
    pub fn member_connections(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection).collect()
    }

    pub(crate) fn player_index_by_connection(
        &self,
        connection: ConnectionId,
    ) -> Option<usize> {
        self.players.iter().position(|p| p.connection == connection)
    }

    /// Seats a player under `name`, returning `true` when this was a
    /// reconnect.
    ///
    /// A known name reclaims its seat: the connection is rebound (and the
    /// color refreshed when one is supplied) while balance and debt stay
    /// untouched. An unknown name gets a fresh seat at the room's initial
    /// balance. This name-only rejoin is the sole reconnection mechanism —
    /// deliberately weak identity, not a security boundary.
    pub(crate) fn seat_player(
        &mut self,
        connection: ConnectionId,
        name: &str,
        color: Option<&str>,
    ) -> bool {
        if let Some(player) =
            self.players.iter_mut().find(|p| p.name == name)
        {
            player.connection = connection;
            if let Some(color) = color {
                player.color = color.to_string();
            }
            return true;
        }

        self.players.push(Player::new(
            connection,
            name,
            color.unwrap_or(DEFAULT_COLOR),
            self.settings.initial_balance,
            false,
        ));
        false
    }

    /// Appends a history entry, evicting the oldest past [`HISTORY_CAP`].
    pub(crate) fn push_history(&mut self, entry: String) {
        self.history.push_back(entry);
        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Builds the externalized full-state snapshot.
    ///
    /// Pure read: calling it twice without an intervening mutation yields
    /// identical output.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            settings: self.settings,
            players: self.players.iter().map(Player::snapshot).collect(),
            history: self.history.iter().cloned().collect(),
        }
    }
}

/// Accent assigned when a joining client does not pick one.
const DEFAULT_COLOR: &str = "#9b9b9b";
