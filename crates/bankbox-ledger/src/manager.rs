//! Room manager: creates rooms, admits players, and routes transactions.

use bankbox_protocol::{
    ConnectionId, GameSettings, RoomCode, TransactionRequest,
};

use crate::codes::{MAX_CODE_ATTEMPTS, random_code};
use crate::{LedgerError, Player, Room, RoomStore, engine};

/// The entry point for room operations from the server layer.
///
/// Owns the [`RoomStore`] it is constructed with — inject a fresh one per
/// test, or the process-lifetime one in production. Not thread-safe by
/// itself; the server keeps it behind a single lock, which is also what
/// gives every operation run-to-completion semantics.
pub struct RoomManager {
    store: RoomStore,
}

impl RoomManager {
    /// Creates a manager over the given store.
    pub fn new(store: RoomStore) -> Self {
        Self { store }
    }

    /// Creates a room with `creator` seated as its host.
    ///
    /// The generated code is checked against the full store and rerolled
    /// on collision, up to a bounded number of attempts.
    ///
    /// # Errors
    /// Returns [`LedgerError::CodeGenerationFailed`] when the retry budget
    /// is exhausted — a server-side fault, logged at error level.
    pub fn create_room(
        &mut self,
        creator: ConnectionId,
        name: &str,
        color: Option<&str>,
        settings: Option<GameSettings>,
    ) -> Result<&Room, LedgerError> {
        let code = self.allocate_code()?;
        let settings = settings.unwrap_or_default();

        let host = Player::new(
            creator,
            name,
            color.unwrap_or(HOST_DEFAULT_COLOR),
            settings.initial_balance,
            true,
        );
        let mut room = Room::new(code.clone(), settings, host);
        room.push_history(format!("Room {code} created by {name}"));
        self.store.insert(room);

        tracing::info!(%code, player = name, %creator, "room created");
        Ok(self.store.get(&code).expect("just inserted"))
    }

    /// Admits `name` into the room addressed by `code`.
    ///
    /// A name already present in the room is a reconnect: the player's
    /// connection is rebound (and color refreshed when supplied) with
    /// balance and debt untouched. An unknown name is seated fresh at the
    /// room's initial balance. The returned room is the caller's admission
    /// acknowledgment, distinct from any broadcast.
    ///
    /// # Errors
    /// Returns [`LedgerError::RoomNotFound`] when no room exists under the
    /// (normalized) code.
    pub fn join_room(
        &mut self,
        connection: ConnectionId,
        code: &str,
        name: &str,
        color: Option<&str>,
    ) -> Result<&Room, LedgerError> {
        let code = RoomCode::new(code);
        let room = self
            .store
            .get_mut(&code)
            .ok_or_else(|| LedgerError::RoomNotFound(code.clone()))?;

        let rejoined = room.seat_player(connection, name, color);
        if rejoined {
            tracing::info!(%code, player = name, %connection, "player reconnected");
        } else {
            tracing::info!(%code, player = name, %connection, "player joined");
        }

        Ok(&*room)
    }

    /// Validates and applies a transaction from `sender`, returning the
    /// updated room for snapshotting.
    ///
    /// # Errors
    /// [`LedgerError::RoomNotFound`] for an unknown code; otherwise
    /// whatever the [`engine`](crate::engine) rejects the request with.
    pub fn apply_transaction(
        &mut self,
        sender: ConnectionId,
        request: &TransactionRequest,
    ) -> Result<&Room, LedgerError> {
        let code = RoomCode::new(&request.room_code);
        let room = self
            .store
            .get_mut(&code)
            .ok_or_else(|| LedgerError::RoomNotFound(code.clone()))?;

        engine::apply(room, sender, request)?;
        Ok(&*room)
    }

    /// Looks up a room by (normalized) code.
    pub fn room_by_code(&self, code: &str) -> Option<&Room> {
        self.store.get(&RoomCode::new(code))
    }

    /// Resolves which room a connection currently belongs to, if any.
    ///
    /// Best-effort resync support: scans rooms for a player bound to
    /// `connection`.
    pub fn room_for_connection(
        &self,
        connection: ConnectionId,
    ) -> Option<&Room> {
        self.store.room_for_connection(connection)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.store.len()
    }

    fn allocate_code(&self) -> Result<RoomCode, LedgerError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_code();
            if !self.store.contains(&code) {
                return Ok(code);
            }
            tracing::warn!(%code, "room code collision, rerolling");
        }
        tracing::error!(
            attempts = MAX_CODE_ATTEMPTS,
            "room code generation exhausted its retry budget"
        );
        Err(LedgerError::CodeGenerationFailed)
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomStore::new())
    }
}

/// Accent for a creator who did not pick one.
const HOST_DEFAULT_COLOR: &str = "#e74c3c";

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bankbox_protocol::{Amount, TransactionKind};

    fn conn(id: u64) -> ConnectionId {
        ConnectionId(id)
    }

    fn manager() -> RoomManager {
        RoomManager::new(RoomStore::new())
    }

    // =====================================================================
    // create_room()
    // =====================================================================

    #[test]
    fn test_create_room_seats_host_with_initial_balance() {
        let mut mgr = manager();

        let room = mgr
            .create_room(conn(1), "Ana", Some("#e74c3c"), None)
            .unwrap();

        assert_eq!(room.players().len(), 1);
        let ana = &room.players()[0];
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.balance, 1500);
        assert_eq!(ana.debt, 0);
        assert!(ana.is_host);
    }

    #[test]
    fn test_create_room_honors_custom_settings() {
        let mut mgr = manager();
        let settings = GameSettings {
            initial_balance: 3000,
            go_reward: 400,
        };

        let room = mgr
            .create_room(conn(1), "Ana", None, Some(settings))
            .unwrap();

        assert_eq!(room.players()[0].balance, 3000);
        assert_eq!(room.settings().go_reward, 400);
    }

    #[test]
    fn test_create_room_appends_creation_history_entry() {
        let mut mgr = manager();

        let room = mgr.create_room(conn(1), "Ana", None, None).unwrap();

        let entry = room.history().next().unwrap();
        assert!(entry.contains("created by Ana"), "got: {entry}");
        assert!(entry.contains(room.code().as_str()));
    }

    #[test]
    fn test_create_room_codes_are_unique() {
        let mut mgr = manager();
        let mut codes = std::collections::HashSet::new();

        for i in 0..50 {
            let room = mgr
                .create_room(conn(i), "Ana", None, None)
                .unwrap();
            assert!(
                codes.insert(room.code().clone()),
                "duplicate code {}",
                room.code()
            );
        }
        assert_eq!(mgr.room_count(), 50);
    }

    // =====================================================================
    // join_room()
    // =====================================================================

    #[test]
    fn test_join_room_unknown_code_returns_not_found() {
        let mut mgr = manager();

        let result = mgr.join_room(conn(2), "ZZZZ", "Bob", None);

        assert!(matches!(result, Err(LedgerError::RoomNotFound(_))));
    }

    #[test]
    fn test_join_room_code_lookup_is_case_insensitive() {
        let mut mgr = manager();
        let code = mgr
            .create_room(conn(1), "Ana", None, None)
            .unwrap()
            .code()
            .clone();

        let lowered = code.as_str().to_ascii_lowercase();
        let room = mgr.join_room(conn(2), &lowered, "Bob", None).unwrap();

        assert_eq!(room.players().len(), 2);
    }

    #[test]
    fn test_join_room_new_player_starts_at_room_settings() {
        let mut mgr = manager();
        let settings = GameSettings {
            initial_balance: 2500,
            go_reward: 100,
        };
        let code = mgr
            .create_room(conn(1), "Ana", None, Some(settings))
            .unwrap()
            .code()
            .clone();

        let room = mgr
            .join_room(conn(2), code.as_str(), "Bob", None)
            .unwrap();

        let bob = room.player_by_name("Bob").unwrap();
        assert_eq!(bob.balance, 2500);
        assert_eq!(bob.debt, 0);
        assert!(!bob.is_host);
    }

    #[test]
    fn test_join_room_same_name_rebinds_instead_of_duplicating() {
        let mut mgr = manager();
        let code = mgr
            .create_room(conn(1), "Ana", None, None)
            .unwrap()
            .code()
            .clone();
        mgr.join_room(conn(2), code.as_str(), "Bob", None).unwrap();

        let room =
            mgr.join_room(conn(7), code.as_str(), "Bob", None).unwrap();

        assert_eq!(room.players().len(), 2);
        assert_eq!(
            room.player_by_name("Bob").unwrap().connection,
            conn(7)
        );
    }

    #[test]
    fn test_join_room_host_can_reconnect_too() {
        let mut mgr = manager();
        let code = mgr
            .create_room(conn(1), "Ana", None, None)
            .unwrap()
            .code()
            .clone();

        let room =
            mgr.join_room(conn(5), code.as_str(), "Ana", None).unwrap();

        let ana = room.player_by_name("Ana").unwrap();
        assert_eq!(ana.connection, conn(5));
        assert!(ana.is_host, "host flag survives reconnect");
    }

    // =====================================================================
    // apply_transaction()
    // =====================================================================

    #[test]
    fn test_apply_transaction_unknown_room_returns_not_found() {
        let mut mgr = manager();
        let req = TransactionRequest {
            room_code: "ZZZZ".into(),
            target_id: None,
            amount: Amount::Int(100),
            kind: TransactionKind::BankLoan,
        };

        let result = mgr.apply_transaction(conn(1), &req);

        assert!(matches!(result, Err(LedgerError::RoomNotFound(_))));
    }

    #[test]
    fn test_apply_transaction_normalizes_room_code() {
        let mut mgr = manager();
        let code = mgr
            .create_room(conn(1), "Ana", None, None)
            .unwrap()
            .code()
            .clone();
        let req = TransactionRequest {
            room_code: code.as_str().to_ascii_lowercase(),
            target_id: None,
            amount: Amount::Int(100),
            kind: TransactionKind::BankLoan,
        };

        let room = mgr.apply_transaction(conn(1), &req).unwrap();

        assert_eq!(room.player_by_name("Ana").unwrap().balance, 1600);
    }

    // =====================================================================
    // Lookups
    // =====================================================================

    #[test]
    fn test_room_for_connection_follows_reconnect() {
        let mut mgr = manager();
        let code = mgr
            .create_room(conn(1), "Ana", None, None)
            .unwrap()
            .code()
            .clone();

        assert!(mgr.room_for_connection(conn(1)).is_some());

        // Ana reconnects on a different connection.
        mgr.join_room(conn(9), code.as_str(), "Ana", None).unwrap();

        assert!(mgr.room_for_connection(conn(1)).is_none());
        let found = mgr.room_for_connection(conn(9)).unwrap();
        assert_eq!(found.code(), &code);
    }

    #[test]
    fn test_room_by_code_normalizes_input() {
        let mut mgr = manager();
        let code = mgr
            .create_room(conn(1), "Ana", None, None)
            .unwrap()
            .code()
            .clone();

        let lowered = code.as_str().to_ascii_lowercase();
        assert!(mgr.room_by_code(&lowered).is_some());
        assert!(mgr.room_by_code("QQQQ").is_none());
    }
}
