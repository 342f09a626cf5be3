//! The room store: an owned, injectable repository of live rooms.
//!
//! Deliberately not a process global — the store is a plain value that the
//! [`RoomManager`](crate::RoomManager) is constructed with, so tests get
//! isolated stores and a persistence-backed implementation could slot in
//! behind the same surface later.

use std::collections::HashMap;

use bankbox_protocol::{ConnectionId, RoomCode};

use crate::Room;

/// All live rooms, keyed by their unique code.
///
/// Sole owner of every [`Room`]; created empty at process start and, with
/// no expiry in scope, only ever grows for the process lifetime.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a room by code.
    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Looks up a room by code, mutably.
    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Returns `true` if a room exists under `code`.
    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Registers a room under its own code.
    pub fn insert(&mut self, room: Room) {
        self.rooms.insert(room.code().clone(), room);
    }

    /// Removes and returns a room.
    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    /// Finds the room (if any) with a player bound to `connection`.
    ///
    /// Linear scan over all rooms — this backs the best-effort resync
    /// path, not the hot transaction path.
    pub fn room_for_connection(
        &self,
        connection: ConnectionId,
    ) -> Option<&Room> {
        self.rooms.values().find(|room| room.is_member(connection))
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` when no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterates over all rooms in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}
