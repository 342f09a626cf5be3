//! The connection registry: who can be reached, and how.
//!
//! Each live connection owns an unbounded outbound channel; a writer task
//! per connection drains it into the socket. The registry maps connection
//! ids to those channels so that any handler can deliver to any
//! connection — which is all a "room channel" is here: the set of
//! connections currently bound to a room's players.

use std::collections::HashMap;

use bankbox_protocol::{ConnectionId, ServerMessage};
use tokio::sync::mpsc;

/// Sending half of a connection's outbound queue.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Maps live connections to their outbound channels.
///
/// Knows nothing about rooms or players — the ledger decides *who* gets a
/// message, the registry only handles *delivery*. Sends to vanished
/// connections are dropped silently: the player record survives the
/// disconnect and the client will resync after it rejoins.
#[derive(Default)]
pub struct ConnectionRegistry {
    senders: HashMap<ConnectionId, OutboundSender>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound channel.
    pub fn register(&mut self, id: ConnectionId, sender: OutboundSender) {
        self.senders.insert(id, sender);
    }

    /// Removes a connection. Its writer task winds down once the last
    /// sender is dropped.
    pub fn unregister(&mut self, id: ConnectionId) {
        self.senders.remove(&id);
    }

    /// Delivers a message to a single connection, dropping it silently if
    /// the connection is gone.
    pub fn unicast(&self, id: ConnectionId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&id) {
            let _ = sender.send(msg);
        }
    }

    /// Delivers a message to every listed connection.
    pub fn broadcast(
        &self,
        recipients: &[ConnectionId],
        msg: &ServerMessage,
    ) {
        for id in recipients {
            self.unicast(*id, msg.clone());
        }
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Returns `true` when no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
