//! `BankboxServer` builder and accept loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bankbox_ledger::{RoomManager, RoomStore};
use bankbox_protocol::{ConnectionId, JsonCodec};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::ConnectionRegistry;
use crate::ServerError;
use crate::handler::handle_connection;

/// Counter for assigning connection ids at accept time.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared server state, cloned into each connection-handler task.
///
/// Both maps live behind tokio mutexes; handlers never hold a lock across
/// socket I/O, and every ledger operation runs to completion inside one
/// acquisition — which is what makes validate-then-mutate atomic without
/// any locking inside the ledger itself. Lock order is always rooms
/// before registry.
pub(crate) struct ServerState {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) registry: Mutex<ConnectionRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Bankbox server.
///
/// # Example
///
/// ```rust,no_run
/// use bankbox_server::BankboxServerBuilder;
///
/// # async fn run() -> Result<(), bankbox_server::ServerError> {
/// let server = BankboxServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BankboxServerBuilder {
    bind_addr: String,
}

impl BankboxServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and assembles the server state.
    pub async fn build(self) -> Result<BankboxServer, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(ServerError::Bind)?;
        tracing::info!(addr = %self.bind_addr, "listening for connections");

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(RoomStore::new())),
            registry: Mutex::new(ConnectionRegistry::new()),
            codec: JsonCodec,
        });

        Ok(BankboxServer { listener, state })
    }
}

impl Default for BankboxServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Bankbox server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BankboxServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl BankboxServer {
    /// Creates a new builder.
    pub fn builder() -> BankboxServerBuilder {
        BankboxServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process terminates.
    ///
    /// The WebSocket upgrade happens inside the spawned task so a slow
    /// client cannot stall the accept loop.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("bankbox server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let ws = match tokio_tungstenite::accept_async(
                            stream,
                        )
                        .await
                        {
                            Ok(ws) => ws,
                            Err(e) => {
                                tracing::debug!(
                                    %peer,
                                    error = %e,
                                    "websocket handshake failed"
                                );
                                return;
                            }
                        };

                        let conn_id = ConnectionId(
                            NEXT_CONNECTION_ID
                                .fetch_add(1, Ordering::Relaxed),
                        );
                        tracing::debug!(%conn_id, %peer, "connection accepted");

                        handle_connection(ws, conn_id, state).await;
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
