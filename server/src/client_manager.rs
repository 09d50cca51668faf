//! Connection table for the seated players.
//!
//! This module owns the write side of every client connection, keyed by slot:
//! - Attaching a freshly accepted connection to the slot it was given
//! - Best-effort delivery of queued game messages, one recipient at a time
//! - Closing a connection and cancelling the worker that reads from it
//!
//! It lives inside the session lock next to the game state, so every message
//! of a game step is written out before the next step can begin.

use crate::messages::GameMessage;
use log::{debug, info, warn};
use shared::{player_glyph, MAX_PLAYERS};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;
use tokio::time::timeout;

pub type ConnectionId = u64;

/// Write half of a client connection.
pub type ClientWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A connected client occupying one slot
pub struct Client {
    /// Process-unique id, so a stale worker can tell its slot was reassigned
    pub id: ConnectionId,
    /// Peer address, for logging
    pub addr: SocketAddr,
    writer: ClientWriter,
    /// Fired when the server closes the connection
    closed: Option<oneshot::Sender<()>>,
}

impl Client {
    /// Creates a client and the receiver its worker watches for server-side close.
    pub fn new(
        id: ConnectionId,
        addr: SocketAddr,
        writer: ClientWriter,
    ) -> (Self, oneshot::Receiver<()>) {
        let (closed_tx, closed_rx) = oneshot::channel();
        let client = Self {
            id,
            addr,
            writer,
            closed: Some(closed_tx),
        };
        (client, closed_rx)
    }

    async fn send(&mut self, text: &str, limit: Option<Duration>) -> io::Result<()> {
        let write = async {
            self.writer.write_all(text.as_bytes()).await?;
            self.writer.flush().await
        };

        match limit {
            Some(limit) => timeout(limit, write)
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "send timed out"))?,
            None => write.await,
        }
    }

    async fn close(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!("Shutdown of {} failed: {}", self.addr, e);
        }
        if let Some(closed) = self.closed.take() {
            // The worker may already be gone
            let _ = closed.send(());
        }
    }
}

/// Slot-indexed table of live connections.
pub struct ClientManager {
    clients: [Option<Client>; MAX_PLAYERS],
    next_connection_id: ConnectionId,
    send_timeout: Option<Duration>,
}

impl ClientManager {
    pub fn new(send_timeout: Option<Duration>) -> Self {
        Self {
            clients: std::array::from_fn(|_| None),
            next_connection_id: 1,
            send_timeout,
        }
    }

    /// Puts a new connection into `slot`.
    ///
    /// Returns the connection id and the receiver that resolves once the
    /// server closes this connection.
    pub fn attach(
        &mut self,
        slot: usize,
        addr: SocketAddr,
        writer: ClientWriter,
    ) -> (ConnectionId, oneshot::Receiver<()>) {
        let id = self.next_connection_id;
        self.next_connection_id += 1;

        let (client, closed) = Client::new(id, addr, writer);
        info!(
            "Connection {} from {} attached as Player {}",
            id,
            addr,
            player_glyph(slot)
        );
        self.clients[slot] = Some(client);

        (id, closed)
    }

    pub fn connection_id(&self, slot: usize) -> Option<ConnectionId> {
        self.clients[slot].as_ref().map(|client| client.id)
    }

    /// True while `slot` is still served by connection `id`.
    pub fn is_owned_by(&self, slot: usize, id: ConnectionId) -> bool {
        self.connection_id(slot) == Some(id)
    }

    /// Number of open connections
    pub fn len(&self) -> usize {
        self.clients.iter().filter(|client| client.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Carries out queued messages in order.
    pub async fn deliver(&mut self, messages: Vec<GameMessage>) {
        for message in messages {
            match message {
                GameMessage::Send { slot, text } => {
                    self.send_to(slot, &text).await;
                }
                GameMessage::Broadcast { text, exclude } => {
                    self.broadcast(&text, exclude).await;
                }
                GameMessage::Close { slot } => {
                    self.close(slot).await;
                }
            }
        }
    }

    /// Writes `text` to one slot. A failure is logged and otherwise ignored;
    /// the slot's worker notices the broken connection on its next read.
    pub async fn send_to(&mut self, slot: usize, text: &str) -> bool {
        let send_timeout = self.send_timeout;
        let Some(client) = self.clients[slot].as_mut() else {
            return false;
        };

        match client.send(text, send_timeout).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to send to Player {} at {}: {}",
                    player_glyph(slot),
                    client.addr,
                    e
                );
                false
            }
        }
    }

    /// Writes `text` to every open connection except `exclude`.
    pub async fn broadcast(&mut self, text: &str, exclude: Option<usize>) {
        for slot in 0..MAX_PLAYERS {
            if Some(slot) == exclude {
                continue;
            }
            self.send_to(slot, text).await;
        }
    }

    /// Shuts the slot's connection and cancels its worker.
    pub async fn close(&mut self, slot: usize) {
        if let Some(client) = self.clients[slot].take() {
            info!(
                "Closing connection {} of Player {}",
                client.id,
                player_glyph(slot)
            );
            client.close().await;
        }
    }

    pub async fn close_all(&mut self) {
        for slot in 0..MAX_PLAYERS {
            self.close(slot).await;
        }
    }
}
