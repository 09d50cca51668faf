//! Server network layer: TCP accept loop and one worker task per player.

use crate::client_manager::{ClientManager, ConnectionId};
use crate::commands;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::game::GameState;
use crate::messages::SERVER_FULL;
use log::{debug, error, info, warn};
use shared::player_glyph;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinSet;

/// Longest command line accepted, not counting the line ending.
pub const MAX_LINE_BYTES: usize = 1024;

/// Outcome of reading one command line from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    Line(String),
    /// Longer than `MAX_LINE_BYTES`; already skipped up to its newline.
    Oversized,
    Closed,
}

/// Everything a game step touches. One lock guards all of it.
pub struct Session {
    pub game: GameState,
    pub clients: ClientManager,
}

impl Session {
    pub fn new(send_timeout: Option<Duration>) -> Self {
        Self {
            game: GameState::new(),
            clients: ClientManager::new(send_timeout),
        }
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// A seated player's read side, waiting to be driven by `run_worker`.
pub struct Worker<R> {
    pub slot: usize,
    pub connection_id: ConnectionId,
    reader: R,
    closed: oneshot::Receiver<()>,
}

/// Main server owning the listener and the shared session
pub struct Server {
    listener: TcpListener,
    session: SharedSession,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            session: Arc::new(Mutex::new(Session::new(config.send_timeout))),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Accepts players until `shutdown` resolves, then stops every worker
    /// and waits for them to finish.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let (stop_tx, _) = watch::channel(false);
        let mut workers = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    break;
                }

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            debug!("Accepted connection from {}", addr);
                            let (reader, writer) = stream.into_split();
                            if let Some(worker) = admit(&self.session, reader, writer, addr).await {
                                workers.spawn(run_worker(
                                    Arc::clone(&self.session),
                                    worker,
                                    stop_tx.subscribe(),
                                ));
                            }
                        }
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                }

                Some(finished) = workers.join_next() => {
                    if let Err(e) = finished {
                        error!("Connection worker panicked: {}", e);
                    }
                }
            }
        }

        let _ = stop_tx.send(true);
        while let Some(finished) = workers.join_next().await {
            if let Err(e) = finished {
                error!("Connection worker panicked: {}", e);
            }
        }
        self.session.lock().await.clients.close_all().await;

        Ok(())
    }
}

/// Seats a new connection, or turns it away when every slot is taken.
///
/// On success the player is announced to everyone and the returned worker
/// must be driven with `run_worker`.
pub async fn admit<R, W>(
    session: &SharedSession,
    reader: R,
    mut writer: W,
    addr: SocketAddr,
) -> Option<Worker<R>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut guard = session.lock().await;
    let session = &mut *guard;

    let Some(slot) = session.game.free_slot() else {
        drop(guard);
        info!("Server full, rejecting {}", addr);
        if let Err(e) = writer.write_all(SERVER_FULL.as_bytes()).await {
            warn!("Failed to send rejection to {}: {}", addr, e);
        }
        let _ = writer.shutdown().await;
        return None;
    };

    let (connection_id, closed) = session.clients.attach(slot, addr, Box::new(writer));
    let outbox = commands::handle_join(&mut session.game, slot);
    session.clients.deliver(outbox).await;

    Some(Worker {
        slot,
        connection_id,
        reader,
        closed,
    })
}

/// Reads commands for one player until they quit, drop, get closed by the
/// server, or the server stops.
///
/// Each line is processed as a whole game step under the session lock.
pub async fn run_worker<R>(
    session: SharedSession,
    worker: Worker<R>,
    mut stop: watch::Receiver<bool>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Worker {
        slot,
        connection_id,
        reader,
        mut closed,
    } = worker;
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(MAX_LINE_BYTES);

    loop {
        let line = tokio::select! {
            biased;

            _ = &mut closed => {
                debug!("Worker for Player {} cancelled", player_glyph(slot));
                return;
            }
            _ = stop.changed() => {
                return;
            }
            line = read_command_line(&mut reader, &mut buf) => line,
        };

        let mut guard = session.lock().await;
        let session = &mut *guard;

        // The slot was freed (and maybe handed out again) while we were reading
        if !session.clients.is_owned_by(slot, connection_id) {
            return;
        }

        let (outbox, gone) = match line {
            Ok(LineRead::Line(text)) => {
                (commands::process_command(&mut session.game, slot, &text), false)
            }
            Ok(LineRead::Oversized) => {
                debug!(
                    "Ignoring line over {} bytes from Player {}",
                    MAX_LINE_BYTES,
                    player_glyph(slot)
                );
                (Vec::new(), false)
            }
            Ok(LineRead::Closed) => {
                info!("Player {} disconnected", player_glyph(slot));
                (commands::handle_disconnect(&mut session.game, slot), true)
            }
            Err(e) => {
                warn!("Error reading from Player {}: {}", player_glyph(slot), e);
                (commands::handle_disconnect(&mut session.game, slot), true)
            }
        };

        session.clients.deliver(outbox).await;
        if gone {
            // Make sure the slot never keeps a dead connection
            session.clients.close(slot).await;
            return;
        }
    }
}

/// Reads one newline-terminated line of at most `MAX_LINE_BYTES`.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// garbled line is just another unrecognized command. A final line without a
/// newline still counts.
pub async fn read_command_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_LINE_BYTES as u64 + 1;

    buf.clear();
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(LineRead::Closed);
    }

    if buf.last() != Some(&b'\n') && n as u64 == limit {
        // Discard the rest of the line
        loop {
            buf.clear();
            let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
            if n == 0 {
                return Ok(LineRead::Closed);
            }
            if buf.last() == Some(&b'\n') {
                return Ok(LineRead::Oversized);
            }
        }
    }

    let mut line = buf.as_slice();
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(b"\r") {
        line = rest;
    }

    Ok(LineRead::Line(String::from_utf8_lossy(line).into_owned()))
}
