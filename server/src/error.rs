use std::io;
use thiserror::Error;

/// Failures that stop the server as a whole.
///
/// Per-connection faults never surface here; workers log them and clean up.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
