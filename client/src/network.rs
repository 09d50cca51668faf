use crate::input::InputLine;
use log::{debug, info, warn};
use std::io;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;

/// Terminal client for the grid battle server
pub struct Client {
    stream: TcpStream,
}

impl Client {
    pub async fn connect(host: &str, port: u16) -> io::Result<Self> {
        info!("Connecting to {}:{}...", host, port);
        let stream = TcpStream::connect((host, port)).await?;
        info!("Connected to {}", stream.peer_addr()?);
        Ok(Client { stream })
    }

    /// Forwards stdin to the server and prints everything it sends back.
    ///
    /// Returns once the server closes the connection, or once input is done
    /// and the server has finished replying.
    pub async fn run(self) -> io::Result<()> {
        let (reader, mut writer) = self.stream.into_split();
        let mut receiver = tokio::spawn(print_server_output(reader, tokio::io::stdout()));
        let stdin = BufReader::new(tokio::io::stdin());

        tokio::select! {
            sent = forward_input(stdin, &mut writer) => {
                let sent = sent?;
                debug!("Input finished after {} lines", sent);
                // Let the server see EOF if we never said QUIT
                let _ = writer.shutdown().await;
                report_receiver(receiver.await);
            }
            finished = &mut receiver => {
                report_receiver(finished);
            }
        }

        info!("Connection closed");
        Ok(())
    }
}

fn report_receiver(finished: Result<io::Result<u64>, tokio::task::JoinError>) {
    match finished {
        Ok(Ok(bytes)) => debug!("Server closed the connection after {} bytes", bytes),
        Ok(Err(e)) => warn!("Lost connection to server: {}", e),
        Err(e) => warn!("Receiver task failed: {}", e),
    }
}

/// Copies server output to `out` until the server closes the connection.
pub async fn print_server_output<R, W>(mut reader: R, mut out: W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let copied = tokio::io::copy(&mut reader, &mut out).await?;
    out.flush().await?;
    Ok(copied)
}

/// Sends each non-empty input line to the server, newline terminated.
///
/// Stops after a quit line or at end of input and returns the number of
/// lines sent.
pub async fn forward_input<I, W>(input: I, writer: &mut W) -> io::Result<usize>
where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut sent = 0;

    while let Some(raw) = lines.next_line().await? {
        let (line, stop) = match InputLine::classify(&raw) {
            InputLine::Skip => continue,
            InputLine::Send(line) => (line, false),
            InputLine::SendAndStop(line) => (line, true),
        };

        writer.write_all(format!("{}\n", line).as_bytes()).await?;
        writer.flush().await?;
        sent += 1;

        if stop {
            break;
        }
    }

    Ok(sent)
}
