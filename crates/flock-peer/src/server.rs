//! Transfer server
//!
//! Accepts raw TCP connections and, per connection, answers exactly one
//! file request: read the request line, then stream the whole file back
//! behind an `OK` header, or answer a single `ERR` line. Every phase runs
//! under a deadline; a stalled peer gets its connection dropped, and no
//! failure here is ever reported to the tracker.

use crate::stats::TransferStats;
use flock_core::{wire, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

pub struct TransferServer {
    listener: TcpListener,
    shared_dir: PathBuf,
    stats: Arc<TransferStats>,
    io_timeout: Duration,
}

impl TransferServer {
    /// Bind the transfer listener
    pub async fn bind(
        addr: &str,
        shared_dir: PathBuf,
        stats: Arc<TransferStats>,
        io_timeout: Duration,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Transport(format!("failed to bind {addr}: {e}")))?;
        Ok(Self {
            listener,
            shared_dir,
            stats,
            io_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop; one task per connection
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            "Serving files from {} on {}",
            self.shared_dir.display(),
            self.local_addr()?
        );

        loop {
            let (stream, remote) = self.listener.accept().await?;
            let shared_dir = self.shared_dir.clone();
            let stats = self.stats.clone();
            let io_timeout = self.io_timeout;

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, &shared_dir, &stats, io_timeout).await {
                    tracing::warn!(%remote, "Connection failed: {e}");
                }
            });
        }
    }
}

/// One request/response exchange; any error closes the connection
async fn handle_connection(
    stream: TcpStream,
    shared_dir: &Path,
    stats: &TransferStats,
    io_timeout: Duration,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let name = match timeout(io_timeout, wire::read_request(&mut reader)).await {
        Ok(Ok(name)) => name,
        Ok(Err(Error::InvalidRequest(msg))) => {
            // A malformed name still gets an answer before the close
            let _ = timeout(io_timeout, wire::write_refusal(&mut write_half, &msg)).await;
            return Err(Error::InvalidRequest(msg));
        }
        Ok(Err(e)) => return Err(e),
        Err(_) => return Err(Error::Timeout("reading request line".to_string())),
    };

    let path = shared_dir.join(&name);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => {
            tracing::info!(file = %name, "Requested file not found");
            timeout(
                io_timeout,
                wire::write_refusal(&mut write_half, &format!("no such file: {name}")),
            )
            .await
            .map_err(|_| Error::Timeout("writing refusal".to_string()))??;
            return Ok(());
        }
    };

    let size = file.metadata().await?.len();
    let mut reader_body = tokio::io::BufReader::new(file);

    let sent = timeout(io_timeout, async {
        wire::write_ok_header(&mut write_half, size).await?;
        let sent = tokio::io::copy(&mut reader_body, &mut write_half).await?;
        write_half.flush().await?;
        Ok::<u64, Error>(sent)
    })
    .await
    .map_err(|_| Error::Timeout("streaming file".to_string()))??;

    stats.add_uploaded(sent);
    tracing::info!(file = %name, bytes = sent, "File sent");
    Ok(())
}
