//! Transfer client
//!
//! Connects to a remote peer, requests one file by name, and writes the
//! payload to `received_<fileName>` in the download directory. The framed
//! response header is what keeps a refusal from masquerading as file
//! content; a refused request creates no output file at all.

use crate::stats::TransferStats;
use flock_core::{wire, Error, Result, RECEIVED_PREFIX};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Fetch `file_name` from the peer at `addr`; returns the output path
pub async fn fetch(
    addr: &str,
    file_name: &str,
    download_dir: &Path,
    stats: &TransferStats,
    io_timeout: Duration,
) -> Result<PathBuf> {
    wire::validate_file_name(file_name)?;

    let stream = timeout(io_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| Error::Timeout(format!("connecting to {addr}")))?
        .map_err(|e| Error::Transport(format!("failed to connect to {addr}: {e}")))?;

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    timeout(io_timeout, wire::write_request(&mut write_half, file_name))
        .await
        .map_err(|_| Error::Timeout("sending request".to_string()))??;

    let header = timeout(io_timeout, wire::read_response_header(&mut reader))
        .await
        .map_err(|_| Error::Timeout("reading response header".to_string()))??;

    let size = match header {
        wire::ResponseHeader::Ok { size } => size,
        wire::ResponseHeader::Refused(message) => {
            tracing::warn!(file = %file_name, "Peer refused request: {message}");
            return Err(Error::TransferRefused(message));
        }
    };

    tokio::fs::create_dir_all(download_dir).await?;
    let output_path = download_dir.join(format!("{RECEIVED_PREFIX}{file_name}"));

    let received = receive_body(&mut reader, &output_path, size, io_timeout).await;
    match received {
        Ok(received) => {
            stats.add_downloaded(received);
            tracing::info!(file = %file_name, bytes = received, "File received");
            Ok(output_path)
        }
        Err(e) => {
            // A short or stalled body leaves no half-written artifact behind
            let _ = tokio::fs::remove_file(&output_path).await;
            Err(e)
        }
    }
}

async fn receive_body<R>(
    reader: &mut R,
    output_path: &Path,
    size: u64,
    io_timeout: Duration,
) -> Result<u64>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut output = tokio::fs::File::create(output_path).await?;
    let mut body = reader.take(size);

    let received = timeout(io_timeout, tokio::io::copy(&mut body, &mut output))
        .await
        .map_err(|_| Error::Timeout("reading response body".to_string()))??;

    if received != size {
        return Err(Error::Transport(format!(
            "short read: expected {size} bytes, got {received}"
        )));
    }
    Ok(received)
}
