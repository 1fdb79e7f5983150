//! Wire protocol for peer-to-peer file transfer
//!
//! One exchange per TCP connection: the client sends a newline-terminated
//! file name, the server answers with a status header line followed by the
//! raw file bytes. The header is what lets a client tell an error apart
//! from payload — a bare byte stream cannot.
//!
//! ```text
//! client -> server:  <fileName>\n
//! server -> client:  OK <size>\n<size raw bytes>
//!                  | ERR <message>\n
//! ```

use crate::{Error, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on the request line, in bytes
pub const MAX_REQUEST_LINE: u64 = 4096;

/// Upper bound on the response header line, in bytes
pub const MAX_HEADER_LINE: u64 = 1024;

/// Server response header, read by the client before any payload bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseHeader {
    /// The file exists; exactly `size` payload bytes follow
    Ok { size: u64 },
    /// The request was refused; the connection closes after this line
    Refused(String),
}

/// Check that a requested file name is a plain name, not a path.
///
/// The server resolves requests against its shared directory, so anything
/// that could escape it is refused before touching the filesystem.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidRequest("empty file name".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(Error::InvalidRequest(format!(
            "file name '{name}' must not contain path separators"
        )));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidRequest(
            "file name contains control characters".to_string(),
        ));
    }
    Ok(())
}

/// Send a file request line
pub async fn write_request<W: AsyncWrite + Unpin>(writer: &mut W, file_name: &str) -> Result<()> {
    validate_file_name(file_name)?;
    writer.write_all(file_name.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Read a file request line (server side)
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let name = read_line_capped(reader, MAX_REQUEST_LINE).await?;
    let name = name.trim().to_string();
    validate_file_name(&name)?;
    Ok(name)
}

/// Send the success header; the caller streams `size` bytes right after
pub async fn write_ok_header<W: AsyncWrite + Unpin>(writer: &mut W, size: u64) -> Result<()> {
    writer.write_all(format!("OK {size}\n").as_bytes()).await?;
    Ok(())
}

/// Send a refusal line; nothing else may follow on this connection
pub async fn write_refusal<W: AsyncWrite + Unpin>(writer: &mut W, message: &str) -> Result<()> {
    // Keep the refusal itself a single line
    let message = message.replace('\n', " ");
    writer.write_all(format!("ERR {message}\n").as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and parse the response header (client side)
pub async fn read_response_header<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<ResponseHeader> {
    let line = read_line_capped(reader, MAX_HEADER_LINE).await?;

    if let Some(size) = line.strip_prefix("OK ") {
        let size: u64 = size
            .trim()
            .parse()
            .map_err(|_| Error::Protocol(format!("invalid size in header: '{line}'")))?;
        return Ok(ResponseHeader::Ok { size });
    }
    if let Some(message) = line.strip_prefix("ERR ") {
        return Ok(ResponseHeader::Refused(message.trim().to_string()));
    }

    Err(Error::Protocol(format!("unrecognized response header: '{line}'")))
}

/// Read one `\n`-terminated line of at most `cap` bytes.
///
/// A stream that ends or stalls mid-line is a transport error; a line
/// longer than `cap` is a protocol error.
async fn read_line_capped<R: AsyncBufRead + Unpin>(reader: &mut R, cap: u64) -> Result<String> {
    use tokio::io::AsyncReadExt;

    let mut buf = Vec::new();
    let mut limited = (&mut *reader).take(cap);
    let n = limited.read_until(b'\n', &mut buf).await?;

    if n == 0 {
        return Err(Error::Transport("connection closed before request line".to_string()));
    }
    if buf.last() != Some(&b'\n') {
        return Err(Error::Protocol(format!("line exceeds {cap} bytes or stream ended mid-line")));
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    String::from_utf8(buf).map_err(|_| Error::Protocol("line is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, BufReader};

    #[tokio::test]
    async fn test_request_round_trip() {
        let (mut client, server) = tokio::io::duplex(1024);

        write_request(&mut client, "movie.mkv").await.unwrap();
        drop(client);

        let mut reader = BufReader::new(server);
        let name = read_request(&mut reader).await.unwrap();
        assert_eq!(name, "movie.mkv");
    }

    #[tokio::test]
    async fn test_request_rejects_path_traversal() {
        let (mut client, server) = tokio::io::duplex(1024);
        client.write_all(b"../etc/passwd\n").await.unwrap();
        drop(client);

        let mut reader = BufReader::new(server);
        assert!(matches!(
            read_request(&mut reader).await,
            Err(Error::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_ok_header_round_trip() {
        let (mut server, client) = tokio::io::duplex(1024);

        write_ok_header(&mut server, 12).await.unwrap();
        server.write_all(b"hello world!").await.unwrap();
        drop(server);

        let mut reader = BufReader::new(client);
        let header = read_response_header(&mut reader).await.unwrap();
        assert_eq!(header, ResponseHeader::Ok { size: 12 });

        let mut body = Vec::new();
        reader.read_to_end(&mut body).await.unwrap();
        assert_eq!(body, b"hello world!");
    }

    #[tokio::test]
    async fn test_refusal_round_trip() {
        let (mut server, client) = tokio::io::duplex(1024);

        write_refusal(&mut server, "no such file: ghost.bin").await.unwrap();
        drop(server);

        let mut reader = BufReader::new(client);
        let header = read_response_header(&mut reader).await.unwrap();
        assert_eq!(
            header,
            ResponseHeader::Refused("no such file: ghost.bin".to_string())
        );
    }

    #[tokio::test]
    async fn test_garbage_header_is_protocol_error() {
        let (mut server, client) = tokio::io::duplex(1024);
        server.write_all(b"raw file bytes with no header\n").await.unwrap();
        drop(server);

        let mut reader = BufReader::new(client);
        assert!(matches!(
            read_response_header(&mut reader).await,
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_request_line() {
        let (mut client, server) = tokio::io::duplex(16 * 1024);
        let long = vec![b'a'; MAX_REQUEST_LINE as usize + 10];
        client.write_all(&long).await.unwrap();
        client.write_all(b"\n").await.unwrap();
        drop(client);

        let mut reader = BufReader::new(server);
        assert!(matches!(
            read_request(&mut reader).await,
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("data.bin").is_ok());
        assert!(validate_file_name("with space.txt").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("a/b").is_err());
        assert!(validate_file_name("a\\b").is_err());
        assert!(validate_file_name("..").is_err());
    }
}
