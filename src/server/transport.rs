//! Line-oriented transport
//!
//! Every request uses its own connection: the requester writes one
//! newline-terminated line and reads the reply, either a single line or
//! every line until the peer closes.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::Result;

/// How a reply is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Exactly one line; EOF before any line reads as an empty line
    SingleLine,
    /// Every line until the peer closes the connection
    StreamToClose,
}

/// Send `line` to `addr` and read the reply with the given framing
pub async fn request(addr: &str, line: &str, framing: Framing) -> Result<Vec<String>> {
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();

    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    let mut lines = BufReader::new(reader).lines();
    match framing {
        Framing::SingleLine => {
            let reply = lines.next_line().await?.unwrap_or_default();
            Ok(vec![reply])
        }
        Framing::StreamToClose => {
            let mut replies = Vec::new();
            while let Some(reply) = lines.next_line().await? {
                replies.push(reply);
            }
            Ok(replies)
        }
    }
}

/// Read one request line.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so
/// every request gets an answer. EOF before a newline yields what was read.
pub async fn read_request<R>(reader: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    BufReader::new(reader).read_until(b'\n', &mut buf).await?;

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a response followed by a newline and close the write side
pub async fn write_response<W>(writer: &mut W, response: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(response.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    writer.shutdown().await?;
    Ok(())
}
