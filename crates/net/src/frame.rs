//! Length-prefixed frame encoding/decoding
//!
//! Wire format: [4-byte big-endian length][JSON event]
//! Maximum frame size: 1MB (sanity limit)

use livechat_core::Event;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Maximum allowed frame size (1MB)
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

fn map_read_err(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Io(e)
    }
}

/// Read a length-prefixed event from a stream
///
/// A payload that fails to decode yields [`Error::Malformed`] with the frame
/// fully consumed, so the stream stays usable.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Event> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(map_read_err)?;

    let len = u32::from_be_bytes(len_buf);

    if len == 0 {
        return Err(Error::Protocol("Empty frame".into()));
    }
    if len > MAX_FRAME_SIZE {
        return Err(Error::Protocol(format!(
            "Frame too large: {} bytes (max {})",
            len, MAX_FRAME_SIZE
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(map_read_err)?;

    Event::from_bytes(&payload).map_err(|e| Error::Malformed(e.to_string()))
}

/// Write an event as a length-prefixed frame
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, event: &Event) -> Result<()> {
    let payload = event
        .to_bytes()
        .map_err(|e| Error::Protocol(format!("Serialization failed: {}", e)))?;

    write_raw_frame(writer, &payload).await
}

/// Write an already-encoded payload as a frame
pub async fn write_raw_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or_else(|| {
            Error::Protocol(format!(
                "Event too large: {} bytes (max {})",
                payload.len(),
                MAX_FRAME_SIZE
            ))
        })?;

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;

    // Flush to ensure delivery
    writer.flush().await?;

    Ok(())
}
