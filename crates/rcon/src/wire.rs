//! Source RCON packet format.
//!
//! # Wire format
//!
//! ```text
//! [4 bytes LE: size = 4 + 4 + body_len + 2]
//! [4 bytes LE: request id]
//! [4 bytes LE: packet kind]
//! [body_len bytes: UTF-8 body]
//! [2 bytes: 0x00 0x00]
//! ```
//!
//! Kinds share values across directions: `2` is EXECCOMMAND client-side and
//! AUTH_RESPONSE server-side, so kinds are plain constants rather than an
//! enum. An auth response with request id `-1` means the password was
//! rejected.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::RconError;

/// Client -> server: authenticate with the RCON password.
pub const KIND_AUTH: i32 = 3;

/// Client -> server: execute a console command.
pub const KIND_EXEC_COMMAND: i32 = 2;

/// Server -> client: result of an auth attempt (id `-1` = rejected).
pub const KIND_AUTH_RESPONSE: i32 = 2;

/// Server -> client: command output.
pub const KIND_RESPONSE_VALUE: i32 = 0;

/// Largest body accepted in either direction.
pub const MAX_BODY_LEN: usize = 4096;

/// Fixed part of the size field: id + kind + two NUL terminators.
const HEADER_LEN: i32 = 10;

/// One RCON packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

impl Packet {
    /// Creates a packet with the given id, kind, and body.
    pub fn new(id: i32, kind: i32, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }
}

/// Writes one packet to the stream.
pub async fn write_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &Packet,
) -> Result<(), RconError> {
    let body = packet.body.as_bytes();
    if body.len() > MAX_BODY_LEN {
        return Err(RconError::Protocol(format!(
            "body too long: {} bytes (max {MAX_BODY_LEN})",
            body.len()
        )));
    }

    writer.write_i32_le(HEADER_LEN + body.len() as i32).await?;
    writer.write_i32_le(packet.id).await?;
    writer.write_i32_le(packet.kind).await?;
    writer.write_all(body).await?;
    writer.write_all(&[0, 0]).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one packet from the stream.
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, RconError> {
    let size = reader.read_i32_le().await?;
    if size < HEADER_LEN || size > HEADER_LEN + MAX_BODY_LEN as i32 {
        return Err(RconError::Protocol(format!("invalid packet size: {size}")));
    }

    let id = reader.read_i32_le().await?;
    let kind = reader.read_i32_le().await?;

    let mut body_buf = vec![0u8; (size - HEADER_LEN) as usize];
    reader.read_exact(&mut body_buf).await?;
    let body = String::from_utf8(body_buf)
        .map_err(|e| RconError::Protocol(format!("invalid UTF-8 body: {e}")))?;

    let mut terminator = [0u8; 2];
    reader.read_exact(&mut terminator).await?;
    if terminator != [0, 0] {
        return Err(RconError::Protocol("missing NUL terminators".into()));
    }

    Ok(Packet { id, kind, body })
}
