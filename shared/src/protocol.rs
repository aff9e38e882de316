//! Request/response messages exchanged between client and server, and the
//! length-prefixed frame format that carries them over a byte stream.
//!
//! Each frame is a 4-byte big-endian payload length followed by the bincode
//! encoding of a [`Request`] or [`Response`].

use crate::{GameState, MoveCommand, PlayerId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame payload
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Request {
    RegisterPlayer,
    GetGameState {
        /// Identifies the polling player so the server can track activity
        player_id: Option<PlayerId>,
    },
    MovePlayer(MoveCommand),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Response {
    Registered {
        player_id: PlayerId,
        state: GameState,
    },
    GameState(GameState),
    MoveAck,
    Error {
        reason: String,
    },
}

fn invalid_data<E: std::error::Error + Send + Sync + 'static>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// Serializes `message` and writes it as one frame.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = bincode::serialize(message).map_err(invalid_data)?;
    if payload.len() > MAX_FRAME_LEN as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", payload.len()),
        ));
    }

    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(&payload).await?;
    writer.flush().await
}

/// Reads one frame. Returns `Ok(None)` when the peer closed the stream
/// cleanly between frames.
pub async fn read_frame<R, T>(reader: &mut R) -> io::Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let len = match reader.read_u32().await {
        Ok(len) => len,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };

    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame length {} exceeds limit", len),
        ));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    bincode::deserialize(&payload)
        .map(Some)
        .map_err(invalid_data)
}
