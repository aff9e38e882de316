use std::io;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Io(#[from] io::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server closed the connection")]
    Disconnected,

    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// Our player no longer appears in the server's snapshots.
    #[error("evicted by server")]
    Evicted,

    /// The server answered with an error response.
    #[error("server refused request: {0}")]
    Rejected(String),
}
