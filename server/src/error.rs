use std::io;
use std::path::PathBuf;

/// The map file could not be read. The server refuses to start.
#[derive(Debug, thiserror::Error)]
#[error("failed to load map from {}: {source}", .path.display())]
pub struct MapLoadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Registration was attempted against a map with no rows.
    #[error("server state not initialized: map has no rows")]
    MapNotLoaded,

    #[error("failed to load map: {0}")]
    Map(#[from] MapLoadError),

    #[error("network error: {0}")]
    Io(#[from] io::Error),
}
