use std::path::PathBuf;

/// Failures of the event store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The persisted file exists but cannot be parsed. Never repaired
    /// automatically.
    #[error("Event store at {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Event store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize events: {0}")]
    Serialize(#[source] serde_json::Error),
}
