use std::path::PathBuf;

/// Errors that can occur in modem transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open a modem device node.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the modem descriptor.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has not been opened, or was already closed.
    #[error("transport not open")]
    NotOpen,

    /// Failed to drive the modem power control node.
    #[error("power control failed on {path}: {source}")]
    PowerControl {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
