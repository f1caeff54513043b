use std::path::PathBuf;

/// Errors surfaced by the NV-data store.
///
/// Integrity failures (size/digest/state mismatches) are not errors: the
/// store heals them from the backup copy. What reaches the caller is either
/// a contract violation, an I/O failure, or the one case where the store
/// gives up, retry exhaustion.
#[derive(Debug, thiserror::Error)]
pub enum NvError {
    /// Offset/length outside the configured NV region, or zero length.
    #[error("invalid nv range (offset {offset}, length {length})")]
    InvalidRange { offset: usize, length: usize },

    /// A read returned fewer bytes than requested.
    #[error("short nv read ({got} of {wanted} bytes)")]
    ShortRead { wanted: usize, got: usize },

    /// A write reported fewer bytes written than requested.
    #[error("short nv write ({got} of {wanted} bytes)")]
    ShortWrite { wanted: usize, got: usize },

    /// A verified rewrite failed its readback check too many times; the
    /// corrupt target was deleted.
    #[error("giving up on {path} after {tries} write attempts")]
    RetriesExhausted { path: PathBuf, tries: u32 },

    /// The state marker could not be read even after restoration.
    #[error("nv state marker unreadable")]
    StateUnreadable,

    /// An I/O error outside the self-healing paths.
    #[error("nv I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NvError>;
