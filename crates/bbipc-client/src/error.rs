/// Errors that can occur in IPC client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error, returned unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] bbipc_transport::TransportError),

    /// Frame-level error; the partial message is discarded.
    #[error("frame error: {0}")]
    Frame(#[from] bbipc_frame::FrameError),

    /// NV-data store error during RFS dispatch.
    #[error("nv error: {0}")]
    Nv(#[from] bbipc_nv::NvError),

    /// The modem stopped producing bytes mid-frame.
    #[error("modem stream closed")]
    Disconnected,

    /// The transport accepted fewer bytes than the encoded frame.
    #[error("short send ({got} of {wanted} bytes)")]
    ShortSend { wanted: usize, got: usize },

    /// Declared frame length above the hard receive ceiling; the stream is
    /// treated as desynchronized rather than allocating the claim.
    #[error("oversized frame ({size} bytes, max {max})")]
    OversizedFrame { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ClientError>;
