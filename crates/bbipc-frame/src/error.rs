/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The declared frame length exceeds the bytes actually available.
    #[error("frame length mismatch (declared {declared} bytes, {available} available)")]
    LengthMismatch { declared: usize, available: usize },

    /// The header length field is smaller than the header itself.
    #[error("declared length {declared} smaller than header size {min}")]
    HeaderTooShort { declared: usize, min: usize },

    /// A delimited frame does not begin with the start marker.
    #[error("missing frame start marker")]
    MissingStartMarker,

    /// A delimited frame does not end with the end marker.
    #[error("missing frame end marker")]
    MissingEndMarker,

    /// The payload exceeds what the length field can represent.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An RFS I/O payload is shorter than its fixed-size prefix.
    #[error("rfs payload truncated ({available} bytes, need {needed})")]
    RfsPayloadTruncated { available: usize, needed: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
