//! Wire framing for baseband modem IPC.
//!
//! Serializes and deserializes [`Message`]s to the header layout a given
//! device family speaks: a fixed 7-byte header, an HDLC-style delimited
//! frame, or the narrow RFS header used for NV-data traffic. The rest of
//! the system stays ignorant of wire details behind [`FrameVariant`].

pub mod codec;
pub mod command;
pub mod error;
pub mod message;
pub mod rfs;

pub use codec::{
    declared_frame_len, decode, encode, FrameVariant, FIXED_HEADER_SIZE, HDLC_END,
    HDLC_LINK_HEADER_SIZE, HDLC_START, RFS_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use message::Message;
pub use rfs::{RfsIoConfirm, RfsIoRequest, RFS_IO_CONFIRM_SIZE, RFS_IO_REQUEST_SIZE};
