use bytes::Bytes;

use crate::command::group_name;

/// One IPC exchange unit between the application processor and the modem.
///
/// `payload` is an owned buffer: decode allocates it fresh and hands
/// ownership to the caller; dropping the message releases it. No buffer is
/// shared with the wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Request correlation number, stamped by the sending client.
    pub mseq: u8,
    /// Response correlation number (the request's `mseq` being answered).
    pub aseq: u8,
    /// Message group (see [`crate::command`]).
    pub group: u8,
    /// Command index within the group.
    pub index: u8,
    /// Request/response/notification qualifier.
    pub kind: u8,
    /// Opaque command payload.
    pub payload: Bytes,
}

impl Message {
    /// Build a fresh request; `mseq` is left for the client to stamp.
    pub fn request(group: u8, index: u8, kind: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            mseq: 0,
            aseq: 0,
            group,
            index,
            kind,
            payload: payload.into(),
        }
    }

    /// Combined group/index classification, `group << 8 | index`.
    pub fn command(&self) -> u16 {
        (self.group as u16) << 8 | self.index as u16
    }

    /// Group name for trace output.
    pub fn group_name(&self) -> &'static str {
        group_name(self.group)
    }
}
