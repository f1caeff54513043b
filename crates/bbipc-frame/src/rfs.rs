//! RFS NV-data I/O payloads.
//!
//! The modem asks the host to read or write a slice of its NV parameter
//! blob. Requests carry `{offset, length}` and, for writes, the data bytes;
//! the host always answers with a confirm carrying the success flag and the
//! echoed range. All fields little-endian.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Fixed prefix of an RFS I/O request: offset (4) + length (4).
pub const RFS_IO_REQUEST_SIZE: usize = 8;

/// Fixed prefix of an RFS I/O confirm: flag (1) + offset (4) + length (4).
pub const RFS_IO_CONFIRM_SIZE: usize = 9;

/// A modem-originated NV read or write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfsIoRequest {
    pub offset: u32,
    pub length: u32,
    /// Data to write; empty for reads.
    pub data: Bytes,
}

impl RfsIoRequest {
    /// Parse a read request: `{offset, length}`, no data.
    pub fn parse_read(payload: &[u8]) -> Result<Self> {
        let (offset, length) = parse_prefix(payload)?;
        Ok(Self {
            offset,
            length,
            data: Bytes::new(),
        })
    }

    /// Parse a write request: `{offset, length}` followed by `length` data
    /// bytes. A payload shorter than it claims is rejected outright.
    pub fn parse_write(payload: &[u8]) -> Result<Self> {
        let (offset, length) = parse_prefix(payload)?;
        let needed = RFS_IO_REQUEST_SIZE + length as usize;
        if payload.len() < needed {
            return Err(FrameError::RfsPayloadTruncated {
                available: payload.len(),
                needed,
            });
        }
        Ok(Self {
            offset,
            length,
            data: Bytes::copy_from_slice(&payload[RFS_IO_REQUEST_SIZE..needed]),
        })
    }

    /// Serialize; used to originate requests and by tests.
    pub fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RFS_IO_REQUEST_SIZE + self.data.len());
        buf.put_u32_le(self.offset);
        buf.put_u32_le(self.length);
        buf.put_slice(&self.data);
        buf.freeze()
    }
}

/// The host's answer to an [`RfsIoRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfsIoConfirm {
    /// `1` on success, `0` on failure. Failure still gets a confirm; the
    /// modem must never be left waiting.
    pub confirm: u8,
    pub offset: u32,
    pub length: u32,
    /// Data read back; empty for write confirms.
    pub data: Bytes,
}

impl RfsIoConfirm {
    pub fn success(offset: u32, length: u32, data: Bytes) -> Self {
        Self {
            confirm: 1,
            offset,
            length,
            data,
        }
    }

    pub fn failure(offset: u32, length: u32, data: Bytes) -> Self {
        Self {
            confirm: 0,
            offset,
            length,
            data,
        }
    }

    pub fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RFS_IO_CONFIRM_SIZE + self.data.len());
        buf.put_u8(self.confirm);
        buf.put_u32_le(self.offset);
        buf.put_u32_le(self.length);
        buf.put_slice(&self.data);
        buf.freeze()
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < RFS_IO_CONFIRM_SIZE {
            return Err(FrameError::RfsPayloadTruncated {
                available: payload.len(),
                needed: RFS_IO_CONFIRM_SIZE,
            });
        }
        Ok(Self {
            confirm: payload[0],
            offset: u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]),
            length: u32::from_le_bytes([payload[5], payload[6], payload[7], payload[8]]),
            data: Bytes::copy_from_slice(&payload[RFS_IO_CONFIRM_SIZE..]),
        })
    }
}

fn parse_prefix(payload: &[u8]) -> Result<(u32, u32)> {
    if payload.len() < RFS_IO_REQUEST_SIZE {
        return Err(FrameError::RfsPayloadTruncated {
            available: payload.len(),
            needed: RFS_IO_REQUEST_SIZE,
        });
    }
    let offset = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let length = u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
    Ok((offset, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_request_parses_offset_and_length() {
        let req = RfsIoRequest {
            offset: 0x10,
            length: 4,
            data: Bytes::new(),
        };
        let parsed = RfsIoRequest::parse_read(&req.to_payload()).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn write_request_carries_data() {
        let req = RfsIoRequest {
            offset: 0x40,
            length: 4,
            data: Bytes::from_static(&[0xaa, 0xbb, 0xcc, 0xdd]),
        };
        let parsed = RfsIoRequest::parse_write(&req.to_payload()).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn short_prefix_rejected() {
        let err = RfsIoRequest::parse_read(&[0x01, 0x02]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::RfsPayloadTruncated { available: 2, .. }
        ));
    }

    #[test]
    fn write_request_missing_data_rejected() {
        let req = RfsIoRequest {
            offset: 0,
            length: 16,
            data: Bytes::from_static(b"short"),
        };
        let err = RfsIoRequest::parse_write(&req.to_payload()).unwrap_err();
        assert!(matches!(err, FrameError::RfsPayloadTruncated { .. }));
    }

    #[test]
    fn confirm_roundtrip() {
        let confirm = RfsIoConfirm::success(0x10, 4, Bytes::from_static(&[1, 2, 3, 4]));
        let parsed = RfsIoConfirm::parse(&confirm.to_payload()).unwrap();
        assert_eq!(parsed, confirm);

        let failed = RfsIoConfirm::failure(0x10, 4, Bytes::new());
        assert_eq!(failed.confirm, 0);
        assert_eq!(RfsIoConfirm::parse(&failed.to_payload()).unwrap(), failed);
    }
}
