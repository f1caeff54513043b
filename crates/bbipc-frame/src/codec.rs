use bbipc_transport::{ClientKind, DeviceVariant};
use bytes::{BufMut, Bytes, BytesMut};

use crate::command::GROUP_RFS;
use crate::error::{FrameError, Result};
use crate::message::Message;

/// Fixed variant header: length (2) + mseq + aseq + group + index + type = 7 bytes.
pub const FIXED_HEADER_SIZE: usize = 7;

/// HDLC link header: inner length (2) + reserved (1) = 3 bytes.
pub const HDLC_LINK_HEADER_SIZE: usize = 3;

/// RFS variant header: length (4) + command (1) + id (1) = 6 bytes.
pub const RFS_HEADER_SIZE: usize = 6;

/// Start marker of a delimited frame.
pub const HDLC_START: u8 = 0x7f;

/// End marker of a delimited frame.
pub const HDLC_END: u8 = 0x7e;

const HDLC_MIN_FRAME: usize = 1 + HDLC_LINK_HEADER_SIZE + FIXED_HEADER_SIZE + 1;

/// The wire encoding used by one device family for one channel.
///
/// Three header shapes exist because each modem generation evolved its own
/// wire format. The codec is the only place that knows them; everything
/// above works in terms of [`Message`].
///
/// ```text
/// Fixed:  [len u16 LE][mseq][aseq][group][index][type][payload]
/// Hdlc:   [0x7F][link-len u16 LE][rsvd][ fixed header + payload ][0x7E]
/// Rfs:    [len u32 LE][cmd][id][payload]
/// ```
///
/// Fixed and Hdlc length fields cover header + payload; the Hdlc link length
/// additionally covers the link header but not the two marker bytes. The Rfs
/// header has no group/type: the group is implied to be RFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameVariant {
    Fixed,
    Hdlc,
    Rfs,
}

impl FrameVariant {
    /// The framing a device family uses for a given channel.
    ///
    /// RFS traffic uses the narrow RFS header on every family; formatted
    /// traffic is raw-header on Crespo/Aries and HDLC-delimited on
    /// H1/XMM6260.
    pub fn for_device(device: DeviceVariant, kind: ClientKind) -> Self {
        match kind {
            ClientKind::Rfs => FrameVariant::Rfs,
            ClientKind::Fmt => match device {
                DeviceVariant::Crespo | DeviceVariant::Aries => FrameVariant::Fixed,
                DeviceVariant::H1 | DeviceVariant::Xmm6260 => FrameVariant::Hdlc,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameVariant::Fixed => "fixed",
            FrameVariant::Hdlc => "hdlc",
            FrameVariant::Rfs => "rfs",
        }
    }

    /// Bytes of prefix needed before the total frame length is known.
    pub fn min_prefix_len(self) -> usize {
        match self {
            FrameVariant::Fixed => FIXED_HEADER_SIZE,
            // Start marker + link length; the reserved byte rides along.
            FrameVariant::Hdlc => 1 + HDLC_LINK_HEADER_SIZE,
            FrameVariant::Rfs => RFS_HEADER_SIZE,
        }
    }
}

/// Encode a message into its wire representation.
pub fn encode(msg: &Message, variant: FrameVariant) -> Result<BytesMut> {
    match variant {
        FrameVariant::Fixed => encode_fixed(msg),
        FrameVariant::Hdlc => encode_hdlc(msg),
        FrameVariant::Rfs => encode_rfs(msg),
    }
}

/// Decode one complete frame. `buf` must hold at least the declared length.
///
/// The returned payload is a fresh, independently owned buffer; nothing in
/// the result aliases `buf`. On failure no partially populated message
/// escapes.
pub fn decode(buf: &[u8], variant: FrameVariant) -> Result<Message> {
    match variant {
        FrameVariant::Fixed => decode_fixed(buf),
        FrameVariant::Hdlc => decode_hdlc(buf),
        FrameVariant::Rfs => decode_rfs(buf),
    }
}

/// Total on-wire frame length declared by a header prefix.
///
/// `prefix` must be at least [`FrameVariant::min_prefix_len`] bytes. Used by
/// the client's two-phase receive: read the prefix, learn the total, read
/// the remainder.
pub fn declared_frame_len(prefix: &[u8], variant: FrameVariant) -> Result<usize> {
    let min = variant.min_prefix_len();
    if prefix.len() < min {
        return Err(FrameError::LengthMismatch {
            declared: min,
            available: prefix.len(),
        });
    }
    match variant {
        FrameVariant::Fixed => {
            let declared = u16::from_le_bytes([prefix[0], prefix[1]]) as usize;
            if declared < FIXED_HEADER_SIZE {
                return Err(FrameError::HeaderTooShort {
                    declared,
                    min: FIXED_HEADER_SIZE,
                });
            }
            Ok(declared)
        }
        FrameVariant::Hdlc => {
            if prefix[0] != HDLC_START {
                return Err(FrameError::MissingStartMarker);
            }
            let link_len = u16::from_le_bytes([prefix[1], prefix[2]]) as usize;
            if link_len < HDLC_LINK_HEADER_SIZE + FIXED_HEADER_SIZE {
                return Err(FrameError::HeaderTooShort {
                    declared: link_len,
                    min: HDLC_LINK_HEADER_SIZE + FIXED_HEADER_SIZE,
                });
            }
            Ok(link_len + 2)
        }
        FrameVariant::Rfs => {
            let declared =
                u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
            if declared < RFS_HEADER_SIZE {
                return Err(FrameError::HeaderTooShort {
                    declared,
                    min: RFS_HEADER_SIZE,
                });
            }
            Ok(declared)
        }
    }
}

fn encode_fixed(msg: &Message) -> Result<BytesMut> {
    let total = FIXED_HEADER_SIZE + msg.payload.len();
    if total > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: msg.payload.len(),
            max: u16::MAX as usize - FIXED_HEADER_SIZE,
        });
    }

    let mut dst = BytesMut::with_capacity(total);
    put_fixed_header(&mut dst, msg, total as u16);
    dst.put_slice(&msg.payload);
    Ok(dst)
}

fn encode_hdlc(msg: &Message) -> Result<BytesMut> {
    let inner = FIXED_HEADER_SIZE + msg.payload.len();
    let link_len = HDLC_LINK_HEADER_SIZE + inner;
    if link_len > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: msg.payload.len(),
            max: u16::MAX as usize - HDLC_LINK_HEADER_SIZE - FIXED_HEADER_SIZE,
        });
    }

    let mut dst = BytesMut::with_capacity(link_len + 2);
    dst.put_u8(HDLC_START);
    dst.put_u16_le(link_len as u16);
    dst.put_u8(0); // reserved
    put_fixed_header(&mut dst, msg, inner as u16);
    dst.put_slice(&msg.payload);
    dst.put_u8(HDLC_END);
    Ok(dst)
}

fn encode_rfs(msg: &Message) -> Result<BytesMut> {
    let total = RFS_HEADER_SIZE + msg.payload.len();
    if total > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: msg.payload.len(),
            max: u32::MAX as usize - RFS_HEADER_SIZE,
        });
    }

    let mut dst = BytesMut::with_capacity(total);
    dst.put_u32_le(total as u32);
    dst.put_u8(msg.index);
    dst.put_u8(msg.mseq);
    dst.put_slice(&msg.payload);
    Ok(dst)
}

fn put_fixed_header(dst: &mut BytesMut, msg: &Message, length: u16) {
    dst.put_u16_le(length);
    dst.put_u8(msg.mseq);
    dst.put_u8(msg.aseq);
    dst.put_u8(msg.group);
    dst.put_u8(msg.index);
    dst.put_u8(msg.kind);
}

fn decode_fixed(buf: &[u8]) -> Result<Message> {
    let declared = declared_frame_len(buf, FrameVariant::Fixed)?;
    if buf.len() < declared {
        return Err(FrameError::LengthMismatch {
            declared,
            available: buf.len(),
        });
    }

    Ok(Message {
        mseq: buf[2],
        aseq: buf[3],
        group: buf[4],
        index: buf[5],
        kind: buf[6],
        payload: Bytes::copy_from_slice(&buf[FIXED_HEADER_SIZE..declared]),
    })
}

fn decode_hdlc(buf: &[u8]) -> Result<Message> {
    if buf.len() < HDLC_MIN_FRAME {
        return Err(FrameError::LengthMismatch {
            declared: HDLC_MIN_FRAME,
            available: buf.len(),
        });
    }
    let total = declared_frame_len(buf, FrameVariant::Hdlc)?;
    if buf.len() < total {
        return Err(FrameError::LengthMismatch {
            declared: total,
            available: buf.len(),
        });
    }
    if buf[total - 1] != HDLC_END {
        return Err(FrameError::MissingEndMarker);
    }

    // The inner header repeats the length without the link overhead; the
    // two must agree or the stream is desynchronized.
    let header = &buf[1 + HDLC_LINK_HEADER_SIZE..];
    let inner = u16::from_le_bytes([header[0], header[1]]) as usize;
    if inner < FIXED_HEADER_SIZE {
        return Err(FrameError::HeaderTooShort {
            declared: inner,
            min: FIXED_HEADER_SIZE,
        });
    }
    if inner + HDLC_LINK_HEADER_SIZE + 2 != total {
        return Err(FrameError::LengthMismatch {
            declared: inner + HDLC_LINK_HEADER_SIZE + 2,
            available: total,
        });
    }

    Ok(Message {
        mseq: header[2],
        aseq: header[3],
        group: header[4],
        index: header[5],
        kind: header[6],
        payload: Bytes::copy_from_slice(&header[FIXED_HEADER_SIZE..inner]),
    })
}

fn decode_rfs(buf: &[u8]) -> Result<Message> {
    let declared = declared_frame_len(buf, FrameVariant::Rfs)?;
    if buf.len() < declared {
        return Err(FrameError::LengthMismatch {
            declared,
            available: buf.len(),
        });
    }

    // The id field carries the request sequence being answered.
    Ok(Message {
        mseq: 0,
        aseq: buf[5],
        group: GROUP_RFS,
        index: buf[4],
        kind: 0,
        payload: Bytes::copy_from_slice(&buf[RFS_HEADER_SIZE..declared]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{GROUP_MISC, GROUP_RFS, RFS_NV_WRITE_ITEM, TYPE_GET};

    fn sample_message() -> Message {
        Message {
            mseq: 0x41,
            aseq: 0x00,
            group: GROUP_MISC,
            index: 0x0b,
            kind: TYPE_GET,
            payload: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        }
    }

    #[test]
    fn fixed_roundtrip() {
        let msg = sample_message();
        let wire = encode(&msg, FrameVariant::Fixed).unwrap();

        assert_eq!(wire.len(), FIXED_HEADER_SIZE + 4);
        assert_eq!(u16::from_le_bytes([wire[0], wire[1]]), 11);

        let decoded = decode(&wire, FrameVariant::Fixed).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn hdlc_roundtrip() {
        let msg = sample_message();
        let wire = encode(&msg, FrameVariant::Hdlc).unwrap();

        assert_eq!(wire[0], HDLC_START);
        assert_eq!(wire[wire.len() - 1], HDLC_END);

        let decoded = decode(&wire, FrameVariant::Hdlc).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn rfs_roundtrip_maps_id_to_aseq() {
        let msg = Message {
            mseq: 0x07,
            aseq: 0,
            group: GROUP_RFS,
            index: RFS_NV_WRITE_ITEM,
            kind: 0,
            payload: Bytes::from_static(b"nvdata"),
        };
        let wire = encode(&msg, FrameVariant::Rfs).unwrap();
        let decoded = decode(&wire, FrameVariant::Rfs).unwrap();

        assert_eq!(decoded.group, GROUP_RFS);
        assert_eq!(decoded.index, RFS_NV_WRITE_ITEM);
        assert_eq!(decoded.aseq, 0x07);
        assert_eq!(decoded.payload.as_ref(), b"nvdata");
    }

    #[test]
    fn empty_payload_roundtrip() {
        for variant in [FrameVariant::Fixed, FrameVariant::Hdlc, FrameVariant::Rfs] {
            let msg = Message {
                payload: Bytes::new(),
                ..sample_message()
            };
            let wire = encode(&msg, variant).unwrap();
            let decoded = decode(&wire, variant).unwrap();
            assert!(decoded.payload.is_empty(), "{}", variant.name());
        }
    }

    #[test]
    fn truncated_frame_is_length_mismatch() {
        let msg = sample_message();
        for variant in [FrameVariant::Fixed, FrameVariant::Hdlc, FrameVariant::Rfs] {
            let wire = encode(&msg, variant).unwrap();
            let err = decode(&wire[..wire.len() - 2], variant).unwrap_err();
            assert!(
                matches!(err, FrameError::LengthMismatch { .. })
                    | matches!(err, FrameError::MissingEndMarker),
                "{}: {err}",
                variant.name()
            );
        }
    }

    #[test]
    fn fixed_declared_shorter_than_header_rejected() {
        let mut wire = encode(&sample_message(), FrameVariant::Fixed).unwrap();
        wire[0] = 3;
        wire[1] = 0;
        let err = decode(&wire, FrameVariant::Fixed).unwrap_err();
        assert!(matches!(err, FrameError::HeaderTooShort { declared: 3, .. }));
    }

    #[test]
    fn hdlc_bad_markers_rejected() {
        let msg = sample_message();
        let good = encode(&msg, FrameVariant::Hdlc).unwrap();

        let mut bad_start = good.clone();
        bad_start[0] = 0x00;
        assert!(matches!(
            decode(&bad_start, FrameVariant::Hdlc).unwrap_err(),
            FrameError::MissingStartMarker
        ));

        let mut bad_end = good.clone();
        let last = bad_end.len() - 1;
        bad_end[last] = 0x00;
        assert!(matches!(
            decode(&bad_end, FrameVariant::Hdlc).unwrap_err(),
            FrameError::MissingEndMarker
        ));
    }

    #[test]
    fn hdlc_inconsistent_inner_length_rejected() {
        let mut wire = encode(&sample_message(), FrameVariant::Hdlc).unwrap();
        // Shrink the inner length while the link length still covers it.
        wire[4] = FIXED_HEADER_SIZE as u8 + 1;
        wire[5] = 0;
        assert!(matches!(
            decode(&wire, FrameVariant::Hdlc).unwrap_err(),
            FrameError::LengthMismatch { .. }
        ));
    }

    #[test]
    fn rfs_declared_shorter_than_header_rejected() {
        let mut wire = encode(
            &Message::request(GROUP_RFS, RFS_NV_WRITE_ITEM, 0, Bytes::new()),
            FrameVariant::Rfs,
        )
        .unwrap();
        wire[0] = 2;
        assert!(matches!(
            decode(&wire, FrameVariant::Rfs).unwrap_err(),
            FrameError::HeaderTooShort { declared: 2, .. }
        ));
    }

    #[test]
    fn declared_frame_len_matches_encoded_size() {
        let msg = sample_message();
        for variant in [FrameVariant::Fixed, FrameVariant::Hdlc, FrameVariant::Rfs] {
            let wire = encode(&msg, variant).unwrap();
            let declared =
                declared_frame_len(&wire[..variant.min_prefix_len()], variant).unwrap();
            assert_eq!(declared, wire.len(), "{}", variant.name());
        }
    }

    #[test]
    fn declared_frame_len_needs_min_prefix() {
        let err = declared_frame_len(&[0x7f, 0x10], FrameVariant::Hdlc).unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { .. }));
    }

    #[test]
    fn oversized_payload_rejected_on_encode() {
        let msg = Message {
            payload: Bytes::from(vec![0u8; u16::MAX as usize]),
            ..sample_message()
        };
        assert!(matches!(
            encode(&msg, FrameVariant::Fixed).unwrap_err(),
            FrameError::PayloadTooLarge { .. }
        ));
        assert!(matches!(
            encode(&msg, FrameVariant::Hdlc).unwrap_err(),
            FrameError::PayloadTooLarge { .. }
        ));
        assert!(encode(&msg, FrameVariant::Rfs).is_ok());
    }

    #[test]
    fn variant_selection_per_device() {
        use bbipc_transport::{ClientKind, DeviceVariant};

        for device in [
            DeviceVariant::Crespo,
            DeviceVariant::H1,
            DeviceVariant::Aries,
            DeviceVariant::Xmm6260,
        ] {
            assert_eq!(
                FrameVariant::for_device(device, ClientKind::Rfs),
                FrameVariant::Rfs
            );
        }
        assert_eq!(
            FrameVariant::for_device(DeviceVariant::Crespo, ClientKind::Fmt),
            FrameVariant::Fixed
        );
        assert_eq!(
            FrameVariant::for_device(DeviceVariant::Aries, ClientKind::Fmt),
            FrameVariant::Fixed
        );
        assert_eq!(
            FrameVariant::for_device(DeviceVariant::H1, ClientKind::Fmt),
            FrameVariant::Hdlc
        );
        assert_eq!(
            FrameVariant::for_device(DeviceVariant::Xmm6260, ClientKind::Fmt),
            FrameVariant::Hdlc
        );
    }
}
