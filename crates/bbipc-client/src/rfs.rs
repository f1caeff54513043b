//! RFS dispatch: servicing the modem's NV-data requests.
//!
//! The modem reads and writes its parameter blob through the host. Every
//! parseable request gets exactly one confirm back; on failure a confirm
//! with the success flag cleared, never silence, because the modem firmware
//! stalls waiting for it. Unparseable requests are logged and dropped
//! without a confirm; there is no trustworthy offset/length to echo.

use bbipc_frame::command::{GROUP_RFS, RFS_NV_READ_ITEM, RFS_NV_WRITE_ITEM};
use bbipc_frame::{Message, RfsIoConfirm, RfsIoRequest};
use bbipc_nv::NvStore;
use bbipc_transport::ModemTransport;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::client::IpcClient;
use crate::error::Result;

/// Route one RFS message to its handler. Non-NV commands are ignored.
pub fn handle_rfs_message<T: ModemTransport>(
    client: &mut IpcClient<T>,
    store: &NvStore,
    msg: &Message,
) -> Result<()> {
    match msg.index {
        RFS_NV_READ_ITEM => handle_nv_read_item(client, store, msg),
        RFS_NV_WRITE_ITEM => handle_nv_write_item(client, store, msg),
        other => {
            debug!(command = other, "ignoring unhandled rfs command");
            Ok(())
        }
    }
}

/// Receive the next message and dispatch it if it belongs to the RFS group.
pub fn serve_next<T: ModemTransport>(
    client: &mut IpcClient<T>,
    store: &NvStore,
) -> Result<()> {
    let msg = client.recv()?;
    if msg.group != GROUP_RFS {
        debug!(group = msg.group_name(), "ignoring non-rfs message");
        return Ok(());
    }
    handle_rfs_message(client, store, &msg)
}

/// NV read request: `{offset, length}` in, confirm + data out.
pub fn handle_nv_read_item<T: ModemTransport>(
    client: &mut IpcClient<T>,
    store: &NvStore,
    msg: &Message,
) -> Result<()> {
    let request = match RfsIoRequest::parse_read(&msg.payload) {
        Ok(request) => request,
        Err(err) => {
            warn!(aseq = msg.aseq, %err, "invalid nv read request");
            return Ok(());
        }
    };

    info!(
        offset = request.offset,
        length = request.length,
        "modem asked to read nv data"
    );

    let confirm = match store.read(request.offset as usize, request.length as usize) {
        Ok(data) => RfsIoConfirm::success(request.offset, request.length, data.into()),
        Err(err) => {
            warn!(%err, "nv read failed");
            // The confirm still carries a data region of the requested
            // length, zero-filled, as long as the claim is within the blob.
            let fill = if (request.length as usize) <= store.config().size {
                request.length as usize
            } else {
                0
            };
            RfsIoConfirm::failure(request.offset, request.length, vec![0u8; fill].into())
        }
    };

    send_confirm(client, msg, RFS_NV_READ_ITEM, confirm)
}

/// NV write request: `{offset, length, data}` in, data-less confirm out.
pub fn handle_nv_write_item<T: ModemTransport>(
    client: &mut IpcClient<T>,
    store: &NvStore,
    msg: &Message,
) -> Result<()> {
    let request = match RfsIoRequest::parse_write(&msg.payload) {
        Ok(request) => request,
        Err(err) => {
            warn!(aseq = msg.aseq, %err, "invalid nv write request");
            return Ok(());
        }
    };

    info!(
        offset = request.offset,
        length = request.length,
        "modem asked to write nv data"
    );

    let confirm = match store.write(request.offset as usize, &request.data) {
        Ok(()) => RfsIoConfirm::success(request.offset, request.length, Bytes::new()),
        Err(err) => {
            warn!(%err, "nv write failed");
            RfsIoConfirm::failure(request.offset, request.length, Bytes::new())
        }
    };

    send_confirm(client, msg, RFS_NV_WRITE_ITEM, confirm)
}

fn send_confirm<T: ModemTransport>(
    client: &mut IpcClient<T>,
    request: &Message,
    index: u8,
    confirm: RfsIoConfirm,
) -> Result<()> {
    debug!(confirm = confirm.confirm, "sending rfs io confirm");
    let mut reply = Message {
        // The confirm echoes the request id on the wire.
        mseq: request.aseq,
        aseq: 0,
        group: GROUP_RFS,
        index,
        kind: 0,
        payload: confirm.to_payload(),
    };
    client.send(&mut reply)
}

#[cfg(test)]
mod tests {
    use bbipc_frame::codec::{self, FrameVariant};
    use bbipc_nv::NvConfig;
    use bbipc_transport::{ClientKind, DeviceVariant};

    use super::*;
    use crate::client::mock::MockTransport;

    const TEST_SIZE: usize = 1024;

    fn rfs_client(transport: MockTransport) -> IpcClient<MockTransport> {
        IpcClient::new(DeviceVariant::Crespo, ClientKind::Rfs, transport)
    }

    fn test_store(dir: &std::path::Path) -> NvStore {
        let store = NvStore::new(NvConfig {
            size: TEST_SIZE,
            chunk_size: 128,
            ..NvConfig::rooted(dir)
        });
        store.check().unwrap();
        store
    }

    fn rfs_request(index: u8, id: u8, payload: Bytes) -> Message {
        Message {
            mseq: 0,
            aseq: id,
            group: GROUP_RFS,
            index,
            kind: 0,
            payload,
        }
    }

    fn sent_confirm(client: &mut IpcClient<MockTransport>) -> (Message, RfsIoConfirm) {
        let wire = std::mem::take(&mut client.transport_mut().written);
        let reply = codec::decode(&wire, FrameVariant::Rfs).unwrap();
        let confirm = RfsIoConfirm::parse(&reply.payload).unwrap();
        (reply, confirm)
    }

    #[test]
    fn write_then_read_through_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let mut client = rfs_client(MockTransport::default());

        let write = RfsIoRequest {
            offset: 0x10,
            length: 4,
            data: Bytes::from_static(&[0xaa, 0xbb, 0xcc, 0xdd]),
        };
        let msg = rfs_request(RFS_NV_WRITE_ITEM, 0x21, write.to_payload());
        handle_rfs_message(&mut client, &store, &msg).unwrap();

        let (reply, confirm) = sent_confirm(&mut client);
        assert_eq!(reply.index, RFS_NV_WRITE_ITEM);
        assert_eq!(reply.aseq, 0x21);
        assert_eq!(confirm.confirm, 1);
        assert_eq!((confirm.offset, confirm.length), (0x10, 4));
        assert!(confirm.data.is_empty());

        let read = RfsIoRequest {
            offset: 0x10,
            length: 4,
            data: Bytes::new(),
        };
        let msg = rfs_request(RFS_NV_READ_ITEM, 0x22, read.to_payload());
        handle_rfs_message(&mut client, &store, &msg).unwrap();

        let (reply, confirm) = sent_confirm(&mut client);
        assert_eq!(reply.index, RFS_NV_READ_ITEM);
        assert_eq!(confirm.confirm, 1);
        assert_eq!(confirm.data.as_ref(), &[0xaa, 0xbb, 0xcc, 0xdd]);
    }

    #[test]
    fn failed_read_still_confirms() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let mut client = rfs_client(MockTransport::default());

        // Out-of-range read: the store refuses, the modem still hears back.
        let read = RfsIoRequest {
            offset: TEST_SIZE as u32,
            length: 8,
            data: Bytes::new(),
        };
        let msg = rfs_request(RFS_NV_READ_ITEM, 0x31, read.to_payload());
        handle_nv_read_item(&mut client, &store, &msg).unwrap();

        let (reply, confirm) = sent_confirm(&mut client);
        assert_eq!(reply.aseq, 0x31);
        assert_eq!(confirm.confirm, 0);
        assert_eq!((confirm.offset, confirm.length), (TEST_SIZE as u32, 8));
        assert_eq!(confirm.data.as_ref(), &[0u8; 8]);
    }

    #[test]
    fn failed_write_still_confirms() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let mut client = rfs_client(MockTransport::default());

        let write = RfsIoRequest {
            offset: (TEST_SIZE - 2) as u32,
            length: 4,
            data: Bytes::from_static(&[1, 2, 3, 4]),
        };
        let msg = rfs_request(RFS_NV_WRITE_ITEM, 0x32, write.to_payload());
        handle_nv_write_item(&mut client, &store, &msg).unwrap();

        let (_, confirm) = sent_confirm(&mut client);
        assert_eq!(confirm.confirm, 0);
    }

    #[test]
    fn unparseable_request_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let mut client = rfs_client(MockTransport::default());

        let msg = rfs_request(RFS_NV_READ_ITEM, 0x33, Bytes::from_static(&[0x01, 0x02]));
        handle_nv_read_item(&mut client, &store, &msg).unwrap();
        assert!(client.transport_mut().written.is_empty());

        let msg = rfs_request(RFS_NV_WRITE_ITEM, 0x34, Bytes::from_static(&[0x01]));
        handle_nv_write_item(&mut client, &store, &msg).unwrap();
        assert!(client.transport_mut().written.is_empty());
    }

    #[test]
    fn truncated_write_data_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let mut client = rfs_client(MockTransport::default());

        // Claims 16 data bytes, carries 4.
        let mut payload = Vec::new();
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&16u32.to_le_bytes());
        payload.extend_from_slice(&[9, 9, 9, 9]);

        let msg = rfs_request(RFS_NV_WRITE_ITEM, 0x35, payload.into());
        handle_nv_write_item(&mut client, &store, &msg).unwrap();
        assert!(client.transport_mut().written.is_empty());
    }

    #[test]
    fn unhandled_rfs_command_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let mut client = rfs_client(MockTransport::default());

        let msg = rfs_request(0x55, 0x36, Bytes::new());
        handle_rfs_message(&mut client, &store, &msg).unwrap();
        assert!(client.transport_mut().written.is_empty());
    }

    #[test]
    fn serve_next_round_trips_over_the_wire() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let write = RfsIoRequest {
            offset: 0x40,
            length: 2,
            data: Bytes::from_static(&[0x12, 0x34]),
        };
        // The incoming request as the modem frames it: id in the header.
        let request = Message {
            mseq: 0x44,
            aseq: 0,
            group: GROUP_RFS,
            index: RFS_NV_WRITE_ITEM,
            kind: 0,
            payload: write.to_payload(),
        };
        let wire = codec::encode(&request, FrameVariant::Rfs).unwrap();

        let mut client = rfs_client(MockTransport::with_reads(vec![wire.to_vec()]));
        serve_next(&mut client, &store).unwrap();

        let (reply, confirm) = sent_confirm(&mut client);
        // The confirm goes out under the id the request carried.
        assert_eq!(reply.aseq, 0x44);
        assert_eq!(confirm.confirm, 1);
        assert_eq!(store.read(0x40, 2).unwrap(), vec![0x12, 0x34]);
    }
}
