use bbipc_frame::{codec, FrameVariant, Message};
use bbipc_transport::{ClientKind, DeviceVariant, ModemTransport, WakeLock, WakeLockPaths};
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

/// Hard ceiling on a received frame. A desynchronized stream read as a
/// length field must not turn into a giant allocation.
pub const MAX_FRAME_SIZE: usize = 0x50000;

/// One IPC connection to the modem, either the FMT or the RFS channel.
///
/// Owns the transport, the frame variant the device family speaks on this
/// channel, and the request sequence counter. Used by one thread at a time;
/// a typical setup runs one FMT and one RFS client on separate threads,
/// each with its own transport.
pub struct IpcClient<T> {
    transport: T,
    device: DeviceVariant,
    kind: ClientKind,
    variant: FrameVariant,
    wake_lock_paths: WakeLockPaths,
    seq: u8,
}

impl<T: ModemTransport> IpcClient<T> {
    pub fn new(device: DeviceVariant, kind: ClientKind, transport: T) -> Self {
        Self {
            transport,
            device,
            kind,
            variant: FrameVariant::for_device(device, kind),
            wake_lock_paths: WakeLockPaths::default(),
            seq: 0,
        }
    }

    /// Override the wake-lock attribute locations (tests, non-Android hosts).
    pub fn with_wake_lock_paths(mut self, paths: WakeLockPaths) -> Self {
        self.wake_lock_paths = paths;
        self
    }

    pub fn device(&self) -> DeviceVariant {
        self.device
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Open the transport for this client's channel.
    pub fn connect(&mut self) -> Result<()> {
        self.transport.open(self.kind)?;
        Ok(())
    }

    pub fn disconnect(&mut self) -> Result<()> {
        self.transport.close()?;
        Ok(())
    }

    pub fn power_on(&mut self) -> Result<()> {
        self.transport.power_on()?;
        Ok(())
    }

    pub fn power_off(&mut self) -> Result<()> {
        self.transport.power_off()?;
        Ok(())
    }

    /// Encode `msg` and hand it to the transport in one write.
    ///
    /// A message without a sequence number gets the next one stamped;
    /// replies that already carry one (RFS confirms echoing the request id)
    /// go out unchanged. Transport failures are returned as-is; retry
    /// policy belongs to the caller.
    pub fn send(&mut self, msg: &mut Message) -> Result<()> {
        if msg.mseq == 0 {
            msg.mseq = self.next_seq();
        }

        let frame = codec::encode(msg, self.variant)?;
        debug!(
            kind = self.kind.as_str(),
            group = msg.group_name(),
            command = msg.command(),
            mseq = msg.mseq,
            aseq = msg.aseq,
            length = frame.len(),
            "send"
        );

        let written = self.transport.write(&frame)?;
        if written < frame.len() {
            return Err(ClientError::ShortSend {
                wanted: frame.len(),
                got: written,
            });
        }
        Ok(())
    }

    /// Receive one complete message.
    ///
    /// Reads the header prefix to learn the declared frame length, then the
    /// remainder into a buffer sized from that declaration. Holds the
    /// wake-lock for the whole receive on families that need it; the guard
    /// releases on every exit path, errors included.
    pub fn recv(&mut self) -> Result<Message> {
        let _wake_lock = self
            .device
            .needs_wake_lock()
            .then(|| WakeLock::acquire(&self.wake_lock_paths, &self.device.wake_lock_tag(self.kind)));

        let mut buf = vec![0u8; self.variant.min_prefix_len()];
        self.read_exact(&mut buf)?;

        let declared = codec::declared_frame_len(&buf, self.variant)?;
        if declared > MAX_FRAME_SIZE {
            return Err(ClientError::OversizedFrame {
                size: declared,
                max: MAX_FRAME_SIZE,
            });
        }

        if declared > buf.len() {
            let prefix = buf.len();
            buf.resize(declared, 0);
            self.read_exact(&mut buf[prefix..])?;
        }

        let msg = codec::decode(&buf, self.variant)?;
        debug!(
            kind = self.kind.as_str(),
            group = msg.group_name(),
            command = msg.command(),
            mseq = msg.mseq,
            aseq = msg.aseq,
            length = msg.payload.len(),
            "recv"
        );
        Ok(msg)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut got = 0;
        while got < buf.len() {
            let n = self.transport.read(&mut buf[got..])?;
            if n == 0 {
                return Err(ClientError::Disconnected);
            }
            trace!(n, "transport read");
            got += n;
        }
        Ok(())
    }

    fn next_seq(&mut self) -> u8 {
        // 0 marks an unstamped message, so the counter skips it.
        self.seq = self.seq.wrapping_add(1);
        if self.seq == 0 {
            self.seq = 1;
        }
        self.seq
    }
}
