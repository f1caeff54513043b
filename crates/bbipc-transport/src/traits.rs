use crate::error::Result;

/// Which modem channel a client handle owns.
///
/// FMT carries formatted control/status commands; RFS carries remote
/// filesystem (NV-data) traffic. Each kind maps to its own device node and
/// is used by one thread at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    Fmt,
    Rfs,
}

impl ClientKind {
    /// Short name used in wake-lock tags and trace output.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientKind::Fmt => "fmt",
            ClientKind::Rfs => "rfs",
        }
    }
}

/// The capability set a device family implements to move bytes to and from
/// the baseband.
///
/// Replaces the per-device table of function pointers: each family provides
/// one implementation, selected at configuration time and passed into the
/// IPC client constructor. All operations are synchronous and may block the
/// calling thread; callers own serialization (one thread per handle).
pub trait ModemTransport {
    /// Open the descriptor backing `kind`. Must be called before any I/O.
    fn open(&mut self, kind: ClientKind) -> Result<()>;

    /// Close the descriptor. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Read up to `buf.len()` bytes. Returns the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write `buf`. Returns the number of bytes written.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Power the modem processor on.
    fn power_on(&mut self) -> Result<()>;

    /// Power the modem processor off.
    fn power_off(&mut self) -> Result<()>;
}
