//! Transport capability set for baseband modem chips.
//!
//! Each supported chip family exposes its IPC channels as character-device
//! nodes; this crate wraps them behind the [`ModemTransport`] trait so the
//! framing and client layers never touch a descriptor directly. Also home to
//! the wake-lock guard used while blocked on modem-originated data.
//!
//! This is the lowest layer of bbipc. Everything else builds on top of the
//! [`ModemTransport`] trait provided here.

pub mod device;
pub mod error;
pub mod traits;
pub mod wakelock;

pub use device::{DeviceConfig, DeviceTransport, DeviceVariant};
pub use error::{Result, TransportError};
pub use traits::{ClientKind, ModemTransport};
pub use wakelock::{WakeLock, WakeLockPaths};
