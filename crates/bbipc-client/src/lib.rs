//! IPC client orchestration for baseband modems.
//!
//! Ties the layers together: frames go out and come back through the
//! [`bbipc_transport::ModemTransport`] capability set, encoded per device
//! family by `bbipc-frame`, and RFS-group traffic is serviced against the
//! `bbipc-nv` parameter store. The bootstrap sequence that cold-boots the
//! modem runs before any client is built and is not part of this crate.

pub mod client;
pub mod error;
pub mod rfs;

pub use client::{IpcClient, MAX_FRAME_SIZE};
pub use error::{ClientError, Result};
pub use rfs::{handle_nv_read_item, handle_nv_write_item, handle_rfs_message, serve_next};
