//! Non-volatile modem parameter store.
//!
//! A fixed-size binary blob holds the baseband's persisted configuration,
//! guarded by a keyed MD5 digest, a mirrored backup copy and a one-byte
//! commit-state marker. Consistency checks self-heal from the backup; the
//! only unrecoverable outcome is a rewrite that keeps failing verification,
//! in which case the corrupt file is deleted and the failure surfaced.
//!
//! Serviced over IPC by the RFS message group (see `bbipc-client`).

pub mod config;
pub mod digest;
pub mod error;
pub mod store;

pub use config::{
    NvConfig, NV_DATA_CHUNK_SIZE_DEFAULT, NV_DATA_SECRET_DEFAULT, NV_DATA_SIZE_DEFAULT,
};
pub use error::{NvError, Result};
pub use store::{NvStatus, NvStore, WRITE_RETRY_LIMIT};
