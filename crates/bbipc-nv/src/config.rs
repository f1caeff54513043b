use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default size of the NV parameter blob: 2 MiB.
pub const NV_DATA_SIZE_DEFAULT: usize = 0x200000;

/// Default chunk size for whole-blob file reads.
pub const NV_DATA_CHUNK_SIZE_DEFAULT: usize = 0x1000;

/// Default secret appended to the data before hashing.
pub const NV_DATA_SECRET_DEFAULT: &str = "Samsung_Android_RIL";

/// Locations and parameters of one NV file set.
///
/// Five files make up a set: the primary blob, its digest, the mirrored
/// backup pair, and the one-byte commit-state marker. Defaults match the
/// stock `/efs` layout; deserializable so the CLI can load overrides from a
/// profile file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NvConfig {
    pub data_path: PathBuf,
    pub digest_path: PathBuf,
    pub backup_path: PathBuf,
    pub backup_digest_path: PathBuf,
    pub state_path: PathBuf,
    pub secret: String,
    pub size: usize,
    pub chunk_size: usize,
}

impl Default for NvConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("/efs/nv_data.bin"),
            digest_path: PathBuf::from("/efs/nv_data.bin.md5"),
            backup_path: PathBuf::from("/efs/.nv_data.bak"),
            backup_digest_path: PathBuf::from("/efs/.nv_data.bak.md5"),
            state_path: PathBuf::from("/efs/.nv_state"),
            secret: NV_DATA_SECRET_DEFAULT.to_string(),
            size: NV_DATA_SIZE_DEFAULT,
            chunk_size: NV_DATA_CHUNK_SIZE_DEFAULT,
        }
    }
}

impl NvConfig {
    /// A file set rooted under `dir`, with the stock file names.
    pub fn rooted(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            data_path: dir.join("nv_data.bin"),
            digest_path: dir.join("nv_data.bin.md5"),
            backup_path: dir.join(".nv_data.bak"),
            backup_digest_path: dir.join(".nv_data.bak.md5"),
            state_path: dir.join(".nv_state"),
            ..Self::default()
        }
    }
}
