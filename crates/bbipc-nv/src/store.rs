use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::NvConfig;
use crate::digest;
use crate::error::{NvError, Result};

/// Attempts before a verified rewrite gives up and deletes its target.
pub const WRITE_RETRY_LIMIT: u32 = 5;

/// Consistency summary of one NV file set, as reported by [`NvStore::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvStatus {
    pub primary_present: bool,
    pub primary_size_ok: bool,
    pub digest_match: bool,
    pub backup_present: bool,
    pub backup_size_ok: bool,
    pub state_committed: bool,
}

/// The persisted modem parameter blob and its mirrored backup.
///
/// The store self-heals: size or digest mismatches on the primary trigger a
/// restore from the backup copy, which is authoritative. The backup is only
/// rebuilt from the primary when the backup itself is missing or invalid.
/// Every rewrite of a blob is read back and verified against its digest
/// because the flash on these devices silently truncates writes; the commit
/// marker is written after data and digest on every repair path, so a crash
/// mid-write leaves the marker stale instead of falsely confirming a
/// half-written primary.
///
/// No internal locking: one writer at a time is a caller obligation (the
/// FMT and RFS contexts must serialize access externally).
pub struct NvStore {
    config: NvConfig,
    #[cfg(test)]
    faults: std::cell::RefCell<faults::FaultPlan>,
}

impl NvStore {
    pub fn new(config: NvConfig) -> Self {
        Self {
            config,
            #[cfg(test)]
            faults: Default::default(),
        }
    }

    pub fn config(&self) -> &NvConfig {
        &self.config
    }

    /// Non-mutating consistency report for diagnostics.
    pub fn status(&self) -> NvStatus {
        let size = self.config.size as u64;
        NvStatus {
            primary_present: self.config.data_path.exists(),
            primary_size_ok: file_size(&self.config.data_path) == Some(size),
            digest_match: self.digest_matches(),
            backup_present: self.config.backup_path.exists(),
            backup_size_ok: file_size(&self.config.backup_path) == Some(size),
            state_committed: self.read_state() == Some(b'1'),
        }
    }

    /// Verify the file set and repair what fails.
    ///
    /// Primary-side failures (missing file, wrong size, digest mismatch,
    /// bad state marker) restore from backup; a missing backup pair is
    /// recreated from the primary. At most one restore is attempted per
    /// call. Fails only if the state marker cannot be read afterwards, or
    /// if a repair itself gives up.
    pub fn check(&self) -> Result<()> {
        debug!("checking nv file set");
        let mut restored = false;

        if !self.primary_valid() {
            warn!("nv data missing or wrong size");
            self.restore()?;
            restored = true;
        }

        if !restored && !self.digest_matches() {
            warn!("nv data digest mismatch");
            self.restore()?;
            restored = true;
        }

        if !self.backup_pair_present() {
            warn!("nv backup pair missing");
            self.backup_create()?;
        }

        if !restored && self.read_state() != Some(b'1') {
            warn!("nv state marker missing or not committed");
            self.restore()?;
        }

        match self.read_state() {
            Some(b'1') => {
                debug!("nv file set consistent");
                Ok(())
            }
            _ => Err(NvError::StateUnreadable),
        }
    }

    /// Read `length` bytes at `offset` from the primary blob.
    pub fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        if length == 0 || offset.checked_add(length).is_none_or(|end| end > self.config.size) {
            return Err(NvError::InvalidRange { offset, length });
        }
        self.check()?;
        debug!(offset, length, "nv read");

        let mut file = File::open(&self.config.data_path)?;
        file.seek(SeekFrom::Start(offset as u64))?;

        let mut buf = vec![0u8; length];
        let mut got = 0;
        while got < length {
            let n = file.read(&mut buf[got..])?;
            if n == 0 {
                break;
            }
            got += n;
        }
        if got < length {
            return Err(NvError::ShortRead {
                wanted: length,
                got,
            });
        }
        Ok(buf)
    }

    /// Write `data` at `offset` into the primary blob and refresh its digest.
    ///
    /// A short write restores the primary from backup and reports failure;
    /// the write is not retried; the caller must resend.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        let length = data.len();
        if length == 0 || offset.checked_add(length).is_none_or(|end| end > self.config.size) {
            return Err(NvError::InvalidRange { offset, length });
        }
        self.check()?;
        debug!(offset, length, "nv write");

        let written = self.write_at(offset, data)?;
        if written < length {
            warn!(written, wanted = length, "short nv write, restoring backup");
            if let Err(err) = self.restore() {
                warn!(%err, "restore after short write failed");
            }
            return Err(NvError::ShortWrite {
                wanted: length,
                got: written,
            });
        }

        let blob = self.read_blob(&self.config.data_path)?;
        digest::write_digest_file(
            &self.config.digest_path,
            &digest::compute_hex(&blob, &self.config.secret),
        )?;
        Ok(())
    }

    /// Rebuild the primary from the backup copy.
    ///
    /// When the backup itself is missing or invalid, a fresh primary is
    /// generated and a new backup taken from it instead, never the other
    /// direction.
    pub fn restore(&self) -> Result<()> {
        info!("restoring nv data from backup");

        if !self.backup_valid() {
            warn!("nv backup missing or invalid, generating fresh nv data");
            self.generate()?;
            return self.backup_create();
        }

        let backup = self.read_blob(&self.config.backup_path)?;
        let computed = digest::compute_hex(&backup, &self.config.secret);
        match digest::read_digest_file(&self.config.backup_digest_path) {
            Ok(stored) if stored == computed => {}
            Ok(stored) => {
                warn!(%stored, %computed, "backup digest mismatch, trusting computed value");
            }
            Err(err) => warn!(%err, "backup digest unreadable, trusting computed value"),
        }

        self.write_file_verified(&self.config.data_path, &backup, &computed)?;
        digest::write_digest_file(&self.config.digest_path, &computed)?;
        self.write_state_marker()?;
        info!("nv data restored");
        Ok(())
    }

    /// Rebuild the backup pair from the primary.
    pub fn backup_create(&self) -> Result<()> {
        info!("creating nv data backup");

        if !self.primary_valid() || !self.config.digest_path.exists() {
            warn!("nv data missing or incomplete, generating before backup");
            self.generate()?;
        }

        let primary = self.read_blob(&self.config.data_path)?;
        let computed = digest::compute_hex(&primary, &self.config.secret);
        match digest::read_digest_file(&self.config.digest_path) {
            Ok(stored) if stored == computed => {}
            Ok(stored) => {
                warn!(%stored, %computed, "primary digest mismatch, trusting computed value");
            }
            Err(err) => warn!(%err, "primary digest unreadable, trusting computed value"),
        }

        self.write_file_verified(&self.config.backup_path, &primary, &computed)?;
        digest::write_digest_file(&self.config.backup_digest_path, &computed)?;
        self.write_state_marker()?;
        info!("nv data backup created");
        Ok(())
    }

    /// Create a zero-filled primary of the configured size plus its digest.
    ///
    /// First-bootstrap path, also the fallback when both copies are gone.
    pub fn generate(&self) -> Result<()> {
        info!(size = self.config.size, "generating fresh nv data");
        let data = vec![0u8; self.config.size];

        let written = self.write_file_once(&self.config.data_path, &data)?;
        if written < data.len() {
            return Err(NvError::ShortWrite {
                wanted: data.len(),
                got: written,
            });
        }
        digest::write_digest_file(
            &self.config.digest_path,
            &digest::compute_hex(&data, &self.config.secret),
        )?;
        Ok(())
    }

    fn primary_valid(&self) -> bool {
        file_size(&self.config.data_path) == Some(self.config.size as u64)
    }

    fn backup_valid(&self) -> bool {
        file_size(&self.config.backup_path) == Some(self.config.size as u64)
            && self.config.backup_digest_path.exists()
    }

    fn backup_pair_present(&self) -> bool {
        self.config.backup_path.exists() && self.config.backup_digest_path.exists()
    }

    fn digest_matches(&self) -> bool {
        let stored = match digest::read_digest_file(&self.config.digest_path) {
            Ok(stored) => stored,
            Err(_) => return false,
        };
        match self.read_blob(&self.config.data_path) {
            Ok(data) => digest::verify(&data, &self.config.secret, &stored),
            Err(_) => false,
        }
    }

    fn read_state(&self) -> Option<u8> {
        let mut byte = [0u8; 1];
        let mut file = File::open(&self.config.state_path).ok()?;
        file.read_exact(&mut byte).ok()?;
        Some(byte[0])
    }

    fn write_state_marker(&self) -> Result<()> {
        std::fs::write(&self.config.state_path, b"1")?;
        Ok(())
    }

    /// Read the whole fixed-size blob at `path`, chunk by chunk.
    fn read_blob(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        let mut data = Vec::with_capacity(self.config.size);
        let mut chunk = vec![0u8; self.config.chunk_size];

        while data.len() < self.config.size {
            let want = (self.config.size - data.len()).min(self.config.chunk_size);
            let n = file.read(&mut chunk[..want])?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
        }

        if data.len() < self.config.size {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("blob shorter than {} bytes", self.config.size),
            ));
        }
        Ok(data)
    }

    /// Rewrite `path` until a readback matches `expected`, bounded by
    /// [`WRITE_RETRY_LIMIT`]. On exhaustion the corrupt target is deleted.
    fn write_file_verified(&self, path: &Path, data: &[u8], expected: &str) -> Result<()> {
        for attempt in 1..=WRITE_RETRY_LIMIT {
            debug!(path = %path.display(), attempt, "verified rewrite attempt");

            let written = match self.write_file_once(path, data) {
                Ok(n) => n,
                Err(err) => {
                    warn!(%err, "rewrite failed");
                    continue;
                }
            };
            if written < data.len() {
                warn!(written, wanted = data.len(), "short rewrite");
                continue;
            }

            match self.read_blob(path) {
                Ok(readback) if digest::compute_hex(&readback, &self.config.secret) == expected => {
                    return Ok(())
                }
                Ok(_) => warn!("readback digest mismatch, writing again"),
                Err(err) => warn!(%err, "readback failed"),
            }
        }

        warn!(path = %path.display(), "rewrite failed too many times, deleting target");
        let _ = std::fs::remove_file(path);
        Err(NvError::RetriesExhausted {
            path: path.to_path_buf(),
            tries: WRITE_RETRY_LIMIT,
        })
    }

    fn write_file_once(&self, path: &Path, data: &[u8]) -> std::io::Result<usize> {
        #[cfg(test)]
        if self.faults.borrow_mut().take(path) {
            let half = data.len() / 2;
            std::fs::write(path, &data[..half])?;
            return Ok(half);
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(data)?;
        Ok(data.len())
    }

    /// One positioned write into the primary, no retry: the caller decides
    /// what a short result means.
    fn write_at(&self, offset: usize, data: &[u8]) -> std::io::Result<usize> {
        #[cfg(test)]
        if self.faults.borrow_mut().take(&self.config.data_path) {
            return Ok(data.len() / 2);
        }

        let mut file = OpenOptions::new().write(true).open(&self.config.data_path)?;
        file.seek(SeekFrom::Start(offset as u64))?;
        file.write(data)
    }

    #[cfg(test)]
    fn inject_short_writes(&self, path: &Path, count: usize) {
        self.faults.borrow_mut().arm(path, count);
    }
}

fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}
