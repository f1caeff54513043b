//! Keyed MD5 integrity tags for NV file sets.
//!
//! The tag is MD5 over the data bytes followed by a constant secret string,
//! hex-encoded to a fixed-width text file. This is an integrity check
//! against silent flash corruption, not cryptographic authentication: the
//! secret is a compile-time constant shared with the stock firmware.

use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

/// Width of the hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// Compute the keyed digest of `data`.
pub fn compute(data: &[u8], secret: &str) -> [u8; 16] {
    let mut ctx = Md5::new();
    ctx.update(data);
    ctx.update(secret.as_bytes());
    ctx.finalize().into()
}

/// Compute the keyed digest as its lowercase-hex file representation.
pub fn compute_hex(data: &[u8], secret: &str) -> String {
    hex::encode(compute(data, secret))
}

/// True if `stored` is the digest of `data` under `secret`.
pub fn verify(data: &[u8], secret: &str, stored: &str) -> bool {
    compute_hex(data, secret) == stored
}

/// Read the hex digest stored at `path`.
///
/// Only the first [`DIGEST_HEX_LEN`] bytes count; some writers pad the file
/// with a trailing NUL.
pub fn read_digest_file(path: &Path) -> std::io::Result<String> {
    let mut buf = [0u8; DIGEST_HEX_LEN];
    let mut file = std::fs::File::open(path)?;
    file.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `digest` to `path`, replacing any previous content.
pub fn write_digest_file(path: &Path, digest: &str) -> std::io::Result<()> {
    debug_assert_eq!(digest.len(), DIGEST_HEX_LEN);
    std::fs::write(path, digest)
}
