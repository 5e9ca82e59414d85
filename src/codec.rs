//! Section compression
//!
//! Container sections are compressed with zlib at the highest setting.
//! Callers record both the logical and the stored size next to the data, so
//! the disabled path can hand back the input unchanged and stay transparent
//! to readers.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

use crate::error::{Error, Result};

/// Upper bound for the stored size of a compressed section.
/// Mirrors the worst-case zlib expansion for incompressible input.
fn stored_bound(len: usize) -> usize {
    len + len / 1000 + 64
}

/// Compress `bytes` with zlib, or copy them through when `enabled` is false.
///
/// The compressed output exceeding `stored_bound` indicates a codec bug and
/// is reported as an internal error rather than a user error.
pub fn compress(bytes: &[u8], enabled: bool) -> Result<Vec<u8>> {
    if !enabled {
        return Ok(bytes.to_vec());
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .map_err(|e| Error::Codec(format!("zlib write failed: {}", e)))?;
    let out = encoder
        .finish()
        .map_err(|e| Error::Codec(format!("zlib finish failed: {}", e)))?;

    if out.len() > stored_bound(bytes.len()) {
        return Err(Error::Internal(format!(
            "compressed size {} exceeds bound {} for input of {} bytes",
            out.len(),
            stored_bound(bytes.len()),
            bytes.len()
        )));
    }
    Ok(out)
}
