//! File checksums
//!
//! Published download lists carry MD5 values, so that is what is computed.

use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Hex MD5 of a file's contents, read in chunks
pub fn md5_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Drop one leading `\` from a checksum string
///
/// `md5sum` prefixes its output line with `\` when the file name needed
/// escaping; the marker is not part of the digest.
pub fn strip_continuation_marker(checksum: &str) -> &str {
    checksum.strip_prefix('\\').unwrap_or(checksum)
}
