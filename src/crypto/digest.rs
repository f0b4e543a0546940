//! Message digests

use sha1::{Digest, Sha1};

/// Returns the lowercase hex SHA-1 digest of the input
///
/// Used for short content fingerprints, not for anything
/// collision-sensitive.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}
