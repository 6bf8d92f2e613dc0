//! Stable numeric point identifiers derived from file names.

use sha2::{Digest, Sha256};

/// Identifiers are reduced into `[0, 10^16)`.
pub const ID_MODULUS: u64 = 10_000_000_000_000_000;

/// Derive the point identifier for a file name.
///
/// The SHA-256 digest of the UTF-8 name is read as one big-endian integer and
/// reduced modulo 10^16. Only the base name participates, so two files named
/// `notes.md` in different directories map to the same point.
pub fn id_for(file_name: &str) -> u64 {
    let digest = Sha256::digest(file_name.as_bytes());
    let modulus = u128::from(ID_MODULUS);
    let reduced =
        digest.iter().fold(0u128, |acc, byte| (acc * 256 + u128::from(*byte)) % modulus);
    reduced as u64
}
