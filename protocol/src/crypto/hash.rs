//! # Hashing Utilities
//!
//! The three digests the Ark v1 wire format is built on:
//!
//! - **SHA-256** -- passphrase to private scalar, the ECDSA message digest,
//!   and the transaction id.
//! - **double SHA-256** -- the 4-byte Base58Check checksum on addresses and
//!   WIF strings (computed inside `bs58`, exposed here for tests and tools).
//! - **RIPEMD-160** -- public key to address payload.
//!
//! There is deliberately no choice of hash function anywhere in this crate.
//! The network decides; we comply.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use sbx_protocol::crypto::sha256;
///
/// let hash = sha256(b"mysecret");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the RIPEMD-160 hash of the input data.
///
/// Addresses hash the compressed public key with RIPEMD-160 *directly*,
/// without the SHA-256 pre-image step Bitcoin's `hash160` uses.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn double_sha256_differs_from_single() {
        let data = b"transaction bytes";
        assert_ne!(sha256(data), double_sha256(data));
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
    }

    #[test]
    fn ripemd160_known_vector() {
        assert_eq!(
            hex::encode(ripemd160(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn empty_input_is_fine() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
