//! # Digital Signatures
//!
//! ECDSA over secp256k1, the way the SBX nodes check it: the signed value is
//! `SHA-256(message)`, the nonce follows RFC 6979, `s` is normalized to the
//! lower half of the curve order and the result is DER encoded.
//!
//! These are thin wrappers around [`PrivateKey::sign`] and
//! [`PublicKey::verify`] so every signing call site in the crate goes through
//! one audited place.

use super::keys::{KeyPair, PublicKey, Signature};

/// Sign a message with a key pair.
///
/// Deterministic: the same key pair and message always produce the same
/// DER bytes.
///
/// # Example
///
/// ```
/// use sbx_protocol::crypto::{sign, verify, KeyPair};
///
/// let keys = KeyPair::from_passphrase("my secret").unwrap();
/// let signature = sign(&keys, b"send 10 SBX");
/// assert!(verify(keys.public_key(), b"send 10 SBX", &signature));
/// ```
pub fn sign(keys: &KeyPair, message: &[u8]) -> Signature {
    keys.private_key().sign(message)
}

/// Verify a signature against a public key and message.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let keys = KeyPair::from_passphrase("my secret").unwrap();
        let sig = sign(&keys, b"payload");
        assert!(verify(keys.public_key(), b"payload", &sig));
    }

    #[test]
    fn signature_is_low_s_der() {
        let keys = KeyPair::from_passphrase("my secret").unwrap();
        for i in 0..16u8 {
            let sig = sign(&keys, &[i; 40]);
            let bytes = sig.as_bytes();
            assert_eq!(bytes[0], 0x30);
            assert_eq!(bytes[1] as usize + 2, bytes.len());
            // A low-S value never needs a 33rd byte for its sign bit.
            let r_len = bytes[3] as usize;
            let s_len = bytes[5 + r_len] as usize;
            assert!(s_len <= 32);
        }
    }

    #[test]
    fn tampered_message_fails() {
        let keys = KeyPair::from_passphrase("my secret").unwrap();
        let sig = sign(&keys, b"payload");
        assert!(!verify(keys.public_key(), b"payloae", &sig));
    }
}
