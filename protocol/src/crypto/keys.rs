//! # Key Management
//!
//! secp256k1 key material for SBX accounts: passphrase derivation, WIF
//! import/export, compressed public keys and DER-encoded ECDSA signatures.
//!
//! ## Derivation
//!
//! ```text
//! passphrase (UTF-8) --SHA-256--> private scalar --k*G--> public key (33 bytes, compressed)
//! ```
//!
//! A passphrase behaves like a pure function of a string: the same words on
//! any machine give the same key pair. There is no keyring, no cache and no
//! global state. A key pair is created for one signing call and dropped.
//!
//! ## Security considerations
//!
//! - [`PrivateKey`] erases its scalar on drop. Intermediate buffers holding
//!   secret bytes (passphrase digests, decoded WIF payloads) are wrapped in
//!   [`Zeroizing`].
//! - Key bytes are never logged and never appear in `Debug` output.

use secp256k1::{ecdsa, Message, PublicKey as SecpPublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

use super::hash::sha256;
use crate::config::{is_known_wif, Network, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH};
use crate::identity::Address;

/// Errors that can occur during key operations.
///
/// Messages describe the shape of the problem, never the key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// A WIF string failed Base58Check decoding, has the wrong length, or
    /// carries a version byte the target network does not use.
    #[error("invalid private key encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid secret key: not a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 private scalar.
///
/// Does not implement `Serialize`. Exporting a key is an explicit call to
/// [`PrivateKey::to_wif`].
#[derive(Clone)]
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Derives the private key of a passphrase: `SHA-256(passphrase)`.
    ///
    /// Fails only if the digest is zero or not below the curve order, which
    /// has probability around 2^-128.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, KeyError> {
        let digest = Zeroizing::new(sha256(passphrase.as_bytes()));
        Self::from_bytes(digest.as_slice())
    }

    /// Wraps a raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        SecretKey::from_slice(bytes)
            .map(|secret| Self { secret })
            .map_err(|_| KeyError::InvalidSecretKey)
    }

    /// Imports a WIF string made for any known network: the built-in ones or
    /// Ark mainnet. Use [`from_wif_for`](Self::from_wif_for) to pin one.
    ///
    /// # Errors
    ///
    /// [`KeyError::InvalidEncoding`] on a bad checksum or payload shape, or
    /// on a version byte no known network uses.
    ///
    /// # Example
    ///
    /// ```
    /// use sbx_protocol::crypto::PrivateKey;
    ///
    /// let key = PrivateKey::from_wif("SCxryiz5hhkfJ4bZ7RGVzkdLqyvU7UfNFaT1ak9Gg9PSeqCAWy3h").unwrap();
    /// let same = PrivateKey::from_passphrase("mysecret").unwrap();
    /// assert_eq!(key.public_key(), same.public_key());
    /// ```
    pub fn from_wif(encoded: &str) -> Result<Self, KeyError> {
        let (tag, key) = decode_wif(encoded)?;
        if !is_known_wif(tag) {
            return Err(KeyError::InvalidEncoding(format!(
                "unrecognized WIF version 0x{:02x}",
                tag
            )));
        }
        Ok(key)
    }

    /// Imports a WIF string and requires its version byte to be `network.wif`.
    pub fn from_wif_for(encoded: &str, network: &Network) -> Result<Self, KeyError> {
        let (tag, key) = decode_wif(encoded)?;
        if tag != network.wif {
            return Err(KeyError::InvalidEncoding(format!(
                "WIF version 0x{:02x} is not used by network {} (expected 0x{:02x})",
                tag, network.name, network.wif
            )));
        }
        Ok(key)
    }

    /// Exports the key in compressed WIF form for `network`.
    pub fn to_wif(&self, network: &Network) -> String {
        let secret = Zeroizing::new(self.secret.secret_bytes());
        let mut payload = Zeroizing::new(Vec::with_capacity(PRIVATE_KEY_LENGTH + 2));
        payload.push(network.wif);
        payload.extend_from_slice(secret.as_slice());
        payload.push(0x01);
        bs58::encode(payload.as_slice()).with_check().into_string()
    }

    /// The compressed public key of this scalar.
    pub fn public_key(&self) -> PublicKey {
        let secp = Secp256k1::signing_only();
        PublicKey {
            inner: SecpPublicKey::from_secret_key(&secp, &self.secret),
        }
    }

    /// Signs `SHA-256(message)`.
    ///
    /// The nonce comes from RFC 6979, so the same key and message always
    /// yield the same DER bytes. The signature is normalized to low-S.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.sign_digest(sha256(message))
    }

    /// Signs an already computed 32-byte digest.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Signature {
        let secp = Secp256k1::signing_only();
        let mut signature = secp.sign_ecdsa(&Message::from_digest(digest), &self.secret);
        signature.normalize_s();
        Signature {
            der: signature.serialize_der().to_vec(),
        }
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(pub={})", self.public_key())
    }
}

impl PartialEq for PrivateKey {
    /// Compared through the public key, never through the secret bytes.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for PrivateKey {}

/// Splits a WIF string into its version byte and key.
fn decode_wif(encoded: &str) -> Result<(u8, PrivateKey), KeyError> {
    let payload = Zeroizing::new(
        bs58::decode(encoded.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?,
    );

    // version || scalar, optionally followed by the 0x01 compression flag.
    let key_bytes = match payload.len() {
        n if n == PRIVATE_KEY_LENGTH + 1 => &payload[1..],
        n if n == PRIVATE_KEY_LENGTH + 2 && payload[n - 1] == 0x01 => &payload[1..n - 1],
        n => {
            return Err(KeyError::InvalidEncoding(format!(
                "unexpected WIF payload length {}",
                n
            )))
        }
    };

    let key = PrivateKey::from_bytes(key_bytes)
        .map_err(|_| KeyError::InvalidEncoding("payload is not a valid scalar".to_string()))?;
    Ok((payload[0], key))
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A compressed (33-byte) secp256k1 public key.
///
/// Always a valid curve point: every constructor goes through libsecp256k1.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    inner: SecpPublicKey,
}

impl PublicKey {
    /// Parses a compressed or uncompressed SEC1 encoding.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        SecpPublicKey::from_slice(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))
    }

    /// Parses a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// The compressed SEC1 encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.inner.serialize()
    }

    /// Lowercase hex of the compressed encoding. 66 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The address of this key on `network`.
    pub fn to_address(&self, network: &Network) -> Address {
        Address::from_public_key(self, network)
    }

    /// Verifies a DER signature over `SHA-256(message)`.
    ///
    /// High-S signatures are normalized first, so a signature produced by a
    /// less strict signer still verifies.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(mut sig) = ecdsa::Signature::from_der(&signature.der) else {
            return false;
        };
        sig.normalize_s();
        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&Message::from_digest(sha256(message)), &sig, &self.inner)
            .is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A strict-DER encoded ECDSA signature (8 to 72 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    der: Vec<u8>,
}

impl Signature {
    /// Parses strict DER bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self, KeyError> {
        ecdsa::Signature::from_der(bytes)
            .map(|_| Self { der: bytes.to_vec() })
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|e| KeyError::InvalidSignature(e.to_string()))?;
        Self::from_der(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.der)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() > 16 {
            write!(
                f,
                "Signature({}...{})",
                &hex_str[..8],
                &hex_str[hex_str.len() - 8..]
            )
        } else {
            write!(f, "Signature({})", hex_str)
        }
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// KeyPair & Credential
// ---------------------------------------------------------------------------

/// A private key together with its public key.
///
/// Built per signing call and dropped at the end of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn from_passphrase(passphrase: &str) -> Result<Self, KeyError> {
        PrivateKey::from_passphrase(passphrase).map(Self::from_private_key)
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.private_key.sign(message)
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key.verify(message, signature)
    }
}

/// What a caller signs with: a passphrase or an already imported key.
#[derive(Clone)]
pub enum Credential {
    Passphrase(Zeroizing<String>),
    PrivateKey(PrivateKey),
}

impl Credential {
    /// Derives the key pair this credential stands for.
    pub fn key_pair(&self) -> Result<KeyPair, KeyError> {
        match self {
            Self::Passphrase(passphrase) => KeyPair::from_passphrase(passphrase),
            Self::PrivateKey(key) => Ok(KeyPair::from_private_key(key.clone())),
        }
    }
}

impl From<&str> for Credential {
    fn from(passphrase: &str) -> Self {
        Self::Passphrase(Zeroizing::new(passphrase.to_string()))
    }
}

impl From<String> for Credential {
    fn from(passphrase: String) -> Self {
        Self::Passphrase(Zeroizing::new(passphrase))
    }
}

impl From<PrivateKey> for Credential {
    fn from(key: PrivateKey) -> Self {
        Self::PrivateKey(key)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passphrase(_) => write!(f, "Credential::Passphrase(<redacted>)"),
            Self::PrivateKey(key) => write!(f, "Credential::PrivateKey({:?})", key),
        }
    }
}
