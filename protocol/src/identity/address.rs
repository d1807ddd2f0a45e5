//! # Addresses
//!
//! An address is the public, network-specific name of an account:
//!
//! ```text
//! public_key (33 bytes, compressed)
//!     -> RIPEMD-160(public_key)                 -> 20 bytes
//!     -> network.version || hash                -> 21 bytes
//!     -> Base58Check(payload)                   -> "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi"
//! ```
//!
//! The leading character is a function of the version byte, which is why
//! every alphanet address starts with `X`. One public key maps to exactly one
//! address per network; the 4-byte checksum catches typos.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{Network, ADDRESS_LENGTH};
use crate::crypto::hash::ripemd160;
use crate::crypto::keys::PublicKey;

/// Errors that can occur while decoding an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Not Base58, or the checksum does not match.
    #[error("base58check decode error: {0}")]
    Base58(String),

    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// The address belongs to another network.
    #[error("address version 0x{got:02x} does not match network version 0x{expected:02x}")]
    WrongVersion { expected: u8, got: u8 },
}

/// A decoded address: version byte plus RIPEMD-160 of the public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    version: u8,
    hash: [u8; 20],
}

impl Address {
    /// Derive the address of `public_key` on `network`.
    pub fn from_public_key(public_key: &PublicKey, network: &Network) -> Self {
        Self {
            version: network.version,
            hash: ripemd160(&public_key.to_bytes()),
        }
    }

    /// Decode an address without checking which network it belongs to.
    pub fn decode(text: &str) -> Result<Self, AddressError> {
        let payload = bs58::decode(text)
            .with_check(None)
            .into_vec()
            .map_err(|e| AddressError::Base58(e.to_string()))?;
        Self::from_bytes(&payload)
    }

    /// Decode an address and require it to carry `network.version`.
    pub fn parse_for(text: &str, network: &Network) -> Result<Self, AddressError> {
        let address = Self::decode(text)?;
        if address.version != network.version {
            return Err(AddressError::WrongVersion {
                expected: network.version,
                got: address.version,
            });
        }
        Ok(address)
    }

    /// `true` if `text` is a well-formed address of `network`.
    ///
    /// Never panics and never errors: malformed input is simply `false`.
    ///
    /// # Example
    ///
    /// ```
    /// use sbx_protocol::config::{Network, NetworkType};
    /// use sbx_protocol::identity::Address;
    ///
    /// let alphanet = Network::default_for(NetworkType::Alphanet);
    /// assert!(Address::validate("XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi", &alphanet));
    /// assert!(!Address::validate("not an address", &alphanet));
    /// ```
    pub fn validate(text: &str, network: &Network) -> bool {
        Self::parse_for(text, network).is_ok()
    }

    /// Rebuild an address from its 21 raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LENGTH,
                got: bytes.len(),
            });
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[1..]);
        Ok(Self {
            version: bytes[0],
            hash,
        })
    }

    /// The 21 raw bytes: version followed by the key hash. This is what the
    /// canonical transaction layout embeds.
    pub fn to_bytes(&self) -> [u8; ADDRESS_LENGTH] {
        let mut out = [0u8; ADDRESS_LENGTH];
        out[0] = self.version;
        out[1..].copy_from_slice(&self.hash);
        out
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn key_hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// The Base58Check text form.
    pub fn encode(&self) -> String {
        bs58::encode(self.to_bytes()).with_check().into_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkType;
    use crate::crypto::keys::KeyPair;

    const KNOWN_ADDRESS: &str = "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi";

    fn alphanet() -> Network {
        Network::default_for(NetworkType::Alphanet)
    }

    #[test]
    fn known_address_validates_on_alphanet() {
        assert!(Address::validate(KNOWN_ADDRESS, &alphanet()));
        let testnet = Network::default_for(NetworkType::Testnet);
        assert!(!Address::validate(KNOWN_ADDRESS, &testnet));
    }

    #[test]
    fn derived_address_validates() {
        let network = alphanet();
        for phrase in ["mysecret", "my secret", "another one", ""] {
            let kp = KeyPair::from_passphrase(phrase).unwrap();
            let address = kp.public_key().to_address(&network).to_string();
            assert!(address.starts_with('X'), "{}", address);
            assert!(Address::validate(&address, &network));
        }
    }

    #[test]
    fn mysecret_self_address() {
        let kp = KeyPair::from_passphrase("mysecret").unwrap();
        assert_eq!(
            kp.public_key().to_address(&alphanet()).to_string(),
            "XNw3RdivSm6XaGrnxX8odaSjX8eUzqge4c"
        );
    }

    #[test]
    fn one_character_typo_fails() {
        let network = alphanet();
        let alphabet = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
        for (i, original) in KNOWN_ADDRESS.char_indices() {
            let replacement = alphabet.chars().find(|c| *c != original).unwrap();
            let mut corrupted = KNOWN_ADDRESS.to_string();
            corrupted.replace_range(i..i + 1, &replacement.to_string());
            assert!(
                !Address::validate(&corrupted, &network),
                "corruption at {} accepted",
                i
            );
        }
    }

    #[test]
    fn wrong_version_is_reported() {
        let testnet = Network::default_for(NetworkType::Testnet);
        assert_eq!(
            Address::parse_for(KNOWN_ADDRESS, &testnet),
            Err(AddressError::WrongVersion {
                expected: 0x52,
                got: 0x4B
            })
        );
    }

    #[test]
    fn malformed_input_is_false_not_panic() {
        let network = alphanet();
        assert!(!Address::validate("", &network));
        assert!(!Address::validate("0OIl", &network));
        assert!(!Address::validate("X", &network));
        let short = bs58::encode([0x4Bu8, 1, 2]).with_check().into_string();
        assert!(!Address::validate(&short, &network));
    }

    #[test]
    fn bytes_roundtrip() {
        let address = Address::decode(KNOWN_ADDRESS).unwrap();
        let bytes = address.to_bytes();
        assert_eq!(bytes[0], 0x4B);
        assert_eq!(Address::from_bytes(&bytes).unwrap(), address);
        assert_eq!(address.to_string(), KNOWN_ADDRESS);
    }
}
