//! # Cryptographic Primitives
//!
//! Everything security-related in the engine flows through here:
//!
//! - **secp256k1 ECDSA** for signatures, via libsecp256k1 bindings.
//! - **SHA-256** for key derivation, signing digests and transaction ids.
//! - **RIPEMD-160** for addresses.
//! - **Base58Check** for addresses and WIF keys.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. The only freedom we have is which bytes go in, and the
//! network fixed that for us.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{double_sha256, ripemd160, sha256};
pub use keys::{Credential, KeyError, KeyPair, PrivateKey, PublicKey, Signature};
pub use signatures::{sign, verify};
