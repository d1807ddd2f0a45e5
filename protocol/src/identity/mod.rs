//! # Identity
//!
//! Account addresses derived from public keys. The key material itself
//! lives in [`crate::crypto::keys`]; this module only turns it into the
//! network-specific names users copy and paste.

pub mod address;

pub use address::{Address, AddressError};
