//! Errors raised while creating a transaction.

use thiserror::Error;

use crate::api::transport::TransportError;

/// Everything that can stop a `create_*` call from producing a signed
/// transaction.
///
/// Input validation variants are always reported before any network I/O, so
/// a caller that passes a bad address never pays for a fee lookup.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The recipient is not a valid address on the active network.
    #[error("invalid recipient address '{address}': {reason}")]
    InvalidRecipient { address: String, reason: String },

    /// Delegate usernames are limited to 20 characters.
    #[error("delegate username has {length} characters, maximum is {max}")]
    UsernameTooLong { length: usize, max: usize },

    /// Delegate usernames use lowercase letters, digits and `!@$&_.` only.
    #[error("invalid delegate username '{username}': {reason}")]
    InvalidUsername { username: String, reason: String },

    /// A passphrase or WIF key could not be turned into key material.
    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// A delegate or second-signature public key did not parse, or a
    /// delegate key is not the sender's.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The vendor field exceeds 64 UTF-8 bytes.
    #[error("vendor field is {length} bytes, maximum is {max}")]
    VendorFieldTooLong { length: usize, max: usize },

    /// The vendor field holds a byte the zero-padded slot cannot carry.
    #[error("invalid vendor field: {0}")]
    InvalidVendorField(String),

    /// Key material did not match the transaction, or signing failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The fee schedule could not be fetched.
    #[error("fee lookup failed: {0}")]
    FeeLookupFailed(#[from] TransportError),
}
