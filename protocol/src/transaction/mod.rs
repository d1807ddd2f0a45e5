//! # Transaction Module
//!
//! Construction, canonical serialization, signing and verification of SBX
//! transactions. Every transfer, vote, delegate registration and second
//! signature registration is represented as a [`Transaction`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs        -- TransactionType, Asset, Vote, TransactionBody, Transaction
//! builder.rs      -- TransactionBuilder: one constructor per intent
//! serializer.rs   -- canonical byte layout, encoder and decoder
//! signing.rs      -- secp256k1 signing and id computation
//! verification.rs -- id and signature checks on a signed transaction
//! error.rs        -- TransactionError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** -- a [`TransactionBuilder`] validates the intent, then takes
//!    a fee schedule and yields an unsigned [`TransactionBody`].
//! 2. **Sign** -- [`sign_transaction`] signs the unsigned bytes and
//!    computes the id over the fully signed bytes.
//! 3. **Broadcast** -- the signed transaction goes to a peer through
//!    [`crate::api::TransactionApi::post`].
//!
//! ## Design Decisions
//!
//! - Transaction IDs are `SHA-256` of the fully signed canonical bytes,
//!   hex encoded. A second signature changes the id.
//! - All amounts are `u64` in the smallest denomination.
//! - The type is derived from the asset, so type and payload cannot
//!   disagree.

pub mod builder;
pub mod error;
pub mod serializer;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::TransactionBuilder;
pub use error::TransactionError;
pub use serializer::{
    deserialize, deserialize_unsigned, second_signing_bytes, signed_bytes, unsigned_bytes,
    DecodeError,
};
pub use signing::{compute_id, sign_transaction};
pub use types::{Asset, Transaction, TransactionBody, TransactionType, Vote, VoteType};
pub use verification::{verify_transaction, VerifyError};
