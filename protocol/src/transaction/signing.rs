//! Transaction signing with secp256k1 key pairs.
//!
//! Signing is the only way to obtain a [`Transaction`]: it consumes an
//! unsigned [`TransactionBody`], signs its canonical bytes, optionally adds a
//! second signature, and stamps the id over the fully signed bytes.

use tracing::debug;

use super::builder::{check_delegate, check_vendor_field};
use super::error::TransactionError;
use super::serializer::{second_signing_bytes, signed_bytes, unsigned_bytes};
use super::types::{Asset, Transaction, TransactionBody};
use crate::crypto::hash::sha256;
use crate::crypto::keys::KeyPair;

/// Signs `body` with `keys`, and with `second_keys` if the sender has a
/// second passphrase registered.
///
/// The procedure:
/// 1. `signature = sign(unsigned_bytes(body))`
/// 2. `sign_signature = sign(unsigned_bytes(body) || signature)` with the
///    second key, if any.
/// 3. `id = hex(SHA-256(signed_bytes))`
///
/// # Errors
///
/// [`TransactionError::SigningFailed`] if `keys` is not the key pair of
/// `body.sender_public_key`. A body edited by hand gets the builder's checks
/// again: the vendor field errors, and for a delegate registration the
/// username and public key errors.
///
/// # Example
///
/// ```
/// use sbx_protocol::crypto::KeyPair;
/// use sbx_protocol::transaction::{sign_transaction, Asset, TransactionBody};
///
/// let keys = KeyPair::from_passphrase("mysecret").unwrap();
/// let body = TransactionBody {
///     timestamp: 1,
///     sender_public_key: *keys.public_key(),
///     recipient_id: Some("XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi".parse().unwrap()),
///     amount: 10,
///     fee: 10_000_000,
///     vendor_field: None,
///     asset: Asset::Transfer,
/// };
///
/// let tx = sign_transaction(body, &keys, None).unwrap();
/// assert_eq!(
///     tx.id(),
///     "9e76115ec088ee82640cee6556dbfafcf52ef4ede7684a09bb6b1204ce851fee"
/// );
/// ```
pub fn sign_transaction(
    body: TransactionBody,
    keys: &KeyPair,
    second_keys: Option<&KeyPair>,
) -> Result<Transaction, TransactionError> {
    if keys.public_key() != &body.sender_public_key {
        return Err(TransactionError::SigningFailed(
            "key pair does not match the sender public key".into(),
        ));
    }
    if let Some(vendor) = &body.vendor_field {
        check_vendor_field(vendor)?;
    }
    if let Asset::Delegate {
        username,
        public_key,
    } = &body.asset
    {
        check_delegate(&body.sender_public_key, username, public_key)?;
    }

    let signature = keys.sign(&unsigned_bytes(&body));
    let sign_signature =
        second_keys.map(|second| second.sign(&second_signing_bytes(&body, &signature)));

    let unidentified = Transaction::from_parts(body, signature, sign_signature, String::new());
    let id = compute_id(&signed_bytes(&unidentified));
    let tx = unidentified.with_id(id);
    debug!(
        tx_type = %tx.transaction_type(),
        id = %tx.id(),
        second_signed = tx.sign_signature().is_some(),
        "transaction signed"
    );
    Ok(tx)
}

/// `hex(SHA-256(signed_bytes))`, lowercase.
pub fn compute_id(signed_bytes: &[u8]) -> String {
    hex::encode(sha256(signed_bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
