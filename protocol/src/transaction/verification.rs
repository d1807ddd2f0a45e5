//! Verification of signed transactions.
//!
//! The checks are ordered from cheapest to most expensive: the id is a single
//! hash, each signature an EC verification.

use thiserror::Error;

use super::serializer::{second_signing_bytes, signed_bytes, unsigned_bytes};
use super::signing::compute_id;
use super::types::Transaction;
use crate::crypto::keys::PublicKey;

/// Errors that can occur during transaction verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The id does not match the SHA-256 of the signed bytes.
    #[error("transaction ID mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: String, actual: String },

    /// The primary signature does not verify against the sender key.
    #[error("invalid signature: does not verify against sender {sender}")]
    InvalidSignature { sender: String },

    /// A second public key was given but the transaction has no second
    /// signature.
    #[error("transaction has no second signature")]
    MissingSecondSignature,

    #[error("invalid second signature")]
    InvalidSecondSignature,
}

/// Verifies a signed transaction.
///
/// The checks, in order:
///
/// 1. **Transaction ID** -- must equal `SHA-256(signed_bytes)`.
/// 2. **Signature** -- ECDSA over the unsigned bytes, by the sender key.
/// 3. **Second signature** -- only if `second_public_key` is given: must be
///    present and verify over `unsigned_bytes || signature`.
///
/// # Errors
///
/// Returns the first failing check as a [`VerifyError`].
pub fn verify_transaction(
    tx: &Transaction,
    second_public_key: Option<&PublicKey>,
) -> Result<(), VerifyError> {
    let expected_id = compute_id(&signed_bytes(tx));
    if tx.id() != expected_id {
        return Err(VerifyError::IdMismatch {
            expected: expected_id,
            actual: tx.id().to_string(),
        });
    }

    let sender = tx.sender_public_key();
    if !sender.verify(&unsigned_bytes(tx.body()), tx.signature()) {
        return Err(VerifyError::InvalidSignature {
            sender: sender.to_hex(),
        });
    }

    if let Some(second) = second_public_key {
        let sign_signature = tx
            .sign_signature()
            .ok_or(VerifyError::MissingSecondSignature)?;
        if !second.verify(&second_signing_bytes(tx.body(), tx.signature()), sign_signature) {
            return Err(VerifyError::InvalidSecondSignature);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::{Asset, TransactionBody};

    fn body(keys: &KeyPair) -> TransactionBody {
        TransactionBody {
            timestamp: 42,
            sender_public_key: *keys.public_key(),
            recipient_id: Some("XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi".parse().unwrap()),
            amount: 1_000,
            fee: 10_000_000,
            vendor_field: Some("memo".into()),
            asset: Asset::Transfer,
        }
    }

    #[test]
    fn valid_transaction_passes() {
        let keys = KeyPair::from_passphrase("mysecret").unwrap();
        let tx = sign_transaction(body(&keys), &keys, None).unwrap();
        assert_eq!(verify_transaction(&tx, None), Ok(()));
    }

    #[test]
    fn second_signature_is_checked_when_expected() {
        let keys = KeyPair::from_passphrase("mysecret").unwrap();
        let second = KeyPair::from_passphrase("second").unwrap();
        let wrong = KeyPair::from_passphrase("wrong").unwrap();

        let tx = sign_transaction(body(&keys), &keys, Some(&second)).unwrap();
        assert_eq!(verify_transaction(&tx, Some(second.public_key())), Ok(()));
        assert_eq!(verify_transaction(&tx, None), Ok(()));
        assert_eq!(
            verify_transaction(&tx, Some(wrong.public_key())),
            Err(VerifyError::InvalidSecondSignature)
        );

        let single = sign_transaction(body(&keys), &keys, None).unwrap();
        assert_eq!(
            verify_transaction(&single, Some(second.public_key())),
            Err(VerifyError::MissingSecondSignature)
        );
    }

    #[test]
    fn tampered_json_fails_id_check() {
        let keys = KeyPair::from_passphrase("mysecret").unwrap();
        let tx = sign_transaction(body(&keys), &keys, None).unwrap();

        let mut json = serde_json::to_value(&tx).unwrap();
        json["amount"] = serde_json::json!(1_000_000);
        let tampered: Transaction = serde_json::from_value(json).unwrap();
        assert!(matches!(
            verify_transaction(&tampered, None),
            Err(VerifyError::IdMismatch { .. })
        ));
    }

    #[test]
    fn edited_delegate_key_does_not_parse() {
        let keys = KeyPair::from_passphrase("mysecret").unwrap();
        let other = KeyPair::from_passphrase("other").unwrap();
        let mut delegate = body(&keys);
        delegate.recipient_id = None;
        delegate.vendor_field = None;
        delegate.asset = Asset::Delegate {
            username: "lorenzo".into(),
            public_key: *keys.public_key(),
        };
        let tx = sign_transaction(delegate, &keys, None).unwrap();
        assert_eq!(verify_transaction(&tx, None), Ok(()));

        // The key is not in the signed bytes, so the id and signature would
        // still hold; the JSON layer has to refuse it.
        let mut json = serde_json::to_value(&tx).unwrap();
        json["asset"]["delegate"]["publicKey"] = serde_json::json!(other.public_key().to_hex());
        assert!(serde_json::from_value::<Transaction>(json).is_err());
    }

    #[test]
    fn foreign_signature_fails() {
        let keys = KeyPair::from_passphrase("mysecret").unwrap();
        let other = KeyPair::from_passphrase("other").unwrap();
        let tx = sign_transaction(body(&keys), &keys, None).unwrap();
        let forged_source = sign_transaction(body(&other), &other, None).unwrap();

        // Swap in a signature by another key and fix up the id.
        let mut json = serde_json::to_value(&tx).unwrap();
        json["signature"] = serde_json::json!(forged_source.signature().to_hex());
        let forged: Transaction = serde_json::from_value(json).unwrap();
        let forged = forged.clone().with_id(compute_id(&signed_bytes(&forged)));

        assert!(matches!(
            verify_transaction(&forged, None),
            Err(VerifyError::InvalidSignature { .. })
        ));
    }
}
