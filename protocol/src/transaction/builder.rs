//! Transaction construction via the builder pattern.
//!
//! Each constructor corresponds to one user intent and performs all of that
//! intent's input validation up front. Once a [`TransactionBuilder`] exists,
//! the only missing ingredient is the fee schedule, so [`build`] cannot
//! fail. This ordering lets callers reject bad input before touching the
//! network.
//!
//! The builder does not sign -- that happens in [`super::signing`].
//!
//! [`build`]: TransactionBuilder::build

use tracing::debug;

use super::error::TransactionError;
use super::types::{Asset, TransactionBody, Vote};
use crate::api::fees::FeeSchedule;
use crate::config::{
    is_valid_username, network_time, Network, MAX_USERNAME_LENGTH, VENDOR_FIELD_LENGTH,
};
use crate::crypto::keys::PublicKey;
use crate::identity::Address;

/// Fluent builder for unsigned [`TransactionBody`] values.
///
/// # Usage
///
/// ```
/// use sbx_protocol::api::FeeSchedule;
/// use sbx_protocol::config::{Network, NetworkType};
/// use sbx_protocol::crypto::KeyPair;
/// use sbx_protocol::transaction::TransactionBuilder;
///
/// let network = Network::default_for(NetworkType::Alphanet);
/// let keys = KeyPair::from_passphrase("mysecret").unwrap();
///
/// let body = TransactionBuilder::send(
///     &network,
///     *keys.public_key(),
///     "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi",
///     10,
/// )
/// .unwrap()
/// .vendor_field("hi from vekexasia")
/// .unwrap()
/// .timestamp(1)
/// .build(&FeeSchedule::default());
///
/// assert_eq!(body.fee, 10_000_000);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender_public_key: PublicKey,
    recipient_id: Option<Address>,
    amount: u64,
    asset: Asset,
    timestamp: Option<u32>,
    vendor_field: Option<String>,
}

impl TransactionBuilder {
    fn new(
        sender_public_key: PublicKey,
        recipient_id: Option<Address>,
        amount: u64,
        asset: Asset,
    ) -> Self {
        Self {
            sender_public_key,
            recipient_id,
            amount,
            asset,
            timestamp: None,
            vendor_field: None,
        }
    }

    /// A transfer of `amount` to `recipient`.
    ///
    /// # Errors
    ///
    /// [`TransactionError::InvalidRecipient`] if `recipient` is not an
    /// address of `network`.
    pub fn send(
        network: &Network,
        sender_public_key: PublicKey,
        recipient: &str,
        amount: u64,
    ) -> Result<Self, TransactionError> {
        let recipient_id = Address::parse_for(recipient, network).map_err(|e| {
            TransactionError::InvalidRecipient {
                address: recipient.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(
            sender_public_key,
            Some(recipient_id),
            amount,
            Asset::Transfer,
        ))
    }

    /// Adds or removes votes. The recipient is the voter's own address.
    pub fn vote(network: &Network, sender_public_key: PublicKey, votes: Vec<Vote>) -> Self {
        let own_address = Address::from_public_key(&sender_public_key, network);
        Self::new(sender_public_key, Some(own_address), 0, Asset::Votes(votes))
    }

    /// Registers the sender as a delegate named `username`.
    ///
    /// `public_key` defaults to the sender's key. The wire form carries only
    /// the username, so any other key is refused.
    ///
    /// # Errors
    ///
    /// [`TransactionError::UsernameTooLong`] for more than 20 characters,
    /// [`TransactionError::InvalidUsername`] for characters outside
    /// `a-z0-9!@$&_.`, [`TransactionError::InvalidPublicKey`] for a key that
    /// is not the sender's.
    pub fn create_delegate(
        sender_public_key: PublicKey,
        username: &str,
        public_key: Option<PublicKey>,
    ) -> Result<Self, TransactionError> {
        let public_key = public_key.unwrap_or(sender_public_key);
        check_delegate(&sender_public_key, username, &public_key)?;
        let asset = Asset::Delegate {
            username: username.to_string(),
            public_key,
        };
        Ok(Self::new(sender_public_key, None, 0, asset))
    }

    /// Registers `second_public_key` as the sender's second signing key.
    pub fn second_signature(sender_public_key: PublicKey, second_public_key: PublicKey) -> Self {
        let asset = Asset::SecondSignature {
            public_key: second_public_key,
        };
        Self::new(sender_public_key, None, 0, asset)
    }

    /// Sets the timestamp explicitly (seconds since the network epoch).
    ///
    /// If not called, `build()` uses the current network time.
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attaches a free-text memo. An empty string clears it.
    ///
    /// # Errors
    ///
    /// [`TransactionError::VendorFieldTooLong`] above 64 UTF-8 bytes,
    /// [`TransactionError::InvalidVendorField`] if it contains a NUL.
    pub fn vendor_field(mut self, text: &str) -> Result<Self, TransactionError> {
        check_vendor_field(text)?;
        self.vendor_field = (!text.is_empty()).then(|| text.to_string());
        Ok(self)
    }

    /// Consumes the builder and produces the unsigned body, charging the
    /// fee `fees` lists for this transaction type.
    pub fn build(self, fees: &FeeSchedule) -> TransactionBody {
        let kind = self.asset.transaction_type();
        let body = TransactionBody {
            timestamp: self.timestamp.unwrap_or_else(network_time),
            sender_public_key: self.sender_public_key,
            recipient_id: self.recipient_id,
            amount: self.amount,
            fee: fees.fee_for(kind),
            vendor_field: self.vendor_field,
            asset: self.asset,
        };
        debug!(tx_type = %kind, fee = body.fee, timestamp = body.timestamp, "transaction body built");
        body
    }
}

/// A vendor field must fit the 64-byte slot and hold no NUL, since the slot
/// is zero padded and a NUL would not survive decoding.
pub(crate) fn check_vendor_field(text: &str) -> Result<(), TransactionError> {
    if text.len() > VENDOR_FIELD_LENGTH {
        return Err(TransactionError::VendorFieldTooLong {
            length: text.len(),
            max: VENDOR_FIELD_LENGTH,
        });
    }
    if text.contains('\0') {
        return Err(TransactionError::InvalidVendorField(
            "contains a NUL character".into(),
        ));
    }
    Ok(())
}

/// A delegate registration must name a valid username and register the
/// sender's own key.
pub(crate) fn check_delegate(
    sender_public_key: &PublicKey,
    username: &str,
    public_key: &PublicKey,
) -> Result<(), TransactionError> {
    let length = username.chars().count();
    if length > MAX_USERNAME_LENGTH {
        return Err(TransactionError::UsernameTooLong {
            length,
            max: MAX_USERNAME_LENGTH,
        });
    }
    if !is_valid_username(username) {
        return Err(TransactionError::InvalidUsername {
            username: username.escape_default().to_string(),
            reason: "expected 1 to 20 of a-z, 0-9 and !@$&_.".into(),
        });
    }
    if public_key != sender_public_key {
        return Err(TransactionError::InvalidPublicKey(format!(
            "delegate key {} is not the sender key {}",
            public_key, sender_public_key
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{network_time_at, NetworkType};
    use crate::crypto::keys::KeyPair;
    use crate::transaction::types::{TransactionType, VoteType};
    use chrono::Utc;

    fn alphanet() -> Network {
        Network::default_for(NetworkType::Alphanet)
    }

    fn sender() -> PublicKey {
        *KeyPair::from_passphrase("mysecret").unwrap().public_key()
    }

    fn fees() -> FeeSchedule {
        FeeSchedule {
            send: 1,
            vote: 2,
            second_signature: 3,
            delegate: 4,
            multi_signature: None,
        }
    }

    #[test]
    fn send_uses_send_fee() {
        let recipient = "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi";
        let body = TransactionBuilder::send(&alphanet(), sender(), recipient, 10)
            .unwrap()
            .timestamp(1)
            .build(&fees());
        assert_eq!(body.fee, 1);
        assert_eq!(body.amount, 10);
        assert_eq!(body.transaction_type(), TransactionType::Send);
        assert_eq!(
            body.recipient_id.unwrap().to_string(),
            "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi"
        );
    }

    #[test]
    fn send_rejects_foreign_or_malformed_recipient() {
        let testnet = Network::default_for(NetworkType::Testnet);
        for recipient in ["XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi", "nope", ""] {
            let err = TransactionBuilder::send(&testnet, sender(), recipient, 10).unwrap_err();
            assert!(matches!(err, TransactionError::InvalidRecipient { .. }));
        }
    }

    #[test]
    fn vote_targets_own_address() {
        let delegate = *KeyPair::from_passphrase("delegate").unwrap().public_key();
        let body = TransactionBuilder::vote(
            &alphanet(),
            sender(),
            vec![Vote::new(VoteType::Add, delegate)],
        )
        .build(&fees());
        assert_eq!(body.fee, 2);
        assert_eq!(body.amount, 0);
        assert_eq!(
            body.recipient_id.unwrap().to_string(),
            "XNw3RdivSm6XaGrnxX8odaSjX8eUzqge4c"
        );
        assert_eq!(body.asset, Asset::Votes(vec![Vote::new(VoteType::Add, delegate)]));
    }

    #[test]
    fn delegate_username_limit() {
        let ok = TransactionBuilder::create_delegate(sender(), &"a".repeat(20), None);
        assert!(ok.is_ok());
        let err = TransactionBuilder::create_delegate(sender(), &"a".repeat(21), None).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::UsernameTooLong { length: 21, max: 20 }
        ));
        // Characters, not bytes: 20 of them pass the length check and fail
        // on the alphabet instead.
        let err =
            TransactionBuilder::create_delegate(sender(), &"é".repeat(20), None).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidUsername { .. }));
    }

    #[test]
    fn delegate_username_alphabet() {
        for name in ["genesis_1", "a.b", "x!@$&"] {
            assert!(TransactionBuilder::create_delegate(sender(), name, None).is_ok());
        }
        for name in ["", "Lorenzo", "two words", "\x30\x06\x02\x01\x01\x02\x01\x01"] {
            let err = TransactionBuilder::create_delegate(sender(), name, None).unwrap_err();
            assert!(
                matches!(err, TransactionError::InvalidUsername { .. }),
                "{:?}",
                name
            );
        }
    }

    #[test]
    fn delegate_key_must_be_sender_key() {
        let other = *KeyPair::from_passphrase("someone else").unwrap().public_key();
        let err =
            TransactionBuilder::create_delegate(sender(), "lorenzo", Some(other)).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidPublicKey(_)));
        assert!(TransactionBuilder::create_delegate(sender(), "lorenzo", Some(sender())).is_ok());
    }

    #[test]
    fn delegate_public_key_defaults_to_sender() {
        let body = TransactionBuilder::create_delegate(sender(), "lorenzo", None)
            .unwrap()
            .build(&fees());
        assert_eq!(body.fee, 4);
        assert_eq!(
            body.asset,
            Asset::Delegate {
                username: "lorenzo".into(),
                public_key: sender()
            }
        );
        assert_eq!(body.recipient_id, None);
    }

    #[test]
    fn second_signature_carries_second_key() {
        let second = *KeyPair::from_passphrase("second").unwrap().public_key();
        let body = TransactionBuilder::second_signature(sender(), second).build(&fees());
        assert_eq!(body.fee, 3);
        assert_eq!(body.asset, Asset::SecondSignature { public_key: second });
    }

    #[test]
    fn vendor_field_limit_is_in_bytes() {
        let builder = TransactionBuilder::second_signature(sender(), sender());
        assert!(builder.clone().vendor_field(&"a".repeat(64)).is_ok());
        let err = builder.clone().vendor_field(&"é".repeat(33)).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::VendorFieldTooLong { length: 66, max: 64 }
        ));
        let body = builder.clone().vendor_field("").unwrap().build(&fees());
        assert_eq!(body.vendor_field, None);
    }

    #[test]
    fn vendor_field_rejects_nul() {
        let builder = TransactionBuilder::second_signature(sender(), sender());
        for text in ["memo\0", "\0", "me\0mo"] {
            let err = builder.clone().vendor_field(text).unwrap_err();
            assert!(matches!(err, TransactionError::InvalidVendorField(_)));
        }
    }

    #[test]
    fn default_timestamp_is_network_time() {
        let before = network_time_at(Utc::now());
        let body = TransactionBuilder::second_signature(sender(), sender()).build(&fees());
        let after = network_time_at(Utc::now());
        assert!(body.timestamp >= before && body.timestamp <= after);
    }
}
