//! Canonical byte layout of a transaction.
//!
//! One encoder produces every byte string the network cares about; the
//! passes only differ in how many signatures they append:
//!
//! ```text
//! type            1 byte
//! timestamp       4 bytes LE
//! senderPublicKey 33 bytes
//! recipientId     21 bytes (version + RIPEMD-160), zeros if absent
//! vendorField     64 bytes, UTF-8 right-padded with zeros
//! amount          8 bytes LE
//! fee             8 bytes LE
//! asset           type specific (see `encode_asset`)
//! signature       DER                      (signed pass)
//! signSignature   DER, if present          (signed pass)
//! ```
//!
//! The unsigned pass is what gets signed; the fully signed pass is what gets
//! hashed into the id. The decoder inverts the layout.

use thiserror::Error;

use super::signing::compute_id;
use super::types::{Asset, Transaction, TransactionBody, TransactionType, Vote};
use crate::config::{
    is_valid_username, ADDRESS_LENGTH, MAX_USERNAME_LENGTH, PUBLIC_KEY_LENGTH, VENDOR_FIELD_LENGTH,
};
use crate::crypto::keys::{KeyError, PublicKey, Signature};
use crate::identity::{Address, AddressError};

/// Fixed-width prefix shared by every transaction type.
pub const HEADER_LENGTH: usize =
    1 + 4 + PUBLIC_KEY_LENGTH + ADDRESS_LENGTH + VENDOR_FIELD_LENGTH + 8 + 8;

/// `+` or `-` followed by 66 hex characters.
const VOTE_LENGTH: usize = 1 + 2 * PUBLIC_KEY_LENGTH;

/// Errors produced by [`deserialize`] and [`deserialize_unsigned`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    #[error("unsupported transaction type {0}")]
    UnsupportedType(u8),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("field {0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("invalid delegate username '{0}'")]
    InvalidUsername(String),

    #[error("vendor field contains a NUL byte")]
    InvalidVendorField,

    #[error("invalid vote entry: {0}")]
    InvalidVote(String),

    #[error("missing signature")]
    MissingSignature,

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// The bytes the primary signature covers.
pub fn unsigned_bytes(body: &TransactionBody) -> Vec<u8> {
    encode(body, None, None)
}

/// The bytes the second signature covers: the unsigned bytes followed by the
/// primary signature.
pub fn second_signing_bytes(body: &TransactionBody, signature: &Signature) -> Vec<u8> {
    encode(body, Some(signature), None)
}

/// The full wire form, including both signatures. Its SHA-256 is the id.
pub fn signed_bytes(tx: &Transaction) -> Vec<u8> {
    encode(tx.body(), Some(tx.signature()), tx.sign_signature())
}

fn encode(
    body: &TransactionBody,
    signature: Option<&Signature>,
    sign_signature: Option<&Signature>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LENGTH + 160);

    buf.push(body.transaction_type().code());
    buf.extend_from_slice(&body.timestamp.to_le_bytes());
    buf.extend_from_slice(&body.sender_public_key.to_bytes());

    match &body.recipient_id {
        Some(address) => buf.extend_from_slice(&address.to_bytes()),
        None => buf.extend_from_slice(&[0u8; ADDRESS_LENGTH]),
    }

    let mut vendor = [0u8; VENDOR_FIELD_LENGTH];
    if let Some(text) = &body.vendor_field {
        let bytes = text.as_bytes();
        let len = bytes.len().min(VENDOR_FIELD_LENGTH);
        vendor[..len].copy_from_slice(&bytes[..len]);
    }
    buf.extend_from_slice(&vendor);

    buf.extend_from_slice(&body.amount.to_le_bytes());
    buf.extend_from_slice(&body.fee.to_le_bytes());

    encode_asset(&body.asset, &mut buf);

    if let Some(sig) = signature {
        buf.extend_from_slice(sig.as_bytes());
    }
    if let Some(sig) = sign_signature {
        buf.extend_from_slice(sig.as_bytes());
    }
    buf
}

fn encode_asset(asset: &Asset, buf: &mut Vec<u8>) {
    match asset {
        Asset::Transfer => {}
        Asset::SecondSignature { public_key } => buf.extend_from_slice(&public_key.to_bytes()),
        Asset::Delegate { username, .. } => buf.extend_from_slice(username.as_bytes()),
        Asset::Votes(votes) => {
            for vote in votes {
                buf.extend_from_slice(vote.to_string().as_bytes());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a fully signed transaction. The id is recomputed from `bytes`.
pub fn deserialize(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    let mut reader = Reader::new(bytes);
    let header = read_header(&mut reader)?;
    let rest = reader.rest();

    let (asset, signatures) = match header.kind {
        TransactionType::CreateDelegate => {
            // The username has no length prefix. Its alphabet never holds a
            // DER integer tag, so the only split where the prefix is a valid
            // name and the rest parses as signatures is the real one.
            let split = (1..=rest.len().min(MAX_USERNAME_LENGTH))
                .find(|&at| {
                    std::str::from_utf8(&rest[..at]).is_ok_and(is_valid_username)
                        && read_signatures(&rest[at..]).is_ok()
                })
                .ok_or(DecodeError::MissingSignature)?;
            let asset = delegate_asset(&rest[..split], &header.sender_public_key)?;
            (asset, &rest[split..])
        }
        kind => {
            let mut asset_reader = Reader::new(rest);
            let asset = read_asset(kind, &mut asset_reader, &header.sender_public_key)?;
            (asset, asset_reader.rest())
        }
    };

    let (signature, sign_signature) = read_signatures(signatures)?;
    let body = header.into_body(asset);
    Ok(Transaction::from_parts(
        body,
        signature,
        sign_signature,
        compute_id(bytes),
    ))
}

/// Decodes the unsigned pass back into a body.
pub fn deserialize_unsigned(bytes: &[u8]) -> Result<TransactionBody, DecodeError> {
    let mut reader = Reader::new(bytes);
    let header = read_header(&mut reader)?;

    let asset = read_asset(header.kind, &mut reader, &header.sender_public_key)?;

    if !reader.rest().is_empty() {
        return Err(DecodeError::TrailingBytes(reader.rest().len()));
    }
    Ok(header.into_body(asset))
}

struct Header {
    kind: TransactionType,
    timestamp: u32,
    sender_public_key: PublicKey,
    recipient_id: Option<Address>,
    vendor_field: Option<String>,
    amount: u64,
    fee: u64,
}

impl Header {
    fn into_body(self, asset: Asset) -> TransactionBody {
        TransactionBody {
            timestamp: self.timestamp,
            sender_public_key: self.sender_public_key,
            recipient_id: self.recipient_id,
            amount: self.amount,
            fee: self.fee,
            vendor_field: self.vendor_field,
            asset,
        }
    }
}

fn read_header(reader: &mut Reader<'_>) -> Result<Header, DecodeError> {
    let code = reader.u8()?;
    let kind = TransactionType::try_from(code).map_err(|_| DecodeError::UnsupportedType(code))?;
    let timestamp = reader.u32_le()?;
    let sender_public_key = PublicKey::from_slice(reader.take(PUBLIC_KEY_LENGTH)?)?;

    let recipient = reader.take(ADDRESS_LENGTH)?;
    let recipient_id = if recipient.iter().all(|b| *b == 0) {
        None
    } else {
        Some(Address::from_bytes(recipient)?)
    };

    let vendor = reader.take(VENDOR_FIELD_LENGTH)?;
    let end = vendor.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    if vendor[..end].contains(&0) {
        return Err(DecodeError::InvalidVendorField);
    }
    let vendor_field = match end {
        0 => None,
        _ => Some(
            String::from_utf8(vendor[..end].to_vec())
                .map_err(|_| DecodeError::InvalidUtf8("vendorField"))?,
        ),
    };

    let amount = reader.u64_le()?;
    let fee = reader.u64_le()?;

    Ok(Header {
        kind,
        timestamp,
        sender_public_key,
        recipient_id,
        vendor_field,
        amount,
        fee,
    })
}

/// Reads the asset of `kind`. A delegate username has no length prefix, so
/// it takes everything that is left.
fn read_asset(
    kind: TransactionType,
    reader: &mut Reader<'_>,
    sender: &PublicKey,
) -> Result<Asset, DecodeError> {
    match kind {
        TransactionType::Send => Ok(Asset::Transfer),
        TransactionType::SecondSignature => {
            let public_key = PublicKey::from_slice(reader.take(PUBLIC_KEY_LENGTH)?)?;
            Ok(Asset::SecondSignature { public_key })
        }
        TransactionType::Vote => {
            let mut votes = Vec::new();
            while matches!(reader.peek(), Some(b'+') | Some(b'-')) {
                let chunk = reader.take(VOTE_LENGTH)?;
                let text =
                    std::str::from_utf8(chunk).map_err(|_| DecodeError::InvalidUtf8("votes"))?;
                let vote = text.parse::<Vote>().map_err(DecodeError::InvalidVote)?;
                votes.push(vote);
            }
            Ok(Asset::Votes(votes))
        }
        TransactionType::CreateDelegate => {
            let rest = reader.rest();
            reader.advance(rest.len());
            delegate_asset(rest, sender)
        }
    }
}

fn delegate_asset(username: &[u8], sender: &PublicKey) -> Result<Asset, DecodeError> {
    let username =
        String::from_utf8(username.to_vec()).map_err(|_| DecodeError::InvalidUtf8("username"))?;
    if !is_valid_username(&username) {
        return Err(DecodeError::InvalidUsername(username.escape_default().to_string()));
    }
    Ok(Asset::Delegate {
        username,
        public_key: *sender,
    })
}

/// Parses one mandatory and one optional DER signature, consuming `bytes`
/// exactly.
fn read_signatures(bytes: &[u8]) -> Result<(Signature, Option<Signature>), DecodeError> {
    let mut reader = Reader::new(bytes);
    if reader.rest().is_empty() {
        return Err(DecodeError::MissingSignature);
    }
    let signature = read_der(&mut reader)?;
    let sign_signature = if reader.rest().is_empty() {
        None
    } else {
        Some(read_der(&mut reader)?)
    };
    if !reader.rest().is_empty() {
        return Err(DecodeError::TrailingBytes(reader.rest().len()));
    }
    Ok((signature, sign_signature))
}

/// DER signatures are `0x30 <len> ...` with a short-form length.
fn read_der(reader: &mut Reader<'_>) -> Result<Signature, DecodeError> {
    let frame = match reader.rest() {
        [0x30, len, ..] if *len < 0x80 => 2 + *len as usize,
        _ => {
            return Err(KeyError::InvalidSignature("not a DER sequence".into()).into());
        }
    };
    Ok(Signature::from_der(reader.take(frame)?)?)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.bytes.len());
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.bytes.len() - self.pos;
        if n > remaining {
            return Err(DecodeError::Truncated {
                needed: n,
                remaining,
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u32_le(&mut self) -> Result<u32, DecodeError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn u64_le(&mut self) -> Result<u64, DecodeError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::VoteType;

    const RECIPIENT: &str = "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi";

    fn keys() -> KeyPair {
        KeyPair::from_passphrase("mysecret").unwrap()
    }

    fn body(asset: Asset, recipient: Option<&str>, vendor: Option<&str>) -> TransactionBody {
        TransactionBody {
            timestamp: 1,
            sender_public_key: *keys().public_key(),
            recipient_id: recipient.map(|r| Address::decode(r).unwrap()),
            amount: 10,
            fee: 10_000_000,
            vendor_field: vendor.map(str::to_string),
            asset,
        }
    }

    #[test]
    fn header_layout() {
        let bytes = unsigned_bytes(&body(Asset::Transfer, Some(RECIPIENT), Some("hi")));
        assert_eq!(bytes.len(), HEADER_LENGTH);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..5], &[1, 0, 0, 0]);
        assert_eq!(&bytes[5..38], &keys().public_key().to_bytes());
        assert_eq!(bytes[38], 0x4B);
        assert_eq!(&bytes[59..61], b"hi");
        assert!(bytes[61..123].iter().all(|b| *b == 0));
        assert_eq!(&bytes[123..131], &10u64.to_le_bytes());
        assert_eq!(&bytes[131..139], &10_000_000u64.to_le_bytes());
    }

    #[test]
    fn absent_recipient_is_zero_filled() {
        let bytes = unsigned_bytes(&body(Asset::Transfer, None, None));
        assert!(bytes[38..59].iter().all(|b| *b == 0));
        let decoded = deserialize_unsigned(&bytes).unwrap();
        assert_eq!(decoded.recipient_id, None);
        assert_eq!(decoded.vendor_field, None);
    }

    #[test]
    fn asset_encodings() {
        let second = *KeyPair::from_passphrase("second").unwrap().public_key();
        let bytes = unsigned_bytes(&body(
            Asset::SecondSignature { public_key: second },
            None,
            None,
        ));
        assert_eq!(&bytes[HEADER_LENGTH..], &second.to_bytes());

        let bytes = unsigned_bytes(&body(
            Asset::Delegate {
                username: "lorenzo".into(),
                public_key: *keys().public_key(),
            },
            None,
            None,
        ));
        assert_eq!(&bytes[HEADER_LENGTH..], b"lorenzo");

        let vote = Vote::new(VoteType::Remove, second);
        let bytes = unsigned_bytes(&body(Asset::Votes(vec![vote]), None, None));
        assert_eq!(&bytes[HEADER_LENGTH..], format!("-{}", second.to_hex()).as_bytes());
    }

    #[test]
    fn second_signing_bytes_extend_unsigned() {
        let keys = keys();
        let tx = sign_transaction(body(Asset::Transfer, Some(RECIPIENT), None), &keys, None).unwrap();
        let unsigned = unsigned_bytes(tx.body());
        let second = second_signing_bytes(tx.body(), tx.signature());
        assert_eq!(&second[..unsigned.len()], unsigned.as_slice());
        assert_eq!(&second[unsigned.len()..], tx.signature().as_bytes());
        assert_eq!(signed_bytes(&tx), second);
    }

    #[test]
    fn signed_roundtrip_every_type() {
        let keys = keys();
        let second = KeyPair::from_passphrase("second").unwrap();
        let delegate = *second.public_key();
        let bodies = vec![
            body(Asset::Transfer, Some(RECIPIENT), Some("hi from vekexasia")),
            body(Asset::SecondSignature { public_key: delegate }, None, None),
            body(
                Asset::Delegate {
                    username: "lorenzo".into(),
                    public_key: *keys.public_key(),
                },
                None,
                None,
            ),
            body(
                Asset::Votes(vec![
                    Vote::new(VoteType::Add, delegate),
                    Vote::new(VoteType::Remove, *keys.public_key()),
                ]),
                Some(RECIPIENT),
                None,
            ),
        ];

        for body in bodies {
            for second_keys in [None, Some(&second)] {
                let tx = sign_transaction(body.clone(), &keys, second_keys).unwrap();
                let decoded = deserialize(&signed_bytes(&tx)).unwrap();
                assert_eq!(decoded, tx, "{}", tx.transaction_type());
            }
        }
    }

    #[test]
    fn delegate_username_that_looks_like_der_prefix() {
        let keys = keys();
        let tx = sign_transaction(
            body(
                Asset::Delegate {
                    username: "0e0".into(),
                    public_key: *keys.public_key(),
                },
                None,
                None,
            ),
            &keys,
            None,
        )
        .unwrap();
        let decoded = deserialize(&signed_bytes(&tx)).unwrap();
        assert_eq!(decoded.asset(), tx.asset());
    }

    #[test]
    fn delegate_username_shaped_like_a_signature_is_not_split() {
        // Encode by hand: the signer refuses such a name.
        let keys = keys();
        let unsigned = unsigned_bytes(&body(
            Asset::Delegate {
                username: "\x30\x06\x02\x01\x01\x02\x01\x01".into(),
                public_key: *keys.public_key(),
            },
            None,
            None,
        ));
        let mut bytes = unsigned.clone();
        bytes.extend_from_slice(keys.sign(&unsigned).as_bytes());

        assert_eq!(deserialize(&bytes), Err(DecodeError::MissingSignature));
        assert!(matches!(
            deserialize_unsigned(&unsigned),
            Err(DecodeError::InvalidUsername(_))
        ));
    }

    #[test]
    fn vendor_field_with_inner_nul_is_rejected() {
        let mut bytes = unsigned_bytes(&body(Asset::Transfer, None, Some("memo")));
        // "me\0o"
        bytes[59 + 2] = 0;
        assert_eq!(
            deserialize_unsigned(&bytes),
            Err(DecodeError::InvalidVendorField)
        );
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let mut bytes = unsigned_bytes(&body(Asset::Transfer, None, None));
        bytes[0] = 4;
        assert_eq!(
            deserialize_unsigned(&bytes),
            Err(DecodeError::UnsupportedType(4))
        );
    }

    #[test]
    fn truncated_input_is_rejected() {
        let bytes = unsigned_bytes(&body(Asset::Transfer, Some(RECIPIENT), None));
        assert!(matches!(
            deserialize_unsigned(&bytes[..100]),
            Err(DecodeError::Truncated { .. })
        ));
        assert_eq!(deserialize(&bytes), Err(DecodeError::MissingSignature));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let mut bytes = unsigned_bytes(&body(Asset::Transfer, None, None));
        bytes.push(0xff);
        assert_eq!(deserialize_unsigned(&bytes), Err(DecodeError::TrailingBytes(1)));
    }
}
