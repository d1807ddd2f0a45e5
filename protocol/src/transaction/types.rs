//! Core type definitions for SBX transactions.
//!
//! The per-type payload ("asset") is a sum type, and the transaction type is
//! derived from it. A vote that carries delegate data, or a transfer that
//! carries votes, cannot be constructed.
//!
//! Two record types split the lifecycle:
//!
//! - [`TransactionBody`] -- unsigned, produced by the builder, freely editable.
//! - [`Transaction`] -- signed and identified. Fields are read-only so nothing
//!   can change the bytes after `signature` and `id` were computed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::is_valid_username;
use crate::crypto::keys::{PublicKey, Signature};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Wire discriminant of a transaction. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TransactionType {
    /// Value transfer between two addresses.
    Send,
    /// Registers a second public key for two-factor signing.
    SecondSignature,
    /// Registers the sender as a forging delegate.
    CreateDelegate,
    /// Adds or removes a vote for a delegate.
    Vote,
}

impl TransactionType {
    pub fn code(self) -> u8 {
        match self {
            Self::Send => 0,
            Self::SecondSignature => 1,
            Self::CreateDelegate => 2,
            Self::Vote => 3,
        }
    }
}

impl From<TransactionType> for u8 {
    fn from(kind: TransactionType) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Send),
            1 => Ok(Self::SecondSignature),
            2 => Ok(Self::CreateDelegate),
            3 => Ok(Self::Vote),
            other => Err(format!("unsupported transaction type {}", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "Send"),
            Self::SecondSignature => write!(f, "SecondSignature"),
            Self::CreateDelegate => write!(f, "CreateDelegate"),
            Self::Vote => write!(f, "Vote"),
        }
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteType {
    Add,
    Remove,
}

impl VoteType {
    pub fn sign(self) -> char {
        match self {
            Self::Add => '+',
            Self::Remove => '-',
        }
    }
}

/// One vote entry, rendered `"+<hex public key>"` or `"-<hex public key>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vote {
    pub direction: VoteType,
    pub delegate: PublicKey,
}

impl Vote {
    pub fn new(direction: VoteType, delegate: PublicKey) -> Self {
        Self {
            direction,
            delegate,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.sign(), self.delegate.to_hex())
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let direction = match s.chars().next() {
            Some('+') => VoteType::Add,
            Some('-') => VoteType::Remove,
            _ => return Err(format!("vote '{}' must start with '+' or '-'", s)),
        };
        let delegate = PublicKey::from_hex(&s[1..]).map_err(|e| e.to_string())?;
        Ok(Self::new(direction, delegate))
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// Type-specific payload of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// Plain transfer, no payload.
    Transfer,
    /// The second public key being registered.
    SecondSignature { public_key: PublicKey },
    /// Delegate registration.
    Delegate {
        username: String,
        public_key: PublicKey,
    },
    /// Vote entries, in order.
    Votes(Vec<Vote>),
}

impl Asset {
    /// The transaction type this payload belongs to.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Transfer => TransactionType::Send,
            Self::SecondSignature { .. } => TransactionType::SecondSignature,
            Self::Delegate { .. } => TransactionType::CreateDelegate,
            Self::Votes(_) => TransactionType::Vote,
        }
    }

    fn into_repr(self) -> AssetRepr {
        let mut repr = AssetRepr::default();
        match self {
            Self::Transfer => {}
            Self::SecondSignature { public_key } => {
                repr.signature = Some(SignatureAssetRepr { public_key });
            }
            Self::Delegate {
                username,
                public_key,
            } => {
                repr.delegate = Some(DelegateAssetRepr {
                    username,
                    public_key,
                });
            }
            Self::Votes(votes) => {
                repr.votes = Some(votes.iter().map(Vote::to_string).collect());
            }
        }
        repr
    }

    /// A delegate asset must register a valid name for `sender` itself; the
    /// wire form carries nothing else.
    fn from_repr(
        kind: TransactionType,
        repr: AssetRepr,
        sender: &PublicKey,
    ) -> Result<Self, String> {
        match kind {
            TransactionType::Send => Ok(Self::Transfer),
            TransactionType::SecondSignature => repr
                .signature
                .map(|s| Self::SecondSignature {
                    public_key: s.public_key,
                })
                .ok_or_else(|| "second signature transaction without asset.signature".into()),
            TransactionType::CreateDelegate => {
                let delegate = repr
                    .delegate
                    .ok_or_else(|| "delegate transaction without asset.delegate".to_string())?;
                if !is_valid_username(&delegate.username) {
                    return Err(format!(
                        "invalid delegate username '{}'",
                        delegate.username.escape_default()
                    ));
                }
                if &delegate.public_key != sender {
                    return Err(format!(
                        "delegate key {} is not the sender key {}",
                        delegate.public_key, sender
                    ));
                }
                Ok(Self::Delegate {
                    username: delegate.username,
                    public_key: delegate.public_key,
                })
            }
            TransactionType::Vote => {
                let votes = repr
                    .votes
                    .ok_or_else(|| "vote transaction without asset.votes".to_string())?;
                votes
                    .iter()
                    .map(|v| v.parse::<Vote>())
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Votes)
            }
        }
    }
}

/// JSON shape of the asset object as the nodes expect it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AssetRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    votes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delegate: Option<DelegateAssetRepr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<SignatureAssetRepr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DelegateAssetRepr {
    username: String,
    public_key: PublicKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureAssetRepr {
    public_key: PublicKey,
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// An unsigned transaction: everything the signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    /// Seconds since the network epoch.
    pub timestamp: u32,
    pub sender_public_key: PublicKey,
    pub recipient_id: Option<Address>,
    /// Amount in the smallest unit (10^-8 SBX).
    pub amount: u64,
    pub fee: u64,
    /// Free-text memo, at most 64 UTF-8 bytes.
    pub vendor_field: Option<String>,
    pub asset: Asset,
}

impl TransactionBody {
    pub fn transaction_type(&self) -> TransactionType {
        self.asset.transaction_type()
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A signed, identified transaction.
///
/// Only the signing engine and the byte decoder create these. There are no
/// setters: changing any field would silently invalidate `signature` and
/// `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRepr", into = "TransactionRepr")]
pub struct Transaction {
    body: TransactionBody,
    signature: Signature,
    sign_signature: Option<Signature>,
    id: String,
}

impl Transaction {
    pub(crate) fn from_parts(
        body: TransactionBody,
        signature: Signature,
        sign_signature: Option<Signature>,
        id: String,
    ) -> Self {
        Self {
            body,
            signature,
            sign_signature,
            id,
        }
    }

    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type()
    }

    pub fn timestamp(&self) -> u32 {
        self.body.timestamp
    }

    pub fn sender_public_key(&self) -> &PublicKey {
        &self.body.sender_public_key
    }

    pub fn recipient_id(&self) -> Option<&Address> {
        self.body.recipient_id.as_ref()
    }

    pub fn amount(&self) -> u64 {
        self.body.amount
    }

    pub fn fee(&self) -> u64 {
        self.body.fee
    }

    pub fn vendor_field(&self) -> Option<&str> {
        self.body.vendor_field.as_deref()
    }

    pub fn asset(&self) -> &Asset {
        &self.body.asset
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The second signature, if the sender signed with a second passphrase.
    pub fn sign_signature(&self) -> Option<&Signature> {
        self.sign_signature.as_ref()
    }

    /// Lowercase hex transaction id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Flat JSON form with the node's field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRepr {
    #[serde(rename = "type")]
    kind: TransactionType,
    timestamp: u32,
    sender_public_key: PublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient_id: Option<Address>,
    amount: u64,
    fee: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vendor_field: Option<String>,
    #[serde(default)]
    asset: AssetRepr,
    signature: Signature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sign_signature: Option<Signature>,
    id: String,
}

impl From<Transaction> for TransactionRepr {
    fn from(tx: Transaction) -> Self {
        let kind = tx.transaction_type();
        let body = tx.body;
        Self {
            kind,
            timestamp: body.timestamp,
            sender_public_key: body.sender_public_key,
            recipient_id: body.recipient_id,
            amount: body.amount,
            fee: body.fee,
            vendor_field: body.vendor_field,
            asset: body.asset.into_repr(),
            signature: tx.signature,
            sign_signature: tx.sign_signature,
            id: tx.id,
        }
    }
}

impl TryFrom<TransactionRepr> for Transaction {
    type Error = String;

    fn try_from(repr: TransactionRepr) -> Result<Self, Self::Error> {
        let asset = Asset::from_repr(repr.kind, repr.asset, &repr.sender_public_key)?;
        if repr.vendor_field.as_deref().is_some_and(|v| v.contains('\0')) {
            return Err("vendorField contains a NUL character".into());
        }
        Ok(Self {
            body: TransactionBody {
                timestamp: repr.timestamp,
                sender_public_key: repr.sender_public_key,
                recipient_id: repr.recipient_id,
                amount: repr.amount,
                fee: repr.fee,
                vendor_field: repr.vendor_field,
                asset,
            },
            signature: repr.signature,
            sign_signature: repr.sign_signature,
            id: repr.id,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
