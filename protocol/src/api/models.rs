//! Request parameters and response shapes of the transaction endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::keys::Credential;
use crate::transaction::types::{Transaction, VoteType};

// ---------------------------------------------------------------------------
// create_* parameters
// ---------------------------------------------------------------------------

/// Parameters of [`TransactionApi::create_transaction`].
///
/// [`TransactionApi::create_transaction`]: super::TransactionApi::create_transaction
#[derive(Debug, Clone)]
pub struct TransactionSend {
    pub amount: u64,
    pub credential: Credential,
    /// Needed when the sender has a second signature registered.
    pub second_credential: Option<Credential>,
    pub recipient_id: String,
    /// Seconds since the network epoch; defaults to now.
    pub timestamp: Option<u32>,
    pub vendor_field: Option<String>,
}

impl TransactionSend {
    pub fn new(
        credential: impl Into<Credential>,
        recipient_id: impl Into<String>,
        amount: u64,
    ) -> Self {
        Self {
            amount,
            credential: credential.into(),
            second_credential: None,
            recipient_id: recipient_id.into(),
            timestamp: None,
            vendor_field: None,
        }
    }
}

/// Parameters of [`TransactionApi::create_vote`](super::TransactionApi::create_vote).
#[derive(Debug, Clone)]
pub struct TransactionVote {
    pub credential: Credential,
    pub second_credential: Option<Credential>,
    /// Hex-encoded compressed public key of the delegate.
    pub delegate_public_key: String,
    pub vote_type: VoteType,
    pub timestamp: Option<u32>,
    pub vendor_field: Option<String>,
}

impl TransactionVote {
    pub fn new(
        credential: impl Into<Credential>,
        delegate_public_key: impl Into<String>,
        vote_type: VoteType,
    ) -> Self {
        Self {
            credential: credential.into(),
            second_credential: None,
            delegate_public_key: delegate_public_key.into(),
            vote_type,
            timestamp: None,
            vendor_field: None,
        }
    }
}

/// Parameters of [`TransactionApi::create_delegate`](super::TransactionApi::create_delegate).
#[derive(Debug, Clone)]
pub struct TransactionDelegate {
    pub credential: Credential,
    pub second_credential: Option<Credential>,
    pub username: String,
    /// Hex public key to register. Defaults to the sender's, and must be
    /// the sender's if given.
    pub public_key: Option<String>,
    pub timestamp: Option<u32>,
    pub vendor_field: Option<String>,
}

impl TransactionDelegate {
    pub fn new(credential: impl Into<Credential>, username: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            second_credential: None,
            username: username.into(),
            public_key: None,
            timestamp: None,
            vendor_field: None,
        }
    }
}

/// Parameters of [`TransactionApi::create_signature`](super::TransactionApi::create_signature).
///
/// `second_credential` is the key being registered. The registration itself
/// is signed with `credential` only.
#[derive(Debug, Clone)]
pub struct TransactionSignature {
    pub credential: Credential,
    pub second_credential: Credential,
    pub timestamp: Option<u32>,
    pub vendor_field: Option<String>,
}

impl TransactionSignature {
    pub fn new(
        credential: impl Into<Credential>,
        second_credential: impl Into<Credential>,
    ) -> Self {
        Self {
            credential: credential.into(),
            second_credential: second_credential.into(),
            timestamp: None,
            vendor_field: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Body of `POST /peer/transactions`.
#[derive(Debug, Serialize)]
pub struct TransactionPostRequest<'a> {
    pub transactions: Vec<&'a Transaction>,
}

/// Answer to `POST /peer/transactions`.
///
/// v1 nodes fill `success`/`message`/`error`; v2 nodes list accepted ids in
/// `transactionIds`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPostResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub transaction_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Answer of the transaction query endpoints.
///
/// Nodes decorate transactions with fields of their own (`blockid`,
/// `confirmations`, ...), so they are kept as raw JSON. Use
/// [`typed_transactions`](Self::typed_transactions) to decode the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionResponse {
    /// Decodes `transaction` and `transactions` into [`Transaction`]s.
    pub fn typed_transactions(&self) -> Result<Vec<Transaction>, serde_json::Error> {
        self.transaction
            .iter()
            .chain(self.transactions.iter().flatten())
            .map(|value| serde_json::from_value(value.clone()))
            .collect()
    }
}

/// Filters of `GET /transactions` and `GET /transactions/unconfirmed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    /// e.g. `timestamp:desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl TransactionQueryParams {
    /// Query-string pairs of the filters that are set, sorted by key.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let Ok(Value::Object(fields)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        fields
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()
    }
}
