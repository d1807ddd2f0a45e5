//! Transaction endpoints: create, sign, post and query.
//!
//! Every `create_*` call follows the same sequence:
//!
//! ```text
//! derive keys -> validate intent -> fee lookup (await) -> build -> sign
//! ```
//!
//! Nothing before the fee lookup touches the network, and nothing after it
//! can fail for reasons other than key mismatch. Dropping the returned future
//! at the await point leaves no trace: no transaction exists until signing
//! has completed.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fees::{BlockApi, FeeSource};
use super::models::{
    TransactionDelegate, TransactionPostRequest, TransactionPostResponse, TransactionQueryParams,
    TransactionResponse, TransactionSend, TransactionSignature, TransactionVote,
};
use super::transport::{Transport, TransportError};
use crate::config::{Network, Peer};
use crate::crypto::keys::{Credential, KeyPair, PublicKey};
use crate::transaction::builder::TransactionBuilder;
use crate::transaction::error::TransactionError;
use crate::transaction::signing::sign_transaction;
use crate::transaction::types::{Transaction, Vote};

/// Path nodes accept transaction broadcasts on.
pub const PEER_TRANSACTIONS_PATH: &str = "/peer/transactions";

/// Transaction related API calls over a [`Transport`].
pub struct TransactionApi<T> {
    transport: Arc<T>,
    fees: Arc<dyn FeeSource>,
}

impl<T: Transport + 'static> TransactionApi<T> {
    /// Fees are looked up from the node's `/blocks/getFees` on every call.
    pub fn new(transport: Arc<T>) -> Self {
        let fees = Arc::new(BlockApi::new(transport.clone()));
        Self { transport, fees }
    }

    /// Uses `fees` instead of the node for fee lookups.
    pub fn with_fee_source(transport: Arc<T>, fees: Arc<dyn FeeSource>) -> Self {
        Self { transport, fees }
    }

    pub fn network(&self) -> &Network {
        self.transport.network()
    }

    /// A transfer of `params.amount` to `params.recipient_id`.
    pub async fn create_transaction(
        &self,
        params: TransactionSend,
    ) -> Result<Transaction, TransactionError> {
        let network = self.network();
        let (keys, second_keys) = key_pairs(&params.credential, params.second_credential.as_ref())?;

        let builder = TransactionBuilder::send(
            network,
            *keys.public_key(),
            &params.recipient_id,
            params.amount,
        )?;
        let builder = finish_intent(builder, params.timestamp, params.vendor_field.as_deref())?;

        self.sign(builder, &keys, second_keys.as_ref()).await
    }

    /// Adds or removes a vote for `params.delegate_public_key`.
    pub async fn create_vote(&self, params: TransactionVote) -> Result<Transaction, TransactionError> {
        let network = self.network();
        let (keys, second_keys) = key_pairs(&params.credential, params.second_credential.as_ref())?;
        let delegate = parse_public_key(&params.delegate_public_key)?;

        let builder = TransactionBuilder::vote(
            network,
            *keys.public_key(),
            vec![Vote::new(params.vote_type, delegate)],
        );
        let builder = finish_intent(builder, params.timestamp, params.vendor_field.as_deref())?;

        self.sign(builder, &keys, second_keys.as_ref()).await
    }

    /// Registers the sender as a delegate.
    pub async fn create_delegate(
        &self,
        params: TransactionDelegate,
    ) -> Result<Transaction, TransactionError> {
        let (keys, second_keys) = key_pairs(&params.credential, params.second_credential.as_ref())?;
        let public_key = params
            .public_key
            .as_deref()
            .map(parse_public_key)
            .transpose()?;

        let builder =
            TransactionBuilder::create_delegate(*keys.public_key(), &params.username, public_key)?;
        let builder = finish_intent(builder, params.timestamp, params.vendor_field.as_deref())?;

        self.sign(builder, &keys, second_keys.as_ref()).await
    }

    /// Registers a second signing key. Signed with the primary key only.
    pub async fn create_signature(
        &self,
        params: TransactionSignature,
    ) -> Result<Transaction, TransactionError> {
        let keys = key_pair(&params.credential)?;
        let second_public_key = *key_pair(&params.second_credential)?.public_key();

        let builder = TransactionBuilder::second_signature(*keys.public_key(), second_public_key);
        let builder = finish_intent(builder, params.timestamp, params.vendor_field.as_deref())?;

        self.sign(builder, &keys, None).await
    }

    async fn sign(
        &self,
        builder: TransactionBuilder,
        keys: &KeyPair,
        second_keys: Option<&KeyPair>,
    ) -> Result<Transaction, TransactionError> {
        let fees = self.fees.network_fees(self.network()).await?;
        let body = builder.build(&fees);
        let tx = sign_transaction(body, keys, second_keys)?;
        debug!(id = %tx.id(), tx_type = %tx.transaction_type(), "transaction created");
        Ok(tx)
    }

    /// Broadcasts `tx`.
    ///
    /// Without a peer, the transport's active peer receives it at
    /// `/peer/transactions`. With a peer, it goes straight to
    /// `http://{ip}:{port}/peer/transactions` (see [`peer_transactions_url`]).
    pub async fn post(
        &self,
        tx: &Transaction,
        peer: Option<&Peer>,
    ) -> Result<TransactionPostResponse, TransportError> {
        let body = serde_json::to_value(TransactionPostRequest {
            transactions: vec![tx],
        })
        .map_err(|e| TransportError::Decode(e.to_string()))?;

        let raw = match peer {
            Some(peer) => {
                let url = peer_transactions_url(self.network(), peer);
                info!(id = %tx.id(), url = %url, "posting transaction to peer");
                self.transport.post_native(&url, body).await?
            }
            None => {
                info!(id = %tx.id(), peer = %self.network().active_peer, "posting transaction");
                self.transport.post(PEER_TRANSACTIONS_PATH, body).await?
            }
        };

        let response: TransactionPostResponse =
            serde_json::from_value(raw).map_err(|e| TransportError::Decode(e.to_string()))?;
        if !response.success && response.transaction_ids.is_empty() {
            warn!(
                id = %tx.id(),
                message = response.message.as_deref().or(response.error.as_deref()).unwrap_or(""),
                "transaction not accepted"
            );
        }
        Ok(response)
    }

    /// `GET /transactions/get?id=`.
    pub async fn get(&self, id: &str) -> Result<TransactionResponse, TransportError> {
        self.query("/transactions/get", &[("id".to_string(), id.to_string())])
            .await
    }

    /// `GET /transactions/unconfirmed/get?id=`.
    pub async fn get_unconfirmed(&self, id: &str) -> Result<TransactionResponse, TransportError> {
        self.query(
            "/transactions/unconfirmed/get",
            &[("id".to_string(), id.to_string())],
        )
        .await
    }

    /// `GET /transactions` with optional filters.
    pub async fn list(
        &self,
        params: Option<&TransactionQueryParams>,
    ) -> Result<TransactionResponse, TransportError> {
        let query = params.map(TransactionQueryParams::to_query).unwrap_or_default();
        self.query("/transactions", &query).await
    }

    /// `GET /transactions/unconfirmed` with optional filters.
    pub async fn list_unconfirmed(
        &self,
        params: Option<&TransactionQueryParams>,
    ) -> Result<TransactionResponse, TransportError> {
        let query = params.map(TransactionQueryParams::to_query).unwrap_or_default();
        self.query("/transactions/unconfirmed", &query).await
    }

    async fn query(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<TransactionResponse, TransportError> {
        let raw = self.transport.get(path, query).await?;
        serde_json::from_value(raw).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Broadcast URL for a specific peer.
///
/// v2 networks accept transactions on their dedicated P2P port; v1 networks
/// on the peer's own port.
pub fn peer_transactions_url(network: &Network, peer: &Peer) -> String {
    let port = match (network.is_v2, network.p2p_port) {
        (true, Some(p2p_port)) => p2p_port,
        _ => peer.port,
    };
    format!("http://{}:{}{}", peer.ip, port, PEER_TRANSACTIONS_PATH)
}

fn key_pair(credential: &Credential) -> Result<KeyPair, TransactionError> {
    credential
        .key_pair()
        .map_err(|e| TransactionError::InvalidEncoding(e.to_string()))
}

fn key_pairs(
    credential: &Credential,
    second: Option<&Credential>,
) -> Result<(KeyPair, Option<KeyPair>), TransactionError> {
    let keys = key_pair(credential)?;
    let second_keys = second.map(key_pair).transpose()?;
    Ok((keys, second_keys))
}

fn parse_public_key(hex_key: &str) -> Result<PublicKey, TransactionError> {
    PublicKey::from_hex(hex_key).map_err(|e| TransactionError::InvalidPublicKey(e.to_string()))
}

fn finish_intent(
    builder: TransactionBuilder,
    timestamp: Option<u32>,
    vendor_field: Option<&str>,
) -> Result<TransactionBuilder, TransactionError> {
    let builder = match vendor_field {
        Some(text) => builder.vendor_field(text)?,
        None => builder,
    };
    Ok(match timestamp {
        Some(timestamp) => builder.timestamp(timestamp),
        None => builder,
    })
}
