//! Fee schedules and where they come from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::transport::{Transport, TransportError};
use crate::config::{
    Network, DEFAULT_DELEGATE_FEE, DEFAULT_SECOND_SIGNATURE_FEE, DEFAULT_SEND_FEE,
    DEFAULT_VOTE_FEE,
};
use crate::transaction::types::TransactionType;

/// Fee per transaction type, in the smallest unit. Field names follow the
/// node's `/blocks/getFees` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub send: u64,
    pub vote: u64,
    #[serde(rename = "secondsignature")]
    pub second_signature: u64,
    pub delegate: u64,
    /// Reported by nodes but never charged by this engine.
    #[serde(
        rename = "multisignature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub multi_signature: Option<u64>,
}

impl FeeSchedule {
    pub fn fee_for(&self, kind: TransactionType) -> u64 {
        match kind {
            TransactionType::Send => self.send,
            TransactionType::SecondSignature => self.second_signature,
            TransactionType::CreateDelegate => self.delegate,
            TransactionType::Vote => self.vote,
        }
    }
}

impl Default for FeeSchedule {
    /// The fees the SBX networks launched with.
    fn default() -> Self {
        Self {
            send: DEFAULT_SEND_FEE,
            vote: DEFAULT_VOTE_FEE,
            second_signature: DEFAULT_SECOND_SIGNATURE_FEE,
            delegate: DEFAULT_DELEGATE_FEE,
            multi_signature: None,
        }
    }
}

/// Anything that can tell the current fees of a network.
///
/// Looked up once per `create_*` call and never cached; this is the only
/// await point of transaction creation.
#[async_trait]
pub trait FeeSource: Send + Sync {
    async fn network_fees(&self, network: &Network) -> Result<FeeSchedule, TransportError>;
}

/// A fixed schedule, for offline signing.
#[async_trait]
impl FeeSource for FeeSchedule {
    async fn network_fees(&self, _network: &Network) -> Result<FeeSchedule, TransportError> {
        Ok(*self)
    }
}

#[derive(Debug, Deserialize)]
struct FeesResponse {
    #[serde(default)]
    success: bool,
    fees: Option<FeeSchedule>,
    #[serde(default)]
    error: Option<String>,
}

/// Block endpoints of a node. Only the fee lookup is needed here.
pub struct BlockApi<T> {
    transport: Arc<T>,
}

impl<T: Transport> BlockApi<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// `GET /blocks/getFees`.
    pub async fn fees(&self) -> Result<FeeSchedule, TransportError> {
        let raw = self.transport.get("/blocks/getFees", &[]).await?;
        let response: FeesResponse =
            serde_json::from_value(raw).map_err(|e| TransportError::Decode(e.to_string()))?;
        match response {
            FeesResponse {
                success: true,
                fees: Some(fees),
                ..
            } => Ok(fees),
            FeesResponse { error, .. } => Err(TransportError::Rejected(
                error.unwrap_or_else(|| "fee lookup unsuccessful".to_string()),
            )),
        }
    }
}

#[async_trait]
impl<T: Transport> FeeSource for BlockApi<T> {
    async fn network_fees(&self, network: &Network) -> Result<FeeSchedule, TransportError> {
        debug!(network = %network.name, "fetching network fees");
        self.fees().await
    }
}
