//! # Node API
//!
//! The boundary between the signing engine and the network. Nothing in this
//! module does HTTP itself; it shapes requests, interprets responses and
//! sequences the `create_*` calls around the single fee lookup.
//!
//! ```text
//! transport.rs       -- Transport trait, TransportError, MemoryTransport
//! fees.rs            -- FeeSchedule, FeeSource, BlockApi (/blocks/getFees)
//! models.rs          -- create_* parameters, post/query response shapes
//! transaction_api.rs -- TransactionApi: create, post, get, list
//! ```

pub mod fees;
pub mod models;
pub mod transaction_api;
pub mod transport;

pub use fees::{BlockApi, FeeSchedule, FeeSource};
pub use models::{
    TransactionDelegate, TransactionPostResponse, TransactionQueryParams, TransactionResponse,
    TransactionSend, TransactionSignature, TransactionVote,
};
pub use transaction_api::{peer_transactions_url, TransactionApi, PEER_TRANSACTIONS_PATH};
pub use transport::{MemoryTransport, Method, RecordedRequest, Transport, TransportError};
