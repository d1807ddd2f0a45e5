// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SBX CLI
//!
//! Entry point for the `sbx-cli` binary. Parses CLI arguments, initializes
//! logging, signs the requested transaction and prints it as JSON on stdout.
//!
//! Signing never touches the network. The transaction API runs over an
//! in-memory transport with a fixed fee schedule, so the output can be
//! reviewed before anything is broadcast.

mod cli;
mod logging;
mod network;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::sync::Arc;

use sbx_protocol::api::{
    peer_transactions_url, FeeSchedule, MemoryTransport, TransactionApi, TransactionDelegate,
    TransactionSend, TransactionSignature, TransactionVote,
};
use sbx_protocol::config::Network;
use sbx_protocol::crypto::{Credential, KeyPair, PrivateKey, PublicKey};
use sbx_protocol::transaction::{
    deserialize, signed_bytes, verify_transaction, Transaction, TransactionType, VoteType,
};

use cli::{Commands, KeyArgs, SbxCli, TxArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = SbxCli::parse();
    logging::init_logging(logging::default_level(cli.verbose), cli.log_format);

    let network = network::resolve(cli.network, cli.network_file.as_deref(), cli.peer.as_deref())?;
    tracing::info!(network = %network.name, peer = %network.active_peer, "network selected");

    let output = match cli.command {
        Commands::Address(key) => describe_key(&key, &network)?,
        Commands::Send(args) => {
            let api = offline_api(&network, TransactionType::Send, args.tx.fee);
            let mut params = TransactionSend::new(
                credential(&args.key, &network)?,
                args.recipient,
                args.amount,
            );
            params.second_credential = second_credential(&args.tx);
            params.timestamp = args.tx.timestamp;
            params.vendor_field = args.tx.vendor_field;
            let tx = api
                .create_transaction(params)
                .await
                .context("failed to sign transfer")?;
            signed_output(&network, &tx)?
        }
        Commands::Vote(args) => {
            let api = offline_api(&network, TransactionType::Vote, args.tx.fee);
            let direction = if args.remove {
                VoteType::Remove
            } else {
                VoteType::Add
            };
            let mut params =
                TransactionVote::new(credential(&args.key, &network)?, args.delegate, direction);
            params.second_credential = second_credential(&args.tx);
            params.timestamp = args.tx.timestamp;
            params.vendor_field = args.tx.vendor_field;
            let tx = api
                .create_vote(params)
                .await
                .context("failed to sign vote")?;
            signed_output(&network, &tx)?
        }
        Commands::Delegate(args) => {
            let api = offline_api(&network, TransactionType::CreateDelegate, args.tx.fee);
            let mut params = TransactionDelegate::new(credential(&args.key, &network)?, args.username);
            params.public_key = args.public_key;
            params.second_credential = second_credential(&args.tx);
            params.timestamp = args.tx.timestamp;
            params.vendor_field = args.tx.vendor_field;
            let tx = api
                .create_delegate(params)
                .await
                .context("failed to sign delegate registration")?;
            signed_output(&network, &tx)?
        }
        Commands::SecondSignature(args) => {
            let api = offline_api(&network, TransactionType::SecondSignature, args.fee);
            let mut params = TransactionSignature::new(
                credential(&args.key, &network)?,
                args.new_second_passphrase,
            );
            params.timestamp = args.timestamp;
            params.vendor_field = args.vendor_field;
            let tx = api
                .create_signature(params)
                .await
                .context("failed to sign second signature registration")?;
            signed_output(&network, &tx)?
        }
        Commands::Decode(args) => decode(&args.hex, args.second_public_key.as_deref())?,
        Commands::Networks => serde_json::to_value(Network::all())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// A transaction API that signs against a fixed fee schedule and never
/// leaves the process.
fn offline_api(
    network: &Network,
    kind: TransactionType,
    fee: Option<u64>,
) -> TransactionApi<MemoryTransport> {
    let transport = Arc::new(MemoryTransport::new(network.clone()));
    TransactionApi::with_fee_source(transport, Arc::new(fee_schedule(kind, fee)))
}

/// The launch schedule, with the fee of `kind` replaced by `fee` if given.
fn fee_schedule(kind: TransactionType, fee: Option<u64>) -> FeeSchedule {
    let mut fees = FeeSchedule::default();
    if let Some(fee) = fee {
        match kind {
            TransactionType::Send => fees.send = fee,
            TransactionType::SecondSignature => fees.second_signature = fee,
            TransactionType::CreateDelegate => fees.delegate = fee,
            TransactionType::Vote => fees.vote = fee,
        }
    }
    fees
}

fn credential(key: &KeyArgs, network: &Network) -> Result<Credential> {
    match (&key.passphrase, &key.wif) {
        (Some(passphrase), _) => Ok(Credential::from(passphrase.as_str())),
        (None, Some(wif)) => {
            let private_key = PrivateKey::from_wif_for(wif, network)
                .with_context(|| format!("WIF is not valid for network {}", network.name))?;
            Ok(Credential::from(private_key))
        }
        (None, None) => anyhow::bail!("either --passphrase or --wif is required"),
    }
}

fn second_credential(tx: &TxArgs) -> Option<Credential> {
    tx.second_passphrase.as_deref().map(Credential::from)
}

fn describe_key(key: &KeyArgs, network: &Network) -> Result<Value> {
    let keys: KeyPair = credential(key, network)?
        .key_pair()
        .context("failed to derive key pair")?;
    Ok(json!({
        "address": keys.public_key().to_address(network).to_string(),
        "publicKey": keys.public_key().to_hex(),
        "wif": keys.private_key().to_wif(network),
        "network": network.name,
    }))
}

fn signed_output(network: &Network, tx: &Transaction) -> Result<Value> {
    tracing::info!(id = %tx.id(), tx_type = %tx.transaction_type(), fee = tx.fee(), "transaction signed");
    Ok(json!({
        "transaction": tx,
        "bytes": hex::encode(signed_bytes(tx)),
        "post": {
            "url": peer_transactions_url(network, &network.active_peer),
            "body": { "transactions": [tx] },
        },
    }))
}

fn decode(hex_bytes: &str, second_public_key: Option<&str>) -> Result<Value> {
    let bytes = hex::decode(hex_bytes.trim()).context("transaction is not valid hex")?;
    let tx = deserialize(&bytes).context("failed to decode transaction")?;
    let second = second_public_key
        .map(PublicKey::from_hex)
        .transpose()
        .context("invalid --second-public-key")?;
    verify_transaction(&tx, second.as_ref()).context("transaction does not verify")?;
    Ok(json!({ "transaction": tx, "verified": true }))
}
