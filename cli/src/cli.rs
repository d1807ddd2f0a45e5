//! # CLI Interface
//!
//! Defines the command-line argument structure for `sbx-cli` using `clap`
//! derive. Every signing subcommand works offline: fees come from the
//! launch schedule unless `--fee` says otherwise.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sbx_protocol::config::NetworkType;

use crate::logging::LogFormat;

/// Offline transaction signing for SBX networks.
///
/// Signs transfers, votes, delegate and second signature registrations, and
/// prints the signed transaction together with the body a node expects at
/// `/peer/transactions`.
#[derive(Parser, Debug)]
#[command(
    name = "sbx-cli",
    about = "Offline transaction signing for SBX networks",
    version,
    propagate_version = true
)]
pub struct SbxCli {
    /// Built-in network to sign for.
    #[arg(long, short = 'n', global = true, env = "SBX_NETWORK", default_value = "alphanet")]
    pub network: NetworkType,

    /// JSON file with custom network parameters. Takes precedence over
    /// `--network`.
    #[arg(long, global = true, env = "SBX_NETWORK_FILE")]
    pub network_file: Option<PathBuf>,

    /// Peer (`ip:port`) that replaces the network's active peer.
    #[arg(long, global = true, env = "SBX_PEER")]
    pub peer: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the address, public key and WIF of a key.
    Address(KeyArgs),
    /// Sign a transfer.
    Send(SendArgs),
    /// Sign a vote for, or against, a delegate.
    Vote(VoteArgs),
    /// Sign a delegate registration.
    Delegate(DelegateArgs),
    /// Sign a second signature registration.
    SecondSignature(SecondSignatureArgs),
    /// Decode a signed transaction from hex and check its signatures.
    Decode(DecodeArgs),
    /// List the built-in networks.
    Networks,
}

/// The signing key: a passphrase or a WIF.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct KeyArgs {
    /// BIP39-style passphrase. Prefer the environment variable over the flag.
    #[arg(long, env = "SBX_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// WIF-encoded private key. Must carry the selected network's WIF byte.
    #[arg(long, env = "SBX_WIF", hide_env_values = true)]
    pub wif: Option<String>,
}

/// Options shared by every signing subcommand.
#[derive(Args, Debug, Clone)]
pub struct TxArgs {
    /// Second passphrase, for accounts with a second signature registered.
    #[arg(long, env = "SBX_SECOND_PASSPHRASE", hide_env_values = true)]
    pub second_passphrase: Option<String>,

    /// Seconds since the network epoch. Defaults to now.
    #[arg(long)]
    pub timestamp: Option<u32>,

    /// Free text, at most 64 bytes of UTF-8.
    #[arg(long)]
    pub vendor_field: Option<String>,

    /// Fee in the smallest unit, instead of the launch schedule.
    #[arg(long)]
    pub fee: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Recipient address.
    #[arg(long, short = 'r')]
    pub recipient: String,

    /// Amount in the smallest unit (10^-8).
    #[arg(long, short = 'a')]
    pub amount: u64,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub tx: TxArgs,
}

#[derive(Parser, Debug)]
pub struct VoteArgs {
    /// Hex-encoded public key of the delegate.
    #[arg(long, short = 'd')]
    pub delegate: String,

    /// Remove the vote instead of adding it.
    #[arg(long)]
    pub remove: bool,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub tx: TxArgs,
}

#[derive(Parser, Debug)]
pub struct DelegateArgs {
    /// Delegate name: 1 to 20 of `a-z`, `0-9` and `!@$&_.`.
    #[arg(long, short = 'u')]
    pub username: String,

    /// Public key to register. Must be the sender's, which is the default.
    #[arg(long)]
    pub public_key: Option<String>,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub tx: TxArgs,
}

#[derive(Parser, Debug)]
pub struct SecondSignatureArgs {
    /// Passphrase of the second key being registered.
    #[arg(long, env = "SBX_NEW_SECOND_PASSPHRASE", hide_env_values = true)]
    pub new_second_passphrase: String,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Seconds since the network epoch. Defaults to now.
    #[arg(long)]
    pub timestamp: Option<u32>,

    /// Free text, at most 64 bytes of UTF-8.
    #[arg(long)]
    pub vendor_field: Option<String>,

    /// Fee in the smallest unit, instead of the launch schedule.
    #[arg(long)]
    pub fee: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Signed transaction bytes, hex encoded.
    pub hex: String,

    /// Hex public key of the sender's registered second signature, if any.
    #[arg(long)]
    pub second_public_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        SbxCli::command().debug_assert();
    }

    #[test]
    fn parses_send() {
        let cli = SbxCli::try_parse_from([
            "sbx-cli",
            "--network",
            "testnet",
            "send",
            "--recipient",
            "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi",
            "--amount",
            "10",
            "--passphrase",
            "mysecret",
            "--vendor-field",
            "hi",
        ])
        .unwrap();

        assert_eq!(cli.network, NetworkType::Testnet);
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.amount, 10);
                assert_eq!(args.key.passphrase.as_deref(), Some("mysecret"));
                assert_eq!(args.tx.vendor_field.as_deref(), Some("hi"));
                assert!(args.tx.fee.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn passphrase_and_wif_conflict() {
        let result = SbxCli::try_parse_from([
            "sbx-cli",
            "address",
            "--passphrase",
            "a",
            "--wif",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_network_rejected() {
        let result = SbxCli::try_parse_from(["sbx-cli", "--network", "mainnet", "networks"]);
        assert!(result.is_err());
    }
}
