//! # Protocol Configuration & Constants
//!
//! Every constant the wire format depends on lives here, next to the
//! built-in network parameter sets. A width or a fee written inline anywhere
//! else is a bug waiting for the next network upgrade.
//!
//! The network parameters mirror what the SBX nodes publish: address version
//! byte, WIF byte, BIP32 prefixes, nethash and the seed peers. They are read
//! only -- the engine never mutates a [`Network`], it only consults it.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum delegate username length, in characters.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Punctuation a delegate username may use besides `a-z` and `0-9`.
pub const USERNAME_SYMBOLS: &str = "!@$&_.";

/// Whether `username` is a name nodes accept for a delegate: 1 to
/// [`MAX_USERNAME_LENGTH`] characters, each a lowercase ASCII letter, a digit
/// or one of [`USERNAME_SYMBOLS`].
///
/// None of these bytes can start the integer part of a DER signature, which
/// is what lets the decoder find where an unprefixed username ends.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= MAX_USERNAME_LENGTH
        && username.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || USERNAME_SYMBOLS.contains(c)
        })
}

/// The vendor field occupies a fixed 64-byte slot in the canonical layout.
pub const VENDOR_FIELD_LENGTH: usize = 64;

/// Width of a decoded address (version byte + RIPEMD-160 digest).
pub const ADDRESS_LENGTH: usize = 21;

/// Compressed secp256k1 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Raw private scalar length.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// WIF byte of Ark mainnet keys, which SBX wallets import unchanged.
pub const ARK_WIF: u8 = 0xaa;

/// Whether a WIF version byte belongs to a built-in network or to Ark.
pub fn is_known_wif(tag: u8) -> bool {
    tag == ARK_WIF || Network::all().iter().any(|network| network.wif == tag)
}

// ---------------------------------------------------------------------------
// Default Fees
// ---------------------------------------------------------------------------

/// Default fees in the smallest unit (10^-8 SBX). Nodes publish the live
/// schedule at `/blocks/getFees`; these are only used for offline signing.
pub const DEFAULT_SEND_FEE: u64 = 10_000_000;
pub const DEFAULT_VOTE_FEE: u64 = 100_000_000;
pub const DEFAULT_SECOND_SIGNATURE_FEE: u64 = 500_000_000;
pub const DEFAULT_DELEGATE_FEE: u64 = 2_500_000_000;

// ---------------------------------------------------------------------------
// Network Epoch
// ---------------------------------------------------------------------------

/// The network epoch: 2017-03-21 13:00:00 UTC. Transaction timestamps are
/// seconds elapsed since this instant, not Unix time.
pub fn network_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 3, 21, 13, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Converts a wall-clock instant into a network timestamp.
///
/// Instants before the epoch clamp to zero; instants past `u32::MAX` seconds
/// clamp to `u32::MAX`.
pub fn network_time_at(instant: DateTime<Utc>) -> u32 {
    let secs = (instant - network_epoch()).num_seconds();
    secs.clamp(0, u32::MAX as i64) as u32
}

/// Current network timestamp.
pub fn network_time() -> u32 {
    network_time_at(Utc::now())
}

// ---------------------------------------------------------------------------
// Peer
// ---------------------------------------------------------------------------

/// A network node reachable over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub ip: String,
    pub port: u16,
}

impl Peer {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Base URL of the peer's public API, e.g. `http://1.2.3.4:4100`.
    pub fn api_url(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl FromStr for Peer {
    type Err = String;

    /// Parses the `ip:port` form used in the seed peer lists.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("missing port in peer '{}'", s))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| format!("invalid port in peer '{}': {}", s, e))?;
        if ip.is_empty() {
            return Err(format!("missing host in peer '{}'", s));
        }
        Ok(Self::new(ip, port))
    }
}

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// The built-in networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Alphanet,
    Testnet,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alphanet => write!(f, "alphanet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alphanet" => Ok(Self::Alphanet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// BIP32 extended key version prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bip32Versions {
    pub private: u32,
    pub public: u32,
}

/// Parameters of one network. Passed by reference into every key, address
/// and transport operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: String,
    pub nethash: String,
    pub token: String,
    pub symbol: String,
    /// Address version byte.
    pub version: u8,
    /// WIF version byte.
    pub wif: u8,
    pub bip32: Bip32Versions,
    #[serde(default)]
    pub explorer: Option<String>,
    #[serde(default)]
    pub p2p_version: Option<String>,
    pub active_peer: Peer,
    #[serde(default)]
    pub peers: Vec<String>,
    /// Second protocol generation nodes accept transactions on a dedicated
    /// P2P port rather than on the peer's API port.
    #[serde(default)]
    pub is_v2: bool,
    #[serde(default)]
    pub p2p_port: Option<u16>,
}

impl Network {
    /// Returns the parameter set of a built-in network.
    pub fn default_for(kind: NetworkType) -> Self {
        match kind {
            NetworkType::Alphanet => Self {
                name: "alphanet".to_string(),
                nethash: "d21f07a10a8314d558132de8a3848e6fa9edde754638d1aacd381c6efb8be81d"
                    .to_string(),
                token: "SBX".to_string(),
                symbol: "SBX".to_string(),
                version: 0x4B,
                wif: 0xbb,
                bip32: Bip32Versions {
                    private: 0x0435_87cf,
                    public: 0x0435_8394,
                },
                explorer: Some("https://explorer.swapblocks.io".to_string()),
                p2p_version: Some("0.0.1".to_string()),
                active_peer: Peer::new("136.144.141.118", 4100),
                peers: vec![
                    "164.132.216.107:4100".to_string(),
                    "167.99.82.39:4100".to_string(),
                ],
                is_v2: false,
                p2p_port: None,
            },
            NetworkType::Testnet => Self {
                name: "testnet".to_string(),
                nethash: "9d39602ff3d69780da2c9f5ed5e24451409f6511e226bd540dd84a375508ce5b"
                    .to_string(),
                token: "DSBX".to_string(),
                symbol: "DSBX".to_string(),
                version: 0x52,
                wif: 0xba,
                bip32: Bip32Versions {
                    private: 0x0435_87cf,
                    public: 0x0435_8394,
                },
                explorer: Some("https://dexplorer.swapblocks.io".to_string()),
                p2p_version: Some("0.0.1".to_string()),
                active_peer: Peer::new("136.144.141.118", 4111),
                peers: vec![
                    "164.132.216.107:4111".to_string(),
                    "167.99.82.39:4111".to_string(),
                ],
                is_v2: false,
                p2p_port: None,
            },
        }
    }

    /// All built-in networks, alphanet first.
    pub fn all() -> Vec<Self> {
        vec![
            Self::default_for(NetworkType::Alphanet),
            Self::default_for(NetworkType::Testnet),
        ]
    }

    /// Replaces the peer used for API calls.
    pub fn set_peer(&mut self, peer: Peer) {
        self.active_peer = peer;
    }

    /// Base URL of the active peer's API.
    pub fn peer_api_url(&self) -> String {
        self.active_peer.api_url()
    }

    /// Parses the seed peer list, skipping malformed entries.
    pub fn seed_peers(&self) -> Vec<Peer> {
        self.peers.iter().filter_map(|p| p.parse().ok()).collect()
    }
}
