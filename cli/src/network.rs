//! Network selection: a built-in parameter set or a JSON file.

use anyhow::{Context, Result};
use std::path::Path;

use sbx_protocol::config::{Network, NetworkType, Peer};

/// Loads a [`Network`] from a JSON file in the node's camelCase shape.
pub fn load_network(path: &Path) -> Result<Network> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read network file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse network file {}", path.display()))
}

/// Resolves the network to sign for. A file wins over the built-in kind; a
/// `peer` replaces the active peer of either.
pub fn resolve(kind: NetworkType, file: Option<&Path>, peer: Option<&str>) -> Result<Network> {
    let mut network = match file {
        Some(path) => load_network(path)?,
        None => Network::default_for(kind),
    };
    if let Some(peer) = peer {
        let peer: Peer = peer
            .parse()
            .map_err(anyhow::Error::msg)
            .context("invalid --peer")?;
        network.set_peer(peer);
    }
    Ok(network)
}
