// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SBX Protocol -- Transaction Engine
//!
//! Builds, serializes and signs transactions for the SBX networks (alphanet
//! and testnet, both Ark v1 descendants) and hands them to a node.
//!
//! The wire contract is not ours to choose. Nodes accept a transaction only
//! if its bytes, its secp256k1 signature and its SHA-256 id match theirs to
//! the last bit, so most of this crate is about getting bytes exactly right.
//!
//! ## Architecture
//!
//! - **config** -- Protocol constants, network parameters, network time.
//! - **crypto** -- Hashes, secp256k1 keys, WIF, DER signatures.
//! - **identity** -- Base58Check addresses.
//! - **transaction** -- Types, builder, canonical serializer, signing,
//!   verification.
//! - **api** -- Transport and fee seams, and the transaction endpoints.
//!
//! ## Design Philosophy
//!
//! 1. Byte compatibility over elegance. If a node disagrees, the node wins.
//! 2. Validate before any I/O. A typo never costs a round trip.
//! 3. A signed transaction is immutable. There is no setter to forget about.
//! 4. Key material lives for one call and is wiped on drop.

pub mod api;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod transaction;
