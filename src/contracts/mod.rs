//! Contract bindings for the lock vault and OFT bridge
//!
//! This module contains Alloy-generated bindings ([`abi`]) and thin wrappers
//! that build instrumented transaction requests for them.
//!
//! ## Public API
//!
//! - [`TokenContract`](token::TokenContract): source ERC20 (approve, mint, balances)
//! - [`LockVaultContract`](lock::LockVaultContract): lock, unlock, bridge and limits
//! - [`OftContract`](oft::OftContract): quote, send and peers on adapters and OFTs
//! - [`EndpointMockContract`](endpoint::EndpointMockContract): local endpoint routing
//! - [`ArtifactStore`](artifact::ArtifactStore) / [`DeployRequest`](artifact::DeployRequest): creation code

pub mod abi;
pub mod artifact;
pub mod endpoint;
pub mod lock;
pub mod oft;
pub mod token;
