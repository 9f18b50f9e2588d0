//! # lockbridge
//!
//! Deployment, operation and indexing tooling for a lock/mint token bridge
//! built on an OFT adapter and a LayerZero-v2-style messaging endpoint.
//!
//! On the source chain users lock an 8-decimal token in a vault, and the vault
//! can forward locked tokens to an OFT adapter which sends them to a native
//! 18-decimal OFT on the destination chain. This crate wires those contracts
//! together, drives them, and turns their events into queryable entities.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lockbridge::providers::AlloyClient;
//! use lockbridge::tasks::{self, BridgeArgs};
//! use lockbridge::{ArtifactStore, BridgeConfig, BridgeError};
//! use alloy_primitives::{address, U256};
//!
//! # async fn example() -> Result<(), BridgeError> {
//! let config = BridgeConfig::from_env("sepolia-testnet")?;
//! let client = AlloyClient::connect(
//!     config.network.rpc_url.clone(),
//!     config.accounts.deployer()?,
//!     config.gas,
//!     ArtifactStore::new(&config.artifacts_dir),
//! )
//! .await?;
//!
//! // Quote a send of 1 token (8 decimals) to eid 40102 without submitting it
//! let args = BridgeArgs {
//!     oft: address!("6EDCE65403992e310A62460808c4b910D972f10f"),
//!     eid: 40102,
//!     value: U256::from(100_000_000u64),
//!     execute: false,
//!     receiver: None,
//! };
//! let outcome = tasks::bridge_oft(&config, &client, &args).await?;
//! println!("fee: {}", outcome.fee);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing Without a Node
//!
//! Every task is generic over [`BridgeClient`]. The [`testing`] module
//! provides an in-process simulation of the deployed contracts:
//!
//! ```rust
//! use lockbridge::testing::SimulatedNetwork;
//! use lockbridge::tasks;
//! use lockbridge::BridgeConfig;
//! use alloy_primitives::Address;
//!
//! # async fn example() -> Result<(), lockbridge::BridgeError> {
//! let network = SimulatedNetwork::new();
//! let client = network.client(31337, Address::repeat_byte(0x01));
//! network.fund_all(31337, &[Address::repeat_byte(0x01)])?;
//!
//! let config = BridgeConfig::from_lookup("localhost", |_| None)?;
//! let deployment = tasks::deploy_local(&config, &client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`BridgeClient`] - Signed access to one chain, implemented by
//!   [`AlloyClient`](providers::AlloyClient) and
//!   [`SimulatedClient`](testing::SimulatedClient)
//! - [`tasks`] - The operational commands (deploy, lock, bridge, limits, seeding, indexing)
//! - [`indexer`] - Event-to-entity mapping with load-or-create semantics
//! - [`BridgeConfig`] - Network, accounts and gas settings passed into every task
//! - [`BridgeError`] and [`Result`] - Error types for error handling
//! - Contract wrappers for direct contract interaction: [`TokenContract`],
//!   [`LockVaultContract`], [`OftContract`], [`EndpointMockContract`]

mod error;

pub mod amount;
pub mod config;
pub mod contracts;
pub mod deployments;
pub mod indexer;
pub mod options;
pub mod params;
pub mod providers;
pub mod tasks;
pub mod testing;
pub mod traits;

// Public module for advanced users who need custom instrumentation
pub mod spans;

pub use config::{Accounts, BridgeConfig, GasLimits, NetworkConfig, NetworkKind};
pub use contracts::{
    artifact::{ArtifactStore, DeployRequest},
    endpoint::EndpointMockContract,
    lock::LockVaultContract,
    oft::OftContract,
    token::TokenContract,
};
pub use deployments::DeploymentRecord;
pub use error::{BridgeError, Result};
pub use options::ExecutorOptions;
pub use params::{MessagingFee, SendParam};
pub use traits::{BridgeClient, Deployed};
