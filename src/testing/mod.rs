//! Simulated chains for testing bridge tasks without a node
//!
//! This module provides an in-process model of the deployed contracts that
//! implements [`BridgeClient`](crate::BridgeClient), so every task can run
//! end to end in unit and integration tests.
//!
//! The model enforces the observable contract behaviour the tasks rely on:
//! - ERC20 balances and allowances
//! - vault limits (minimum, personal maximum, global maximum) and ownership
//! - peer checks on both sides of a message and endpoint wiring
//! - fee payment and slippage protection
//! - decimal conversion between an 8-decimal adapter and an 18-decimal OFT
//!
//! Reverts surface as [`BridgeError::ContractReverted`](crate::BridgeError::ContractReverted)
//! carrying the custom error name (`"ExceedsPersonalLimit"`, `"NoPeer"`, ...).

mod client;
mod network;
mod state;

pub use client::SimulatedClient;
pub use network::SimulatedNetwork;
