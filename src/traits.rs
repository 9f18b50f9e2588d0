//! Core trait abstraction for talking to the bridge contracts.
//!
//! Every task is written against [`BridgeClient`], so the same code drives a
//! live network through [`AlloyClient`](crate::providers::AlloyClient) and the
//! in-process [`SimulatedNetwork`](crate::testing::SimulatedNetwork) used by
//! tests.
//!
//! # Example: Driving a task with the simulator
//!
//! ```rust,ignore
//! use lockbridge::testing::SimulatedNetwork;
//! use lockbridge::BridgeClient;
//!
//! let network = SimulatedNetwork::new();
//! network.add_chain(31337);
//! let client = network.client(31337, signer_address);
//!
//! let token = client.deploy(&DeployRequest::TokenMock).await?.address;
//! client.token_mint(token, client.address(), amount).await?;
//! ```

use alloy_primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;

use crate::contracts::artifact::DeployRequest;
use crate::error::Result;
use crate::indexer::IndexedEvent;
use crate::params::{MessagingFee, SendParam};

/// A contract created by [`BridgeClient::deploy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployed {
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Signed access to one chain.
///
/// Read calls take `&self` and never change state. State-changing calls wait
/// for the transaction to be mined and return its hash; a reverted
/// transaction surfaces as
/// [`BridgeError::ContractReverted`](crate::BridgeError::ContractReverted).
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Limit violations rejected by the vault
/// - Missing peers and unwired endpoints
/// - Insufficient fees or allowances
/// - Supply conservation across both chains
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Address of the signer sending transactions.
    fn address(&self) -> Address;

    async fn chain_id(&self) -> Result<u64>;

    async fn block_number(&self) -> Result<u64>;

    async fn native_balance(&self, account: Address) -> Result<U256>;

    /// Deploys a contract and waits for its receipt.
    async fn deploy(&self, request: &DeployRequest) -> Result<Deployed>;

    /// One-time `initialize(owner)` on a vault or adapter.
    async fn initialize(&self, contract: Address, owner: Address) -> Result<TxHash>;

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256>;

    async fn token_approve(&self, token: Address, spender: Address, amount: U256)
        -> Result<TxHash>;

    /// Mints `amount` of a mock token to `to`.
    async fn token_mint(&self, token: Address, to: Address, amount: U256) -> Result<TxHash>;

    async fn lock(&self, vault: Address, amount: U256) -> Result<TxHash>;

    async fn unlock(&self, vault: Address, amount: U256) -> Result<TxHash>;

    /// Bridges part of the signer's locked balance through the vault.
    async fn bridge_locked(
        &self,
        vault: Address,
        params: &SendParam,
        fee: MessagingFee,
    ) -> Result<TxHash>;

    async fn set_max_lock_amount(&self, vault: Address, amount: U256) -> Result<TxHash>;

    async fn set_personal_limits(
        &self,
        vault: Address,
        max_amount: U256,
        min_amount: U256,
    ) -> Result<TxHash>;

    async fn locked_of(&self, vault: Address, user: Address) -> Result<U256>;

    /// Quotes the messaging fee of a send through `oapp`.
    async fn quote_send(
        &self,
        oapp: Address,
        params: &SendParam,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee>;

    async fn send(
        &self,
        oapp: Address,
        params: &SendParam,
        fee: MessagingFee,
        refund_address: Address,
    ) -> Result<TxHash>;

    async fn set_peer(&self, oapp: Address, eid: u32, peer: B256) -> Result<TxHash>;

    async fn peer(&self, oapp: Address, eid: u32) -> Result<B256>;

    /// Tells a mock endpoint which endpoint serves `dest_oapp`.
    async fn set_dest_lz_endpoint(
        &self,
        endpoint: Address,
        dest_oapp: Address,
        dest_endpoint: Address,
    ) -> Result<TxHash>;

    /// Bridge events emitted by `contracts` from `from_block` onwards, in
    /// chain order.
    async fn events(&self, contracts: &[Address], from_block: u64) -> Result<Vec<IndexedEvent>>;
}
