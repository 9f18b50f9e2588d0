use alloy_primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;

use super::network::SimulatedNetwork;
use super::state::NetworkState;
use crate::contracts::artifact::DeployRequest;
use crate::error::Result;
use crate::indexer::{decode_log, IndexedEvent};
use crate::params::{MessagingFee, SendParam};
use crate::traits::{BridgeClient, Deployed};

/// [`BridgeClient`] for one signer on one simulated chain.
#[derive(Clone, Debug)]
pub struct SimulatedClient {
    network: SimulatedNetwork,
    chain_id: u64,
    signer: Address,
}

impl SimulatedClient {
    pub(crate) fn new(network: SimulatedNetwork, chain_id: u64, signer: Address) -> Self {
        Self {
            network,
            chain_id,
            signer,
        }
    }

    /// Same chain, different signer.
    pub fn with_signer(&self, signer: Address) -> Self {
        Self::new(self.network.clone(), self.chain_id, signer)
    }

    pub fn network(&self) -> &SimulatedNetwork {
        &self.network
    }

    fn transact(
        &self,
        label: &'static str,
        f: impl FnOnce(&mut NetworkState) -> Result<()>,
    ) -> Result<TxHash> {
        let (tx_hash, _, ()) = self.network.transact(self.chain_id, self.signer, label, f)?;
        Ok(tx_hash)
    }
}

#[async_trait]
impl BridgeClient for SimulatedClient {
    fn address(&self) -> Address {
        self.signer
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        self.network.block_number(self.chain_id)
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.network
            .read(|state| Ok(state.chain(self.chain_id)?.native_balance(account)))
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<Deployed> {
        let (tx_hash, block_number, address) = self.network.transact(
            self.chain_id,
            self.signer,
            request.artifact_name(),
            |state| state.deploy(self.chain_id, request),
        )?;
        Ok(Deployed {
            address,
            tx_hash,
            block_number,
        })
    }

    async fn initialize(&self, contract: Address, owner: Address) -> Result<TxHash> {
        self.transact("initialize", |state| {
            state.initialize(self.chain_id, contract, owner)
        })
    }

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256> {
        self.network.read(|state| {
            Ok(state
                .chain(self.chain_id)?
                .token(token)?
                .balance_of(account))
        })
    }

    async fn token_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash> {
        self.transact("approve", |state| {
            state.approve(self.chain_id, self.signer, token, spender, amount)
        })
    }

    async fn token_mint(&self, token: Address, to: Address, amount: U256) -> Result<TxHash> {
        self.transact("mint", |state| state.mint(self.chain_id, token, to, amount))
    }

    async fn lock(&self, vault: Address, amount: U256) -> Result<TxHash> {
        self.transact("lock", |state| {
            state.lock(self.chain_id, self.signer, vault, amount)
        })
    }

    async fn unlock(&self, vault: Address, amount: U256) -> Result<TxHash> {
        self.transact("unlock", |state| {
            state.unlock(self.chain_id, self.signer, vault, amount)
        })
    }

    async fn bridge_locked(
        &self,
        vault: Address,
        params: &SendParam,
        fee: MessagingFee,
    ) -> Result<TxHash> {
        self.transact("bridge", |state| {
            state.bridge_locked(self.chain_id, self.signer, vault, params, fee)
        })
    }

    async fn set_max_lock_amount(&self, vault: Address, amount: U256) -> Result<TxHash> {
        self.transact("setMaxLockAmount", |state| {
            state.set_max_lock_amount(self.chain_id, self.signer, vault, amount)
        })
    }

    async fn set_personal_limits(
        &self,
        vault: Address,
        max_amount: U256,
        min_amount: U256,
    ) -> Result<TxHash> {
        self.transact("setPersonalLimits", |state| {
            state.set_personal_limits(self.chain_id, self.signer, vault, max_amount, min_amount)
        })
    }

    async fn locked_of(&self, vault: Address, user: Address) -> Result<U256> {
        self.network
            .read(|state| state.locked_of(self.chain_id, vault, user))
    }

    async fn quote_send(
        &self,
        oapp: Address,
        params: &SendParam,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee> {
        self.network
            .read(|state| state.quote_send(self.chain_id, oapp, params, pay_in_lz_token))
    }

    async fn send(
        &self,
        oapp: Address,
        params: &SendParam,
        fee: MessagingFee,
        refund_address: Address,
    ) -> Result<TxHash> {
        self.transact("send", |state| {
            state.oapp_send(
                self.chain_id,
                self.signer,
                oapp,
                params,
                fee,
                fee.native_fee,
                refund_address,
                false,
            )
        })
    }

    async fn set_peer(&self, oapp: Address, eid: u32, peer: B256) -> Result<TxHash> {
        self.transact("setPeer", |state| {
            state.set_peer(self.chain_id, self.signer, oapp, eid, peer)
        })
    }

    async fn peer(&self, oapp: Address, eid: u32) -> Result<B256> {
        self.network
            .read(|state| state.peer(self.chain_id, oapp, eid))
    }

    async fn set_dest_lz_endpoint(
        &self,
        endpoint: Address,
        dest_oapp: Address,
        dest_endpoint: Address,
    ) -> Result<TxHash> {
        self.transact("setDestLzEndpoint", |state| {
            state.set_dest_lz_endpoint(self.chain_id, endpoint, dest_oapp, dest_endpoint)
        })
    }

    async fn events(&self, contracts: &[Address], from_block: u64) -> Result<Vec<IndexedEvent>> {
        self.network.read(|state| {
            state
                .chain(self.chain_id)?
                .logs()
                .iter()
                .filter(|log| {
                    contracts.contains(&log.address())
                        && log.block_number.unwrap_or_default() >= from_block
                })
                .filter_map(|log| decode_log(log).transpose())
                .collect()
        })
    }
}
