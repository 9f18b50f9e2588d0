//! OFT and OFT adapter bindings
//!
//! Adapters (wrapping an existing ERC20) and native OFTs expose the same
//! messaging surface, so a single wrapper covers both.

use alloy_network::Ethereum;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::{debug, info};

use super::abi::Oft::OftInstance;
use crate::params::{MessagingFee, SendParam};

/// OFT / OFT adapter contract wrapper
pub struct OftContract<P: Provider<Ethereum>> {
    instance: OftInstance<P>,
}

impl<P: Provider<Ethereum>> OftContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "oft_contract_initialized"
        );
        Self {
            instance: OftInstance::new(address, provider),
        }
    }

    /// Quotes the messaging fee for sending with `params`.
    pub async fn quote_send(
        &self,
        params: &SendParam,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee, alloy_contract::Error> {
        let fee: MessagingFee = self
            .instance
            .quoteSend(params.into(), pay_in_lz_token)
            .call()
            .await?
            .into();

        debug!(
            dst_eid = params.dst_eid(),
            amount = %params.amount_ld(),
            native_fee = %fee.native_fee,
            lz_token_fee = %fee.lz_token_fee,
            contract_address = %self.instance.address(),
            event = "send_quoted"
        );
        Ok(fee)
    }

    /// Peer registered for `eid`, zero when none is set.
    pub async fn peers(&self, eid: u32) -> Result<B256, alloy_contract::Error> {
        self.instance.peers(eid).call().await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy_contract::Error> {
        self.instance.balanceOf(account).call().await
    }

    pub fn initialize_transaction(&self, from: Address, owner: Address) -> TransactionRequest {
        info!(
            from = %from,
            owner = %owner,
            contract_address = %self.instance.address(),
            event = "initialize_transaction_created"
        );
        self.instance
            .initialize(owner)
            .from(from)
            .into_transaction_request()
    }

    /// Creates a `send` transaction carrying the native fee as value.
    pub fn send_transaction(
        &self,
        from: Address,
        params: &SendParam,
        fee: MessagingFee,
        refund_address: Address,
    ) -> TransactionRequest {
        info!(
            from = %from,
            dst_eid = params.dst_eid(),
            recipient = %params.recipient(),
            amount = %params.amount_ld(),
            native_fee = %fee.native_fee,
            refund_address = %refund_address,
            contract_address = %self.instance.address(),
            event = "send_transaction_created"
        );
        self.instance
            .send(params.into(), fee.into(), refund_address)
            .value(fee.native_fee)
            .from(from)
            .into_transaction_request()
    }

    pub fn set_peer_transaction(&self, from: Address, eid: u32, peer: B256) -> TransactionRequest {
        info!(
            from = %from,
            eid = eid,
            peer = %peer,
            contract_address = %self.instance.address(),
            event = "set_peer_transaction_created"
        );
        self.instance
            .setPeer(eid, peer)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}
