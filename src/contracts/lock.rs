//! Lock vault bindings
//!
//! The vault holds users' source tokens. `lock` pulls tokens in, `unlock`
//! returns them, and `bridge` forwards locked tokens through the OFT adapter.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::{debug, info};

use super::abi::DogeLock::DogeLockInstance;
use crate::params::{MessagingFee, SendParam};

/// Lock vault contract wrapper
pub struct LockVaultContract<P: Provider<Ethereum>> {
    instance: DogeLockInstance<P>,
}

impl<P: Provider<Ethereum>> LockVaultContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "lock_vault_contract_initialized"
        );
        Self {
            instance: DogeLockInstance::new(address, provider),
        }
    }

    /// Amount currently locked by `user`.
    pub async fn locked_of(&self, user: Address) -> Result<U256, alloy_contract::Error> {
        let locked = self.instance.lockedOf(user).call().await?;
        debug!(
            user = %user,
            locked = %locked,
            contract_address = %self.instance.address(),
            event = "locked_balance_retrieved"
        );
        Ok(locked)
    }

    pub async fn total_locked(&self) -> Result<U256, alloy_contract::Error> {
        self.instance.totalLocked().call().await
    }

    /// One-time initialization setting the owner.
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

    pub fn lock_transaction(&self, from: Address, amount: U256) -> TransactionRequest {
        info!(
            from = %from,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "lock_transaction_created"
        );
        self.instance
            .lock(amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn unlock_transaction(&self, from: Address, amount: U256) -> TransactionRequest {
        info!(
            from = %from,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "unlock_transaction_created"
        );
        self.instance
            .unlock(amount)
            .from(from)
            .into_transaction_request()
    }

    /// Bridges `params.amount_ld()` of the sender's locked balance, paying
    /// the native part of `fee` as call value.
    pub fn bridge_transaction(
        &self,
        from: Address,
        params: &SendParam,
        fee: MessagingFee,
    ) -> TransactionRequest {
        info!(
            from = %from,
            dst_eid = params.dst_eid(),
            amount = %params.amount_ld(),
            min_amount = %params.min_amount_ld(),
            native_fee = %fee.native_fee,
            contract_address = %self.instance.address(),
            event = "bridge_transaction_created"
        );
        self.instance
            .bridge(params.into(), fee.into())
            .value(fee.native_fee)
            .from(from)
            .into_transaction_request()
    }

    pub fn set_max_lock_amount_transaction(
        &self,
        from: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            max_lock_amount = %amount,
            contract_address = %self.instance.address(),
            event = "set_max_lock_amount_transaction_created"
        );
        self.instance
            .setMaxLockAmount(amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn set_personal_limits_transaction(
        &self,
        from: Address,
        max_amount: U256,
        min_amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            max_amount = %max_amount,
            min_amount = %min_amount,
            contract_address = %self.instance.address(),
            event = "set_personal_limits_transaction_created"
        );
        self.instance
            .setPersonalLimits(max_amount, min_amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}
