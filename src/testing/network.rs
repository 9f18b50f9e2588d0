use std::sync::{Arc, Mutex};

use alloy_primitives::{utils::parse_ether, Address, TxHash, U256};
use tracing::debug;

use super::client::SimulatedClient;
use super::state::NetworkState;
use crate::error::Result;

/// In-process set of chains joined by mock messaging endpoints.
///
/// Clones share state. Each successful transaction mines one block on its
/// chain (and one on every chain a message was delivered to); a failed
/// transaction leaves every chain exactly as it was.
#[derive(Clone, Debug)]
pub struct SimulatedNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedNetwork {
    /// Flat native fee quoted for every message: 0.001 ether.
    pub const DEFAULT_NATIVE_FEE: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

    pub fn new() -> Self {
        Self::with_native_fee(Self::DEFAULT_NATIVE_FEE)
    }

    pub fn with_native_fee(native_fee: U256) -> Self {
        Self {
            state: Arc::new(Mutex::new(NetworkState::new(native_fee))),
        }
    }

    /// Adds an empty chain. Adding an existing chain is a no-op.
    pub fn add_chain(&self, chain_id: u64) -> &Self {
        self.state.lock().unwrap().add_chain(chain_id);
        self
    }

    /// Credits `amount` of native currency to `account`.
    pub fn fund(&self, chain_id: u64, account: Address, amount: U256) -> Result<()> {
        self.state.lock().unwrap().fund(chain_id, account, amount)
    }

    /// Credits 100 ether to each account.
    pub fn fund_all(&self, chain_id: u64, accounts: &[Address]) -> Result<()> {
        let amount = parse_ether("100")?;
        for account in accounts {
            self.fund(chain_id, *account, amount)?;
        }
        Ok(())
    }

    /// Client signing as `signer` on `chain_id`.
    pub fn client(&self, chain_id: u64, signer: Address) -> SimulatedClient {
        self.add_chain(chain_id);
        SimulatedClient::new(self.clone(), chain_id, signer)
    }

    pub fn native_fee(&self) -> U256 {
        self.state.lock().unwrap().native_fee
    }

    pub fn block_number(&self, chain_id: u64) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain(chain_id)?.block_number)
    }

    pub fn total_supply(&self, chain_id: u64, token: Address) -> Result<U256> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .chain(chain_id)?
            .token(token)?
            .total_supply)
    }

    /// On-chain total locked in `vault`.
    pub fn total_locked(&self, chain_id: u64, vault: Address) -> Result<U256> {
        let state = self.state.lock().unwrap();
        let chain = state.chain(chain_id)?;
        Ok(chain
            .vaults
            .get(&vault)
            .map(|vault| vault.total_locked)
            .unwrap_or_default())
    }

    /// Runs a read against the current state.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&NetworkState) -> Result<T>) -> Result<T> {
        f(&self.state.lock().unwrap())
    }

    /// Runs `f` as one transaction sent from `from` on `chain_id`.
    ///
    /// `f` works on a copy of the state that is committed only when it
    /// succeeds.
    pub(crate) fn transact<T>(
        &self,
        chain_id: u64,
        from: Address,
        label: &'static str,
        f: impl FnOnce(&mut NetworkState) -> Result<T>,
    ) -> Result<(TxHash, u64, T)> {
        let mut state = self.state.lock().unwrap();
        let mut working = state.clone();
        working.chain(chain_id)?;

        let output = match f(&mut working) {
            Ok(output) => output,
            Err(error) => {
                debug!(
                    chain_id = chain_id,
                    from = %from,
                    call = label,
                    error = %error,
                    event = "simulated_transaction_reverted"
                );
                return Err(error);
            }
        };

        let tx_hash = working.next_id("tx");
        let block_number = working.mine(chain_id, tx_hash)?;
        *state = working;

        debug!(
            chain_id = chain_id,
            from = %from,
            call = label,
            tx_hash = %tx_hash,
            block_number = block_number,
            event = "simulated_transaction_mined"
        );
        Ok((tx_hash, block_number, output))
    }
}
