//! ERC20 token bindings for approval, minting and balance checks
//!
//! The source chain token is an ERC20 (a mintable mock on test networks).
//! Locking and bridging both pull tokens with `transferFrom`, so an approval
//! has to precede them.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::{debug, info};

use super::abi::DogecoinMock::DogecoinMockInstance;

/// ERC20 token contract wrapper
///
/// # Example
///
/// ```rust,no_run
/// use lockbridge::TokenContract;
/// use alloy_primitives::{address, U256};
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let token = TokenContract::new(address!("6847D8C9DB2bC2a0086Cb4Ba067e7f1112ADb6E9"), provider);
///
/// let owner = address!("1234567890123456789012345678901234567890");
/// let vault = address!("0987654321098765432109876543210987654321");
/// if token.allowance(owner, vault).await? < U256::from(5_000_000_000u64) {
///     let tx = token.approve_transaction(owner, vault, U256::from(5_000_000_000u64));
///     // Send transaction...
/// }
/// # Ok(())
/// # }
/// ```
pub struct TokenContract<P: Provider<Ethereum>> {
    instance: DogecoinMockInstance<P>,
}

impl<P: Provider<Ethereum>> TokenContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "token_contract_initialized"
        );
        Self {
            instance: DogecoinMockInstance::new(address, provider),
        }
    }

    /// Amount `spender` may pull from `owner`.
    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, alloy_contract::Error> {
        let result = self.instance.allowance(owner, spender).call().await?;

        debug!(
            owner = %owner,
            spender = %spender,
            allowance = %result,
            contract_address = %self.instance.address(),
            event = "allowance_retrieved"
        );

        Ok(result)
    }

    /// Token balance of `account`.
    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy_contract::Error> {
        let result = self.instance.balanceOf(account).call().await?;

        debug!(
            account = %account,
            balance = %result,
            contract_address = %self.instance.address(),
            event = "balance_retrieved"
        );

        Ok(result)
    }

    /// Creates, but does not send, an `approve(spender, amount)` transaction.
    pub fn approve_transaction(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            spender = %spender,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "approve_transaction_created"
        );

        self.instance
            .approve(spender, amount)
            .from(from)
            .into_transaction_request()
    }

    /// Creates a `mint(to, amount)` transaction. Only mock tokens expose it.
    pub fn mint_transaction(&self, from: Address, to: Address, amount: U256) -> TransactionRequest {
        info!(
            from = %from,
            to = %to,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "mint_transaction_created"
        );

        self.instance
            .mint(to, amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}
