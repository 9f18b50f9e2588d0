//! Alloy-based bridge client implementation.

use std::collections::HashMap;

use alloy_chains::Chain;
use alloy_json_rpc::RpcError;
use alloy_network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, TxHash, B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{BlockNumberOrTag, Filter, TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use tracing::{debug, info, instrument, trace, Instrument};
use url::Url;

use crate::config::GasLimits;
use crate::contracts::artifact::{ArtifactStore, DeployRequest};
use crate::contracts::endpoint::EndpointMockContract;
use crate::contracts::lock::LockVaultContract;
use crate::contracts::oft::OftContract;
use crate::contracts::token::TokenContract;
use crate::error::{BridgeError, Result};
use crate::indexer::{decode_log, IndexedEvent};
use crate::params::{MessagingFee, SendParam};
use crate::spans;
use crate::traits::{BridgeClient, Deployed};

/// Production bridge client wrapping Alloy's [`Provider`] trait.
///
/// The provider must be able to sign for `signer` (a wallet filler or an
/// unlocked node account). State-changing calls wait for their receipt and
/// turn a failed status into [`BridgeError::ContractReverted`].
///
/// # Examples
///
/// ```rust,no_run
/// use lockbridge::providers::AlloyClient;
/// use lockbridge::{ArtifactStore, GasLimits};
/// use alloy_signer_local::PrivateKeySigner;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = PrivateKeySigner::random();
/// let client = AlloyClient::connect(
///     "http://localhost:8545".parse()?,
///     signer,
///     GasLimits::default(),
///     ArtifactStore::new("artifacts"),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyClient<P = DynProvider>
where
    P: Provider<Ethereum> + Clone,
{
    provider: P,
    signer: Address,
    chain: Chain,
    gas: GasLimits,
    artifacts: ArtifactStore,
}

impl AlloyClient<DynProvider> {
    /// Connects over HTTP with a local signing key.
    pub async fn connect(
        rpc_url: Url,
        signer: PrivateKeySigner,
        gas: GasLimits,
        artifacts: ArtifactStore,
    ) -> Result<Self> {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(rpc_url.clone())
            .erased();
        let chain_id = provider.get_chain_id().await?;

        info!(
            rpc_url = %rpc_url,
            chain = %Chain::from_id(chain_id),
            signer = %address,
            event = "client_connected"
        );
        Ok(Self::new(provider, address, chain_id, gas, artifacts))
    }
}

impl<P> AlloyClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    /// Creates a new [`AlloyClient`] around an already configured provider.
    pub fn new(
        provider: P,
        signer: Address,
        chain_id: u64,
        gas: GasLimits,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            provider,
            signer,
            chain: Chain::from_id(chain_id),
            gas,
            artifacts,
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Sends `tx`, waits for the receipt and checks its status.
    async fn submit(&self, tx: TransactionRequest, gas_limit: Option<u64>) -> Result<TransactionReceipt> {
        let tx = match gas_limit {
            Some(limit) => tx.with_gas_limit(limit),
            None => tx,
        };

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(rpc_error)?;
        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, event = "transaction_sent");

        let receipt = pending
            .get_receipt()
            .instrument(spans::wait_for_receipt(tx_hash, &self.chain))
            .await
            .map_err(|e| BridgeError::TransactionFailed {
                reason: e.to_string(),
            })?;

        if !ReceiptResponse::status(&receipt) {
            return Err(BridgeError::revert(format!("transaction {tx_hash} reverted")));
        }

        debug!(
            tx_hash = %tx_hash,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            event = "transaction_confirmed"
        );
        Ok(receipt)
    }

    async fn submit_hash(&self, tx: TransactionRequest, gas_limit: Option<u64>) -> Result<TxHash> {
        Ok(self.submit(tx, gas_limit).await?.transaction_hash)
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await?
            .ok_or_else(|| BridgeError::Provider(format!("block {number} not found")))?;
        Ok(block.header.timestamp)
    }

    fn token(&self, address: Address) -> TokenContract<P> {
        TokenContract::new(address, self.provider.clone())
    }

    fn vault(&self, address: Address) -> LockVaultContract<P> {
        LockVaultContract::new(address, self.provider.clone())
    }

    fn oft(&self, address: Address) -> OftContract<P> {
        OftContract::new(address, self.provider.clone())
    }
}

/// Maps an RPC failure, recognising execution reverts reported by the node.
fn rpc_error(error: RpcError<TransportErrorKind>) -> BridgeError {
    if let Some(payload) = error.as_error_resp() {
        if payload.message.to_lowercase().contains("revert") {
            return BridgeError::revert(payload.message.to_string());
        }
    }
    BridgeError::Rpc(error)
}

fn contract_error(error: alloy_contract::Error) -> BridgeError {
    match error {
        alloy_contract::Error::TransportError(e) => rpc_error(e),
        other => BridgeError::ContractCall(other.to_string()),
    }
}

#[async_trait]
impl<P> BridgeClient for AlloyClient<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    fn address(&self) -> Address {
        self.signer
    }

    #[instrument(skip(self))]
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    #[instrument(skip(self))]
    async fn block_number(&self) -> Result<u64> {
        trace!("Fetching current block number");
        let block_number = self.provider.get_block_number().await?;
        debug!(block_number = block_number, "Current block number retrieved");
        Ok(block_number)
    }

    #[instrument(skip(self))]
    async fn native_balance(&self, account: Address) -> Result<U256> {
        Ok(self.provider.get_balance(account).await?)
    }

    #[instrument(skip(self), fields(contract = request.artifact_name()))]
    async fn deploy(&self, request: &DeployRequest) -> Result<Deployed> {
        let code = self.artifacts.creation_code(request)?;
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_deploy_code(code);

        let receipt = self.submit(tx, None).await?;
        let address = receipt.contract_address.ok_or_else(|| BridgeError::TransactionFailed {
            reason: format!("no contract address in receipt of {}", receipt.transaction_hash),
        })?;

        info!(
            contract = request.artifact_name(),
            address = %address,
            tx_hash = %receipt.transaction_hash,
            event = "contract_deployed"
        );
        Ok(Deployed {
            address,
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default(),
        })
    }

    #[instrument(skip(self))]
    async fn initialize(&self, contract: Address, owner: Address) -> Result<TxHash> {
        // vault and adapter share the `initialize(address)` selector
        let tx = self.vault(contract).initialize_transaction(self.signer, owner);
        self.submit_hash(tx, None).await
    }

    #[instrument(skip(self))]
    async fn token_balance(&self, token: Address, account: Address) -> Result<U256> {
        self.token(token)
            .balance_of(account)
            .await
            .map_err(contract_error)
    }

    #[instrument(skip(self))]
    async fn token_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash> {
        let tx = self.token(token).approve_transaction(self.signer, spender, amount);
        self.submit_hash(tx, self.gas.approve).await
    }

    #[instrument(skip(self))]
    async fn token_mint(&self, token: Address, to: Address, amount: U256) -> Result<TxHash> {
        let tx = self.token(token).mint_transaction(self.signer, to, amount);
        self.submit_hash(tx, None).await
    }

    #[instrument(skip(self))]
    async fn lock(&self, vault: Address, amount: U256) -> Result<TxHash> {
        let tx = self.vault(vault).lock_transaction(self.signer, amount);
        self.submit_hash(tx, self.gas.lock).await
    }

    #[instrument(skip(self))]
    async fn unlock(&self, vault: Address, amount: U256) -> Result<TxHash> {
        let tx = self.vault(vault).unlock_transaction(self.signer, amount);
        self.submit_hash(tx, self.gas.unlock).await
    }

    #[instrument(skip(self, params), fields(dst_eid = params.dst_eid()))]
    async fn bridge_locked(
        &self,
        vault: Address,
        params: &SendParam,
        fee: MessagingFee,
    ) -> Result<TxHash> {
        let tx = self.vault(vault).bridge_transaction(self.signer, params, fee);
        self.submit_hash(tx, self.gas.bridge).await
    }

    #[instrument(skip(self))]
    async fn set_max_lock_amount(&self, vault: Address, amount: U256) -> Result<TxHash> {
        let tx = self
            .vault(vault)
            .set_max_lock_amount_transaction(self.signer, amount);
        self.submit_hash(tx, None).await
    }

    #[instrument(skip(self))]
    async fn set_personal_limits(
        &self,
        vault: Address,
        max_amount: U256,
        min_amount: U256,
    ) -> Result<TxHash> {
        let tx = self
            .vault(vault)
            .set_personal_limits_transaction(self.signer, max_amount, min_amount);
        self.submit_hash(tx, None).await
    }

    #[instrument(skip(self))]
    async fn locked_of(&self, vault: Address, user: Address) -> Result<U256> {
        self.vault(vault)
            .locked_of(user)
            .await
            .map_err(contract_error)
    }

    #[instrument(skip(self, params), fields(dst_eid = params.dst_eid()))]
    async fn quote_send(
        &self,
        oapp: Address,
        params: &SendParam,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee> {
        self.oft(oapp)
            .quote_send(params, pay_in_lz_token)
            .await
            .map_err(contract_error)
    }

    #[instrument(skip(self, params), fields(dst_eid = params.dst_eid()))]
    async fn send(
        &self,
        oapp: Address,
        params: &SendParam,
        fee: MessagingFee,
        refund_address: Address,
    ) -> Result<TxHash> {
        let tx = self
            .oft(oapp)
            .send_transaction(self.signer, params, fee, refund_address);
        self.submit_hash(tx, self.gas.bridge).await
    }

    #[instrument(skip(self))]
    async fn set_peer(&self, oapp: Address, eid: u32, peer: B256) -> Result<TxHash> {
        let tx = self.oft(oapp).set_peer_transaction(self.signer, eid, peer);
        self.submit_hash(tx, None).await
    }

    #[instrument(skip(self))]
    async fn peer(&self, oapp: Address, eid: u32) -> Result<B256> {
        self.oft(oapp).peers(eid).await.map_err(contract_error)
    }

    #[instrument(skip(self))]
    async fn set_dest_lz_endpoint(
        &self,
        endpoint: Address,
        dest_oapp: Address,
        dest_endpoint: Address,
    ) -> Result<TxHash> {
        let tx = EndpointMockContract::new(endpoint, self.provider.clone())
            .set_dest_lz_endpoint_transaction(self.signer, dest_oapp, dest_endpoint);
        self.submit_hash(tx, None).await
    }

    #[instrument(skip(self, contracts), fields(contracts = contracts.len()))]
    async fn events(&self, contracts: &[Address], from_block: u64) -> Result<Vec<IndexedEvent>> {
        let filter = Filter::new()
            .address(contracts.to_vec())
            .from_block(from_block);
        let logs = self.provider.get_logs(&filter).await?;
        debug!(logs = logs.len(), from_block = from_block, event = "logs_fetched");

        let mut timestamps: HashMap<u64, u64> = HashMap::new();
        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            let Some(mut indexed) = decode_log(log)? else {
                continue;
            };
            if indexed.meta.timestamp == 0 {
                let number = indexed.meta.block_number;
                let timestamp = match timestamps.get(&number) {
                    Some(timestamp) => *timestamp,
                    None => {
                        let timestamp = self.block_timestamp(number).await?;
                        timestamps.insert(number, timestamp);
                        timestamp
                    }
                };
                indexed.meta.timestamp = timestamp;
            }
            events.push(indexed);
        }
        Ok(events)
    }
}
