use alloy_primitives::{Address, TxHash};
use tracing::{info, Instrument};

use super::chain_of;
use crate::amount::{parse_amount, SOURCE_TOKEN_DECIMALS};
use crate::config::BridgeConfig;
use crate::deployments::DeploymentRecord;
use crate::error::Result;
use crate::params::address_to_bytes32;
use crate::spans;
use crate::traits::BridgeClient;

/// Contract an owner call went to and the transaction that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminOutcome {
    pub contract: Address,
    pub tx_hash: TxHash,
}

/// Arguments of `set-peer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPeerArgs {
    pub eid: u32,
    pub peer: Address,
    /// OApp to configure, the recorded adapter when unset.
    pub contract: Option<Address>,
}

/// Sets the vault's global lock ceiling to `amount` (human units).
pub async fn set_max_limit<C>(config: &BridgeConfig, client: &C, amount: &str) -> Result<AdminOutcome>
where
    C: BridgeClient + ?Sized,
{
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let amount = parse_amount(amount, SOURCE_TOKEN_DECIMALS)?;
    let chain = chain_of(client).await?;

    async {
        let tx_hash = client
            .set_max_lock_amount(record.lock, amount)
            .await
            .inspect_err(spans::record_error)?;
        info!(max_lock_amount = %amount, tx_hash = %tx_hash, event = "max_lock_amount_set");
        Ok(AdminOutcome {
            contract: record.lock,
            tx_hash,
        })
    }
    .instrument(spans::admin(&chain, &record.lock, "setMaxLockAmount"))
    .await
}

/// Sets the per-user lock bounds (human units).
pub async fn set_personal_limits<C>(
    config: &BridgeConfig,
    client: &C,
    max: &str,
    min: &str,
) -> Result<AdminOutcome>
where
    C: BridgeClient + ?Sized,
{
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let max = parse_amount(max, SOURCE_TOKEN_DECIMALS)?;
    let min = parse_amount(min, SOURCE_TOKEN_DECIMALS)?;
    let chain = chain_of(client).await?;

    async {
        let tx_hash = client
            .set_personal_limits(record.lock, max, min)
            .await
            .inspect_err(spans::record_error)?;
        info!(
            max = %max,
            min = %min,
            tx_hash = %tx_hash,
            event = "personal_limits_set"
        );
        Ok(AdminOutcome {
            contract: record.lock,
            tx_hash,
        })
    }
    .instrument(spans::admin(&chain, &record.lock, "setPersonalLimits"))
    .await
}

/// Registers `peer` for `eid` on an OApp.
pub async fn set_peer<C>(config: &BridgeConfig, client: &C, args: &SetPeerArgs) -> Result<AdminOutcome>
where
    C: BridgeClient + ?Sized,
{
    let contract = match args.contract {
        Some(contract) => contract,
        None => DeploymentRecord::load(&config.deployments_dir, &config.network.name)?
            .adapter(&config.network.name)?,
    };
    let chain = chain_of(client).await?;

    async {
        let tx_hash = client
            .set_peer(contract, args.eid, address_to_bytes32(args.peer))
            .await
            .inspect_err(spans::record_error)?;
        info!(eid = args.eid, peer = %args.peer, tx_hash = %tx_hash, event = "peer_set");
        Ok(AdminOutcome { contract, tx_hash })
    }
    .instrument(spans::admin(&chain, &contract, "setPeer"))
    .await
}
