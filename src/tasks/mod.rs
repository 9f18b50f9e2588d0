//! Operational tasks behind the `lockbridge` subcommands
//!
//! Each task follows the same shape: read configuration, resolve contract
//! addresses, build call parameters, optionally quote, optionally submit,
//! then log and return a typed outcome. Tasks are generic over
//! [`BridgeClient`], so they run unchanged against a live node
//! ([`AlloyClient`](crate::providers::AlloyClient)) or the in-process
//! [`SimulatedNetwork`](crate::testing::SimulatedNetwork).
//!
//! Nothing here retries. The first failing call aborts the task and its error
//! is returned to the caller.

mod admin;
mod bridge;
mod deploy;
mod index;
mod seed;
mod user;

pub use admin::{set_max_limit, set_peer, set_personal_limits, AdminOutcome, SetPeerArgs};
pub use bridge::{bridge_lock, bridge_oft, BridgeArgs, BridgeLockArgs, QuoteOutcome};
pub use deploy::{
    deploy_local, deploy_oft, ChainRole, DeployOftArgs, DeployOutcome, LocalDeployment,
    LOCAL_DEST_EID, LOCAL_INITIAL_MINT, LOCAL_SOURCE_EID,
};
pub use index::{index_events, IndexOutcome};
pub use seed::{
    create_test_data, create_user_data, SeedReport, BRIDGE_TEST_DATA, LOCK_TEST_DATA,
};
pub use user::{user_bridge, user_lock, user_unlock, UserBridgeOutcome, USER_BRIDGE_DST_EID};

use alloy_chains::Chain;

use crate::error::Result;
use crate::traits::BridgeClient;

/// Chain the client is connected to, for span attributes.
async fn chain_of<C>(client: &C) -> Result<Chain>
where
    C: BridgeClient + ?Sized,
{
    Ok(Chain::from_id(client.chain_id().await?))
}

/// Logs the signer and its native balance, the preamble of every task.
async fn log_signer<C>(network: &str, client: &C) -> Result<()>
where
    C: BridgeClient + ?Sized,
{
    let chain_id = client.chain_id().await?;
    let signer = client.address();
    let balance = client.native_balance(signer).await?;
    tracing::info!(
        network = network,
        chain_id = chain_id,
        signer = %signer,
        native_balance = %balance,
        event = "task_signer"
    );
    Ok(())
}
