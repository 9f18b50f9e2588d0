use alloy_primitives::{Address, TxHash, U256};
use tracing::{info, Instrument};

use super::bridge::QuoteOutcome;
use super::chain_of;
use crate::amount::{min_amount_with_slippage, parse_amount, SOURCE_TOKEN_DECIMALS};
use crate::config::BridgeConfig;
use crate::deployments::DeploymentRecord;
use crate::error::Result;
use crate::options::{ExecutorOptions, DEFAULT_LZ_RECEIVE_GAS};
use crate::params::{address_to_bytes32, SendParam};
use crate::spans;
use crate::traits::BridgeClient;

/// Destination endpoint id used by `user-bridge`.
pub const USER_BRIDGE_DST_EID: u32 = 2;

/// Share of the amount that must arrive for `user-bridge`.
const USER_BRIDGE_MIN_PERCENT: u64 = 95;

/// What `user-bridge` quoted and submitted.
pub type UserBridgeOutcome = QuoteOutcome;

/// Approves and locks `amount` (human units) in the recorded vault.
pub async fn user_lock<C>(config: &BridgeConfig, client: &C, amount: &str) -> Result<TxHash>
where
    C: BridgeClient + ?Sized,
{
    config.network.require_testnet("user-lock")?;
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let amount = parse_amount(amount, SOURCE_TOKEN_DECIMALS)?;
    lock(client, &record, amount).await
}

/// Unlocks `amount` (human units) from the recorded vault.
pub async fn user_unlock<C>(config: &BridgeConfig, client: &C, amount: &str) -> Result<TxHash>
where
    C: BridgeClient + ?Sized,
{
    config.network.require_testnet("user-unlock")?;
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let amount = parse_amount(amount, SOURCE_TOKEN_DECIMALS)?;
    unlock(client, &record, amount).await
}

/// Bridges `amount` (human units) of the signer's locked balance to eid 2.
pub async fn user_bridge<C>(config: &BridgeConfig, client: &C, amount: &str) -> Result<UserBridgeOutcome>
where
    C: BridgeClient + ?Sized,
{
    config.network.require_testnet("user-bridge")?;
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let amount = parse_amount(amount, SOURCE_TOKEN_DECIMALS)?;
    bridge(config, client, &record, amount).await
}

pub(super) async fn lock<C>(client: &C, record: &DeploymentRecord, amount: U256) -> Result<TxHash>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let user = client.address();
    let span = spans::lock(&chain, &record.lock, &user, &amount);

    async {
        info!(amount = %amount, event = "approving_tokens");
        client
            .token_approve(record.token, record.lock, amount)
            .await
            .inspect_err(spans::record_error)?;

        info!(amount = %amount, event = "locking_tokens");
        let tx_hash = client
            .lock(record.lock, amount)
            .await
            .inspect_err(spans::record_error)?;

        info!(tx_hash = %tx_hash, event = "lock_completed");
        Ok(tx_hash)
    }
    .instrument(span)
    .await
}

pub(super) async fn unlock<C>(client: &C, record: &DeploymentRecord, amount: U256) -> Result<TxHash>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let user = client.address();
    let span = spans::unlock(&chain, &record.lock, &user, &amount);

    async {
        let tx_hash = client
            .unlock(record.lock, amount)
            .await
            .inspect_err(spans::record_error)?;

        info!(tx_hash = %tx_hash, event = "unlock_completed");
        Ok(tx_hash)
    }
    .instrument(span)
    .await
}

pub(super) async fn bridge<C>(
    config: &BridgeConfig,
    client: &C,
    record: &DeploymentRecord,
    amount: U256,
) -> Result<UserBridgeOutcome>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let adapter = record.adapter(&config.network.name)?;
    let span = spans::bridge(&chain, &record.lock, USER_BRIDGE_DST_EID, &amount, true);

    async {
        let recipient: Address = client.address();
        let send_param = SendParam::builder()
            .dst_eid(USER_BRIDGE_DST_EID)
            .to(address_to_bytes32(recipient))
            .amount_ld(amount)
            .min_amount_ld(min_amount_with_slippage(amount, USER_BRIDGE_MIN_PERCENT))
            .extra_options(ExecutorOptions::lz_receive(DEFAULT_LZ_RECEIVE_GAS).to_bytes())
            .build();

        let fee = client
            .quote_send(adapter, &send_param, false)
            .await
            .inspect_err(spans::record_error)?;
        info!(
            native_fee = %fee.native_fee,
            lz_token_fee = %fee.lz_token_fee,
            event = "bridge_fee_quoted"
        );

        client
            .token_approve(record.token, record.lock, amount)
            .await
            .inspect_err(spans::record_error)?;

        let tx_hash = client
            .bridge_locked(record.lock, &send_param, fee)
            .await
            .inspect_err(spans::record_error)?;
        info!(tx_hash = %tx_hash, event = "bridge_completed");

        Ok(QuoteOutcome {
            send_param,
            fee,
            tx_hash: Some(tx_hash),
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::CONVERSION_MULTIPLIER;
    use crate::error::BridgeError;
    use crate::tasks::deploy_local;
    use crate::testing::SimulatedNetwork;
    use tempfile::TempDir;

    const CHAIN: u64 = 48816;

    /// Deploys a local pair and re-saves its record as the `testnet` record.
    async fn testnet_setup() -> (TempDir, BridgeConfig, crate::testing::SimulatedClient, DeploymentRecord) {
        let dir = TempDir::new().unwrap();
        let local = BridgeConfig::from_lookup("localhost", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let network = SimulatedNetwork::new();
        let client = network.client(CHAIN, Address::repeat_byte(0x01));
        network.fund_all(CHAIN, &[client.address()]).unwrap();
        let deployment = deploy_local(&local, &client).await.unwrap();
        deployment.record.save(dir.path(), "testnet").unwrap();

        let config = BridgeConfig::from_lookup("testnet", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        (dir, config, client, deployment.record)
    }

    #[tokio::test]
    async fn test_user_lock_and_unlock_in_human_units() {
        let (_dir, config, client, record) = testnet_setup().await;
        let user = client.address();
        let before = client.token_balance(record.token, user).await.unwrap();

        user_lock(&config, &client, "50").await.unwrap();
        assert_eq!(
            client.locked_of(record.lock, user).await.unwrap(),
            U256::from(5_000_000_000u64)
        );

        user_unlock(&config, &client, "50").await.unwrap();
        assert_eq!(client.locked_of(record.lock, user).await.unwrap(), U256::ZERO);
        assert_eq!(client.token_balance(record.token, user).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_user_bridge_uses_receive_option_and_slippage() {
        let (_dir, config, client, record) = testnet_setup().await;
        let user = client.address();
        user_lock(&config, &client, "100").await.unwrap();

        let outcome = user_bridge(&config, &client, "50").await.unwrap();
        let amount = U256::from(5_000_000_000u64);

        assert_eq!(outcome.send_param.dst_eid(), USER_BRIDGE_DST_EID);
        assert_eq!(outcome.send_param.min_amount_ld(), U256::from(4_750_000_000u64));
        assert_eq!(
            outcome.send_param.extra_options(),
            &ExecutorOptions::lz_receive(200_000).to_bytes()
        );
        assert_eq!(client.locked_of(record.lock, user).await.unwrap(), amount);
        assert_eq!(
            client
                .token_balance(record.destination_oft.unwrap(), user)
                .await
                .unwrap(),
            amount * CONVERSION_MULTIPLIER
        );
    }

    #[tokio::test]
    async fn test_user_tasks_refuse_local_networks() {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_lookup("localhost", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let client = SimulatedNetwork::new().client(31337, Address::repeat_byte(0x01));

        let err = user_lock(&config, &client, "50").await.unwrap_err();
        assert!(matches!(err, BridgeError::NetworkRestricted { task: "user-lock", .. }));
    }

    #[tokio::test]
    async fn test_user_tasks_refuse_public_testnets() {
        let (dir, _config, client, record) = testnet_setup().await;
        record.save(dir.path(), "bsc-testnet").unwrap();
        let config = BridgeConfig::from_lookup("bsc-testnet", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());

        let err = user_bridge(&config, &client, "10").await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::NetworkRestricted { task: "user-bridge", ref network, .. } if network == "bsc-testnet"
        ));
        assert_eq!(
            client.locked_of(record.lock, client.address()).await.unwrap(),
            U256::ZERO
        );
    }

    #[tokio::test]
    async fn test_missing_record_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_lookup("testnet", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let client = SimulatedNetwork::new().client(CHAIN, Address::repeat_byte(0x01));

        let err = user_unlock(&config, &client, "50").await.unwrap_err();
        assert!(matches!(err, BridgeError::DeploymentNotFound { .. }));
    }
}
