use alloy_primitives::{Address, U256};
use tracing::{info, warn, Instrument};

use super::{chain_of, user};
use crate::amount::{min_amount_with_slippage, parse_amount, SOURCE_TOKEN_DECIMALS};
use crate::config::BridgeConfig;
use crate::deployments::DeploymentRecord;
use crate::error::{BridgeError, Result};
use crate::params::{address_to_bytes32, SendParam};
use crate::spans;
use crate::traits::BridgeClient;

/// Amounts (human units) each test user locks, one list per user.
pub const LOCK_TEST_DATA: [&[&str]; 3] = [&["50", "100", "150"], &["1000", "2000"], &["50", "500", "150"]];

/// Amounts (human units) each test user sends through the adapter.
pub const BRIDGE_TEST_DATA: [&[&str]; 3] = [&["25", "75"], &["500"], &["50", "200"]];

/// Locks above this amount (human units) are followed by unlocking half.
const UNLOCK_HALF_ABOVE: &str = "100";

/// Destination endpoint id of seeded sends.
const SEED_DST_EID: u32 = 2;

/// Share of the amount that must arrive for seeded sends.
const SEED_MIN_PERCENT: u64 = 80;

/// Counts of the transactions a seeding run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub locks: usize,
    pub unlocks: usize,
    pub bridges: usize,
    /// Sends that reverted and were skipped.
    pub bridge_failures: usize,
}

/// Populates a local deployment with lock, unlock and bridge activity.
///
/// `owner` mints every amount before use. The first three `users` receive
/// [`LOCK_TEST_DATA`] and then [`BRIDGE_TEST_DATA`]; a lock above 100 tokens
/// is followed by an unlock of half of it. A failing send is logged and
/// skipped, any other failure aborts the run.
pub async fn create_test_data<C>(config: &BridgeConfig, owner: &C, users: &[C]) -> Result<SeedReport>
where
    C: BridgeClient,
{
    config.network.require_local("create-test-data")?;
    if users.len() < LOCK_TEST_DATA.len() {
        return Err(BridgeError::InvalidConfig(format!(
            "create-test-data needs {} user accounts, {} configured",
            LOCK_TEST_DATA.len(),
            users.len()
        )));
    }
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let adapter = record.adapter(&config.network.name)?;
    let chain = chain_of(owner).await?;

    async {
        info!(owner = %owner.address(), lock = %record.lock, event = "test_data_started");
        let mut report = SeedReport::default();
        let unlock_threshold = parse_amount(UNLOCK_HALF_ABOVE, SOURCE_TOKEN_DECIMALS)?;

        for (signer, amounts) in users.iter().zip(LOCK_TEST_DATA) {
            info!(user = %signer.address(), event = "creating_lock_data");
            for amount in amounts {
                let base = parse_amount(amount, SOURCE_TOKEN_DECIMALS)?;
                owner.token_mint(record.token, signer.address(), base).await?;
                user::lock(signer, &record, base).await?;
                report.locks += 1;

                if base > unlock_threshold {
                    user::unlock(signer, &record, base / U256::from(2)).await?;
                    report.unlocks += 1;
                }
            }
        }

        for (signer, amounts) in users.iter().zip(BRIDGE_TEST_DATA) {
            info!(user = %signer.address(), event = "creating_bridge_data");
            for amount in amounts {
                let base = parse_amount(amount, SOURCE_TOKEN_DECIMALS)?;
                owner.token_mint(record.token, signer.address(), base).await?;
                signer.token_approve(record.token, adapter, base).await?;

                let send_param = SendParam::builder()
                    .dst_eid(SEED_DST_EID)
                    .to(address_to_bytes32(signer.address()))
                    .amount_ld(base)
                    .min_amount_ld(min_amount_with_slippage(base, SEED_MIN_PERCENT))
                    .build();

                match seed_send(signer, adapter, &send_param).await {
                    Ok(()) => {
                        report.bridges += 1;
                        info!(amount = %amount, event = "bridge_data_sent");
                    }
                    Err(error) => {
                        report.bridge_failures += 1;
                        warn!(amount = %amount, error = %error, event = "bridge_data_skipped");
                    }
                }
            }
        }

        info!(report = ?report, event = "test_data_completed");
        Ok(report)
    }
    .instrument(spans::seed(&chain, &config.network.name, LOCK_TEST_DATA.len()))
    .await
}

async fn seed_send<C>(signer: &C, adapter: Address, send_param: &SendParam) -> Result<()>
where
    C: BridgeClient + ?Sized,
{
    let fee = signer.quote_send(adapter, send_param, false).await?;
    info!(
        native_fee = %fee.native_fee,
        lz_token_fee = %fee.lz_token_fee,
        event = "bridge_fee_quoted"
    );
    signer.send(adapter, send_param, fee, signer.address()).await?;
    Ok(())
}

/// Runs a short lock, unlock and bridge sequence for the signer on a testnet.
///
/// Locks 50 and 100 tokens, unlocks 50 and bridges 50 of the remainder. A
/// failing bridge is logged and reported, not returned.
pub async fn create_user_data<C>(config: &BridgeConfig, client: &C) -> Result<SeedReport>
where
    C: BridgeClient + ?Sized,
{
    config.network.require_testnet("create-user-data")?;
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let chain = chain_of(client).await?;

    async {
        info!(user = %client.address(), lock = %record.lock, event = "user_data_started");
        let mut report = SeedReport::default();

        for amount in ["50", "100"] {
            user::lock(client, &record, parse_amount(amount, SOURCE_TOKEN_DECIMALS)?).await?;
            report.locks += 1;
        }

        user::unlock(client, &record, parse_amount("50", SOURCE_TOKEN_DECIMALS)?).await?;
        report.unlocks += 1;

        let amount = parse_amount("50", SOURCE_TOKEN_DECIMALS)?;
        match user::bridge(config, client, &record, amount).await {
            Ok(_) => report.bridges += 1,
            Err(error) => {
                report.bridge_failures += 1;
                warn!(error = %error, event = "user_bridge_failed");
            }
        }

        info!(report = ?report, event = "user_data_completed");
        Ok(report)
    }
    .instrument(spans::seed(&chain, &config.network.name, 1))
    .await
}
