use alloy_primitives::{Address, TxHash, U256};
use tracing::{info, Instrument};

use super::{chain_of, log_signer};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::params::{MessagingFee, SendParam};
use crate::spans;
use crate::traits::BridgeClient;

/// Arguments of `bridge`: a direct send through an OFT or adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeArgs {
    pub oft: Address,
    pub eid: u32,
    /// Amount in the sending contract's local base units.
    pub value: U256,
    pub execute: bool,
    /// Recipient on the destination chain, the signer when unset.
    pub receiver: Option<Address>,
}

/// Arguments of `bridge-lock`: quote on the adapter, send through the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeLockArgs {
    pub oft: Address,
    pub lock: Address,
    pub eid: u32,
    pub value: U256,
    pub execute: bool,
    pub receiver: Option<Address>,
}

/// Quote and, when executed, the submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteOutcome {
    pub send_param: SendParam,
    pub fee: MessagingFee,
    pub tx_hash: Option<TxHash>,
}

/// Quotes a send of `value` through `oft` and submits it when `execute` is set.
///
/// The amount and minimum amount are equal and options are empty, so the
/// destination's enforced options apply.
pub async fn bridge_oft<C>(config: &BridgeConfig, client: &C, args: &BridgeArgs) -> Result<QuoteOutcome>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let span = spans::bridge(&chain, &args.oft, args.eid, &args.value, args.execute);

    async {
        log_signer(&config.network.name, client).await?;
        let receiver = args.receiver.unwrap_or_else(|| client.address());
        info!(receiver = %receiver, event = "token_receiver");

        let send_param = SendParam::exact(args.eid, receiver, args.value);
        let fee = client
            .quote_send(args.oft, &send_param, false)
            .await
            .inspect_err(spans::record_error)?;
        info!(fee = %fee, event = "bridge_fee_quoted");

        let tx_hash = if args.execute {
            let tx_hash = client
                .send(args.oft, &send_param, fee, client.address())
                .await
                .inspect_err(spans::record_error)?;
            info!(tx_hash = %tx_hash, event = "bridge_transaction_sent");
            Some(tx_hash)
        } else {
            None
        };

        Ok(QuoteOutcome {
            send_param,
            fee,
            tx_hash,
        })
    }
    .instrument(span)
    .await
}

/// Quotes on the adapter and bridges the signer's locked balance through the vault.
pub async fn bridge_lock<C>(
    config: &BridgeConfig,
    client: &C,
    args: &BridgeLockArgs,
) -> Result<QuoteOutcome>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let span = spans::bridge(&chain, &args.lock, args.eid, &args.value, args.execute);

    async {
        log_signer(&config.network.name, client).await?;
        let receiver = args.receiver.unwrap_or_else(|| client.address());
        info!(receiver = %receiver, event = "token_receiver");

        let send_param = SendParam::exact(args.eid, receiver, args.value);
        let fee = client
            .quote_send(args.oft, &send_param, false)
            .await
            .inspect_err(spans::record_error)?;
        info!(fee = %fee, event = "bridge_fee_quoted");

        let tx_hash = if args.execute {
            let tx_hash = client
                .bridge_locked(args.lock, &send_param, fee)
                .await
                .inspect_err(spans::record_error)?;
            info!(tx_hash = %tx_hash, event = "bridge_transaction_sent");
            Some(tx_hash)
        } else {
            None
        };

        Ok(QuoteOutcome {
            send_param,
            fee,
            tx_hash,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::CONVERSION_MULTIPLIER;
    use crate::tasks::deploy_local;
    use crate::testing::SimulatedNetwork;
    use tempfile::TempDir;

    fn local_config(dir: &TempDir) -> BridgeConfig {
        BridgeConfig::from_lookup("localhost", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path())
    }

    #[tokio::test]
    async fn test_quote_only_does_not_send() {
        let dir = TempDir::new().unwrap();
        let config = local_config(&dir);
        let network = SimulatedNetwork::new();
        let client = network.client(31337, Address::repeat_byte(0x01));
        network.fund_all(31337, &[client.address()]).unwrap();
        let deployment = deploy_local(&config, &client).await.unwrap();

        let args = BridgeArgs {
            oft: deployment.record.adapter,
            eid: 2,
            value: U256::from(1_000),
            execute: false,
            receiver: None,
        };
        let outcome = bridge_oft(&config, &client, &args).await.unwrap();

        assert_eq!(outcome.tx_hash, None);
        assert_eq!(outcome.fee.native_fee, SimulatedNetwork::DEFAULT_NATIVE_FEE);
        assert_eq!(outcome.send_param.recipient(), client.address());
        assert_eq!(outcome.send_param.min_amount_ld(), U256::from(1_000));
    }

    #[tokio::test]
    async fn test_execute_delivers_to_receiver() {
        let dir = TempDir::new().unwrap();
        let config = local_config(&dir);
        let network = SimulatedNetwork::new();
        let client = network.client(31337, Address::repeat_byte(0x01));
        network.fund_all(31337, &[client.address()]).unwrap();
        let deployment = deploy_local(&config, &client).await.unwrap();
        let record = &deployment.record;
        let receiver = Address::repeat_byte(0x0E);

        client
            .token_approve(record.token, record.adapter, U256::from(1_000))
            .await
            .unwrap();
        let args = BridgeArgs {
            oft: record.adapter,
            eid: 2,
            value: U256::from(1_000),
            execute: true,
            receiver: Some(receiver),
        };
        let outcome = bridge_oft(&config, &client, &args).await.unwrap();

        assert!(outcome.tx_hash.is_some());
        let oft = record.destination_oft.unwrap();
        assert_eq!(
            client.token_balance(oft, receiver).await.unwrap(),
            U256::from(1_000) * CONVERSION_MULTIPLIER
        );
    }

    #[tokio::test]
    async fn test_bridge_lock_spends_locked_balance() {
        let dir = TempDir::new().unwrap();
        let config = local_config(&dir);
        let network = SimulatedNetwork::new();
        let client = network.client(31337, Address::repeat_byte(0x01));
        network.fund_all(31337, &[client.address()]).unwrap();
        let deployment = deploy_local(&config, &client).await.unwrap();
        let record = &deployment.record;
        let user = client.address();

        client.token_approve(record.token, record.lock, U256::from(500)).await.unwrap();
        client.lock(record.lock, U256::from(500)).await.unwrap();

        let args = BridgeLockArgs {
            oft: record.adapter,
            lock: record.lock,
            eid: 2,
            value: U256::from(200),
            execute: true,
            receiver: None,
        };
        bridge_lock(&config, &client, &args).await.unwrap();

        assert_eq!(client.locked_of(record.lock, user).await.unwrap(), U256::from(300));
        let oft = record.destination_oft.unwrap();
        assert_eq!(
            client.token_balance(oft, user).await.unwrap(),
            U256::from(200) * CONVERSION_MULTIPLIER
        );
    }
}
