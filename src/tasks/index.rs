use tracing::{info, Instrument};

use super::chain_of;
use crate::config::BridgeConfig;
use crate::deployments::DeploymentRecord;
use crate::error::Result;
use crate::indexer::{InMemoryStore, Indexer};
use crate::spans;
use crate::traits::BridgeClient;

/// Entities built from one indexing run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOutcome {
    pub from_block: u64,
    pub handled: usize,
    pub store: InMemoryStore,
}

/// Indexes vault and adapter events from the recorded deployment block.
pub async fn index_events<C>(config: &BridgeConfig, client: &C) -> Result<IndexOutcome>
where
    C: BridgeClient + ?Sized,
{
    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
    let mut contracts = vec![record.lock];
    if !record.adapter.is_zero() {
        contracts.push(record.adapter);
    }
    let chain = chain_of(client).await?;
    let span = spans::index(&chain, record.block_number, contracts.len());

    async {
        let events = client
            .events(&contracts, record.block_number)
            .await
            .inspect_err(spans::record_error)?;
        info!(events = events.len(), event = "events_fetched");

        let mut indexer = Indexer::new(InMemoryStore::new());
        let handled = indexer
            .handle_all(events.iter())
            .inspect_err(spans::record_error)?;
        let store = indexer.into_store();

        let global = store.global_stat();
        info!(
            total_locked = %global.total_locked,
            user_count = global.user_count,
            event = "index_completed"
        );

        Ok(IndexOutcome {
            from_block: record.block_number,
            handled,
            store,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::tasks::deploy_local;
    use crate::testing::SimulatedNetwork;
    use alloy_primitives::{Address, I256, U256};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_index_tracks_locked_totals() {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_lookup("localhost", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let network = SimulatedNetwork::new();
        let client = network.client(31337, Address::repeat_byte(0x01));
        network.fund_all(31337, &[client.address()]).unwrap();
        let record = deploy_local(&config, &client).await.unwrap().record;

        client
            .token_approve(record.token, record.lock, U256::from(300))
            .await
            .unwrap();
        client.lock(record.lock, U256::from(300)).await.unwrap();
        client.unlock(record.lock, U256::from(120)).await.unwrap();

        let outcome = index_events(&config, &client).await.unwrap();
        assert_eq!(outcome.handled, 2);
        let global = outcome.store.global_stat();
        assert_eq!(global.total_locked, I256::try_from(180i64).unwrap());
        assert_eq!(global.user_count, 1);
        assert_eq!(
            global.total_locked,
            I256::try_from(network.total_locked(31337, record.lock).unwrap()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_index_without_record_fails() {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_lookup("dev", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let client = SimulatedNetwork::new().client(1337, Address::repeat_byte(0x01));

        let err = index_events(&config, &client).await.unwrap_err();
        assert!(matches!(err, BridgeError::DeploymentNotFound { .. }));
    }
}
