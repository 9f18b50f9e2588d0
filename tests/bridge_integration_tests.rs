//! End-to-end bridge scenarios against the simulated network
//!
//! Every scenario deploys real task sequences through `SimulatedClient`s and
//! asserts balance deltas, limit enforcement and indexer accounting.

use alloy_primitives::{Address, I256, U256};
use lockbridge::amount::{parse_amount, CONVERSION_MULTIPLIER};
use lockbridge::indexer::{user_id, InMemoryStore, Indexer, Store};
use lockbridge::params::address_to_bytes32;
use lockbridge::tasks::{self, BridgeArgs, LocalDeployment, LOCAL_SOURCE_EID};
use lockbridge::testing::{SimulatedClient, SimulatedNetwork};
use lockbridge::{BridgeClient, BridgeConfig, DeployRequest, SendParam};
use rstest::rstest;
use tempfile::TempDir;

const CHAIN: u64 = 31337;

struct Harness {
    _dir: TempDir,
    config: BridgeConfig,
    network: SimulatedNetwork,
    owner: SimulatedClient,
    deployment: LocalDeployment,
}

impl Harness {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_lookup("localhost", |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let network = SimulatedNetwork::new();
        let owner = network.client(CHAIN, Address::repeat_byte(0x01));
        network.fund_all(CHAIN, &[owner.address()]).unwrap();
        let deployment = tasks::deploy_local(&config, &owner).await.unwrap();

        Self {
            _dir: dir,
            config,
            network,
            owner,
            deployment,
        }
    }

    /// A funded user holding `tokens` whole source tokens.
    async fn user(&self, byte: u8, tokens: &str) -> SimulatedClient {
        let user = self.owner.with_signer(Address::repeat_byte(byte));
        self.network.fund_all(CHAIN, &[user.address()]).unwrap();
        self.owner
            .token_mint(self.token(), user.address(), base(tokens))
            .await
            .unwrap();
        user
    }

    fn token(&self) -> Address {
        self.deployment.record.token
    }

    fn vault(&self) -> Address {
        self.deployment.record.lock
    }

    fn adapter(&self) -> Address {
        self.deployment.record.adapter
    }

    fn oft(&self) -> Address {
        self.deployment.record.destination_oft.unwrap()
    }
}

fn base(tokens: &str) -> U256 {
    parse_amount(tokens, 8).unwrap()
}

fn signed(amount: U256) -> I256 {
    I256::try_from(amount).unwrap()
}

#[tokio::test]
async fn test_lock_then_unlock_restores_balances() {
    let harness = Harness::new().await;
    let user = harness.user(0x02, "100").await;
    let (token, vault) = (harness.token(), harness.vault());

    user.token_approve(token, vault, base("50")).await.unwrap();
    user.lock(vault, base("50")).await.unwrap();
    assert_eq!(user.token_balance(token, vault).await.unwrap(), base("50"));
    assert_eq!(user.token_balance(token, user.address()).await.unwrap(), base("50"));

    user.unlock(vault, base("50")).await.unwrap();
    assert_eq!(user.token_balance(token, vault).await.unwrap(), U256::ZERO);
    assert_eq!(user.token_balance(token, user.address()).await.unwrap(), base("100"));
}

#[tokio::test]
async fn test_bridge_conserves_supply_and_bridges_back() {
    let harness = Harness::new().await;
    let user = harness.user(0x02, "40").await;
    let (token, adapter, oft) = (harness.token(), harness.adapter(), harness.oft());
    let amount = base("40");

    user.token_approve(token, adapter, amount).await.unwrap();
    let args = BridgeArgs {
        oft: adapter,
        eid: 2,
        value: amount,
        execute: true,
        receiver: None,
    };
    tasks::bridge_oft(&harness.config, &user, &args).await.unwrap();

    assert_eq!(user.token_balance(token, user.address()).await.unwrap(), U256::ZERO);
    let minted = user.token_balance(oft, user.address()).await.unwrap();
    assert_eq!(minted, amount * CONVERSION_MULTIPLIER);
    assert_eq!(harness.network.total_supply(CHAIN, oft).unwrap(), minted);

    let back = SendParam::exact(LOCAL_SOURCE_EID, user.address(), minted);
    let fee = user.quote_send(oft, &back, false).await.unwrap();
    user.send(oft, &back, fee, user.address()).await.unwrap();

    assert_eq!(user.token_balance(token, user.address()).await.unwrap(), amount);
    assert_eq!(user.token_balance(token, adapter).await.unwrap(), U256::ZERO);
    assert_eq!(harness.network.total_supply(CHAIN, oft).unwrap(), U256::ZERO);
}

#[tokio::test]
async fn test_bridging_back_drops_dust() {
    let harness = Harness::new().await;
    let user = harness.user(0x02, "1").await;
    let (token, adapter, oft) = (harness.token(), harness.adapter(), harness.oft());

    user.token_approve(token, adapter, base("1")).await.unwrap();
    let out = SendParam::exact(2, user.address(), base("1"));
    let fee = user.quote_send(adapter, &out, false).await.unwrap();
    user.send(adapter, &out, fee, user.address()).await.unwrap();

    // one shared-decimal unit plus dust that cannot be represented at 8 decimals
    let dust = U256::from(12_345u64);
    let back = SendParam::builder()
        .dst_eid(LOCAL_SOURCE_EID)
        .to(address_to_bytes32(user.address()))
        .amount_ld(CONVERSION_MULTIPLIER + dust)
        .min_amount_ld(CONVERSION_MULTIPLIER)
        .build();
    user.send(oft, &back, fee, user.address()).await.unwrap();

    assert_eq!(user.token_balance(token, user.address()).await.unwrap(), U256::from(1));
    assert_eq!(
        user.token_balance(oft, user.address()).await.unwrap(),
        base("1") * CONVERSION_MULTIPLIER - CONVERSION_MULTIPLIER
    );
}

#[rstest]
#[case::below_minimum("10", "100", "1000", "5", "BelowMinimum")]
#[case::above_personal("10", "100", "1000", "150", "ExceedsPersonalLimit")]
#[case::above_global("10", "500", "200", "300", "ExceedsGlobalLimit")]
#[tokio::test]
async fn test_locks_outside_limits_are_rejected(
    #[case] min: &str,
    #[case] max: &str,
    #[case] global: &str,
    #[case] amount: &str,
    #[case] reason: &str,
) {
    let harness = Harness::new().await;
    tasks::set_personal_limits(&harness.config, &harness.owner, max, min)
        .await
        .unwrap();
    tasks::set_max_limit(&harness.config, &harness.owner, global)
        .await
        .unwrap();

    let user = harness.user(0x02, "1000").await;
    user.token_approve(harness.token(), harness.vault(), base(amount))
        .await
        .unwrap();
    let block = harness.network.block_number(CHAIN).unwrap();

    let err = user.lock(harness.vault(), base(amount)).await.unwrap_err();
    assert_eq!(err.revert_reason(), Some(reason));
    assert_eq!(harness.network.block_number(CHAIN).unwrap(), block);
    assert_eq!(
        user.locked_of(harness.vault(), user.address()).await.unwrap(),
        U256::ZERO
    );
}

#[tokio::test]
async fn test_indexed_total_matches_locks_minus_unlocks() {
    let harness = Harness::new().await;
    let alice = harness.user(0x02, "500").await;
    let bob = harness.user(0x03, "500").await;
    let vault = harness.vault();

    for (user, lock, unlock) in [(&alice, "120", "20"), (&bob, "300", "150")] {
        user.token_approve(harness.token(), vault, base(lock)).await.unwrap();
        user.lock(vault, base(lock)).await.unwrap();
        user.unlock(vault, base(unlock)).await.unwrap();
    }

    let outcome = tasks::index_events(&harness.config, &harness.owner)
        .await
        .unwrap();
    let store = &outcome.store;
    let global = store.global_stat();

    assert_eq!(global.total_locked, signed(base("250")));
    assert_eq!(global.user_count, 2);
    assert_eq!(
        global.total_locked,
        signed(harness.network.total_locked(CHAIN, vault).unwrap())
    );
    let summed = store
        .users
        .values()
        .fold(I256::ZERO, |sum, user| sum + user.total_locked);
    assert_eq!(summed, global.total_locked);
    assert_eq!(
        store
            .load_user(&user_id(bob.address()))
            .unwrap()
            .unwrap()
            .total_locked,
        signed(base("150"))
    );
    assert_eq!(store.lock_events.len(), 2);
    assert_eq!(store.unlock_events.len(), 2);
}

#[tokio::test]
async fn test_window_after_earlier_locks_indexes_negative_totals() {
    let harness = Harness::new().await;
    let user = harness.user(0x02, "100").await;
    let late = harness.user(0x03, "10").await;
    let vault = harness.vault();
    user.token_approve(harness.token(), vault, base("100")).await.unwrap();
    user.lock(vault, base("100")).await.unwrap();
    let window_start = harness.network.block_number(CHAIN).unwrap() + 1;

    user.unlock(vault, base("60")).await.unwrap();
    late.token_approve(harness.token(), vault, base("10")).await.unwrap();
    late.lock(vault, base("10")).await.unwrap();

    let events = user.events(&[vault], window_start).await.unwrap();
    let mut indexer = Indexer::new(InMemoryStore::new());
    assert_eq!(indexer.handle_all(events.iter()).unwrap(), 2);

    let store = indexer.store();
    let global = store.global_stat();
    // the window sees -60 + 10
    assert_eq!(global.total_locked, -signed(base("50")));
    assert_eq!(global.user_count, 2);
    assert_eq!(
        store
            .load_user(&user_id(user.address()))
            .unwrap()
            .unwrap()
            .total_locked,
        -signed(base("60"))
    );

    // the full history matches the vault again
    let full = user.events(&[vault], 0).await.unwrap();
    let mut indexer = Indexer::new(InMemoryStore::new());
    indexer.handle_all(full.iter()).unwrap();
    assert_eq!(
        indexer.store().global_stat().total_locked,
        signed(harness.network.total_locked(CHAIN, vault).unwrap())
    );
}

#[tokio::test]
async fn test_pair_on_two_chains() {
    let network = SimulatedNetwork::new();
    let deployer = Address::repeat_byte(0x01);
    let source = network.client(11_155_111, deployer);
    let dest = network.client(97, deployer);
    network.fund_all(11_155_111, &[deployer]).unwrap();
    network.fund_all(97, &[deployer]).unwrap();

    let token = source.deploy(&DeployRequest::TokenMock).await.unwrap().address;
    let endpoint_a = source
        .deploy(&DeployRequest::EndpointMock { eid: 40161 })
        .await
        .unwrap()
        .address;
    let adapter = source
        .deploy(&DeployRequest::OftAdapter {
            token,
            endpoint: endpoint_a,
        })
        .await
        .unwrap()
        .address;
    let endpoint_b = dest
        .deploy(&DeployRequest::EndpointMock { eid: 40102 })
        .await
        .unwrap()
        .address;
    let oft = dest
        .deploy(&DeployRequest::Oft {
            name: "Goat Doge".to_string(),
            symbol: "GD".to_string(),
            endpoint: endpoint_b,
            delegate: deployer,
        })
        .await
        .unwrap()
        .address;

    source.set_dest_lz_endpoint(endpoint_a, oft, endpoint_b).await.unwrap();
    dest.set_dest_lz_endpoint(endpoint_b, adapter, endpoint_a).await.unwrap();
    source.initialize(adapter, deployer).await.unwrap();
    source.set_peer(adapter, 40102, address_to_bytes32(oft)).await.unwrap();

    source.token_mint(token, deployer, base("10")).await.unwrap();
    source.token_approve(token, adapter, base("10")).await.unwrap();
    let params = SendParam::exact(40102, deployer, base("10"));
    let fee = source.quote_send(adapter, &params, false).await.unwrap();

    // the destination does not trust the adapter yet
    let err = source.send(adapter, &params, fee, deployer).await.unwrap_err();
    assert_eq!(err.revert_reason(), Some("OnlyPeer"));

    dest.set_peer(oft, 40161, address_to_bytes32(adapter)).await.unwrap();
    let dest_block = network.block_number(97).unwrap();
    source.send(adapter, &params, fee, deployer).await.unwrap();

    assert_eq!(
        dest.token_balance(oft, deployer).await.unwrap(),
        base("10") * CONVERSION_MULTIPLIER
    );
    assert_eq!(network.block_number(97).unwrap(), dest_block + 1);
    let received = dest.events(&[oft], dest_block + 1).await.unwrap();
    assert_eq!(received.len(), 1);
}
