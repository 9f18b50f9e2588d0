use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use alloy_primitives::{Address, TxHash, U256};
use tracing::{info, Instrument};

use super::{chain_of, log_signer};
use crate::config::{BridgeConfig, MOCK_ENDPOINT_EID};
use crate::contracts::artifact::DeployRequest;
use crate::deployments::DeploymentRecord;
use crate::error::{BridgeError, Result};
use crate::params::address_to_bytes32;
use crate::spans;
use crate::traits::BridgeClient;

/// Endpoint ids of the two mock endpoints in a local deployment.
pub const LOCAL_SOURCE_EID: u32 = 1;
pub const LOCAL_DEST_EID: u32 = 2;

/// Token minted to the deployer by [`deploy_local`], in base units.
pub const LOCAL_INITIAL_MINT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Which side of the bridge `deploy-oft` sets up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRole {
    /// Token, adapter and lock vault.
    Source,
    /// Native OFT.
    Dest,
    /// Only link an existing OFT to its peer.
    Peer,
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Dest => f.write_str("dest"),
            Self::Peer => f.write_str("peer"),
        }
    }
}

impl FromStr for ChainRole {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "source" => Ok(Self::Source),
            "dest" => Ok(Self::Dest),
            "peer" => Ok(Self::Peer),
            other => Err(BridgeError::InvalidConfig(format!(
                "unknown chain role {other:?}, expected source, dest or peer"
            ))),
        }
    }
}

/// Arguments of `deploy-oft`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOftArgs {
    pub role: ChainRole,
    /// Messaging endpoint of this chain. A mock is deployed when the network
    /// has no endpoint id and none is given.
    pub endpoint: Option<Address>,
    /// Owner of the deployed contracts, the signer when unset.
    pub owner: Option<Address>,
    pub eid_peer: Option<u32>,
    pub oft_peer: Option<Address>,
    /// Existing token to attach to instead of deploying a mock.
    pub token: Option<Address>,
    /// Amount of token minted to the signer after a source deployment.
    pub initial_value: Option<U256>,
    /// OFT to link in peer mode.
    pub oft: Option<Address>,
}

impl DeployOftArgs {
    pub fn new(role: ChainRole) -> Self {
        Self {
            role,
            endpoint: None,
            owner: None,
            eid_peer: None,
            oft_peer: None,
            token: None,
            initial_value: None,
            oft: None,
        }
    }
}

/// Contracts produced by one `deploy-oft` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Source {
        endpoint: Address,
        token: Address,
        adapter: Address,
        lock: Address,
        /// Written deployment record.
        record_path: PathBuf,
    },
    Dest {
        endpoint: Address,
        oft: Address,
        peer: Option<(u32, Address)>,
    },
    Peer {
        oft: Address,
        eid: u32,
        peer: Address,
        tx_hash: TxHash,
    },
}

/// Result of [`deploy_local`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDeployment {
    pub record: DeploymentRecord,
    pub record_path: PathBuf,
    /// Mock endpoint of the destination side.
    pub dest_endpoint: Address,
}

/// Deploys one side of the bridge, or links peers, depending on `args.role`.
pub async fn deploy_oft<C>(config: &BridgeConfig, client: &C, args: &DeployOftArgs) -> Result<DeployOutcome>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let role = args.role.to_string();
    let span = spans::deploy(&chain, &config.network.name, &role);

    async {
        log_signer(&config.network.name, client).await?;
        let owner = args.owner.unwrap_or_else(|| client.address());

        let outcome = match args.role {
            ChainRole::Source => deploy_source(config, client, args, owner).await,
            ChainRole::Dest => deploy_dest(config, client, args, owner).await,
            ChainRole::Peer => link_peer(client, args).await,
        }
        .inspect_err(spans::record_error)?;

        info!(outcome = ?outcome, event = "deploy_oft_completed");
        Ok(outcome)
    }
    .instrument(span)
    .await
}

/// The endpoint given, or a freshly deployed mock on networks without one.
async fn resolve_endpoint<C>(config: &BridgeConfig, client: &C, endpoint: Option<Address>) -> Result<Address>
where
    C: BridgeClient + ?Sized,
{
    match (endpoint, config.network.eid) {
        (Some(endpoint), _) => Ok(endpoint),
        (None, None) => {
            let endpoint = client
                .deploy(&DeployRequest::EndpointMock {
                    eid: MOCK_ENDPOINT_EID,
                })
                .await?
                .address;
            info!(
                endpoint = %endpoint,
                eid = MOCK_ENDPOINT_EID,
                event = "mock_endpoint_deployed"
            );
            Ok(endpoint)
        }
        (None, Some(eid)) => Err(BridgeError::InvalidConfig(format!(
            "network {} has endpoint id {eid}; pass its endpoint address",
            config.network.name
        ))),
    }
}

async fn deploy_source<C>(
    config: &BridgeConfig,
    client: &C,
    args: &DeployOftArgs,
    owner: Address,
) -> Result<DeployOutcome>
where
    C: BridgeClient + ?Sized,
{
    let endpoint = resolve_endpoint(config, client, args.endpoint).await?;
    let token = match args.token {
        Some(token) => token,
        None => client.deploy(&DeployRequest::TokenMock).await?.address,
    };

    let adapter = client
        .deploy(&DeployRequest::OftAdapter { token, endpoint })
        .await?
        .address;
    let lock = client
        .deploy(&DeployRequest::LockVault { token, adapter })
        .await?;

    client.initialize(lock.address, owner).await?;
    client.initialize(adapter, owner).await?;

    if let Some(amount) = args.initial_value {
        client.token_mint(token, client.address(), amount).await?;
    }

    info!(
        lock = %lock.address,
        adapter = %adapter,
        token = %token,
        endpoint = %endpoint,
        event = "source_chain_deployed"
    );

    let record = DeploymentRecord {
        lock: lock.address,
        token,
        endpoint,
        adapter,
        destination_oft: None,
        block_number: lock.block_number,
    };
    let record_path = record.save(&config.deployments_dir, &config.network.name)?;

    Ok(DeployOutcome::Source {
        endpoint,
        token,
        adapter,
        lock: lock.address,
        record_path,
    })
}

async fn deploy_dest<C>(
    config: &BridgeConfig,
    client: &C,
    args: &DeployOftArgs,
    owner: Address,
) -> Result<DeployOutcome>
where
    C: BridgeClient + ?Sized,
{
    let endpoint = resolve_endpoint(config, client, args.endpoint).await?;
    let oft = client
        .deploy(&DeployRequest::Oft {
            name: "Goat Doge".to_string(),
            symbol: "GD".to_string(),
            endpoint,
            delegate: owner,
        })
        .await?
        .address;

    let peer = match (args.eid_peer, args.oft_peer) {
        (Some(eid), Some(peer)) => {
            client.set_peer(oft, eid, address_to_bytes32(peer)).await?;
            Some((eid, peer))
        }
        _ => None,
    };

    info!(oft = %oft, endpoint = %endpoint, event = "destination_chain_deployed");
    Ok(DeployOutcome::Dest {
        endpoint,
        oft,
        peer,
    })
}

async fn link_peer<C>(client: &C, args: &DeployOftArgs) -> Result<DeployOutcome>
where
    C: BridgeClient + ?Sized,
{
    let oft = args
        .oft
        .ok_or_else(|| BridgeError::InvalidConfig("OFT address not set".to_string()))?;
    let (eid, peer) = args
        .eid_peer
        .zip(args.oft_peer)
        .ok_or_else(|| BridgeError::InvalidConfig("peer info not set".to_string()))?;

    let tx_hash = client.set_peer(oft, eid, address_to_bytes32(peer)).await?;
    info!(oft = %oft, eid = eid, peer = %peer, event = "peer_set");

    Ok(DeployOutcome::Peer {
        oft,
        eid,
        peer,
        tx_hash,
    })
}

/// Deploys a complete source/destination pair on one development chain.
///
/// Two mock endpoints (eids 1 and 2) stand in for the two chains. The
/// destination OFT and the adapter are registered with each other's endpoint
/// and as each other's peers, the deployer receives [`LOCAL_INITIAL_MINT`]
/// tokens and the deployment record is written with the vault's deployment
/// block.
pub async fn deploy_local<C>(config: &BridgeConfig, client: &C) -> Result<LocalDeployment>
where
    C: BridgeClient + ?Sized,
{
    let chain = chain_of(client).await?;
    let span = spans::deploy(&chain, &config.network.name, "local");

    async {
        log_signer(&config.network.name, client).await?;
        let deployer = client.address();

        let token = client.deploy(&DeployRequest::TokenMock).await?.address;
        let source_endpoint = client
            .deploy(&DeployRequest::EndpointMock {
                eid: LOCAL_SOURCE_EID,
            })
            .await?
            .address;
        let adapter = client
            .deploy(&DeployRequest::OftAdapter {
                token,
                endpoint: source_endpoint,
            })
            .await?
            .address;
        let lock = client
            .deploy(&DeployRequest::LockVault { token, adapter })
            .await?;

        let dest_endpoint = client
            .deploy(&DeployRequest::EndpointMock {
                eid: LOCAL_DEST_EID,
            })
            .await?
            .address;
        let oft = client
            .deploy(&DeployRequest::Oft {
                name: "Dest OFT".to_string(),
                symbol: "DO".to_string(),
                endpoint: dest_endpoint,
                delegate: deployer,
            })
            .await?
            .address;

        client
            .set_dest_lz_endpoint(source_endpoint, oft, dest_endpoint)
            .await?;
        client
            .set_dest_lz_endpoint(dest_endpoint, adapter, source_endpoint)
            .await?;

        client.initialize(adapter, deployer).await?;
        client.initialize(lock.address, deployer).await?;

        client
            .set_peer(adapter, LOCAL_DEST_EID, address_to_bytes32(oft))
            .await?;
        client
            .set_peer(oft, LOCAL_SOURCE_EID, address_to_bytes32(adapter))
            .await?;

        client.token_mint(token, deployer, LOCAL_INITIAL_MINT).await?;

        info!(
            source_endpoint = %source_endpoint,
            token = %token,
            lock = %lock.address,
            adapter = %adapter,
            dest_endpoint = %dest_endpoint,
            destination_oft = %oft,
            event = "local_pair_deployed"
        );

        let record = DeploymentRecord {
            lock: lock.address,
            token,
            endpoint: source_endpoint,
            adapter,
            destination_oft: Some(oft),
            block_number: lock.block_number,
        };
        let record_path = record.save(&config.deployments_dir, &config.network.name)?;

        Ok(LocalDeployment {
            record,
            record_path,
            dest_endpoint,
        })
    }
    .instrument(span)
    .await
    .inspect_err(|e: &BridgeError| {
        tracing::error!(error = %e, event = "local_deploy_failed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimulatedNetwork;
    use rstest::rstest;
    use tempfile::TempDir;

    const CHAIN: u64 = 31337;

    fn setup(network_name: &str) -> (TempDir, BridgeConfig, SimulatedNetwork) {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_lookup(network_name, |_| None)
            .unwrap()
            .with_deployments_dir(dir.path());
        let network = SimulatedNetwork::new();
        (dir, config, network)
    }

    #[rstest]
    #[case("source", ChainRole::Source)]
    #[case("dest", ChainRole::Dest)]
    #[case("peer", ChainRole::Peer)]
    fn test_chain_role_parses(#[case] input: &str, #[case] expected: ChainRole) {
        assert_eq!(input.parse::<ChainRole>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_unknown_chain_role_is_rejected() {
        assert!(matches!(
            "middle".parse::<ChainRole>(),
            Err(BridgeError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_local_deploy_writes_record() {
        let (_dir, config, network) = setup("localhost");
        let client = network.client(CHAIN, Address::repeat_byte(0x01));
        network.fund_all(CHAIN, &[client.address()]).unwrap();

        let deployment = deploy_local(&config, &client).await.unwrap();
        let loaded = DeploymentRecord::load(&config.deployments_dir, "localhost").unwrap();

        assert_eq!(loaded, deployment.record);
        assert_eq!(
            client
                .token_balance(loaded.token, client.address())
                .await
                .unwrap(),
            LOCAL_INITIAL_MINT
        );
        let oft = loaded.destination_oft.unwrap();
        assert_eq!(
            client.peer(loaded.adapter, LOCAL_DEST_EID).await.unwrap(),
            address_to_bytes32(oft)
        );
        assert_eq!(
            client.peer(oft, LOCAL_SOURCE_EID).await.unwrap(),
            address_to_bytes32(loaded.adapter)
        );
    }

    #[tokio::test]
    async fn test_source_deploy_uses_mock_endpoint_and_mints() {
        let (_dir, config, network) = setup("localhost");
        let client = network.client(CHAIN, Address::repeat_byte(0x01));
        network.fund_all(CHAIN, &[client.address()]).unwrap();

        let mut args = DeployOftArgs::new(ChainRole::Source);
        args.initial_value = Some(U256::from(10_000));
        let outcome = deploy_oft(&config, &client, &args).await.unwrap();

        let DeployOutcome::Source { token, lock, .. } = outcome else {
            panic!("expected a source deployment, got {outcome:?}");
        };
        assert_eq!(
            client.token_balance(token, client.address()).await.unwrap(),
            U256::from(10_000)
        );
        let record = DeploymentRecord::load(&config.deployments_dir, "localhost").unwrap();
        assert_eq!(record.lock, lock);
    }

    #[tokio::test]
    async fn test_dest_deploy_sets_peer_when_given() {
        let (_dir, config, network) = setup("localhost");
        let client = network.client(CHAIN, Address::repeat_byte(0x01));
        network.fund_all(CHAIN, &[client.address()]).unwrap();
        let remote = Address::repeat_byte(0x0A);

        let mut args = DeployOftArgs::new(ChainRole::Dest);
        args.eid_peer = Some(40161);
        args.oft_peer = Some(remote);
        let outcome = deploy_oft(&config, &client, &args).await.unwrap();

        let DeployOutcome::Dest { oft, peer, .. } = outcome else {
            panic!("expected a destination deployment, got {outcome:?}");
        };
        assert_eq!(peer, Some((40161, remote)));
        assert_eq!(
            client.peer(oft, 40161).await.unwrap(),
            address_to_bytes32(remote)
        );
    }

    #[tokio::test]
    async fn test_peer_mode_requires_addresses() {
        let (_dir, config, network) = setup("localhost");
        let client = network.client(CHAIN, Address::repeat_byte(0x01));

        let mut args = DeployOftArgs::new(ChainRole::Peer);
        args.oft = Some(Address::repeat_byte(0x0A));
        let err = deploy_oft(&config, &client, &args).await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(ref msg) if msg == "peer info not set"));

        let err = deploy_oft(&config, &client, &DeployOftArgs::new(ChainRole::Peer))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(ref msg) if msg == "OFT address not set"));
    }

    #[tokio::test]
    async fn test_endpoint_required_on_networks_with_eid() {
        let (_dir, config, network) = setup("sepolia-testnet");
        let client = network.client(11_155_111, Address::repeat_byte(0x01));

        let err = deploy_oft(&config, &client, &DeployOftArgs::new(ChainRole::Dest))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }
}
