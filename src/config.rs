//! Network and signer configuration
//!
//! Every task receives a [`BridgeConfig`] by reference. It bundles the
//! selected [`NetworkConfig`], the signing [`Accounts`], the locations of the
//! deployment records and contract artifacts, and per-call [`GasLimits`].
//!
//! Values come from the built-in network registry, overridden by environment
//! variables (usually loaded from a `.env` file):
//!
//! | Variable | Purpose |
//! |---|---|
//! | `MNEMONIC` | BIP-39 phrase, accounts derived from index 0 |
//! | `PRIVATE_KEY` | single signing key, used when no mnemonic is set |
//! | `RPC_URL_SEPOLIA`, `RPC_URL_FUJI`, `RPC_URL_AMOY`, `RPC_URL_BSC_TESTNET`, `RPC_URL_TESTNET` | RPC overrides |
//! | `EXPLORER_API_KEY` | block explorer key for verification |

use std::fmt;
use std::path::PathBuf;

use alloy_primitives::B256;
use alloy_signer_local::coins_bip39::English;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner};
use tracing::{debug, warn};
use url::Url;

use crate::error::{BridgeError, Result};

/// Well-known anvil/hardhat development keys used by the `localhost` network.
pub const LOCAL_DEV_KEYS: [&str; 4] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    "0x7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
];

/// Endpoint id used for the mock endpoint deployed on networks without one.
pub const MOCK_ENDPOINT_EID: u32 = 1;

/// What a network is used for; tasks restrict themselves by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Testnet,
    Local,
}

/// Static description of a network from the registry.
#[derive(Debug, Clone, Copy)]
struct NetworkEntry {
    name: &'static str,
    eid: Option<u32>,
    chain_id: Option<u64>,
    rpc_url: &'static str,
    rpc_env: Option<&'static str>,
    kind: NetworkKind,
}

const NETWORKS: &[NetworkEntry] = &[
    NetworkEntry {
        name: "sepolia-testnet",
        eid: Some(40161),
        chain_id: Some(11_155_111),
        rpc_url: "https://rpc.sepolia.org/",
        rpc_env: Some("RPC_URL_SEPOLIA"),
        kind: NetworkKind::Testnet,
    },
    NetworkEntry {
        name: "metis-testnet",
        eid: Some(40292),
        chain_id: Some(59_902),
        rpc_url: "https://sepolia.metisdevops.link",
        rpc_env: None,
        kind: NetworkKind::Testnet,
    },
    NetworkEntry {
        name: "avalanche-testnet",
        eid: Some(40106),
        chain_id: Some(43_113),
        rpc_url: "https://rpc.ankr.com/avalanche_fuji",
        rpc_env: Some("RPC_URL_FUJI"),
        kind: NetworkKind::Testnet,
    },
    NetworkEntry {
        name: "amoy-testnet",
        eid: Some(40267),
        chain_id: Some(80_002),
        rpc_url: "https://polygon-amoy-bor-rpc.publicnode.com",
        rpc_env: Some("RPC_URL_AMOY"),
        kind: NetworkKind::Testnet,
    },
    NetworkEntry {
        name: "bsc-testnet",
        eid: Some(40102),
        chain_id: Some(97),
        rpc_url: "https://data-seed-prebsc-1-s1.bnbchain.org:8545",
        rpc_env: Some("RPC_URL_BSC_TESTNET"),
        kind: NetworkKind::Testnet,
    },
    NetworkEntry {
        name: "testnet",
        eid: None,
        chain_id: None,
        rpc_url: "http://127.0.0.1:8545",
        rpc_env: Some("RPC_URL_TESTNET"),
        kind: NetworkKind::Testnet,
    },
    NetworkEntry {
        name: "localhost",
        eid: None,
        chain_id: Some(31_337),
        rpc_url: "http://127.0.0.1:8545",
        rpc_env: None,
        kind: NetworkKind::Local,
    },
    NetworkEntry {
        name: "dev",
        eid: None,
        chain_id: Some(1337),
        rpc_url: "http://localhost:8545",
        rpc_env: None,
        kind: NetworkKind::Local,
    },
];

/// The only network the user tasks and `create-user-data` run on.
pub const USER_TASK_NETWORK: &str = "testnet";

/// Resolved settings of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    /// Messaging endpoint id, if the network has a live endpoint.
    pub eid: Option<u32>,
    pub chain_id: Option<u64>,
    pub rpc_url: Url,
    pub kind: NetworkKind,
}

impl NetworkConfig {
    /// Looks up a network in the registry, applying RPC overrides from `lookup`.
    pub fn named<F>(name: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let entry = NETWORKS
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| BridgeError::UnknownNetwork {
                name: name.to_string(),
            })?;

        let rpc_url = entry
            .rpc_env
            .and_then(&lookup)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| entry.rpc_url.to_string());
        let rpc_url = Url::parse(&rpc_url)
            .map_err(|e| BridgeError::InvalidConfig(format!("invalid RPC URL {rpc_url}: {e}")))?;

        Ok(Self {
            name: entry.name.to_string(),
            eid: entry.eid,
            chain_id: entry.chain_id,
            rpc_url,
            kind: entry.kind,
        })
    }

    /// Names of all registered networks.
    pub fn known_networks() -> impl Iterator<Item = &'static str> {
        NETWORKS.iter().map(|entry| entry.name)
    }

    pub fn with_rpc_url(mut self, rpc_url: Url) -> Self {
        self.rpc_url = rpc_url;
        self
    }

    pub fn with_eid(mut self, eid: Option<u32>) -> Self {
        self.eid = eid;
        self
    }

    pub fn is_local(&self) -> bool {
        self.kind == NetworkKind::Local
    }

    /// Fails unless this is the shared `testnet` network. The public
    /// testnets in the registry are for deployment and bridging only.
    pub fn require_testnet(&self, task: &'static str) -> Result<()> {
        if self.name == USER_TASK_NETWORK {
            Ok(())
        } else {
            Err(BridgeError::NetworkRestricted {
                task,
                network: self.name.clone(),
                expected: USER_TASK_NETWORK,
            })
        }
    }

    /// Fails unless this is a local development network.
    pub fn require_local(&self, task: &'static str) -> Result<()> {
        if self.is_local() {
            Ok(())
        } else {
            Err(BridgeError::NetworkRestricted {
                task,
                network: self.name.clone(),
                expected: "localhost or dev",
            })
        }
    }
}

/// Where signing keys come from.
#[derive(Clone, Default)]
pub enum Accounts {
    Mnemonic(String),
    PrivateKeys(Vec<B256>),
    #[default]
    None,
}

impl fmt::Debug for Accounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mnemonic(_) => f.write_str("Accounts::Mnemonic(<redacted>)"),
            Self::PrivateKeys(keys) => write!(f, "Accounts::PrivateKeys({} keys)", keys.len()),
            Self::None => f.write_str("Accounts::None"),
        }
    }
}

impl Accounts {
    /// Mnemonic first, then a single private key, then the local dev keys.
    fn resolve<F>(network: &NetworkConfig, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mnemonic) = lookup("MNEMONIC").filter(|m| !m.trim().is_empty()) {
            return Ok(Self::Mnemonic(mnemonic));
        }
        if let Some(key) = lookup("PRIVATE_KEY").filter(|k| !k.trim().is_empty()) {
            let key: B256 = key.trim().parse()?;
            return Ok(Self::PrivateKeys(vec![key]));
        }
        if network.name == "localhost" {
            let keys = LOCAL_DEV_KEYS
                .iter()
                .map(|key| key.parse::<B256>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(Self::PrivateKeys(keys));
        }

        warn!(
            network = %network.name,
            event = "no_accounts_configured",
            "Could not find MNEMONIC or PRIVATE_KEY environment variables. It will not be possible to execute transactions."
        );
        Ok(Self::None)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the first `count` signers.
    pub fn signers(&self, count: usize) -> Result<Vec<PrivateKeySigner>> {
        let signers = match self {
            Self::Mnemonic(phrase) => (0..count as u32)
                .map(|index| {
                    MnemonicBuilder::<English>::default()
                        .phrase(phrase.as_str())
                        .index(index)
                        .and_then(|builder| builder.build())
                        .map_err(|e| BridgeError::Signer(e.to_string()))
                })
                .collect::<Result<Vec<_>>>()?,
            Self::PrivateKeys(keys) => keys
                .iter()
                .take(count)
                .map(|key| {
                    PrivateKeySigner::from_bytes(key).map_err(|e| BridgeError::Signer(e.to_string()))
                })
                .collect::<Result<Vec<_>>>()?,
            Self::None => Vec::new(),
        };

        if signers.len() < count {
            return Err(BridgeError::Signer(format!(
                "{count} signer(s) required but only {} configured",
                signers.len()
            )));
        }
        Ok(signers)
    }

    /// The deployer / default signer.
    pub fn deployer(&self) -> Result<PrivateKeySigner> {
        self.signers(1)?
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Signer("no signer configured".to_string()))
    }
}

/// Gas limits attached to state-changing calls. `None` lets the node estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimits {
    pub approve: Option<u64>,
    pub lock: Option<u64>,
    pub unlock: Option<u64>,
    pub bridge: Option<u64>,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            approve: Some(500_000),
            lock: Some(500_000),
            unlock: Some(1_000_000),
            bridge: Some(1_000_000),
        }
    }
}

impl GasLimits {
    /// Let the node estimate every call.
    pub fn estimated() -> Self {
        Self {
            approve: None,
            lock: None,
            unlock: None,
            bridge: None,
        }
    }
}

/// Everything a task needs to run against one network.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub network: NetworkConfig,
    pub accounts: Accounts,
    pub explorer_api_key: Option<String>,
    /// Directory holding `<network>.json` deployment records.
    pub deployments_dir: PathBuf,
    /// Directory holding compiled contract artifacts (`<Contract>.json`).
    pub artifacts_dir: PathBuf,
    pub gas: GasLimits,
}

impl BridgeConfig {
    pub const DEFAULT_DEPLOYMENTS_DIR: &'static str = "deployments";
    pub const DEFAULT_ARTIFACTS_DIR: &'static str = "artifacts";

    /// Builds the configuration for `network` from the process environment.
    pub fn from_env(network: &str) -> Result<Self> {
        Self::from_lookup(network, |key| std::env::var(key).ok())
    }

    /// Builds the configuration for `network` reading variables through `lookup`.
    pub fn from_lookup<F>(network: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = NetworkConfig::named(network, &lookup)?;
        let accounts = Accounts::resolve(&network, &lookup)?;
        let explorer_api_key = lookup("EXPLORER_API_KEY").filter(|k| !k.is_empty());

        debug!(
            network = %network.name,
            eid = ?network.eid,
            rpc_url = %network.rpc_url,
            accounts = ?accounts,
            event = "config_loaded"
        );

        Ok(Self {
            network,
            accounts,
            explorer_api_key,
            deployments_dir: PathBuf::from(Self::DEFAULT_DEPLOYMENTS_DIR),
            artifacts_dir: PathBuf::from(Self::DEFAULT_ARTIFACTS_DIR),
            gas: GasLimits::default(),
        })
    }

    pub fn with_deployments_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.deployments_dir = dir.into();
        self
    }

    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    pub fn with_gas(mut self, gas: GasLimits) -> Self {
        self.gas = gas;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_registry_lookup() {
        let network = NetworkConfig::named("sepolia-testnet", env(&[])).unwrap();
        assert_eq!(network.eid, Some(40161));
        assert_eq!(network.chain_id, Some(11_155_111));
        assert_eq!(network.rpc_url.as_str(), "https://rpc.sepolia.org/");
        assert_eq!(network.kind, NetworkKind::Testnet);
    }

    #[test]
    fn test_rpc_override() {
        let network = NetworkConfig::named(
            "avalanche-testnet",
            env(&[("RPC_URL_FUJI", "http://fuji.local:9650/")]),
        )
        .unwrap();
        assert_eq!(network.rpc_url.as_str(), "http://fuji.local:9650/");
    }

    #[test]
    fn test_unknown_network() {
        let err = NetworkConfig::named("mainnet-ish", env(&[])).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownNetwork { .. }));
    }

    #[test]
    fn test_network_restrictions() {
        let local = NetworkConfig::named("localhost", env(&[])).unwrap();
        let testnet = NetworkConfig::named("testnet", env(&[])).unwrap();

        assert!(local.require_local("create-test-data").is_ok());
        assert!(testnet.require_testnet("user-lock").is_ok());
        assert!(matches!(
            local.require_testnet("user-lock"),
            Err(BridgeError::NetworkRestricted { task: "user-lock", .. })
        ));
        assert!(testnet.require_local("create-test-data").is_err());

        let sepolia = NetworkConfig::named("sepolia-testnet", env(&[])).unwrap();
        assert!(matches!(
            sepolia.require_testnet("user-bridge"),
            Err(BridgeError::NetworkRestricted { expected: "testnet", .. })
        ));
    }

    #[test]
    fn test_localhost_uses_dev_keys() {
        let config = BridgeConfig::from_lookup("localhost", env(&[])).unwrap();
        let signers = config.accounts.signers(4).unwrap();
        assert_eq!(
            signers[0].address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(config.accounts.signers(5).is_err());
    }

    #[test]
    fn test_mnemonic_takes_precedence() {
        let config = BridgeConfig::from_lookup(
            "testnet",
            env(&[
                ("MNEMONIC", TEST_MNEMONIC),
                ("PRIVATE_KEY", LOCAL_DEV_KEYS[1]),
            ]),
        )
        .unwrap();

        assert!(matches!(config.accounts, Accounts::Mnemonic(_)));
        let signers = config.accounts.signers(2).unwrap();
        // index 0 of the standard test mnemonic is the first anvil account
        assert_eq!(
            signers[0].address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_ne!(signers[0].address(), signers[1].address());
    }

    #[test]
    fn test_missing_accounts() {
        let config = BridgeConfig::from_lookup("testnet", env(&[])).unwrap();
        assert!(config.accounts.is_empty());
        assert!(matches!(
            config.accounts.deployer(),
            Err(BridgeError::Signer(_))
        ));
    }

    #[test]
    fn test_accounts_debug_is_redacted() {
        let accounts = Accounts::Mnemonic(TEST_MNEMONIC.to_string());
        assert!(!format!("{accounts:?}").contains("junk"));
    }

    #[test]
    fn test_builder_methods() {
        let config = BridgeConfig::from_lookup("dev", env(&[("EXPLORER_API_KEY", "abc")]))
            .unwrap()
            .with_deployments_dir("/tmp/deployments")
            .with_gas(GasLimits::estimated());

        assert_eq!(config.explorer_api_key.as_deref(), Some("abc"));
        assert_eq!(config.deployments_dir, PathBuf::from("/tmp/deployments"));
        assert_eq!(config.gas.lock, None);
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
    }
}
