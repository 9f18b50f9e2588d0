//! Per-network deployment records
//!
//! Deployment tasks write `<dir>/<network>.json`, mapping logical contract
//! names to addresses plus the block the vault was deployed in (the indexer's
//! start block). Later tasks resolve their contracts from it.
//!
//! ```json
//! {
//!   "DogeLock": "0x...",
//!   "Token": "0x...",
//!   "EndpointV2": "0x...",
//!   "DogeForGoat": "0x...",
//!   "blockNumber": 12
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Contract addresses deployed on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentRecord {
    /// Lock vault.
    #[serde(rename = "DogeLock")]
    pub lock: Address,
    /// Token locked in the vault.
    #[serde(rename = "Token")]
    pub token: Address,
    /// Messaging endpoint of this chain.
    #[serde(rename = "EndpointV2")]
    pub endpoint: Address,
    /// OFT adapter wrapping the token.
    #[serde(rename = "DogeForGoat")]
    pub adapter: Address,
    /// OFT on the destination side, when deployed alongside.
    #[serde(
        rename = "DestinationOFT",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination_oft: Option<Address>,
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
}

impl DeploymentRecord {
    /// Path of the record for `network` inside `dir`.
    pub fn path(dir: &Path, network: &str) -> PathBuf {
        dir.join(format!("{network}.json"))
    }

    /// Loads the record for `network`, requiring the vault and token addresses.
    pub fn load(dir: &Path, network: &str) -> Result<Self> {
        let path = Self::path(dir, network);
        if !path.exists() {
            return Err(BridgeError::DeploymentNotFound {
                network: network.to_string(),
                dir: dir.display().to_string(),
            });
        }

        let record: Self = serde_json::from_str(&fs::read_to_string(&path)?)?;
        record.require("DogeLock", record.lock, network)?;
        record.require("Token", record.token, network)?;

        debug!(
            path = %path.display(),
            lock = %record.lock,
            token = %record.token,
            event = "deployment_record_loaded"
        );
        Ok(record)
    }

    /// Writes the record, creating `dir` if needed.
    pub fn save(&self, dir: &Path, network: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = Self::path(dir, network);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;

        info!(
            path = %path.display(),
            lock = %self.lock,
            block_number = self.block_number,
            event = "deployment_record_saved"
        );
        Ok(path)
    }

    /// The OFT adapter address, failing when it was never recorded.
    pub fn adapter(&self, network: &str) -> Result<Address> {
        self.require("DogeForGoat", self.adapter, network)
    }

    fn require(&self, name: &'static str, address: Address, network: &str) -> Result<Address> {
        if address.is_zero() {
            Err(BridgeError::MissingAddress {
                name,
                network: network.to_string(),
            })
        } else {
            Ok(address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeploymentRecord {
        DeploymentRecord {
            lock: Address::repeat_byte(0x11),
            token: Address::repeat_byte(0x22),
            endpoint: Address::repeat_byte(0x33),
            adapter: Address::repeat_byte(0x44),
            destination_oft: None,
            block_number: 42,
        }
    }

    #[test]
    fn test_json_layout() {
        insta::assert_json_snapshot!(record(), @r#"
        {
          "DogeLock": "0x1111111111111111111111111111111111111111",
          "Token": "0x2222222222222222222222222222222222222222",
          "EndpointV2": "0x3333333333333333333333333333333333333333",
          "DogeForGoat": "0x4444444444444444444444444444444444444444",
          "blockNumber": 42
        }
        "#);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = record();
        original.destination_oft = Some(Address::repeat_byte(0x55));

        let path = original.save(dir.path(), "localnet").unwrap();
        assert!(path.ends_with("localnet.json"));

        let loaded = DeploymentRecord::load(dir.path(), "localnet").unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeploymentRecord::load(dir.path(), "testnet").unwrap_err();
        assert!(matches!(err, BridgeError::DeploymentNotFound { .. }));
        assert!(err.to_string().starts_with("testnet.json not found"));
    }

    #[test]
    fn test_missing_vault_address() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("testnet.json"),
            r#"{ "Token": "0x2222222222222222222222222222222222222222", "blockNumber": 1 }"#,
        )
        .unwrap();

        let err = DeploymentRecord::load(dir.path(), "testnet").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingAddress {
                name: "DogeLock",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_adapter() {
        let mut partial = record();
        partial.adapter = Address::ZERO;
        assert!(partial.adapter("testnet").is_err());
        assert_eq!(
            record().adapter("testnet").unwrap(),
            Address::repeat_byte(0x44)
        );
    }
}
