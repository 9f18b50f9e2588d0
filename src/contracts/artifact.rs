//! Compiled contract artifacts and creation code
//!
//! Deployments read the bytecode from Hardhat-style artifacts
//! (`<dir>/<Contract>.json` with a `bytecode` hex string) or Foundry output
//! (`bytecode.object`), then append the ABI-encoded constructor arguments.

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolConstructor;
use serde::Deserialize;
use tracing::debug;

use super::abi::{DogeForGoat, DogeLock, DogecoinMock, EndpointV2Mock, GoatOft};
use crate::error::{BridgeError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Debug, Deserialize)]
struct Artifact {
    bytecode: ArtifactBytecode,
}

/// Directory of compiled contract artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads the creation bytecode of `contract`.
    pub fn bytecode(&self, contract: &str) -> Result<Bytes> {
        let path = self.dir.join(format!("{contract}.json"));
        let raw = fs::read_to_string(&path).map_err(|e| {
            BridgeError::Artifact(format!("cannot read {}: {e}", path.display()))
        })?;
        let artifact: Artifact = serde_json::from_str(&raw)
            .map_err(|e| BridgeError::Artifact(format!("{}: {e}", path.display())))?;

        let bytecode = match artifact.bytecode {
            ArtifactBytecode::Hex(code) | ArtifactBytecode::Object { object: code } => code,
        };
        if bytecode.is_empty() {
            return Err(BridgeError::Artifact(format!(
                "{contract} has no bytecode (abstract contract or interface?)"
            )));
        }

        debug!(
            contract = contract,
            path = %path.display(),
            size = bytecode.len(),
            event = "artifact_loaded"
        );
        Ok(bytecode)
    }

    /// Creation code for `request`: bytecode followed by constructor arguments.
    pub fn creation_code(&self, request: &DeployRequest) -> Result<Bytes> {
        let mut code = self.bytecode(request.artifact_name())?.to_vec();
        code.extend_from_slice(&request.constructor_args());
        Ok(code.into())
    }
}

/// A contract deployment understood by every [`BridgeClient`](crate::BridgeClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployRequest {
    /// Mintable ERC20 standing in for the source token.
    TokenMock,
    /// Local messaging endpoint answering to `eid`.
    EndpointMock { eid: u32 },
    /// OFT adapter wrapping `token`.
    OftAdapter { token: Address, endpoint: Address },
    /// Lock vault for `token`, bridging through `adapter`.
    LockVault { token: Address, adapter: Address },
    /// Native OFT minted on the destination chain.
    Oft {
        name: String,
        symbol: String,
        endpoint: Address,
        delegate: Address,
    },
}

impl DeployRequest {
    /// Name of the artifact holding the contract's bytecode.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Self::TokenMock => "DogecoinMock",
            Self::EndpointMock { .. } => "EndpointV2Mock",
            Self::OftAdapter { .. } => "DogeForGoat",
            Self::LockVault { .. } => "DogeLock",
            Self::Oft { .. } => "GoatOFT",
        }
    }

    /// ABI-encoded constructor arguments.
    pub fn constructor_args(&self) -> Vec<u8> {
        match self {
            Self::TokenMock => DogecoinMock::constructorCall {}.abi_encode(),
            Self::EndpointMock { eid } => EndpointV2Mock::constructorCall { eid: *eid }.abi_encode(),
            Self::OftAdapter { token, endpoint } => DogeForGoat::constructorCall {
                token: *token,
                endpoint: *endpoint,
            }
            .abi_encode(),
            Self::LockVault { token, adapter } => DogeLock::constructorCall {
                token: *token,
                adapter: *adapter,
            }
            .abi_encode(),
            Self::Oft {
                name,
                symbol,
                endpoint,
                delegate,
            } => GoatOft::constructorCall {
                name: name.clone(),
                symbol: symbol.clone(),
                endpoint: *endpoint,
                delegate: *delegate,
            }
            .abi_encode(),
        }
    }
}
