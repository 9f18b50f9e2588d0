use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Unknown network: {name}")]
    UnknownNetwork { name: String },

    #[error("Task `{task}` is only for {expected} networks, not `{network}`")]
    NetworkRestricted {
        task: &'static str,
        network: String,
        expected: &'static str,
    },

    #[error("{network}.json not found in {dir}")]
    DeploymentNotFound { network: String, dir: String },

    #[error("Contract address `{name}` not found in {network}.json")]
    MissingAddress { name: &'static str, network: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid amount `{amount}`: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Contract reverted: {reason}")]
    ContractReverted { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Malformed log: {0}")]
    MalformedLog(String),

    #[error("Locked total for {user} overflows applying {amount}")]
    AccountingOverflow { user: Address, amount: U256 },

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("Unit conversion error: {0}")]
    Units(#[from] alloy_primitives::utils::UnitsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand for a revert raised by a contract (or its simulation).
    pub fn revert(reason: impl Into<String>) -> Self {
        Self::ContractReverted {
            reason: reason.into(),
        }
    }

    /// Returns the revert reason if this error is a contract revert.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::ContractReverted { reason } => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_reason() {
        let err = BridgeError::revert("ExceedsPersonalLimit");
        assert_eq!(err.revert_reason(), Some("ExceedsPersonalLimit"));
        assert_eq!(err.to_string(), "Contract reverted: ExceedsPersonalLimit");

        let err = BridgeError::InvalidConfig("missing".to_string());
        assert_eq!(err.revert_reason(), None);
    }

    #[test]
    fn test_deployment_not_found_message() {
        let err = BridgeError::DeploymentNotFound {
            network: "testnet".to_string(),
            dir: "deployments".to_string(),
        };
        assert_eq!(err.to_string(), "testnet.json not found in deployments");
    }
}
