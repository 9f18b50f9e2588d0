use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use lockbridge::tasks::ChainRole;

#[derive(Parser)]
#[command(name = "lockbridge")]
#[command(about = "Deploy, operate and index the lock/OFT bridge", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Network from the built-in registry
    #[arg(long, global = true, env = "LOCKBRIDGE_NETWORK", default_value = "localhost")]
    pub network: String,

    /// Directory holding `<network>.json` deployment records
    #[arg(long, global = true, default_value = "deployments")]
    pub deployments_dir: PathBuf,

    /// Directory holding compiled contract artifacts
    #[arg(long, global = true, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bridge through an OFT or adapter
    Bridge {
        /// OFT contract address
        #[arg(long)]
        oft: Address,

        /// Endpoint id of the destination chain
        #[arg(long)]
        eid: u32,

        /// Amount to bridge, in base units
        #[arg(long)]
        value: U256,

        /// Submit the transaction after quoting
        #[arg(long)]
        execute: bool,

        /// Token receiver on the destination chain
        #[arg(long)]
        receiver: Option<Address>,
    },

    /// Bridge locked tokens through the lock vault
    BridgeLock {
        /// Adapter used for the quote, the recorded one when omitted
        #[arg(long)]
        oft: Option<Address>,

        /// Lock vault, the recorded one when omitted
        #[arg(long)]
        lock: Option<Address>,

        #[arg(long)]
        eid: u32,

        /// Amount to bridge, in base units
        #[arg(long)]
        value: U256,

        #[arg(long)]
        execute: bool,

        #[arg(long)]
        receiver: Option<Address>,
    },

    /// Deploy OFT contracts on the source or destination chain
    #[command(name = "deploy-oft")]
    DeployOft {
        /// source, dest or peer
        #[arg(long = "chain")]
        role: ChainRole,

        /// Endpoint contract of the current chain
        #[arg(long)]
        endpoint: Option<Address>,

        /// Contract owner
        #[arg(long)]
        owner: Option<Address>,

        #[arg(long)]
        eid_peer: Option<u32>,

        #[arg(long)]
        oft_peer: Option<Address>,

        /// Existing token on the source chain
        #[arg(long = "dogecoin")]
        token: Option<Address>,

        /// Amount minted to the signer after deployment, in base units
        #[arg(long)]
        initial_value: Option<U256>,

        /// OFT to link in peer mode
        #[arg(long)]
        oft: Option<Address>,
    },

    /// Deploy a full local pair with mock endpoints
    DeployLocal,

    /// Lock tokens on testnet
    UserLock {
        /// Amount of tokens to lock
        #[arg(long)]
        amount: String,
    },

    /// Unlock tokens on testnet
    UserUnlock {
        /// Amount of tokens to unlock
        #[arg(long)]
        amount: String,
    },

    /// Bridge locked tokens on testnet
    UserBridge {
        /// Amount of tokens to bridge
        #[arg(long)]
        amount: String,
    },

    /// Set the vault's global lock limit
    SetMaxLimit {
        #[arg(long)]
        amount: String,
    },

    /// Set the per-user lock bounds
    SetPersonalLimits {
        #[arg(long)]
        max: String,

        #[arg(long)]
        min: String,
    },

    /// Register a peer OApp for an endpoint id
    SetPeer {
        #[arg(long)]
        eid: u32,

        #[arg(long)]
        peer: Address,

        /// OApp to configure, the recorded adapter when omitted
        #[arg(long)]
        contract: Option<Address>,
    },

    /// Create test data for local development
    CreateTestData,

    /// Create user data for testnet operations
    CreateUserData,

    /// Index vault events into entities
    Index {
        /// Write the entities as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy_oft() {
        let cli = Cli::try_parse_from([
            "lockbridge",
            "--network",
            "sepolia-testnet",
            "deploy-oft",
            "--chain",
            "dest",
            "--eid-peer",
            "40102",
            "--oft-peer",
            "0x000000000000000000000000000000000000dEaD",
        ])
        .unwrap();

        assert_eq!(cli.network, "sepolia-testnet");
        let Commands::DeployOft {
            role, eid_peer, ..
        } = cli.command
        else {
            panic!("expected deploy-oft");
        };
        assert_eq!(role, ChainRole::Dest);
        assert_eq!(eid_peer, Some(40102));
    }

    #[test]
    fn test_parse_bridge_defaults() {
        let cli = Cli::try_parse_from([
            "lockbridge",
            "bridge",
            "--oft",
            "0x000000000000000000000000000000000000dEaD",
            "--eid",
            "2",
            "--value",
            "100000000",
        ])
        .unwrap();

        let Commands::Bridge {
            execute, receiver, value, ..
        } = cli.command
        else {
            panic!("expected bridge");
        };
        assert!(!execute);
        assert_eq!(receiver, None);
        assert_eq!(value, U256::from(100_000_000u64));
    }
}
