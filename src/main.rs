//! `lockbridge` command line
//!
//! One subcommand per operational task. Every command reads the network from
//! `--network` and secrets from the environment (`.env` is loaded first),
//! connects a signing client and runs the task. Any error aborts with a
//! non-zero exit code.

mod cli;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use lockbridge::deployments::DeploymentRecord;
use lockbridge::providers::AlloyClient;
use lockbridge::tasks::{self, BridgeArgs, BridgeLockArgs, DeployOftArgs, SetPeerArgs};
use lockbridge::{ArtifactStore, BridgeConfig};

/// Accounts `create-test-data` signs with: the owner plus three users.
const TEST_DATA_SIGNERS: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BridgeConfig::from_env(&cli.network)?
        .with_deployments_dir(&cli.deployments_dir)
        .with_artifacts_dir(&cli.artifacts_dir);

    match cli.command {
        Commands::Bridge {
            oft,
            eid,
            value,
            execute,
            receiver,
        } => {
            let client = connect(&config, 0).await?;
            let args = BridgeArgs {
                oft,
                eid,
                value,
                execute,
                receiver,
            };
            let outcome = tasks::bridge_oft(&config, &client, &args).await?;
            tracing::info!("TX fee: {}", outcome.fee);
            if let Some(tx_hash) = outcome.tx_hash {
                tracing::info!("Bridge transaction: {tx_hash}");
            }
        }

        Commands::BridgeLock {
            oft,
            lock,
            eid,
            value,
            execute,
            receiver,
        } => {
            let (oft, lock) = match (oft, lock) {
                (Some(oft), Some(lock)) => (oft, lock),
                (oft, lock) => {
                    let record = DeploymentRecord::load(&config.deployments_dir, &config.network.name)?;
                    (
                        oft.map_or_else(|| record.adapter(&config.network.name), Ok)?,
                        lock.unwrap_or(record.lock),
                    )
                }
            };
            let client = connect(&config, 0).await?;
            let args = BridgeLockArgs {
                oft,
                lock,
                eid,
                value,
                execute,
                receiver,
            };
            let outcome = tasks::bridge_lock(&config, &client, &args).await?;
            tracing::info!("TX fee: {}", outcome.fee);
            if let Some(tx_hash) = outcome.tx_hash {
                tracing::info!("Bridge transaction: {tx_hash}");
            }
        }

        Commands::DeployOft {
            role,
            endpoint,
            owner,
            eid_peer,
            oft_peer,
            token,
            initial_value,
            oft,
        } => {
            let client = connect(&config, 0).await?;
            let args = DeployOftArgs {
                role,
                endpoint,
                owner,
                eid_peer,
                oft_peer,
                token,
                initial_value,
                oft,
            };
            let outcome = tasks::deploy_oft(&config, &client, &args).await?;
            tracing::info!("{outcome:#?}");
        }

        Commands::DeployLocal => {
            config.network.require_local("deploy-local")?;
            let client = connect(&config, 0).await?;
            let deployment = tasks::deploy_local(&config, &client).await?;
            tracing::info!(
                "Deployment record written to {}",
                deployment.record_path.display()
            );
        }

        Commands::UserLock { amount } => {
            let client = connect(&config, 0).await?;
            tasks::user_lock(&config, &client, &amount).await?;
            tracing::info!("Lock operation completed!");
        }

        Commands::UserUnlock { amount } => {
            let client = connect(&config, 0).await?;
            tasks::user_unlock(&config, &client, &amount).await?;
            tracing::info!("Unlock operation completed!");
        }

        Commands::UserBridge { amount } => {
            let client = connect(&config, 0).await?;
            tasks::user_bridge(&config, &client, &amount).await?;
            tracing::info!("Bridge operation completed!");
        }

        Commands::SetMaxLimit { amount } => {
            let client = connect(&config, 0).await?;
            let outcome = tasks::set_max_limit(&config, &client, &amount).await?;
            tracing::info!("Max lock amount set: {}", outcome.tx_hash);
        }

        Commands::SetPersonalLimits { max, min } => {
            let client = connect(&config, 0).await?;
            let outcome = tasks::set_personal_limits(&config, &client, &max, &min).await?;
            tracing::info!("Personal limits set: {}", outcome.tx_hash);
        }

        Commands::SetPeer {
            eid,
            peer,
            contract,
        } => {
            let client = connect(&config, 0).await?;
            let args = SetPeerArgs {
                eid,
                peer,
                contract,
            };
            let outcome = tasks::set_peer(&config, &client, &args).await?;
            tracing::info!("Peer set on {}: {}", outcome.contract, outcome.tx_hash);
        }

        Commands::CreateTestData => {
            config.network.require_local("create-test-data")?;
            let mut clients = Vec::with_capacity(TEST_DATA_SIGNERS);
            for index in 0..TEST_DATA_SIGNERS {
                clients.push(connect(&config, index).await?);
            }
            let users = clients.split_off(1);
            let report = tasks::create_test_data(&config, &clients[0], &users).await?;
            tracing::info!("All test data creation completed! {report:?}");
        }

        Commands::CreateUserData => {
            let client = connect(&config, 0).await?;
            let report = tasks::create_user_data(&config, &client).await?;
            tracing::info!("User data creation completed! {report:?}");
        }

        Commands::Index { output } => {
            let client = connect(&config, 0).await?;
            let outcome = tasks::index_events(&config, &client).await?;
            let json = outcome.store.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .wrap_err_with(|| format!("writing {}", path.display()))?;
                    tracing::info!("Entities written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

/// Connects the `index`-th configured signer to the selected network.
async fn connect(config: &BridgeConfig, index: usize) -> Result<AlloyClient> {
    let signer = config
        .accounts
        .signers(index + 1)?
        .into_iter()
        .nth(index)
        .ok_or_else(|| color_eyre::eyre::eyre!("signer {index} is not configured"))?;

    let client = AlloyClient::connect(
        config.network.rpc_url.clone(),
        signer,
        config.gas,
        ArtifactStore::new(&config.artifacts_dir),
    )
    .await
    .wrap_err_with(|| format!("connecting to {}", config.network.rpc_url))?;
    Ok(client)
}
