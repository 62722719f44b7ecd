use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use helios_cron_keeper::jobs::ArtifactSource;
use helios_cron_keeper::{ChainConfig, CreateCronJob, DeployContractJob, KeeperError};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "helios-cron-keeper")]
#[command(about = "Deploys the tick contract and registers its Cron task on Helios")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "configs/helios_testnet.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the tick contract and write the deployment record
    Deploy {
        /// Pre-compiled {abi, bytecode} json, overrides deployment.artifact_path
        #[arg(long, conflicts_with = "solc_source")]
        artifact: Option<PathBuf>,

        /// Compile this Solidity file with solc instead of loading an artifact
        #[arg(long)]
        solc_source: Option<PathBuf>,

        /// Overrides deployment.contract_name
        #[arg(long)]
        contract_name: Option<String>,
    },
    /// Register the Cron task that calls the target contract
    CreateCron {
        /// Check balance and print the job without sending anything
        #[arg(long)]
        dry_run: bool,

        /// Overrides contracts.target_contract
        #[arg(long)]
        target_contract: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Dropping the run future on interrupt releases the RPC client; a sent
    // transaction stays on chain either way.
    let exit_code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => 0,
            Err(e) => {
                report_failure(&e);
                1
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("👋 Program interrupted by user");
            130
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ChainConfig::load(&cli.config)?;

    match cli.command {
        Commands::Deploy {
            artifact,
            solc_source,
            contract_name,
        } => {
            if let Some(contract_name) = contract_name {
                config.deployment.contract_name = contract_name;
            }
            let source = match (solc_source, artifact) {
                (Some(source), _) => ArtifactSource::Solidity {
                    source,
                    contract_name: config.deployment.contract_name.clone(),
                },
                (None, Some(artifact)) => ArtifactSource::Compiled(artifact),
                (None, None) => ArtifactSource::Configured,
            };
            DeployContractJob::new(config, source).execute().await?;
        }
        Commands::CreateCron {
            dry_run,
            target_contract,
        } => {
            if let Some(target) = target_contract {
                config.contracts.target_contract = Some(target);
            }
            if let Some(outcome) = CreateCronJob::new(config, dry_run).execute().await? {
                info!("🔗 Registered in transaction {:?}", outcome.hash);
            }
        }
    }

    Ok(())
}

fn report_failure(err: &anyhow::Error) {
    error!("❌ Execution failed:");
    error!("💥 Error message: {}", err);

    if let Some(keeper_error) = err.downcast_ref::<KeeperError>() {
        let hints = keeper_error.remediation();
        if !hints.is_empty() {
            info!("💡 Solution suggestions:");
            for hint in hints {
                info!("  - {}", hint);
            }
        }
    }
}
