//! # stack-deploy
//!
//! Evaluates the two-service deployment against the in-process cloud.
//!
//! ```bash
//! # Print every unit template
//! stack-deploy --deployment demo synth
//!
//! # Deploy, print the front-door addresses, then tear everything down again
//! RUST_LOG=info stack-deploy deploy --teardown
//! ```

use clap::{Parser, Subcommand};
use stack_deploy::config::DeployConfig;
use stack_deploy::engine::{ChangeKind, LocalEngine};
use stack_deploy::lifecycle::{setup_tracing, Deployment};
use stack_deploy::model::ServiceRole;
use stack_deploy::units::ServiceTopologyProvisioner;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "stack-deploy", version, about = "Deploys two containerized services behind public front doors")]
struct Cli {
    /// Prefix of every resource name and lookup key. Defaults to `$STACK_NAME`.
    #[arg(long)]
    deployment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every unit template as JSON.
    Synth,
    /// Deploy and print the front-door addresses.
    Deploy {
        /// Destroy the deployment again afterwards.
        #[arg(long)]
        teardown: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let config = DeployConfig::from_flag_or_env(cli.deployment.as_deref()).map_err(|e| e.to_string())?;
    let deployment = Deployment::standard(&config).map_err(|e| e.to_string())?;
    let engine = Arc::new(LocalEngine::new());

    let report = deployment
        .deploy(engine.clone())
        .await
        .map_err(|e| e.to_string())?;

    match cli.command {
        Command::Synth => {
            let json = serde_json::to_string_pretty(&report.templates).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        Command::Deploy { teardown } => {
            for (unit, unit_report) in &report.units {
                println!(
                    "{unit}: {} created, {} updated, {} replaced, {} deleted",
                    unit_report.count(ChangeKind::Create),
                    unit_report.count(ChangeKind::Update),
                    unit_report.count(ChangeKind::Replace),
                    unit_report.count(ChangeKind::Delete),
                );
            }
            let topology = config.deployment.topology_unit();
            for role in ServiceRole::ALL {
                let output = ServiceTopologyProvisioner::address_output(role);
                if let Some(address) = report.output(&topology, &output) {
                    println!("{output} = {address}");
                }
            }

            if teardown {
                let reports = deployment
                    .teardown(engine.clone())
                    .await
                    .map_err(|e| e.to_string())?;
                for (unit, teardown_report) in reports {
                    println!("{unit}: {} deleted", teardown_report.deleted.len());
                    for (resource, physical_name) in teardown_report.retained {
                        println!("{unit}: {resource} retained as `{physical_name}`");
                    }
                }
            }
        }
    }

    match Arc::try_unwrap(engine) {
        Ok(engine) => engine.shutdown().await?,
        Err(_) => warn!("Engine still shared; skipping graceful shutdown"),
    }
    info!("Done");
    Ok(())
}
