//! CLI binary auditing the priority-fee ordering of block transactions.

use clap::Parser;
use eyre::{Result, WrapErr};
use fee_audit::cli::{init_tracing, AuditCli, Command};
use fee_audit::rpc::AuditRpcClient;
use fee_audit::sampler::{AuditConfig, Auditor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = AuditCli::parse();
    init_tracing(cli.log_level());

    let client = AuditRpcClient::new(&cli.rpc_url)?;

    let chain_id =
        client.chain_id().await.wrap_err("Failed to connect to the node provider")?;
    let latest = client.latest_block_number().await?;
    tracing::info!(chain_id, latest, "Connected to node provider");

    match cli.command {
        Command::Check { block } => {
            let auditor = Auditor::new(client, AuditConfig::default());
            let audit = auditor.check_block(block).await?;
            println!(
                "Block {} ({}, {} txs, {} compared) is {}",
                audit.number,
                audit.era,
                audit.tx_count,
                audit.compared,
                if audit.ordered { "ordered" } else { "not ordered" }
            );
        }
        Command::Sample { samples, fork_block } => {
            let config =
                AuditConfig::default().with_samples_per_era(samples).with_fork_block(fork_block);
            let auditor = Auditor::new(client, config);
            let stats = auditor.run().await?;
            println!(
                "Checked {} blocks: {} ordered, {} unordered ({} fetch failures)",
                stats.blocks_checked,
                stats.blocks_ordered,
                stats.blocks_unordered,
                stats.fetch_failures
            );
        }
    }

    Ok(())
}
