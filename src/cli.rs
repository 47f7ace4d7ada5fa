//! CLI arguments and tracing setup for the `fee-audit` binary.

use clap::{ArgAction, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::sampler::LONDON_FORK_BLOCK;

/// Command-line interface for the fee-ordering audit tool.
#[derive(Debug, Parser)]
#[command(name = "fee-audit", version, about = "Audits priority-fee ordering of block transactions")]
pub struct AuditCli {
    /// HTTP JSON-RPC endpoint of the node provider.
    #[arg(long = "rpc-url", env = "FEE_AUDIT_RPC_URL")]
    pub rpc_url: String,

    /// Increase logging verbosity (`-v`: DEBUG, `-vv` or more: TRACE).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// What to audit.
    #[command(subcommand)]
    pub command: Command,
}

/// Audit subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a single block's priority-fee ordering.
    Check {
        /// Block number to check.
        #[arg(long)]
        block: u64,
    },
    /// Sample random blocks from both fee eras and check each one.
    Sample {
        /// Blocks to sample from each era.
        #[arg(long, default_value_t = 5)]
        samples: u64,
        /// First block of the fee-market era.
        #[arg(long = "fork-block", default_value_t = LONDON_FORK_BLOCK)]
        fork_block: u64,
    },
}

impl AuditCli {
    /// Converts the verbosity count to a [`tracing::Level`].
    ///
    /// `0` is INFO so result lines are visible by default.
    pub const fn log_level(&self) -> tracing::Level {
        match self.verbosity {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Initializes the tracing subscriber with the given default level.
///
/// `RUST_LOG` overrides the default directive. Should only be called once.
pub fn init_tracing(level: tracing::Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
