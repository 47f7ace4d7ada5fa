//! Random-sampling audit driver covering both fee eras.

use std::fmt::{self, Display, Formatter};

use eyre::Result;

use crate::ordering::{self, BlockFees};
use crate::rpc::AuditRpcClient;

/// Mainnet block at which EIP-1559 activated.
pub const LONDON_FORK_BLOCK: u64 = 12_965_000;

/// Fee era a block was produced under, derived from the presence of its
/// base fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    /// Before the London hard fork: single `gasPrice` pricing.
    PreLondon,
    /// London onwards: base fee plus priority fee pricing.
    London,
}

impl Display for Era {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Era::PreLondon => write!(f, "pre-london"),
            Era::London => write!(f, "london"),
        }
    }
}

/// Configuration for the sampling audit.
#[derive(Clone, Debug)]
pub struct AuditConfig {
    /// Blocks to sample from each era.
    pub samples_per_era: u64,
    /// First block of the fee-market era on the audited chain.
    pub fork_block: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { samples_per_era: 5, fork_block: LONDON_FORK_BLOCK }
    }
}

impl AuditConfig {
    /// Sets the number of blocks sampled from each era.
    pub fn with_samples_per_era(mut self, n: u64) -> Self {
        self.samples_per_era = n;
        self
    }

    /// Sets the fork boundary block number.
    pub fn with_fork_block(mut self, block: u64) -> Self {
        self.fork_block = block;
        self
    }
}

/// Counters for a sampling run.
#[derive(Debug, Default)]
pub struct AuditStats {
    /// Blocks fetched and checked.
    pub blocks_checked: u64,
    /// Blocks whose transactions were ordered by priority fee.
    pub blocks_ordered: u64,
    /// Blocks with at least one ordering violation.
    pub blocks_unordered: u64,
    /// Sampled blocks that could not be fetched.
    pub fetch_failures: u64,
}

impl AuditStats {
    /// Creates a new stats collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the verdict for one checked block.
    pub fn record_checked(&mut self, ordered: bool) {
        self.blocks_checked += 1;
        if ordered {
            self.blocks_ordered += 1;
        } else {
            self.blocks_unordered += 1;
        }
    }

    /// Records a sampled block that could not be fetched.
    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    /// Returns the fraction of checked blocks that were ordered, between
    /// 0.0 and 1.0.
    pub fn ordered_rate(&self) -> f64 {
        if self.blocks_checked == 0 {
            return 0.0;
        }
        self.blocks_ordered as f64 / self.blocks_checked as f64
    }
}

/// Audit verdict for a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAudit {
    /// Block number.
    pub number: u64,
    /// Fee era the block was produced under.
    pub era: Era,
    /// Total transactions in the block.
    pub tx_count: usize,
    /// Transactions that participated in the comparison chain.
    pub compared: usize,
    /// Whether priority fees were non-increasing across the block.
    pub ordered: bool,
}

/// Runs the ordering check over one already-fetched block.
pub fn audit_block(block: &BlockFees) -> BlockAudit {
    let era = if block.is_post_london() { Era::London } else { Era::PreLondon };
    BlockAudit {
        number: block.number,
        era,
        tx_count: block.transactions.len(),
        compared: ordering::compared_tx_count(block),
        ordered: ordering::is_ordered(block),
    }
}

/// Fetches blocks through an injected RPC client and checks their
/// priority-fee ordering.
#[derive(Debug)]
pub struct Auditor {
    client: AuditRpcClient,
    config: AuditConfig,
}

impl Auditor {
    /// Creates an auditor over the given client and configuration.
    pub fn new(client: AuditRpcClient, config: AuditConfig) -> Self {
        Self { client, config }
    }

    /// Fetches and checks a single block.
    pub async fn check_block(&self, number: u64) -> Result<BlockAudit> {
        let block = self.client.block_fees(number).await?;
        Ok(audit_block(&block))
    }

    /// Samples random blocks from both eras and checks each one.
    ///
    /// Errors if the chain head has not passed the configured fork block;
    /// individual fetch failures are logged and counted, not fatal.
    pub async fn run(&self) -> Result<AuditStats> {
        let latest = self.client.latest_block_number().await?;
        if latest < self.config.fork_block {
            eyre::bail!(
                "chain head {latest} has not reached the London fork block {}",
                self.config.fork_block
            );
        }

        tracing::info!(
            samples_per_era = self.config.samples_per_era,
            fork_block = self.config.fork_block,
            latest,
            "Starting sampling audit"
        );

        let mut stats = AuditStats::new();

        for _ in 0..self.config.samples_per_era {
            let pre = sample_block_number(1, self.config.fork_block.saturating_sub(1));
            self.sample_one(pre, &mut stats).await;

            let post = sample_block_number(self.config.fork_block, latest);
            self.sample_one(post, &mut stats).await;
        }

        tracing::info!(
            checked = stats.blocks_checked,
            ordered = stats.blocks_ordered,
            unordered = stats.blocks_unordered,
            fetch_failures = stats.fetch_failures,
            "Sampling audit complete"
        );

        Ok(stats)
    }

    async fn sample_one(&self, number: u64, stats: &mut AuditStats) {
        match self.check_block(number).await {
            Ok(audit) => {
                stats.record_checked(audit.ordered);
                tracing::info!(
                    block = audit.number,
                    era = %audit.era,
                    txs = audit.tx_count,
                    compared = audit.compared,
                    ordered = audit.ordered,
                    "Block checked"
                );
            }
            Err(e) => {
                stats.record_fetch_failure();
                tracing::warn!(block = number, error = %e, "Failed to check sampled block");
            }
        }
    }
}

/// Samples a uniform random block number in `min..=max`.
fn sample_block_number(min: u64, max: u64) -> u64 {
    use rand::Rng;
    let mut rng = rand::rng();
    if min >= max {
        min
    } else {
        rng.random_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::TxFees;
    use alloy_primitives::U256;

    #[test]
    fn config_defaults_and_builders() {
        let config = AuditConfig::default();
        assert_eq!(config.samples_per_era, 5);
        assert_eq!(config.fork_block, LONDON_FORK_BLOCK);

        let config = AuditConfig::default().with_samples_per_era(3).with_fork_block(100);
        assert_eq!(config.samples_per_era, 3);
        assert_eq!(config.fork_block, 100);
    }

    #[test]
    fn stats_accounting() {
        let mut stats = AuditStats::new();
        assert_eq!(stats.ordered_rate(), 0.0);

        stats.record_checked(true);
        stats.record_checked(true);
        stats.record_checked(false);
        stats.record_fetch_failure();

        assert_eq!(stats.blocks_checked, 3);
        assert_eq!(stats.blocks_ordered, 2);
        assert_eq!(stats.blocks_unordered, 1);
        assert_eq!(stats.fetch_failures, 1);
        assert!((stats.ordered_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn audit_reports_era_and_participation() {
        let block = BlockFees {
            number: 13_000_000,
            base_fee_per_gas: Some(U256::from(100)),
            transactions: vec![
                TxFees {
                    tx_type: 0,
                    gas_price: Some(U256::from(200)),
                    ..Default::default()
                },
                // Unrecognized type, excluded from the chain.
                TxFees { tx_type: 1, ..Default::default() },
            ],
        };

        let audit = audit_block(&block);
        assert_eq!(audit.era, Era::London);
        assert_eq!(audit.tx_count, 2);
        assert_eq!(audit.compared, 1);
        assert!(audit.ordered);
    }

    #[test]
    fn sample_block_number_stays_in_range() {
        for _ in 0..100 {
            let n = sample_block_number(10, 20);
            assert!((10..=20).contains(&n));
        }
        assert_eq!(sample_block_number(7, 7), 7);
    }
}
