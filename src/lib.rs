//! Priority-fee ordering audit for Ethereum blocks.
//!
//! Determines whether the transactions within a block are ordered by
//! non-increasing priority fee, applying the two-era rule around the London
//! hard fork (EIP-1559): pre-London blocks compare raw `gasPrice`; from
//! London onwards a type-2 transaction's fee is
//! `min(maxPriorityFeePerGas, maxFeePerGas - baseFeePerGas)`.
//!
//! # Overview
//!
//! - [`ordering`] — the pure checker and its block/transaction fee views.
//! - [`rpc`] — JSON-RPC client fetching block fee data from a node provider.
//! - [`sampler`] — configuration and the random-sampling audit driver.
//! - [`cli`] — argument parsing and tracing setup for the binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use fee_audit::{AuditConfig, AuditRpcClient, Auditor};
//!
//! # async fn run() -> eyre::Result<()> {
//! let client = AuditRpcClient::new("https://eth-mainnet.example.org")?;
//! let auditor = Auditor::new(client, AuditConfig::default());
//! let audit = auditor.check_block(12_964_999).await?;
//! println!("Block {} ordered: {}", audit.number, audit.ordered);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod ordering;
pub mod rpc;
pub mod sampler;

pub use ordering::{is_ordered, priority_fee, BlockFees, TxFees};
pub use rpc::{http_provider, AuditRpcClient};
pub use sampler::{AuditConfig, AuditStats, Auditor, BlockAudit, Era, LONDON_FORK_BLOCK};
