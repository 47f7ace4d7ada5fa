//! Priority-fee ordering check over a block's transactions.
//!
//! Blocks are checked against the two-era fee rule around the London hard
//! fork (EIP-1559): before London every transaction carries a single
//! `gasPrice`; after London a type-2 transaction's tip to the producer is
//! bounded by `maxPriorityFeePerGas` and by what remains of `maxFeePerGas`
//! once the block's base fee is taken out.

use alloy_primitives::U256;

/// Legacy transaction type (pre-EIP-1559 `gasPrice` format).
pub const TX_TYPE_LEGACY: u8 = 0;

/// Fee-market transaction type (EIP-1559 dynamic-fee format).
pub const TX_TYPE_FEE_MARKET: u8 = 2;

/// Per-transaction fee fields, as reported by `eth_getBlockByNumber`.
///
/// Fields are optional because their presence depends on the transaction
/// type; the RPC layer copies them through without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxFees {
    /// EIP-2718 transaction type. Transactions with no `type` field on the
    /// wire are legacy (type 0).
    pub tx_type: u8,
    /// Effective gas price (always reported for legacy transactions).
    pub gas_price: Option<U256>,
    /// Maximum tip to the block producer (type-2 transactions).
    pub max_priority_fee_per_gas: Option<U256>,
    /// Total fee ceiling per gas (type-2 transactions).
    pub max_fee_per_gas: Option<U256>,
}

/// Fee-relevant view of one block: its base fee and its transactions in
/// block order.
#[derive(Debug, Clone, Default)]
pub struct BlockFees {
    /// Block number.
    pub number: u64,
    /// Base fee per gas. Present if and only if London is active for this
    /// block.
    pub base_fee_per_gas: Option<U256>,
    /// Transactions in block order.
    pub transactions: Vec<TxFees>,
}

impl BlockFees {
    /// Returns whether London (EIP-1559) is active for this block.
    pub fn is_post_london(&self) -> bool {
        self.base_fee_per_gas.is_some()
    }
}

/// Computes the priority fee a transaction pays the block producer.
///
/// `base_fee` is the containing block's base fee; `None` means the block is
/// pre-London. Returns `None` when the transaction does not participate in
/// the ordering check: its type is unrecognized, or the field its branch
/// needs is absent.
pub fn priority_fee(tx: &TxFees, base_fee: Option<U256>) -> Option<U256> {
    match base_fee {
        // Pre-London every transaction is priced by gasPrice alone,
        // whatever its type.
        None => tx.gas_price,
        Some(base_fee) => match tx.tx_type {
            TX_TYPE_LEGACY => tx.gas_price,
            TX_TYPE_FEE_MARKET => {
                let max_priority = tx.max_priority_fee_per_gas?;
                let max_fee = tx.max_fee_per_gas?;
                // A max fee below the base fee clamps to a zero tip.
                Some(max_priority.min(max_fee.saturating_sub(base_fee)))
            }
            other => {
                tracing::debug!(tx_type = other, "skipping unrecognized transaction type");
                None
            }
        },
    }
}

/// Returns whether the block's transactions are ordered by non-increasing
/// priority fee.
///
/// Transactions for which [`priority_fee`] returns `None` are excluded from
/// the comparison chain rather than treated as violations. Ties are ordered;
/// empty and single-transaction blocks are trivially ordered.
pub fn is_ordered(block: &BlockFees) -> bool {
    let mut previous: Option<U256> = None;

    for tx in &block.transactions {
        let Some(fee) = priority_fee(tx, block.base_fee_per_gas) else {
            continue;
        };
        if let Some(prev) = previous {
            if fee > prev {
                return false;
            }
        }
        previous = Some(fee);
    }

    true
}

/// Counts the transactions that participate in the comparison chain.
pub fn compared_tx_count(block: &BlockFees) -> usize {
    block
        .transactions
        .iter()
        .filter(|tx| priority_fee(tx, block.base_fee_per_gas).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_market(max_priority: u64, max_fee: u64) -> TxFees {
        TxFees {
            tx_type: TX_TYPE_FEE_MARKET,
            max_priority_fee_per_gas: Some(U256::from(max_priority)),
            max_fee_per_gas: Some(U256::from(max_fee)),
            ..Default::default()
        }
    }

    #[test]
    fn type2_fee_is_bounded_by_remaining_max_fee() {
        let tx = fee_market(10, 105);
        let fee = priority_fee(&tx, Some(U256::from(100))).unwrap();
        assert_eq!(fee, U256::from(5));

        let tx = fee_market(3, 200);
        let fee = priority_fee(&tx, Some(U256::from(100))).unwrap();
        assert_eq!(fee, U256::from(3));
    }

    #[test]
    fn max_fee_below_base_fee_clamps_to_zero() {
        let tx = fee_market(10, 90);
        let fee = priority_fee(&tx, Some(U256::from(100))).unwrap();
        assert_eq!(fee, U256::ZERO);
    }

    #[test]
    fn pre_london_uses_gas_price_for_every_type() {
        let mut tx = fee_market(10, 200);
        tx.gas_price = Some(U256::from(77));
        assert_eq!(priority_fee(&tx, None), Some(U256::from(77)));
    }

    #[test]
    fn missing_fields_are_skipped() {
        let tx = TxFees { tx_type: TX_TYPE_FEE_MARKET, ..Default::default() };
        assert_eq!(priority_fee(&tx, Some(U256::from(100))), None);

        let tx = TxFees::default();
        assert_eq!(priority_fee(&tx, None), None);
    }
}
