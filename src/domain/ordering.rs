//! Stable transaction ordering for deterministic processing.

use crate::domain::Transaction;
use chrono::NaiveDate;

/// Stable ordering key for transactions.
///
/// Ordering: activity_date -> ledger index. Rows dated the same day keep the
/// order the ledger supplied them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionOrderingKey {
    /// Activity date (primary sort).
    pub activity_date: NaiveDate,
    /// Position in the input ledger (tie-breaker).
    pub ledger_index: usize,
}

impl TransactionOrderingKey {
    pub fn new(tx: &Transaction, ledger_index: usize) -> Self {
        TransactionOrderingKey {
            activity_date: tx.activity_date,
            ledger_index,
        }
    }
}

/// Select the option-pipeline rows and sort them deterministically.
pub fn sorted_option_fills(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut keyed: Vec<(TransactionOrderingKey, &Transaction)> = transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| tx.is_option_fill())
        .map(|(idx, tx)| (TransactionOrderingKey::new(tx, idx), tx))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, tx)| tx).collect()
}
