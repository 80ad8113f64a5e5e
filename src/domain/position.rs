//! Positions and the option legs they own.

use crate::domain::{Decimal, OptionType, Strategy, Symbol, TransactionCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStatus {
    Open,
    Closed,
    Expired,
    Assigned,
}

impl LegStatus {
    /// Status a terminal code leaves a leg in.
    pub fn for_terminal(code: TransactionCode) -> LegStatus {
        match code {
            TransactionCode::Oexp => LegStatus::Expired,
            TransactionCode::Oasgn => LegStatus::Assigned,
            _ => LegStatus::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// One contract side attributed to a position.
///
/// The leg id is the id of the transaction it came from. When a closing fill is
/// split across several lots, each lot's position gets a leg carrying the matched
/// quantity and a pro-rata share of the fill's cash amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLeg {
    pub transaction_id: String,
    pub underlying: Symbol,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub quantity: Decimal,
    pub code: TransactionCode,
    pub status: LegStatus,
    pub activity_date: NaiveDate,
    pub amount: Decimal,
}

/// The unit of trading activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub symbol: Symbol,
    pub strategy: Strategy,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub status: PositionStatus,
    pub legs: Vec<OptionLeg>,
    pub roll_ids: Vec<String>,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    #[serde(rename = "netPL")]
    pub net_pl: Decimal,
    #[serde(rename = "realizedPL")]
    pub realized_pl: Option<Decimal>,
    /// Capital at risk for an open credit position; None once closed.
    pub max_profitable_debit: Option<Decimal>,
    pub transaction_ids: Vec<String>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == PositionStatus::Closed
    }

    /// True if the transaction contributed a leg to this position.
    pub fn owns_transaction(&self, transaction_id: &str) -> bool {
        self.transaction_ids.iter().any(|id| id == transaction_id)
    }

    /// Deterministic position id derived from its member transaction ids.
    pub fn compute_id<'a, I>(transaction_ids: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for id in transaction_ids {
            hasher.update(id.as_bytes());
            hasher.update([0u8]);
        }
        let hash = hasher.finalize();
        format!("pos:{}", hex::encode(&hash[..16]))
    }
}

/// Sum positive amounts as credits and negative amounts as debits.
pub fn credit_debit<'a, I>(amounts: I) -> (Decimal, Decimal)
where
    I: IntoIterator<Item = &'a Decimal>,
{
    let mut credit = Decimal::zero();
    let mut debit = Decimal::zero();
    for amount in amounts {
        if amount.is_positive() {
            credit += *amount;
        } else if amount.is_negative() {
            debit += amount.abs();
        }
    }
    (credit, debit)
}
