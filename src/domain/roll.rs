//! Rolls and the chains they form.

use crate::domain::{Decimal, OptionType, PositionStatus, Symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Strike and expiration of one side of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTerms {
    pub strike: Decimal,
    pub expiration: NaiveDate,
}

/// Same-day close of one contract and reopen of another on the same underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roll {
    pub id: String,
    /// Closing transaction id (BTC/STC).
    pub from_leg_id: String,
    /// Opening transaction id (BTO/STO).
    pub to_leg_id: String,
    pub roll_date: NaiveDate,
    pub symbol: Symbol,
    pub option_type: OptionType,
    pub from_strike: Decimal,
    pub to_strike: Decimal,
    pub from_expiration: NaiveDate,
    pub to_expiration: NaiveDate,
    pub net_credit: Decimal,
}

impl Roll {
    pub fn compute_id(from_leg_id: &str, to_leg_id: &str) -> String {
        format!("roll:{}>{}", from_leg_id, to_leg_id)
    }

    pub fn from_terms(&self) -> ContractTerms {
        ContractTerms {
            strike: self.from_strike,
            expiration: self.from_expiration,
        }
    }

    pub fn to_terms(&self) -> ContractTerms {
        ContractTerms {
            strike: self.to_strike,
            expiration: self.to_expiration,
        }
    }
}

/// One position's slice of a roll chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSegment {
    pub position_id: String,
    pub status: PositionStatus,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    /// Date of the roll that opened this segment; None for the first segment.
    pub roll_in_date: Option<NaiveDate>,
    pub roll_in_id: Option<String>,
    /// Contract rolled out of to open this segment; None for the first segment.
    pub from: Option<ContractTerms>,
    /// Contract held through this segment.
    pub to: ContractTerms,
    pub credit: Decimal,
    pub debit: Decimal,
    pub net_credit: Decimal,
}

/// Maximal sequence of positions linked end-to-end by rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollChain {
    pub id: String,
    pub symbol: Symbol,
    pub segments: Vec<ChainSegment>,
    pub roll_count: usize,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    /// Realized P/L of the closed segments only.
    #[serde(rename = "netPL")]
    pub net_pl: Decimal,
    pub status: PositionStatus,
    pub first_entry_date: NaiveDate,
    pub last_exit_date: Option<NaiveDate>,
}

impl RollChain {
    pub fn position_ids(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.position_id.as_str())
    }
}
