//! Portfolio-level statistics snapshot.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    #[serde(rename = "totalPL")]
    pub total_pl: Decimal,
    pub total_premium_collected: Decimal,
    pub open_positions: usize,
    pub closed_positions: usize,
    /// Fraction of closed positions that were profitable, in [0, 1].
    pub win_rate: Decimal,
    pub wins: usize,
    pub losses: usize,
}
