//! Pure computation engine turning ledger fills into positions, rolls and chains.
//!
//! Stages run in dependency order:
//! transactions -> matched legs -> positions -> merged positions -> rolls -> chains.
//! Every call owns its working state; nothing is shared between invocations.

use crate::classifier::{DefaultClassifier, StrategyClassifier};
use crate::domain::{sorted_option_fills, Decimal, Position, Roll, RollChain, Transaction};
use serde::{Deserialize, Serialize};

pub mod assembler;
pub mod lot_matcher;
pub mod merger;
pub mod roll_chain;
pub mod roll_detector;
pub mod summary;

pub use assembler::assemble_position;
pub use lot_matcher::{DroppedFill, Inventory, LegGroup, LotMatcher, MatchedLegs};
pub use merger::merge_multi_leg;
pub use roll_chain::{attach_rolls, build_chains};
pub use roll_detector::RollDetector;
pub use summary::calculate_summary;

/// Tunables for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Strict upper bound on the quantity difference of a roll's two fills.
    pub roll_quantity_tolerance: Decimal,
    /// Collapse same-day legs into multi-leg positions.
    pub merge_multi_leg: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            roll_quantity_tolerance: Decimal::one(),
            merge_multi_leg: true,
        }
    }
}

/// Everything derived from one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub positions: Vec<Position>,
    pub rolls: Vec<Roll>,
    pub roll_chains: Vec<RollChain>,
}

/// Run the full pipeline with default options and the built-in classifier.
pub fn build_positions(transactions: &[Transaction]) -> BuildOutput {
    build_positions_with(transactions, &PipelineOptions::default(), &DefaultClassifier)
}

/// Run the full pipeline.
///
/// Rows that are not option fills (stock trades, incomplete option descriptors,
/// non-positive quantities) are ignored.
pub fn build_positions_with(
    transactions: &[Transaction],
    options: &PipelineOptions,
    classifier: &dyn StrategyClassifier,
) -> BuildOutput {
    let fills = sorted_option_fills(transactions);

    let mut matcher = LotMatcher::new();
    for tx in &fills {
        matcher.process_fill(tx);
    }
    let matched = matcher.into_outputs();

    let mut positions: Vec<Position> = matched
        .closed
        .iter()
        .chain(matched.open.iter())
        .map(|group| assemble_position(group, classifier))
        .collect();
    positions.sort_by_key(|p| p.entry_date);

    if options.merge_multi_leg {
        positions = merge_multi_leg(positions, classifier);
    }

    let rolls = RollDetector::new(options.roll_quantity_tolerance).detect(&fills);
    attach_rolls(&mut positions, &rolls);
    let roll_chains = build_chains(&positions, &rolls);

    tracing::debug!(
        transactions = transactions.len(),
        option_fills = fills.len(),
        positions = positions.len(),
        rolls = rolls.len(),
        roll_chains = roll_chains.len(),
        dropped = matched.dropped.len(),
        "built positions"
    );

    BuildOutput {
        positions,
        rolls,
        roll_chains,
    }
}
