//! Strategy classification of a position's legs.
//!
//! The pipeline only depends on the [`StrategyClassifier`] trait and branches on
//! the returned [`StrategyKind`]; the default rules below cover the common
//! single-expiration and two-expiration structures.

use crate::domain::{Decimal, Direction, OptionLeg, OptionType, Strategy, StrategyKind};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Pure, deterministic mapping from legs to a strategy.
pub trait StrategyClassifier: Send + Sync {
    fn classify(&self, legs: &[OptionLeg]) -> Strategy;
}

/// Built-in classifier for verticals, calendars, diagonals, straddles,
/// strangles and iron condors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Contract {
    option_type: OptionType,
    expiration: NaiveDate,
    strike: Decimal,
    direction: Direction,
}

impl DefaultClassifier {
    pub fn new() -> Self {
        DefaultClassifier
    }

    /// Distinct contracts the position opened. Falls back to the side implied by
    /// closing codes when no opening leg is present.
    fn contracts(legs: &[OptionLeg]) -> Vec<Contract> {
        let to_contract = |leg: &OptionLeg| {
            leg.code.direction().map(|direction| Contract {
                option_type: leg.option_type,
                expiration: leg.expiration,
                strike: leg.strike,
                direction,
            })
        };

        let opening: BTreeSet<Contract> = legs
            .iter()
            .filter(|leg| leg.code.is_opening())
            .filter_map(to_contract)
            .collect();
        if !opening.is_empty() {
            return opening.into_iter().collect();
        }

        legs.iter()
            .filter_map(to_contract)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn classify_single(c: &Contract) -> Strategy {
        Strategy::new(
            StrategyKind::Single,
            format!("{} {}", c.direction, c.option_type),
        )
    }

    fn classify_pair(a: &Contract, b: &Contract) -> Strategy {
        if a.option_type == b.option_type {
            if a.direction == b.direction {
                return Strategy::unknown();
            }
            let same_exp = a.expiration == b.expiration;
            let same_strike = a.strike == b.strike;
            return match (same_exp, same_strike) {
                (true, false) => Self::classify_vertical(a, b),
                (false, true) => Strategy::new(
                    StrategyKind::Calendar,
                    format!("{} Calendar Spread", a.option_type),
                ),
                (false, false) => Strategy::new(
                    StrategyKind::Diagonal,
                    format!("{} Diagonal Spread", a.option_type),
                ),
                (true, true) => Strategy::unknown(),
            };
        }

        if a.expiration != b.expiration || a.direction != b.direction {
            return Strategy::unknown();
        }
        if a.strike == b.strike {
            Strategy::new(StrategyKind::Straddle, format!("{} Straddle", a.direction))
        } else {
            Strategy::new(StrategyKind::Strangle, format!("{} Strangle", a.direction))
        }
    }

    fn classify_vertical(a: &Contract, b: &Contract) -> Strategy {
        let (short, long) = if a.direction == Direction::Short {
            (a, b)
        } else {
            (b, a)
        };
        let label = match (short.option_type, short.strike > long.strike) {
            (OptionType::Put, true) => "Bull Put Spread",
            (OptionType::Put, false) => "Bear Put Spread",
            (OptionType::Call, true) => "Bull Call Spread",
            (OptionType::Call, false) => "Bear Call Spread",
        };
        Strategy::new(StrategyKind::Vertical, label)
    }

    fn classify_quad(contracts: &[Contract]) -> Strategy {
        let expiration = contracts[0].expiration;
        if contracts.iter().any(|c| c.expiration != expiration) {
            return Strategy::unknown();
        }

        let find = |option_type: OptionType, direction: Direction| {
            let mut matches = contracts
                .iter()
                .filter(move |c| c.option_type == option_type && c.direction == direction);
            match (matches.next(), matches.next()) {
                (Some(c), None) => Some(*c),
                _ => None,
            }
        };

        let legs = (
            find(OptionType::Put, Direction::Long),
            find(OptionType::Put, Direction::Short),
            find(OptionType::Call, Direction::Short),
            find(OptionType::Call, Direction::Long),
        );
        match legs {
            (Some(long_put), Some(short_put), Some(short_call), Some(long_call))
                if long_put.strike < short_put.strike
                    && short_put.strike < short_call.strike
                    && short_call.strike < long_call.strike =>
            {
                Strategy::new(StrategyKind::IronCondor, "Iron Condor")
            }
            _ => Strategy::unknown(),
        }
    }
}

impl StrategyClassifier for DefaultClassifier {
    fn classify(&self, legs: &[OptionLeg]) -> Strategy {
        let contracts = Self::contracts(legs);
        match contracts.as_slice() {
            [single] => Self::classify_single(single),
            [a, b] => Self::classify_pair(a, b),
            quad @ [_, _, _, _] => Self::classify_quad(quad),
            _ => Strategy::unknown(),
        }
    }
}
