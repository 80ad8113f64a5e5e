use crate::domain::{Decimal, Roll, Symbol, Transaction};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Finds same-day close + reopen pairs on one underlying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollDetector {
    /// Closing and opening quantities must differ by strictly less than this.
    pub quantity_tolerance: Decimal,
}

impl Default for RollDetector {
    fn default() -> Self {
        Self {
            quantity_tolerance: Decimal::one(),
        }
    }
}

impl RollDetector {
    pub fn new(quantity_tolerance: Decimal) -> Self {
        Self { quantity_tolerance }
    }

    /// Detect rolls among date-sorted option fills.
    ///
    /// Each closing fill pairs with the earliest-ordered unclaimed opening fill of
    /// its reopening code (BTC->STO, STC->BTO) that matches option type and
    /// quantity and changes strike or expiration. An opening fill is claimed by
    /// at most one roll.
    pub fn detect(&self, fills: &[&Transaction]) -> Vec<Roll> {
        let mut order: Vec<(NaiveDate, &str)> = Vec::new();
        let mut groups: HashMap<(NaiveDate, &str), Vec<&Transaction>> = HashMap::new();
        for &tx in fills {
            let key = (tx.activity_date, tx.underlying());
            if !groups.contains_key(&key) {
                order.push(key);
            }
            groups.entry(key).or_default().push(tx);
        }

        let mut rolls = Vec::new();
        for key in order {
            let Some(group) = groups.get(&key) else {
                continue;
            };
            let mut claimed: HashSet<&str> = HashSet::new();

            for closing in group.iter().filter(|tx| tx.code.is_closing()) {
                let Some(opening) = group
                    .iter()
                    .find(|candidate| {
                        !claimed.contains(candidate.id.as_str()) && self.pairs(closing, candidate)
                    })
                    .copied()
                else {
                    continue;
                };
                claimed.insert(opening.id.as_str());

                if let Some(roll) = build_roll(closing, opening) {
                    rolls.push(roll);
                }
            }
        }

        tracing::debug!(rolls = rolls.len(), "roll detection complete");
        rolls
    }

    fn pairs(&self, closing: &Transaction, opening: &Transaction) -> bool {
        if closing.code.reopening_code() != Some(opening.code) {
            return false;
        }
        let (Some(from), Some(to)) = (closing.contract_key(), opening.contract_key()) else {
            return false;
        };
        if from.option_type != to.option_type {
            return false;
        }
        if (closing.quantity - opening.quantity).abs() >= self.quantity_tolerance {
            return false;
        }
        from.strike != to.strike || from.expiration != to.expiration
    }
}

fn build_roll(closing: &Transaction, opening: &Transaction) -> Option<Roll> {
    let from = closing.contract_key()?;
    let to = opening.contract_key()?;
    Some(Roll {
        id: Roll::compute_id(&closing.id, &opening.id),
        from_leg_id: closing.id.clone(),
        to_leg_id: opening.id.clone(),
        roll_date: closing.activity_date,
        symbol: Symbol::new(closing.underlying().to_string()),
        option_type: from.option_type,
        from_strike: from.strike,
        to_strike: to.strike,
        from_expiration: from.expiration,
        to_expiration: to.expiration,
        net_credit: opening.amount + closing.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptionDescriptor, OptionType, TransactionCode};
    use OptionType::{Call, Put};
    use TransactionCode::{Btc, Bto, Stc, Sto};
    use std::str::FromStr;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[allow(clippy::too_many_arguments)]
    fn fill(
        id: &str,
        day: NaiveDate,
        code: TransactionCode,
        option_type: OptionType,
        strike: i64,
        exp: NaiveDate,
        qty: &str,
        amount: i64,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            activity_date: day,
            instrument: "MSFT".to_string(),
            code,
            quantity: Decimal::from_str(qty).unwrap(),
            price: Decimal::one(),
            amount: Decimal::from(amount),
            option: Some(OptionDescriptor {
                symbol: Symbol::new("MSFT".to_string()),
                expiration: Some(exp),
                strike: Some(Decimal::from(strike)),
                option_type,
            }),
        }
    }

    fn detect(fills: &[Transaction]) -> Vec<Roll> {
        let refs: Vec<&Transaction> = fills.iter().collect();
        RollDetector::default().detect(&refs)
    }

    #[test]
    fn test_short_call_roll_out_and_up() {
        let fills = vec![
            fill("c", date(6, 6), Btc, Call, 400, date(6, 21), "2", -300),
            fill("o", date(6, 6), Sto, Call, 410, date(7, 19), "2", 520),
        ];

        let rolls = detect(&fills);
        assert_eq!(rolls.len(), 1);
        let roll = &rolls[0];
        assert_eq!(roll.from_leg_id, "c");
        assert_eq!(roll.to_leg_id, "o");
        assert_eq!(roll.from_strike, Decimal::from(400));
        assert_eq!(roll.to_strike, Decimal::from(410));
        assert_eq!(roll.to_expiration, date(7, 19));
        assert_eq!(roll.net_credit, Decimal::from(220));
    }

    #[test]
    fn test_identical_contract_reopen_is_not_a_roll() {
        let fills = vec![
            fill("c", date(6, 6), Btc, Put, 400, date(6, 21), "1", -100),
            fill("o", date(6, 6), Sto, Put, 400, date(6, 21), "1", 150),
        ];
        assert!(detect(&fills).is_empty());
    }

    #[test]
    fn test_wrong_side_reopen_is_not_a_roll() {
        let fills = vec![
            fill("c", date(6, 6), Btc, Put, 400, date(6, 21), "1", -100),
            fill("o", date(6, 6), Bto, Put, 390, date(6, 21), "1", -80),
        ];
        assert!(detect(&fills).is_empty());
    }

    #[test]
    fn test_quantity_tolerance_is_strict() {
        let fills = vec![
            fill("c", date(6, 6), Stc, Call, 400, date(6, 21), "3", 300),
            fill("o", date(6, 6), Bto, Call, 420, date(6, 21), "2", -150),
        ];
        assert!(detect(&fills).is_empty());

        let fills = vec![
            fill("c", date(6, 6), Stc, Call, 400, date(6, 21), "2", 300),
            fill("o", date(6, 6), Bto, Call, 420, date(6, 21), "2.5", -150),
        ];
        assert_eq!(detect(&fills).len(), 1);
    }

    #[test]
    fn test_different_days_do_not_pair() {
        let fills = vec![
            fill("c", date(6, 6), Btc, Put, 400, date(6, 21), "1", -100),
            fill("o", date(6, 7), Sto, Put, 390, date(6, 21), "1", 150),
        ];
        assert!(detect(&fills).is_empty());
    }

    #[test]
    fn test_earliest_opening_wins_and_is_claimed_once() {
        let fills = vec![
            fill("c1", date(6, 6), Btc, Put, 400, date(6, 21), "1", -100),
            fill("c2", date(6, 6), Btc, Put, 405, date(6, 21), "1", -110),
            fill("o1", date(6, 6), Sto, Put, 390, date(7, 19), "1", 150),
            fill("o2", date(6, 6), Sto, Put, 395, date(7, 19), "1", 160),
        ];

        let rolls = detect(&fills);
        assert_eq!(rolls.len(), 2);
        assert_eq!((rolls[0].from_leg_id.as_str(), rolls[0].to_leg_id.as_str()), ("c1", "o1"));
        assert_eq!((rolls[1].from_leg_id.as_str(), rolls[1].to_leg_id.as_str()), ("c2", "o2"));
    }

    #[test]
    fn test_every_roll_is_a_valid_edge() {
        let fills = vec![
            fill("c1", date(6, 6), Btc, Put, 400, date(6, 21), "1", -100),
            fill("o1", date(6, 6), Sto, Put, 390, date(7, 19), "1", 150),
            fill("c2", date(6, 6), Stc, Call, 420, date(6, 21), "1", 90),
            fill("o2", date(6, 6), Bto, Call, 430, date(6, 21), "1", -40),
        ];
        let by_id: HashMap<&str, &Transaction> =
            fills.iter().map(|tx| (tx.id.as_str(), tx)).collect();

        let rolls = detect(&fills);
        assert_eq!(rolls.len(), 2);
        for roll in &rolls {
            let from = by_id[roll.from_leg_id.as_str()];
            let to = by_id[roll.to_leg_id.as_str()];
            assert!(from.code.is_closing());
            assert!(to.code.is_opening());
            assert_eq!(from.activity_date, to.activity_date);
            assert_eq!(from.underlying(), to.underlying());
            assert!(
                roll.from_strike != roll.to_strike || roll.from_expiration != roll.to_expiration
            );
        }
    }
}
