use super::lot_matcher::LegGroup;
use crate::classifier::StrategyClassifier;
use crate::domain::{credit_debit, Position, PositionStatus};

/// Build a Position from one matched leg group.
pub fn assemble_position(group: &LegGroup, classifier: &dyn StrategyClassifier) -> Position {
    let legs = group.legs.clone();

    let mut transaction_ids: Vec<String> = Vec::with_capacity(legs.len());
    for leg in &legs {
        if !transaction_ids.contains(&leg.transaction_id) {
            transaction_ids.push(leg.transaction_id.clone());
        }
    }

    let entry_date = legs
        .iter()
        .map(|leg| leg.activity_date)
        .min()
        .unwrap_or_default();
    let last_date = legs.iter().map(|leg| leg.activity_date).max();

    let (total_credit, total_debit) = credit_debit(legs.iter().map(|leg| &leg.amount));
    let net_pl = total_credit - total_debit;
    let strategy = classifier.classify(&legs);
    let id = Position::compute_id(transaction_ids.iter().map(String::as_str));

    let (status, exit_date, realized_pl, max_profitable_debit) = if group.open {
        (PositionStatus::Open, None, None, Some(total_credit))
    } else {
        (PositionStatus::Closed, last_date, Some(net_pl), None)
    };

    Position {
        id,
        symbol: group.key.symbol.clone(),
        strategy,
        entry_date,
        exit_date,
        status,
        legs,
        roll_ids: Vec::new(),
        total_credit,
        total_debit,
        net_pl,
        realized_pl,
        max_profitable_debit,
        transaction_ids,
    }
}
