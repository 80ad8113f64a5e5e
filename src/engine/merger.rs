use crate::classifier::StrategyClassifier;
use crate::domain::{Decimal, Position, PositionStatus, Strategy, Symbol};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Collapse same-day, same-underlying positions whose combined legs form a
/// recognised multi-leg strategy.
///
/// Groups are visited in first-appearance order. Members of a group that does
/// not classify as multi-leg are emitted unchanged and contiguously, so running
/// the merge twice yields the same list.
pub fn merge_multi_leg(
    positions: Vec<Position>,
    classifier: &dyn StrategyClassifier,
) -> Vec<Position> {
    let mut order: Vec<(Symbol, NaiveDate)> = Vec::new();
    let mut groups: HashMap<(Symbol, NaiveDate), Vec<Position>> = HashMap::new();
    for position in positions {
        let key = (position.symbol.clone(), position.entry_date);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(position);
    }

    let mut merged = Vec::new();
    for key in order {
        let Some(members) = groups.remove(&key) else {
            continue;
        };
        if members.len() < 2 {
            merged.extend(members);
            continue;
        }

        let union: Vec<_> = members.iter().flat_map(|p| p.legs.iter().cloned()).collect();
        let strategy = classifier.classify(&union);
        if strategy.kind.is_multi_leg() {
            tracing::debug!(
                symbol = %key.0,
                entry_date = %key.1,
                members = members.len(),
                strategy = %strategy,
                "merging same-day positions"
            );
            merged.push(combine(members, strategy));
        } else {
            merged.extend(members);
        }
    }
    merged
}

fn combine(members: Vec<Position>, strategy: Strategy) -> Position {
    let all_closed = members.iter().all(Position::is_closed);

    let total_credit: Decimal = members.iter().map(|p| p.total_credit).sum();
    let total_debit: Decimal = members.iter().map(|p| p.total_debit).sum();
    let net_pl: Decimal = members.iter().map(|p| p.net_pl).sum();

    let (status, exit_date, realized_pl, max_profitable_debit) = if all_closed {
        let exit = members.iter().filter_map(|p| p.exit_date).max();
        (PositionStatus::Closed, exit, Some(net_pl), None)
    } else {
        let at_risk: Decimal = members
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.total_credit)
            .sum();
        (PositionStatus::Open, None, None, Some(at_risk))
    };

    let symbol = members[0].symbol.clone();
    let entry_date = members[0].entry_date;
    let mut legs = Vec::new();
    let mut roll_ids = Vec::new();
    let mut transaction_ids: Vec<String> = Vec::new();
    for member in members {
        legs.extend(member.legs);
        roll_ids.extend(member.roll_ids);
        for id in member.transaction_ids {
            if !transaction_ids.contains(&id) {
                transaction_ids.push(id);
            }
        }
    }

    Position {
        id: Position::compute_id(transaction_ids.iter().map(String::as_str)),
        symbol,
        strategy,
        entry_date,
        exit_date,
        status,
        legs,
        roll_ids,
        total_credit,
        total_debit,
        net_pl,
        realized_pl,
        max_profitable_debit,
        transaction_ids,
    }
}
