use crate::domain::{
    ChainSegment, ContractTerms, Decimal, Position, PositionStatus, Roll, RollChain,
};
use std::collections::HashMap;

/// Record on each position the ids of every roll touching one of its transactions.
pub fn attach_rolls(positions: &mut [Position], rolls: &[Roll]) {
    let owners = owner_index(positions);
    let mut attached: Vec<Vec<String>> = vec![Vec::new(); positions.len()];

    for roll in rolls {
        let from = owners.get(roll.from_leg_id.as_str());
        let to = owners.get(roll.to_leg_id.as_str());
        for &idx in from.into_iter().chain(to).flatten() {
            if !attached[idx].contains(&roll.id) {
                attached[idx].push(roll.id.clone());
            }
        }
    }

    for (position, roll_ids) in positions.iter_mut().zip(attached) {
        for roll_id in roll_ids {
            if !position.roll_ids.contains(&roll_id) {
                position.roll_ids.push(roll_id);
            }
        }
    }
}

/// Map each transaction id to the indexes of the positions holding a leg of it.
fn owner_index(positions: &[Position]) -> HashMap<String, Vec<usize>> {
    let mut owners: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, position) in positions.iter().enumerate() {
        for id in &position.transaction_ids {
            owners.entry(id.clone()).or_default().push(idx);
        }
    }
    owners
}

/// Accepted roll links between positions. Every position has at most one
/// successor and one predecessor, so the links form disjoint simple paths.
#[derive(Debug, Default)]
struct Links {
    /// position -> (next position, roll index)
    successor: HashMap<usize, (usize, usize)>,
    /// position -> (previous position, roll index)
    predecessor: HashMap<usize, (usize, usize)>,
}

impl Links {
    /// Try to add the edge `from -> to` carried by `rolls[roll_idx]`.
    ///
    /// Earliest edge wins: a position that already has a successor (or a
    /// predecessor, for the target) rejects later edges, as does an edge whose
    /// from-contract differs from the contract the position was rolled into.
    fn try_link(&mut self, from: usize, to: usize, roll_idx: usize, rolls: &[Roll]) -> bool {
        if from == to {
            return false;
        }
        if let Some(&(next, _)) = self.successor.get(&from) {
            return next == to;
        }
        if self.predecessor.contains_key(&to) {
            return false;
        }
        if let Some(&(_, in_roll)) = self.predecessor.get(&from) {
            if rolls[in_roll].to_terms() != rolls[roll_idx].from_terms() {
                return false;
            }
        }

        let mut cursor = to;
        while let Some(&(next, _)) = self.successor.get(&cursor) {
            if next == from {
                return false;
            }
            cursor = next;
        }

        self.successor.insert(from, (to, roll_idx));
        self.predecessor.insert(to, (from, roll_idx));
        true
    }
}

/// Stitch positions linked by rolls into chains.
///
/// Candidate edges are visited in roll order, then owning-position order. A
/// closing fill split across several positions yields one candidate edge per
/// owner; all but the first compatible one are dropped.
pub fn build_chains(positions: &[Position], rolls: &[Roll]) -> Vec<RollChain> {
    let owners = owner_index(positions);
    let mut links = Links::default();

    for (roll_idx, roll) in rolls.iter().enumerate() {
        let (Some(from_owners), Some(to_owners)) = (
            owners.get(roll.from_leg_id.as_str()),
            owners.get(roll.to_leg_id.as_str()),
        ) else {
            continue;
        };
        for &from in from_owners {
            for &to in to_owners {
                if !links.try_link(from, to, roll_idx, rolls) {
                    tracing::debug!(
                        roll_id = %roll.id,
                        from = %positions[from].id,
                        to = %positions[to].id,
                        "dropping conflicting roll link"
                    );
                }
            }
        }
    }

    let mut chains = Vec::new();
    for head in 0..positions.len() {
        if links.predecessor.contains_key(&head) {
            continue;
        }
        let Some(&(_, first_roll)) = links.successor.get(&head) else {
            continue;
        };
        chains.push(assemble_chain(head, first_roll, positions, rolls, &links));
    }

    tracing::debug!(chains = chains.len(), "roll chain assembly complete");
    chains
}

fn assemble_chain(
    head: usize,
    first_roll: usize,
    positions: &[Position],
    rolls: &[Roll],
    links: &Links,
) -> RollChain {
    let mut segments = Vec::new();
    segments.push(segment(&positions[head], None, rolls[first_roll].from_terms()));

    let mut cursor = head;
    while let Some(&(next, roll_idx)) = links.successor.get(&cursor) {
        let roll = &rolls[roll_idx];
        segments.push(segment(&positions[next], Some(roll), roll.to_terms()));
        cursor = next;
    }

    let first = &positions[head];
    let last = &positions[cursor];
    let total_credits: Decimal = segments.iter().map(|s| s.credit).sum();
    let total_debits: Decimal = segments.iter().map(|s| s.debit).sum();
    let net_pl: Decimal = segments
        .iter()
        .filter(|s| s.status == PositionStatus::Closed)
        .map(|s| s.net_credit)
        .sum();
    // Segments follow link order; a rolled-into open group may hold an older lot.
    let first_entry_date = segments
        .iter()
        .map(|s| s.entry_date)
        .min()
        .unwrap_or(first.entry_date);

    RollChain {
        id: format!("chain:{}", first.id),
        symbol: first.symbol.clone(),
        roll_count: segments.len() - 1,
        total_credits,
        total_debits,
        net_pl,
        status: last.status,
        first_entry_date,
        last_exit_date: if last.is_open() { None } else { last.exit_date },
        segments,
    }
}

fn segment(position: &Position, roll_in: Option<&Roll>, to: ContractTerms) -> ChainSegment {
    ChainSegment {
        position_id: position.id.clone(),
        status: position.status,
        entry_date: position.entry_date,
        exit_date: position.exit_date,
        roll_in_date: roll_in.map(|r| r.roll_date),
        roll_in_id: roll_in.map(|r| r.id.clone()),
        from: roll_in.map(Roll::from_terms),
        to,
        credit: position.total_credit,
        debit: position.total_debit,
        net_credit: position.total_credit - position.total_debit,
    }
}
