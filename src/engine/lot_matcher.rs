use crate::domain::{ContractKey, Decimal, LegStatus, OptionLeg, Transaction};
use std::collections::{HashMap, VecDeque};

/// An opening fill and whatever has been matched against it so far.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Lot {
    opening: OptionLeg,
    remaining: Decimal,
    closes: Vec<OptionLeg>,
}

/// Legs matched together for one contract.
///
/// A closed group is exactly one fully consumed lot; an open group collects every
/// lot still open for its contract at end of stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegGroup {
    pub key: ContractKey,
    pub legs: Vec<OptionLeg>,
    pub open: bool,
}

/// Running quantity totals for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inventory {
    pub opened: Decimal,
    pub closed: Decimal,
    pub remaining: Decimal,
}

/// Terminal quantity that found no open lot to offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFill {
    pub transaction_id: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchedLegs {
    pub closed: Vec<LegGroup>,
    pub open: Vec<LegGroup>,
    pub dropped: Vec<DroppedFill>,
}

/// FIFO matcher of opening lots against closing, expiring and assigned fills.
///
/// Callers must feed fills in activity-date order with ledger order kept on ties
/// (see [`crate::domain::sorted_option_fills`]).
pub struct LotMatcher {
    queues: HashMap<ContractKey, VecDeque<Lot>>,
    inventory: HashMap<ContractKey, Inventory>,
    /// First-seen order of contract keys, for deterministic open-group output.
    key_order: Vec<ContractKey>,

    // Outputs accumulated during processing.
    closed: Vec<LegGroup>,
    dropped: Vec<DroppedFill>,
}

impl LotMatcher {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
            inventory: HashMap::new(),
            key_order: Vec::new(),
            closed: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Process a single option fill, updating lot queues and emitting groups.
    pub fn process_fill(&mut self, tx: &Transaction) {
        let Some(key) = tx.contract_key() else {
            tracing::debug!(transaction_id = %tx.id, "skipping fill without contract details");
            return;
        };

        if tx.code.is_opening() {
            self.handle_open(tx, key);
        } else if tx.code.is_terminal() {
            self.handle_terminal(tx, key);
        }
    }

    /// Push a new lot for an opening fill.
    fn handle_open(&mut self, tx: &Transaction, key: ContractKey) {
        let opening = make_leg(tx, &key, tx.quantity, tx.amount, LegStatus::Open);

        let inventory = self.inventory.entry(key.clone()).or_default();
        inventory.opened += tx.quantity;
        inventory.remaining += tx.quantity;

        if !self.queues.contains_key(&key) {
            self.key_order.push(key.clone());
        }
        self.queues.entry(key).or_default().push_back(Lot {
            opening,
            remaining: tx.quantity,
            closes: Vec::new(),
        });
    }

    /// Consume lots oldest-first for a terminal fill.
    fn handle_terminal(&mut self, tx: &Transaction, key: ContractKey) {
        let status = LegStatus::for_terminal(tx.code);
        let mut left = tx.quantity;
        let mut allocated = Decimal::zero();

        if let Some(queue) = self.queues.get_mut(&key) {
            while left.is_positive() {
                let Some(lot) = queue.front_mut() else {
                    break;
                };

                let offset = lot.remaining.min(left);
                left -= offset;
                // The last slice of a fully matched fill takes the rounding remainder.
                let share = if left.is_zero() {
                    tx.amount - allocated
                } else {
                    tx.amount * offset / tx.quantity
                };
                allocated += share;

                lot.closes.push(make_leg(tx, &key, offset, share, status));
                lot.remaining -= offset;

                let inventory = self.inventory.entry(key.clone()).or_default();
                inventory.closed += offset;
                inventory.remaining -= offset;

                if lot.remaining.is_zero() {
                    if let Some(mut lot) = queue.pop_front() {
                        lot.opening.status = status;
                        let mut legs = Vec::with_capacity(lot.closes.len() + 1);
                        legs.push(lot.opening);
                        legs.extend(lot.closes);
                        self.closed.push(LegGroup {
                            key: key.clone(),
                            legs,
                            open: false,
                        });
                    }
                }
            }
        }

        if left.is_positive() {
            tracing::warn!(
                transaction_id = %tx.id,
                code = %tx.code,
                quantity = %left,
                "dropping closing quantity with no open lot"
            );
            self.dropped.push(DroppedFill {
                transaction_id: tx.id.clone(),
                quantity: left,
            });
        }
    }

    /// Quantity totals for a contract; zero if never seen.
    pub fn inventory(&self, key: &ContractKey) -> Inventory {
        self.inventory.get(key).copied().unwrap_or_default()
    }

    /// Remaining quantity across every open lot of a contract.
    pub fn open_quantity(&self, key: &ContractKey) -> Decimal {
        self.queues
            .get(key)
            .map(|queue| queue.iter().map(|lot| lot.remaining).sum())
            .unwrap_or_default()
    }

    /// Get the accumulated outputs, folding still-open lots into one group per contract.
    pub fn into_outputs(mut self) -> MatchedLegs {
        let mut open = Vec::new();
        for key in self.key_order {
            let Some(queue) = self.queues.remove(&key) else {
                continue;
            };
            if queue.is_empty() {
                continue;
            }
            let mut legs = Vec::new();
            for lot in queue {
                legs.push(lot.opening);
                legs.extend(lot.closes);
            }
            open.push(LegGroup {
                key,
                legs,
                open: true,
            });
        }

        MatchedLegs {
            closed: self.closed,
            open,
            dropped: self.dropped,
        }
    }
}

impl Default for LotMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn make_leg(
    tx: &Transaction,
    key: &ContractKey,
    quantity: Decimal,
    amount: Decimal,
    status: LegStatus,
) -> OptionLeg {
    OptionLeg {
        transaction_id: tx.id.clone(),
        underlying: key.symbol.clone(),
        strike: key.strike,
        expiration: key.expiration,
        option_type: key.option_type,
        quantity,
        code: tx.code,
        status,
        activity_date: tx.activity_date,
        amount,
    }
}
