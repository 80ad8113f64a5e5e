use chrono::NaiveDate;
use rollbook::domain::{OptionDescriptor, SummaryStats};
use rollbook::engine::{LotMatcher, PipelineOptions};
use rollbook::{
    build_positions, build_positions_with, calculate_summary, ContractTerms, Decimal,
    DefaultClassifier, LegStatus, OptionType, Position, PositionStatus, StrategyKind, Symbol,
    Transaction, TransactionCode,
};
use std::collections::HashMap;
use std::str::FromStr;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Contract {
    symbol: &'static str,
    option_type: OptionType,
    strike: &'static str,
    expiration: NaiveDate,
}

fn call(symbol: &'static str, strike: &'static str, expiration: NaiveDate) -> Contract {
    Contract {
        symbol,
        option_type: OptionType::Call,
        strike,
        expiration,
    }
}

fn put(symbol: &'static str, strike: &'static str, expiration: NaiveDate) -> Contract {
    Contract {
        symbol,
        option_type: OptionType::Put,
        strike,
        expiration,
    }
}

fn fill(
    id: &str,
    day: NaiveDate,
    code: TransactionCode,
    contract: &Contract,
    quantity: &str,
    amount: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        activity_date: day,
        instrument: format!(
            "{} {} {} {}",
            contract.symbol, contract.expiration, contract.option_type, contract.strike
        ),
        code,
        quantity: dec(quantity),
        price: Decimal::one(),
        amount: dec(amount),
        option: Some(OptionDescriptor {
            symbol: Symbol::new(contract.symbol.to_string()),
            expiration: Some(contract.expiration),
            strike: Some(dec(contract.strike)),
            option_type: contract.option_type,
        }),
    }
}

fn stock_fill(id: &str, day: NaiveDate, code: TransactionCode) -> Transaction {
    Transaction {
        id: id.to_string(),
        activity_date: day,
        instrument: "AAPL".to_string(),
        code,
        quantity: dec("100"),
        price: dec("190"),
        amount: dec("-19000"),
        option: None,
    }
}

fn position_with<'a>(positions: &'a [Position], transaction_id: &str) -> &'a Position {
    positions
        .iter()
        .find(|p| p.owns_transaction(transaction_id))
        .unwrap_or_else(|| panic!("no position owns {}", transaction_id))
}

fn unmerged() -> PipelineOptions {
    PipelineOptions {
        merge_multi_leg: false,
        ..PipelineOptions::default()
    }
}

#[test]
fn test_short_call_roll_forms_two_segment_chain() {
    let jun100 = call("MSFT", "100", date(6, 21));
    let jul105 = call("MSFT", "105", date(7, 19));
    let ledger = vec![
        fill("t1", date(6, 1), TransactionCode::Sto, &jun100, "5", "500"),
        fill("t2", date(6, 6), TransactionCode::Btc, &jun100, "5", "-200"),
        fill("t3", date(6, 6), TransactionCode::Sto, &jul105, "5", "450"),
    ];

    let output = build_positions(&ledger);

    assert_eq!(output.positions.len(), 2);
    assert_eq!(output.rolls.len(), 1);
    let roll = &output.rolls[0];
    assert_eq!(roll.from_leg_id, "t2");
    assert_eq!(roll.to_leg_id, "t3");
    assert_eq!(roll.net_credit, dec("250"));

    let first = position_with(&output.positions, "t1");
    let second = position_with(&output.positions, "t3");
    assert_eq!(first.status, PositionStatus::Closed);
    assert_eq!(first.net_pl, dec("300"));
    assert_eq!(second.status, PositionStatus::Open);
    assert!(first.roll_ids.contains(&roll.id));
    assert!(second.roll_ids.contains(&roll.id));

    assert_eq!(output.roll_chains.len(), 1);
    let chain = &output.roll_chains[0];
    assert_eq!(chain.roll_count, 1);
    assert_eq!(chain.segments.len(), 2);
    assert_eq!(chain.segments[0].position_id, first.id);
    assert_eq!(chain.segments[1].position_id, second.id);
    assert_eq!(chain.segments[0].from, None);
    assert_eq!(
        chain.segments[1].from,
        Some(ContractTerms {
            strike: dec("100"),
            expiration: date(6, 21),
        })
    );
    assert_eq!(chain.segments[1].to.strike, dec("105"));
    assert_eq!(chain.status, PositionStatus::Open);
    assert_eq!(chain.last_exit_date, None);
    assert_eq!(chain.total_credits, dec("950"));
    assert_eq!(chain.total_debits, dec("200"));
    assert_eq!(chain.net_pl, dec("300"));
    assert_eq!(chain.first_entry_date, date(6, 1));
}

#[test]
fn test_chain_first_entry_date_covers_older_lot_in_rolled_into_position() {
    let jun100 = call("MSFT", "100", date(6, 21));
    let jul105 = call("MSFT", "105", date(7, 19));
    let ledger = vec![
        fill("oA", date(6, 1), TransactionCode::Sto, &jul105, "1", "300"),
        fill("o1", date(6, 2), TransactionCode::Sto, &jun100, "1", "250"),
        fill("c1", date(6, 6), TransactionCode::Btc, &jun100, "1", "-100"),
        fill("o2", date(6, 6), TransactionCode::Sto, &jul105, "1", "320"),
    ];

    let output = build_positions(&ledger);

    let rolled_from = position_with(&output.positions, "o1");
    let rolled_into = position_with(&output.positions, "o2");
    assert!(rolled_into.owns_transaction("oA"));
    assert_eq!(rolled_into.entry_date, date(6, 1));

    assert_eq!(output.roll_chains.len(), 1);
    let chain = &output.roll_chains[0];
    assert_eq!(chain.segments.len(), 2);
    assert_eq!(chain.segments[0].position_id, rolled_from.id);
    assert_eq!(chain.segments[1].position_id, rolled_into.id);
    assert_eq!(chain.segments[1].from.as_ref(), Some(&chain.segments[0].to));
    assert_eq!(chain.segments[0].entry_date, date(6, 2));
    assert_eq!(chain.segments[1].entry_date, date(6, 1));
    assert_eq!(chain.first_entry_date, date(6, 1));
    assert_eq!(chain.id, format!("chain:{}", rolled_from.id));
    assert_eq!(chain.status, PositionStatus::Open);
}

#[test]
fn test_plain_close_has_no_roll() {
    let mar180 = put("AAPL", "180", date(3, 15));
    let ledger = vec![
        fill("t1", date(3, 1), TransactionCode::Sto, &mar180, "1", "250"),
        fill("t2", date(3, 8), TransactionCode::Btc, &mar180, "1", "-100"),
    ];

    let output = build_positions(&ledger);

    assert_eq!(output.positions.len(), 1);
    let position = &output.positions[0];
    assert_eq!(position.status, PositionStatus::Closed);
    assert_eq!(position.exit_date, Some(date(3, 8)));
    assert_eq!(position.net_pl, dec("150"));
    assert_eq!(position.realized_pl, Some(dec("150")));
    assert!(position.roll_ids.is_empty());
    assert!(output.rolls.is_empty());
    assert!(output.roll_chains.is_empty());
}

#[test]
fn test_same_day_call_and_put_merge_into_strangle() {
    let ledger = vec![
        fill("t1", date(4, 2), TransactionCode::Sto, &call("SPY", "520", date(4, 19)), "1", "310"),
        fill("t2", date(4, 2), TransactionCode::Sto, &put("SPY", "490", date(4, 19)), "1", "280"),
    ];

    let output = build_positions(&ledger);

    assert_eq!(output.positions.len(), 1);
    let position = &output.positions[0];
    assert_eq!(position.strategy.kind, StrategyKind::Strangle);
    assert_eq!(position.strategy.label, "Short Strangle");
    assert_eq!(position.total_credit, dec("590"));
    assert_eq!(position.legs.len(), 2);
    assert_eq!(position.status, PositionStatus::Open);
}

#[test]
fn test_without_merge_keeps_single_legs() {
    let ledger = vec![
        fill("t1", date(4, 2), TransactionCode::Sto, &call("SPY", "520", date(4, 19)), "1", "310"),
        fill("t2", date(4, 2), TransactionCode::Sto, &put("SPY", "490", date(4, 19)), "1", "280"),
    ];

    let output = build_positions_with(&ledger, &unmerged(), &DefaultClassifier);
    assert_eq!(output.positions.len(), 2);
    assert!(output
        .positions
        .iter()
        .all(|p| p.strategy.kind == StrategyKind::Single));
}

#[test]
fn test_summary_over_mixed_positions() {
    fn position(id: &str, net: &str, open: bool) -> Position {
        let net = dec(net);
        let credit = if net.is_positive() { net } else { Decimal::zero() };
        Position {
            id: id.to_string(),
            symbol: Symbol::new("QQQ".to_string()),
            strategy: rollbook::Strategy::unknown(),
            entry_date: date(1, 2),
            exit_date: if open { None } else { Some(date(1, 9)) },
            status: if open {
                PositionStatus::Open
            } else {
                PositionStatus::Closed
            },
            legs: Vec::new(),
            roll_ids: Vec::new(),
            total_credit: credit,
            total_debit: credit - net,
            net_pl: net,
            realized_pl: if open { None } else { Some(net) },
            max_profitable_debit: None,
            transaction_ids: Vec::new(),
        }
    }

    let positions = vec![
        position("p1", "50", false),
        position("p2", "-20", false),
        position("p3", "30", false),
        position("p4", "10", true),
        position("p5", "-5", true),
    ];

    let stats = calculate_summary(&positions);
    assert_eq!(stats.total_pl, dec("65"));
    assert_eq!(stats.closed_positions, 3);
    assert_eq!(stats.open_positions, 2);
    assert_eq!(stats.wins, 2);
    assert_eq!(stats.losses, 1);
    assert_eq!(stats.total_premium_collected, dec("90"));
    let expected_rate = Decimal::from(2) / Decimal::from(3);
    assert_eq!(stats.win_rate, expected_rate);
}

#[test]
fn test_fifo_consumes_oldest_lot_first() {
    let jun150 = call("AMD", "150", date(6, 21));
    let ledger = vec![
        fill("o1", date(5, 1), TransactionCode::Bto, &jun150, "1", "-300"),
        fill("o2", date(5, 3), TransactionCode::Bto, &jun150, "1", "-400"),
        fill("c1", date(5, 10), TransactionCode::Stc, &jun150, "1", "500"),
    ];

    let output = build_positions(&ledger);

    let closed = position_with(&output.positions, "c1");
    assert!(closed.owns_transaction("o1"));
    assert!(!closed.owns_transaction("o2"));
    assert_eq!(closed.net_pl, dec("200"));

    let open = position_with(&output.positions, "o2");
    assert_eq!(open.status, PositionStatus::Open);
}

#[test]
fn test_fifo_three_lots_close_oldest_first_under_partial_closes() {
    let jun140 = put("AMD", "140", date(6, 21));
    let ledger = vec![
        fill("o1", date(5, 1), TransactionCode::Sto, &jun140, "2", "200"),
        fill("o2", date(5, 2), TransactionCode::Sto, &jun140, "2", "220"),
        fill("o3", date(5, 3), TransactionCode::Sto, &jun140, "2", "240"),
        fill("c1", date(5, 6), TransactionCode::Btc, &jun140, "3", "-90"),
        fill("c2", date(5, 8), TransactionCode::Btc, &jun140, "2", "-40"),
    ];

    let output = build_positions_with(&ledger, &unmerged(), &DefaultClassifier);
    assert_eq!(output.positions.len(), 3);

    let first = position_with(&output.positions, "o1");
    assert!(first.is_closed());
    assert_eq!(first.exit_date, Some(date(5, 6)));
    assert!(first.owns_transaction("c1"));
    assert!(!first.owns_transaction("c2"));
    assert_eq!(first.total_debit, dec("60"));

    let second = position_with(&output.positions, "o2");
    assert!(second.is_closed());
    assert_eq!(second.exit_date, Some(date(5, 8)));
    assert!(second.owns_transaction("c1"));
    assert!(second.owns_transaction("c2"));
    assert_eq!(second.total_debit, dec("50"));

    let third = position_with(&output.positions, "o3");
    assert!(third.is_open());
    assert!(!third.owns_transaction("c1"));
    assert!(third.owns_transaction("c2"));
    assert_eq!(third.total_debit, dec("20"));

    let mut matcher = LotMatcher::new();
    for tx in &ledger {
        matcher.process_fill(tx);
    }
    let key = ledger[0].contract_key().unwrap();
    assert_eq!(matcher.open_quantity(&key), dec("1"));
}

#[test]
fn test_split_close_allocates_cash_pro_rata() {
    let jun140 = put("AMD", "140", date(6, 21));
    let ledger = vec![
        fill("o1", date(5, 1), TransactionCode::Sto, &jun140, "1", "200"),
        fill("o2", date(5, 2), TransactionCode::Sto, &jun140, "2", "420"),
        fill("c1", date(5, 9), TransactionCode::Btc, &jun140, "3", "-90"),
    ];

    let output = build_positions_with(&ledger, &unmerged(), &DefaultClassifier);

    assert_eq!(output.positions.len(), 2);
    let first = position_with(&output.positions, "o1");
    let second = position_with(&output.positions, "o2");
    assert_eq!(first.total_debit, dec("30"));
    assert_eq!(second.total_debit, dec("60"));
    assert!(first.is_closed() && second.is_closed());
    let total: Decimal = output.positions.iter().map(|p| p.net_pl).sum();
    assert_eq!(total, dec("530"));
}

#[test]
fn test_expiration_and_assignment_close_lots() {
    let may800 = put("NVDA", "800", date(5, 17));
    let may950 = call("NVDA", "950", date(5, 31));
    let ledger = vec![
        fill("o1", date(5, 1), TransactionCode::Sto, &may800, "1", "900"),
        fill("x1", date(5, 17), TransactionCode::Oexp, &may800, "1", "0"),
        fill("o2", date(5, 20), TransactionCode::Sto, &may950, "1", "700"),
        fill("a1", date(5, 31), TransactionCode::Oasgn, &may950, "1", "0"),
    ];

    let output = build_positions(&ledger);

    let expired = position_with(&output.positions, "x1");
    assert!(expired.is_closed());
    assert_eq!(expired.net_pl, dec("900"));
    assert!(expired
        .legs
        .iter()
        .any(|leg| leg.transaction_id == "x1" && leg.status == LegStatus::Expired));

    let assigned = position_with(&output.positions, "a1");
    assert!(assigned
        .legs
        .iter()
        .any(|leg| leg.transaction_id == "a1" && leg.status == LegStatus::Assigned));
}

#[test]
fn test_orphan_close_and_stock_rows_are_ignored() {
    let feb200 = call("AAPL", "200", date(2, 16));
    let ledger = vec![
        stock_fill("s1", date(2, 1), TransactionCode::Buy),
        fill("c0", date(2, 2), TransactionCode::Btc, &feb200, "1", "-50"),
        fill("o1", date(2, 5), TransactionCode::Sto, &feb200, "1", "120"),
    ];

    let output = build_positions(&ledger);

    assert_eq!(output.positions.len(), 1);
    let position = &output.positions[0];
    assert!(!position.owns_transaction("c0"));
    assert!(!position.owns_transaction("s1"));
    assert!(position.is_open());
}

#[test]
fn test_inventory_is_conserved() {
    let jun140 = put("AMD", "140", date(6, 21));
    let ledger = vec![
        fill("o1", date(5, 1), TransactionCode::Sto, &jun140, "3", "600"),
        fill("c1", date(5, 9), TransactionCode::Btc, &jun140, "1", "-90"),
        fill("o2", date(5, 10), TransactionCode::Sto, &jun140, "2", "380"),
        fill("c2", date(5, 14), TransactionCode::Btc, &jun140, "3", "-150"),
    ];

    let mut matcher = LotMatcher::new();
    for tx in &ledger {
        matcher.process_fill(tx);
    }
    let key = ledger[0].contract_key().unwrap();
    let inventory = matcher.inventory(&key);
    assert_eq!(inventory.opened, dec("5"));
    assert_eq!(inventory.closed, dec("4"));
    assert_eq!(inventory.remaining, dec("1"));
    assert_eq!(inventory.opened, inventory.closed + inventory.remaining);
}

#[test]
fn test_net_pl_identity_holds_for_every_position() {
    let jun100 = call("MSFT", "100", date(6, 21));
    let jul105 = call("MSFT", "105", date(7, 19));
    let spy500 = put("SPY", "500", date(6, 21));
    let spy510 = put("SPY", "510", date(6, 21));
    let ledger = vec![
        fill("t1", date(6, 1), TransactionCode::Sto, &jun100, "5", "500"),
        fill("t2", date(6, 6), TransactionCode::Btc, &jun100, "5", "-200"),
        fill("t3", date(6, 6), TransactionCode::Sto, &jul105, "5", "450"),
        fill("t4", date(6, 3), TransactionCode::Bto, &spy500, "2", "-640"),
        fill("t5", date(6, 3), TransactionCode::Sto, &spy510, "2", "900"),
    ];

    let output = build_positions(&ledger);
    for position in &output.positions {
        assert_eq!(position.net_pl, position.total_credit - position.total_debit);
        let legs: Decimal = position.legs.iter().map(|leg| leg.amount).sum();
        assert_eq!(legs, position.net_pl);
    }

    let spread = position_with(&output.positions, "t4");
    assert_eq!(spread.strategy.kind, StrategyKind::Vertical);
    assert!(spread.owns_transaction("t5"));
}

#[test]
fn test_merge_is_idempotent_on_pipeline_output() {
    let ledger = vec![
        fill("t1", date(4, 2), TransactionCode::Sto, &call("SPY", "520", date(4, 19)), "1", "310"),
        fill("t2", date(4, 2), TransactionCode::Sto, &put("SPY", "490", date(4, 19)), "1", "280"),
        fill("t3", date(4, 3), TransactionCode::Bto, &call("QQQ", "430", date(4, 19)), "1", "-210"),
    ];

    let once = build_positions(&ledger).positions;
    let twice = rollbook::engine::merge_multi_leg(once.clone(), &DefaultClassifier);
    assert_eq!(once, twice);
}

#[test]
fn test_roll_edges_and_chain_contiguity() {
    let jan200 = put("IWM", "200", date(1, 19));
    let feb195 = put("IWM", "195", date(2, 16));
    let mar190 = put("IWM", "190", date(3, 15));
    let ledger = vec![
        fill("a1", date(1, 2), TransactionCode::Sto, &jan200, "1", "150"),
        fill("a2", date(1, 16), TransactionCode::Btc, &jan200, "1", "-120"),
        fill("a3", date(1, 16), TransactionCode::Sto, &feb195, "1", "210"),
        fill("a4", date(2, 13), TransactionCode::Btc, &feb195, "1", "-180"),
        fill("a5", date(2, 13), TransactionCode::Sto, &mar190, "1", "230"),
        fill("a6", date(3, 8), TransactionCode::Btc, &mar190, "1", "-40"),
    ];

    let output = build_positions(&ledger);
    let by_id: HashMap<&str, &Transaction> =
        ledger.iter().map(|tx| (tx.id.as_str(), tx)).collect();

    assert_eq!(output.rolls.len(), 2);
    for roll in &output.rolls {
        let from = by_id[roll.from_leg_id.as_str()];
        let to = by_id[roll.to_leg_id.as_str()];
        assert!(from.code.is_closing());
        assert!(to.code.is_opening());
        assert_eq!(from.activity_date, to.activity_date);
        assert_eq!(from.underlying(), to.underlying());
    }

    assert_eq!(output.roll_chains.len(), 1);
    let chain = &output.roll_chains[0];
    assert_eq!(chain.roll_count, 2);
    assert_eq!(chain.segments.len(), 3);
    for pair in chain.segments.windows(2) {
        assert_eq!(pair[1].from.as_ref(), Some(&pair[0].to));
    }
    assert_eq!(chain.status, PositionStatus::Closed);
    assert_eq!(chain.last_exit_date, Some(date(3, 8)));
    assert_eq!(chain.net_pl, dec("250"));

    let stats: SummaryStats = calculate_summary(&output.positions);
    assert_eq!(stats.total_pl, dec("250"));
    assert_eq!(stats.wins, 3);
}

#[test]
fn test_pipeline_is_deterministic() {
    let jun100 = call("MSFT", "100", date(6, 21));
    let jul105 = call("MSFT", "105", date(7, 19));
    let ledger = vec![
        fill("t1", date(6, 1), TransactionCode::Sto, &jun100, "5", "500"),
        fill("t2", date(6, 6), TransactionCode::Btc, &jun100, "5", "-200"),
        fill("t3", date(6, 6), TransactionCode::Sto, &jul105, "5", "450"),
    ];

    let first = serde_json::to_string(&build_positions(&ledger)).unwrap();
    let second = serde_json::to_string(&build_positions(&ledger)).unwrap();
    assert_eq!(first, second);
}
