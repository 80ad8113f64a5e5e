//! Domain types and determinism layer for the option ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Symbol, TransactionCode, OptionType, Direction
//! - Transaction, Position, Roll and RollChain types with camelCase JSON
//! - Stable transaction ordering helper for deterministic processing

pub mod decimal;
pub mod ordering;
pub mod position;
pub mod primitives;
pub mod roll;
pub mod strategy;
pub mod summary;
pub mod transaction;

pub use decimal::Decimal;
pub use ordering::{sorted_option_fills, TransactionOrderingKey};
pub use position::{credit_debit, LegStatus, OptionLeg, Position, PositionStatus};
pub use primitives::{Direction, OptionType, Symbol, TransactionCode};
pub use roll::{ChainSegment, ContractTerms, Roll, RollChain};
pub use strategy::{Strategy, StrategyKind};
pub use summary::SummaryStats;
pub use transaction::{ContractKey, OptionDescriptor, Transaction};
