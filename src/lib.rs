pub mod api;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;

pub use classifier::{DefaultClassifier, StrategyClassifier};
pub use config::Config;
pub use domain::{
    ChainSegment, ContractTerms, Decimal, LegStatus, OptionLeg, OptionType, Position,
    PositionStatus, Roll, RollChain, Strategy, StrategyKind, SummaryStats, Symbol, Transaction,
    TransactionCode,
};
pub use engine::{
    build_positions, build_positions_with, calculate_summary, BuildOutput, PipelineOptions,
};
pub use error::AppError;
