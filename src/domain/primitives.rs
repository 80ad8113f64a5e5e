//! Domain primitives: Symbol, TransactionCode, OptionType.

use serde::{Deserialize, Serialize};

/// Underlying ticker symbol (e.g., "AAPL", "SPY").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a Symbol from a string.
    pub fn new(symbol: String) -> Self {
        Symbol(symbol)
    }

    /// Get the symbol as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Brokerage transaction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionCode {
    /// Stock buy.
    Buy,
    /// Stock sell.
    Sell,
    /// Sell to open.
    #[serde(rename = "STO")]
    Sto,
    /// Buy to open.
    #[serde(rename = "BTO")]
    Bto,
    /// Sell to close.
    #[serde(rename = "STC")]
    Stc,
    /// Buy to close.
    #[serde(rename = "BTC")]
    Btc,
    /// Option expiration.
    #[serde(rename = "OEXP")]
    Oexp,
    /// Option assignment.
    #[serde(rename = "OASGN")]
    Oasgn,
}

impl TransactionCode {
    /// True for codes that open an option lot (BTO/STO).
    pub fn is_opening(&self) -> bool {
        matches!(self, TransactionCode::Bto | TransactionCode::Sto)
    }

    /// True for explicit closing trades (BTC/STC).
    pub fn is_closing(&self) -> bool {
        matches!(self, TransactionCode::Btc | TransactionCode::Stc)
    }

    /// True for any fill that consumes open lots (STC/BTC/OEXP/OASGN).
    pub fn is_terminal(&self) -> bool {
        self.is_closing() || matches!(self, TransactionCode::Oexp | TransactionCode::Oasgn)
    }

    /// True for codes handled by the option pipeline.
    pub fn is_option(&self) -> bool {
        self.is_opening() || self.is_terminal()
    }

    /// The opening code that re-establishes the same side of the market after this close.
    ///
    /// BTC closes a short and pairs with STO; STC closes a long and pairs with BTO.
    pub fn reopening_code(&self) -> Option<TransactionCode> {
        match self {
            TransactionCode::Btc => Some(TransactionCode::Sto),
            TransactionCode::Stc => Some(TransactionCode::Bto),
            _ => None,
        }
    }

    /// Direction of exposure this code opens (or, for BTC/STC, the side it closes).
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TransactionCode::Bto | TransactionCode::Stc => Some(Direction::Long),
            TransactionCode::Sto | TransactionCode::Btc => Some(Direction::Short),
            _ => None,
        }
    }

    /// Ledger spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCode::Buy => "Buy",
            TransactionCode::Sell => "Sell",
            TransactionCode::Sto => "STO",
            TransactionCode::Bto => "BTO",
            TransactionCode::Stc => "STC",
            TransactionCode::Btc => "BTC",
            TransactionCode::Oexp => "OEXP",
            TransactionCode::Oasgn => "OASGN",
        }
    }
}

impl std::fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Long or short exposure on a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}
