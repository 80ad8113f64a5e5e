//! Ledger transaction as supplied by the ingestion collaborator.

use crate::domain::{Decimal, OptionType, Symbol, TransactionCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option contract details carried by option rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub symbol: Symbol,
    pub expiration: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub option_type: OptionType,
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Stable unique identifier assigned by ingestion.
    pub id: String,
    pub activity_date: NaiveDate,
    /// Free-form instrument text as printed on the statement.
    #[serde(default)]
    pub instrument: String,
    #[serde(rename = "transCode")]
    pub code: TransactionCode,
    pub quantity: Decimal,
    pub price: Decimal,
    /// Signed cash amount: positive = cash received, negative = cash paid.
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<OptionDescriptor>,
}

/// Identity of a single option contract: (symbol, expiration, strike, type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractKey {
    pub symbol: Symbol,
    pub expiration: NaiveDate,
    pub strike: Decimal,
    pub option_type: OptionType,
}

impl Transaction {
    /// The contract this row trades, if its option descriptor is complete.
    pub fn contract_key(&self) -> Option<ContractKey> {
        let option = self.option.as_ref()?;
        Some(ContractKey {
            symbol: option.symbol.clone(),
            expiration: option.expiration?,
            strike: option.strike?,
            option_type: option.option_type,
        })
    }

    /// True if this row belongs in the option pipeline.
    ///
    /// Requires an option code, a complete contract descriptor and a positive quantity.
    pub fn is_option_fill(&self) -> bool {
        self.code.is_option() && self.quantity.is_positive() && self.contract_key().is_some()
    }

    /// Underlying symbol: the option descriptor's symbol, else the instrument text.
    pub fn underlying(&self) -> &str {
        match &self.option {
            Some(option) => option.symbol.as_str(),
            None => self.instrument.as_str(),
        }
    }
}
