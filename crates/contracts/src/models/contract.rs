use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Currency, Venue, CONTRACT_CURRENCY};

/// Classification of a logical symbol's underlying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolKind {
    /// Cash-settled index (SPX, NDX, RUT, VIX)
    Index,
    /// Exchange-traded shares or ETFs
    #[default]
    Equity,
}

/// Which leg of a symbol is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Underlying,
    Option,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underlying => write!(f, "underlying"),
            Self::Option => write!(f, "option"),
        }
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionRight {
    #[serde(rename = "C")]
    Call,
    #[serde(rename = "P")]
    Put,
}

impl OptionRight {
    /// Single-letter code used by the gateway.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Call => "C",
            Self::Put => "P",
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Contract-specific parameters for an option attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionParams {
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub right: OptionRight,
    /// Explicit trading class; when absent the resolver may derive one from
    /// the variant being tried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_class: Option<String>,
}

impl OptionParams {
    pub fn new(expiry: NaiveDate, strike: Decimal, right: OptionRight) -> Self {
        Self {
            expiry,
            strike,
            right,
            trading_class: None,
        }
    }

    pub fn with_trading_class(mut self, trading_class: impl Into<String>) -> Self {
        self.trading_class = Some(trading_class.into());
        self
    }
}

/// Security type of a descriptor submitted for qualification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "sec_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractKind {
    Index,
    Stock,
    Option {
        expiry: NaiveDate,
        strike: Decimal,
        right: OptionRight,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trading_class: Option<String>,
    },
}

impl ContractKind {
    /// Short security-type code ("IND", "STK", "OPT").
    pub fn sec_type(&self) -> &'static str {
        match self {
            Self::Index => "IND",
            Self::Stock => "STK",
            Self::Option { .. } => "OPT",
        }
    }
}

/// Candidate contract submitted to the gateway for qualification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub symbol: String,
    pub venue: Venue,
    pub currency: Currency,
    pub kind: ContractKind,
}

impl ContractDescriptor {
    /// Build the underlying descriptor for a symbol of the given kind.
    ///
    /// Index symbols always get an index contract, whatever spelling is being
    /// tried; equities get a stock contract.
    pub fn underlying(kind: SymbolKind, symbol: &str, venue: &str) -> Self {
        let kind = match kind {
            SymbolKind::Index => ContractKind::Index,
            SymbolKind::Equity => ContractKind::Stock,
        };
        Self::new(symbol, venue, kind)
    }

    /// Build an option descriptor for the given spelling and venue.
    pub fn option(symbol: &str, venue: &str, params: &OptionParams) -> Self {
        Self::new(
            symbol,
            venue,
            ContractKind::Option {
                expiry: params.expiry,
                strike: params.strike,
                right: params.right,
                trading_class: params.trading_class.clone(),
            },
        )
    }

    fn new(symbol: &str, venue: &str, kind: ContractKind) -> Self {
        Self {
            symbol: symbol.to_string(),
            venue: Venue::Owned(venue.to_string()),
            currency: Currency::Borrowed(CONTRACT_CURRENCY),
            kind,
        }
    }
}

impl fmt::Display for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ContractKind::Option {
                expiry,
                strike,
                right,
                ..
            } => write!(
                f,
                "{} {} {}{} @ {} ({})",
                self.kind.sec_type(),
                self.symbol,
                strike,
                right,
                self.venue,
                expiry.format("%Y%m%d")
            ),
            _ => write!(
                f,
                "{} {} @ {} ({})",
                self.kind.sec_type(),
                self.symbol,
                self.venue,
                self.currency
            ),
        }
    }
}

/// Contract as validated and uniquely matched by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedContract {
    /// Gateway contract identifier
    pub con_id: i64,
    pub symbol: String,
    pub exchange: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_exchange: Option<String>,
    pub currency: String,
    pub kind: ContractKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_class: Option<String>,
}

impl ValidatedContract {
    /// Strike of an option contract.
    pub fn strike(&self) -> Option<Decimal> {
        match &self.kind {
            ContractKind::Option { strike, .. } => Some(*strike),
            _ => None,
        }
    }

    /// Right of an option contract.
    pub fn right(&self) -> Option<OptionRight> {
        match &self.kind {
            ContractKind::Option { right, .. } => Some(*right),
            _ => None,
        }
    }
}

/// Resolver output: the validated contract tagged with the attempt that found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContract {
    pub contract: ValidatedContract,
    /// Spelling that qualified
    pub variant: String,
    /// Venue that qualified
    pub venue: String,
    /// 1-based position of the successful attempt in the candidate order
    pub attempt: usize,
}
