use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ascending strikes around an at-the-money strike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeLadder {
    pub symbol: String,
    pub strikes: Vec<Decimal>,
    /// Index of the at-the-money strike within `strikes`
    pub atm_index: usize,
}

impl StrikeLadder {
    /// The at-the-money strike; `None` if `atm_index` is out of range.
    pub fn atm(&self) -> Option<Decimal> {
        self.strikes.get(self.atm_index).copied()
    }

    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    pub fn lowest(&self) -> Option<Decimal> {
        self.strikes.first().copied()
    }

    pub fn highest(&self) -> Option<Decimal> {
        self.strikes.last().copied()
    }

    pub fn contains(&self, strike: Decimal) -> bool {
        self.strikes.binary_search(&strike).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decimal> {
        self.strikes.iter()
    }
}
