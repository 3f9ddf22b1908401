//! Offline gateway backed by a fixed list of contracts.
//!
//! Mirrors the gateway's matching rules closely enough to rehearse a
//! resolution plan without a live session: SMART matches any listing, an
//! option descriptor without a trading class matches every class of the
//! symbol, and more than one match is reported as ambiguous.

use std::path::Path;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;

use crate::errors::{CatalogError, QualifyError};
use crate::models::{ContractDescriptor, ContractKind, ValidatedContract, DEFAULT_VENUE};

use super::traits::{ContractQualifier, SpotPriceSource};

/// In-memory [`ContractQualifier`].
#[derive(Clone, Debug, Default)]
pub struct CatalogQualifier {
    contracts: Vec<ValidatedContract>,
}

impl CatalogQualifier {
    pub fn new(contracts: Vec<ValidatedContract>) -> Self {
        Self { contracts }
    }

    /// Parse a JSON array of validated contracts.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    fn matches(descriptor: &ContractDescriptor, contract: &ValidatedContract) -> bool {
        if contract.currency != descriptor.currency.as_ref() {
            return false;
        }
        if descriptor.venue != DEFAULT_VENUE
            && contract.exchange != descriptor.venue.as_ref()
            && contract.primary_exchange.as_deref() != Some(descriptor.venue.as_ref())
        {
            return false;
        }

        match (&descriptor.kind, &contract.kind) {
            (ContractKind::Index, ContractKind::Index) | (ContractKind::Stock, ContractKind::Stock) => {
                contract.symbol == descriptor.symbol
            }
            (
                ContractKind::Option {
                    expiry,
                    strike,
                    right,
                    trading_class,
                },
                ContractKind::Option {
                    expiry: listed_expiry,
                    strike: listed_strike,
                    right: listed_right,
                    ..
                },
            ) => {
                let symbol_matches = contract.symbol == descriptor.symbol
                    || contract.trading_class.as_deref() == Some(descriptor.symbol.as_str());
                let class_matches = match trading_class {
                    Some(class) => contract.trading_class.as_deref() == Some(class.as_str()),
                    None => true,
                };
                symbol_matches
                    && class_matches
                    && expiry == listed_expiry
                    && strike == listed_strike
                    && right == listed_right
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ContractQualifier for CatalogQualifier {
    fn id(&self) -> &str {
        "CATALOG"
    }

    async fn qualify(
        &self,
        descriptor: &ContractDescriptor,
    ) -> Result<ValidatedContract, QualifyError> {
        let matched: Vec<&ValidatedContract> = self
            .contracts
            .iter()
            .filter(|c| Self::matches(descriptor, c))
            .collect();

        debug!("Catalog matched {} contracts for {}", matched.len(), descriptor);

        match matched.as_slice() {
            [] => Err(QualifyError::NotFound),
            [contract] => {
                let mut qualified = (*contract).clone();
                qualified.exchange = descriptor.venue.to_string();
                Ok(qualified)
            }
            many => Err(QualifyError::Ambiguous {
                matches: many.len(),
            }),
        }
    }
}

/// Spot source that always reports the same price.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedSpotPrice(pub Option<Decimal>);

#[async_trait]
impl SpotPriceSource for FixedSpotPrice {
    async fn spot_price(&self, _contract: &ValidatedContract) -> Result<Option<Decimal>, String> {
        Ok(self.0)
    }
}
