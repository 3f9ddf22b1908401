//! JSON-driven symbol profile catalog.
//!
//! Loads `profiles.json` at compile time via `include_str!` and parses it
//! once via `lazy_static`. Operator-supplied catalogs use the same schema.

use std::collections::HashSet;

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;
use crate::models::SymbolKind;

// ── JSON schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ProfileCatalog {
    pub profiles: Vec<SymbolProfile>,
}

/// Resolution and strike parameters for one logical symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolProfile {
    /// Canonical symbol (unique key)
    pub name: String,
    /// Selects the contract constructor for the underlying
    pub kind: SymbolKind,
    /// Spellings to try for the underlying, most preferred first
    pub underlying_variants: Vec<String>,
    /// Venues to try for the underlying, most preferred first
    pub underlying_venues: Vec<String>,
    /// Spellings to try for option contracts
    pub option_variants: Vec<String>,
    /// Venues to try for option contracts
    pub option_venues: Vec<String>,
    /// Option variants that double as the exchange trading class (e.g. SPXW)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trading_class_variants: Vec<String>,
    pub strike_rounding_increment: Decimal,
    pub strike_ladder_step: Decimal,
}

impl SymbolProfile {
    /// Profile applied to symbols with no catalog entry.
    pub fn fallback(symbol: &str, venue: &str) -> Self {
        Self {
            name: symbol.to_string(),
            kind: SymbolKind::Equity,
            underlying_variants: vec![symbol.to_string()],
            underlying_venues: vec![venue.to_string()],
            option_variants: vec![symbol.to_string()],
            option_venues: vec![venue.to_string()],
            trading_class_variants: Vec::new(),
            strike_rounding_increment: Decimal::ONE,
            strike_ladder_step: Decimal::ONE,
        }
    }

    /// Whether probing `variant` for an option implies that trading class.
    pub fn is_trading_class_variant(&self, variant: &str) -> bool {
        self.trading_class_variants.iter().any(|v| v == variant)
    }

    fn invalid(&self, message: impl Into<String>) -> CatalogError {
        CatalogError::Invalid {
            symbol: self.name.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name is empty"));
        }
        let lists = [
            ("underlying_variants", &self.underlying_variants),
            ("underlying_venues", &self.underlying_venues),
            ("option_variants", &self.option_variants),
            ("option_venues", &self.option_venues),
        ];
        for (field, values) in lists {
            if values.is_empty() {
                return Err(self.invalid(format!("{} must not be empty", field)));
            }
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(self.invalid(format!("{} contains a blank entry", field)));
            }
            let unique: HashSet<&String> = values.iter().collect();
            if unique.len() != values.len() {
                return Err(self.invalid(format!("{} contains duplicates", field)));
            }
        }
        if self.strike_rounding_increment <= Decimal::ZERO {
            return Err(self.invalid("strike_rounding_increment must be positive"));
        }
        if self.strike_ladder_step <= Decimal::ZERO {
            return Err(self.invalid("strike_ladder_step must be positive"));
        }
        if let Some(class) = self
            .trading_class_variants
            .iter()
            .find(|c| !self.option_variants.contains(*c))
        {
            return Err(self.invalid(format!(
                "trading class variant '{}' is not an option variant",
                class
            )));
        }
        Ok(())
    }
}

pub(crate) fn parse_catalog(json: &str) -> Result<Vec<SymbolProfile>, CatalogError> {
    let catalog: ProfileCatalog = serde_json::from_str(json)?;
    for profile in &catalog.profiles {
        profile.validate()?;
    }
    Ok(catalog.profiles)
}

lazy_static! {
    pub(crate) static ref BUILTIN_PROFILES: Vec<SymbolProfile> =
        parse_catalog(include_str!("profiles.json")).expect("profiles.json must be valid");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile() -> SymbolProfile {
        SymbolProfile {
            name: "SPX".to_string(),
            kind: SymbolKind::Index,
            underlying_variants: vec!["SPX".to_string(), "SPXW".to_string()],
            underlying_venues: vec!["CBOE".to_string()],
            option_variants: vec!["SPXW".to_string()],
            option_venues: vec!["SMART".to_string()],
            trading_class_variants: vec!["SPXW".to_string()],
            strike_rounding_increment: dec!(5),
            strike_ladder_step: dec!(5),
        }
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        assert_eq!(BUILTIN_PROFILES.len(), 7);
        for profile in BUILTIN_PROFILES.iter() {
            assert!(profile.validate().is_ok(), "{} is invalid", profile.name);
        }
    }

    #[test]
    fn test_rejects_empty_venues() {
        let mut p = profile();
        p.option_venues.clear();
        match p.validate() {
            Err(CatalogError::Invalid { symbol, message }) => {
                assert_eq!(symbol, "SPX");
                assert!(message.contains("option_venues"));
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_positive_increment() {
        let mut p = profile();
        p.strike_rounding_increment = Decimal::ZERO;
        assert!(p.validate().is_err());

        let mut p = profile();
        p.strike_ladder_step = dec!(-1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_trading_class_variant() {
        let mut p = profile();
        p.trading_class_variants = vec!["XSP".to_string()];
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_venues() {
        let mut p = profile();
        p.underlying_venues = vec!["CBOE".to_string(), "CBOE".to_string()];
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_fallback_profile() {
        let p = SymbolProfile::fallback("ZZZ", "SMART");
        assert_eq!(p.kind, SymbolKind::Equity);
        assert_eq!(p.underlying_variants, vec!["ZZZ"]);
        assert_eq!(p.underlying_venues, vec!["SMART"]);
        assert_eq!(p.strike_rounding_increment, Decimal::ONE);
        assert_eq!(p.strike_ladder_step, Decimal::ONE);
        assert!(p.validate().is_ok());
    }
}
