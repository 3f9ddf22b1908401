use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::errors::CatalogError;
use crate::models::DEFAULT_VENUE;

use super::catalog::{parse_catalog, SymbolProfile, BUILTIN_PROFILES};

/// Where a looked-up profile came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProfileSource {
    /// Explicit catalog entry
    Configured,
    /// No entry; the default profile was synthesised
    Defaulted,
}

/// Profile lookup result with its provenance.
#[derive(Clone, Debug)]
pub struct ProfileLookup<'a> {
    pub profile: Cow<'a, SymbolProfile>,
    pub source: ProfileSource,
}

/// Immutable symbol → profile table.
///
/// Built once at startup and shared read-only between resolution requests.
#[derive(Clone, Debug)]
pub struct ProfileTable {
    profiles: HashMap<String, SymbolProfile>,
    default_venue: String,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    /// Table backed by the embedded catalog.
    pub fn builtin() -> Self {
        Self::from_profiles(BUILTIN_PROFILES.iter().cloned())
            .expect("embedded profiles have unique names")
    }

    /// Parse and validate a catalog in the `profiles.json` format.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_profiles(parse_catalog(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build a table from already-constructed profiles.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = SymbolProfile>,
    ) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for profile in profiles {
            profile.validate()?;
            let key = normalize_symbol(&profile.name);
            if map.contains_key(&key) {
                return Err(CatalogError::Duplicate(key));
            }
            map.insert(key, profile);
        }
        Ok(Self {
            profiles: map,
            default_venue: DEFAULT_VENUE.to_string(),
        })
    }

    /// Venue used by the default profile of unconfigured symbols.
    ///
    /// The venue is trimmed; a blank venue is rejected.
    pub fn with_default_venue(mut self, venue: &str) -> Result<Self, CatalogError> {
        let venue = venue.trim();
        if venue.is_empty() {
            return Err(CatalogError::BlankDefaultVenue);
        }
        self.default_venue = venue.to_string();
        Ok(self)
    }

    pub fn default_venue(&self) -> &str {
        &self.default_venue
    }

    /// Profile for a symbol; unconfigured symbols get the default profile.
    ///
    /// The default profile is named after the trimmed, upper-cased symbol and
    /// uses that spelling as its only variant, so `profile_for(" zzz ")`
    /// tries `ZZZ` on the default venue.
    pub fn profile_for(&self, symbol: &str) -> Cow<'_, SymbolProfile> {
        self.lookup(symbol).profile
    }

    /// Like [`profile_for`](Self::profile_for) but reports whether the
    /// profile was configured or defaulted.
    pub fn lookup(&self, symbol: &str) -> ProfileLookup<'_> {
        let key = normalize_symbol(symbol);
        match self.profiles.get(&key) {
            Some(profile) => ProfileLookup {
                profile: Cow::Borrowed(profile),
                source: ProfileSource::Configured,
            },
            None => ProfileLookup {
                profile: Cow::Owned(SymbolProfile::fallback(&key, &self.default_venue)),
                source: ProfileSource::Defaulted,
            },
        }
    }

    /// Configured symbols, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.profiles.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Configured profiles, sorted by name.
    pub fn profiles(&self) -> Vec<&SymbolProfile> {
        let mut profiles: Vec<&SymbolProfile> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }
}

/// Catalog keys are matched trimmed and upper-cased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
