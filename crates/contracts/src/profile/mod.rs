//! Symbol profile table.
//!
//! Each logical symbol the system trades has one [`SymbolProfile`]: its
//! spellings, classification, venue preferences for the underlying and its
//! options, and the strike rounding rules. The built-in catalog lives in
//! `profiles.json`; operators can replace it with their own file.

mod catalog;
mod table;

pub use catalog::SymbolProfile;
pub use table::{normalize_symbol, ProfileLookup, ProfileSource, ProfileTable};
