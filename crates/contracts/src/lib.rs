//! Strikeline Contracts Crate
//!
//! Resolves logical option symbols (SPX, NDX, SPY, ...) to contracts a
//! brokerage gateway accepts, and builds at-the-money strike ladders.
//!
//! # Overview
//!
//! The same logical symbol is often listed under several spellings and on
//! several venues: SPX options trade as both `SPX` and `SPXW`, and an equity
//! may qualify on SMART but not on its listing exchange. This crate:
//! - Keeps one [`SymbolProfile`] per symbol with its spellings, venues and
//!   strike rules
//! - Tries (spelling, venue) candidates in a fixed order until the gateway
//!   qualifies one, recording every failure
//! - Rounds a spot price to the at-the-money strike and lays out a ladder
//! - Scans a call and a put at every strike of the ladder
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  ProfileTable    |  (symbol -> spellings, venues, strike rules)
//! +------------------+
//!          |
//!          v
//! +--------------------+     +--------------------+
//! | InstrumentResolver | --> | ContractQualifier  |  (gateway session)
//! +--------------------+     +--------------------+
//!          |
//!          v
//! +--------------------+     +--------------------+
//! | OptionChainScanner | --> |  SpotPriceSource   |
//! +--------------------+     +--------------------+
//!          |
//!          v
//! +--------------------+
//! |  LadderGenerator   |  (ATM rounding, strike ladder)
//! +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`ContractDescriptor`] - Candidate contract submitted for qualification
//! - [`ValidatedContract`] - Contract uniquely matched by the gateway
//! - [`ResolvedContract`] - Validated contract plus the attempt that found it
//! - [`StrikeLadder`] - Ascending strikes around the ATM strike
//! - [`ChainScan`] - Underlying, spot, ladder and qualified option legs

pub mod errors;
pub mod gateway;
pub mod ladder;
pub mod models;
pub mod profile;
pub mod resolver;
pub mod scanner;

// Re-export all public types from models
pub use models::{
    ContractDescriptor, ContractKind, Currency, Leg, OptionParams, OptionRight,
    ResolvedContract, StrikeLadder, SymbolKind, ValidatedContract, Venue, CONTRACT_CURRENCY,
    DEFAULT_VENUE,
};

// Re-export error types
pub use errors::{CatalogError, QualifyError, ResolutionError, ScanError, ValidationError};

// Re-export gateway types
pub use gateway::{
    CatalogQualifier, ContractQualifier, FixedSpotPrice, SerialQualifier, SpotPriceSource,
};

// Re-export profile, resolver and scanner types
pub use ladder::{
    round_to_increment, spot_from_f64, LadderGenerator, DEFAULT_HALF_WIDTH, MAX_HALF_WIDTH,
};
pub use profile::{normalize_symbol, ProfileLookup, ProfileSource, ProfileTable, SymbolProfile};
pub use resolver::{
    candidate_plan, Candidate, CandidateAttempt, InstrumentResolver, ResolutionDiagnostics,
    ResolverConfig, DEFAULT_ATTEMPT_TIMEOUT,
};
pub use scanner::{
    ChainScan, OptionChainScanner, ScanConfig, SpotFallback, SpotOrigin, SpotQuote,
    UnresolvedLeg,
};
