//! Contract and ladder models
//!
//! This module contains the core data types shared by the resolver, the
//! ladder generator and the chain scanner:
//! - `types` - Type aliases and fixed identifiers (Venue, Currency)
//! - `contract` - Descriptors submitted to the gateway and the validated
//!   contracts it returns
//! - `ladder` - Strike ladder produced around an at-the-money strike

mod contract;
mod ladder;
mod types;

pub use contract::{
    ContractDescriptor, ContractKind, Leg, OptionParams, OptionRight, ResolvedContract,
    SymbolKind, ValidatedContract,
};
pub use ladder::StrikeLadder;
pub use types::{Currency, Venue, CONTRACT_CURRENCY, DEFAULT_VENUE};
