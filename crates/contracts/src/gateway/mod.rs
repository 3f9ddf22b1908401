//! Gateway-facing abstractions.
//!
//! This module contains:
//! - The [`ContractQualifier`] and [`SpotPriceSource`] capability traits a
//!   gateway session client implements
//! - [`SerialQualifier`], which keeps one qualification in flight per session
//! - [`CatalogQualifier`] and [`FixedSpotPrice`], an offline gateway used for
//!   dry runs and tests

mod catalog;
mod serial;
mod traits;

pub use catalog::{CatalogQualifier, FixedSpotPrice};
pub use serial::SerialQualifier;
pub use traits::{ContractQualifier, SpotPriceSource};
