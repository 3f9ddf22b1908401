//! Gateway capability traits.
//!
//! The resolver never talks to the brokerage gateway directly. A session
//! client implements [`ContractQualifier`] (and, for chain scans,
//! [`SpotPriceSource`]); connection lifecycle, authentication and reconnects
//! stay with that client.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::QualifyError;
use crate::models::{ContractDescriptor, ValidatedContract};

/// Contract qualification capability of a gateway session.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use strikeline_contracts::gateway::ContractQualifier;
///
/// struct TwsSession { /* connected client */ }
///
/// #[async_trait]
/// impl ContractQualifier for TwsSession {
///     fn id(&self) -> &str {
///         "TWS"
///     }
///
///     async fn qualify(
///         &self,
///         descriptor: &ContractDescriptor,
///     ) -> Result<ValidatedContract, QualifyError> {
///         // send reqContractDetails, map 0 rows to NotFound, >1 to Ambiguous
///     }
/// }
/// ```
#[async_trait]
pub trait ContractQualifier: Send + Sync {
    /// Identifier of the session, used in logs.
    fn id(&self) -> &str;

    /// Validate that the descriptor identifies exactly one contract.
    ///
    /// Implementations should not retry internally; the resolver applies its
    /// own per-attempt timeout and moves on to the next candidate.
    async fn qualify(
        &self,
        descriptor: &ContractDescriptor,
    ) -> Result<ValidatedContract, QualifyError>;

    /// Qualify with `timeout` bounding the gateway request.
    ///
    /// Wrappers that queue requests override this so that time spent waiting
    /// for the session is not charged to the attempt.
    async fn qualify_within(
        &self,
        descriptor: &ContractDescriptor,
        timeout: Duration,
    ) -> Result<ValidatedContract, QualifyError> {
        match tokio::time::timeout(timeout, self.qualify(descriptor)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(QualifyError::Timeout(timeout)),
        }
    }
}

/// Latest-price capability used by the chain scanner.
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    /// Latest usable price for a validated underlying.
    ///
    /// Returns `Ok(None)` when the feed has no price (market closed, no
    /// subscription); `Err` carries a feed failure message.
    async fn spot_price(&self, contract: &ValidatedContract) -> Result<Option<Decimal>, String>;
}
