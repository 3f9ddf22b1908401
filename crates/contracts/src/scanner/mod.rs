//! At-the-money option chain scan.
//!
//! Ties the resolver, the spot source and the ladder generator together:
//! resolve the underlying, price it, lay out a strike ladder and qualify a
//! call and a put at every positive strike.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::errors::{ResolutionError, ScanError};
use crate::gateway::SpotPriceSource;
use crate::ladder::{LadderGenerator, DEFAULT_HALF_WIDTH};
use crate::models::{OptionParams, OptionRight, ResolvedContract, StrikeLadder};
use crate::profile::normalize_symbol;
use crate::resolver::InstrumentResolver;

/// What to do when the spot source has no usable price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "price")]
pub enum SpotFallback {
    /// Abort the scan with [`ScanError::SpotUnavailable`]
    #[default]
    Fail,
    /// Continue with an operator-configured nominal price
    Nominal(Decimal),
}

/// Where the spot price used for a scan came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotOrigin {
    Live,
    Nominal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotQuote {
    pub price: Decimal,
    pub origin: SpotOrigin,
}

/// Scan configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Strikes on each side of the at-the-money strike
    pub half_width: u32,
    pub spot_fallback: SpotFallback,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            half_width: DEFAULT_HALF_WIDTH,
            spot_fallback: SpotFallback::Fail,
        }
    }
}

/// Option leg that no candidate qualified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedLeg {
    pub strike: Decimal,
    pub right: OptionRight,
    /// Number of candidates tried before giving up
    pub attempts: usize,
}

/// Result of scanning one symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainScan {
    pub symbol: String,
    pub expiry: NaiveDate,
    pub underlying: ResolvedContract,
    pub spot: SpotQuote,
    pub ladder: StrikeLadder,
    /// Qualified legs, ascending by strike, call before put
    pub options: Vec<ResolvedContract>,
    pub unresolved: Vec<UnresolvedLeg>,
}

impl ChainScan {
    /// Qualified leg at a strike, if any.
    pub fn option_at(&self, strike: Decimal, right: OptionRight) -> Option<&ResolvedContract> {
        if !self.ladder.contains(strike) {
            return None;
        }
        self.options
            .iter()
            .find(|o| o.contract.strike() == Some(strike) && o.contract.right() == Some(right))
    }
}

/// Scans the option chain around the at-the-money strike.
pub struct OptionChainScanner {
    resolver: Arc<InstrumentResolver>,
    ladders: LadderGenerator,
    spot_source: Arc<dyn SpotPriceSource>,
    config: ScanConfig,
}

impl OptionChainScanner {
    pub fn new(
        resolver: Arc<InstrumentResolver>,
        spot_source: Arc<dyn SpotPriceSource>,
        config: ScanConfig,
    ) -> Self {
        let ladders = LadderGenerator::new(resolver.profiles().clone());
        Self {
            resolver,
            ladders,
            spot_source,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan one symbol for the given expiry.
    ///
    /// Option legs that fail to qualify are recorded in
    /// [`ChainScan::unresolved`]; the scan only fails when the underlying
    /// cannot be resolved or priced, or when not a single leg qualifies.
    pub async fn scan(
        &self,
        symbol: &str,
        expiry: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<ChainScan, ScanError> {
        let symbol = normalize_symbol(symbol);
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled(symbol));
        }

        let underlying = self
            .resolver
            .resolve_underlying_with_cancel(&symbol, cancel)
            .await
            .map_err(|e| cancelled_or(e, &symbol))?;

        let spot = self.spot_for(&symbol, &underlying).await?;
        let ladder = self
            .ladders
            .generate(&symbol, spot.price, self.config.half_width)?;

        let mut options = Vec::new();
        let mut unresolved = Vec::new();
        let mut tried = 0;

        for strike in ladder.iter().copied().filter(|s| *s > Decimal::ZERO) {
            tried += 1;
            for right in [OptionRight::Call, OptionRight::Put] {
                if cancel.is_cancelled() {
                    return Err(ScanError::Cancelled(symbol));
                }

                let mut params = OptionParams::new(expiry, strike, right);
                if let Some(class) = &underlying.contract.trading_class {
                    params = params.with_trading_class(class.clone());
                }

                match self
                    .resolver
                    .resolve_option_with_cancel(&symbol, &params, cancel)
                    .await
                {
                    Ok(resolved) => options.push(resolved),
                    Err(e) if e.is_cancelled() => return Err(ScanError::Cancelled(symbol)),
                    Err(e) => {
                        debug!("No {} {}{} leg: {}", symbol, strike, right, e);
                        unresolved.push(UnresolvedLeg {
                            strike,
                            right,
                            attempts: e.attempted_candidates().len(),
                        });
                    }
                }
            }
        }

        if options.is_empty() {
            return Err(ScanError::NoOptionsQualified {
                symbol,
                strikes: tried,
            });
        }

        info!(
            "Scanned {} {}: spot {} ATM {}, {} legs qualified, {} unresolved",
            symbol,
            expiry.format("%Y%m%d"),
            spot.price,
            ladder.atm().unwrap_or(spot.price),
            options.len(),
            unresolved.len()
        );

        Ok(ChainScan {
            symbol,
            expiry,
            underlying,
            spot,
            ladder,
            options,
            unresolved,
        })
    }

    /// Scan several symbols in turn.
    ///
    /// Failed symbols are logged and skipped. Stops early on cancellation.
    pub async fn scan_many<S: AsRef<str>>(
        &self,
        symbols: &[S],
        expiry: NaiveDate,
        cancel: &CancellationToken,
    ) -> Vec<ChainScan> {
        let mut scans = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.scan(symbol.as_ref(), expiry, cancel).await {
                Ok(scan) => scans.push(scan),
                Err(ScanError::Cancelled(symbol)) => {
                    info!("Chain scan cancelled at {}", symbol);
                    break;
                }
                Err(e) => warn!("Skipping {}: {}", symbol.as_ref(), e),
            }
        }
        scans
    }

    async fn spot_for(
        &self,
        symbol: &str,
        underlying: &ResolvedContract,
    ) -> Result<SpotQuote, ScanError> {
        let reason = match self.spot_source.spot_price(&underlying.contract).await {
            Ok(Some(price)) if price > Decimal::ZERO => {
                return Ok(SpotQuote {
                    price,
                    origin: SpotOrigin::Live,
                })
            }
            Ok(Some(price)) => format!("non-positive price {}", price),
            Ok(None) => "no price available".to_string(),
            Err(message) => message,
        };

        match self.config.spot_fallback {
            SpotFallback::Fail => Err(ScanError::SpotUnavailable {
                symbol: symbol.to_string(),
                reason,
            }),
            SpotFallback::Nominal(price) => {
                warn!(
                    "Using nominal spot {} for {} ({})",
                    price, symbol, reason
                );
                Ok(SpotQuote {
                    price,
                    origin: SpotOrigin::Nominal,
                })
            }
        }
    }
}

fn cancelled_or(error: ResolutionError, symbol: &str) -> ScanError {
    if error.is_cancelled() {
        ScanError::Cancelled(symbol.to_string())
    } else {
        ScanError::Resolution(error)
    }
}
