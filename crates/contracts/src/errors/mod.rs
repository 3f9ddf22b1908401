//! Error types for contract resolution, strike ladders and chain scans.
//!
//! This module provides:
//! - [`QualifyError`]: A single gateway qualification failure (recovered by the resolver)
//! - [`ResolutionError`]: Terminal failure after the candidate list is exhausted or cancelled
//! - [`ValidationError`]: Invalid input to the strike ladder generator
//! - [`CatalogError`]: Invalid profile or contract catalog at startup
//! - [`ScanError`]: Failures of the at-the-money chain scan

use std::time::Duration;

use thiserror::Error;

use crate::models::Leg;
use crate::resolver::{summarize_attempts, CandidateAttempt};

/// Outcome of a failed qualification request.
///
/// Every variant simply eliminates the candidate being tried; the variant is
/// kept for diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualifyError {
    /// The gateway knows no contract matching the descriptor.
    #[error("no matching contract")]
    NotFound,

    /// The descriptor matched more than one contract.
    #[error("ambiguous match ({matches} contracts)")]
    Ambiguous {
        /// Number of contracts the descriptor matched
        matches: usize,
    },

    /// The request did not complete within the per-attempt timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The gateway rejected or failed the request.
    #[error("gateway error: {message}")]
    Gateway {
        /// The error message reported by the gateway client
        message: String,
    },
}

/// Terminal resolution failure surfaced to the caller.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    /// Every candidate was tried and none qualified.
    #[error("Failed to qualify {leg} for {symbol}: {}", summarize_attempts(.attempts))]
    Exhausted {
        symbol: String,
        leg: Leg,
        /// Every (variant, venue) pair tried, in attempt order
        attempts: Vec<CandidateAttempt>,
    },

    /// The caller cancelled resolution before a candidate qualified.
    #[error("Resolution of {leg} for {symbol} cancelled after {} attempts", .attempts.len())]
    Cancelled {
        symbol: String,
        leg: Leg,
        /// Attempts completed before cancellation
        attempts: Vec<CandidateAttempt>,
    },
}

impl ResolutionError {
    /// Every candidate that was tried, with its failure reason.
    pub fn attempted_candidates(&self) -> &[CandidateAttempt] {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => attempts,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Exhausted { symbol, .. } | Self::Cancelled { symbol, .. } => symbol,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Invalid input to the strike ladder generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Spot price must be positive, got {0}")]
    NonPositiveSpot(String),

    #[error("Spot price is not a finite number")]
    NonFiniteSpot,

    #[error("Ladder half width must be at least 1")]
    ZeroHalfWidth,

    #[error("Ladder half width {requested} exceeds the maximum of {max}")]
    HalfWidthTooLarge { requested: u32, max: u32 },

    #[error("Strike arithmetic overflowed for spot {0}")]
    Overflow(String),
}

/// Invalid profile or contract catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile '{symbol}' is invalid: {message}")]
    Invalid { symbol: String, message: String },

    #[error("Duplicate profile for symbol '{0}'")]
    Duplicate(String),

    #[error("Default venue must not be blank")]
    BlankDefaultVenue,
}

/// Errors returned by the at-the-money chain scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No usable spot price and the fallback policy forbids substitution.
    #[error("No spot price available for {symbol}: {reason}")]
    SpotUnavailable { symbol: String, reason: String },

    /// Not a single option leg on the ladder qualified.
    #[error("No option contracts qualified for {symbol} ({strikes} strikes tried)")]
    NoOptionsQualified { symbol: String, strikes: usize },

    /// The caller cancelled the scan between option attempts.
    #[error("Scan of {0} cancelled")]
    Cancelled(String),
}
