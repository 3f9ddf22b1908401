//! Strike ladder generation.
//!
//! Rounds a spot price to the symbol's strike increment and lays out
//! `2 * half_width + 1` strikes around it:
//!
//! ```text
//! SPX, spot 5002.4, half_width 2, increment 5, step 5
//!   ATM = round(5002.4 / 5) * 5 = 5000
//!   [4990, 4995, 5000, 5005, 5010]   atm_index = 2
//! ```

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::ValidationError;
use crate::models::StrikeLadder;
use crate::profile::ProfileTable;

/// Default number of strikes on each side of the ATM strike.
pub const DEFAULT_HALF_WIDTH: u32 = 20;

/// Largest accepted half width. Wider requests are rejected, not clamped.
pub const MAX_HALF_WIDTH: u32 = 500;

/// Builds strike ladders from the profile table.
#[derive(Clone, Debug)]
pub struct LadderGenerator {
    profiles: Arc<ProfileTable>,
}

impl LadderGenerator {
    pub fn new(profiles: Arc<ProfileTable>) -> Self {
        Self { profiles }
    }

    /// Ladder of `2 * half_width + 1` ascending strikes centred on the
    /// at-the-money strike.
    ///
    /// Strikes at or below zero are kept; callers that submit contracts are
    /// expected to skip them. Fails with [`ValidationError::Overflow`] when a
    /// strike does not fit in a `Decimal`.
    pub fn generate(
        &self,
        symbol: &str,
        spot: Decimal,
        half_width: u32,
    ) -> Result<StrikeLadder, ValidationError> {
        if spot <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveSpot(spot.to_string()));
        }
        if half_width == 0 {
            return Err(ValidationError::ZeroHalfWidth);
        }
        if half_width > MAX_HALF_WIDTH {
            return Err(ValidationError::HalfWidthTooLarge {
                requested: half_width,
                max: MAX_HALF_WIDTH,
            });
        }

        let overflow = || ValidationError::Overflow(spot.to_string());
        let profile = self.profiles.profile_for(symbol);
        let atm =
            round_to_increment(spot, profile.strike_rounding_increment).ok_or_else(overflow)?;
        let step = profile.strike_ladder_step;
        let half = i64::from(half_width);

        let strikes = (-half..=half)
            .map(|k| {
                Decimal::from(k)
                    .checked_mul(step)
                    .and_then(|offset| atm.checked_add(offset))
                    .map(|d| d.normalize())
                    .ok_or_else(overflow)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StrikeLadder {
            symbol: profile.name.clone(),
            strikes,
            atm_index: half_width as usize,
        })
    }
}

/// Nearest multiple of `increment`, ties away from zero.
///
/// `None` when the increment is zero or the result overflows.
pub fn round_to_increment(value: Decimal, increment: Decimal) -> Option<Decimal> {
    value
        .checked_div(increment)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(increment)
        .map(|d| d.normalize())
}

/// Convert a float quote into a `Decimal` spot.
pub fn spot_from_f64(spot: f64) -> Result<Decimal, ValidationError> {
    if !spot.is_finite() {
        return Err(ValidationError::NonFiniteSpot);
    }
    Decimal::try_from(spot).map_err(|_| ValidationError::NonFiniteSpot)
}
