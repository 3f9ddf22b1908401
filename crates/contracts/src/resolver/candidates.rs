use crate::models::Leg;
use crate::profile::SymbolProfile;

use super::diagnostics::Candidate;

/// Ordered attempt list for one leg of a profile.
///
/// Variant-major: every venue is tried for the first spelling before the
/// next spelling is considered.
pub fn candidate_plan(profile: &SymbolProfile, leg: Leg) -> Vec<Candidate> {
    let (variants, venues) = match leg {
        Leg::Underlying => (&profile.underlying_variants, &profile.underlying_venues),
        Leg::Option => (&profile.option_variants, &profile.option_venues),
    };

    variants
        .iter()
        .flat_map(|variant| venues.iter().map(move |venue| Candidate::new(variant, venue)))
        .collect()
}
