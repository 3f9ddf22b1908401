//! Symbol → contract resolution with variant/venue fallback.
//!
//! A logical symbol such as `SPX` may be listed under several spellings
//! (`SPX`, `SPXW`) on several venues. The resolver walks the profile's
//! candidates variant-major and returns the first one the gateway qualifies.
//!
//! ```text
//! variants = [A, B], venues = [X, Y]
//!   A@X -> A@Y -> B@X -> B@Y     (stops at first success)
//! ```

mod candidates;
mod diagnostics;
mod instrument_resolver;

pub use candidates::candidate_plan;
pub use diagnostics::{summarize_attempts, Candidate, CandidateAttempt, ResolutionDiagnostics};
pub use instrument_resolver::{InstrumentResolver, ResolverConfig, DEFAULT_ATTEMPT_TIMEOUT};
