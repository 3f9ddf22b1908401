use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::errors::ResolutionError;
use crate::gateway::ContractQualifier;
use crate::models::{ContractDescriptor, Leg, OptionParams, ResolvedContract};
use crate::profile::{ProfileLookup, ProfileSource, ProfileTable, SymbolProfile};

use super::candidates::candidate_plan;
use super::diagnostics::{Candidate, ResolutionDiagnostics};

/// Default time allowed for a single qualification request.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolver configuration.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Upper bound for one qualification request. Worst-case latency of a
    /// resolution is this times the number of candidates.
    pub attempt_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

/// Resolves logical symbols to gateway-validated contracts.
///
/// Candidates are tried strictly one after another, in variant-major order,
/// and the first one the gateway qualifies wins. Individual failures are
/// logged and recorded; only exhaustion or cancellation reaches the caller.
///
/// # Example
///
/// ```ignore
/// let resolver = InstrumentResolver::new(session, Arc::new(ProfileTable::builtin()));
///
/// let spx = resolver.resolve_underlying("SPX").await?;
/// // spx.variant = "SPX", spx.venue = "CBOE"
///
/// let params = OptionParams::new(expiry, dec!(5000), OptionRight::Call);
/// let call = resolver.resolve_option("SPX", &params).await?;
/// // call.variant = "SPXW", trading class SPXW
/// ```
pub struct InstrumentResolver {
    qualifier: Arc<dyn ContractQualifier>,
    profiles: Arc<ProfileTable>,
    config: ResolverConfig,
}

impl InstrumentResolver {
    pub fn new(qualifier: Arc<dyn ContractQualifier>, profiles: Arc<ProfileTable>) -> Self {
        Self::with_config(qualifier, profiles, ResolverConfig::default())
    }

    pub fn with_config(
        qualifier: Arc<dyn ContractQualifier>,
        profiles: Arc<ProfileTable>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            qualifier,
            profiles,
            config,
        }
    }

    pub fn profiles(&self) -> &Arc<ProfileTable> {
        &self.profiles
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Attempt order `resolve_underlying` would follow for a symbol.
    pub fn underlying_candidates(&self, symbol: &str) -> Vec<Candidate> {
        candidate_plan(&self.profiles.profile_for(symbol), Leg::Underlying)
    }

    /// Attempt order `resolve_option` would follow for a symbol.
    pub fn option_candidates(&self, symbol: &str) -> Vec<Candidate> {
        candidate_plan(&self.profiles.profile_for(symbol), Leg::Option)
    }

    /// Resolve the underlying index or equity of a symbol.
    pub async fn resolve_underlying(
        &self,
        symbol: &str,
    ) -> Result<ResolvedContract, ResolutionError> {
        self.resolve_underlying_with_cancel(symbol, &CancellationToken::new())
            .await
    }

    pub async fn resolve_underlying_with_cancel(
        &self,
        symbol: &str,
        cancel: &CancellationToken,
    ) -> Result<ResolvedContract, ResolutionError> {
        let lookup = self.profiles.lookup(symbol);
        log_profile_source(symbol, &lookup);
        let profile = lookup.profile;
        let kind = profile.kind;

        self.try_candidates(&profile, Leg::Underlying, cancel, |candidate| {
            ContractDescriptor::underlying(kind, &candidate.variant, &candidate.venue)
        })
        .await
    }

    /// Resolve one option contract on a symbol.
    ///
    /// When `params` carries no trading class and the variant being tried is
    /// one of the profile's trading-class variants (SPXW), the variant is
    /// used as the trading class.
    pub async fn resolve_option(
        &self,
        symbol: &str,
        params: &OptionParams,
    ) -> Result<ResolvedContract, ResolutionError> {
        self.resolve_option_with_cancel(symbol, params, &CancellationToken::new())
            .await
    }

    pub async fn resolve_option_with_cancel(
        &self,
        symbol: &str,
        params: &OptionParams,
        cancel: &CancellationToken,
    ) -> Result<ResolvedContract, ResolutionError> {
        let lookup = self.profiles.lookup(symbol);
        log_profile_source(symbol, &lookup);
        let profile = lookup.profile;

        self.try_candidates(&profile, Leg::Option, cancel, |candidate| {
            if params.trading_class.is_none() && profile.is_trading_class_variant(&candidate.variant)
            {
                let params = params.clone().with_trading_class(candidate.variant.clone());
                ContractDescriptor::option(&candidate.variant, &candidate.venue, &params)
            } else {
                ContractDescriptor::option(&candidate.variant, &candidate.venue, params)
            }
        })
        .await
    }

    async fn try_candidates<F>(
        &self,
        profile: &SymbolProfile,
        leg: Leg,
        cancel: &CancellationToken,
        build: F,
    ) -> Result<ResolvedContract, ResolutionError>
    where
        F: Fn(&Candidate) -> ContractDescriptor,
    {
        let candidates = candidate_plan(profile, leg);
        let mut diagnostics = ResolutionDiagnostics::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(self.cancelled(profile, leg, diagnostics));
            }

            let descriptor = build(&candidate);
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self
                    .qualifier
                    .qualify_within(&descriptor, self.config.attempt_timeout) => Some(result),
            };
            let Some(result) = result else {
                return Err(self.cancelled(profile, leg, diagnostics));
            };

            match result {
                Ok(contract) => {
                    diagnostics.record_success(candidate.clone());
                    if index == 0 {
                        debug!("Qualified {} {} as {}", profile.name, leg, descriptor);
                    } else {
                        info!(
                            "Qualified {} {} as {} after fallback: {}",
                            profile.name,
                            leg,
                            descriptor,
                            diagnostics.summary()
                        );
                    }
                    return Ok(ResolvedContract {
                        contract,
                        variant: candidate.variant,
                        venue: candidate.venue,
                        attempt: index + 1,
                    });
                }
                Err(failure) => {
                    debug!(
                        "Failed to qualify {} via '{}': {}",
                        descriptor,
                        self.qualifier.id(),
                        failure
                    );
                    diagnostics.record_failure(candidate, failure);
                }
            }
        }

        warn!(
            "Failed to qualify {} {} with any symbol/venue combination ({} timeouts): {}",
            profile.name,
            leg,
            diagnostics.timeouts(),
            diagnostics.summary()
        );
        Err(ResolutionError::Exhausted {
            symbol: profile.name.clone(),
            leg,
            attempts: diagnostics.into_failures(),
        })
    }

    fn cancelled(
        &self,
        profile: &SymbolProfile,
        leg: Leg,
        diagnostics: ResolutionDiagnostics,
    ) -> ResolutionError {
        info!(
            "Resolution of {} {} cancelled after {} attempts",
            profile.name,
            leg,
            diagnostics.attempt_count()
        );
        ResolutionError::Cancelled {
            symbol: profile.name.clone(),
            leg,
            attempts: diagnostics.into_failures(),
        }
    }
}

fn log_profile_source(symbol: &str, lookup: &ProfileLookup<'_>) {
    if lookup.source == ProfileSource::Defaulted {
        info!(
            "No profile configured for '{}', using defaults (venue {})",
            symbol,
            lookup
                .profile
                .underlying_venues
                .first()
                .map(String::as_str)
                .unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::errors::QualifyError;
    use crate::gateway::SerialQualifier;
    use crate::models::{ContractKind, OptionRight, SymbolKind, ValidatedContract};

    /// Qualifier that records every descriptor and succeeds only for listed
    /// (symbol, venue) pairs.
    struct ScriptedQualifier {
        accept: Vec<(&'static str, &'static str)>,
        seen: Mutex<Vec<ContractDescriptor>>,
        stall: Option<Duration>,
    }

    impl ScriptedQualifier {
        fn accepting(accept: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                accept,
                seen: Mutex::new(Vec::new()),
                stall: None,
            }
        }

        fn rejecting_all() -> Self {
            Self::accepting(Vec::new())
        }

        fn seen(&self) -> Vec<ContractDescriptor> {
            self.seen.lock().unwrap().clone()
        }

        fn tried_pairs(&self) -> Vec<(String, String)> {
            self.seen()
                .into_iter()
                .map(|d| (d.symbol, d.venue.to_string()))
                .collect()
        }
    }

    #[async_trait]
    impl ContractQualifier for ScriptedQualifier {
        fn id(&self) -> &str {
            "SCRIPTED"
        }

        async fn qualify(
            &self,
            descriptor: &ContractDescriptor,
        ) -> Result<ValidatedContract, QualifyError> {
            self.seen.lock().unwrap().push(descriptor.clone());
            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }
            let accepted = self
                .accept
                .iter()
                .any(|(s, v)| *s == descriptor.symbol && *v == descriptor.venue.as_ref());
            if !accepted {
                return Err(QualifyError::NotFound);
            }
            Ok(ValidatedContract {
                con_id: 42,
                symbol: descriptor.symbol.clone(),
                exchange: descriptor.venue.to_string(),
                primary_exchange: None,
                currency: descriptor.currency.to_string(),
                kind: descriptor.kind.clone(),
                local_symbol: None,
                trading_class: None,
            })
        }
    }

    fn resolver(qualifier: Arc<ScriptedQualifier>) -> InstrumentResolver {
        InstrumentResolver::new(qualifier, Arc::new(ProfileTable::builtin()))
    }

    fn two_by_two() -> Arc<ProfileTable> {
        let profile = SymbolProfile {
            name: "ABC".to_string(),
            kind: SymbolKind::Equity,
            underlying_variants: vec!["A".to_string(), "B".to_string()],
            underlying_venues: vec!["X".to_string(), "Y".to_string()],
            option_variants: vec!["A".to_string(), "B".to_string()],
            option_venues: vec!["X".to_string(), "Y".to_string()],
            trading_class_variants: Vec::new(),
            strike_rounding_increment: Decimal::ONE,
            strike_ladder_step: Decimal::ONE,
        };
        Arc::new(ProfileTable::from_profiles(vec![profile]).unwrap())
    }

    fn params() -> OptionParams {
        OptionParams::new(
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            dec!(5000),
            OptionRight::Call,
        )
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(s, v)| (s.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_tries_variant_major_until_first_success() {
        let qualifier = Arc::new(ScriptedQualifier::accepting(vec![("B", "X")]));
        let resolver = InstrumentResolver::new(qualifier.clone(), two_by_two());

        let resolved = resolver.resolve_underlying("ABC").await.unwrap();

        assert_eq!(
            qualifier.tried_pairs(),
            pairs(&[("A", "X"), ("A", "Y"), ("B", "X")])
        );
        assert_eq!(resolved.variant, "B");
        assert_eq!(resolved.venue, "X");
        assert_eq!(resolved.attempt, 3);
    }

    #[tokio::test]
    async fn test_first_candidate_wins_without_further_attempts() {
        let qualifier = Arc::new(ScriptedQualifier::accepting(vec![
            ("SPX", "CBOE"),
            ("SPX", "SMART"),
        ]));
        let resolved = resolver(qualifier.clone())
            .resolve_underlying("SPX")
            .await
            .unwrap();

        assert_eq!(qualifier.seen().len(), 1);
        assert_eq!(resolved.attempt, 1);
        assert_eq!(resolved.contract.kind, ContractKind::Index);
    }

    #[tokio::test]
    async fn test_index_constructor_for_every_spelling() {
        let qualifier = Arc::new(ScriptedQualifier::rejecting_all());
        let _ = resolver(qualifier.clone()).resolve_underlying("SPX").await;

        let seen = qualifier.seen();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|d| d.kind == ContractKind::Index));
        assert!(seen.iter().any(|d| d.symbol == "SPXW"));
    }

    #[tokio::test]
    async fn test_equity_constructor() {
        let qualifier = Arc::new(ScriptedQualifier::accepting(vec![("QQQ", "SMART")]));
        let resolved = resolver(qualifier.clone())
            .resolve_underlying("QQQ")
            .await
            .unwrap();

        assert_eq!(resolved.contract.kind, ContractKind::Stock);
        assert!(qualifier.seen().iter().all(|d| d.currency == "USD"));
    }

    #[tokio::test]
    async fn test_unconfigured_symbol_single_attempt() {
        let qualifier = Arc::new(ScriptedQualifier::rejecting_all());
        let error = resolver(qualifier.clone())
            .resolve_underlying("ZZZ")
            .await
            .unwrap_err();

        assert_eq!(error.attempted_candidates().len(), 1);
        assert_eq!(error.attempted_candidates()[0].candidate, Candidate::new("ZZZ", "SMART"));
        assert_eq!(qualifier.seen()[0].kind, ContractKind::Stock);
    }

    #[tokio::test]
    async fn test_option_exhaustion_lists_every_candidate_once() {
        let qualifier = Arc::new(ScriptedQualifier::rejecting_all());
        let error = resolver(qualifier.clone())
            .resolve_option("SPY", &params())
            .await
            .unwrap_err();

        let attempted: Vec<&Candidate> = error
            .attempted_candidates()
            .iter()
            .map(|a| &a.candidate)
            .collect();
        let unique: HashSet<&Candidate> = attempted.iter().copied().collect();

        // SPY options: 1 variant x 6 venues
        assert_eq!(attempted.len(), 6);
        assert_eq!(unique.len(), 6);
        assert_eq!(qualifier.seen().len(), 6);
        match error {
            ResolutionError::Exhausted { symbol, leg, .. } => {
                assert_eq!(symbol, "SPY");
                assert_eq!(leg, Leg::Option);
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_option_sets_trading_class_for_class_variant() {
        let qualifier = Arc::new(ScriptedQualifier::rejecting_all());
        let _ = resolver(qualifier.clone())
            .resolve_option("SPX", &params())
            .await;

        let classes: Vec<(String, Option<String>)> = qualifier
            .seen()
            .into_iter()
            .map(|d| match d.kind {
                ContractKind::Option { trading_class, .. } => (d.symbol, trading_class),
                other => panic!("Expected option descriptor, got {:?}", other),
            })
            .collect();

        assert_eq!(classes[0], ("SPXW".to_string(), Some("SPXW".to_string())));
        assert_eq!(classes[2], ("SPX".to_string(), None));
    }

    #[tokio::test]
    async fn test_option_keeps_caller_trading_class() {
        let qualifier = Arc::new(ScriptedQualifier::rejecting_all());
        let params = params().with_trading_class("SPX");
        let _ = resolver(qualifier.clone()).resolve_option("SPX", &params).await;

        assert!(qualifier.seen().iter().all(|d| matches!(
            &d.kind,
            ContractKind::Option { trading_class: Some(class), .. } if class == "SPX"
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_to_next_candidate() {
        let qualifier = Arc::new(ScriptedQualifier {
            accept: vec![("SPX", "SMART")],
            seen: Mutex::new(Vec::new()),
            stall: Some(Duration::from_secs(30)),
        });
        let resolver = InstrumentResolver::with_config(
            qualifier.clone(),
            Arc::new(ProfileTable::builtin()),
            ResolverConfig {
                attempt_timeout: Duration::from_secs(2),
            },
        );

        let error = resolver.resolve_underlying("SPX").await.unwrap_err();

        assert_eq!(qualifier.seen().len(), 4);
        assert!(error
            .attempted_candidates()
            .iter()
            .all(|a| a.failure == QualifyError::Timeout(Duration::from_secs(2))));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let qualifier = Arc::new(ScriptedQualifier::rejecting_all());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = resolver(qualifier.clone())
            .resolve_underlying_with_cancel("SPX", &cancel)
            .await
            .unwrap_err();

        assert!(error.is_cancelled());
        assert!(error.attempted_candidates().is_empty());
        assert!(qualifier.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_fallback() {
        let qualifier = Arc::new(ScriptedQualifier {
            accept: Vec::new(),
            seen: Mutex::new(Vec::new()),
            stall: Some(Duration::from_secs(1)),
        });
        let resolver = resolver(qualifier.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            trigger.cancel();
        });

        let error = resolver
            .resolve_underlying_with_cancel("SPX", &cancel)
            .await
            .unwrap_err();

        assert!(error.is_cancelled());
        assert_eq!(error.attempted_candidates().len(), 1);
        assert_eq!(qualifier.seen().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_session_wait_does_not_consume_attempt_timeout() {
        let session = Arc::new(SerialQualifier::new(ScriptedQualifier {
            accept: vec![("SPY", "SMART"), ("QQQ", "SMART"), ("QQQ", "NASDAQ")],
            seen: Mutex::new(Vec::new()),
            stall: Some(Duration::from_secs(3)),
        }));
        let resolver = InstrumentResolver::with_config(
            session.clone(),
            Arc::new(ProfileTable::builtin()),
            ResolverConfig {
                attempt_timeout: Duration::from_secs(5),
            },
        );

        // Each call holds the session for 3s, so the second symbol waits 3s
        // before its first attempt starts.
        let (spy, qqq) = tokio::join!(
            resolver.resolve_underlying("SPY"),
            resolver.resolve_underlying("QQQ")
        );

        assert_eq!(spy.unwrap().attempt, 1);
        let qqq = qqq.unwrap();
        assert_eq!(qqq.attempt, 1);
        assert_eq!(qqq.venue, "SMART");
        assert_eq!(session.inner().seen().len(), 2);
    }

    /// Fails every candidate with an error chosen by venue.
    struct FailingQualifier;

    #[async_trait]
    impl ContractQualifier for FailingQualifier {
        fn id(&self) -> &str {
            "FAILING"
        }

        async fn qualify(
            &self,
            descriptor: &ContractDescriptor,
        ) -> Result<ValidatedContract, QualifyError> {
            match descriptor.venue.as_ref() {
                "NASDAQ" => Err(QualifyError::Ambiguous { matches: 2 }),
                _ => Err(QualifyError::Gateway {
                    message: "no security definition".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_each_failure_reason() {
        let resolver =
            InstrumentResolver::new(Arc::new(FailingQualifier), Arc::new(ProfileTable::builtin()));

        let error = resolver.resolve_underlying("NDX").await.unwrap_err();

        let failures: Vec<(Candidate, QualifyError)> = error
            .attempted_candidates()
            .iter()
            .map(|a| (a.candidate.clone(), a.failure.clone()))
            .collect();
        assert_eq!(
            failures,
            vec![
                (
                    Candidate::new("NDX", "NASDAQ"),
                    QualifyError::Ambiguous { matches: 2 }
                ),
                (
                    Candidate::new("NDX", "SMART"),
                    QualifyError::Gateway {
                        message: "no security definition".to_string()
                    }
                ),
            ]
        );
        let message = error.to_string();
        assert!(message.contains("NDX@NASDAQ: AMBIGUOUS (2)"));
        assert!(message.contains("no security definition"));
    }

    #[test]
    fn test_candidate_accessors() {
        let resolver = resolver(Arc::new(ScriptedQualifier::rejecting_all()));
        assert_eq!(resolver.underlying_candidates("NDX").len(), 2);
        assert_eq!(
            resolver.option_candidates("NDX")[0],
            Candidate::new("NDX", "SMART")
        );
        assert_eq!(resolver.config().attempt_timeout, DEFAULT_ATTEMPT_TIMEOUT);
    }
}
