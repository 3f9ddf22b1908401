use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use strikeline_contracts::{
    ProfileTable, ResolverConfig, ScanConfig, SpotFallback, DEFAULT_ATTEMPT_TIMEOUT,
    DEFAULT_HALF_WIDTH, DEFAULT_VENUE, MAX_HALF_WIDTH,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is text.
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub struct Config {
    pub attempt_timeout: Duration,
    pub default_venue: String,
    pub half_width: u32,
    pub log_format: LogFormat,
    pub nominal_spot: Option<Decimal>,
    pub profiles_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let timeout_ms: u64 = std::env::var("STRIKELINE_ATTEMPT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT.as_millis() as u64);
        let default_venue = std::env::var("STRIKELINE_DEFAULT_VENUE")
            .map(|v| v.trim().to_uppercase())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VENUE.to_string());
        let half_width: u32 = std::env::var("STRIKELINE_HALF_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|w| (1..=MAX_HALF_WIDTH).contains(w))
            .unwrap_or(DEFAULT_HALF_WIDTH);
        let log_format = std::env::var("STRIKELINE_LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Text);
        let nominal_spot = match std::env::var("STRIKELINE_NOMINAL_SPOT") {
            Ok(value) if !value.trim().is_empty() => Some(
                Decimal::from_str(value.trim())
                    .with_context(|| format!("Invalid STRIKELINE_NOMINAL_SPOT '{}'", value))?,
            ),
            _ => None,
        };
        if matches!(nominal_spot, Some(p) if p <= Decimal::ZERO) {
            anyhow::bail!("STRIKELINE_NOMINAL_SPOT must be positive");
        }
        let profiles_path = std::env::var("STRIKELINE_PROFILES")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            attempt_timeout: Duration::from_millis(timeout_ms),
            default_venue,
            half_width,
            log_format,
            nominal_spot,
            profiles_path,
        })
    }

    /// Profile table from `STRIKELINE_PROFILES`, or the built-in catalog.
    pub fn load_profiles(&self) -> anyhow::Result<ProfileTable> {
        let table = match &self.profiles_path {
            Some(path) => ProfileTable::from_path(path)
                .with_context(|| format!("Failed to load profiles from {}", path.display()))?,
            None => ProfileTable::builtin(),
        };
        Ok(table.with_default_venue(&self.default_venue)?)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            attempt_timeout: self.attempt_timeout,
        }
    }

    pub fn scan_config(&self, half_width: Option<u32>) -> ScanConfig {
        ScanConfig {
            half_width: half_width.unwrap_or(self.half_width),
            spot_fallback: match self.nominal_spot {
                Some(price) => SpotFallback::Nominal(price),
                None => SpotFallback::Fail,
            },
        }
    }
}
