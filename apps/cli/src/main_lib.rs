use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use strikeline_contracts::{
    CatalogQualifier, ContractQualifier, InstrumentResolver, ProfileTable, SerialQualifier,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat};

/// Logs are written to stderr; stdout carries command output.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Resolver backed by an offline contract catalog file.
pub fn build_resolver(
    config: &Config,
    profiles: Arc<ProfileTable>,
    catalog: &Path,
) -> anyhow::Result<Arc<InstrumentResolver>> {
    let catalog = CatalogQualifier::from_path(catalog)
        .with_context(|| format!("Failed to load contract catalog {}", catalog.display()))?;
    tracing::info!("Loaded {} contracts from catalog", catalog.len());

    let session: Arc<dyn ContractQualifier> = Arc::new(SerialQualifier::new(catalog));
    Ok(Arc::new(InstrumentResolver::with_config(
        session,
        profiles,
        config.resolver_config(),
    )))
}

/// Token cancelled on Ctrl-C.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });
    token
}
