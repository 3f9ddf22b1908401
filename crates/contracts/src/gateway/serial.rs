//! One-in-flight guard for a shared gateway session.
//!
//! The gateway accepts a single qualification request at a time per session.
//! Resolution requests for different symbols may run concurrently, so a
//! session shared between them is wrapped in [`SerialQualifier`], which holds
//! an async mutex across each call. The per-attempt timeout starts once the
//! mutex is held.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use crate::errors::QualifyError;
use crate::models::{ContractDescriptor, ValidatedContract};

use super::traits::ContractQualifier;

/// Serialises `qualify` calls on the wrapped session.
pub struct SerialQualifier<Q> {
    inner: Q,
    in_flight: Mutex<()>,
}

impl<Q: ContractQualifier> SerialQualifier<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            in_flight: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }
}

#[async_trait]
impl<Q: ContractQualifier> ContractQualifier for SerialQualifier<Q> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn qualify(
        &self,
        descriptor: &ContractDescriptor,
    ) -> Result<ValidatedContract, QualifyError> {
        let _guard = self.in_flight.lock().await;
        debug!("Session '{}' qualifying {}", self.inner.id(), descriptor);
        self.inner.qualify(descriptor).await
    }

    async fn qualify_within(
        &self,
        descriptor: &ContractDescriptor,
        timeout: Duration,
    ) -> Result<ValidatedContract, QualifyError> {
        let _guard = self.in_flight.lock().await;
        debug!(
            "Session '{}' qualifying {} (timeout {:?})",
            self.inner.id(),
            descriptor,
            timeout
        );
        self.inner.qualify_within(descriptor, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::models::SymbolKind;

    /// Tracks how many qualify calls overlap.
    struct OverlapCounter {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ContractQualifier for OverlapCounter {
        fn id(&self) -> &str {
            "COUNTER"
        }

        async fn qualify(
            &self,
            _descriptor: &ContractDescriptor,
        ) -> Result<ValidatedContract, QualifyError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Err(QualifyError::NotFound)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_at_most_one_call_in_flight() {
        let serial = Arc::new(SerialQualifier::new(OverlapCounter {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }));

        let mut handles = Vec::new();
        for symbol in ["SPY", "QQQ", "IWM", "DIA"] {
            let serial = serial.clone();
            handles.push(tokio::spawn(async move {
                let descriptor = ContractDescriptor::underlying(SymbolKind::Equity, symbol, "SMART");
                serial.qualify(&descriptor).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Err(QualifyError::NotFound));
        }

        assert_eq!(serial.inner().peak.load(Ordering::SeqCst), 1);
    }

    fn counting_session() -> SerialQualifier<OverlapCounter> {
        SerialQualifier::new(OverlapCounter {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_for_session_is_not_charged_to_timeout() {
        let serial = counting_session();
        let descriptor = ContractDescriptor::underlying(SymbolKind::Equity, "SPY", "SMART");
        let timeout = Duration::from_millis(30);

        // Each call holds the session for 20ms; the last one waits 60ms.
        let (a, b, c, d) = tokio::join!(
            serial.qualify_within(&descriptor, timeout),
            serial.qualify_within(&descriptor, timeout),
            serial.qualify_within(&descriptor, timeout),
            serial.qualify_within(&descriptor, timeout),
        );

        for result in [a, b, c, d] {
            assert_eq!(result, Err(QualifyError::NotFound));
        }
        assert_eq!(serial.inner().peak.load(Ordering::SeqCst), 1);
    }
}
