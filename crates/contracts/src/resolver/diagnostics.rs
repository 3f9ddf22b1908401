//! Per-attempt tracking for the variant/venue fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::QualifyError;

/// One (variant, venue) combination to attempt.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub variant: String,
    pub venue: String,
}

impl Candidate {
    pub fn new(variant: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            venue: venue.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.variant, self.venue)
    }
}

/// Record of a candidate that failed to qualify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateAttempt {
    pub candidate: Candidate,
    pub failure: QualifyError,
}

impl fmt::Display for CandidateAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            QualifyError::NotFound => write!(f, "{}: NOT FOUND", self.candidate),
            QualifyError::Ambiguous { matches } => {
                write!(f, "{}: AMBIGUOUS ({})", self.candidate, matches)
            }
            QualifyError::Timeout(after) => write!(f, "{}: TIMEOUT ({:?})", self.candidate, after),
            QualifyError::Gateway { message } => {
                write!(f, "{}: ERROR ({})", self.candidate, message)
            }
        }
    }
}

/// Summary of failed attempts for logging and error messages.
pub fn summarize_attempts(attempts: &[CandidateAttempt]) -> String {
    if attempts.is_empty() {
        return "no candidates tried".to_string();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Running trail of one resolution request.
#[derive(Clone, Debug, Default)]
pub struct ResolutionDiagnostics {
    pub failures: Vec<CandidateAttempt>,
    pub success: Option<Candidate>,
}

impl ResolutionDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, candidate: Candidate, failure: QualifyError) {
        self.failures.push(CandidateAttempt { candidate, failure });
    }

    pub fn record_success(&mut self, candidate: Candidate) {
        self.success = Some(candidate);
    }

    /// Number of attempts made so far, the successful one included.
    pub fn attempt_count(&self) -> usize {
        self.failures.len() + usize::from(self.success.is_some())
    }

    /// Failures that were timeouts.
    pub fn timeouts(&self) -> usize {
        self.failures
            .iter()
            .filter(|a| matches!(a.failure, QualifyError::Timeout(_)))
            .count()
    }

    pub fn summary(&self) -> String {
        match &self.success {
            Some(candidate) if self.failures.is_empty() => format!("{}: SUCCESS", candidate),
            Some(candidate) => format!(
                "{} -> {}: SUCCESS",
                summarize_attempts(&self.failures),
                candidate
            ),
            None => summarize_attempts(&self.failures),
        }
    }

    pub fn into_failures(self) -> Vec<CandidateAttempt> {
        self.failures
    }
}
