//! Error types for metric computation
//!
//! Every failure in the library funnels into [`MetricError`]. The type is
//! `Clone` because a failed computation is cached and handed to every caller
//! that asked for the same key.

use crate::artifacts::Dependency;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while computing a metric
#[derive(Error, Debug, Clone)]
pub enum MetricError {
    /// A required input artifact was not supplied
    #[error("Required artifact missing: {0}")]
    MissingDependency(Dependency),

    /// A collaborator (trace processor, interactive provider, simulator) failed
    #[error("{collaborator} failed: {source}")]
    Collaborator {
        collaborator: &'static str,
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },

    /// A task interval carried negative or non-finite timing
    #[error("Malformed timeline: {0}")]
    MalformedTimeline(String),

    #[error("Invalid window: begin {begin}ms is after end {end}ms")]
    InvalidWindow { begin: f64, end: f64 },

    #[error("Trace contains no events, trace end is unavailable")]
    NoTraceEnd,

    #[error("Navigation window needs a time-to-interactive value")]
    MissingInteractiveTime,

    #[error("No renderer main thread found in trace")]
    NoMainThread,

    #[error("No firstContentfulPaint event found in navigation trace")]
    NoFirstContentfulPaint,

    #[error("{metric} requires a navigation, gather mode was {gather_mode}")]
    NavigationRequired {
        metric: &'static str,
        gather_mode: String,
    },

    #[error("No {quiet_window_ms}ms quiet window found after first contentful paint")]
    NoQuietWindow { quiet_window_ms: f64 },

    #[error("Invalid simulator options: {0}")]
    InvalidSimulator(String),

    #[error("Failed to fingerprint {artifact}: {message}")]
    Fingerprint {
        artifact: &'static str,
        message: String,
    },
}

impl MetricError {
    /// Wrap an arbitrary collaborator error, keeping it reachable via `source()`
    pub fn collaborator<E>(collaborator: &'static str, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        MetricError::Collaborator {
            collaborator,
            source: Arc::new(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_collaborator_error_keeps_source() {
        let err = MetricError::collaborator(
            "interactive",
            io::Error::other("trace too short"),
        );
        assert_eq!(err.to_string(), "interactive failed: trace too short");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_cloned_error_shares_source() {
        let err = MetricError::collaborator("simulator", io::Error::other("boom"));
        let cloned = err.clone();
        match (&err, &cloned) {
            (
                MetricError::Collaborator { source: a, .. },
                MetricError::Collaborator { source: b, .. },
            ) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("Expected collaborator errors"),
        }
    }

    #[test]
    fn test_missing_dependency_message() {
        let err = MetricError::MissingDependency(Dependency::Trace);
        assert_eq!(err.to_string(), "Required artifact missing: trace");
    }
}
