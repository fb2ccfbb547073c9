//! Per-request computation context
//!
//! A [`ComputeContext`] owns the memoization caches and the collaborators and
//! is passed explicitly through every computation. Clones share the same
//! caches, so a context can be handed to several threads computing metrics
//! for the same page load.

use crate::artifacts::{Dependency, MetricInputs};
use crate::cache::{CacheStats, ComputationCache, ComputationKey, EntryState};
use crate::collaborators::{Collaborators, ProcessedTrace};
use crate::error::Result;
use crate::metric::{self, MetricKind, MetricResult};
use std::sync::Arc;

const PROCESSED_TRACE: &str = "ProcessedTrace";

#[derive(Clone)]
pub struct ComputeContext {
    metrics: Arc<ComputationCache<MetricResult>>,
    processed_traces: Arc<ComputationCache<ProcessedTrace>>,
    collaborators: Arc<Collaborators>,
}

impl Default for ComputeContext {
    fn default() -> Self {
        Self::new(Collaborators::default())
    }
}

impl ComputeContext {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            metrics: Arc::new(ComputationCache::new()),
            processed_traces: Arc::new(ComputationCache::new()),
            collaborators: Arc::new(collaborators),
        }
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Compute `kind` for `inputs`, at most once per distinct key
    ///
    /// Missing required inputs are reported before the cache is consulted, so
    /// they never leave a failed entry behind.
    pub fn request(&self, kind: MetricKind, inputs: &MetricInputs) -> Result<Arc<MetricResult>> {
        kind.check_required(inputs)?;
        let key = kind.key(inputs);
        self.metrics.request(key, || metric::compute(kind, inputs, self))
    }

    /// Processed form of the input trace, shared by every metric
    pub fn processed_trace(&self, inputs: &MetricInputs) -> Result<Arc<ProcessedTrace>> {
        let trace = inputs.trace()?;
        let key = ComputationKey::derive(PROCESSED_TRACE, &[Dependency::Trace], inputs);
        self.processed_traces
            .request(key, || self.collaborators.trace_processor.process(trace))
    }

    /// State of the cached entry for `kind`, if it was ever requested
    pub fn metric_state(&self, kind: MetricKind, inputs: &MetricInputs) -> Option<EntryState> {
        self.metrics.state(&kind.key(inputs))
    }

    pub fn metric_cache_stats(&self) -> CacheStats {
        self.metrics.stats()
    }

    pub fn trace_cache_stats(&self) -> CacheStats {
        self.processed_traces.stats()
    }
}
