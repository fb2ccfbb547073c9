//! Total Blocking Time, observed or simulated
//!
//! Both modes end in the same aggregator. They differ in where the task list
//! and the window come from:
//!
//! | Mode      | Tasks                          | Window                          |
//! |-----------|--------------------------------|---------------------------------|
//! | Observed  | recorded main-thread timeline  | `[FCP, TTI]`, or `[0, traceEnd]`|
//! | Simulated | simulation collaborator        | simulation's own FCP / TTI      |
//!
//! Which mode is authoritative is left to the caller.

use crate::artifacts::{Dependency, GatherMode, MetricInputs};
use crate::blocking::{sum_of_blocking_time, BLOCKING_THRESHOLD_MS};
use crate::cache::ComputationKey;
use crate::context::ComputeContext;
use crate::error::{MetricError, Result};
use crate::window::{resolve_window, NavigationTiming};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a metric's timeline comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Recorded execution trace
    Observed,
    /// Predicted by network/CPU simulation
    Simulated,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Observed => f.write_str("observed"),
            Mode::Simulated => f.write_str("simulated"),
        }
    }
}

/// A single timing value in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub timing: f64,
}

impl MetricResult {
    pub fn new(timing: f64) -> Self {
        Self { timing }
    }
}

/// Metrics the computation cache knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    TotalBlockingTime(Mode),
    /// Observed time-to-interactive
    Interactive,
}

const TBT_DEPENDENCIES: &[Dependency] = &[
    Dependency::DevtoolsLog,
    Dependency::GatherContext,
    Dependency::Settings,
    Dependency::Simulator,
    Dependency::Trace,
    Dependency::Url,
];

const INTERACTIVE_DEPENDENCIES: &[Dependency] = &[
    Dependency::DevtoolsLog,
    Dependency::GatherContext,
    Dependency::Settings,
    Dependency::Trace,
    Dependency::Url,
];

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::TotalBlockingTime(Mode::Observed) => "TotalBlockingTime/observed",
            MetricKind::TotalBlockingTime(Mode::Simulated) => "TotalBlockingTime/simulated",
            MetricKind::Interactive => "Interactive",
        }
    }

    /// Every input field that participates in this metric's cache key
    pub fn dependencies(&self) -> &'static [Dependency] {
        match self {
            MetricKind::TotalBlockingTime(_) => TBT_DEPENDENCIES,
            MetricKind::Interactive => INTERACTIVE_DEPENDENCIES,
        }
    }

    /// Input fields that must be present before computing
    pub fn required(&self) -> &'static [Dependency] {
        match self {
            MetricKind::TotalBlockingTime(Mode::Observed) => &[Dependency::Trace],
            MetricKind::TotalBlockingTime(Mode::Simulated) => {
                &[Dependency::Trace, Dependency::Simulator]
            }
            MetricKind::Interactive => &[Dependency::Trace],
        }
    }

    pub fn check_required(&self, inputs: &MetricInputs) -> Result<()> {
        match self
            .required()
            .iter()
            .find(|&&dependency| inputs.artifact_id(dependency).is_none())
        {
            Some(&missing) => Err(MetricError::MissingDependency(missing)),
            None => Ok(()),
        }
    }

    pub fn key(&self, inputs: &MetricInputs) -> ComputationKey {
        ComputationKey::derive(self.label(), self.dependencies(), inputs)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compute (or fetch) Total Blocking Time in the caller's chosen mode
///
/// Results are memoized in `ctx`: repeated calls with the same inputs return
/// the same `Arc`.
pub fn total_blocking_time(
    mode: Mode,
    inputs: &MetricInputs,
    ctx: &ComputeContext,
) -> Result<Arc<MetricResult>> {
    ctx.request(MetricKind::TotalBlockingTime(mode), inputs)
}

/// Uncached computation behind a cache miss
pub(crate) fn compute(
    kind: MetricKind,
    inputs: &MetricInputs,
    ctx: &ComputeContext,
) -> Result<MetricResult> {
    match kind {
        MetricKind::TotalBlockingTime(Mode::Observed) => compute_observed(inputs, ctx),
        MetricKind::TotalBlockingTime(Mode::Simulated) => compute_simulated(inputs, ctx),
        MetricKind::Interactive => ctx.collaborators().interactive.request(inputs, ctx),
    }
}

/// Simulated TBT: the simulation collaborator's answer, unchanged
pub fn compute_simulated(inputs: &MetricInputs, ctx: &ComputeContext) -> Result<MetricResult> {
    ctx.collaborators().simulation.request(inputs, ctx)
}

/// Observed TBT over the recorded main-thread timeline
pub fn compute_observed(inputs: &MetricInputs, ctx: &ComputeContext) -> Result<MetricResult> {
    let processed = ctx.processed_trace(inputs)?;

    let navigation = match inputs.gather_mode() {
        GatherMode::Navigation => Some(NavigationTiming {
            first_contentful_paint: processed
                .first_contentful_paint
                .ok_or(MetricError::NoFirstContentfulPaint)?,
        }),
        GatherMode::Timespan | GatherMode::Snapshot => None,
    };
    let interactive = match navigation {
        Some(_) => Some(ctx.request(MetricKind::Interactive, inputs)?.timing),
        None => None,
    };

    let window = resolve_window(navigation.as_ref(), interactive, processed.trace_end)?;
    let timeline = ctx
        .collaborators()
        .trace_processor
        .main_thread_top_level_events(&processed);
    let timing = sum_of_blocking_time(timeline, BLOCKING_THRESHOLD_MS, window);

    tracing::debug!(
        "Observed blocking time {:.1}ms over {} ({} tasks)",
        timing,
        window,
        timeline.len()
    );
    Ok(MetricResult::new(timing))
}
