//! Collaborators the metric engine consumes
//!
//! Trace processing, time-to-interactive and simulation sit behind traits so
//! the engine only sees their results. The implementations in this module are
//! reference ones that make the crate usable end to end from the CLI:
//!
//! - [`ChromeTraceProcessor`]: Chrome trace events to a main-thread timeline
//! - [`QuietWindowInteractive`]: CPU quiet-window time-to-interactive
//! - [`LanternBlockingTime`] + [`CpuThrottledReplay`]: simulated blocking time

mod interactive;
mod lantern;
mod trace_processor;

pub use interactive::{find_interactive, QuietWindowInteractive};
pub use lantern::{
    replay_with_cpu_slowdown, CpuThrottledReplay, LanternBlockingTime, SimulatedTimeline,
    Simulator,
};
pub use trace_processor::{ChromeTraceProcessor, TOP_LEVEL_TASK_NAMES};

use crate::artifacts::{MetricInputs, Trace};
use crate::config::EngineConfig;
use crate::context::ComputeContext;
use crate::error::Result;
use crate::metric::MetricResult;
use crate::timeline::Timeline;
use std::sync::Arc;

/// A trace reduced to what the metrics need
///
/// Times are milliseconds relative to `time_origin_us`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessedTrace {
    /// Time origin of the trace (microseconds, trace clock)
    pub time_origin_us: f64,
    /// Top-level main-thread tasks at or after the time origin
    pub main_thread_tasks: Timeline,
    /// Latest event end, `None` for a trace without timed events
    pub trace_end: Option<f64>,
    /// First contentful paint, when the trace recorded one
    pub first_contentful_paint: Option<f64>,
}

/// Turns a raw trace into a [`ProcessedTrace`]
pub trait TraceProcessor: Send + Sync {
    fn process(&self, trace: &Trace) -> Result<ProcessedTrace>;

    /// Top-level main-thread tasks, sorted by start
    ///
    /// Never fails: a trace without tasks yields an empty timeline.
    fn main_thread_top_level_events<'a>(&self, processed: &'a ProcessedTrace) -> &'a Timeline {
        &processed.main_thread_tasks
    }
}

/// Determines time-to-interactive for a page load
pub trait InteractiveTimeProvider: Send + Sync {
    fn request(&self, inputs: &MetricInputs, ctx: &ComputeContext) -> Result<MetricResult>;
}

/// Estimates Total Blocking Time from a simulated page load
pub trait SimulationProvider: Send + Sync {
    fn request(&self, inputs: &MetricInputs, ctx: &ComputeContext) -> Result<MetricResult>;
}

/// The set of collaborators a [`ComputeContext`] dispatches to
#[derive(Clone)]
pub struct Collaborators {
    pub trace_processor: Arc<dyn TraceProcessor>,
    pub interactive: Arc<dyn InteractiveTimeProvider>,
    pub simulation: Arc<dyn SimulationProvider>,
}

impl Collaborators {
    /// Reference collaborators configured from `config`
    pub fn reference(config: &EngineConfig) -> Self {
        Self {
            trace_processor: Arc::new(ChromeTraceProcessor),
            interactive: Arc::new(QuietWindowInteractive::new(
                config.interactive.quiet_window_ms,
                config.interactive.long_task_threshold_ms,
            )),
            simulation: Arc::new(LanternBlockingTime::new(CpuThrottledReplay)),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::reference(&EngineConfig::default())
    }
}
