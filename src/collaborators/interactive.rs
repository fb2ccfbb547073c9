// CPU quiet-window time-to-interactive
//
// The page is interactive at the end of the last long task that precedes a
// quiet window of `quiet_window_ms` with no long task, searching from first
// contentful paint. Network quiet is not considered.

use super::InteractiveTimeProvider;
use crate::artifacts::{GatherMode, MetricInputs};
use crate::context::ComputeContext;
use crate::error::{MetricError, Result};
use crate::metric::MetricResult;
use crate::timeline::Timeline;

/// Reference [`InteractiveTimeProvider`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuietWindowInteractive {
    quiet_window_ms: f64,
    long_task_threshold_ms: f64,
}

impl QuietWindowInteractive {
    pub fn new(quiet_window_ms: f64, long_task_threshold_ms: f64) -> Self {
        Self {
            quiet_window_ms,
            long_task_threshold_ms,
        }
    }
}

/// Find time-to-interactive in a main-thread timeline
///
/// # Errors
///
/// `NoQuietWindow` when the trace ends before a full quiet window elapses.
///
/// # Example
/// ```
/// use blocktime::collaborators::find_interactive;
/// use blocktime::timeline::Timeline;
///
/// // Long tasks at 1000ms and 2000ms, then nothing until the trace ends
/// let timeline = Timeline::from_pairs(&[(1000.0, 100.0), (2000.0, 200.0)]).unwrap();
/// let tti = find_interactive(&timeline, 500.0, 10_000.0, 5000.0, 50.0).unwrap();
/// assert_eq!(tti, 2200.0);
/// ```
pub fn find_interactive(
    timeline: &Timeline,
    first_contentful_paint: f64,
    trace_end: f64,
    quiet_window_ms: f64,
    long_task_threshold_ms: f64,
) -> Result<f64> {
    let mut candidate = first_contentful_paint;

    let long_tasks = timeline
        .iter()
        .filter(|task| task.duration() > long_task_threshold_ms)
        .filter(|task| task.end() > first_contentful_paint);

    for task in long_tasks {
        if task.start() - candidate >= quiet_window_ms {
            return Ok(candidate);
        }
        candidate = candidate.max(task.end());
    }

    if trace_end - candidate >= quiet_window_ms {
        Ok(candidate)
    } else {
        Err(MetricError::NoQuietWindow { quiet_window_ms })
    }
}

impl InteractiveTimeProvider for QuietWindowInteractive {
    fn request(&self, inputs: &MetricInputs, ctx: &ComputeContext) -> Result<MetricResult> {
        let gather_mode = inputs.gather_mode();
        if gather_mode != GatherMode::Navigation {
            return Err(MetricError::NavigationRequired {
                metric: "Interactive",
                gather_mode: gather_mode.to_string(),
            });
        }

        let processed = ctx.processed_trace(inputs)?;
        let fcp = processed
            .first_contentful_paint
            .ok_or(MetricError::NoFirstContentfulPaint)?;
        let trace_end = processed.trace_end.ok_or(MetricError::NoTraceEnd)?;
        let timeline = ctx
            .collaborators()
            .trace_processor
            .main_thread_top_level_events(&processed);

        let interactive = find_interactive(
            timeline,
            fcp,
            trace_end,
            self.quiet_window_ms,
            self.long_task_threshold_ms,
        )?;
        tracing::debug!("Time to interactive: {:.1}ms (FCP {:.1}ms)", interactive, fcp);

        Ok(MetricResult::new(interactive))
    }
}
