// Simulated Total Blocking Time
//
// `LanternBlockingTime` turns any simulated timeline into a blocking-time
// estimate using the same aggregator as the observed metric, with the window
// taken from the simulation's own FCP and interactive estimates.
//
// `CpuThrottledReplay` is the reference simulator: it replays the recorded
// main thread as if the CPU were `cpu_slowdown_multiplier` times slower.
// Every task is stretched by the multiplier, idle gaps keep their length,
// and FCP / interactive move later by the extra CPU time that precedes them.

use super::SimulationProvider;
use crate::artifacts::{GatherMode, MetricInputs};
use crate::blocking::{sum_of_blocking_time, BLOCKING_THRESHOLD_MS};
use crate::context::ComputeContext;
use crate::error::{MetricError, Result};
use crate::metric::{MetricKind, MetricResult};
use crate::timeline::{TaskInterval, Timeline, Window};

/// Main-thread activity predicted by a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTimeline {
    pub tasks: Timeline,
    pub first_contentful_paint: f64,
    pub interactive: f64,
}

/// Produces a simulated page load for the given inputs
pub trait Simulator: Send + Sync {
    fn simulate(&self, inputs: &MetricInputs, ctx: &ComputeContext) -> Result<SimulatedTimeline>;
}

/// [`SimulationProvider`] computing blocking time over a [`Simulator`]'s output
#[derive(Debug, Clone, Default)]
pub struct LanternBlockingTime<S> {
    simulator: S,
}

impl<S: Simulator> LanternBlockingTime<S> {
    pub fn new(simulator: S) -> Self {
        Self { simulator }
    }
}

impl<S: Simulator> SimulationProvider for LanternBlockingTime<S> {
    fn request(&self, inputs: &MetricInputs, ctx: &ComputeContext) -> Result<MetricResult> {
        let simulated = self.simulator.simulate(inputs, ctx)?;
        let window = Window::new(simulated.first_contentful_paint, simulated.interactive)?;
        let timing = sum_of_blocking_time(&simulated.tasks, BLOCKING_THRESHOLD_MS, window);
        tracing::debug!(
            "Simulated blocking time {:.1}ms over {} ({} tasks)",
            timing,
            window,
            simulated.tasks.len()
        );
        Ok(MetricResult::new(timing))
    }
}

/// Reference [`Simulator`]: CPU-throttled replay of the recorded main thread
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuThrottledReplay;

/// CPU time added before `t` when every task runs `multiplier` times longer
fn added_cpu_time(timeline: &Timeline, multiplier: f64, t: f64) -> f64 {
    let busy: f64 = timeline
        .iter()
        .take_while(|task| task.start() < t)
        .map(|task| task.end().min(t) - task.start())
        .sum();
    busy * (multiplier - 1.0)
}

/// Replay a timeline with every task slowed down by `multiplier`
///
/// Tasks are assumed not to overlap, as on a single main thread.
///
/// # Example
/// ```
/// use blocktime::collaborators::replay_with_cpu_slowdown;
/// use blocktime::timeline::Timeline;
///
/// let timeline = Timeline::from_pairs(&[(0.0, 40.0), (100.0, 10.0)]).unwrap();
/// let replay = replay_with_cpu_slowdown(&timeline, 2.0, 50.0, 200.0).unwrap();
///
/// // First task doubles to 80ms and pushes everything after it by 40ms
/// assert_eq!(replay.tasks.tasks()[0].duration(), 80.0);
/// assert_eq!(replay.tasks.tasks()[1].start(), 140.0);
/// assert_eq!(replay.first_contentful_paint, 90.0);
/// assert_eq!(replay.interactive, 250.0);
/// ```
pub fn replay_with_cpu_slowdown(
    timeline: &Timeline,
    multiplier: f64,
    first_contentful_paint: f64,
    interactive: f64,
) -> Result<SimulatedTimeline> {
    let mut busy = 0.0;
    let mut tasks = Vec::with_capacity(timeline.len());
    for task in timeline.iter() {
        tasks.push(TaskInterval::new(
            task.start() + busy * (multiplier - 1.0),
            task.duration() * multiplier,
        )?);
        busy += task.duration();
    }

    Ok(SimulatedTimeline {
        tasks: Timeline::new(tasks),
        first_contentful_paint: first_contentful_paint
            + added_cpu_time(timeline, multiplier, first_contentful_paint),
        interactive: interactive + added_cpu_time(timeline, multiplier, interactive),
    })
}

impl Simulator for CpuThrottledReplay {
    fn simulate(&self, inputs: &MetricInputs, ctx: &ComputeContext) -> Result<SimulatedTimeline> {
        let gather_mode = inputs.gather_mode();
        if gather_mode != GatherMode::Navigation {
            return Err(MetricError::NavigationRequired {
                metric: "Simulated TotalBlockingTime",
                gather_mode: gather_mode.to_string(),
            });
        }

        let options = inputs.simulator()?;
        let processed = ctx.processed_trace(inputs)?;
        let fcp = processed
            .first_contentful_paint
            .ok_or(MetricError::NoFirstContentfulPaint)?;
        let interactive = ctx.request(MetricKind::Interactive, inputs)?;
        let timeline = ctx
            .collaborators()
            .trace_processor
            .main_thread_top_level_events(&processed);

        replay_with_cpu_slowdown(
            timeline,
            options.cpu_slowdown_multiplier,
            fcp,
            interactive.timing,
        )
    }
}
