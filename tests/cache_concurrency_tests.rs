//! Memoization and concurrency tests through the public compute context
//!
//! Call-counting stub collaborators observe how often the engine actually
//! computes, independent of the cache's own counters.

mod utils;

use blocktime::artifacts::{GatherMode, MetricInputs, Trace, UrlArtifact};
use blocktime::collaborators::{
    Collaborators, InteractiveTimeProvider, ProcessedTrace, SimulationProvider, TraceProcessor,
};
use blocktime::context::ComputeContext;
use blocktime::error::Result;
use blocktime::metric::{total_blocking_time, MetricKind, MetricResult, Mode};
use blocktime::timeline::Timeline;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use utils::{inputs, navigation_trace, simulated_inputs};

#[derive(Default)]
struct CountingTraceProcessor {
    calls: AtomicUsize,
}

impl TraceProcessor for CountingTraceProcessor {
    fn process(&self, _trace: &Trace) -> Result<ProcessedTrace> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Widen the race window for concurrent callers
        thread::sleep(Duration::from_millis(20));
        Ok(ProcessedTrace {
            time_origin_us: 0.0,
            main_thread_tasks: Timeline::from_pairs(&[(100.0, 150.0), (400.0, 70.0)])?,
            trace_end: Some(1000.0),
            first_contentful_paint: Some(50.0),
        })
    }
}

#[derive(Default)]
struct CountingInteractive {
    calls: AtomicUsize,
}

impl InteractiveTimeProvider for CountingInteractive {
    fn request(&self, _inputs: &MetricInputs, _ctx: &ComputeContext) -> Result<MetricResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(MetricResult::new(450.0))
    }
}

#[derive(Default)]
struct CountingSimulation {
    calls: AtomicUsize,
}

impl SimulationProvider for CountingSimulation {
    fn request(&self, _inputs: &MetricInputs, _ctx: &ComputeContext) -> Result<MetricResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Ok(MetricResult::new(321.0))
    }
}

struct Stubs {
    trace: Arc<CountingTraceProcessor>,
    interactive: Arc<CountingInteractive>,
    simulation: Arc<CountingSimulation>,
}

impl Stubs {
    fn new() -> Self {
        Self {
            trace: Arc::new(CountingTraceProcessor::default()),
            interactive: Arc::new(CountingInteractive::default()),
            simulation: Arc::new(CountingSimulation::default()),
        }
    }

    fn context(&self) -> ComputeContext {
        ComputeContext::new(Collaborators {
            trace_processor: self.trace.clone(),
            interactive: self.interactive.clone(),
            simulation: self.simulation.clone(),
        })
    }

    fn calls(&self) -> (usize, usize, usize) {
        (
            self.trace.calls.load(Ordering::SeqCst),
            self.interactive.calls.load(Ordering::SeqCst),
            self.simulation.calls.load(Ordering::SeqCst),
        )
    }
}

#[test]
fn test_repeated_observed_requests_compute_once() {
    let stubs = Stubs::new();
    let ctx = stubs.context();
    let inputs = inputs(GatherMode::Navigation, navigation_trace().build());

    let first = total_blocking_time(Mode::Observed, &inputs, &ctx).unwrap();
    let second = total_blocking_time(Mode::Observed, &inputs, &ctx).unwrap();

    // Window [50, 450]: 100ms from the first task, 20ms from the second
    assert_eq!(first.timing, 120.0);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stubs.calls(), (1, 1, 0));
}

#[test]
fn test_structurally_equal_inputs_share_results() {
    let stubs = Stubs::new();
    let ctx = stubs.context();
    let a = inputs(GatherMode::Navigation, navigation_trace().build());
    let b = inputs(GatherMode::Navigation, navigation_trace().build());

    let first = total_blocking_time(Mode::Observed, &a, &ctx).unwrap();
    let second = total_blocking_time(Mode::Observed, &b, &ctx).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stubs.calls(), (1, 1, 0));
}

#[test]
fn test_changed_dependency_recomputes() {
    let stubs = Stubs::new();
    let ctx = stubs.context();
    let base = inputs(GatherMode::Navigation, navigation_trace().build());
    let with_url = base
        .clone()
        .with_url(UrlArtifact {
            final_displayed_url: "https://example.com/next".to_string(),
            ..UrlArtifact::default()
        })
        .unwrap();

    total_blocking_time(Mode::Observed, &base, &ctx).unwrap();
    total_blocking_time(Mode::Observed, &with_url, &ctx).unwrap();

    // URL is a metric dependency but not a trace-processing one
    assert_eq!(stubs.calls(), (1, 2, 0));
    assert_eq!(ctx.metric_cache_stats().computations, 4);
}

#[test]
fn test_separate_contexts_do_not_share() {
    let stubs = Stubs::new();
    let inputs = inputs(GatherMode::Navigation, navigation_trace().build());

    total_blocking_time(Mode::Observed, &inputs, &stubs.context()).unwrap();
    total_blocking_time(Mode::Observed, &inputs, &stubs.context()).unwrap();

    assert_eq!(stubs.calls(), (2, 2, 0));
}

#[test]
fn test_concurrent_observed_requests_coalesce() {
    const THREADS: usize = 12;

    let stubs = Stubs::new();
    let ctx = stubs.context();
    let inputs = Arc::new(inputs(GatherMode::Navigation, navigation_trace().build()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ctx = ctx.clone();
            let inputs = Arc::clone(&inputs);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                total_blocking_time(Mode::Observed, &inputs, &ctx).unwrap()
            })
        })
        .collect();

    let results: Vec<Arc<MetricResult>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(stubs.calls(), (1, 1, 0));
    assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    assert_eq!(results[0].timing, 120.0);
}

#[test]
fn test_concurrent_mixed_modes() {
    const THREADS: usize = 8;

    let stubs = Stubs::new();
    let ctx = stubs.context();
    let inputs = Arc::new(simulated_inputs(navigation_trace().build()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let ctx = ctx.clone();
            let inputs = Arc::clone(&inputs);
            let barrier = Arc::clone(&barrier);
            let mode = if i % 2 == 0 {
                Mode::Observed
            } else {
                Mode::Simulated
            };
            thread::spawn(move || {
                barrier.wait();
                (mode, total_blocking_time(mode, &inputs, &ctx).unwrap().timing)
            })
        })
        .collect();

    for handle in handles {
        let (mode, timing) = handle.join().unwrap();
        match mode {
            Mode::Observed => assert_eq!(timing, 120.0),
            Mode::Simulated => assert_eq!(timing, 321.0),
        }
    }
    assert_eq!(stubs.calls(), (1, 1, 1));
    assert!(ctx
        .metric_state(MetricKind::TotalBlockingTime(Mode::Simulated), &inputs)
        .is_some());
}
