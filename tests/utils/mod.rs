// Integration Test Utilities
//
// Builders for Chrome traces and artifact bundles shared by the integration
// tests. Times passed in are milliseconds relative to the navigation start.
#![allow(dead_code)]

use blocktime::artifacts::{
    ArtifactBundle, GatherContext, GatherMode, MetricInputs, Settings, SimulatorOptions,
    ThrottlingMethod, Trace,
};
use serde_json::{json, Value};

pub const PID: u64 = 1;
pub const TID: u64 = 7;
/// Trace clock at navigation start (microseconds)
pub const NAVIGATION_START_US: f64 = 1_000_000.0;

fn ts(ms: f64) -> f64 {
    NAVIGATION_START_US + ms * 1000.0
}

/// Chrome trace builder for a single renderer main thread
#[derive(Debug, Default)]
pub struct TraceBuilder {
    events: Vec<Value>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.events.push(json!({
            "name": "thread_name", "ph": "M", "ts": 0, "pid": PID, "tid": TID,
            "args": { "name": "CrRendererMain" }
        }));
        builder
    }

    pub fn navigation_start(mut self) -> Self {
        self.events.push(json!({
            "name": "navigationStart", "cat": "blink.user_timing", "ph": "R",
            "ts": NAVIGATION_START_US, "pid": PID, "tid": TID
        }));
        self
    }

    pub fn first_contentful_paint(mut self, at_ms: f64) -> Self {
        self.events.push(json!({
            "name": "firstContentfulPaint", "cat": "loading", "ph": "R",
            "ts": ts(at_ms), "pid": PID, "tid": TID
        }));
        self
    }

    pub fn task(mut self, start_ms: f64, duration_ms: f64) -> Self {
        self.events.push(json!({
            "name": "RunTask", "cat": "toplevel", "ph": "X",
            "ts": ts(start_ms), "dur": duration_ms * 1000.0, "pid": PID, "tid": TID
        }));
        self
    }

    pub fn to_value(&self) -> Value {
        json!({ "traceEvents": self.events })
    }

    pub fn build(&self) -> Trace {
        serde_json::from_value(self.to_value()).unwrap()
    }
}

/// Page load with FCP at 1000ms and TTI at 2060ms
///
/// Observed TBT is 110ms (100ms + 10ms inside the window). With a 4x CPU
/// slowdown the replayed window is `[1300, 2990]` and the simulated TBT is
/// 740ms.
pub fn navigation_trace() -> TraceBuilder {
    TraceBuilder::new()
        .navigation_start()
        .first_contentful_paint(1000.0)
        .task(500.0, 100.0)
        .task(1200.0, 150.0)
        .task(2000.0, 60.0)
        .task(2500.0, 30.0)
        .task(9000.0, 10.0)
}

pub fn settings(throttling_method: ThrottlingMethod) -> Settings {
    Settings { throttling_method }
}

pub fn inputs(gather_mode: GatherMode, trace: Trace) -> MetricInputs {
    MetricInputs::new(GatherContext { gather_mode }, Settings::default())
        .unwrap()
        .with_trace(trace)
        .unwrap()
}

pub fn simulated_inputs(trace: Trace) -> MetricInputs {
    inputs(GatherMode::Navigation, trace)
        .with_simulator(SimulatorOptions::default())
        .unwrap()
}

/// Artifact bundle JSON as read by the CLI
pub fn bundle_json(gather_mode: &str, throttling_method: &str, trace: &TraceBuilder) -> String {
    let bundle = json!({
        "gather_context": { "gather_mode": gather_mode },
        "settings": { "throttling_method": throttling_method },
        "url": { "final_displayed_url": "https://example.com/" },
        "trace": trace.to_value(),
    });
    let text = serde_json::to_string_pretty(&bundle).unwrap();
    // Sanity check: the fixture must parse as a bundle
    ArtifactBundle::from_json_str(&text).unwrap();
    text
}
