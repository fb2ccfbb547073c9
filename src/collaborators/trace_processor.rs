// Chrome trace processing
//
// Picks the renderer main thread, anchors times to the navigation (or the
// start of the recording) and extracts the top-level tasks that the
// blocking-time and interactive computations run over.

use super::{ProcessedTrace, TraceProcessor};
use crate::artifacts::{Trace, TraceEvent};
use crate::error::{MetricError, Result};
use crate::timeline::{TaskInterval, Timeline};
use std::collections::HashMap;

/// Event names Chrome uses for a top-level scheduler task
pub const TOP_LEVEL_TASK_NAMES: &[&str] = &[
    "RunTask",
    "ThreadControllerImpl::RunTask",
    "ThreadControllerImpl::DoWork",
    "TaskQueueManager::ProcessTaskFromWorkQueue",
];

const MAIN_THREAD_NAME: &str = "CrRendererMain";
const NAVIGATION_START: &str = "navigationStart";
const TRACING_STARTED: &str = "TracingStartedInBrowser";
const FIRST_CONTENTFUL_PAINT: &str = "firstContentfulPaint";

/// Reference [`TraceProcessor`] for the Chrome trace event format
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTraceProcessor;

fn is_metadata(event: &TraceEvent) -> bool {
    event.ph == "M"
}

fn is_top_level_task(event: &TraceEvent) -> bool {
    event.ph == "X" && event.dur.is_some() && TOP_LEVEL_TASK_NAMES.contains(&event.name.as_str())
}

/// Renderer main thread as `(pid, tid)`
///
/// With several renderers in the trace, the one doing the most top-level work
/// wins.
fn find_main_thread(events: &[TraceEvent]) -> Option<(u64, u64)> {
    let candidates: Vec<(u64, u64)> = events
        .iter()
        .filter(|e| is_metadata(e) && e.name == "thread_name")
        .filter(|e| e.args.get("name").and_then(|n| n.as_str()) == Some(MAIN_THREAD_NAME))
        .map(|e| (e.pid, e.tid))
        .collect();

    if candidates.len() <= 1 {
        return candidates.first().copied();
    }

    let mut busy: HashMap<(u64, u64), f64> = HashMap::new();
    for event in events.iter().filter(|e| is_top_level_task(e)) {
        *busy.entry((event.pid, event.tid)).or_default() += event.dur.unwrap_or(0.0);
    }

    candidates.into_iter().max_by(|a, b| {
        let a_busy = busy.get(a).copied().unwrap_or(0.0);
        let b_busy = busy.get(b).copied().unwrap_or(0.0);
        a_busy.total_cmp(&b_busy)
    })
}

fn first_ts_named<'a>(events: impl Iterator<Item = &'a TraceEvent>, name: &str) -> Option<f64> {
    events
        .filter(|e| e.name == name)
        .map(|e| e.ts)
        .reduce(f64::min)
}

fn time_origin(events: &[TraceEvent], main_pid: u64) -> f64 {
    first_ts_named(events.iter().filter(|e| e.pid == main_pid), NAVIGATION_START)
        .or_else(|| first_ts_named(events.iter(), TRACING_STARTED))
        .or_else(|| {
            events
                .iter()
                .filter(|e| !is_metadata(e))
                .map(|e| e.ts)
                .reduce(f64::min)
        })
        .unwrap_or(0.0)
}

fn us_to_ms(us: f64) -> f64 {
    us / 1000.0
}

impl TraceProcessor for ChromeTraceProcessor {
    fn process(&self, trace: &Trace) -> Result<ProcessedTrace> {
        let events = &trace.trace_events;
        if events.iter().all(is_metadata) {
            return Ok(ProcessedTrace::default());
        }

        let (main_pid, main_tid) = find_main_thread(events).ok_or(MetricError::NoMainThread)?;
        let origin = time_origin(events, main_pid);

        let mut candidates: Vec<&TraceEvent> = events
            .iter()
            .filter(|e| is_top_level_task(e) && e.pid == main_pid && e.tid == main_tid)
            .filter(|e| e.ts >= origin)
            .collect();
        // Complete events are written when they end, so a child sharing its
        // parent's start is listed first; the longer event must come first
        candidates.sort_by(|a, b| {
            a.ts.total_cmp(&b.ts)
                .then(b.dur.unwrap_or(0.0).total_cmp(&a.dur.unwrap_or(0.0)))
        });

        let mut tasks = Vec::with_capacity(candidates.len());
        let mut last_end = f64::NEG_INFINITY;
        for event in candidates {
            let dur = event.dur.unwrap_or(0.0);
            // Tasks nested inside an earlier top-level task are not top level
            if event.ts < last_end {
                continue;
            }
            tasks.push(TaskInterval::new(us_to_ms(event.ts - origin), us_to_ms(dur))?);
            last_end = event.ts + dur;
        }

        let trace_end = events
            .iter()
            .filter(|e| !is_metadata(e))
            .map(|e| e.ts + e.dur.unwrap_or(0.0))
            .reduce(f64::max)
            .map(|end| us_to_ms(end - origin).max(0.0));

        let first_contentful_paint = first_ts_named(
            events.iter().filter(|e| e.pid == main_pid && e.ts >= origin),
            FIRST_CONTENTFUL_PAINT,
        )
        .map(|ts| us_to_ms(ts - origin));

        tracing::debug!(
            "Processed trace: main thread {}:{}, {} top-level tasks, trace end {:?}ms, FCP {:?}ms",
            main_pid,
            main_tid,
            tasks.len(),
            trace_end,
            first_contentful_paint
        );

        Ok(ProcessedTrace {
            time_origin_us: origin,
            main_thread_tasks: Timeline::new(tasks),
            trace_end,
            first_contentful_paint,
        })
    }
}
