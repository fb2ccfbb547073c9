//! Windowed blocking-time aggregation
//!
//! A main-thread task blocks input handling for every millisecond it runs past
//! the blocking threshold. Summing that excess over the tasks that overlap a
//! window gives Total Blocking Time.
//!
//! The blocking portion is measured over the **whole** task and only then
//! clipped to the part of the task inside the window: a 110ms task that
//! starts 80ms before the window opens has 60ms of blocking time, of which at
//! most the 30ms overlap is counted.

use crate::timeline::{TaskInterval, Timeline, Window};

/// Tasks at or below this duration never block (milliseconds)
pub const BLOCKING_THRESHOLD_MS: f64 = 50.0;

/// Blocking time a single task contributes to `window`
pub fn task_blocking_time(task: &TaskInterval, threshold: f64, window: Window) -> f64 {
    let overlap_start = task.start().max(window.begin());
    let overlap_end = task.end().min(window.end());
    if overlap_end <= overlap_start {
        return 0.0;
    }

    let blocking = (task.duration() - threshold).max(0.0);
    blocking.min(overlap_end - overlap_start)
}

/// Sum the blocking portions of every task overlapping `window`
///
/// # Example
/// ```
/// use blocktime::blocking::{sum_of_blocking_time, BLOCKING_THRESHOLD_MS};
/// use blocktime::timeline::{Timeline, Window};
///
/// let timeline = Timeline::from_pairs(&[(0.0, 60.0), (200.0, 20.0)]).unwrap();
/// let window = Window::new(0.0, 300.0).unwrap();
///
/// let tbt = sum_of_blocking_time(&timeline, BLOCKING_THRESHOLD_MS, window);
/// assert_eq!(tbt, 10.0);
/// ```
pub fn sum_of_blocking_time(timeline: &Timeline, threshold: f64, window: Window) -> f64 {
    if window.is_empty() {
        return 0.0;
    }

    timeline
        .iter()
        .take_while(|task| task.start() < window.end())
        .map(|task| task_blocking_time(task, threshold, window))
        .sum()
}
