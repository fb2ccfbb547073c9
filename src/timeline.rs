//! Main-thread task timelines and time windows
//!
//! All timings are milliseconds relative to the trace's time origin.
//!
//! Malformed timing is rejected at construction: a [`TaskInterval`] with a
//! negative or non-finite field cannot exist, so everything downstream of the
//! constructors (the blocking-time aggregator in particular) is total.

use crate::error::{MetricError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One uninterrupted main-thread execution span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTaskInterval")]
pub struct TaskInterval {
    start: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct RawTaskInterval {
    start: f64,
    duration: f64,
}

impl TryFrom<RawTaskInterval> for TaskInterval {
    type Error = MetricError;

    fn try_from(raw: RawTaskInterval) -> Result<Self> {
        TaskInterval::new(raw.start, raw.duration)
    }
}

impl TaskInterval {
    /// Create a task interval
    ///
    /// # Errors
    ///
    /// Returns `MalformedTimeline` if either value is negative, NaN or infinite.
    pub fn new(start: f64, duration: f64) -> Result<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(MetricError::MalformedTimeline(format!(
                "task start must be a non-negative finite number, got {}",
                start
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(MetricError::MalformedTimeline(format!(
                "task duration must be a non-negative finite number, got {}",
                duration
            )));
        }
        Ok(Self { start, duration })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Half-open time range `[begin, end)` over which blocking time counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window {
    begin: f64,
    end: f64,
}

impl Window {
    /// Create a window, rejecting `begin > end` and non-finite bounds
    pub fn new(begin: f64, end: f64) -> Result<Self> {
        if !begin.is_finite() || !end.is_finite() || begin > end {
            return Err(MetricError::InvalidWindow { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> f64 {
        self.begin
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}ms, {:.1}ms)", self.begin, self.end)
    }
}

/// Tasks ordered by start time (non-decreasing)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TaskInterval>", into = "Vec<TaskInterval>")]
pub struct Timeline {
    tasks: Vec<TaskInterval>,
}

impl Timeline {
    /// Build a timeline, ordering the tasks by start time
    ///
    /// The sort is stable, so tasks sharing a start keep their input order.
    pub fn new(mut tasks: Vec<TaskInterval>) -> Self {
        tasks.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { tasks }
    }

    /// Build a timeline from `(start, duration)` pairs
    ///
    /// # Example
    /// ```
    /// use blocktime::timeline::Timeline;
    ///
    /// let timeline = Timeline::from_pairs(&[(200.0, 20.0), (0.0, 60.0)]).unwrap();
    /// assert_eq!(timeline.len(), 2);
    /// assert_eq!(timeline.tasks()[0].start(), 0.0);
    /// ```
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let tasks = pairs
            .iter()
            .map(|&(start, duration)| TaskInterval::new(start, duration))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tasks))
    }

    pub fn tasks(&self) -> &[TaskInterval] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskInterval> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl From<Vec<TaskInterval>> for Timeline {
    fn from(tasks: Vec<TaskInterval>) -> Self {
        Timeline::new(tasks)
    }
}

impl From<Timeline> for Vec<TaskInterval> {
    fn from(timeline: Timeline) -> Self {
        timeline.tasks
    }
}
