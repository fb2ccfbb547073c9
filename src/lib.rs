//! blocktime - Total Blocking Time from recorded or simulated timelines
//!
//! This library computes Total Blocking Time (TBT), the sum over main-thread
//! tasks of the time each one runs past a 50ms blocking threshold, restricted
//! to a window of interest. The metric is available in two modes:
//!
//! - **observed**: from a recorded trace, windowed `[FCP, TTI]` for page loads
//!   or `[0, traceEnd]` otherwise
//! - **simulated**: from a simulation collaborator's predicted timeline
//!
//! Every metric is memoized per [`context::ComputeContext`]: the same inputs
//! are computed once, and concurrent requests share the in-flight result.
//!
//! # Example
//!
//! ```
//! use blocktime::artifacts::{GatherContext, GatherMode, MetricInputs, Settings, Trace};
//! use blocktime::context::ComputeContext;
//! use blocktime::metric::{total_blocking_time, Mode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let trace: Trace = serde_json::from_str(r#"{ "traceEvents": [
//!     { "name": "thread_name", "ph": "M", "ts": 0, "pid": 1, "tid": 1,
//!       "args": { "name": "CrRendererMain" } },
//!     { "name": "RunTask", "ph": "X", "ts": 0, "dur": 120000, "pid": 1, "tid": 1 },
//!     { "name": "RunTask", "ph": "X", "ts": 400000, "dur": 30000, "pid": 1, "tid": 1 }
//! ] }"#)?;
//!
//! let inputs = MetricInputs::new(
//!     GatherContext { gather_mode: GatherMode::Timespan },
//!     Settings::default(),
//! )?
//! .with_trace(trace)?;
//!
//! let ctx = ComputeContext::default();
//! let tbt = total_blocking_time(Mode::Observed, &inputs, &ctx)?;
//! assert_eq!(tbt.timing, 70.0);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod blocking;
pub mod cache;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod error;
pub mod metric;
pub mod report;
pub mod timeline;
pub mod window;

pub use error::{MetricError, Result};
