//! Observed-mode window resolution
//!
//! A navigation counts blocking time between first contentful paint and
//! time-to-interactive. Anything else (a timespan recording, for instance)
//! counts from the time origin to the end of the trace.

use crate::error::{MetricError, Result};
use crate::timeline::Window;
use serde::{Deserialize, Serialize};

/// Navigation timings extracted from a page-load trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    /// First contentful paint (ms since time origin)
    pub first_contentful_paint: f64,
}

/// Resolve the blocking-time window for an observed trace
///
/// # Arguments
/// * `navigation` - Navigation timings, present only for page loads
/// * `interactive` - Time-to-interactive; required when `navigation` is present
/// * `trace_end` - Last timestamp of the recording; required otherwise
///
/// # Example
/// ```
/// use blocktime::window::{resolve_window, NavigationTiming};
///
/// let nav = NavigationTiming { first_contentful_paint: 1200.0 };
/// let window = resolve_window(Some(&nav), Some(4800.0), Some(9000.0)).unwrap();
/// assert_eq!((window.begin(), window.end()), (1200.0, 4800.0));
///
/// let window = resolve_window(None, None, Some(500.0)).unwrap();
/// assert_eq!((window.begin(), window.end()), (0.0, 500.0));
/// ```
pub fn resolve_window(
    navigation: Option<&NavigationTiming>,
    interactive: Option<f64>,
    trace_end: Option<f64>,
) -> Result<Window> {
    let window = match navigation {
        Some(nav) => {
            let interactive = interactive.ok_or(MetricError::MissingInteractiveTime)?;
            Window::new(nav.first_contentful_paint, interactive)?
        }
        None => Window::new(0.0, trace_end.ok_or(MetricError::NoTraceEnd)?)?,
    };

    tracing::debug!("Resolved blocking window {}", window);
    Ok(window)
}
