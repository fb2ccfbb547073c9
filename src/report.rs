//! Output formats for computed metrics

use crate::artifacts::GatherMode;
use crate::cache::CacheStats;
use crate::metric::{MetricResult, Mode};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Machine-readable report for `--format json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricReport {
    pub metric: String,
    pub mode: Mode,
    pub gather_mode: GatherMode,
    /// Total Blocking Time (ms)
    pub timing_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<ReportCacheStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportCacheStats {
    pub metric_computations: u64,
    pub metric_hits: u64,
    pub metric_joins: u64,
    pub trace_computations: u64,
}

impl ReportCacheStats {
    pub fn new(metrics: CacheStats, traces: CacheStats) -> Self {
        Self {
            metric_computations: metrics.computations,
            metric_hits: metrics.hits,
            metric_joins: metrics.joins,
            trace_computations: traces.computations,
        }
    }
}

impl MetricReport {
    pub fn total_blocking_time(mode: Mode, gather_mode: GatherMode, result: &MetricResult) -> Self {
        Self {
            metric: "total-blocking-time".to_string(),
            mode,
            gather_mode,
            timing_ms: result.timing,
            cache: None,
        }
    }

    pub fn with_cache_stats(mut self, stats: ReportCacheStats) -> Self {
        self.cache = Some(stats);
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = format!(
            "Total Blocking Time ({}, {}): {:.0} ms\n",
            self.mode, self.gather_mode, self.timing_ms
        );
        if let Some(cache) = &self.cache {
            let _ = writeln!(
                out,
                "cache: {} metric computations, {} hits, {} joins, {} trace computations",
                cache.metric_computations,
                cache.metric_hits,
                cache.metric_joins,
                cache.trace_computations
            );
        }
        out
    }
}
