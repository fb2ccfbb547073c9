//! Engine configuration (blocktime.toml)
//!
//! # Example blocktime.toml
//!
//! ```toml
//! [interactive]
//! quiet_window_ms = 5000
//! long_task_threshold_ms = 50
//!
//! [simulation]
//! rtt_ms = 150
//! throughput_kbps = 1638.4
//! cpu_slowdown_multiplier = 4
//! ```

use crate::artifacts::SimulatorOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for the reference time-to-interactive provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveConfig {
    /// Length of main-thread quiet required after the last long task (ms)
    pub quiet_window_ms: f64,

    /// Tasks longer than this break a quiet window (ms)
    pub long_task_threshold_ms: f64,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            quiet_window_ms: 5000.0,
            long_task_threshold_ms: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub interactive: InteractiveConfig,

    /// Simulator options used when the input artifacts carry none
    pub simulation: SimulatorOptions,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use blocktime::config::EngineConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = EngineConfig::from_file("blocktime.toml")?;
    /// println!("Quiet window: {}ms", config.interactive.quiet_window_ms);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.interactive.quiet_window_ms.is_finite() || self.interactive.quiet_window_ms <= 0.0
        {
            return Err(format!(
                "interactive.quiet_window_ms must be positive, got {}",
                self.interactive.quiet_window_ms
            ));
        }

        if !self.interactive.long_task_threshold_ms.is_finite()
            || self.interactive.long_task_threshold_ms < 0.0
        {
            return Err(format!(
                "interactive.long_task_threshold_ms must be non-negative, got {}",
                self.interactive.long_task_threshold_ms
            ));
        }

        self.simulation
            .validate()
            .map_err(|e| format!("simulation: {}", e))
    }
}
