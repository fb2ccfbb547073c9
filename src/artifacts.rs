//! Input artifacts for metric computation
//!
//! Artifacts are immutable once created. Each one is fingerprinted when it is
//! wrapped in an [`Artifact`], and the fingerprint is what cache keys are
//! derived from, so two structurally identical artifacts share cached results
//! while cloning an artifact never changes its identity.

use crate::error::{MetricError, Result};
use anyhow::Context;
use fnv::FnvHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::hash::Hasher;
use std::io;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// Input fields a metric can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    DevtoolsLog,
    GatherContext,
    Settings,
    Simulator,
    Trace,
    Url,
}

impl Dependency {
    pub fn name(&self) -> &'static str {
        match self {
            Dependency::DevtoolsLog => "devtoolsLog",
            Dependency::GatherContext => "gatherContext",
            Dependency::Settings => "settings",
            Dependency::Simulator => "simulator",
            Dependency::Trace => "trace",
            Dependency::Url => "URL",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content fingerprint of an artifact (FNV-1a over its canonical JSON)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(u64);

impl ArtifactId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Streams serializer output straight into the hasher
struct FingerprintWriter(FnvHasher);

impl io::Write for FingerprintWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Hasher::write(&mut self.0, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn fingerprint<T: Serialize>(kind: Dependency, value: &T) -> Result<ArtifactId> {
    let mut writer = FingerprintWriter(FnvHasher::default());
    Hasher::write(&mut writer.0, kind.name().as_bytes());
    serde_json::to_writer(&mut writer, value).map_err(|e| MetricError::Fingerprint {
        artifact: kind.name(),
        message: e.to_string(),
    })?;
    Ok(ArtifactId(writer.0.finish()))
}

/// An immutable, shareable, fingerprinted input
#[derive(Debug)]
pub struct Artifact<T> {
    id: ArtifactId,
    value: Arc<T>,
}

impl<T> Clone for Artifact<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: Serialize> Artifact<T> {
    fn new(kind: Dependency, value: T) -> Result<Self> {
        let id = fingerprint(kind, &value)?;
        Ok(Self {
            id,
            value: Arc::new(value),
        })
    }
}

impl<T> Artifact<T> {
    pub fn id(&self) -> ArtifactId {
        self.id
    }
}

impl<T> Deref for Artifact<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// How the artifacts were gathered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatherMode {
    /// Full page load from navigation start
    Navigation,
    /// Recording of user-driven activity over a period of time
    Timespan,
    /// Point-in-time capture, no timeline activity
    Snapshot,
}

impl fmt::Display for GatherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatherMode::Navigation => "navigation",
            GatherMode::Timespan => "timespan",
            GatherMode::Snapshot => "snapshot",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherContext {
    pub gather_mode: GatherMode,
}

/// How throttling was applied when the artifacts were gathered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottlingMethod {
    /// Gathered unthrottled, throttling is estimated by simulation
    #[default]
    Simulate,
    /// Throttling applied by the browser during gathering
    Devtools,
    /// Environment already throttled, nothing applied
    Provided,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub throttling_method: ThrottlingMethod,
}

/// Network and CPU characteristics for simulated metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorOptions {
    /// Round-trip time (ms)
    pub rtt_ms: f64,
    /// Downlink throughput (Kbps)
    pub throughput_kbps: f64,
    /// Factor applied to main-thread CPU time
    pub cpu_slowdown_multiplier: f64,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            rtt_ms: 150.0,
            throughput_kbps: 1638.4,
            cpu_slowdown_multiplier: 4.0,
        }
    }
}

impl SimulatorOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.rtt_ms.is_finite() || self.rtt_ms < 0.0 {
            return Err(MetricError::InvalidSimulator(format!(
                "rtt_ms must be non-negative, got {}",
                self.rtt_ms
            )));
        }
        if !self.throughput_kbps.is_finite() || self.throughput_kbps <= 0.0 {
            return Err(MetricError::InvalidSimulator(format!(
                "throughput_kbps must be positive, got {}",
                self.throughput_kbps
            )));
        }
        if !self.cpu_slowdown_multiplier.is_finite() || self.cpu_slowdown_multiplier < 1.0 {
            return Err(MetricError::InvalidSimulator(format!(
                "cpu_slowdown_multiplier must be >= 1, got {}",
                self.cpu_slowdown_multiplier
            )));
        }
        Ok(())
    }
}

/// One Chrome trace event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub name: String,
    #[serde(default)]
    pub cat: String,
    /// Phase (`X` complete, `I`/`R` instant or mark, `M` metadata, ...)
    pub ph: String,
    /// Timestamp (microseconds)
    pub ts: f64,
    /// Duration of complete events (microseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<f64>,
    pub pid: u64,
    pub tid: u64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub args: serde_json::Value,
}

/// A recorded performance trace
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "traceEvents")]
    pub trace_events: Vec<TraceEvent>,
}

/// DevTools protocol messages recorded alongside the trace
pub type DevtoolsLog = Vec<serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UrlArtifact {
    #[serde(default)]
    pub requested_url: Option<String>,
    #[serde(default)]
    pub main_document_url: Option<String>,
    #[serde(default)]
    pub final_displayed_url: String,
}

/// Typed inputs handed to every metric computation
#[derive(Debug, Clone)]
pub struct MetricInputs {
    pub gather_context: Artifact<GatherContext>,
    pub settings: Artifact<Settings>,
    pub devtools_log: Option<Artifact<DevtoolsLog>>,
    pub simulator: Option<Artifact<SimulatorOptions>>,
    pub trace: Option<Artifact<Trace>>,
    pub url: Option<Artifact<UrlArtifact>>,
}

impl MetricInputs {
    pub fn new(gather_context: GatherContext, settings: Settings) -> Result<Self> {
        Ok(Self {
            gather_context: Artifact::new(Dependency::GatherContext, gather_context)?,
            settings: Artifact::new(Dependency::Settings, settings)?,
            devtools_log: None,
            simulator: None,
            trace: None,
            url: None,
        })
    }

    pub fn with_trace(mut self, trace: Trace) -> Result<Self> {
        self.trace = Some(Artifact::new(Dependency::Trace, trace)?);
        Ok(self)
    }

    pub fn with_devtools_log(mut self, log: DevtoolsLog) -> Result<Self> {
        self.devtools_log = Some(Artifact::new(Dependency::DevtoolsLog, log)?);
        Ok(self)
    }

    pub fn with_simulator(mut self, options: SimulatorOptions) -> Result<Self> {
        options.validate()?;
        self.simulator = Some(Artifact::new(Dependency::Simulator, options)?);
        Ok(self)
    }

    pub fn with_url(mut self, url: UrlArtifact) -> Result<Self> {
        self.url = Some(Artifact::new(Dependency::Url, url)?);
        Ok(self)
    }

    pub fn gather_mode(&self) -> GatherMode {
        self.gather_context.gather_mode
    }

    /// Identity of one input field, `None` when the field is absent
    pub fn artifact_id(&self, dependency: Dependency) -> Option<ArtifactId> {
        match dependency {
            Dependency::DevtoolsLog => self.devtools_log.as_ref().map(Artifact::id),
            Dependency::GatherContext => Some(self.gather_context.id()),
            Dependency::Settings => Some(self.settings.id()),
            Dependency::Simulator => self.simulator.as_ref().map(Artifact::id),
            Dependency::Trace => self.trace.as_ref().map(Artifact::id),
            Dependency::Url => self.url.as_ref().map(Artifact::id),
        }
    }

    pub fn trace(&self) -> Result<&Artifact<Trace>> {
        self.trace
            .as_ref()
            .ok_or(MetricError::MissingDependency(Dependency::Trace))
    }

    pub fn simulator(&self) -> Result<&Artifact<SimulatorOptions>> {
        self.simulator
            .as_ref()
            .ok_or(MetricError::MissingDependency(Dependency::Simulator))
    }
}

/// On-disk JSON form of [`MetricInputs`]
///
/// # Example JSON
///
/// ```json
/// {
///   "gather_context": { "gather_mode": "navigation" },
///   "settings": { "throttling_method": "simulate" },
///   "url": { "final_displayed_url": "https://example.com/" },
///   "trace": { "traceEvents": [] }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub gather_context: GatherContext,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub devtools_log: Option<DevtoolsLog>,
    #[serde(default)]
    pub simulator: Option<SimulatorOptions>,
    #[serde(default)]
    pub trace: Option<Trace>,
    #[serde(default)]
    pub url: Option<UrlArtifact>,
}

impl ArtifactBundle {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load artifacts from {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        serde_json::from_str(content).context("Failed to parse artifact bundle JSON")
    }

    /// Fingerprint every artifact and build the computation inputs
    ///
    /// `default_simulator` fills in the simulator options when the bundle
    /// does not carry its own.
    pub fn into_inputs(self, default_simulator: Option<SimulatorOptions>) -> Result<MetricInputs> {
        let mut inputs = MetricInputs::new(self.gather_context, self.settings)?;
        if let Some(trace) = self.trace {
            inputs = inputs.with_trace(trace)?;
        }
        if let Some(log) = self.devtools_log {
            inputs = inputs.with_devtools_log(log)?;
        }
        if let Some(simulator) = self.simulator.or(default_simulator) {
            inputs = inputs.with_simulator(simulator)?;
        }
        if let Some(url) = self.url {
            inputs = inputs.with_url(url)?;
        }
        Ok(inputs)
    }
}
