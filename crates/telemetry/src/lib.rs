//! Logging setup, session correlation and in-process metrics
//!
//! - Structured logging with `tracing-subscriber`, compact or JSON, on stderr
//! - A per-process session id attached to every event
//! - Counters, gauges and timing histograms for a run summary

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use storefinder_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global metrics registry
static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize with default configuration
pub fn init() -> anyhow::Result<()> {
    init_with_config(&TelemetryConfig::default())
}

/// Initialize with custom configuration
///
/// `RUST_LOG`, when set, wins over `config.log_level`. Fails if a global
/// subscriber is already installed.
pub fn init_with_config(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", config.log_level, e))?;

    let json = config.json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(config.show_target)
            .with_writer(std::io::stderr)
    });
    let compact = (!config.json).then(|| {
        fmt::layer()
            .compact()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(compact)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Root span carrying the session id; enter it for the life of the process.
pub fn session_span() -> tracing::Span {
    tracing::info_span!("session", id = %session_id())
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// JSON lines instead of compact text
    pub json: bool,
    /// Include the event target
    pub show_target: bool,
    /// Include thread ids (compact only)
    pub show_thread_ids: bool,
    /// Include source file (compact only)
    pub show_file: bool,
    /// Include line numbers (compact only)
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for TelemetryConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            log_level: logging.level.clone(),
            json: logging.json,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Raise the level for `-v` (debug) and `-vv` (trace).
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.log_level = "debug".to_string(),
            _ => {
                self.log_level = "trace".to_string();
                self.show_target = true;
            }
        }
        self
    }
}

/// Metrics registry for a run summary
#[derive(Debug)]
pub struct MetricsRegistry {
    counters: RwLock<BTreeMap<String, AtomicU64>>,
    gauges: RwLock<BTreeMap<String, AtomicU64>>,
    histograms: RwLock<BTreeMap<String, Vec<f64>>>,
    start_time: Instant,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            gauges: RwLock::new(BTreeMap::new()),
            histograms: RwLock::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    /// Increment a counter by a specific amount
    pub fn increment_by(&self, name: &str, value: u64) {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        if let Some(counter) = counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        drop(counters);

        self.counters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Current counter value, 0 if never incremented
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Set a gauge value
    pub fn gauge(&self, name: &str, value: u64) {
        self.gauges
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .store(value, Ordering::Relaxed);
    }

    /// Record a histogram value
    pub fn histogram(&self, name: &str, value: f64) {
        self.histograms
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    /// Get uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Point-in-time copy of every metric
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
        let histograms = self.histograms.read().unwrap_or_else(|e| e.into_inner());

        MetricsSnapshot {
            session_id: session_id().to_string(),
            uptime_ms: u64::try_from(self.uptime().as_millis()).unwrap_or(u64::MAX),
            counters: counters
                .iter()
                .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
                .collect(),
            gauges: gauges
                .iter()
                .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
                .collect(),
            histograms: histograms
                .iter()
                .map(|(k, v)| (k.clone(), HistogramStats::from_values(v)))
                .collect(),
        }
    }

    /// Export metrics as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// Serializable copy of a [`MetricsRegistry`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Process session id
    pub session_id: String,
    /// Time since the registry was created
    pub uptime_ms: u64,
    /// Counter values by name
    pub counters: BTreeMap<String, u64>,
    /// Gauge values by name
    pub gauges: BTreeMap<String, u64>,
    /// Histogram summaries by name
    pub histograms: BTreeMap<String, HistogramStats>,
}

/// Histogram statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct HistogramStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

impl HistogramStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();

        Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sum / count as f64,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Get the global metrics registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Records elapsed milliseconds into a histogram, once, on `stop` or drop.
#[derive(Debug)]
pub struct Timer {
    name: String,
    start: Instant,
    recorded: bool,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            recorded: false,
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let duration = self.start.elapsed();
        if !self.recorded {
            self.recorded = true;
            metrics().histogram(&self.name, duration.as_secs_f64() * 1000.0);
            tracing::debug!(
                metric = %self.name,
                duration_ms = duration.as_millis(),
                "Timer completed"
            );
        }
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.record();
    }
}
