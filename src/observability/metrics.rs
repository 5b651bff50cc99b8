// Judge pipeline metrics.
//
// Counters for judgments by verdict and throttle rejections, a gauge for
// in-flight executions, and a latency histogram for whole judgments.
// Everything is relaxed atomics; readers take point-in-time snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::verdict::Verdict;

/// Counter metric (monotonically increasing)
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge metric (can go up or down)
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Histogram bucket for latency tracking
#[derive(Debug)]
pub struct HistogramBucket {
    pub le: f64,
    pub count: AtomicU64,
}

/// Histogram metric for judgment duration
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<HistogramBucket>,
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    /// Judgment latencies span container start-up through a full time limit.
    pub fn new_latency() -> Self {
        let bounds = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];
        Self {
            buckets: bounds
                .into_iter()
                .map(|le| HistogramBucket {
                    le,
                    count: AtomicU64::new(0),
                })
                .collect(),
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value: Duration) {
        let seconds = value.as_secs_f64();
        self.sum_micros
            .fetch_add(value.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        for bucket in &self.buckets {
            if seconds <= bucket.le {
                bucket.count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Registry of every judge metric.
#[derive(Debug)]
pub struct MetricsRegistry {
    /// Completed judgments, any verdict.
    pub judgments_total: Counter,
    pub accepted: Counter,
    pub wrong_answer: Counter,
    pub compilation_error: Counter,
    pub runtime_error: Counter,
    pub time_limit_exceeded: Counter,
    pub out_of_memory: Counter,
    /// Requests rejected at the admission ceiling.
    pub throttling_total: Counter,
    /// Engine-level failures (docker unreachable, spawn failure).
    pub sandbox_failures: Counter,
    /// Executions currently holding an admission slot.
    pub executions: Gauge,
    pub judgment_duration: Histogram,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            judgments_total: Counter::new(),
            accepted: Counter::new(),
            wrong_answer: Counter::new(),
            compilation_error: Counter::new(),
            runtime_error: Counter::new(),
            time_limit_exceeded: Counter::new(),
            out_of_memory: Counter::new(),
            throttling_total: Counter::new(),
            sandbox_failures: Counter::new(),
            executions: Gauge::new(),
            judgment_duration: Histogram::new_latency(),
        }
    }

    pub fn record_verdict(&self, verdict: Verdict) {
        self.judgments_total.inc();
        match verdict {
            Verdict::Accepted => self.accepted.inc(),
            Verdict::WrongAnswer => self.wrong_answer.inc(),
            Verdict::CompilationError => self.compilation_error.inc(),
            Verdict::RuntimeError => self.runtime_error.inc(),
            Verdict::TimeLimitExceeded => self.time_limit_exceeded.inc(),
            Verdict::OutOfMemory => self.out_of_memory.inc(),
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP judgebox_judgments_total Completed judgments\n");
        output.push_str("# TYPE judgebox_judgments_total counter\n");
        output.push_str(&format!(
            "judgebox_judgments_total {}\n",
            self.judgments_total.get()
        ));

        output.push_str("# HELP judgebox_judgments_by_verdict Judgments by verdict\n");
        output.push_str("# TYPE judgebox_judgments_by_verdict counter\n");
        for (label, counter) in [
            ("Accepted", &self.accepted),
            ("Wrong Answer", &self.wrong_answer),
            ("Compilation Error", &self.compilation_error),
            ("Runtime Error", &self.runtime_error),
            ("Time Limit Exceeded", &self.time_limit_exceeded),
            ("Out Of Memory", &self.out_of_memory),
        ] {
            output.push_str(&format!(
                "judgebox_judgments_by_verdict{{verdict=\"{}\"}} {}\n",
                label,
                counter.get()
            ));
        }

        output.push_str("# HELP judgebox_throttling_total Requests rejected at the ceiling\n");
        output.push_str("# TYPE judgebox_throttling_total counter\n");
        output.push_str(&format!(
            "judgebox_throttling_total {}\n",
            self.throttling_total.get()
        ));

        output.push_str("# HELP judgebox_sandbox_failures_total Container engine failures\n");
        output.push_str("# TYPE judgebox_sandbox_failures_total counter\n");
        output.push_str(&format!(
            "judgebox_sandbox_failures_total {}\n",
            self.sandbox_failures.get()
        ));

        output.push_str("# HELP judgebox_executions In-flight executions\n");
        output.push_str("# TYPE judgebox_executions gauge\n");
        output.push_str(&format!("judgebox_executions {}\n", self.executions.get()));

        output.push_str("# HELP judgebox_judgment_duration_seconds Judgment latency\n");
        output.push_str("# TYPE judgebox_judgment_duration_seconds histogram\n");
        for bucket in &self.judgment_duration.buckets {
            output.push_str(&format!(
                "judgebox_judgment_duration_seconds_bucket{{le=\"{}\"}} {}\n",
                bucket.le,
                bucket.count.load(Ordering::Relaxed)
            ));
        }
        output.push_str(&format!(
            "judgebox_judgment_duration_seconds_sum {}\n",
            self.judgment_duration.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
        ));
        output.push_str(&format!(
            "judgebox_judgment_duration_seconds_count {}\n",
            self.judgment_duration.count()
        ));

        output
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics instance
static METRICS: once_cell::sync::Lazy<Arc<MetricsRegistry>> =
    once_cell::sync::Lazy::new(|| Arc::new(MetricsRegistry::new()));

/// Get global metrics registry
pub fn get_metrics() -> Arc<MetricsRegistry> {
    Arc::clone(&METRICS)
}
