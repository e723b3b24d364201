use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Latency samples kept per series; older samples are dropped
const MAX_LATENCY_SAMPLES: usize = 1000;

/// Metrics collector for the translation service.
///
/// Tracks provider calls, the batch/fallback split of the translation stage
/// and per-page results. Cheap to clone and shared across handlers.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct ProviderCounters {
    calls: AtomicUsize,
    failures: AtomicUsize,
    rate_limited: AtomicUsize,
}

struct MetricsInner {
    // Per-provider counters ("ocr", "translate", "image")
    providers: DashMap<String, ProviderCounters>,
    provider_latency_ms: RwLock<VecDeque<u64>>,

    // Translation stage
    batch_translations: AtomicUsize,
    batch_failures: AtomicUsize,
    fallback_runs: AtomicUsize,
    fallback_calls: AtomicUsize,
    fallback_failures: AtomicUsize,

    // Page results
    pages_processed: AtomicUsize,
    pages_failed: AtomicUsize,
    pages_without_text: AtomicUsize,
    blocks_produced: AtomicUsize,
    page_duration_ms: RwLock<VecDeque<u64>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                providers: DashMap::new(),
                provider_latency_ms: RwLock::new(VecDeque::with_capacity(MAX_LATENCY_SAMPLES)),
                batch_translations: AtomicUsize::new(0),
                batch_failures: AtomicUsize::new(0),
                fallback_runs: AtomicUsize::new(0),
                fallback_calls: AtomicUsize::new(0),
                fallback_failures: AtomicUsize::new(0),
                pages_processed: AtomicUsize::new(0),
                pages_failed: AtomicUsize::new(0),
                pages_without_text: AtomicUsize::new(0),
                blocks_produced: AtomicUsize::new(0),
                page_duration_ms: RwLock::new(VecDeque::with_capacity(MAX_LATENCY_SAMPLES)),
                start_time: Instant::now(),
            }),
        }
    }

    // Provider Metrics
    pub fn record_provider_call(&self, provider: &str, success: bool, duration: Duration) {
        let counters = self
            .inner
            .providers
            .entry(provider.to_string())
            .or_default();
        counters.calls.fetch_add(1, Ordering::Relaxed);
        if !success {
            counters.failures.fetch_add(1, Ordering::Relaxed);
        }
        drop(counters);
        push_sample(&self.inner.provider_latency_ms, duration);
    }

    pub fn record_rate_limit(&self, provider: &str) {
        self.inner
            .providers
            .entry(provider.to_string())
            .or_default()
            .rate_limited
            .fetch_add(1, Ordering::Relaxed);
    }

    // Translation Stage Metrics
    pub fn record_batch_translation(&self, success: bool) {
        self.inner.batch_translations.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.inner.batch_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_fallback_run(&self) {
        self.inner.fallback_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_call(&self, success: bool) {
        self.inner.fallback_calls.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.inner.fallback_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Page Metrics
    pub fn record_page(&self, blocks: usize, duration: Duration) {
        self.inner.pages_processed.fetch_add(1, Ordering::Relaxed);
        self.inner.blocks_produced.fetch_add(blocks, Ordering::Relaxed);
        push_sample(&self.inner.page_duration_ms, duration);
    }

    pub fn record_page_failure(&self, no_text: bool) {
        self.inner.pages_failed.fetch_add(1, Ordering::Relaxed);
        if no_text {
            self.inner.pages_without_text.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency = self.inner.provider_latency_ms.read();
        let provider_latency_avg_ms = avg(&latency);
        let provider_latency_p95_ms = percentile(&latency, 0.95);
        drop(latency);

        let page_durations = self.inner.page_duration_ms.read();
        let page_avg_ms = avg(&page_durations);
        drop(page_durations);

        let providers = self
            .inner
            .providers
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    ProviderSnapshot {
                        calls: entry.calls.load(Ordering::Relaxed),
                        failures: entry.failures.load(Ordering::Relaxed),
                        rate_limited: entry.rate_limited.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            providers,
            provider_latency_avg_ms,
            provider_latency_p95_ms,
            batch_translations: self.inner.batch_translations.load(Ordering::Relaxed),
            batch_failures: self.inner.batch_failures.load(Ordering::Relaxed),
            fallback_runs: self.inner.fallback_runs.load(Ordering::Relaxed),
            fallback_calls: self.inner.fallback_calls.load(Ordering::Relaxed),
            fallback_failures: self.inner.fallback_failures.load(Ordering::Relaxed),
            pages_processed: self.inner.pages_processed.load(Ordering::Relaxed),
            pages_failed: self.inner.pages_failed.load(Ordering::Relaxed),
            pages_without_text: self.inner.pages_without_text.load(Ordering::Relaxed),
            blocks_produced: self.inner.blocks_produced.load(Ordering::Relaxed),
            page_avg_ms,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();

        let mut provider_lines = String::new();
        for (name, p) in &snapshot.providers {
            provider_lines.push_str(&format!(
                "provider_calls_total {{provider=\"{name}\"}} {}\n\
                 provider_failures_total {{provider=\"{name}\"}} {}\n\
                 provider_rate_limited_total {{provider=\"{name}\"}} {}\n",
                p.calls, p.failures, p.rate_limited
            ));
        }

        format!(
            r#"# HELP provider_calls_total Calls made to external providers
# TYPE provider_calls_total counter
{}
# HELP provider_latency_avg_ms Average provider latency in milliseconds
# TYPE provider_latency_avg_ms gauge
provider_latency_avg_ms {{}} {}

# HELP batch_translations_total Combined translation requests
# TYPE batch_translations_total counter
batch_translations_total {{}} {}

# HELP batch_failures_total Combined translation requests that failed
# TYPE batch_failures_total counter
batch_failures_total {{}} {}

# HELP fallback_runs_total Sequential fallback runs
# TYPE fallback_runs_total counter
fallback_runs_total {{}} {}

# HELP fallback_calls_total Per-block translation requests made by the fallback
# TYPE fallback_calls_total counter
fallback_calls_total {{}} {}

# HELP pages_processed_total Pages translated successfully
# TYPE pages_processed_total counter
pages_processed_total {{}} {}

# HELP pages_failed_total Pages that ended in an error
# TYPE pages_failed_total counter
pages_failed_total {{}} {}

# HELP blocks_produced_total Text blocks produced by clustering
# TYPE blocks_produced_total counter
blocks_produced_total {{}} {}

# HELP uptime_seconds Application uptime in seconds
# TYPE uptime_seconds counter
uptime_seconds {{}} {}
"#,
            provider_lines,
            snapshot.provider_latency_avg_ms,
            snapshot.batch_translations,
            snapshot.batch_failures,
            snapshot.fallback_runs,
            snapshot.fallback_calls,
            snapshot.pages_processed,
            snapshot.pages_failed,
            snapshot.blocks_produced,
            snapshot.uptime_seconds,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub calls: usize,
    pub failures: usize,
    pub rate_limited: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub providers: BTreeMap<String, ProviderSnapshot>,
    pub provider_latency_avg_ms: u64,
    pub provider_latency_p95_ms: u64,
    pub batch_translations: usize,
    pub batch_failures: usize,
    pub fallback_runs: usize,
    pub fallback_calls: usize,
    pub fallback_failures: usize,
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub pages_without_text: usize,
    pub blocks_produced: usize,
    pub page_avg_ms: u64,
    pub uptime_seconds: u64,
}

fn push_sample(series: &RwLock<VecDeque<u64>>, duration: Duration) {
    let mut samples = series.write();
    if samples.len() == MAX_LATENCY_SAMPLES {
        samples.pop_front();
    }
    samples.push_back(duration.as_millis() as u64);
}

fn percentile(values: &VecDeque<u64>, p: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted: Vec<u64> = values.iter().copied().collect();
    sorted.sort_unstable();
    let idx = ((values.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn avg(values: &VecDeque<u64>) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_provider_call("ocr", true, Duration::from_millis(100));
        metrics.record_provider_call("translate", false, Duration::from_millis(50));
        metrics.record_rate_limit("translate");
        metrics.record_batch_translation(false);
        metrics.record_fallback_run();
        metrics.record_fallback_call(true);
        metrics.record_fallback_call(false);
        metrics.record_page(3, Duration::from_millis(900));
        metrics.record_page_failure(true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.providers["ocr"].calls, 1);
        assert_eq!(snapshot.providers["translate"].failures, 1);
        assert_eq!(snapshot.providers["translate"].rate_limited, 1);
        assert_eq!(snapshot.provider_latency_avg_ms, 75);
        assert_eq!(snapshot.batch_failures, 1);
        assert_eq!(snapshot.fallback_calls, 2);
        assert_eq!(snapshot.fallback_failures, 1);
        assert_eq!(snapshot.pages_processed, 1);
        assert_eq!(snapshot.blocks_produced, 3);
        assert_eq!(snapshot.pages_without_text, 1);
    }

    #[test]
    fn test_latency_history_is_capped() {
        let metrics = Metrics::new();
        for ms in 0..(MAX_LATENCY_SAMPLES as u64 + 500) {
            metrics.record_provider_call("ocr", true, Duration::from_millis(ms));
        }

        let samples = metrics.inner.provider_latency_ms.read();
        assert_eq!(samples.len(), MAX_LATENCY_SAMPLES);
        // Oldest samples were evicted
        assert_eq!(samples.front().copied(), Some(500));
        drop(samples);

        assert_eq!(metrics.snapshot().providers["ocr"].calls, MAX_LATENCY_SAMPLES + 500);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_provider_call("ocr", true, Duration::from_millis(100));
        metrics.record_batch_translation(true);

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("provider_calls_total {provider=\"ocr\"} 1"));
        assert!(prometheus.contains("batch_translations_total {} 1"));
    }
}
