use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Counters for one running assistant. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct AppMetrics {
    messages_total: AtomicU64,
    directives_total: AtomicU64,
    fallback_total: AtomicU64,
    rejected_total: AtomicU64,
    transactions_total: AtomicU64,
    total_latency_millis: AtomicU64,
    by_category: Mutex<BTreeMap<&'static str, u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub messages_total: u64,
    pub directives_total: u64,
    pub fallback_total: u64,
    pub rejected_total: u64,
    pub transactions_total: u64,
    pub avg_latency_millis: f64,
    pub messages_by_category: BTreeMap<String, u64>,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counts one handled message under its response category.
    pub fn record_message(&self, category: &'static str) {
        self.messages_total.fetch_add(1, Ordering::Relaxed);
        *self.by_category.lock().entry(category).or_default() += 1;
    }

    pub fn inc_directive(&self) {
        self.directives_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_transaction(&self) {
        self.transactions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let messages = self.messages_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);
        let messages_by_category = self
            .by_category
            .lock()
            .iter()
            .map(|(category, count)| (category.to_string(), *count))
            .collect();

        MetricsSnapshot {
            messages_total: messages,
            directives_total: self.directives_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            transactions_total: self.transactions_total.load(Ordering::Relaxed),
            avg_latency_millis: if messages == 0 {
                0.0
            } else {
                latency as f64 / messages as f64
            },
            messages_by_category,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format `{other}` (expected json or pretty)")),
        }
    }
}

/// Installs the global subscriber once; later calls are no-ops. Logs go to
/// stderr so stdout stays free for command output.
pub fn init_tracing(service_name: &str, format: LogFormat) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{service_name}=info,voicechain_agents=info,voicechain_core=info"
            ))
        });

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        match format {
            LogFormat::Json => builder
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .init(),
            LogFormat::Pretty => builder.pretty().init(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_latency_is_per_message() {
        let metrics = AppMetrics::default();
        assert_eq!(metrics.snapshot().avg_latency_millis, 0.0);

        metrics.record_message("greeting");
        metrics.record_message("default");
        metrics.observe_latency(Duration::from_millis(300));
        metrics.observe_latency(Duration::from_millis(100));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_total, 2);
        assert_eq!(snapshot.avg_latency_millis, 200.0);
    }

    #[test]
    fn messages_are_grouped_by_category() {
        let metrics = AppMetrics::default();
        metrics.record_message("buy");
        metrics.record_message("buy");
        metrics.record_message("knowledge");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_by_category.get("buy"), Some(&2));
        assert_eq!(snapshot.messages_by_category.get("knowledge"), Some(&1));
        assert_eq!(snapshot.messages_by_category.get("stake"), None);
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
