//! Metric emission.
//!
//! Metrics are best-effort: [`Metrics::publish`] logs sink failures and never
//! returns them.

mod memory;
mod tracing_sink;

pub use memory::MemoryMetrics;
pub use tracing_sink::TracingMetrics;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

use crate::config::{Lang, MetricsConfig};
use crate::error::Result;

pub const CHARACTERS_TRANSLATED: &str = "CharactersTranslated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Count,
}

impl MetricUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "Count",
        }
    }
}

/// A single metric data point.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDatum {
    pub namespace: String,
    pub name: String,
    pub dimensions: Vec<(String, String)>,
    pub value: f64,
    pub unit: MetricUnit,
}

/// Destination for metric data.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn emit(&self, datum: MetricDatum) -> Result<()>;
}

/// Name of the per-language-pair counter, e.g. `FR_to_EN`.
pub fn language_pair_metric(source: &Lang, target: &Lang) -> String {
    format!(
        "{}_to_{}",
        source.as_str().to_uppercase(),
        target.as_str().to_uppercase()
    )
}

/// Sink plus the namespace and dimension every datum carries.
#[derive(Clone)]
pub struct Metrics {
    sink: Option<Arc<dyn MetricsSink>>,
    namespace: String,
    function_name: String,
}

impl Metrics {
    pub fn new(sink: Arc<dyn MetricsSink>, config: &MetricsConfig) -> Self {
        Self {
            sink: config.enabled.then_some(sink),
            namespace: config.namespace.clone(),
            function_name: config.function_name.clone(),
        }
    }

    /// Metrics that go nowhere.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            namespace: String::new(),
            function_name: String::new(),
        }
    }

    /// Emit one datum; failures are logged and swallowed.
    pub async fn publish(&self, name: &str, value: f64, unit: MetricUnit) {
        let Some(sink) = &self.sink else {
            return;
        };

        let datum = MetricDatum {
            namespace: self.namespace.clone(),
            name: name.to_string(),
            dimensions: vec![("Function".to_string(), self.function_name.clone())],
            value,
            unit,
        };

        if let Err(e) = sink.emit(datum).await {
            error!("Metric {} not emitted: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailingSink;

    #[async_trait]
    impl MetricsSink for FailingSink {
        async fn emit(&self, _datum: MetricDatum) -> Result<()> {
            Err(Error::Metrics("sink unavailable".into()))
        }
    }

    #[test]
    fn test_language_pair_metric() {
        assert_eq!(
            language_pair_metric(&Lang::new("fr"), &Lang::new("en")),
            "FR_to_EN"
        );
        assert_eq!(
            language_pair_metric(&Lang::auto(), &Lang::new("es")),
            "AUTO_to_ES"
        );
    }

    #[tokio::test]
    async fn test_publish_attaches_namespace_and_dimension() {
        let sink = Arc::new(MemoryMetrics::new());
        let metrics = Metrics::new(sink.clone(), &MetricsConfig::default());
        metrics.publish(CHARACTERS_TRANSLATED, 12.0, MetricUnit::Count).await;

        let data = sink.data().await;
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].namespace, "Translate");
        assert_eq!(
            data[0].dimensions,
            vec![("Function".to_string(), "LanguageTranslator".to_string())]
        );
    }

    #[tokio::test]
    async fn test_publish_swallows_sink_errors() {
        let metrics = Metrics::new(Arc::new(FailingSink), &MetricsConfig::default());
        metrics.publish("Anything", 1.0, MetricUnit::Count).await;
    }

    #[tokio::test]
    async fn test_disabled_config_skips_sink() {
        let sink = Arc::new(MemoryMetrics::new());
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        Metrics::new(sink.clone(), &config)
            .publish("Anything", 1.0, MetricUnit::Count)
            .await;
        assert!(sink.data().await.is_empty());
    }
}
