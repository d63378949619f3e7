use async_trait::async_trait;
use tracing::info;

use super::{MetricDatum, MetricsSink};
use crate::error::Result;

/// Emits each datum as a structured `tracing` event under the `metrics`
/// target, for collection by whatever consumes the process's logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl TracingMetrics {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsSink for TracingMetrics {
    async fn emit(&self, datum: MetricDatum) -> Result<()> {
        let dimensions = datum
            .dimensions
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");

        info!(
            target: "metrics",
            namespace = %datum.namespace,
            metric = %datum.name,
            value = datum.value,
            unit = datum.unit.as_str(),
            dimensions = %dimensions,
            "metric"
        );
        Ok(())
    }
}
