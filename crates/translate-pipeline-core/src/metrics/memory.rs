use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{MetricDatum, MetricsSink};
use crate::error::Result;

/// Sink that keeps every datum in memory.
#[derive(Default)]
pub struct MemoryMetrics {
    data: Mutex<Vec<MetricDatum>>,
}

impl MemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in order.
    pub async fn data(&self) -> Vec<MetricDatum> {
        self.data.lock().await.clone()
    }

    /// Sum of values emitted under `name`.
    pub async fn total(&self, name: &str) -> f64 {
        self.data
            .lock()
            .await
            .iter()
            .filter(|d| d.name == name)
            .map(|d| d.value)
            .sum()
    }
}

#[async_trait]
impl MetricsSink for MemoryMetrics {
    async fn emit(&self, datum: MetricDatum) -> Result<()> {
        self.data.lock().await.push(datum);
        Ok(())
    }
}
