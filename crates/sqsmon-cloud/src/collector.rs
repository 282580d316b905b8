use crate::cloudwatch::CloudWatchClient;
use crate::error::{CloudWatchError, Result};
use crate::fetcher::MetricFetcher;
use crate::{MetricsBackend, ResourceIdentifier};
use sqsmon_common::catalog::SQS_FETCH_ORDER;
use sqsmon_common::types::MetricResult;
use std::sync::Arc;
use std::time::Duration;

/// A metric that could not be fetched in this batch.
#[derive(Debug)]
pub struct MetricFailure {
    pub metric: String,
    pub error: CloudWatchError,
}

/// Values that were fetched plus the metrics that were skipped.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub values: MetricResult,
    pub failures: Vec<MetricFailure>,
}

/// Collects every queue metric one after another, skipping failures.
pub struct SqsCollector {
    fetcher: MetricFetcher,
    metric_names: Vec<String>,
}

impl SqsCollector {
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self::with_metrics(backend, SQS_FETCH_ORDER)
    }

    pub fn with_metrics<'a>(
        backend: Arc<dyn MetricsBackend>,
        metric_names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            fetcher: MetricFetcher::new(backend),
            metric_names: metric_names.into_iter().map(str::to_string).collect(),
        }
    }

    /// Collector talking to CloudWatch in the resource's region.
    ///
    /// # Errors
    ///
    /// Returns [`CloudWatchError::CredentialsError`] when no credential
    /// source yields a key.
    pub async fn for_resource(resource: &ResourceIdentifier, timeout: Duration) -> Result<Self> {
        let client = CloudWatchClient::connect(resource, timeout).await?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Fetch all metrics in order.
    ///
    /// # Errors
    ///
    /// Returns [`CloudWatchError::MissingQueueName`] before any backend call
    /// when the queue name is empty. Per-metric errors never fail the batch.
    pub async fn collect(&self, resource: &ResourceIdentifier) -> Result<BatchOutcome> {
        if resource.queue_name.is_empty() {
            return Err(CloudWatchError::MissingQueueName);
        }

        let mut outcome = BatchOutcome::default();
        for metric in &self.metric_names {
            match self
                .fetcher
                .fetch_latest_value(&resource.queue_name, metric)
                .await
            {
                Ok(value) => {
                    outcome.values.insert(metric.clone(), value);
                }
                Err(e) => {
                    tracing::warn!(metric = %metric, error = %e, "Failed to fetch metric");
                    outcome.failures.push(MetricFailure {
                        metric: metric.clone(),
                        error: e,
                    });
                }
            }
        }

        tracing::debug!(
            queue = %resource.queue_name,
            backend = self.fetcher.backend_name(),
            fetched = outcome.values.len(),
            failed = outcome.failures.len(),
            "Collected queue metrics"
        );
        Ok(outcome)
    }

    /// Fetch all metrics and keep only the values.
    pub async fn fetch_metrics(&self, resource: &ResourceIdentifier) -> Result<MetricResult> {
        Ok(self.collect(resource).await?.values)
    }
}
