pub mod cloudwatch;
pub mod collector;
pub mod error;
pub mod fetcher;

#[cfg(test)]
mod mock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CloudWatch namespace for SQS queue metrics
pub const SQS_NAMESPACE: &str = "AWS/SQS";

/// Aggregation CloudWatch applies over each query period.
///
/// # Examples
///
/// ```
/// use sqsmon_cloud::Statistic;
///
/// assert_eq!(Statistic::Average.to_string(), "Average");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    Sum,
    Average,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Sum => "Sum",
            Statistic::Average => "Average",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CloudWatch unit a metric is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandardUnit {
    Count,
    Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn queue_name(queue_name: &str) -> Self {
        Self {
            name: "QueueName".to_string(),
            value: queue_name.to_string(),
        }
    }
}

/// One `GetMetricStatistics` request.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub period_secs: i64,
    pub statistic: Statistic,
    pub unit: StandardUnit,
}

/// One aggregated period returned by CloudWatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub sum: Option<f64>,
    pub average: Option<f64>,
}

impl DataPoint {
    pub fn value(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Sum => self.sum,
            Statistic::Average => self.average,
        }
    }
}

/// AWS access key material used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// The queue whose metrics are collected, plus how to reach it.
#[derive(Debug, Clone)]
pub struct ResourceIdentifier {
    pub region: String,
    pub queue_name: String,
    /// Explicit key pair; `None` uses the AWS default credentials chain.
    pub credentials: Option<Credentials>,
}

/// Monitoring backend abstraction, implemented by the CloudWatch client and
/// by test doubles.
#[async_trait::async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Backend name used in log lines
    fn name(&self) -> &str;

    /// Run one statistics query and return its data points in arrival order.
    async fn get_metric_statistics(
        &self,
        query: &StatisticsQuery,
    ) -> error::Result<Vec<DataPoint>>;
}
