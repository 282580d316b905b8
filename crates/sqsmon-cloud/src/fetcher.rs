use crate::error::{CloudWatchError, Result};
use crate::{DataPoint, Dimension, MetricsBackend, StandardUnit, Statistic, StatisticsQuery, SQS_NAMESPACE};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Query window; three periods so at least one complete period is returned.
pub const LOOKBACK_SECS: i64 = 180;
pub const PERIOD_SECS: i64 = 60;

/// How a metric is aggregated and which unit it is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricKind {
    pub statistic: Statistic,
    pub unit: StandardUnit,
}

/// Choose statistic and unit from the metric name alone.
///
/// # Examples
///
/// ```
/// use sqsmon_cloud::fetcher::classify;
/// use sqsmon_cloud::{StandardUnit, Statistic};
///
/// let kind = classify("SentMessageSize");
/// assert_eq!(kind.statistic, Statistic::Average);
/// assert_eq!(kind.unit, StandardUnit::Bytes);
/// assert_eq!(classify("NumberOfMessagesSent").statistic, Statistic::Sum);
/// ```
pub fn classify(metric_name: &str) -> MetricKind {
    if metric_name == "SentMessageSize" {
        MetricKind {
            statistic: Statistic::Average,
            unit: StandardUnit::Bytes,
        }
    } else if metric_name.starts_with("Approximate") {
        MetricKind {
            statistic: Statistic::Average,
            unit: StandardUnit::Count,
        }
    } else {
        MetricKind {
            statistic: Statistic::Sum,
            unit: StandardUnit::Count,
        }
    }
}

/// Point with the greatest timestamp; the first one wins on ties.
pub fn select_latest(points: &[DataPoint]) -> Option<&DataPoint> {
    let mut latest: Option<&DataPoint> = None;
    for point in points {
        match latest {
            Some(current) if point.timestamp <= current.timestamp => {}
            _ => latest = Some(point),
        }
    }
    latest
}

/// Fetches the most recent value of a single queue metric.
pub struct MetricFetcher {
    backend: Arc<dyn MetricsBackend>,
}

impl MetricFetcher {
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Query for `metric_name` over the window ending at `now`.
    pub fn build_query(queue_name: &str, metric_name: &str, now: DateTime<Utc>) -> StatisticsQuery {
        let kind = classify(metric_name);
        StatisticsQuery {
            namespace: SQS_NAMESPACE.to_string(),
            metric_name: metric_name.to_string(),
            dimensions: vec![Dimension::queue_name(queue_name)],
            start_time: now - Duration::seconds(LOOKBACK_SECS),
            end_time: now,
            period_secs: PERIOD_SECS,
            statistic: kind.statistic,
            unit: kind.unit,
        }
    }

    /// Latest value of `metric_name` for the queue.
    ///
    /// # Errors
    ///
    /// Returns [`CloudWatchError::NoDatapoints`] when the window is empty,
    /// [`CloudWatchError::MissingStatistic`] when the latest point lacks the
    /// requested statistic, and the backend error unchanged otherwise.
    pub async fn fetch_latest_value(&self, queue_name: &str, metric_name: &str) -> Result<f64> {
        let query = Self::build_query(queue_name, metric_name, Utc::now());
        let points = self.backend.get_metric_statistics(&query).await?;

        let latest = select_latest(&points).ok_or_else(|| CloudWatchError::NoDatapoints {
            metric: metric_name.to_string(),
        })?;

        latest
            .value(query.statistic)
            .ok_or_else(|| CloudWatchError::MissingStatistic {
                metric: metric_name.to_string(),
                statistic: query.statistic.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sum_point(secs: i64, sum: f64) -> DataPoint {
        DataPoint {
            timestamp: at(secs),
            sum: Some(sum),
            average: None,
        }
    }

    #[test]
    fn should_classify_metrics_by_name() {
        assert_eq!(
            classify("SentMessageSize"),
            MetricKind {
                statistic: Statistic::Average,
                unit: StandardUnit::Bytes
            }
        );
        assert_eq!(
            classify("ApproximateNumberOfMessagesVisible"),
            MetricKind {
                statistic: Statistic::Average,
                unit: StandardUnit::Count
            }
        );
        assert_eq!(
            classify("NumberOfEmptyReceives"),
            MetricKind {
                statistic: Statistic::Sum,
                unit: StandardUnit::Count
            }
        );
        // Prefix match only; the exact size metric name is not a prefix rule.
        assert_eq!(classify("SentMessageSizeMax").statistic, Statistic::Sum);
    }

    #[test]
    fn should_select_greatest_timestamp_independent_of_order() {
        let points = vec![sum_point(160, 12.0), sum_point(40, 1.0), sum_point(100, 5.0)];
        assert_eq!(select_latest(&points).unwrap().sum, Some(12.0));

        let reversed: Vec<DataPoint> = points.into_iter().rev().collect();
        assert_eq!(select_latest(&reversed).unwrap().sum, Some(12.0));
    }

    #[test]
    fn should_keep_first_point_when_latest_timestamps_tie() {
        let points = vec![sum_point(100, 1.0), sum_point(160, 7.0), sum_point(160, 9.0)];

        assert_eq!(select_latest(&points).unwrap().sum, Some(7.0));
    }

    #[test]
    fn should_return_none_for_empty_points() {
        assert!(select_latest(&[]).is_none());
    }

    #[test]
    fn should_build_three_minute_query_with_one_minute_period() {
        let now = at(1_000);
        let query = MetricFetcher::build_query("orders", "SentMessageSize", now);

        assert_eq!(query.namespace, "AWS/SQS");
        assert_eq!(query.end_time, now);
        assert_eq!(query.start_time, at(820));
        assert_eq!(query.period_secs, 60);
        assert_eq!(query.statistic, Statistic::Average);
        assert_eq!(query.unit, StandardUnit::Bytes);
        assert_eq!(query.dimensions, vec![Dimension::queue_name("orders")]);
    }

    #[tokio::test]
    async fn should_return_sum_of_latest_point_for_default_metrics() {
        let backend = Arc::new(
            MockBackend::new().with_points(
                "NumberOfMessagesSent",
                vec![sum_point(100, 5.0), sum_point(160, 12.0)],
            ),
        );
        let fetcher = MetricFetcher::new(backend.clone());

        let value = fetcher
            .fetch_latest_value("orders", "NumberOfMessagesSent")
            .await
            .unwrap();

        assert_eq!(value, 12.0);
        let queries = backend.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].statistic, Statistic::Sum);
        assert_eq!(
            (queries[0].end_time - queries[0].start_time).num_seconds(),
            LOOKBACK_SECS
        );
    }

    #[tokio::test]
    async fn should_return_average_for_approximate_metrics() {
        let backend = Arc::new(MockBackend::new().with_points(
            "ApproximateNumberOfMessagesVisible",
            vec![DataPoint {
                timestamp: at(200),
                sum: Some(99.0),
                average: Some(3.5),
            }],
        ));
        let fetcher = MetricFetcher::new(backend.clone());

        let value = fetcher
            .fetch_latest_value("orders", "ApproximateNumberOfMessagesVisible")
            .await
            .unwrap();

        assert_eq!(value, 3.5);
        assert_eq!(backend.queries()[0].statistic, Statistic::Average);
    }

    #[tokio::test]
    async fn should_return_average_bytes_for_sent_message_size() {
        let backend = Arc::new(MockBackend::new().with_points(
            "SentMessageSize",
            vec![DataPoint {
                timestamp: at(200),
                sum: Some(40_960.0),
                average: Some(512.0),
            }],
        ));
        let fetcher = MetricFetcher::new(backend.clone());

        let value = fetcher
            .fetch_latest_value("orders", "SentMessageSize")
            .await
            .unwrap();

        assert_eq!(value, 512.0);
        let query = &backend.queries()[0];
        assert_eq!(query.statistic, Statistic::Average);
        assert_eq!(query.unit, StandardUnit::Bytes);
    }

    #[tokio::test]
    async fn should_fail_with_no_datapoints_for_empty_window() {
        let fetcher = MetricFetcher::new(Arc::new(
            MockBackend::new().with_points("NumberOfMessagesDeleted", vec![]),
        ));

        let err = fetcher
            .fetch_latest_value("orders", "NumberOfMessagesDeleted")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudWatchError::NoDatapoints { metric } if metric == "NumberOfMessagesDeleted"));
    }

    #[tokio::test]
    async fn should_fail_when_latest_point_lacks_requested_statistic() {
        let fetcher = MetricFetcher::new(Arc::new(
            MockBackend::new().with_points("SentMessageSize", vec![sum_point(60, 512.0)]),
        ));

        let err = fetcher
            .fetch_latest_value("orders", "SentMessageSize")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudWatchError::MissingStatistic { .. }));
    }

    #[tokio::test]
    async fn should_pass_backend_error_through_unchanged() {
        let fetcher = MetricFetcher::new(Arc::new(
            MockBackend::new().with_failure("NumberOfMessagesReceived", "AccessDenied"),
        ));

        let err = fetcher
            .fetch_latest_value("orders", "NumberOfMessagesReceived")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudWatchError::ApiResponseError { code, .. } if code == "AccessDenied"));
    }
}
