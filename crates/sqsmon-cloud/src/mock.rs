//! In-memory backend for unit tests.

use crate::error::{CloudWatchError, Result};
use crate::{DataPoint, MetricsBackend, StatisticsQuery};
use std::collections::HashMap;
use std::sync::Mutex;

enum Reply {
    Points(Vec<DataPoint>),
    Failure(String),
}

/// Answers per metric name and records every query it receives.
#[derive(Default)]
pub struct MockBackend {
    replies: HashMap<String, Reply>,
    queries: Mutex<Vec<StatisticsQuery>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(mut self, metric: &str, points: Vec<DataPoint>) -> Self {
        self.replies.insert(metric.to_string(), Reply::Points(points));
        self
    }

    /// Make `metric` fail with an API error carrying `code`.
    pub fn with_failure(mut self, metric: &str, code: &str) -> Self {
        self.replies
            .insert(metric.to_string(), Reply::Failure(code.to_string()));
        self
    }

    pub fn queries(&self) -> Vec<StatisticsQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MetricsBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_metric_statistics(&self, query: &StatisticsQuery) -> Result<Vec<DataPoint>> {
        self.queries.lock().unwrap().push(query.clone());

        match self.replies.get(&query.metric_name) {
            Some(Reply::Points(points)) => Ok(points.clone()),
            Some(Reply::Failure(code)) => Err(CloudWatchError::ApiResponseError {
                code: code.clone(),
                message: format!("mock failure for {}", query.metric_name),
            }),
            None => Ok(Vec::new()),
        }
    }
}
