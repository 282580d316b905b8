//! Static graph catalog for SQS queue metrics.
//!
//! The catalog is built once at startup and handed by reference to both the
//! collector (which metrics to fetch) and the output formatter (how to group
//! and label them). Nothing mutates it afterwards.

use crate::types::{GraphDefinition, MetricDefinition, Unit};

/// Order in which queue metrics are fetched from CloudWatch.
pub const SQS_FETCH_ORDER: [&str; 8] = [
    "SentMessageSize",
    "NumberOfMessagesSent",
    "NumberOfMessagesReceived",
    "NumberOfEmptyReceives",
    "NumberOfMessagesDeleted",
    "ApproximateNumberOfMessagesDelayed",
    "ApproximateNumberOfMessagesVisible",
    "ApproximateNumberOfMessagesNotVisible",
];

/// A graph group together with its key (e.g. `"sqs.Messages"`).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphGroup {
    pub key: String,
    pub graph: GraphDefinition,
}

/// Ordered, immutable set of graph groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    groups: Vec<GraphGroup>,
}

impl Catalog {
    /// Build a catalog from `(key, graph)` pairs.
    ///
    /// A repeated key keeps its first definition.
    pub fn new(groups: impl IntoIterator<Item = (String, GraphDefinition)>) -> Self {
        let mut out: Vec<GraphGroup> = Vec::new();
        for (key, graph) in groups {
            if out.iter().any(|g| g.key == key) {
                continue;
            }
            out.push(GraphGroup { key, graph });
        }
        Self { groups: out }
    }

    /// The SQS queue catalog.
    pub fn sqs() -> Self {
        let graph = |label: &str, unit: Unit, names: &[&str]| GraphDefinition {
            label: label.to_string(),
            unit,
            metrics: names.iter().map(|n| MetricDefinition::named(n)).collect(),
        };

        Self::new([
            (
                "sqs.Messages".to_string(),
                graph(
                    "SQS Message metrics",
                    Unit::Integer,
                    &[
                        "NumberOfMessagesSent",
                        "NumberOfMessagesReceived",
                        "NumberOfMessagesDeleted",
                        "NumberOfEmptyReceives",
                    ],
                ),
            ),
            (
                "sqs.MessageSize".to_string(),
                graph("SQS Message Size", Unit::Bytes, &["SentMessageSize"]),
            ),
            (
                "sqs.Queue".to_string(),
                graph(
                    "SQS Approximate Message Stats",
                    Unit::Integer,
                    &[
                        "ApproximateNumberOfMessagesDelayed",
                        "ApproximateNumberOfMessagesVisible",
                        "ApproximateNumberOfMessagesNotVisible",
                    ],
                ),
            ),
        ])
    }

    pub fn groups(&self) -> &[GraphGroup] {
        &self.groups
    }

    pub fn graph(&self, key: &str) -> Option<&GraphDefinition> {
        self.groups.iter().find(|g| g.key == key).map(|g| &g.graph)
    }

    /// All metric names in graph order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.graph.metrics.iter().map(|m| m.name.as_str()))
    }

    pub fn contains_metric(&self, name: &str) -> bool {
        self.metric_names().any(|n| n == name)
    }

    /// Whether any metric needs the previous run's values.
    pub fn has_diff(&self) -> bool {
        self.groups
            .iter()
            .any(|g| g.graph.metrics.iter().any(|m| m.diff))
    }
}
