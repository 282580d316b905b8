use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Latest value per metric name for one collection cycle.
///
/// A missing key means the metric could not be fetched; a genuine zero is
/// stored as `0.0`.
pub type MetricResult = HashMap<String, f64>;

/// Display unit of a graph, as understood by the monitoring agent.
///
/// # Examples
///
/// ```
/// use sqsmon_common::types::Unit;
///
/// let unit: Unit = "bytes".parse().unwrap();
/// assert_eq!(unit, Unit::Bytes);
/// assert_eq!(unit.to_string(), "bytes");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Integer,
    Float,
    Bytes,
    Percentage,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Integer => write!(f, "integer"),
            Unit::Float => write!(f, "float"),
            Unit::Bytes => write!(f, "bytes"),
            Unit::Percentage => write!(f, "percentage"),
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "integer" => Ok(Unit::Integer),
            "float" => Ok(Unit::Float),
            "bytes" => Ok(Unit::Bytes),
            "percentage" => Ok(Unit::Percentage),
            _ => Err(format!("unknown unit: {s}")),
        }
    }
}

/// One metric line inside a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub label: String,
    /// Report the per-minute delta against the previous run instead of the raw value
    #[serde(skip_serializing)]
    #[serde(default)]
    pub diff: bool,
    #[serde(default)]
    pub stacked: bool,
}

impl MetricDefinition {
    /// Plain gauge metric whose label equals its name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            diff: false,
            stacked: false,
        }
    }
}

/// A display graph grouping several metrics under one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<MetricDefinition>,
}
