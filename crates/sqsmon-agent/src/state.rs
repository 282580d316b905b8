//! Previous-run snapshot kept in a temp file, needed by diff metrics.
//!
//! File format: one JSON object mapping metric names to values plus a
//! `_lastTime` key holding the unix time of the run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqsmon_common::types::MetricResult;
use std::path::{Path, PathBuf};

const LAST_TIME_KEY: &str = "_lastTime";

/// Gaps longer than this make a per-minute rate meaningless.
pub const MAX_DIFF_GAP_SECS: i64 = 600;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub values: MetricResult,
    pub taken_at: DateTime<Utc>,
}

pub struct ValueStore {
    path: PathBuf,
}

impl ValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<tmpdir>/sqsmon-agent-<queue>`
    pub fn default_path(queue_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sqsmon-agent-{queue_name}"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last snapshot; `None` when no run has been recorded yet.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt value store {}", self.path.display()))?;

        let Some(taken_at) = raw
            .get(LAST_TIME_KEY)
            .and_then(|v| v.as_i64())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        else {
            return Ok(None);
        };

        let values = raw
            .iter()
            .filter(|(k, _)| k.as_str() != LAST_TIME_KEY)
            .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f)))
            .collect();

        Ok(Some(Snapshot { values, taken_at }))
    }

    pub fn save(&self, values: &MetricResult, now: DateTime<Utc>) -> Result<()> {
        let mut raw = serde_json::Map::new();
        for (name, value) in values {
            raw.insert(name.clone(), serde_json::json!(value));
        }
        raw.insert(LAST_TIME_KEY.to_string(), serde_json::json!(now.timestamp()));

        std::fs::write(&self.path, serde_json::to_vec(&raw)?)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Per-minute rate between the previous and current value of a counter.
///
/// Returns `None` if the counter went backwards, if no time has passed, or
/// if the gap exceeds [`MAX_DIFF_GAP_SECS`].
pub fn per_minute_rate(
    value: f64,
    now: DateTime<Utc>,
    last_value: f64,
    last_time: DateTime<Utc>,
) -> Option<f64> {
    let elapsed = (now - last_time).num_seconds();
    if elapsed <= 0 || elapsed > MAX_DIFF_GAP_SECS {
        return None;
    }
    if last_value > value {
        return None;
    }
    Some((value - last_value) * 60.0 / elapsed as f64)
}
