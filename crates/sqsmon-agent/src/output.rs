//! mackerel-agent plugin output: graph definitions and metric value lines.

use crate::state::{per_minute_rate, Snapshot};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqsmon_common::catalog::Catalog;
use sqsmon_common::types::{GraphDefinition, MetricResult};
use std::collections::BTreeMap;
use std::io::Write;

/// Set (and non-empty) by the agent when it asks for graph definitions.
pub const PLUGIN_META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

const META_HEADER: &str = "# mackerel-agent-plugin";

#[derive(Serialize)]
struct GraphDefinitions<'a> {
    graphs: BTreeMap<&'a str, &'a GraphDefinition>,
}

pub fn wants_definitions(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup(PLUGIN_META_ENV).is_some_and(|v| !v.is_empty())
}

/// Print the header line followed by the catalog as one JSON line.
pub fn write_definitions<W: Write>(catalog: &Catalog, w: &mut W) -> Result<()> {
    let defs = GraphDefinitions {
        graphs: catalog
            .groups()
            .iter()
            .map(|g| (g.key.as_str(), &g.graph))
            .collect(),
    };

    writeln!(w, "{META_HEADER}")?;
    serde_json::to_writer(&mut *w, &defs)?;
    writeln!(w)?;
    Ok(())
}

/// Print `<graph>.<metric>\t<value>\t<unix time>` for every present metric,
/// in catalog order. Returns the number of lines written.
pub fn write_values<W: Write>(
    catalog: &Catalog,
    values: &MetricResult,
    previous: Option<&Snapshot>,
    now: DateTime<Utc>,
    w: &mut W,
) -> Result<usize> {
    let mut written = 0;

    for group in catalog.groups() {
        for metric in &group.graph.metrics {
            let Some(&raw) = values.get(&metric.name) else {
                continue;
            };

            let value = if metric.diff {
                let last = previous.and_then(|p| {
                    p.values
                        .get(&metric.name)
                        .map(|last_value| (*last_value, p.taken_at))
                });
                match last.and_then(|(last_value, last_time)| {
                    per_minute_rate(raw, now, last_value, last_time)
                }) {
                    Some(rate) => rate,
                    None => {
                        tracing::debug!(metric = %metric.name, "No usable previous value for diff metric");
                        continue;
                    }
                }
            } else {
                raw
            };

            if !value.is_finite() {
                tracing::warn!(metric = %metric.name, value, "Skipping non-finite value");
                continue;
            }

            writeln!(
                w,
                "{}.{}\t{:.6}\t{}",
                group.key,
                metric.name,
                value,
                now.timestamp()
            )?;
            written += 1;
        }
    }

    Ok(written)
}
