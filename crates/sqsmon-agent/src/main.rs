use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use sqsmon_agent::cli::Args;
use sqsmon_agent::config::PluginConfig;
use sqsmon_agent::output;
use sqsmon_agent::state::ValueStore;
use sqsmon_cloud::cloudwatch;
use sqsmon_cloud::collector::SqsCollector;
use sqsmon_cloud::error::CloudWatchError;
use sqsmon_cloud::ResourceIdentifier;
use sqsmon_common::catalog::Catalog;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the plugin protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sqsmon=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = PluginConfig::from_args(&args)?;
    let catalog = Catalog::sqs();

    if output::wants_definitions(|key| std::env::var(key).ok()) {
        let mut stdout = std::io::stdout().lock();
        return output::write_definitions(&catalog, &mut stdout);
    }

    let queue_name = config.queue_name().to_string();
    if queue_name.is_empty() {
        return Err(CloudWatchError::MissingQueueName.into());
    }

    let region = cloudwatch::resolve_region(config.region.clone())
        .await
        .context("Failed to resolve AWS region")?;

    let resource = ResourceIdentifier {
        region,
        queue_name,
        credentials: config.explicit_credentials(),
    };
    tracing::debug!(region = %resource.region, queue = %resource.queue_name, "sqsmon-agent starting");

    let store = ValueStore::new(
        config
            .tempfile
            .clone()
            .unwrap_or_else(|| ValueStore::default_path(&resource.queue_name)),
    );
    let previous = if catalog.has_diff() {
        match store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(path = %store.path().display(), error = %e, "Ignoring unreadable value store");
                None
            }
        }
    } else {
        None
    };

    let collector =
        SqsCollector::for_resource(&resource, Duration::from_secs(config.request_timeout_secs))
            .await
            .context("Failed to resolve AWS credentials")?;
    let now = Utc::now();
    let values = collector.fetch_metrics(&resource).await?;

    let mut stdout = std::io::stdout().lock();
    output::write_values(&catalog, &values, previous.as_ref(), now, &mut stdout)?;

    if catalog.has_diff() {
        store.save(&values, now)?;
    }

    Ok(())
}
