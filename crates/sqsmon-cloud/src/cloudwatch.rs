use crate::error::{CloudWatchError, Result};
use crate::{
    DataPoint, MetricsBackend, ResourceIdentifier, StandardUnit, Statistic, StatisticsQuery,
};
use aws_config::meta::region::RegionProviderChain;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_cloudwatch::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudwatch::primitives::DateTime as SmithyDateTime;
use aws_sdk_cloudwatch::types;
use aws_sdk_cloudwatch::Client;
use chrono::{DateTime, Utc};
use std::time::Duration;

const EXPLICIT_PROVIDER: &str = "sqsmon-explicit";

/// Region from `explicit`, else the SDK default chain: `AWS_REGION` /
/// `AWS_DEFAULT_REGION`, the shared config profile, then instance metadata.
pub async fn resolve_region(explicit: Option<String>) -> Result<String> {
    let chain = RegionProviderChain::first_try(explicit.map(Region::new)).or_default_provider();
    chain
        .region()
        .await
        .map(|region| region.to_string())
        .ok_or_else(|| {
            CloudWatchError::ConfigError(
                "no region given and none found in the environment, profile or instance metadata"
                    .to_string(),
            )
        })
}

/// SDK configuration for `resource`. An explicit key pair replaces the
/// default credentials chain (env, shared files, web identity, container,
/// instance role).
pub async fn load_sdk_config(resource: &ResourceIdentifier, timeout: Duration) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(resource.region.clone()))
        .timeout_config(
            TimeoutConfig::builder()
                .operation_attempt_timeout(timeout)
                .build(),
        );

    if let Some(credentials) = &resource.credentials {
        loader = loader.credentials_provider(aws_credential_types::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            EXPLICIT_PROVIDER,
        ));
    }

    loader.load().await
}

/// Ask the configured provider for credentials once so that a missing
/// source fails the run instead of every metric.
pub async fn verify_credentials(config: &SdkConfig) -> Result<()> {
    let provider = config.credentials_provider().ok_or_else(|| {
        CloudWatchError::CredentialsError("no credentials provider configured".to_string())
    })?;
    let credentials = provider
        .provide_credentials()
        .await
        .map_err(|e| CloudWatchError::CredentialsError(DisplayErrorContext(&e).to_string()))?;

    tracing::debug!(access_key_id = %credentials.access_key_id(), "Resolved AWS credentials");
    Ok(())
}

/// CloudWatch backend on top of the AWS SDK client.
pub struct CloudWatchClient {
    client: Client,
    region: String,
}

impl CloudWatchClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
            region: config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_default(),
        }
    }

    /// Load configuration for `resource`, check that credentials resolve and
    /// build the client.
    pub async fn connect(resource: &ResourceIdentifier, timeout: Duration) -> Result<Self> {
        let config = load_sdk_config(resource, timeout).await;
        verify_credentials(&config).await?;
        Ok(Self::new(&config))
    }
}

#[async_trait::async_trait]
impl MetricsBackend for CloudWatchClient {
    fn name(&self) -> &str {
        "cloudwatch"
    }

    async fn get_metric_statistics(&self, query: &StatisticsQuery) -> Result<Vec<DataPoint>> {
        tracing::debug!(
            metric = %query.metric_name,
            statistic = %query.statistic,
            region = %self.region,
            "GetMetricStatistics"
        );

        let dimensions = query
            .dimensions
            .iter()
            .map(|d| {
                types::Dimension::builder()
                    .name(&d.name)
                    .value(&d.value)
                    .build()
            })
            .collect();

        let output = self
            .client
            .get_metric_statistics()
            .namespace(&query.namespace)
            .metric_name(&query.metric_name)
            .set_dimensions(Some(dimensions))
            .start_time(to_smithy_time(query.start_time))
            .end_time(to_smithy_time(query.end_time))
            .period(query.period_secs as i32)
            .statistics(sdk_statistic(query.statistic))
            .unit(sdk_unit(query.unit))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(convert_datapoints(output.datapoints()))
    }
}

fn to_smithy_time(time: DateTime<Utc>) -> SmithyDateTime {
    SmithyDateTime::from_secs(time.timestamp())
}

fn sdk_statistic(statistic: Statistic) -> types::Statistic {
    match statistic {
        Statistic::Sum => types::Statistic::Sum,
        Statistic::Average => types::Statistic::Average,
    }
}

fn sdk_unit(unit: StandardUnit) -> types::StandardUnit {
    match unit {
        StandardUnit::Count => types::StandardUnit::Count,
        StandardUnit::Bytes => types::StandardUnit::Bytes,
    }
}

/// Convert SDK datapoints, keeping arrival order.
pub fn convert_datapoints(points: &[types::Datapoint]) -> Vec<DataPoint> {
    points
        .iter()
        .filter_map(|raw| {
            let timestamp = raw
                .timestamp()
                .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));
            match timestamp {
                Some(timestamp) => Some(DataPoint {
                    timestamp,
                    sum: raw.sum(),
                    average: raw.average(),
                }),
                None => {
                    tracing::warn!("Skipping datapoint without a valid timestamp");
                    None
                }
            }
        })
        .collect()
}

/// Map an SDK failure to an error, by service error code when there is one.
pub fn map_sdk_error<E>(err: E) -> CloudWatchError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = err.message().unwrap_or_default().to_string();
    match err.code() {
        Some("Throttling" | "ThrottlingException" | "RequestLimitExceeded") => {
            CloudWatchError::RateLimited { message }
        }
        Some(code) => CloudWatchError::ApiResponseError {
            code: code.to_string(),
            message,
        },
        None => CloudWatchError::RequestError(DisplayErrorContext(&err).to_string()),
    }
}
