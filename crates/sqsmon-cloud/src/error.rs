/// Errors that can occur while resolving AWS access or querying CloudWatch.
///
/// # Examples
///
/// ```rust
/// use sqsmon_cloud::error::CloudWatchError;
///
/// let err = CloudWatchError::NoDatapoints {
///     metric: "NumberOfMessagesSent".to_string(),
/// };
/// assert!(err.to_string().contains("NumberOfMessagesSent"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CloudWatchError {
    /// The API rejected the request with a typed error payload.
    #[error("CloudWatch API error: code={code}, message={message}")]
    ApiResponseError { code: String, message: String },

    /// Request was throttled by CloudWatch.
    #[error("CloudWatch API rate limited: {message}")]
    RateLimited { message: String },

    /// The request failed before CloudWatch returned a service error code.
    #[error("CloudWatch request failed: {0}")]
    RequestError(String),

    /// The query window returned no data points.
    #[error("fetched no datapoints for {metric}")]
    NoDatapoints { metric: String },

    /// The latest data point does not carry the requested statistic.
    #[error("datapoint for {metric} has no {statistic} value")]
    MissingStatistic { metric: String, statistic: String },

    /// The queue name is empty; no metric can be addressed.
    #[error("no queue name configured")]
    MissingQueueName,

    /// No credential source yielded an access key.
    #[error("Credentials error: {0}")]
    CredentialsError(String),

    /// Plugin configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, CloudWatchError>;
