use clap::Parser;
use std::path::PathBuf;

/// Fetch SQS queue metrics from CloudWatch and print them for mackerel-agent.
#[derive(Debug, Default, Parser)]
#[command(name = "sqsmon-agent", version)]
pub struct Args {
    /// AWS region; resolved through the AWS default region chain when omitted
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    #[arg(long = "access-key-id")]
    pub access_key_id: Option<String>,

    #[arg(long = "secret-access-key")]
    pub secret_access_key: Option<String>,

    /// Name of the queue to monitor
    #[arg(long = "queuename")]
    pub queue_name: Option<String>,

    /// File keeping the previous run's values; only used when a graph has diff metrics
    #[arg(long)]
    pub tempfile: Option<PathBuf>,

    /// Optional TOML file with the same settings; flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
}
