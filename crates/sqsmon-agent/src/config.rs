use crate::cli::Args;
use anyhow::Context;
use serde::Deserialize;
use sqsmon_cloud::Credentials;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct PluginConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    #[serde(alias = "queuename")]
    pub queue_name: Option<String>,
    pub tempfile: Option<PathBuf>,
    /// Per-request timeout for CloudWatch calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            region: None,
            access_key_id: None,
            secret_access_key: None,
            queue_name: None,
            tempfile: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl PluginConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Build the effective configuration: the config file when given, then
    /// command-line flags on top.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.merge_args(args))
    }

    pub fn merge_args(mut self, args: &Args) -> Self {
        fn pick(flag: &Option<String>, current: Option<String>) -> Option<String> {
            flag.clone().filter(|v| !v.is_empty()).or(current)
        }

        self.region = pick(&args.region, self.region);
        self.access_key_id = pick(&args.access_key_id, self.access_key_id);
        self.secret_access_key = pick(&args.secret_access_key, self.secret_access_key);
        self.queue_name = pick(&args.queue_name, self.queue_name);
        if args.tempfile.is_some() {
            self.tempfile = args.tempfile.clone();
        }
        self
    }

    pub fn queue_name(&self) -> &str {
        self.queue_name.as_deref().unwrap_or("")
    }

    /// Key pair given in flags or config, if both halves are present.
    pub fn explicit_credentials(&self) -> Option<Credentials> {
        match (self.access_key_id.as_deref(), self.secret_access_key.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some(Credentials::new(id, secret))
            }
            (None, None) => None,
            _ => {
                tracing::warn!("Ignoring incomplete access key pair; both key id and secret are required");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn should_apply_defaults_for_missing_keys() {
        let config: PluginConfig = toml::from_str(r#"queuename = "orders""#).unwrap();

        assert_eq!(config.queue_name(), "orders");
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.region.is_none());
    }

    #[test]
    fn should_let_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "region = \"eu-west-1\"\nqueue_name = \"from-file\"\ntempfile = \"/tmp/from-file\"\nrequest_timeout_secs = 3"
        )
        .unwrap();
        let args = Args {
            queue_name: Some("from-flag".to_string()),
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = PluginConfig::from_args(&args).unwrap();

        assert_eq!(config.queue_name(), "from-flag");
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.tempfile, Some(PathBuf::from("/tmp/from-file")));
        assert_eq!(config.request_timeout_secs, 3);
    }

    #[test]
    fn should_require_both_halves_of_explicit_key_pair() {
        let mut config = PluginConfig {
            access_key_id: Some("AKID".to_string()),
            ..Default::default()
        };
        assert!(config.explicit_credentials().is_none());

        config.secret_access_key = Some("secret".to_string());
        assert_eq!(
            config.explicit_credentials(),
            Some(Credentials::new("AKID", "secret"))
        );
    }

    #[test]
    fn should_fail_to_load_missing_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(PluginConfig::load(&dir.path().join("absent.toml")).is_err());
    }
}
