//! Plugin configuration.
//!
//! Built from the request's `pluginConfig` map, falling back to the
//! environment for anything the caller did not set.

use std::collections::BTreeMap;

use url::Url;

use crate::error::{PluginError, PluginResult};

/// `pluginConfig` key for the AWS region.
pub const CONFIG_KEY_REGION: &str = "aws-region";

/// `pluginConfig` key overriding the AWS Signer endpoint.
pub const CONFIG_KEY_ENDPOINT: &str = "aws-signer-endpoint-url";

/// `pluginConfig` key for the AWS credential profile.
pub const CONFIG_KEY_PROFILE: &str = "aws-profile";

/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "AWS_SIGNER_NOTATION_PLUGIN_TIMEOUT";

/// Resolved settings for the AWS Signer client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// AWS region, used to derive the default endpoint.
    pub region: Option<String>,

    /// Explicit endpoint; wins over the region-derived one.
    pub endpoint_url: Option<String>,

    /// Credential profile name. Informational only: recorded in debug logs,
    /// requests are not signed with it.
    pub profile: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            profile: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl PluginConfig {
    /// Create config from a request's `pluginConfig` map.
    ///
    /// | Key | Fallback variable |
    /// |-----|-------------------|
    /// | `aws-region` | `AWS_REGION`, then `AWS_DEFAULT_REGION` |
    /// | `aws-signer-endpoint-url` | none |
    /// | `aws-profile` | `AWS_PROFILE` |
    /// | none | `AWS_SIGNER_NOTATION_PLUGIN_TIMEOUT` |
    pub fn from_plugin_config(plugin_config: &BTreeMap<String, String>) -> Self {
        let lookup = |key: &str| plugin_config.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            region: lookup(CONFIG_KEY_REGION)
                .or_else(|| env_non_empty("AWS_REGION"))
                .or_else(|| env_non_empty("AWS_DEFAULT_REGION")),
            endpoint_url: lookup(CONFIG_KEY_ENDPOINT),
            profile: lookup(CONFIG_KEY_PROFILE).or_else(|| env_non_empty("AWS_PROFILE")),
            timeout_secs: std::env::var(ENV_TIMEOUT)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the endpoint override.
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Resolve the AWS Signer base URL.
    pub fn endpoint(&self) -> PluginResult<Url> {
        if let Some(raw) = self.endpoint_url.as_deref().filter(|u| !u.is_empty()) {
            let url = Url::parse(raw).map_err(|e| {
                PluginError::generic(format!("invalid AWS Signer endpoint {:?}: {}", raw, e))
            })?;
            return match url.scheme() {
                "http" | "https" => Ok(url),
                scheme => Err(PluginError::generic(format!(
                    "invalid AWS Signer endpoint {:?}: unsupported scheme {:?}",
                    raw, scheme
                ))),
            };
        }

        match self.region.as_deref() {
            Some(region) => Url::parse(&format!("https://signer.{}.amazonaws.com", region))
                .map_err(|e| PluginError::generic(format!("invalid AWS region {:?}: {}", region, e))),
            None => Err(PluginError::generic(
                "unable to resolve AWS Signer endpoint: no region configured",
            )),
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
