use std::{fmt, str::FromStr, time::Duration};

use clap::ValueEnum;
use reqwest::Url;
use serde::{Serialize, Serializer};

use crate::error::ProbeError;

/// Public Invidious instances, in order of preference
pub const DEFAULT_INSTANCES: &[&str] = &[
    "https://y.com.sb",
    "https://invidious.slipfox.xyz",
    "https://invidious.projectsegfau.lt",
    "https://invidious.privacyredirect.com",
    "https://inv.riverside.rocks",
    "https://invidious.snopyta.org",
    "https://yewtu.be",
    "https://invidious.kavin.rocks",
    "https://iv.nboeck.de",
];

// SoulCalibur VI game channel
pub const DEFAULT_CHANNEL: &str = "UCJ0Y3WUgX0eqgQ76mz1PaFA";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Base URL of one Invidious deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance(String);

impl Instance {
    /// Builds the URL of an `/api/v1/...` endpoint on this instance
    ///
    /// `path` must not start with a slash, e.g. `channels/UC.../streams`
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Instance {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let url = Url::parse(s).map_err(|e| ProbeError::InvalidInput(format!("{s}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ProbeError::InvalidInput(format!(
                "{s}: instance must be an http(s) URL"
            )));
        }

        Ok(Self(s.trim_end_matches('/').to_string()))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// How a list of instances is walked when only one answer is needed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Try instances one after another, stop at the first success
    #[default]
    Ordered,
    /// Query every instance at once, take whichever succeeds first
    Race,
}

/// Runtime settings shared by every operation
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub instances: Vec<Instance>,
    pub timeout: Duration,
    pub strategy: Strategy,
    pub default_channel: String,
}

impl ProbeConfig {
    /// # Errors
    /// Errors when any of the instance URLs is malformed
    pub fn new(
        instances: &[String],
        timeout_secs: u64,
        strategy: Strategy,
        default_channel: String,
    ) -> Result<Self, ProbeError> {
        let instances = if instances.is_empty() {
            default_instances()
        } else {
            instances
                .iter()
                .filter(|i| !i.trim().is_empty())
                .map(|i| i.parse::<Instance>())
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            instances,
            timeout: Duration::from_secs(timeout_secs),
            strategy,
            default_channel,
        })
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strategy: Strategy::default(),
            default_channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

fn default_instances() -> Vec<Instance> {
    DEFAULT_INSTANCES
        .iter()
        .map(|i| Instance(i.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_strips_trailing_slash() {
        let i: Instance = "https://yewtu.be/".parse().unwrap();
        assert_eq!(i.as_str(), "https://yewtu.be");
        assert_eq!(
            i.api_url("channels/UCJ0Y3WUgX0eqgQ76mz1PaFA/streams"),
            "https://yewtu.be/api/v1/channels/UCJ0Y3WUgX0eqgQ76mz1PaFA/streams"
        );
    }

    #[test]
    fn instance_rejects_non_http_urls() {
        assert!("ftp://example.com".parse::<Instance>().is_err());
        assert!("not a url".parse::<Instance>().is_err());
    }

    #[test]
    fn empty_instance_list_falls_back_to_defaults() {
        let config = ProbeConfig::new(&[], 15, Strategy::Race, DEFAULT_CHANNEL.into()).unwrap();
        assert_eq!(config.instances.len(), DEFAULT_INSTANCES.len());
        assert_eq!(config.instances[0].as_str(), "https://y.com.sb");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.strategy, Strategy::Race);
    }

    #[test]
    fn configured_instances_keep_their_order() {
        let config = ProbeConfig::new(
            &["https://b.example".into(), "https://a.example/".into()],
            DEFAULT_TIMEOUT_SECS,
            Strategy::Ordered,
            DEFAULT_CHANNEL.into(),
        )
        .unwrap();
        let urls: Vec<_> = config.instances.iter().map(Instance::as_str).collect();
        assert_eq!(urls, ["https://b.example", "https://a.example"]);
    }
}
