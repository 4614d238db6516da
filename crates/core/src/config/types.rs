use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::classifier::resolve_origin;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Remote analysis service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    /// Location of the page hosting the dashboard. When it is served over
    /// http(s) the analyzer is expected on the same origin.
    #[serde(default)]
    pub page_url: Option<String>,
    /// Origin used when the page is not served over http(s).
    #[serde(default = "default_origin")]
    pub default_origin: String,
    /// Request timeout in seconds, 0 disables it (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AnalyzerConfig {
    /// Origin all analyzer endpoints are resolved against.
    pub fn origin(&self) -> String {
        resolve_origin(self.page_url.as_deref(), &self.default_origin)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            default_origin: default_origin(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Article recommendation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: u32,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> u32 {
    10
}

/// Config as exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub analyzer: SanitizedAnalyzerConfig,
    pub recommend: RecommendConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAnalyzerConfig {
    /// The origin requests actually go to.
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            analyzer: SanitizedAnalyzerConfig {
                origin: config.analyzer.origin(),
                timeout_secs: config.analyzer.timeout().map(|t| t.as_secs()),
            },
            recommend: config.recommend.clone(),
        }
    }
}
