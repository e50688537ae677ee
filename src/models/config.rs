use serde::{Deserialize, Serialize};

/// Base URL used when running against a backend on the same machine
pub const LOCAL_API_URL: &str = "http://localhost:8000";

/// Base URL of the hosted backend
pub const DEPLOYED_API_URL: &str = "https://ai-resume-screener-backend.onrender.com";

/// Which backend deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiEnvironment {
    #[default]
    Local,
    Deployed,
}

impl ApiEnvironment {
    pub fn default_url(&self) -> &'static str {
        match self {
            Self::Local => LOCAL_API_URL,
            Self::Deployed => DEPLOYED_API_URL,
        }
    }
}

/// User configuration from `Screener Config.yaml`
///
/// Every field can be overridden with a `SCREENER_`-prefixed environment
/// variable (see [`crate::config::ConfigManager`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    #[serde(default)]
    pub environment: ApiEnvironment,

    /// Explicit base URL; wins over `environment` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,

    /// Interval of the decorative analysis-phase animation
    #[serde(default = "default_phase_tick")]
    pub phase_tick_ms: u64,

    #[serde(default)]
    pub debug_mode: bool,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            environment: ApiEnvironment::Local,
            api_url: None,
            health_timeout_secs: default_health_timeout(),
            upload_timeout_secs: default_upload_timeout(),
            phase_tick_ms: default_phase_tick(),
            debug_mode: false,
        }
    }
}

impl ScreenerConfig {
    /// The base URL requests are sent to, without a trailing slash
    pub fn base_url(&self) -> String {
        let url = self
            .api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.environment.default_url());
        url.trim().trim_end_matches('/').to_string()
    }
}

fn default_health_timeout() -> u64 {
    5
}

fn default_upload_timeout() -> u64 {
    30
}

fn default_phase_tick() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screener_config_defaults() {
        let config = ScreenerConfig::default();
        assert_eq!(config.environment, ApiEnvironment::Local);
        assert_eq!(config.health_timeout_secs, 5);
        assert_eq!(config.upload_timeout_secs, 30);
        assert_eq!(config.phase_tick_ms, 100);
        assert_eq!(config.base_url(), LOCAL_API_URL);
    }

    #[test]
    fn test_base_url_prefers_explicit_override() {
        let config = ScreenerConfig {
            environment: ApiEnvironment::Deployed,
            api_url: Some("http://10.0.0.5:9000/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://10.0.0.5:9000");
    }

    #[test]
    fn test_deployed_environment() {
        let config = ScreenerConfig {
            environment: ApiEnvironment::Deployed,
            api_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.base_url(), DEPLOYED_API_URL);
    }
}
