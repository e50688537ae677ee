use crate::models::ScreenerConfig;
use ::config::{Config, Environment, File, FileFormat, Map};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use reqwest::Url;
use std::fs;

/// Default directory holding the configuration file
pub const CONFIG_DIR: &str = "Screener Data";

pub const CONFIG_FILE_NAME: &str = "Screener Config.yaml";

/// Environment variables `SCREENER_<FIELD>` override the file
pub const ENV_PREFIX: &str = "SCREENER";

/// Configuration manager for loading and saving `Screener Config.yaml`.
///
/// Values are layered: built-in defaults, then the YAML file, then
/// `SCREENER_`-prefixed environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if needed.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the configuration file (e.g., "Screener Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the configuration from the file and the process environment.
    ///
    /// A missing file is written out with defaults first.
    pub fn load(&self) -> Result<ScreenerConfig> {
        self.load_with_env(None)
    }

    /// Load the configuration with an explicit set of environment variables.
    ///
    /// `None` reads the process environment.
    pub fn load_with_env(&self, env: Option<Map<String, String>>) -> Result<ScreenerConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, writing defaults",
                self.config_path
            );
            self.save(&ScreenerConfig::default())?;
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(env);

        let settings = Config::builder()
            .add_source(File::new(self.config_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: ScreenerConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        validate_config(&config)
            .with_context(|| format!("Invalid configuration in {}", self.config_path))?;

        tracing::info!(
            "Loaded config from {} (environment: {:?}, backend: {})",
            self.config_path,
            config.environment,
            config.base_url()
        );
        Ok(config)
    }

    /// Save the configuration file.
    pub fn save(&self, config: &ScreenerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Reject configurations the client can't work with.
///
/// The base URL must be an absolute http(s) URL with a host, and both
/// timeouts must be non-zero.
pub fn validate_config(config: &ScreenerConfig) -> Result<()> {
    let base_url = config.base_url();
    let url = Url::parse(&base_url)
        .with_context(|| format!("Backend URL is not a valid URL: {:?}", base_url))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("Backend URL must use http or https: {}", base_url);
    }
    if url.host_str().is_none_or(str::is_empty) {
        bail!("Backend URL has no host: {}", base_url);
    }
    if config.health_timeout_secs == 0 {
        bail!("health_timeout_secs must be greater than zero");
    }
    if config.upload_timeout_secs == 0 {
        bail!("upload_timeout_secs must be greater than zero");
    }
    Ok(())
}
