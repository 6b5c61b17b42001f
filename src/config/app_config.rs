use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const SETTINGS_FILE: &str = "Settings.toml";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub base: BaseConfig,
    #[serde(default)]
    pub file: FileConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub delay: DelayConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub name: String,
    pub max_concurrency: usize,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            name: "price_watch".to_string(),
            max_concurrency: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// CSV with an `id,url[,selector]` header.
    pub source_data: String,
    /// Directory receiving `latest_prices.csv` and `latest_prices.json`.
    pub output_dir: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            source_data: "urls.csv".to_string(),
            output_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Extra attempts after the first one, only for transient failures.
    pub max_retries: u32,
    /// Base of the exponential backoff between attempts.
    pub retry_delay_ms: u64,
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 1000,
            max_redirects: 10,
        }
    }
}

/// Pause applied after every URL, in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub min_delay: u64,
    pub max_delay: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_delay: 1000,
            max_delay: 1000,
        }
    }
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(SETTINGS_FILE)
}

/// Reads the optional settings file, then lets `APP_` variables override it
/// (`APP_HTTP__TIMEOUT_SECS=10` sets `http.timeout_secs`).
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<AppConfig>()
}
