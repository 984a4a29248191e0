//! `config.json` loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use bondscope_core::{Error, Result, ScreenerSettings};

/// Environment variable that takes precedence over `TOKEN`.
pub const TOKEN_ENV: &str = "BONDSCOPE_TOKEN";

const DEFAULT_TABLE_NAME: &str = "bonds.xlsx";

/// Raw configuration file. Key names follow the established file format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ConfigFile {
    #[serde(default)]
    token: String,
    #[serde(default = "default_api_delay")]
    api_delay: f64,
    #[serde(default = "default_table_name")]
    excel_table_name: String,
    #[serde(default)]
    for_qual_investor: bool,
    #[serde(default)]
    amortization: bool,
    #[serde(default)]
    floating_coupon: bool,
    currency: Option<String>,
    excluded_class_code: Option<String>,
    retry_attempts: Option<u32>,
    ratings_dir: Option<PathBuf>,
    #[serde(default)]
    accept_invalid_certs: bool,
}

fn default_api_delay() -> f64 {
    0.5
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub output: PathBuf,
    pub settings: ScreenerSettings,
}

impl Config {
    /// Reads `path`, then lets `BONDSCOPE_TOKEN` replace the token.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text, std::env::var(TOKEN_ENV).ok())
    }

    pub fn parse(text: &str, token_override: Option<String>) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("malformed configuration: {}", e)))?;

        let token = token_override
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(file.token);
        if token.trim().is_empty() {
            return Err(Error::Config("TOKEN is missing or empty".to_string()));
        }

        let api_delay = Duration::try_from_secs_f64(file.api_delay)
            .map_err(|_| Error::Config(format!("invalid API_DELAY: {}", file.api_delay)))?;

        let defaults = ScreenerSettings::default();
        let settings = ScreenerSettings {
            api_delay,
            for_qual_investor: file.for_qual_investor,
            amortization: file.amortization,
            floating_coupon: file.floating_coupon,
            currency: file.currency.unwrap_or(defaults.currency),
            excluded_class_code: file
                .excluded_class_code
                .unwrap_or(defaults.excluded_class_code),
            retry_attempts: file.retry_attempts.unwrap_or(defaults.retry_attempts),
            ratings_dir: file.ratings_dir.unwrap_or(defaults.ratings_dir),
            accept_invalid_certs: file.accept_invalid_certs,
        };
        settings.validate()?;

        Ok(Self {
            token,
            output: PathBuf::from(file.excel_table_name),
            settings,
        })
    }
}
