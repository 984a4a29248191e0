//! Screener settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use bondscope_market_data::retry::DEFAULT_ATTEMPTS;

use crate::errors::{Error, Result};

/// Which bonds to screen and how hard to push the remote services.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenerSettings {
    /// Pause after each instrument.
    pub api_delay: Duration,
    pub for_qual_investor: bool,
    pub amortization: bool,
    pub floating_coupon: bool,
    /// Settlement currency, lower case as the gateway reports it.
    pub currency: String,
    /// Trading class excluded from the screen.
    pub excluded_class_code: String,
    pub retry_attempts: u32,
    /// Where the rating spreadsheets are cached.
    pub ratings_dir: PathBuf,
    /// Tolerate broken TLS certificates on the rating sites.
    pub accept_invalid_certs: bool,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            api_delay: Duration::from_millis(500),
            for_qual_investor: false,
            amortization: false,
            floating_coupon: false,
            currency: "rub".to_string(),
            excluded_class_code: "PSAU".to_string(),
            retry_attempts: DEFAULT_ATTEMPTS,
            ratings_dir: PathBuf::from("."),
            accept_invalid_certs: false,
        }
    }
}

impl ScreenerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.retry_attempts == 0 {
            return Err(Error::Config("retry attempts must be at least 1".to_string()));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Config("currency must not be empty".to_string()));
        }
        Ok(())
    }
}
