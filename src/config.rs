use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

/// Default endpoint template. `{symbol}` and `{apikey}` are substituted per request.
pub const DEFAULT_API_URL: &str =
    "https://www.alphavantage.co/query?function=DIGITAL_CURRENCY_WEEKLY&symbol={symbol}&market=EUR&apikey={apikey}";

/// Number of weekly points requested per symbol.
pub const WEEKS_PER_SYMBOL: usize = 25;

/// Per-run configuration shared by both collection modes.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub db_path: PathBuf,
    pub api_url: String,
    pub api_key: String,
    pub currency_list_path: PathBuf,
    pub index_path: PathBuf,
    pub production: bool,
    /// Pause applied between request batches to honour the per-minute quota.
    pub pace: Duration,
    /// Back-off applied when the daily quota is exhausted in production mode.
    pub limit_backoff: Duration,
}

impl CollectorConfig {
    pub fn new(
        db_path: impl Into<PathBuf>,
        api_key_path: impl AsRef<Path>,
        api_url: impl Into<String>,
        currency_list_path: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        production: bool,
    ) -> Result<Self> {
        let api_key = read_api_key(api_key_path.as_ref())?;
        Ok(Self {
            db_path: db_path.into(),
            api_url: api_url.into(),
            api_key,
            currency_list_path: currency_list_path.into(),
            index_path: index_path.into(),
            production,
            pace: Duration::from_secs(60),
            limit_backoff: Duration::from_secs(24 * 60 * 60),
        })
    }

    /// Render the request URL for one symbol.
    pub fn url_for(&self, symbol: &str) -> String {
        self.api_url
            .replace("{symbol}", symbol)
            .replace("{apikey}", &self.api_key)
    }
}

/// Read the API key from its file. Keys issued by the provider are exactly
/// 16 characters long; anything else is a malformed key file.
fn read_api_key(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).map_err(|_| {
        AppError::message(format!(
            "Error reading the API key file {}. Is it missing?",
            path.display()
        ))
    })?;
    let key = raw.trim_end().to_string();
    if key.len() != 16 {
        return Err(AppError::message(
            "The API key does not have the proper format",
        ));
    }
    Ok(key)
}
