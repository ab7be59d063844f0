use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::BotError;

/// Load `.env` from the crate directory and then the working directory.
pub fn init() {
    let _ = dotenvy::from_path(Path::new(
        format!("{}/.env", env!("CARGO_MANIFEST_DIR")).as_str(),
    ));
    dotenvy::dotenv().ok();
}

/// Process configuration.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Bot API token from @BotFather.
    pub token: String,
    /// Chat that receives the scheduled reports.
    pub report_chat_id: i64,
    /// Ledger CSV file.
    pub ledger_path: PathBuf,
    /// Timezone for entry dates and report schedules.
    pub timezone: Tz,
    /// Bot API base URL, overridable for a local test server.
    pub api_base: String,
    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout: Duration,
}

impl BotConfig {
    pub fn new(token: impl Into<String>, report_chat_id: i64) -> Self {
        Self {
            token: token.into(),
            report_chat_id,
            ledger_path: PathBuf::from("transaksi.csv"),
            timezone: chrono_tz::Asia::Jakarta,
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout: Duration::from_secs(30),
        }
    }

    /// Builds a config from the process environment.
    ///
    /// Required: `BOT_TOKEN`, `CHAT_ID`.
    /// Optional: `LEDGER_PATH`, `LEDGER_TIMEZONE`, `TELEGRAM_API_BASE`,
    /// `TELEGRAM_POLL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BotError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = get("BOT_TOKEN")
            .ok_or_else(|| BotError::Config("missing BOT_TOKEN for the Telegram bot".into()))?;
        let chat_raw = get("CHAT_ID")
            .ok_or_else(|| BotError::Config("missing CHAT_ID for scheduled reports".into()))?;
        let report_chat_id = chat_raw
            .parse::<i64>()
            .map_err(|e| BotError::Config(format!("CHAT_ID '{}' is not numeric: {}", chat_raw, e)))?;

        let mut config = Self::new(token, report_chat_id);
        if let Some(path) = get("LEDGER_PATH") {
            config.ledger_path = PathBuf::from(path);
        }
        if let Some(tz) = get("LEDGER_TIMEZONE") {
            config.timezone = tz
                .parse::<Tz>()
                .map_err(|e| BotError::Config(format!("LEDGER_TIMEZONE '{}': {}", tz, e)))?;
        }
        if let Some(base) = get("TELEGRAM_API_BASE") {
            config.api_base = base;
        }
        if let Some(secs) = get("TELEGRAM_POLL_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                BotError::Config(format!("TELEGRAM_POLL_TIMEOUT_SECS '{}': {}", secs, e))
            })?;
            config.poll_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }
}
