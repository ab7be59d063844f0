use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "ledger-bot.logs.jsonl";

/// Where the bot's events go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Compact lines on stdout.
    Console,
    /// One JSON object per event, appended to `dir/file_name`.
    JsonFile { dir: PathBuf, file_name: String },
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    /// Explicit filter directive; `None` falls back to `RUST_LOG`, then `info`.
    pub filter: Option<String>,
    pub output: LogOutput,
}

impl LogSettings {
    /// Read `LEDGER_OBSERVABILITY_ENABLED`, `LEDGER_LOG_LEVEL` and
    /// `LEDGER_JSON_LOG_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // Unrecognised switch values leave logging on.
        let enabled = get("LEDGER_OBSERVABILITY_ENABLED")
            .and_then(|v| switch_value(&v))
            .unwrap_or(true);
        let filter = get("LEDGER_LOG_LEVEL").filter(|f| EnvFilter::try_new(f).is_ok());
        let output = match get("LEDGER_JSON_LOG_PATH") {
            Some(raw) => json_output(Path::new(&raw)),
            None => LogOutput::Console,
        };
        Self {
            enabled,
            filter,
            output,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.filter
            .as_deref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

fn switch_value(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn json_output(path: &Path) -> LogOutput {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    LogOutput::JsonFile { dir, file_name }
}

/// Initialize logging once per process from [`LogSettings::from_env`].
///
/// Later calls are no-ops, as is a call made after another global subscriber
/// was installed.
pub fn init_observability() {
    init_with(LogSettings::from_env());
}

/// Initialize logging once per process with explicit settings.
pub fn init_with(settings: LogSettings) {
    INIT.get_or_init(|| {
        if !settings.enabled {
            return;
        }
        let env_filter = settings.env_filter();
        match &settings.output {
            LogOutput::JsonFile { dir, file_name } => {
                let _ = std::fs::create_dir_all(dir);
                let writer = tracing_appender::rolling::never(dir, file_name);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(false)
                    .with_writer(writer);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer)
                    .try_init();
            }
            LogOutput::Console => {
                let layer = tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stdout);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer)
                    .try_init();
            }
        }
        tracing::debug!(
            event = "observability.ready",
            domain = "ledger",
            json = matches!(settings.output, LogOutput::JsonFile { .. })
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_log_to_console() {
        let settings = LogSettings::from_lookup(lookup(&[]));
        assert!(settings.enabled);
        assert_eq!(settings.filter, None);
        assert_eq!(settings.output, LogOutput::Console);
    }

    #[test]
    fn switch_accepts_common_spellings() {
        let off = LogSettings::from_lookup(lookup(&[("LEDGER_OBSERVABILITY_ENABLED", " Off ")]));
        assert!(!off.enabled);
        let on = LogSettings::from_lookup(lookup(&[("LEDGER_OBSERVABILITY_ENABLED", "yes")]));
        assert!(on.enabled);
        let unknown =
            LogSettings::from_lookup(lookup(&[("LEDGER_OBSERVABILITY_ENABLED", "maybe")]));
        assert!(unknown.enabled);
    }

    #[test]
    fn invalid_level_is_dropped() {
        let settings = LogSettings::from_lookup(lookup(&[("LEDGER_LOG_LEVEL", "ledger=loud")]));
        assert_eq!(settings.filter, None);
        let settings = LogSettings::from_lookup(lookup(&[("LEDGER_LOG_LEVEL", "debug")]));
        assert_eq!(settings.filter.as_deref(), Some("debug"));
    }

    #[test]
    fn json_path_splits_into_dir_and_file() {
        let settings = LogSettings::from_lookup(lookup(&[(
            "LEDGER_JSON_LOG_PATH",
            "logs/bot.jsonl",
        )]));
        assert_eq!(
            settings.output,
            LogOutput::JsonFile {
                dir: PathBuf::from("logs"),
                file_name: "bot.jsonl".into(),
            }
        );
        let bare = LogSettings::from_lookup(lookup(&[("LEDGER_JSON_LOG_PATH", "bot.jsonl")]));
        assert_eq!(
            bare.output,
            LogOutput::JsonFile {
                dir: PathBuf::from("."),
                file_name: "bot.jsonl".into(),
            }
        );
    }

    #[test]
    fn init_is_idempotent() {
        init_observability();
        init_observability();
        tracing::info!(event = "test.logged", domain = "test");
    }
}
