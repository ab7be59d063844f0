use ledger_core::LedgerError;

/// Top-level error type for the bot process.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Missing or malformed configuration. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),
    /// Telegram API request failed or returned `ok: false`.
    #[error("transport error: {0}")]
    Transport(String),
    /// A report schedule could not be built.
    #[error("schedule error: {0}")]
    Schedule(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl BotError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Transport(err.to_string())
    }
}
