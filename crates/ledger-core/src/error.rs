/// Failures the ledger core can report.
///
/// Validation errors are recovered in the dialogue (the user is asked again);
/// store errors are surfaced with their cause. Configuration failures belong to
/// the bot crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// User input could not be used as an amount.
    #[error("validation error: {0}")]
    Validation(String),
    /// The ledger file is missing, unreadable or has an unexpected layout.
    #[error("store error: {0}")]
    Store(String),
}

impl LedgerError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Store(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_become_store_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "transaksi.csv");
        let err = LedgerError::from(io);
        assert!(matches!(err, LedgerError::Store(_)));
        assert!(err.to_string().contains("transaksi.csv"));
    }
}
