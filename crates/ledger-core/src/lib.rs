//! Core of the ledger bot: what gets recorded, how a chat walks through an entry,
//! and how the weekly/monthly reports are computed and rendered.
//!
//! ```text
//!   chat text --> [SessionStore] --> TransactionRow --> [LedgerStore]
//!                                                            |
//!   report trigger --------------------------------> [aggregate] --> [report] --> text
//! ```

pub mod aggregate;
pub mod category;
pub mod dialogue;
pub mod error;
pub mod observability;
pub mod report;
pub mod store;
pub mod transaction;

pub use aggregate::{Summary, monthly_summary, weekly_summary};
pub use category::Category;
pub use dialogue::{ChatId, DialogueState, SessionStore, TextOutcome};
pub use error::LedgerError;
pub use observability::{LogOutput, LogSettings, init_observability, init_with};
pub use report::{ReportKind, format_rupiah};
pub use store::{CsvLedgerStore, LedgerStore};
pub use transaction::{MAX_AMOUNT, TransactionRow, parse_amount};
