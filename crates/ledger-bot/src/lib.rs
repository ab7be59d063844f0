//! Telegram front end for the ledger: configuration, Bot API transport, the
//! command router that drives the entry dialogue, and the report schedule.

pub mod config;
pub mod error;
pub mod router;
pub mod schedule;
pub mod telegram;

pub use config::BotConfig;
pub use error::BotError;
pub use router::Router;
pub use schedule::ReportSchedule;
pub use telegram::{ChatEvent, ChatTransport, OutboundMessage, TelegramClient};
