//! Command router: turns chat events into dialogue transitions, ledger appends and
//! replies. Each event is handled to completion before the caller feeds the next one.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use ledger_core::{
    Category, ChatId, LedgerError, LedgerStore, ReportKind, SessionStore, TextOutcome,
    TransactionRow, format_rupiah,
};

use crate::error::BotError;
use crate::telegram::{ChatEvent, ChatTransport, InlineButton, InlineKeyboard, OutboundMessage};

const GREETING: &str = "Halo! Pilih menu:";
const ASK_INCOME: &str = "Masukkan nominal pemasukan kamu:";
const ASK_CATEGORY: &str = "Pilih kategori pengeluaran:";
const NOT_A_NUMBER: &str = "Input harus berupa angka ya. Coba lagi!";

/// Buttons the bot puts on its keyboards, keyed by callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Income,
    Expense,
    Report(ReportKind),
    Category(Category),
}

impl MenuButton {
    pub fn token(self) -> &'static str {
        match self {
            MenuButton::Income => "pemasukan",
            MenuButton::Expense => "pengeluaran",
            MenuButton::Report(ReportKind::Weekly) => "mingguan",
            MenuButton::Report(ReportKind::Monthly) => "bulanan",
            MenuButton::Category(category) => category.token(),
        }
    }

    pub fn from_token(token: &str) -> Option<MenuButton> {
        match token {
            "pemasukan" => Some(MenuButton::Income),
            "pengeluaran" => Some(MenuButton::Expense),
            "mingguan" => Some(MenuButton::Report(ReportKind::Weekly)),
            "bulanan" => Some(MenuButton::Report(ReportKind::Monthly)),
            other => Category::from_token(other).map(MenuButton::Category),
        }
    }

    fn button(self, caption: &str) -> InlineButton {
        InlineButton::new(caption, self.token())
    }
}

/// `/start` menu: two rows of two.
pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard {
        inline_keyboard: vec![
            vec![
                MenuButton::Income.button("✅ Pemasukan"),
                MenuButton::Expense.button("❌ Pengeluaran"),
            ],
            vec![
                MenuButton::Report(ReportKind::Weekly).button("📆 Mingguan"),
                MenuButton::Report(ReportKind::Monthly).button("🗓️ Bulanan"),
            ],
        ],
    }
}

/// One category per row.
pub fn category_menu() -> InlineKeyboard {
    InlineKeyboard {
        inline_keyboard: Category::ALL
            .into_iter()
            .map(|c| vec![MenuButton::Category(c).button(c.caption())])
            .collect(),
    }
}

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct Router {
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn LedgerStore>,
    sessions: Arc<SessionStore>,
    clock: Clock,
}

impl Router {
    /// Entry dates and report periods follow the wall clock in `tz`.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn LedgerStore>,
        sessions: Arc<SessionStore>,
        tz: Tz,
    ) -> Self {
        Self {
            transport,
            store,
            sessions,
            clock: Arc::new(move || Utc::now().with_timezone(&tz).date_naive()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle(&self, event: ChatEvent) -> Result<(), BotError> {
        debug!(
            event = "bot.update",
            domain = "bot",
            kind = event.kind(),
            chat_id = event.chat_id()
        );
        match event {
            ChatEvent::Command { chat_id, name } => self.on_command(chat_id, &name).await,
            ChatEvent::ButtonPress {
                chat_id,
                callback_id,
                token,
            } => {
                if let Err(err) = self.transport.acknowledge(&callback_id).await {
                    warn!(
                        event = "bot.ack_failed",
                        domain = "bot",
                        chat_id = chat_id,
                        error = %err
                    );
                }
                self.on_button(chat_id, &token).await
            }
            ChatEvent::Text { chat_id, body } => self.on_text(chat_id, &body).await,
        }
    }

    async fn on_command(&self, chat_id: ChatId, name: &str) -> Result<(), BotError> {
        match name {
            "start" => {
                self.transport
                    .send(OutboundMessage::plain(chat_id, GREETING).with_keyboard(main_menu()))
                    .await
            }
            other => {
                debug!(event = "bot.command_ignored", domain = "bot", command = other);
                Ok(())
            }
        }
    }

    async fn on_button(&self, chat_id: ChatId, token: &str) -> Result<(), BotError> {
        let Some(button) = MenuButton::from_token(token) else {
            warn!(
                event = "bot.unknown_button",
                domain = "bot",
                chat_id = chat_id,
                token = token
            );
            return Ok(());
        };
        match button {
            MenuButton::Income => {
                self.sessions.select_income(chat_id);
                self.transport
                    .send(OutboundMessage::plain(chat_id, ASK_INCOME))
                    .await
            }
            MenuButton::Expense => {
                self.sessions.select_expense(chat_id);
                self.transport
                    .send(OutboundMessage::plain(chat_id, ASK_CATEGORY).with_keyboard(category_menu()))
                    .await
            }
            MenuButton::Category(category) => {
                self.sessions.pick_category(chat_id, category);
                self.transport
                    .send(OutboundMessage::markdown(
                        chat_id,
                        format!(
                            "Masukkan nominal pengeluaran untuk kategori *{}*:",
                            category
                        ),
                    ))
                    .await
            }
            MenuButton::Report(kind) => self.send_report(chat_id, kind).await,
        }
    }

    async fn on_text(&self, chat_id: ChatId, body: &str) -> Result<(), BotError> {
        match self.sessions.on_text(chat_id, body, self.today()) {
            TextOutcome::Ignored => Ok(()),
            TextOutcome::Reprompt(_) => {
                self.transport
                    .send(OutboundMessage::plain(chat_id, NOT_A_NUMBER))
                    .await
            }
            TextOutcome::Record(row) => self.record(chat_id, row).await,
        }
    }

    async fn record(&self, chat_id: ChatId, row: TransactionRow) -> Result<(), BotError> {
        let appended = {
            let row = row.clone();
            self.with_store(move |store| store.append(&row)).await
        };
        if let Err(err) = appended {
            warn!(
                event = "bot.entry_failed",
                domain = "bot",
                chat_id = chat_id,
                error = %err
            );
            return self
                .transport
                .send(OutboundMessage::plain(
                    chat_id,
                    format!("Gagal mencatat transaksi.\nError: {}", err),
                ))
                .await;
        }
        self.sessions.complete(chat_id);
        info!(
            event = "bot.entry_recorded",
            domain = "bot",
            chat_id = chat_id,
            kind = if row.is_income() { "income" } else { "expense" },
            week = row.week_number
        );
        let reply = match (row.income, row.expense, row.category) {
            (Some(amount), _, _) => OutboundMessage::plain(
                chat_id,
                format!("Pemasukan sebesar {} berhasil dicatat!", format_rupiah(amount)),
            ),
            (None, Some(amount), Some(category)) => OutboundMessage::markdown(
                chat_id,
                format!(
                    "Pengeluaran {} untuk *{}* berhasil dicatat!",
                    format_rupiah(amount),
                    category
                ),
            ),
            _ => OutboundMessage::plain(chat_id, "Transaksi berhasil dicatat!"),
        };
        self.transport.send(reply).await
    }

    /// Build the report for the current period and send it to `chat_id`. A ledger
    /// failure is sent to the chat as a message carrying the cause.
    pub async fn send_report(&self, chat_id: ChatId, kind: ReportKind) -> Result<(), BotError> {
        let today = self.today();
        let message = match self.with_store(move |store| kind.build(store, today)).await {
            Ok(text) => {
                info!(
                    event = "bot.report_sent",
                    domain = "bot",
                    chat_id = chat_id,
                    report = kind.name()
                );
                OutboundMessage::markdown(chat_id, text)
            }
            Err(err) => {
                warn!(
                    event = "bot.report_failed",
                    domain = "bot",
                    chat_id = chat_id,
                    report = kind.name(),
                    error = %err
                );
                OutboundMessage::plain(chat_id, kind.failure_message(&err))
            }
        };
        self.transport.send(message).await
    }

    /// Run a ledger operation off the async workers.
    async fn with_store<T: Send + 'static>(
        &self,
        op: impl FnOnce(&dyn LedgerStore) -> Result<T, LedgerError> + Send + 'static,
    ) -> Result<T, LedgerError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| LedgerError::store(format!("ledger task failed: {}", e)))?
    }
}
