//! Per-chat entry dialogue.
//!
//! ```text
//!   Idle --income--> AwaitingIncome --amount--> Idle (income row)
//!   Idle --expense--> ChoosingCategory --category--> AwaitingExpense(C) --amount--> Idle (expense row)
//! ```
//!
//! `Idle` is the absence of an entry in the [`SessionStore`]. A chat holds at most one
//! pending state; selecting again overwrites it. Sessions live in memory for the lifetime
//! of the process.

use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use crate::category::Category;
use crate::transaction::{TransactionRow, parse_amount};

/// Telegram chat identifier.
pub type ChatId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    AwaitingIncome,
    ChoosingCategory,
    AwaitingExpense(Category),
}

impl DialogueState {
    pub const fn name(self) -> &'static str {
        match self {
            DialogueState::AwaitingIncome => "awaiting_income",
            DialogueState::ChoosingCategory => "choosing_category",
            DialogueState::AwaitingExpense(_) => "awaiting_expense",
        }
    }

    /// The row a valid amount produces in this state, if this state takes an amount.
    fn entry(self, amount: u64, today: NaiveDate) -> Option<TransactionRow> {
        match self {
            DialogueState::AwaitingIncome => Some(TransactionRow::income(today, amount)),
            DialogueState::AwaitingExpense(category) => {
                Some(TransactionRow::expense(today, amount, category))
            }
            DialogueState::ChoosingCategory => None,
        }
    }
}

/// Result of feeding free text to a chat's dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// The chat is not waiting for an amount.
    Ignored,
    /// The text is not a valid amount; the state is unchanged.
    Reprompt(DialogueState),
    /// A complete entry. The pending state stays until [`SessionStore::complete`].
    Record(TransactionRow),
}

/// Pending dialogue state per chat.
#[derive(Debug, Default)]
pub struct SessionStore {
    states: DashMap<ChatId, DialogueState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, chat: ChatId) -> Option<DialogueState> {
        self.states.get(&chat).map(|s| *s)
    }

    pub fn select_income(&self, chat: ChatId) -> DialogueState {
        self.set(chat, DialogueState::AwaitingIncome)
    }

    pub fn select_expense(&self, chat: ChatId) -> DialogueState {
        self.set(chat, DialogueState::ChoosingCategory)
    }

    /// Accepted in any state so that an older category keyboard still works.
    pub fn pick_category(&self, chat: ChatId, category: Category) -> DialogueState {
        self.set(chat, DialogueState::AwaitingExpense(category))
    }

    pub fn on_text(&self, chat: ChatId, text: &str, today: NaiveDate) -> TextOutcome {
        let Some(state) = self.state(chat) else {
            return TextOutcome::Ignored;
        };
        if state == DialogueState::ChoosingCategory {
            return TextOutcome::Ignored;
        }
        match parse_amount(text) {
            Ok(amount) => match state.entry(amount, today) {
                Some(row) => TextOutcome::Record(row),
                None => TextOutcome::Ignored,
            },
            Err(err) => {
                debug!(
                    event = "dialogue.invalid_amount",
                    domain = "dialogue",
                    chat_id = chat,
                    state = state.name(),
                    error = %err
                );
                TextOutcome::Reprompt(state)
            }
        }
    }

    /// Return the chat to idle once its entry is stored.
    pub fn complete(&self, chat: ChatId) {
        self.states.remove(&chat);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn set(&self, chat: ChatId, state: DialogueState) -> DialogueState {
        let previous = self.states.insert(chat, state);
        debug!(
            event = "dialogue.transition",
            domain = "dialogue",
            chat_id = chat,
            from = previous.map(DialogueState::name).unwrap_or("idle"),
            to = state.name()
        );
        state
    }
}
