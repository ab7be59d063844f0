//! Chat transport: the events the router consumes and the messages it sends.
//! The router only talks to [`ChatTransport`]; [`TelegramClient`] is the Bot API
//! implementation used by the binary.

mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ledger_core::ChatId;

use crate::error::BotError;

pub use client::TelegramClient;

/// Inbound chat event, already stripped of Bot API details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// `/name` at the start of a message; the name has no slash or `@bot` suffix.
    Command { chat_id: ChatId, name: String },
    /// Inline keyboard press carrying the button's callback token.
    ButtonPress {
        chat_id: ChatId,
        callback_id: String,
        token: String,
    },
    Text { chat_id: ChatId, body: String },
}

impl ChatEvent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            ChatEvent::Command { chat_id, .. }
            | ChatEvent::ButtonPress { chat_id, .. }
            | ChatEvent::Text { chat_id, .. } => *chat_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::Command { .. } => "command",
            ChatEvent::ButtonPress { .. } => "button_press",
            ChatEvent::Text { .. } => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub format: TextFormat,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutboundMessage {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: None,
        }
    }

    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Markdown,
            ..Self::plain(chat_id, text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Outbound side of the chat transport. Implement and pass to the router.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), BotError>;
    /// Stop the client's loading indicator on a pressed button.
    async fn acknowledge(&self, callback_id: &str) -> Result<(), BotError>;
}

/// Bot API `Update`, reduced to the fields the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Update {
    /// Map to a [`ChatEvent`]; updates the bot does not handle yield `None`.
    pub fn into_event(self) -> Option<ChatEvent> {
        if let Some(query) = self.callback_query {
            let chat_id = query.message.as_ref()?.chat.id;
            return Some(ChatEvent::ButtonPress {
                chat_id,
                callback_id: query.id,
                token: query.data.unwrap_or_default(),
            });
        }
        let message = self.message?;
        let chat_id = message.chat.id;
        let text = message.text?;
        match parse_command(&text) {
            Some(name) => Some(ChatEvent::Command { chat_id, name }),
            None => Some(ChatEvent::Text { chat_id, body: text }),
        }
    }
}

fn parse_command(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix('/')?;
    let word = rest.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    if name.is_empty() {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn start_command_is_recognised() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "message": {"message_id": 5, "chat": {"id": 99, "type": "private"}, "text": "/start"}
        }));
        assert_eq!(
            u.into_event(),
            Some(ChatEvent::Command { chat_id: 99, name: "start".into() })
        );
    }

    #[test]
    fn command_with_bot_suffix_and_args() {
        assert_eq!(parse_command("/start@catat_bot"), Some("start".into()));
        assert_eq!(parse_command("/Start now"), Some("start".into()));
        assert_eq!(parse_command("start"), None);
        assert_eq!(parse_command("/"), None);
    }

    #[test]
    fn plain_text_becomes_text_event() {
        let u = update(serde_json::json!({
            "update_id": 2,
            "message": {"message_id": 6, "chat": {"id": 99}, "text": "15000"}
        }));
        let event = u.into_event().unwrap();
        assert_eq!(event, ChatEvent::Text { chat_id: 99, body: "15000".into() });
        assert_eq!(event.kind(), "text");
    }

    #[test]
    fn callback_query_becomes_button_press() {
        let u = update(serde_json::json!({
            "update_id": 3,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 7},
                "data": "kat_bensin",
                "message": {"message_id": 8, "chat": {"id": -5}, "text": "Pilih kategori pengeluaran:"}
            }
        }));
        let event = u.into_event().unwrap();
        assert_eq!(event.chat_id(), -5);
        assert_eq!(
            event,
            ChatEvent::ButtonPress {
                chat_id: -5,
                callback_id: "cb-1".into(),
                token: "kat_bensin".into()
            }
        );
    }

    #[test]
    fn unsupported_updates_are_skipped() {
        let sticker = update(serde_json::json!({
            "update_id": 4,
            "message": {"message_id": 9, "chat": {"id": 1}, "sticker": {"file_id": "x"}}
        }));
        assert_eq!(sticker.into_event(), None);
        let edited = update(serde_json::json!({"update_id": 5, "edited_message": {}}));
        assert_eq!(edited.into_event(), None);
    }

    #[test]
    fn keyboard_serializes_to_bot_api_shape() {
        let keyboard = InlineKeyboard {
            inline_keyboard: vec![vec![InlineButton::new("⛽ Bensin", "kat_bensin")]],
        };
        assert_eq!(
            serde_json::to_value(&keyboard).unwrap(),
            serde_json::json!({"inline_keyboard": [[{"text": "⛽ Bensin", "callback_data": "kat_bensin"}]]})
        );
    }
}
