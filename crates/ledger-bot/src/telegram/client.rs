use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ChatTransport, OutboundMessage, TextFormat, Update};
use crate::config::BotConfig;
use crate::error::BotError;

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

fn parse_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, BotError> {
    let envelope: ApiResponse<T> = serde_json::from_str(body).map_err(|e| {
        BotError::transport(format!("{}: invalid response: {}", method, e))
    })?;
    if !envelope.ok {
        return Err(BotError::transport(format!(
            "{} failed: code={} description={}",
            method,
            envelope
                .error_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".into()),
            envelope.description.unwrap_or_default()
        )));
    }
    envelope
        .result
        .ok_or_else(|| BotError::transport(format!("{}: response without result", method)))
}

/// Telegram Bot API client over reqwest.
pub struct TelegramClient {
    http: reqwest::Client,
    config: BotConfig,
}

impl TelegramClient {
    pub fn new(config: &BotConfig) -> Result<Self, BotError> {
        // The request timeout must outlast the long-poll window.
        let http = reqwest::Client::builder()
            .timeout(config.poll_timeout + Duration::from_secs(10))
            .user_agent(concat!("ledger-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, BotError> {
        let resp = self
            .http
            .post(self.config.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::transport(format!("{}: {}", method, e.without_url())))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BotError::transport(format!("{}: {}", method, e.without_url())))?;
        debug!(
            event = "telegram.response",
            domain = "telegram",
            method = method,
            status = status.as_u16(),
            body_len = body.len() as u64
        );
        parse_response(method, &body)
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, BotError> {
        let mut payload = serde_json::json!({
            "timeout": self.config.poll_timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            payload["offset"] = serde_json::json!(offset);
        }
        self.call("getUpdates", payload).await
    }
}

fn send_message_payload(message: &OutboundMessage) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "chat_id": message.chat_id,
        "text": message.text,
    });
    if message.format == TextFormat::Markdown {
        payload["parse_mode"] = serde_json::json!("Markdown");
    }
    if let Some(keyboard) = &message.keyboard {
        payload["reply_markup"] = serde_json::json!(keyboard);
    }
    payload
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, message: OutboundMessage) -> Result<(), BotError> {
        let _: serde_json::Value = self
            .call("sendMessage", send_message_payload(&message))
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), BotError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                serde_json::json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::{InlineButton, InlineKeyboard};

    #[test]
    fn ok_envelope_yields_result() {
        let updates: Vec<Update> = parse_response(
            "getUpdates",
            r#"{"ok":true,"result":[{"update_id":10,"message":{"message_id":1,"chat":{"id":3},"text":"hi"}}]}"#,
        )
        .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 10);
    }

    #[test]
    fn error_envelope_yields_transport_error() {
        let err = parse_response::<serde_json::Value>(
            "sendMessage",
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BotError::Transport(_)));
        let text = err.to_string();
        assert!(text.contains("sendMessage failed"));
        assert!(text.contains("400"));
        assert!(text.contains("chat not found"));
    }

    #[test]
    fn garbage_body_is_transport_error() {
        let err = parse_response::<bool>("answerCallbackQuery", "<html>502</html>").unwrap_err();
        assert!(err.to_string().contains("invalid response"));
    }

    #[test]
    fn markdown_message_payload() {
        let message = OutboundMessage::markdown(12, "*hi*").with_keyboard(InlineKeyboard {
            inline_keyboard: vec![vec![InlineButton::new("A", "a")]],
        });
        let payload = send_message_payload(&message);
        assert_eq!(payload["chat_id"], 12);
        assert_eq!(payload["text"], "*hi*");
        assert_eq!(payload["parse_mode"], "Markdown");
        assert_eq!(payload["reply_markup"]["inline_keyboard"][0][0]["callback_data"], "a");
    }

    #[test]
    fn plain_message_payload_has_no_parse_mode() {
        let payload = send_message_payload(&OutboundMessage::plain(1, "x"));
        assert!(payload.get("parse_mode").is_none());
        assert!(payload.get("reply_markup").is_none());
    }

    #[test]
    fn client_builds_from_config() {
        let config = BotConfig::new("t", 1);
        assert!(TelegramClient::new(&config).is_ok());
    }
}
