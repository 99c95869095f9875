use std::time::Duration;

use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{PriceWatchError, Result};
use crate::monitor::notifier::MessageSender;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Minimal Telegram Bot API client (`getMe`, `sendMessage`).
///
/// Request errors are stripped of their URL, which embeds the bot token.
#[derive(Clone)]
pub struct TelegramBot {
    http: Client,
    endpoint: String,
}

impl TelegramBot {
    pub fn new(api_base_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        })
    }

    pub async fn get_me(&self) -> Result<BotUser> {
        let res = self
            .http
            .get(format!("{}/getMe", self.endpoint))
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let body: ApiResponse<BotUser> = res.json().await.map_err(|e| e.without_url())?;
        let user = into_result(body)?;
        info!(
            "Telegram bot authorized as {} (id {})",
            user.username.as_deref().unwrap_or("<unnamed>"),
            user.id
        );
        Ok(user)
    }
}

fn into_result<T>(body: ApiResponse<T>) -> Result<T> {
    match (body.ok, body.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(PriceWatchError::TelegramError(
            body.description
                .unwrap_or_else(|| "request failed without description".to_string()),
        )),
    }
}

impl MessageSender for TelegramBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let res = self
            .http
            .post(format!("{}/sendMessage", self.endpoint))
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let body: ApiResponse<serde_json::Value> =
            res.json().await.map_err(|e| e.without_url())?;
        into_result(body).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let bot = TelegramBot::new("https://api.telegram.org/", "123:abc").unwrap();
        assert_eq!(bot.endpoint, "https://api.telegram.org/bot123:abc");
    }

    #[test]
    fn api_error_uses_description() {
        let body: ApiResponse<serde_json::Value> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        match into_result(body) {
            Err(PriceWatchError::TelegramError(msg)) => {
                assert_eq!(msg, "Bad Request: chat not found")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn ok_response_yields_result() {
        let body: ApiResponse<BotUser> = serde_json::from_str(
            r#"{"ok":true,"result":{"id":42,"is_bot":true,"username":"price_bot"}}"#,
        )
        .unwrap();
        let user = into_result(body).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username.as_deref(), Some("price_bot"));
    }
}
