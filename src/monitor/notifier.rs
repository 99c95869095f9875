use std::future::Future;

use log::{error, info};

use crate::error::Result;

/// Delivers one plain-text message to one chat.
pub trait MessageSender: Send + Sync {
    fn send_message(&self, chat_id: i64, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Used when no bot credential is configured: messages only reach the log.
#[derive(Debug, Default, Clone)]
pub struct LogSender;

impl MessageSender for LogSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        info!("[chat {}] {}", chat_id, text);
        Ok(())
    }
}

/// A target hit, before it is addressed to any destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub price: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotification {
    pub chat_id: i64,
    pub symbol: String,
    pub price: f64,
    pub target: f64,
}

impl AlertNotification {
    pub fn message(&self) -> String {
        format!(
            "ALERT: {} reached price ${:.2}, near target ${:.2}",
            self.symbol, self.price, self.target
        )
    }
}

pub struct Notifier<S> {
    sender: S,
    chat_ids: Vec<i64>,
}

impl<S: MessageSender> Notifier<S> {
    pub fn new(sender: S, chat_ids: Vec<i64>) -> Self {
        Self { sender, chat_ids }
    }

    /// Sends `alert` to every chat in order. A failed chat is logged and
    /// skipped; returns how many deliveries succeeded.
    pub async fn broadcast(&self, alert: &Alert) -> usize {
        let mut delivered = 0;

        for &chat_id in &self.chat_ids {
            let notification = AlertNotification {
                chat_id,
                symbol: alert.symbol.clone(),
                price: alert.price,
                target: alert.target,
            };

            match self
                .sender
                .send_message(chat_id, &notification.message())
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => error!("Failed to send message to chat {}: {}", chat_id, e),
            }
        }

        delivered
    }
}
