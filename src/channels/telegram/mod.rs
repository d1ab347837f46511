//! Telegram channel adapter
//!
//! Uses long polling for receiving messages and the Bot API for sending

mod api;
pub mod chunking;
pub mod dedup;
mod polling;
mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use tokio::sync::mpsc;

use super::{Channel, IncomingMessage, KeyboardAction, OutgoingMessage};
use crate::reasoning::RetryPolicy;
use crate::Result;

pub use dedup::UpdateDedup;
pub use types::BotCommand;

use types::ReplyMarkup;

/// Capacity of the inbound message queue
const INBOUND_QUEUE: usize = 100;

/// Telegram channel adapter
#[derive(Clone)]
pub struct TelegramChannel {
    token: SecretString,
    client: Client,
    message_tx: Option<mpsc::Sender<IncomingMessage>>,
    send_policy: RetryPolicy,
}

impl TelegramChannel {
    /// Create a send-only Telegram channel adapter
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            client: Client::new(),
            message_tx: None,
            send_policy: default_send_policy(),
        }
    }

    /// Create with a message receiver for polling mode
    ///
    /// Returns the channel and a receiver for incoming messages
    #[must_use]
    pub fn with_receiver(token: SecretString) -> (Self, mpsc::Receiver<IncomingMessage>) {
        let (tx, rx) = mpsc::channel(INBOUND_QUEUE);
        let channel = Self {
            message_tx: Some(tx),
            ..Self::new(token)
        };
        (channel, rx)
    }

    /// Verify the token and register the bot's commands
    ///
    /// # Errors
    ///
    /// Returns error if the token is rejected
    pub async fn connect(&self) -> Result<()> {
        self.get_me().await?;

        let commands = [BotCommand {
            command: "start".to_string(),
            description: "Начать / главное меню".to_string(),
        }];
        if let Err(e) = self.sync_commands(&commands).await {
            tracing::warn!(error = %e, "failed to sync Telegram commands");
        }

        tracing::info!("Telegram channel connected");
        Ok(())
    }
}

/// Retry schedule for outbound sends: 0.5s doubling up to 30s
fn default_send_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(500),
        min_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(30),
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let chunks = chunking::chunk_text(&message.content, chunking::DEFAULT_LIMIT);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            // Keyboard changes ride on the final chunk only
            let action = if i == last {
                message.keyboard
            } else {
                KeyboardAction::Keep
            };
            self.send_message(message.chat_id, chunk, ReplyMarkup::for_action(action))
                .await?;
        }

        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        self.fetch_file(file_id).await
    }
}
