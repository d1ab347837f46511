//! Raw Telegram Bot API calls

use secrecy::ExposeSecret;

use super::types::*;
use crate::reasoning::retry::{delay_for_attempt, is_recoverable, parse_retry_after};
use crate::{Error, Result};

impl super::TelegramChannel {
    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}{}/{method}", self.token.expose_secret())
    }

    /// Send a plain-text message, retrying rate limits and server errors
    ///
    /// # Errors
    ///
    /// Returns error if the API rejects the message or retries run out
    pub(crate) async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<()> {
        let url = self.method_url("sendMessage");
        let request = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            reply_markup,
        };

        let mut attempt = 1;
        loop {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Channel(format!("Telegram API error: {e}")))?;

            let status = response.status();
            if status.is_success() {
                tracing::debug!(chat_id, "Telegram message sent");
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();

            if attempt < self.send_policy.max_attempts && is_recoverable(status.as_u16()) {
                let delay = delay_for_attempt(&self.send_policy, attempt, parse_retry_after(&body));
                tracing::warn!(
                    chat_id,
                    attempt,
                    status = status.as_u16(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Telegram sendMessage failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let lower = body.to_lowercase();
            if lower.contains("chat not found") || lower.contains("bot was blocked by the user") {
                return Err(Error::Channel(format!(
                    "Telegram chat {chat_id} not reachable: {body}"
                )));
            }

            return Err(Error::Channel(format!(
                "Telegram API error: {status} - {body}"
            )));
        }
    }

    /// Fetch the bot's own identity
    ///
    /// # Errors
    ///
    /// Returns error if the token is invalid or the API is unreachable
    pub async fn get_me(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getMe error: {e}")))?;

        let parsed: TelegramResponse<BotUser> = response
            .json()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getMe parse error: {e}")))?;

        let description = parsed.description.unwrap_or_default();
        let bot = parsed
            .result
            .filter(|_| parsed.ok)
            .ok_or_else(|| Error::Channel(format!("Telegram getMe error: {description}")))?;

        tracing::info!(bot_id = bot.id, username = ?bot.username, "Telegram bot identified");
        Ok(bot.username)
    }

    /// Download a file from Telegram by `file_id`
    ///
    /// Calls `getFile` to get the file path, then downloads from
    /// `https://api.telegram.org/file/bot{token}/{file_path}`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransportFetch` if the lookup or download fails
    pub(crate) async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let request = GetFileRequest {
            file_id: file_id.to_string(),
        };

        let parsed: TelegramResponse<TelegramFile> = self
            .client
            .post(self.method_url("getFile"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TransportFetch(format!("Telegram getFile error: {e}")))?
            .json()
            .await
            .map_err(|e| Error::TransportFetch(format!("Telegram getFile parse error: {e}")))?;

        let file_path = parsed
            .result
            .and_then(|f| f.file_path)
            .ok_or_else(|| {
                Error::TransportFetch(format!(
                    "Telegram getFile returned no file_path: {}",
                    parsed.description.unwrap_or_default()
                ))
            })?;

        let download_url = format!("{FILE_BASE}{}/{file_path}", self.token.expose_secret());
        let response = self
            .client
            .get(&download_url)
            .send()
            .await
            .map_err(|e| Error::TransportFetch(format!("Telegram file download error: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::TransportFetch(format!(
                "Telegram file download error: {}",
                response.status()
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::TransportFetch(format!("Telegram file download read error: {e}")))?;

        tracing::debug!(bytes = data.len(), "Telegram file downloaded");
        Ok(data.to_vec())
    }

    /// Sync bot commands with Telegram via `setMyCommands`
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn sync_commands(&self, commands: &[BotCommand]) -> Result<()> {
        let request = SetMyCommandsRequest {
            commands: commands.to_vec(),
        };

        let response = self
            .client
            .post(self.method_url("setMyCommands"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram setMyCommands error: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram setMyCommands error: {body}"
            )));
        }

        tracing::info!(count = commands.len(), "Telegram bot commands synced");
        Ok(())
    }
}
