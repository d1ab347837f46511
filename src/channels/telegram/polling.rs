//! Telegram polling mode: getUpdates loop and message conversion

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::mpsc;

use super::dedup::UpdateDedup;
use super::types::API_BASE;
use crate::channels::IncomingMessage;

/// Server-side long-poll timeout in seconds
const LONG_POLL_SECS: u64 = 30;

/// Response from Telegram getUpdates API
#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<PollingUpdate>,
    error_code: Option<i64>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

/// Extra fields Telegram attaches to a rejected call
#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

impl GetUpdatesResponse {
    /// Wait before polling again, or `None` when the poll was accepted
    ///
    /// A rejected poll (409 from a second instance, 401 from a revoked token,
    /// 429 flood control) honors `retry_after` and falls back to `interval`.
    fn rejection_delay(&self, interval: Duration) -> Option<Duration> {
        if self.ok {
            return None;
        }
        let retry_after = self.parameters.as_ref().and_then(|p| p.retry_after);
        Some(retry_after.map_or(interval, Duration::from_secs))
    }
}

/// A single update from getUpdates
#[derive(Debug, Deserialize)]
struct PollingUpdate {
    update_id: i64,
    message: Option<PollingMessage>,
}

/// Message from a polling update
#[derive(Debug, Deserialize)]
struct PollingMessage {
    message_id: i64,
    chat: PollingChat,
    from: Option<PollingUser>,
    text: Option<String>,
    caption: Option<String>,
    photo: Option<Vec<PollingPhotoSize>>,
    video: Option<serde_json::Value>,
}

/// Photo size from polling
#[derive(Debug, Deserialize)]
struct PollingPhotoSize {
    file_id: String,
}

/// Chat info from polling
#[derive(Debug, Deserialize)]
struct PollingChat {
    id: i64,
}

/// User info from polling
#[derive(Debug, Deserialize)]
struct PollingUser {
    id: i64,
    is_bot: bool,
    first_name: String,
}

impl super::TelegramChannel {
    /// Spawn a background task that polls Telegram's getUpdates API
    ///
    /// Forwards received messages into the channel created by
    /// [`with_receiver`](super::TelegramChannel::with_receiver). Waits
    /// `interval` after each failed poll, or Telegram's `retry_after` when
    /// it gives one.
    ///
    /// # Panics
    ///
    /// Panics if the channel was not created with a receiver
    pub fn start_polling(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let token = self.token.clone();
        let client = self.client.clone();
        let tx = self
            .message_tx
            .clone()
            .expect("start_polling requires a message_tx (use with_receiver)");

        tokio::spawn(async move {
            polling_loop(token.expose_secret(), client, tx, interval).await;
        })
    }
}

/// Run the polling loop (background task)
async fn polling_loop(
    token: &str,
    client: reqwest::Client,
    tx: mpsc::Sender<IncomingMessage>,
    interval: Duration,
) {
    // Delete any existing webhook so getUpdates works
    let delete_url = format!("{API_BASE}{token}/deleteWebhook");
    if let Err(e) = client.post(&delete_url).send().await {
        tracing::warn!(error = %e, "failed to delete Telegram webhook before polling");
    }

    let mut offset: Option<i64> = None;
    let mut dedup = UpdateDedup::default();

    tracing::info!("Telegram polling started");

    loop {
        let url = format!("{API_BASE}{token}/getUpdates");
        let mut params = serde_json::json!({
            "timeout": LONG_POLL_SECS,
            "allowed_updates": ["message"],
        });
        if let Some(off) = offset {
            params["offset"] = serde_json::json!(off);
        }

        let parsed = match client.post(&url).json(&params).send().await {
            Ok(resp) => match resp.json::<GetUpdatesResponse>().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse Telegram getUpdates response");
                    tokio::time::sleep(interval).await;
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Telegram getUpdates error");
                tokio::time::sleep(interval).await;
                continue;
            }
        };

        if let Some(delay) = parsed.rejection_delay(interval) {
            tracing::warn!(
                error_code = ?parsed.error_code,
                description = parsed.description.as_deref().unwrap_or_default(),
                retry_in = ?delay,
                "Telegram rejected getUpdates"
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        for update in &parsed.result {
            // Advance offset past this update
            offset = Some(update.update_id + 1);

            if dedup.is_duplicate(update.update_id) {
                continue;
            }

            if let Some(msg) = update_to_incoming(update)
                && tx.send(msg).await.is_err()
            {
                tracing::info!("message receiver dropped, stopping Telegram polling");
                return;
            }
        }
    }
}

/// Convert a polling update into an `IncomingMessage`
///
/// Returns `None` for non-message updates, bot senders, and messages with
/// nothing the bot understands (stickers, documents, ...).
fn update_to_incoming(update: &PollingUpdate) -> Option<IncomingMessage> {
    let msg = update.message.as_ref()?;

    if msg.from.as_ref().is_some_and(|u| u.is_bot) {
        return None;
    }

    // Photo: pick largest size (last in array)
    let photo_file_id = msg
        .photo
        .as_ref()
        .and_then(|sizes| sizes.last())
        .map(|p| p.file_id.clone());
    let has_video = msg.video.is_some();

    if msg.text.is_none() && photo_file_id.is_none() && !has_video {
        return None;
    }

    let user_id = msg.from.as_ref().map_or(msg.chat.id, |u| u.id);
    let sender_name = msg
        .from
        .as_ref()
        .map_or_else(|| "Unknown".to_string(), |u| u.first_name.clone());

    Some(IncomingMessage {
        id: msg.message_id,
        user_id,
        chat_id: msg.chat.id,
        sender_name,
        text: msg.text.clone(),
        caption: msg.caption.clone(),
        photo_file_id,
        has_video,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<IncomingMessage> {
        let update: PollingUpdate = serde_json::from_str(json).unwrap();
        update_to_incoming(&update)
    }

    #[test]
    fn text_message() {
        let msg = parse(
            r#"{"update_id":1,"message":{"message_id":5,"chat":{"id":42,"type":"private"},
                "from":{"id":42,"is_bot":false,"first_name":"Alex"},"text":"/start"}}"#,
        )
        .unwrap();

        assert_eq!(msg.user_id, 42);
        assert_eq!(msg.chat_id, 42);
        assert_eq!(msg.text.as_deref(), Some("/start"));
        assert_eq!(msg.sender_name, "Alex");
        assert!(msg.photo_file_id.is_none());
    }

    #[test]
    fn channel_post_without_sender_uses_chat() {
        let msg = parse(
            r#"{"update_id":7,"message":{"message_id":10,"chat":{"id":-100},"text":"hi"}}"#,
        )
        .unwrap();

        assert_eq!(msg.user_id, -100);
        assert_eq!(msg.sender_name, "Unknown");
    }

    #[test]
    fn photo_picks_largest_size_and_caption() {
        let msg = parse(
            r#"{"update_id":2,"message":{"message_id":6,"chat":{"id":42},
                "from":{"id":42,"is_bot":false,"first_name":"Alex"},
                "photo":[{"file_id":"small"},{"file_id":"large"}],"caption":"Помоги!!"}}"#,
        )
        .unwrap();

        assert_eq!(msg.photo_file_id.as_deref(), Some("large"));
        assert_eq!(msg.caption.as_deref(), Some("Помоги!!"));
        assert!(msg.text.is_none());
    }

    #[test]
    fn video_is_flagged() {
        let msg = parse(
            r#"{"update_id":3,"message":{"message_id":7,"chat":{"id":1},
                "from":{"id":1,"is_bot":false,"first_name":"A"},"video":{"file_id":"v"}}}"#,
        )
        .unwrap();
        assert!(msg.has_video);
    }

    #[test]
    fn bots_and_unsupported_messages_are_skipped() {
        assert!(
            parse(
                r#"{"update_id":4,"message":{"message_id":8,"chat":{"id":1},
                    "from":{"id":9,"is_bot":true,"first_name":"B"},"text":"hi"}}"#
            )
            .is_none()
        );
        assert!(
            parse(
                r#"{"update_id":5,"message":{"message_id":9,"chat":{"id":1},
                    "from":{"id":1,"is_bot":false,"first_name":"A"},"sticker":{}}}"#
            )
            .is_none()
        );
        assert!(parse(r#"{"update_id":6}"#).is_none());
    }

    // -- rejected polls ---------------------------------------------------------

    const INTERVAL: Duration = Duration::from_millis(1000);

    fn response(json: &str) -> GetUpdatesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn conflict_backs_off_for_the_poll_interval() {
        let resp = response(
            r#"{"ok":false,"error_code":409,"description":"Conflict: terminated by other getUpdates request; make sure that only one bot instance is running"}"#,
        );

        assert_eq!(resp.rejection_delay(INTERVAL), Some(INTERVAL));
        assert_eq!(resp.error_code, Some(409));
        assert!(resp.result.is_empty());
    }

    #[test]
    fn unauthorized_backs_off_for_the_poll_interval() {
        let resp = response(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#);
        assert_eq!(resp.rejection_delay(INTERVAL), Some(INTERVAL));
    }

    #[test]
    fn flood_control_honors_retry_after() {
        let resp = response(
            r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 7","parameters":{"retry_after":7}}"#,
        );
        assert_eq!(resp.rejection_delay(INTERVAL), Some(Duration::from_secs(7)));
    }

    #[test]
    fn accepted_poll_has_no_delay() {
        let resp = response(r#"{"ok":true,"result":[]}"#);
        assert_eq!(resp.rejection_delay(INTERVAL), None);

        let resp = response(r#"{"ok":true,"result":[{"update_id":10}]}"#);
        assert_eq!(resp.rejection_delay(INTERVAL), None);
        assert_eq!(resp.result.len(), 1);
    }
}
