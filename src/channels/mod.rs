//! Messaging transport
//!
//! The controller talks to users only through the [`Channel`] trait; the
//! Telegram adapter is the production implementation.

pub mod keyboard;
pub mod telegram;

use async_trait::async_trait;

pub use keyboard::{KeyboardAction, MenuButton};
pub use telegram::TelegramChannel;

use crate::{Result, UserId};

/// An inbound user event
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Platform message identifier
    pub id: i64,

    /// Sender identifier
    pub user_id: UserId,

    /// Chat to reply into
    pub chat_id: i64,

    /// Sender display name as reported by the platform, for logs only
    pub sender_name: String,

    /// Message text (absent for media messages)
    pub text: Option<String>,

    /// Caption attached to a media message
    pub caption: Option<String>,

    /// File identifier of the largest photo size, if a photo was sent
    pub photo_file_id: Option<String>,

    /// Whether the message carried a video
    pub has_video: bool,
}

impl IncomingMessage {
    /// Create a plain text message (convenience for tests and tools)
    #[must_use]
    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id: user_id,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a photo message with an optional caption
    #[must_use]
    pub fn photo(user_id: UserId, file_id: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            user_id,
            chat_id: user_id,
            caption,
            photo_file_id: Some(file_id.into()),
            ..Self::default()
        }
    }
}

/// A message to send to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Chat identifier
    pub chat_id: i64,

    /// Plain-text content
    pub content: String,

    /// Reply keyboard handling
    pub keyboard: KeyboardAction,
}

impl OutgoingMessage {
    /// Create a message that leaves the keyboard untouched
    #[must_use]
    pub fn text(chat_id: i64, content: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: content.into(),
            keyboard: KeyboardAction::Keep,
        }
    }

    /// Set the keyboard action
    #[must_use]
    pub const fn with_keyboard(mut self, keyboard: KeyboardAction) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// Messaging transport boundary
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &'static str;

    /// Send a message
    ///
    /// # Errors
    ///
    /// Returns `Error::Channel` if the platform rejects the message
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Download a file previously attached by a user
    ///
    /// # Errors
    ///
    /// Returns `Error::TransportFetch` if the file cannot be retrieved
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_replies_into_private_chat() {
        let msg = IncomingMessage::text(10, "hi");
        assert_eq!(msg.chat_id, 10);
        assert_eq!(msg.text.as_deref(), Some("hi"));
        assert!(msg.photo_file_id.is_none());
    }

    #[test]
    fn outgoing_defaults_to_keep() {
        let out = OutgoingMessage::text(1, "x");
        assert_eq!(out.keyboard, KeyboardAction::Keep);
        assert_eq!(out.with_keyboard(KeyboardAction::Main).keyboard, KeyboardAction::Main);
    }
}
