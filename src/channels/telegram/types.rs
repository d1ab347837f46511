//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

use crate::channels::keyboard::{self, KeyboardAction};

/// Telegram Bot API base URL
pub(crate) const API_BASE: &str = "https://api.telegram.org/bot";

/// Telegram file download base URL
pub(crate) const FILE_BASE: &str = "https://api.telegram.org/file/bot";

/// Telegram sendMessage request
#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

/// Reply markup variants used by the bot
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

impl ReplyMarkup {
    /// Markup for a keyboard action (`None` leaves the client keyboard alone)
    pub fn for_action(action: KeyboardAction) -> Option<Self> {
        match action {
            KeyboardAction::Main => Some(Self::Keyboard(ReplyKeyboardMarkup::main())),
            KeyboardAction::Remove => Some(Self::Remove(ReplyKeyboardRemove {
                remove_keyboard: true,
            })),
            KeyboardAction::Keep => None,
        }
    }
}

/// Custom reply keyboard
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,
}

impl ReplyKeyboardMarkup {
    /// The bot's main menu
    pub fn main() -> Self {
        let keyboard = keyboard::main_layout()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|b| KeyboardButton {
                        text: b.caption().to_string(),
                    })
                    .collect()
            })
            .collect();

        Self {
            keyboard,
            resize_keyboard: true,
            input_field_placeholder: Some(keyboard::INPUT_PLACEHOLDER.to_string()),
        }
    }
}

/// A button in a reply keyboard row
#[derive(Debug, Clone, Serialize)]
pub(crate) struct KeyboardButton {
    pub text: String,
}

/// Request to hide the reply keyboard
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
}

/// Telegram getFile request
#[derive(Serialize)]
pub(crate) struct GetFileRequest {
    pub file_id: String,
}

/// File metadata from Telegram getFile response
#[derive(Debug, Deserialize)]
pub(crate) struct TelegramFile {
    pub file_path: Option<String>,
}

/// Telegram setMyCommands request
#[derive(Serialize)]
pub(crate) struct SetMyCommandsRequest {
    pub commands: Vec<BotCommand>,
}

/// A bot command for Telegram's command menu
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

/// Bot identity returned by getMe
#[derive(Debug, Deserialize)]
pub(crate) struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

/// Telegram API response wrapper
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}
