//! Conversation controller
//!
//! Routes each inbound event through the per-user state machine:
//! onboarding (`AwaitingName`), language change (`AwaitingLanguage`) and
//! task resolution (`Idle`). Menu buttons short-circuit in any mode.

pub mod copy;
pub mod mode;

use std::sync::Arc;

pub use mode::{ConversationMode, ModeTable, UserLocks};

use crate::channels::{Channel, IncomingMessage, KeyboardAction, MenuButton, OutgoingMessage};
use crate::db::{ProfileStore, UserProfile};
use crate::error::ReasoningError;
use crate::language::Language;
use crate::ocr::{self, OcrExtractor};
use crate::reasoning::Reasoner;
use crate::subject::Subject;
use crate::{Error, Result, UserId, prompt, style, subject};

/// Characters of task text included in logs
const TASK_LOG_CHARS: usize = 50;

/// Characters of a solution included in logs
const REPLY_LOG_CHARS: usize = 100;

/// Where a task's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    Typed,
    Photo,
}

/// A problem statement ready to be solved
#[derive(Debug, Clone)]
pub struct Task {
    pub text: String,
    pub source: TaskSource,
    pub subject: Subject,
}

impl Task {
    /// Classify the text into a task
    #[must_use]
    pub fn new(text: impl Into<String>, source: TaskSource) -> Self {
        let text = text.into();
        let subject = subject::classify(&text);
        Self {
            text,
            source,
            subject,
        }
    }

    /// Instruction sent to the reasoning service
    #[must_use]
    pub fn instruction(&self) -> String {
        prompt::build(self.subject, &self.text)
    }
}

/// Drives a user's conversation from inbound events to replies
pub struct Controller {
    channel: Arc<dyn Channel>,
    profiles: Arc<dyn ProfileStore>,
    ocr: OcrExtractor,
    reasoner: Arc<dyn Reasoner>,
    default_language: Language,
    modes: ModeTable,
    locks: UserLocks,
}

impl Controller {
    #[must_use]
    pub fn new(
        channel: Arc<dyn Channel>,
        profiles: Arc<dyn ProfileStore>,
        ocr: OcrExtractor,
        reasoner: Arc<dyn Reasoner>,
        default_language: Language,
    ) -> Self {
        Self {
            channel,
            profiles,
            ocr,
            reasoner,
            default_language,
            modes: ModeTable::default(),
            locks: UserLocks::default(),
        }
    }

    /// Current conversation mode of a user
    #[must_use]
    pub fn mode(&self, user_id: UserId) -> ConversationMode {
        self.modes.get(user_id)
    }

    /// Handle one inbound event
    ///
    /// Never fails: any error is logged and answered with an apology so a
    /// single user's event cannot take the bot down.
    pub async fn handle(&self, msg: IncomingMessage) {
        let _guard = self.locks.acquire(msg.user_id).await;

        let Err(e) = self.dispatch(&msg).await else {
            return;
        };

        tracing::error!(
            user_id = msg.user_id,
            channel = self.channel.name(),
            error = %e,
            "failed to handle message"
        );

        let variants = match &e {
            Error::Ocr(_) | Error::Image(_) => copy::OCR_ERROR_MESSAGES,
            e if e.is_network() => copy::API_ERROR_MESSAGES,
            _ => copy::UNEXPECTED_ERROR_MESSAGES,
        };
        if let Err(e) = self
            .reply(msg.chat_id, copy::pick(variants), KeyboardAction::Main)
            .await
        {
            tracing::error!(user_id = msg.user_id, error = %e, "failed to send apology");
        }
    }

    async fn dispatch(&self, msg: &IncomingMessage) -> Result<()> {
        if let Some(file_id) = &msg.photo_file_id {
            return self.handle_photo(msg, file_id).await;
        }

        let Some(text) = msg.text.as_deref() else {
            if msg.has_video {
                return self
                    .reply(msg.chat_id, copy::VIDEO_UNSUPPORTED, KeyboardAction::Keep)
                    .await;
            }
            return Ok(());
        };

        if is_start_command(text) {
            return self.handle_start(msg).await;
        }

        if let Some(button) = MenuButton::from_caption(text.trim()) {
            return self.handle_button(msg, button).await;
        }

        match self.modes.get(msg.user_id) {
            ConversationMode::AwaitingName => self.capture_name(msg, text).await,
            ConversationMode::AwaitingLanguage => self.capture_language(msg, text).await,
            ConversationMode::Idle => self.handle_task_text(msg, text).await,
        }
    }

    async fn handle_start(&self, msg: &IncomingMessage) -> Result<()> {
        match self.load_profile(msg.user_id).await {
            Some(profile) => {
                self.modes.set(msg.user_id, ConversationMode::Idle);
                self.reply(
                    msg.chat_id,
                    copy::welcome_back(&profile.name),
                    KeyboardAction::Main,
                )
                .await
            }
            None => self.begin_onboarding(msg).await,
        }
    }

    async fn begin_onboarding(&self, msg: &IncomingMessage) -> Result<()> {
        tracing::info!(user_id = msg.user_id, sender = %msg.sender_name, "starting onboarding");
        self.modes.set(msg.user_id, ConversationMode::AwaitingName);
        self.reply(msg.chat_id, copy::ONBOARDING_PROMPT, KeyboardAction::Remove)
            .await
    }

    async fn handle_button(&self, msg: &IncomingMessage, button: MenuButton) -> Result<()> {
        tracing::debug!(user_id = msg.user_id, ?button, "menu button pressed");

        match button {
            MenuButton::About => {
                self.reply(msg.chat_id, copy::ABOUT_TEXT, KeyboardAction::Main)
                    .await
            }
            MenuButton::Support => {
                self.reply(msg.chat_id, copy::SUPPORT_TEXT, KeyboardAction::Main)
                    .await
            }
            MenuButton::RecognizePhoto => {
                self.reply(msg.chat_id, copy::PHOTO_REQUEST_TEXT, KeyboardAction::Remove)
                    .await
            }
            MenuButton::ChangeLanguage => {
                if self.load_profile(msg.user_id).await.is_none() {
                    return self.begin_onboarding(msg).await;
                }
                self.modes.set(msg.user_id, ConversationMode::AwaitingLanguage);
                self.reply(msg.chat_id, copy::LANGUAGE_PROMPT, KeyboardAction::Remove)
                    .await
            }
        }
    }

    async fn capture_name(&self, msg: &IncomingMessage, text: &str) -> Result<()> {
        let name = text.trim();
        if name.is_empty() {
            return self
                .reply(msg.chat_id, copy::EMPTY_NAME_PROMPT, KeyboardAction::Remove)
                .await;
        }

        let profile = UserProfile {
            name: name.to_string(),
            language: self.default_language,
            style: style::analyze(text),
        };
        self.save_profile(msg.user_id, &profile).await;
        self.modes.set(msg.user_id, ConversationMode::Idle);

        tracing::info!(user_id = msg.user_id, language = %profile.language, "user onboarded");
        self.reply(msg.chat_id, copy::nice_to_meet(name), KeyboardAction::Main)
            .await
    }

    async fn capture_language(&self, msg: &IncomingMessage, text: &str) -> Result<()> {
        let Some(language) = Language::parse(text) else {
            tracing::debug!(user_id = msg.user_id, "unsupported language requested");
            return self
                .reply(msg.chat_id, copy::INVALID_LANGUAGE, KeyboardAction::Remove)
                .await;
        };

        match self.load_profile(msg.user_id).await {
            Some(mut profile) => {
                profile.language = language;
                self.save_profile(msg.user_id, &profile).await;
            }
            // Profile expired mid-flow; nothing to update
            None => tracing::warn!(user_id = msg.user_id, "language chosen without a profile"),
        }

        self.modes.set(msg.user_id, ConversationMode::Idle);
        tracing::info!(user_id = msg.user_id, %language, "language changed");
        self.reply(
            msg.chat_id,
            copy::language_changed(language.code()),
            KeyboardAction::Main,
        )
        .await
    }

    async fn handle_task_text(&self, msg: &IncomingMessage, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return self
                .reply(msg.chat_id, copy::EMPTY_TASK, KeyboardAction::Main)
                .await;
        }

        // Typed tasks never re-derive the style
        let profile = self.load_profile(msg.user_id).await;
        let style = profile.map(|p| p.style).unwrap_or_default();

        self.notify_processing(msg).await?;
        self.resolve(msg, &Task::new(text, TaskSource::Typed), &style)
            .await
    }

    async fn handle_photo(&self, msg: &IncomingMessage, file_id: &str) -> Result<()> {
        let mut profile = self.load_profile(msg.user_id).await;
        let language = profile
            .as_ref()
            .map_or(self.default_language, |p| p.language);

        let caption = msg.caption.as_deref().map(str::trim).unwrap_or_default();
        let style = if caption.is_empty() {
            profile.as_ref().map(|p| p.style.clone()).unwrap_or_default()
        } else {
            let refreshed = style::analyze(caption);
            if let Some(profile) = profile.as_mut() {
                profile.style.clone_from(&refreshed);
                self.save_profile(msg.user_id, profile).await;
            }
            refreshed
        };

        self.notify_processing(msg).await?;

        let bytes = self.channel.download_file(file_id).await?;
        let image = ocr::decode(&bytes)?;
        let text = self.ocr.extract(&image, language).await?;

        if text.is_empty() {
            tracing::info!(user_id = msg.user_id, "no text found on photo");
            return self
                .reply(msg.chat_id, copy::pick(copy::NO_TEXT_MESSAGES), KeyboardAction::Main)
                .await;
        }

        self.resolve(msg, &Task::new(text, TaskSource::Photo), &style)
            .await
    }

    async fn resolve(&self, msg: &IncomingMessage, task: &Task, style: &str) -> Result<()> {
        tracing::info!(
            user_id = msg.user_id,
            subject = %task.subject,
            source = ?task.source,
            task = %preview(&task.text, TASK_LOG_CHARS),
            "solving task"
        );

        let solution = self.reasoner.solve(&task.instruction(), style).await?;
        if solution.trim().is_empty() {
            return Err(ReasoningError::Malformed("empty solution".to_string()).into());
        }

        tracing::info!(
            user_id = msg.user_id,
            reply = %preview(&solution, REPLY_LOG_CHARS),
            "task solved"
        );
        self.reply(msg.chat_id, solution, KeyboardAction::Main).await
    }

    async fn notify_processing(&self, msg: &IncomingMessage) -> Result<()> {
        self.reply(
            msg.chat_id,
            copy::pick(copy::PROCESSING_MESSAGES),
            KeyboardAction::Keep,
        )
        .await
    }

    /// Read a profile, treating an unreachable store as "no profile"
    async fn load_profile(&self, user_id: UserId) -> Option<UserProfile> {
        match self.profiles.get(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "profile store unavailable, using defaults");
                None
            }
        }
    }

    async fn save_profile(&self, user_id: UserId, profile: &UserProfile) {
        if let Err(e) = self.profiles.set(user_id, profile).await {
            tracing::warn!(user_id, error = %e, "failed to persist profile");
        }
    }

    async fn reply(
        &self,
        chat_id: i64,
        content: impl Into<String>,
        keyboard: KeyboardAction,
    ) -> Result<()> {
        self.channel
            .send(OutgoingMessage::text(chat_id, content).with_keyboard(keyboard))
            .await
    }
}

/// `/start`, optionally addressed (`/start@bot`) or with a payload
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .is_some_and(|cmd| cmd == "/start" || cmd.starts_with("/start@"))
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
