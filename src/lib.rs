//! Quest Bot - tutoring assistant for Telegram
//!
//! Accepts a task as typed text or as a photo, and answers with a worked
//! solution in a tone that mirrors the user's own writing:
//! - Style inference from the user's messages
//! - OCR with image pre-processing
//! - Subject classification and tutor prompt selection
//! - Reasoning service calls with bounded retry
//! - Per-user profiles with a rolling 24 hour expiry
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                Telegram (long polling)               │
//! └────────────────────┬────────────────────────────────┘
//!                      │ IncomingMessage
//! ┌────────────────────▼────────────────────────────────┐
//! │              Conversation Controller                 │
//! │   Mode table  │  Style  │  Subject  │  Prompt        │
//! └──────┬─────────────┬──────────────────┬─────────────┘
//!        │             │                  │
//! ┌──────▼─────┐ ┌─────▼──────┐ ┌─────────▼──────────┐
//! │  Profiles  │ │    OCR     │ │  Reasoning service │
//! │  (SQLite)  │ │ (tesseract)│ │   (chat API)       │
//! └────────────┘ └────────────┘ └────────────────────┘
//! ```

pub mod channels;
pub mod config;
pub mod conversation;
pub mod daemon;
pub mod db;
pub mod error;
pub mod language;
pub mod ocr;
pub mod prompt;
pub mod reasoning;
pub mod style;
pub mod subject;

/// Platform user identifier
pub type UserId = i64;

pub use config::Config;
pub use conversation::Controller;
pub use daemon::Daemon;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use language::Language;
pub use subject::Subject;
