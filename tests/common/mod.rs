//! Shared test utilities

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use quest_bot::channels::{Channel, OutgoingMessage};
use quest_bot::conversation::Controller;
use quest_bot::db::{self, ProfileStore, SqliteProfileStore, UserProfile};
use quest_bot::error::ReasoningError;
use quest_bot::ocr::{OcrEngine, OcrExtractor};
use quest_bot::reasoning::Reasoner;
use quest_bot::{Error, Language, Result, UserId};
use tokio::sync::Mutex;

/// Mock channel recording everything sent
#[derive(Default)]
pub struct MockChannel {
    sent_messages: Mutex<Vec<OutgoingMessage>>,
    /// Bytes served for any file id; `None` fails the download
    file: Option<Vec<u8>>,
}

impl MockChannel {
    pub fn serving(file: Vec<u8>) -> Self {
        Self {
            file: Some(file),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent_messages.lock().await.clone()
    }

    pub async fn last(&self) -> OutgoingMessage {
        self.sent_messages
            .lock()
            .await
            .last()
            .cloned()
            .expect("nothing was sent")
    }

    pub async fn clear(&self) {
        self.sent_messages.lock().await.clear();
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.sent_messages.lock().await.push(message);
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        self.file
            .clone()
            .ok_or_else(|| Error::TransportFetch(format!("no such file: {file_id}")))
    }
}

/// OCR engine returning a canned result
pub struct MockOcr {
    reply: std::result::Result<String, String>,
    languages: Mutex<Vec<String>>,
}

impl MockOcr {
    pub fn reading(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err("missing traineddata".to_string()),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub async fn languages(&self) -> Vec<String> {
        self.languages.lock().await.clone()
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn recognize(&self, _image: &DynamicImage, languages: &str) -> Result<String> {
        self.languages.lock().await.push(languages.to_string());
        self.reply.clone().map_err(Error::Ocr)
    }
}

/// A call seen by [`MockReasoner`]
#[derive(Debug, Clone)]
pub struct ReasonerCall {
    pub instruction: String,
    pub style: String,
}

/// Reasoner answering with a fixed solution
pub struct MockReasoner {
    solution: Option<String>,
    calls: Mutex<Vec<ReasonerCall>>,
}

impl MockReasoner {
    pub fn answering(solution: &str) -> Self {
        Self {
            solution: Some(solution.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fails as if retries were exhausted
    pub fn unavailable() -> Self {
        Self {
            solution: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<ReasonerCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Reasoner for MockReasoner {
    async fn solve(&self, instruction: &str, style: &str) -> Result<String> {
        self.calls.lock().await.push(ReasonerCall {
            instruction: instruction.to_string(),
            style: style.to_string(),
        });
        self.solution
            .clone()
            .ok_or(Error::ReasoningService(ReasoningError::Timeout))
    }
}

/// Store whose backend is always unreachable
pub struct UnavailableStore;

#[async_trait]
impl ProfileStore for UnavailableStore {
    async fn get(&self, _user_id: UserId) -> Result<Option<UserProfile>> {
        Err(Error::ProfileUnavailable("connection refused".to_string()))
    }

    async fn set(&self, _user_id: UserId, _profile: &UserProfile) -> Result<()> {
        Err(Error::ProfileUnavailable("connection refused".to_string()))
    }
}

/// Set up an in-memory profile store
#[must_use]
pub fn memory_store() -> Arc<SqliteProfileStore> {
    Arc::new(SqliteProfileStore::new(
        db::init_memory().expect("failed to init test db"),
    ))
}

/// A small PNG, valid input for the OCR path
#[must_use]
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(8, 8)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("failed to encode test image");
    buf.into_inner()
}

/// Controller wired to doubles, with handles to inspect them
pub struct Harness {
    pub controller: Controller,
    pub channel: Arc<MockChannel>,
    pub ocr: Arc<MockOcr>,
    pub reasoner: Arc<MockReasoner>,
}

impl Harness {
    pub fn new(
        channel: MockChannel,
        profiles: Arc<dyn ProfileStore>,
        ocr: MockOcr,
        reasoner: MockReasoner,
    ) -> Self {
        let channel = Arc::new(channel);
        let ocr = Arc::new(ocr);
        let reasoner = Arc::new(reasoner);

        let controller = Controller::new(
            channel.clone(),
            profiles,
            OcrExtractor::new(ocr.clone()),
            reasoner.clone(),
            Language::Ru,
        );

        Self {
            controller,
            channel,
            ocr,
            reasoner,
        }
    }

    /// Typed-text setup with a working store
    pub fn with_store(profiles: Arc<dyn ProfileStore>, solution: &str) -> Self {
        Self::new(
            MockChannel::default(),
            profiles,
            MockOcr::reading(""),
            MockReasoner::answering(solution),
        )
    }
}
