//! Daemon - composition root and event loop
//!
//! Builds the shared resources once (profile pool, OCR engine, reasoning
//! client, Telegram channel), then hands every inbound event to the
//! conversation controller on its own task.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::channels::TelegramChannel;
use crate::conversation::Controller;
use crate::db::{self, SqliteProfileStore};
use crate::ocr::{OcrExtractor, TesseractEngine};
use crate::reasoning::ReasoningClient;
use crate::{Config, Result};

/// Upper bound on waiting for in-flight events at shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// The quest daemon
pub struct Daemon {
    config: Config,
    poll_interval: Duration,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub const fn new(config: Config, poll_interval: Duration) -> Self {
        Self {
            config,
            poll_interval,
        }
    }

    /// Run until Ctrl-C or until polling stops
    ///
    /// # Errors
    ///
    /// Returns error if a shared resource cannot be initialized or the bot
    /// token is rejected
    pub async fn run(self) -> Result<()> {
        let pool = db::init(&self.config.profile_db_path)?;
        tracing::info!(path = %self.config.profile_db_path.display(), "profile store initialized");

        let profiles = SqliteProfileStore::new(pool);
        match profiles.purge_expired() {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "expired profiles removed"),
            Err(e) => tracing::warn!(error = %e, "failed to purge expired profiles"),
        }

        // Text tasks still work without OCR; photos get the OCR apology
        let engine = TesseractEngine::new(self.config.tesseract_path.clone()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "OCR engine unavailable, photo tasks will fail");
            TesseractEngine::from_path(PathBuf::from("tesseract"))
        });
        let reasoner = ReasoningClient::new(self.config.reasoning_key.clone())?
            .with_endpoint(self.config.reasoning_url.clone())
            .with_model(self.config.reasoning_model.clone());

        let (telegram, mut rx) = TelegramChannel::with_receiver(self.config.bot_token.clone());
        telegram.connect().await?;
        let poller = telegram.start_polling(self.poll_interval);

        let controller = Arc::new(Controller::new(
            Arc::new(telegram),
            Arc::new(profiles),
            OcrExtractor::new(Arc::new(engine)),
            Arc::new(reasoner),
            self.config.default_language,
        ));

        tracing::info!(
            default_language = %self.config.default_language,
            model = %self.config.reasoning_model,
            "daemon running"
        );

        let mut in_flight = JoinSet::new();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                incoming = rx.recv() => {
                    let Some(msg) = incoming else {
                        tracing::warn!("message stream closed");
                        break;
                    };
                    tracing::debug!(
                        user_id = msg.user_id,
                        message_id = msg.id,
                        sender = %msg.sender_name,
                        "message received"
                    );

                    let controller = Arc::clone(&controller);
                    in_flight.spawn(async move { controller.handle(msg).await });
                }
                Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_join(done);
                }
            }
        }

        poller.abort();
        drain(in_flight).await;

        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// Wait for in-flight handlers, up to [`DRAIN_TIMEOUT`]
async fn drain(mut in_flight: JoinSet<()>) {
    if in_flight.is_empty() {
        return;
    }
    tracing::info!(count = in_flight.len(), "waiting for in-flight messages");

    let wait = async {
        while let Some(done) = in_flight.join_next().await {
            log_join(done);
        }
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, wait).await.is_err() {
        tracing::warn!("in-flight messages did not finish in time, aborting");
    }
}

fn log_join(done: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = done
        && e.is_panic()
    {
        tracing::error!(error = %e, "message handler panicked");
    }
}
