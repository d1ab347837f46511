//! Text extraction from photographed tasks
//!
//! Raw bytes are decoded, normalized by [`preprocess`], and handed to an
//! [`OcrEngine`] together with a language hint.
//!
//! An empty result means "no legible text" and is not an error; only engine
//! failures surface as `Error::Ocr`.

pub mod preprocess;
mod tesseract;

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::language::Language;
use crate::{Error, Result};

pub use preprocess::preprocess;
pub use tesseract::TesseractEngine;

/// Language always added to the OCR hint
pub const SECONDARY_LANGUAGE: &str = "eng";

/// External OCR engine
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a prepared image
    ///
    /// `languages` uses Tesseract's `+`-joined syntax, e.g. `rus+eng`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Ocr` on engine failure
    async fn recognize(&self, image: &DynamicImage, languages: &str) -> Result<String>;
}

/// Decode a downloaded image
///
/// # Errors
///
/// Returns `Error::Image` if the bytes are not a supported image format
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::Image(e.to_string()))
}

/// Language hint for a user's language plus the fixed secondary language
#[must_use]
pub fn language_hint(language: Language) -> String {
    let primary = language.ocr_code();
    if primary == SECONDARY_LANGUAGE {
        primary.to_string()
    } else {
        format!("{primary}+{SECONDARY_LANGUAGE}")
    }
}

/// Preprocess-then-recognize pipeline
#[derive(Clone)]
pub struct OcrExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl OcrExtractor {
    /// Wrap an engine
    #[must_use]
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    /// Extract trimmed text from a decoded image
    ///
    /// # Errors
    ///
    /// Returns `Error::Ocr` if the engine fails
    pub async fn extract(&self, image: &DynamicImage, language: Language) -> Result<String> {
        let prepared = preprocess(image);
        let hint = language_hint(language);

        let text = self.engine.recognize(&prepared, &hint).await?;
        let text = text.trim().to_string();

        tracing::debug!(languages = %hint, chars = text.chars().count(), "OCR finished");
        Ok(text)
    }
}
