//! Tesseract CLI adapter
//!
//! Streams a PNG-encoded image to `tesseract stdin stdout -l <langs>` and
//! reads the recognized text back from stdout.

use std::io::Cursor;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::OcrEngine;
use crate::{Error, Result};

/// Upper bound on a single recognition run
const OCR_TIMEOUT: Duration = Duration::from_secs(60);

/// OCR engine backed by the `tesseract` binary
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    timeout: Duration,
}

impl TesseractEngine {
    /// Use an explicit binary, or look `tesseract` up on `PATH`
    ///
    /// # Errors
    ///
    /// Returns error if no binary was given and none is on `PATH`
    pub fn new(binary: Option<PathBuf>) -> Result<Self> {
        let binary = match binary {
            Some(path) => path,
            None => which::which("tesseract")
                .map_err(|e| Error::Config(format!("tesseract not found on PATH: {e}")))?,
        };

        tracing::info!(binary = %binary.display(), "OCR engine configured");
        Ok(Self::from_path(binary))
    }

    /// Use a binary path as-is, without checking that it exists
    #[must_use]
    pub const fn from_path(binary: PathBuf) -> Self {
        Self {
            binary,
            timeout: OCR_TIMEOUT,
        }
    }

    /// Bound a whole recognition run, input included
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &DynamicImage, languages: &str) -> Result<String> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::Ocr(format!("failed to encode image: {e}")))?;

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", languages])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Ocr(format!("failed to spawn tesseract: {e}")))?;

        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                stdin
                    .write_all(&png)
                    .await
                    .map_err(|e| Error::Ocr(format!("failed to write to tesseract stdin: {e}")))?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| Error::Ocr(format!("tesseract execution failed: {e}")))
        };

        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| Error::Ocr(format!("tesseract timed out after {:?}", self.timeout)))??;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract exited with code {code}: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use image::GrayImage;

    use super::*;

    #[test]
    fn explicit_binary_is_kept() {
        let engine = TesseractEngine::new(Some(PathBuf::from("/opt/ocr/tesseract"))).unwrap();
        assert_eq!(engine.binary, PathBuf::from("/opt/ocr/tesseract"));
    }

    #[tokio::test]
    async fn missing_binary_is_an_ocr_failure() {
        let engine = TesseractEngine::new(Some(PathBuf::from("/nonexistent/tesseract"))).unwrap();
        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 4));

        let err = engine.recognize(&image, "rus+eng").await.unwrap_err();
        assert!(matches!(err, Error::Ocr(_)), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stalled_binary_times_out_while_reading_input() {
        use std::os::unix::fs::PermissionsExt;

        // Never reads stdin, so a large PNG fills the pipe and blocks the write
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("tesseract");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Noise does not compress, keeping the PNG well above a pipe buffer
        let mut seed = 0x2545_f491_u32;
        let noise = GrayImage::from_fn(512, 512, |_, _| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            image::Luma([seed.to_le_bytes()[0]])
        });

        let engine = TesseractEngine::from_path(script).with_timeout(Duration::from_millis(300));
        let started = std::time::Instant::now();
        let err = engine
            .recognize(&DynamicImage::ImageLuma8(noise), "rus+eng")
            .await
            .unwrap_err();

        assert!(matches!(&err, Error::Ocr(m) if m.contains("timed out")), "{err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
