//! Captcha capture and stale-image detection.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::page::PageAutomation;

/// The raw and preprocessed image files of one attempt.
///
/// Both files are removed when this value is dropped, so every exit path
/// of an attempt cleans up after itself.
#[derive(Debug)]
pub struct CaptchaArtifacts {
    raw: PathBuf,
    processed: PathBuf,
}

impl CaptchaArtifacts {
    pub fn for_attempt(work_dir: &Path, attempt: u32) -> Self {
        Self {
            raw: work_dir.join(format!("captcha_attempt_{attempt}.png")),
            processed: work_dir.join(format!("captcha_attempt_{attempt}_processed.png")),
        }
    }

    pub fn raw(&self) -> &Path {
        &self.raw
    }

    pub fn processed(&self) -> &Path {
        &self.processed
    }
}

impl Drop for CaptchaArtifacts {
    fn drop(&mut self) {
        for path in [&self.raw, &self.processed] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Screenshot the captcha element to `path` and return the raw file bytes.
pub async fn capture_captcha(
    page: &dyn PageAutomation,
    selector: &str,
    path: &Path,
) -> anyhow::Result<Vec<u8>> {
    page.screenshot_element(selector, path).await?;
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read captcha capture {}", path.display()))
}

/// Whether a capture differs from the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Byte-identical to the previous capture: the server did not rotate it.
    Stale,
}

/// Remembers the last accepted capture.
#[derive(Debug, Default)]
pub struct StaleDetector {
    previous: Option<Vec<u8>>,
}

impl StaleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `capture` with the previous fresh one and remember it if new.
    pub fn observe(&mut self, capture: Vec<u8>) -> Freshness {
        if self.previous.as_deref() == Some(capture.as_slice()) {
            return Freshness::Stale;
        }
        self.previous = Some(capture);
        Freshness::Fresh
    }
}
