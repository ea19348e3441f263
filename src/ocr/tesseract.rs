//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line, tuned for captchas: a single text
//! line (`--psm 7`) and a character whitelist.

use std::path::Path;
use std::process::Command;

use super::backend::{OcrBackend, OcrError};
use crate::config::{OcrSettings, CAPTCHA_CHARSET};
use crate::utils::check_binary;

/// Page segmentation mode: treat the image as a single text line.
const SINGLE_LINE_PSM: &str = "7";

/// Tesseract invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Language for OCR (e.g., "eng").
    pub language: String,
    /// Characters tesseract is allowed to emit.
    pub whitelist: String,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            whitelist: CAPTCHA_CHARSET.to_string(),
        }
    }
}

impl From<&OcrSettings> for TesseractConfig {
    fn from(settings: &OcrSettings) -> Self {
        Self {
            language: settings.language.clone(),
            whitelist: settings.charset.clone(),
        }
    }
}

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: TesseractConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: TesseractConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments following the input path.
    fn args(&self) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "--psm".to_string(),
            SINGLE_LINE_PSM.to_string(),
            "-c".to_string(),
            format!("tessedit_char_whitelist={}", self.config.whitelist),
        ]
    }

    /// Run Tesseract on an image file.
    fn run_tesseract_impl(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .args(self.args())
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError> {
        self.run_tesseract_impl(image_path)
    }
}
