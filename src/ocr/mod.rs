//! Text recognition for captcha images.
//!
//! Tesseract is the only backend; the [`OcrBackend`] trait is the seam the
//! captcha solver depends on, so tests can swap in scripted recognizers.

mod backend;
mod tesseract;

pub use backend::{OcrBackend, OcrError, OcrResult};
pub use tesseract::{TesseractBackend, TesseractConfig};
