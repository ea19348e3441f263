//! Captcha handling: capture, preprocessing and candidate validation.
//!
//! The portal's captcha is a 4-character lowercase alphanumeric image that
//! rotates on every submission (and sometimes fails to).

mod capture;
mod preprocess;
mod validate;

pub use capture::{capture_captcha, CaptchaArtifacts, Freshness, StaleDetector};
pub use preprocess::{preprocess, preprocess_image, SHARPEN_KERNEL, THRESHOLD};
pub use validate::{is_valid_candidate, CANDIDATE_LEN};

use thiserror::Error;

/// Errors from captcha image handling.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
