//! senescyt-lookup - degree registry lookups behind an OCR-solved captcha.
//!
//! Drives a Chromium page through the SENESCYT title registry form, solves
//! the rotating image captcha with Tesseract, and scrapes the degree table.
//!
//! The solver and extractor only see two narrow capabilities:
//! [`page::PageAutomation`] for the browser page and [`ocr::OcrBackend`] for
//! text recognition, so either side can be swapped out or faked in tests.

pub mod browser;
pub mod captcha;
pub mod config;
pub mod lookup;
pub mod models;
pub mod ocr;
pub mod page;
pub mod utils;
