//! Page automation capability.
//!
//! The handful of page operations the lookup workflow needs, expressed as a
//! trait so the captcha solver and table extractor never touch CDP directly.
//! [`crate::browser::BrowserSession`] is the production implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Navigate to `url` and wait for the document to be ready.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Reload the current document.
    async fn reload(&self) -> Result<()>;

    /// Replace the value of the input matched by `selector`.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Remove every element matched by `selector` from the document.
    async fn remove(&self, selector: &str) -> Result<()>;

    /// Click the element matched by `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Screenshot the element matched by `selector` as PNG into `path`.
    async fn screenshot_element(&self, selector: &str, path: &Path) -> Result<()>;

    /// Inner text of the first element matched by `selector`, waiting up to
    /// `wait` for it to appear. `Ok(None)` when nothing showed up in time.
    async fn query_text(&self, selector: &str, wait: Duration) -> Result<Option<String>>;

    /// Number of elements currently matched by `selector`.
    async fn query_count(&self, selector: &str) -> Result<usize>;

    /// Serialized HTML of the current document.
    async fn content(&self) -> Result<String>;
}
