//! [`PageAutomation`] over a chromiumoxide page.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, NavigateParams, ReloadParams,
};
use tracing::{debug, warn};

use super::config::BrowserEngineType;
use super::stealth::STEALTH_SCRIPTS;
use super::BrowserSession;
use crate::page::PageAutomation;

/// Delay between element lookups while waiting for one to appear.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// JavaScript to wait for page ready state.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Build the script that sets an input value the way a user edit would,
/// firing the events JSF/PrimeFaces listen for.
fn fill_script(selector: &str, value: &str) -> Result<String> {
    let selector = serde_json::to_string(selector)?;
    let value = serde_json::to_string(value)?;
    Ok(format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el) {{
                return false;
            }}
            el.focus();
            el.value = {value};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return true;
        }})()
        "#
    ))
}

fn remove_script(selector: &str) -> Result<String> {
    let selector = serde_json::to_string(selector)?;
    Ok(format!(
        "document.querySelectorAll({selector}).forEach((el) => el.remove())"
    ))
}

impl BrowserSession {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout)
    }

    /// Wait for the page to reach a ready state, then apply stealth patches.
    async fn settle(&self) {
        match tokio::time::timeout(
            self.timeout(),
            self.page.evaluate(WAIT_FOR_READY_SCRIPT.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state"),
        }

        if self.config.engine == BrowserEngineType::Stealth {
            for script in STEALTH_SCRIPTS {
                if let Err(e) = self.page.evaluate(script.to_string()).await {
                    debug!("Stealth script injection skipped: {}", e);
                }
            }
        }
    }
}

#[async_trait]
impl PageAutomation for BrowserSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;

        self.page
            .execute(nav_params)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.settle().await;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        debug!("Reloading page");
        self.page
            .execute(ReloadParams::builder().ignore_cache(true).build())
            .await
            .context("Failed to reload page")?;

        if tokio::time::timeout(self.timeout(), self.page.wait_for_navigation())
            .await
            .is_err()
        {
            warn!("Timeout waiting for reload to finish");
        }
        self.settle().await;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let found: bool = self
            .page
            .evaluate(fill_script(selector, value)?)
            .await
            .with_context(|| format!("Failed to fill {}", selector))?
            .into_value()
            .context("Unexpected fill result")?;

        if !found {
            anyhow::bail!("Element not found: {}", selector);
        }
        Ok(())
    }

    async fn remove(&self, selector: &str) -> Result<()> {
        self.page
            .evaluate(remove_script(selector)?)
            .await
            .with_context(|| format!("Failed to remove {}", selector))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("Element not found: {}", selector))?
            .click()
            .await
            .with_context(|| format!("Failed to click {}", selector))?;
        Ok(())
    }

    async fn screenshot_element(&self, selector: &str, path: &Path) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("Element not found: {}", selector))?
            .save_screenshot(CaptureScreenshotFormat::Png, path)
            .await
            .with_context(|| format!("Failed to screenshot {}", selector))?;
        Ok(())
    }

    async fn query_text(&self, selector: &str, wait: Duration) -> Result<Option<String>> {
        let poll = async {
            loop {
                if let Ok(element) = self.page.find_element(selector).await {
                    return element.inner_text().await;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(wait, poll).await {
            Ok(text) => Ok(text?),
            Err(_) => Ok(None),
        }
    }

    async fn query_count(&self, selector: &str) -> Result<usize> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .with_context(|| format!("Failed to query {}", selector))?;
        Ok(elements.len())
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .context("Failed to read page content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_script_escapes_arguments() {
        let script = fill_script(r"input#formPrincipal\:identificacion", "01'02\"03").unwrap();
        assert!(script.contains(r#"document.querySelector("input#formPrincipal\\:identificacion")"#));
        assert!(script.contains(r#"el.value = "01'02\"03";"#));
    }

    #[test]
    fn test_remove_script_targets_all_matches() {
        let script = remove_script(r"div#formPrincipal\:messages div.ui-messages-error").unwrap();
        assert_eq!(
            script,
            r#"document.querySelectorAll("div#formPrincipal\\:messages div.ui-messages-error").forEach((el) => el.remove())"#
        );
    }
}
