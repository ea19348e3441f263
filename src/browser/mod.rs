//! Browser session for one registry lookup.
//!
//! Uses chromiumoxide (CDP). A [`BrowserSession`] owns the browser, the single
//! page the workflow drives, and the CDP handler task. Open one per
//! identification number and [`close`](BrowserSession::close) it on every path.

mod config;
mod page;
mod stealth;

pub use config::{BrowserEngineConfig, BrowserEngineType};

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::utils::find_binary;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Chrome binary names to look up in PATH.
const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Find a Chrome/Chromium executable.
pub fn find_chrome() -> Result<PathBuf> {
    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            debug!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    if let Some(path) = find_binary(CHROME_COMMANDS) {
        debug!("Found Chrome in PATH: {}", path.display());
        return Ok(path);
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium not found. Please install it:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Or set BROWSER_URL to a running Chrome DevTools endpoint"
    ))
}

/// CDP event loop task; aborted when dropped.
struct HandlerTask(JoinHandle<()>);

impl Drop for HandlerTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Browser plus the one page a lookup runs on.
pub struct BrowserSession {
    pub(crate) config: BrowserEngineConfig,
    pub(crate) page: Page,
    browser: Browser,
    /// Whether we launched the browser (and so must shut it down).
    launched: bool,
    _handler: HandlerTask,
}

impl BrowserSession {
    /// Launch or connect to a browser and open a blank page.
    pub async fn open(config: &BrowserEngineConfig) -> Result<Self> {
        let (browser, handler, launched) = match config.remote_url.clone() {
            Some(remote_url) => {
                let (browser, handler) = connect_remote(config, &remote_url).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = launch(config).await?;
                (browser, handler, true)
            }
        };

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser page")?;

        page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .context("Failed to set user agent")?;

        Ok(Self {
            config: config.clone(),
            page,
            browser,
            launched,
            _handler: handler,
        })
    }

    /// Close the page and, if we launched it, the browser.
    pub async fn close(self) {
        let Self {
            page,
            mut browser,
            launched,
            _handler,
            ..
        } = self;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        if launched {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed waiting for browser exit: {}", e);
            }
        }

        drop(_handler);
        debug!("Browser session closed");
    }
}

/// Spawn the CDP handler loop, as every chromiumoxide consumer must.
fn spawn_handler(mut handler: chromiumoxide::Handler) -> HandlerTask {
    HandlerTask(tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    }))
}

/// Launch a local Chrome.
async fn launch(config: &BrowserEngineConfig) -> Result<(Browser, HandlerTask)> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = find_chrome()?;

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(Duration::from_secs(config.timeout));

    // Set headless mode (with_head means NOT headless, confusingly)
    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(ref proxy) = config.proxy {
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder = builder
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
        .arg("--disable-gpu");

    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

    let (browser, handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    Ok((browser, spawn_handler(handler)))
}

/// Connect to a remote Chrome instance.
async fn connect_remote(
    config: &BrowserEngineConfig,
    url: &str,
) -> Result<(Browser, HandlerTask)> {
    info!(
        "Connecting to remote browser at {} (timeout: {}s)",
        url, config.timeout
    );

    // Get WebSocket URL from the /json/version endpoint
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .get(&version_url)
        .timeout(Duration::from_secs(config.timeout))
        .send()
        .await
        .context("Failed to connect to remote browser")?
        .json()
        .await
        .context("Failed to parse browser version info")?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

    debug!("Connecting to WebSocket: {}", ws_url);

    let handler_config = chromiumoxide::handler::HandlerConfig {
        request_timeout: Duration::from_secs(config.timeout),
        ..Default::default()
    };

    let (browser, handler) = Browser::connect_with_config(ws_url, handler_config)
        .await
        .context("Failed to connect to remote browser")?;

    Ok((browser, spawn_handler(handler)))
}
