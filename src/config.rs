//! Configuration management for senescyt-lookup.
//!
//! Settings are resolved in layers: built-in defaults, an optional TOML file,
//! environment variables, then CLI flags (applied by the caller).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::browser::BrowserEngineConfig;

/// Name `prefer` discovers config files under (e.g. `senescyt-lookup.toml`).
pub const CONFIG_NAME: &str = "senescyt-lookup";

/// Registry lookup page.
pub const DEFAULT_PORTAL_URL: &str =
    "https://www.senescyt.gob.ec/consulta-titulos-web/faces/vista/consulta/consulta.xhtml";

/// Lowercase alphanumeric charset the portal draws captchas from.
pub const CAPTCHA_CHARSET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// DOM identifiers and message texts of the registry portal.
///
/// These are a contract with a remote site we do not control. When the portal
/// is redesigned the defaults break and can be patched from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomContract {
    pub url: String,
    pub id_input: String,
    pub captcha_input: String,
    pub search_button: String,
    pub captcha_image: String,
    pub error_messages: String,
    /// Result tables carry generated ids sharing this prefix.
    pub results_table: String,
    pub wrong_captcha_text: String,
    pub no_results_text: String,
}

impl Default for DomContract {
    fn default() -> Self {
        Self {
            url: DEFAULT_PORTAL_URL.to_string(),
            id_input: r"input#formPrincipal\:identificacion".to_string(),
            captcha_input: r"input#formPrincipal\:captchaSellerInput".to_string(),
            search_button: r"button#formPrincipal\:boton-buscar".to_string(),
            captcha_image: r"img#formPrincipal\:capimg".to_string(),
            error_messages: r"div#formPrincipal\:messages div.ui-messages-error".to_string(),
            results_table: "table[id^='formPrincipal:j_idt']".to_string(),
            wrong_captcha_text: "Caracteres incorrectos".to_string(),
            no_results_text: "No se encontraron resultados".to_string(),
        }
    }
}

/// Retry loop bounds and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum OCR attempts per lookup (0 = unlimited).
    pub max_attempts: u32,
    /// Wall-clock budget per lookup in seconds (0 = unlimited).
    pub max_duration: u64,
    /// Pause after reloading a stale captcha, in milliseconds.
    pub reload_pause_ms: u64,
    /// How long to wait for the error message region after submitting, in milliseconds.
    pub error_wait_ms: u64,
    /// Directory for transient captcha images.
    pub work_dir: PathBuf,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            max_duration: 600,
            reload_pause_ms: 2000,
            error_wait_ms: 2000,
            work_dir: PathBuf::from("."),
        }
    }
}

impl SolverConfig {
    pub fn attempt_limit(&self) -> Option<u32> {
        (self.max_attempts > 0).then_some(self.max_attempts)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.max_duration > 0).then(|| Duration::from_secs(self.max_duration))
    }

    pub fn reload_pause(&self) -> Duration {
        Duration::from_millis(self.reload_pause_ms)
    }

    pub fn error_wait(&self) -> Duration {
        Duration::from_millis(self.error_wait_ms)
    }
}

/// Tesseract settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language (e.g., "eng").
    pub language: String,
    /// Characters tesseract may emit.
    pub charset: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            charset: CAPTCHA_CHARSET.to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub portal: DomContract,
    pub solver: SolverConfig,
    pub ocr: OcrSettings,
    pub browser: BrowserEngineConfig,
}

impl Settings {
    /// Load settings from an explicit path, or a discovered config file.
    ///
    /// Without `path`, `prefer` searches the standard config locations for a
    /// `senescyt-lookup` file. Environment overrides are applied last.
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => discover().await,
        };

        Ok(Self::from_source(path.as_deref())?.with_env_overrides())
    }

    /// Parse `path` if there is one, otherwise use defaults.
    fn from_source(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply environment variable overrides.
    ///
    /// - `SENESCYT_WORK_DIR` - Directory for transient captcha images
    /// - `SENESCYT_MAX_ATTEMPTS` - OCR attempts per lookup (0 = unlimited)
    /// - `SENESCYT_MAX_DURATION` - Seconds per lookup (0 = unlimited)
    /// - `TESSERACT_LANG` - Tesseract language
    /// - `BROWSER_URL`, `SOCKS_PROXY` - see [`BrowserEngineConfig::with_env_overrides`]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("SENESCYT_WORK_DIR") {
            if !val.is_empty() {
                self.solver.work_dir = PathBuf::from(val);
            }
        }
        if let Some(val) = env_parse("SENESCYT_MAX_ATTEMPTS") {
            self.solver.max_attempts = val;
        }
        if let Some(val) = env_parse("SENESCYT_MAX_DURATION") {
            self.solver.max_duration = val;
        }
        if let Ok(val) = std::env::var("TESSERACT_LANG") {
            if !val.is_empty() {
                self.ocr.language = val;
            }
        }

        self.browser = self.browser.with_env_overrides();
        self
    }
}

/// Use prefer for file discovery; parsing stays with serde.
async fn discover() -> Option<PathBuf> {
    match prefer::load(CONFIG_NAME).await {
        Ok(found) => found.source_path().map(|p| p.to_path_buf()),
        Err(e) => {
            debug!("No {} config discovered: {}", CONFIG_NAME, e);
            None
        }
    }
}

/// Parse an environment variable, warning (not failing) on bad values.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}
