//! Captcha retry loop.
//!
//! Each attempt refills the identification number, screenshots the captcha,
//! cleans it up for OCR and submits whatever plausible text comes back. The
//! portal's verdict decides whether to stop or go around again.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::form::{fill_identification, submit_candidate};
use super::outcome::{classify, Outcome};
use crate::captcha::{
    capture_captcha, is_valid_candidate, preprocess, CaptchaArtifacts, Freshness, StaleDetector,
};
use crate::config::{DomContract, SolverConfig};
use crate::ocr::OcrBackend;
use crate::page::PageAutomation;

/// Bounds and pacing for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// OCR attempts allowed (`None` = unlimited).
    pub max_attempts: Option<u32>,
    /// Wall-clock budget, stale reloads included (`None` = unlimited).
    pub max_duration: Option<Duration>,
    /// Pause after reloading for a stale captcha.
    pub reload_pause: Duration,
    /// Bounded wait for the portal's error message after submitting.
    pub error_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&SolverConfig::default())
    }
}

impl From<&SolverConfig> for RetryPolicy {
    fn from(config: &SolverConfig) -> Self {
        Self {
            max_attempts: config.attempt_limit(),
            max_duration: config.time_limit(),
            reload_pause: config.reload_pause(),
            error_wait: config.error_wait(),
        }
    }
}

/// Which bound ended the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    MaxAttempts(u32),
    Deadline(Duration),
}

impl fmt::Display for ExhaustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExhaustReason::MaxAttempts(n) => write!(f, "gave up after {} attempt(s)", n),
            ExhaustReason::Deadline(d) => write!(f, "gave up after {}s", d.as_secs()),
        }
    }
}

/// How a lookup's captcha loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The results table is showing.
    Solved { attempts: u32 },
    /// The portal has no records for the identification number.
    InvalidId { attempts: u32 },
    /// A retry bound was reached first.
    Exhausted {
        attempts: u32,
        reason: ExhaustReason,
        /// Last classification seen, if any submission was made.
        last: Option<Outcome>,
    },
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved { .. })
    }

    /// OCR attempts consumed.
    pub fn attempts(&self) -> u32 {
        match *self {
            SolveOutcome::Solved { attempts }
            | SolveOutcome::InvalidId { attempts }
            | SolveOutcome::Exhausted { attempts, .. } => attempts,
        }
    }
}

/// Drives the captcha loop on an already opened lookup form.
pub struct CaptchaSolver<'a> {
    page: &'a dyn PageAutomation,
    ocr: &'a dyn OcrBackend,
    contract: &'a DomContract,
    policy: RetryPolicy,
    work_dir: PathBuf,
}

impl<'a> CaptchaSolver<'a> {
    pub fn new(
        page: &'a dyn PageAutomation,
        ocr: &'a dyn OcrBackend,
        contract: &'a DomContract,
    ) -> Self {
        Self {
            page,
            ocr,
            contract,
            policy: RetryPolicy::default(),
            work_dir: PathBuf::from("."),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Directory for the per-attempt captcha images.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Run attempts until the portal answers definitively or a bound is hit.
    ///
    /// Errors are returned only when the page itself cannot be driven
    /// (filling, submitting, reloading). A failed capture or recognition
    /// costs one attempt and the loop continues.
    pub async fn solve(&self, id: &str) -> Result<SolveOutcome> {
        let started = Instant::now();
        let mut stale = StaleDetector::new();
        let mut attempts: u32 = 0;
        let mut last: Option<Outcome> = None;

        loop {
            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    warn!("{}: no answer after {} attempt(s)", id, attempts);
                    return Ok(SolveOutcome::Exhausted {
                        attempts,
                        reason: ExhaustReason::MaxAttempts(max),
                        last,
                    });
                }
            }
            if let Some(limit) = self.policy.max_duration {
                if started.elapsed() >= limit {
                    warn!("{}: time budget of {}s spent", id, limit.as_secs());
                    return Ok(SolveOutcome::Exhausted {
                        attempts,
                        reason: ExhaustReason::Deadline(limit),
                        last,
                    });
                }
            }

            let attempt = attempts + 1;
            fill_identification(self.page, self.contract, id).await?;

            let artifacts = CaptchaArtifacts::for_attempt(&self.work_dir, attempt);
            let capture =
                match capture_captcha(self.page, &self.contract.captcha_image, artifacts.raw())
                    .await
                {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Attempt {}: captcha capture failed: {:#}", attempt, e);
                        attempts = attempt;
                        continue;
                    }
                };

            if stale.observe(capture) == Freshness::Stale {
                drop(artifacts);
                info!("Captcha did not change, reloading");
                self.page.reload().await?;
                tokio::time::sleep(self.policy.reload_pause).await;
                continue;
            }

            let candidate = self.recognize(&artifacts, attempt);
            drop(artifacts);
            attempts = attempt;

            let Some(candidate) = candidate else {
                continue;
            };
            if !is_valid_candidate(&candidate) {
                debug!("Attempt {}: rejecting OCR text {:?}", attempt, candidate);
                continue;
            }

            submit_candidate(self.page, self.contract, &candidate).await?;
            let outcome = classify(self.page, self.contract, self.policy.error_wait).await;
            info!("Attempt {}: {:?} -> {}", attempt, candidate, outcome);
            last = Some(outcome);

            match outcome {
                Outcome::ResultOk => return Ok(SolveOutcome::Solved { attempts }),
                Outcome::InvalidId => return Ok(SolveOutcome::InvalidId { attempts }),
                Outcome::WrongCaptcha => {}
                Outcome::Unknown => {
                    debug!("Unrecognized page after submission, reloading");
                    self.page.reload().await?;
                }
            }
        }
    }

    /// Preprocess and OCR the captured image. Failures are logged.
    fn recognize(&self, artifacts: &CaptchaArtifacts, attempt: u32) -> Option<String> {
        let processed = match preprocess(artifacts.raw(), artifacts.processed()) {
            Ok(path) => path,
            Err(e) => {
                warn!("Attempt {}: preprocessing failed: {}", attempt, e);
                return None;
            }
        };

        match self.ocr.ocr_image(&processed) {
            Ok(result) => {
                debug!(
                    "Attempt {}: {} read {:?} in {}ms",
                    attempt, result.backend, result.text, result.processing_time_ms
                );
                Some(result.text)
            }
            Err(e) => {
                warn!("Attempt {}: OCR failed: {}", attempt, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let config = SolverConfig {
            max_attempts: 0,
            max_duration: 30,
            reload_pause_ms: 10,
            error_wait_ms: 20,
            ..Default::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, None);
        assert_eq!(policy.max_duration, Some(Duration::from_secs(30)));
        assert_eq!(policy.reload_pause, Duration::from_millis(10));
        assert_eq!(policy.error_wait, Duration::from_millis(20));
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(SolveOutcome::Solved { attempts: 2 }.is_solved());
        assert!(!SolveOutcome::InvalidId { attempts: 1 }.is_solved());

        let exhausted = SolveOutcome::Exhausted {
            attempts: 50,
            reason: ExhaustReason::MaxAttempts(50),
            last: Some(Outcome::WrongCaptcha),
        };
        assert!(!exhausted.is_solved());
        assert_eq!(exhausted.attempts(), 50);
        assert_eq!(
            ExhaustReason::Deadline(Duration::from_secs(600)).to_string(),
            "gave up after 600s"
        );
    }
}
