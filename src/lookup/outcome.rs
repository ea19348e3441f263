//! Classification of the page after a lookup submission.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::config::DomContract;
use crate::page::PageAutomation;

/// What the portal said about a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results table is on the page.
    ResultOk,
    /// The captcha answer was rejected.
    WrongCaptcha,
    /// The portal has no records for this identification number.
    InvalidId,
    /// Neither an error message nor a results table appeared.
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::ResultOk => "result_ok",
            Outcome::WrongCaptcha => "wrong_captcha",
            Outcome::InvalidId => "invalid_id",
            Outcome::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inspect the post-submit page.
///
/// The error region is checked first with a bounded wait. Lookup failures
/// there are treated as "no message". A page with neither a known message nor
/// a results table is [`Outcome::Unknown`], never a definitive negative.
///
/// The submit is an AJAX update, so a message still in the DOM from an
/// earlier submission would be read as this one's answer.
/// [`submit_candidate`](super::form::submit_candidate) clears the error region
/// before clicking for that reason.
pub async fn classify(
    page: &dyn PageAutomation,
    contract: &DomContract,
    error_wait: Duration,
) -> Outcome {
    match page.query_text(&contract.error_messages, error_wait).await {
        Ok(Some(message)) => {
            if message.contains(&contract.wrong_captcha_text) {
                return Outcome::WrongCaptcha;
            }
            if message.contains(&contract.no_results_text) {
                return Outcome::InvalidId;
            }
            debug!("Unrecognized portal message: {:?}", message.trim());
        }
        Ok(None) => debug!("No error message after submission"),
        Err(e) => debug!("Error message lookup failed: {}", e),
    }

    match page.query_count(&contract.results_table).await {
        Ok(count) if count > 0 => Outcome::ResultOk,
        Ok(_) => Outcome::Unknown,
        Err(e) => {
            debug!("Results table lookup failed: {}", e);
            Outcome::Unknown
        }
    }
}
