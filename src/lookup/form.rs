//! Form driving: the lookup page's inputs and search button.

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::DomContract;
use crate::page::PageAutomation;

/// Navigate to the lookup form.
pub async fn open_form(page: &dyn PageAutomation, contract: &DomContract) -> Result<()> {
    page.goto(&contract.url)
        .await
        .context("Failed to open lookup form")
}

/// Put the identification number in its field.
///
/// Called before every captcha attempt: the portal clears the form on some
/// error responses and on reload.
pub async fn fill_identification(
    page: &dyn PageAutomation,
    contract: &DomContract,
    id: &str,
) -> Result<()> {
    page.fill(&contract.id_input, id)
        .await
        .context("Failed to fill identification number")
}

/// Enter a captcha candidate and press search.
///
/// Any error message left by the previous submission is removed first, so
/// classification only ever sees the portal's answer to this one.
pub async fn submit_candidate(
    page: &dyn PageAutomation,
    contract: &DomContract,
    candidate: &str,
) -> Result<()> {
    debug!("Submitting captcha candidate {:?}", candidate);
    page.fill(&contract.captcha_input, candidate)
        .await
        .context("Failed to fill captcha")?;
    page.remove(&contract.error_messages)
        .await
        .context("Failed to clear previous error message")?;
    page.click(&contract.search_button)
        .await
        .context("Failed to submit lookup form")
}
