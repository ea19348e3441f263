//! Registry lookups: form driving, the captcha loop and result extraction.

mod extract;
mod form;
mod outcome;
mod solver;

pub use extract::{extract_from_page, extract_records};
pub use form::{fill_identification, open_form, submit_candidate};
pub use outcome::{classify, Outcome};
pub use solver::{CaptchaSolver, ExhaustReason, RetryPolicy, SolveOutcome};

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;

use crate::config::Settings;
use crate::models::DegreeRecord;
use crate::ocr::OcrBackend;
use crate::page::PageAutomation;

/// Everything learned about one identification number.
#[derive(Debug, Clone)]
pub struct LookupReport {
    pub id: String,
    pub outcome: SolveOutcome,
    /// Degree rows; empty unless the lookup was solved.
    pub records: Vec<DegreeRecord>,
    pub elapsed: Duration,
}

impl LookupReport {
    pub fn is_solved(&self) -> bool {
        self.outcome.is_solved()
    }
}

/// Look up one identification number on an open page.
///
/// Opens the form, runs the captcha loop and, only when the portal shows
/// results, scrapes the degree tables.
pub async fn lookup(
    page: &dyn PageAutomation,
    ocr: &dyn OcrBackend,
    settings: &Settings,
    id: &str,
) -> Result<LookupReport> {
    let started = Instant::now();
    info!("Looking up {}", id);

    open_form(page, &settings.portal).await?;

    let outcome = CaptchaSolver::new(page, ocr, &settings.portal)
        .with_policy(RetryPolicy::from(&settings.solver))
        .with_work_dir(&settings.solver.work_dir)
        .solve(id)
        .await?;

    let records = if outcome.is_solved() {
        extract_from_page(page).await
    } else {
        Vec::new()
    };

    Ok(LookupReport {
        id: id.to_string(),
        outcome,
        records,
        elapsed: started.elapsed(),
    })
}
