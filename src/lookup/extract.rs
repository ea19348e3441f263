//! Degree table extraction from the results page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::models::{DegreeColumn, DegreeRecord};
use crate::page::PageAutomation;

/// Trimmed text content of an element.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Whether a table's headers include every degree column.
fn is_degree_table(headers: &[String]) -> bool {
    DegreeColumn::ALL
        .iter()
        .all(|column| headers.iter().any(|h| h == column.header()))
}

/// Extract degree records from every qualifying table in `html`.
///
/// A table qualifies when its `<th>` texts contain all eight degree columns,
/// in any order and alongside any extra columns. Each `tbody` row becomes a
/// record of its trimmed `<td>` texts; rows are not checked for width.
pub fn extract_records(html: &str) -> Vec<DegreeRecord> {
    let document = Html::parse_document(html);
    let table_sel = selector("table");
    let header_sel = selector("th");
    let row_sel = selector("tbody tr");
    let cell_sel = selector("td");

    let mut records = Vec::new();

    for (idx, table) in document.select(&table_sel).enumerate() {
        let headers: Vec<String> = table.select(&header_sel).map(element_text).collect();
        if !is_degree_table(&headers) {
            continue;
        }

        let before = records.len();
        for row in table.select(&row_sel) {
            let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
            records.push(DegreeRecord::new(headers.clone(), cells));
        }
        debug!(
            "Table {} matched degree columns: {} row(s)",
            idx,
            records.len() - before
        );
    }

    records
}

/// Read the current page and extract its degree records.
///
/// Failures are logged and yield an empty list.
pub async fn extract_from_page(page: &dyn PageAutomation) -> Vec<DegreeRecord> {
    match page.content().await {
        Ok(html) => {
            let records = extract_records(&html);
            info!("Extracted {} degree record(s)", records.len());
            records
        }
        Err(e) => {
            warn!("Failed to extract degree records: {:#}", e);
            Vec::new()
        }
    }
}
