//! Shared helper functions for CLI commands.

use std::path::Path;

use anyhow::Context;
use console::style;

use senescyt_lookup::lookup::{LookupReport, SolveOutcome};
use senescyt_lookup::models::DegreeColumn;

/// Read identification numbers from a file.
///
/// One per line; only the first comma-separated field is used, so CSV exports
/// with extra columns work as-is. Blank lines are skipped.
pub fn read_ids_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ids file {}", path.display()))?;
    Ok(parse_ids(&content))
}

fn parse_ids(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Print a lookup report to stdout.
pub fn print_report(report: &LookupReport) {
    let elapsed = report.elapsed.as_secs_f32();
    match report.outcome {
        SolveOutcome::Solved { attempts } => {
            println!(
                "\n{} {} ({} record(s), {} attempt(s), {:.1}s)",
                style("✓").green(),
                style(&report.id).bold(),
                report.records.len(),
                attempts,
                elapsed
            );
            for (idx, record) in report.records.iter().enumerate() {
                println!("  {}", style(format!("#{}", idx + 1)).cyan());
                for column in DegreeColumn::ALL {
                    let value = record.get(column).unwrap_or("-");
                    println!("    {:<36} {}", style(column.header()).dim(), value);
                }
            }
        }
        SolveOutcome::InvalidId { attempts } => {
            println!(
                "\n{} {}: no registered degrees ({} attempt(s), {:.1}s)",
                style("✗").yellow(),
                style(&report.id).bold(),
                attempts,
                elapsed
            );
        }
        SolveOutcome::Exhausted {
            attempts,
            reason,
            last,
        } => {
            let last = last.map(|o| o.to_string()).unwrap_or_else(|| "none".to_string());
            println!(
                "\n{} {}: {} ({} attempt(s), last outcome: {})",
                style("✗").red(),
                style(&report.id).bold(),
                reason,
                attempts,
                last
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_ids_takes_first_field() {
        let ids = parse_ids("0102030405,Juan Perez\n\n  0912345678 \n1712345678,x,y\n,\n");
        assert_eq!(ids, vec!["0102030405", "0912345678", "1712345678"]);
    }

    #[test]
    fn test_read_ids_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0102030405\r\n9999999999").unwrap();
        let ids = read_ids_file(file.path()).unwrap();
        assert_eq!(ids, vec!["0102030405", "9999999999"]);
    }

    #[test]
    fn test_read_ids_file_missing() {
        assert!(read_ids_file(Path::new("/nonexistent/ids.txt")).is_err());
    }
}
