//! CLI commands implementation.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tracing::{error, info};

use senescyt_lookup::browser::{find_chrome, BrowserSession};
use senescyt_lookup::captcha::{is_valid_candidate, preprocess};
use senescyt_lookup::config::Settings;
use senescyt_lookup::lookup::lookup;
use senescyt_lookup::ocr::{OcrBackend, TesseractBackend, TesseractConfig};

use super::helpers::{print_report, read_ids_file};

#[derive(Parser)]
#[command(name = "senescyt-lookup")]
#[command(about = "Look up SENESCYT registered degrees by identification number")]
#[command(version)]
pub struct Cli {
    /// Config file (default: discovered senescyt-lookup config, if any)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// OCR attempts per lookup (0 = unlimited)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Seconds per lookup (0 = unlimited)
    #[arg(long, global = true)]
    max_duration: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one or more identification numbers
    Lookup {
        /// Identification numbers (prompted for when none are given)
        ids: Vec<String>,
        /// Read identification numbers from a file, one per line
        #[arg(long)]
        ids_file: Option<PathBuf>,
        /// Directory for transient captcha images
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },

    /// Run preprocessing and OCR on a local captcha image
    Solve {
        /// Captcha image file
        image: PathBuf,
    },

    /// Check if tesseract and Chrome are installed
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).await?;
    if cli.headed {
        settings.browser.headless = false;
    }
    if let Some(max_attempts) = cli.max_attempts {
        settings.solver.max_attempts = max_attempts;
    }
    if let Some(max_duration) = cli.max_duration {
        settings.solver.max_duration = max_duration;
    }

    match cli.command {
        Commands::Lookup {
            ids,
            ids_file,
            work_dir,
        } => {
            if let Some(work_dir) = work_dir {
                settings.solver.work_dir = work_dir;
            }
            cmd_lookup(&settings, ids, ids_file.as_deref()).await
        }
        Commands::Solve { image } => cmd_solve(&settings, &image),
        Commands::Check => cmd_check(&settings),
    }
}

/// Look up each identification number in its own browser session.
async fn cmd_lookup(
    settings: &Settings,
    mut ids: Vec<String>,
    ids_file: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = ids_file {
        ids.extend(read_ids_file(path)?);
    }
    if ids.is_empty() {
        ids.push(prompt_id()?);
    }

    let ocr = TesseractBackend::with_config(TesseractConfig::from(&settings.ocr));
    if !ocr.is_available() {
        anyhow::bail!("{}", ocr.availability_hint());
    }

    std::fs::create_dir_all(&settings.solver.work_dir).with_context(|| {
        format!(
            "Failed to create work directory {}",
            settings.solver.work_dir.display()
        )
    })?;

    let total = ids.len();
    for (idx, id) in ids.iter().enumerate() {
        if total > 1 {
            info!("[{}/{}] {}", idx + 1, total, id);
        }

        let session = BrowserSession::open(&settings.browser).await?;
        let result = lookup(&session, &ocr, settings, id).await;
        session.close().await;

        match result {
            Ok(report) => print_report(&report),
            Err(e) => {
                error!("Lookup of {} failed: {:#}", id, e);
                println!("{} {}: {:#}", style("✗").red(), id, e);
            }
        }
    }

    Ok(())
}

/// Ask for an identification number on stdin.
fn prompt_id() -> anyhow::Result<String> {
    print!("Identification number: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read identification number")?;

    let id = line.trim().to_string();
    if id.is_empty() {
        anyhow::bail!("No identification number given");
    }
    Ok(id)
}

/// Preprocess and OCR a captcha image, printing what the solver would submit.
fn cmd_solve(settings: &Settings, image: &Path) -> anyhow::Result<()> {
    let ocr = TesseractBackend::with_config(TesseractConfig::from(&settings.ocr));
    if !ocr.is_available() {
        anyhow::bail!("{}", ocr.availability_hint());
    }

    let temp = tempfile::TempDir::new().context("Failed to create scratch directory")?;
    let processed = preprocess(image, &temp.path().join("processed.png"))
        .with_context(|| format!("Failed to preprocess {}", image.display()))?;
    let result = ocr.ocr_image(&processed)?;

    let verdict = if is_valid_candidate(&result.text) {
        style("valid").green()
    } else {
        style("rejected").red()
    };
    println!(
        "{:?} ({}, {} in {}ms)",
        result.text, verdict, result.backend, result.processing_time_ms
    );
    Ok(())
}

/// Report on the external tools a lookup needs.
fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Tool Status").bold());
    println!("{}", "-".repeat(50));

    let ocr = TesseractBackend::with_config(TesseractConfig::from(&settings.ocr));
    let tesseract_status = if ocr.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", "Tesseract", tesseract_status);
    if !ocr.is_available() {
        println!("                  {}", style(ocr.availability_hint()).dim());
    }

    match (&settings.browser.remote_url, find_chrome()) {
        (Some(url), _) => println!("  {:<15} {} {}", "Chrome", style("remote").cyan(), url),
        (None, Ok(path)) => println!(
            "  {:<15} {} {}",
            "Chrome",
            style("✓ found").green(),
            style(path.display()).dim()
        ),
        (None, Err(_)) => println!("  {:<15} {}", "Chrome", style("✗ not found").red()),
    }

    println!();
    Ok(())
}
