use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use file_policy_validator::prelude::*;

#[derive(Parser)]
#[command(name = "file_policy_validator")]
#[command(about = "Validate files against a size, type, image and PDF policy", long_about = None)]
struct Cli {
    /// Files or directories to validate
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Scan directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// JSON file with validation options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum file size in KB (overrides the options file)
    #[arg(long)]
    size_kb: Option<f64>,

    /// Allowed MIME type, repeatable (overrides the options file)
    #[arg(long = "allow", value_name = "MIME")]
    allow: Vec<String>,

    /// Print an alert for every rejection
    #[arg(long)]
    show_alert: bool,

    /// Write a report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the report as JSON
    #[arg(long)]
    json: bool,

    /// Run in batch mode (no progress bar)
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Alerts go to stderr without tearing the progress bar
struct ConsoleAlert {
    progress: ProgressBar,
}

impl AlertSink for ConsoleAlert {
    fn alert(&self, message: &str) {
        self.progress.suspend(|| eprintln!("⚠️  {}", message));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let options = load_options(&cli)?;

    // A bad configuration aborts before any file is touched.
    resolve(&options).context("Invalid validation options")?;

    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  Shutdown requested. Finishing current file...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let files = expand_paths(&cli.paths, cli.recursive)?;
    if files.is_empty() {
        println!("No files found.");
        return Ok(());
    }
    println!("Found {} file(s) to validate\n", files.len());

    let progress = if cli.batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let validator = FileValidator::with_alert_sink(ConsoleAlert {
        progress: progress.clone(),
    });

    let mut results = Vec::with_capacity(files.len());
    for path in &files {
        if shutdown_requested.load(Ordering::SeqCst) {
            break;
        }

        let candidate = match CandidateFile::from_path(path).await {
            Ok(candidate) => candidate,
            Err(e) => {
                progress.suspend(|| eprintln!("Skipping {}: {}", path.display(), e));
                progress.inc(1);
                continue;
            }
        };

        let mime_type = candidate.mime_type().to_string();
        let outcome = validator
            .validate(&SelectionEvent::single(candidate), &options)?
            .await;

        if cli.verbose {
            if let Err(rejection) = &outcome {
                progress.suspend(|| eprintln!("Rejected {}: {}", path.display(), rejection));
            }
        }

        results.push(ValidationResult {
            path: path.clone(),
            mime_type,
            rejection: outcome.err(),
        });
        progress.inc(1);
    }

    let was_interrupted = shutdown_requested.load(Ordering::SeqCst);
    if was_interrupted {
        progress.finish_and_clear();
        eprintln!("⏹️  Stopped after {}/{} files", results.len(), files.len());
    } else {
        progress.finish_with_message("Validation complete!");
    }
    println!();

    let accepted = results.iter().filter(|r| r.is_valid()).count();
    println!("==================================================");
    println!("VALIDATION COMPLETE");
    println!("==================================================");
    println!("Accepted files: {}", accepted);
    println!("Rejected files: {}", results.len() - accepted);
    println!();

    for result in &results {
        if let Some(rejection) = &result.rejection {
            println!("  ✗ {}: {}", result.path.display(), rejection);
        }
    }

    if let Some(output) = &cli.output {
        if cli.json {
            write_json_report(output, &results)?;
        } else {
            write_report(output, &results)?;
        }
        println!("Report saved to: {:?}", output);
    }

    Ok(())
}

/// Options file overlaid by command-line flags
fn load_options(cli: &Cli) -> Result<UserOptions> {
    let mut options = match &cli.config {
        Some(path) => read_options_file(path)?,
        None => UserOptions::new(),
    };

    if let Some(kb) = cli.size_kb {
        options = options.size_in_kb_allowed(kb);
    }
    if !cli.allow.is_empty() {
        options = options.allowed_types(cli.allow.iter().cloned());
    }
    if cli.show_alert {
        options = options.show_alert(true);
    }

    Ok(options)
}

fn read_options_file(path: &Path) -> Result<UserOptions> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open options file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .context("Failed to parse options file")?;
    Ok(UserOptions::from_json(value)?)
}
