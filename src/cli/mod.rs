//! # CLI Module
//!
//! Command-line interface for the icon matching engine.
//!
//! ## Usage
//! ```bash
//! # Pair every query icon with its closest reference icon
//! iconmatch match ./icons/queries ./icons/references
//!
//! # JSON output for scripting
//! iconmatch match ./icons/queries ./icons/references --output json
//!
//! # Fixed worker pool and verbose progress
//! iconmatch match ./icons/queries ./icons/references --workers 4 --verbose
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use icon_match::core::scanner::{IconFile, IconScanner, ScanConfig, WalkDirScanner};
use icon_match::core::searcher::SearchResult;
use icon_match::core::{Matcher, MatcherConfig};
use icon_match::error::{IconMatchError, Result};
use icon_match::events::{BatchEvent, BatchPhase, Event, EventChannel, EventSender, SearchEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;

/// Icon Match - Pair icons with their closest labelled counterpart
#[derive(Parser, Debug)]
#[command(name = "iconmatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Match every query icon against a reference set
    Match {
        /// Directory holding the query icons
        query_dir: PathBuf,

        /// Directory holding the labelled reference icons
        reference_dir: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Worker threads for the search (default: all cores)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (query, match and score per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    icon_match::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            query_dir,
            reference_dir,
            output,
            workers,
            include_hidden,
            verbose,
        } => run_match(
            query_dir,
            reference_dir,
            output,
            workers,
            include_hidden,
            verbose,
        ),
    }
}

fn run_match(
    query_dir: PathBuf,
    reference_dir: PathBuf,
    output: OutputFormat,
    workers: Option<usize>,
    include_hidden: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Icon Match").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    for (label, dir) in [("Query", &query_dir), ("Reference", &reference_dir)] {
        if !dir.is_dir() {
            return Err(IconMatchError::Config(format!(
                "{} directory not found: {}",
                label,
                dir.display()
            )));
        }
    }

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose_clone = verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Batch(BatchEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Search(SearchEvent::Started { total_queries, .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_queries as u64);
                    }
                }
                Event::Search(SearchEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.queries_completed as u64);
                    }
                }
                Event::Search(SearchEvent::QueryMatched { query, .. }) => {
                    if verbose_clone {
                        if let Some(ref pb) = progress_clone {
                            pb.set_message(query);
                        }
                    }
                }
                Event::Batch(
                    BatchEvent::Completed { .. } | BatchEvent::Cancelled | BatchEvent::Error { .. },
                ) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Discover icons in both directories
    sender.send(Event::Batch(BatchEvent::PhaseChanged {
        phase: BatchPhase::Scanning,
    }));

    let scanner = WalkDirScanner::new(ScanConfig {
        include_hidden,
        ..Default::default()
    });

    let mut scan_warnings = Vec::new();
    let query_icons = discover_icons(&scanner, &query_dir, &sender, &mut scan_warnings)?;
    let reference_icons = discover_icons(&scanner, &reference_dir, &sender, &mut scan_warnings)?;

    let scanned_bytes: u64 = query_icons
        .iter()
        .chain(reference_icons.iter())
        .map(|icon| icon.size)
        .sum();
    tracing::debug!(
        queries = query_icons.len(),
        references = reference_icons.len(),
        bytes = scanned_bytes,
        "Icon discovery finished"
    );

    let queries = sorted_paths(query_icons);
    let references = sorted_paths(reference_icons);

    // Run the search
    let matcher = Matcher::with_config(MatcherConfig {
        worker_threads: workers,
    });
    let result = matcher.find_best_matches_with_events(&queries, &references, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    // Output results
    match output {
        OutputFormat::Pretty => {
            print_pretty_results(&term, &result, scanned_bytes, &scan_warnings, verbose)
        }
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

/// List one directory's icons, folding traversal problems into warnings.
fn discover_icons(
    scanner: &dyn IconScanner,
    dir: &Path,
    events: &EventSender,
    warnings: &mut Vec<String>,
) -> Result<Vec<IconFile>> {
    let scan = scanner.scan_with_events(&[dir.to_path_buf()], events)?;
    warnings.extend(scan.errors.iter().map(|e| e.to_string()));
    Ok(scan.icons)
}

/// Sort by file name so repeated runs see the same input order, which
/// keeps tie-breaks stable across platforms with different readdir
/// ordering.
fn sorted_paths(mut icons: Vec<IconFile>) -> Vec<PathBuf> {
    icons.sort_by(|a, b| {
        a.path
            .file_name()
            .cmp(&b.path.file_name())
            .then_with(|| a.path.cmp(&b.path))
    });
    icons.into_iter().map(|icon| icon.path).collect()
}

/// Presentation-level rounding; the engine reports full-precision scores.
fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

fn print_pretty_results(
    term: &Term,
    result: &SearchResult,
    scanned_bytes: u64,
    scan_warnings: &[String],
    verbose: bool,
) {
    term.write_line("").ok();
    term.write_line(&format!("{} Matching Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} of {} query icons matched in {:.1}s",
        style(result.results.len()).cyan(),
        style(result.total_queries).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} of {} reference icons usable",
        style(result.usable_references).cyan(),
        style(result.total_references).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} of icon data scanned",
        style(format_bytes(scanned_bytes)).dim()
    ))
    .ok();

    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} icons skipped (unreadable)",
            style(result.errors.len()).yellow()
        ))
        .ok();
    }

    term.write_line("").ok();

    // Show matches
    if result.results.is_empty() {
        term.write_line(&format!(
            "  {} No query icons produced results",
            style("!").yellow()
        ))
        .ok();
    } else {
        term.write_line(&format!("{}", style("Best matches:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for entry in &result.results {
            let target = match &entry.best_match {
                Some(id) => style(id.clone()).cyan().to_string(),
                None => style("(no match)".to_string()).dim().to_string(),
            };
            term.write_line(&format!(
                "  {} → {}  {}",
                entry.query,
                target,
                style(format!("({:.4})", round_score(entry.score))).dim()
            ))
            .ok();
        }
    }

    if verbose && !result.errors.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Skipped loads:").bold())).ok();
        for note in &result.errors {
            term.write_line(&format!("  {}", style(note).dim())).ok();
        }
    }

    if verbose && !scan_warnings.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Scan warnings:").bold())).ok();
        for warning in scan_warnings {
            term.write_line(&format!("  {}", style(warning).dim())).ok();
        }
    }

    term.write_line("").ok();
}

fn print_json_results(result: &SearchResult) {
    let output = serde_json::json!({
        "total_queries": result.total_queries,
        "matched": result.results.len(),
        "total_references": result.total_references,
        "usable_references": result.usable_references,
        "duration_ms": result.duration_ms,
        "results": result.results.iter().map(|r| {
            serde_json::json!({
                "query": r.query,
                "best_match": r.best_match,
                "score": round_score(r.score),
            })
        }).collect::<Vec<_>>(),
        "errors": result.errors,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(result: &SearchResult) {
    for entry in &result.results {
        println!(
            "{}\t{}\t{:.4}",
            entry.query,
            entry.best_match.as_deref().unwrap_or("-"),
            round_score(entry.score)
        );
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
