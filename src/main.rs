//! namescan - find files and directories by name
//!
//! Console front end: parses flags, runs one scan on a background thread and
//! drains its events on the main thread.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, RecvTimeoutError};
use namescan::{ScanEvent, ScanProgress, ScanResult, DEFAULT_WORKERS};
use tracing::{error, trace};
use tracing_subscriber::EnvFilter;

/// Find files and directories whose names contain a keyword
#[derive(Parser, Debug)]
#[command(
    name = "namescan",
    version,
    about = "Find files and directories whose names contain a keyword",
    after_help = "EXAMPLES:\n    \
        namescan invoice -d ~/Documents\n    \
        namescan report -d /srv/a -d /srv/b -w 2\n    \
        namescan \"\" -d . -q   # list everything under ."
)]
struct CliArgs {
    /// Case-insensitive substring to look for; empty matches everything
    #[arg(value_name = "KEYWORD", default_value = "")]
    keyword: String,

    /// Root directory to search (repeatable). Defaults to every drive, or the current directory
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    dirs: Vec<String>,

    /// Number of roots walked at the same time
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    workers: usize,

    /// Debug-level logging (set RUST_LOG=namescan=trace to see every visited path)
    #[arg(short, long)]
    verbose: bool,

    /// No progress line and no warnings
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose, args.quiet);

    let (keyword, roots) = search_inputs(&args);

    let (tx, rx) = unbounded::<ScanEvent>();
    let scanner = namescan::coordinator()
        .workers(args.workers)
        .observer(tx)
        .build()
        .context("Invalid configuration")?;

    eprintln!("Search started...");
    let handle = scanner
        .spawn(roots, keyword.as_str())
        .context("Failed to start scan")?;

    let mut line = ProgressLine::new(!args.quiet);
    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(ScanEvent::Log(msg)) => trace!("{msg}"),
            Ok(ScanEvent::Progress(p)) => line.update(p),
            Ok(ScanEvent::Complete { .. }) => break,
            Err(RecvTimeoutError::Timeout) if handle.is_finished() => break,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    line.finish();

    let result = handle.join().context("Scan failed")?;
    print_report(&keyword, &result);
    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else if verbose {
            EnvFilter::new("namescan=debug,warn")
        } else {
            EnvFilter::new("namescan=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Keyword and roots as typed, without surrounding whitespace.
///
/// Blank `--dir` values are ignored; if none remain, the default roots apply.
fn search_inputs(args: &CliArgs) -> (String, Vec<PathBuf>) {
    let keyword = args.keyword.trim().to_owned();
    let roots: Vec<PathBuf> = args
        .dirs
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .collect();

    if roots.is_empty() {
        (keyword, default_roots())
    } else {
        (keyword, roots)
    }
}

/// Every existing drive root on Windows, `/` elsewhere; the current
/// directory if neither yields anything.
fn default_roots() -> Vec<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(windows) {
        (b'A'..=b'Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
            .collect()
    } else {
        vec![PathBuf::from("/")]
    };

    let roots: Vec<PathBuf> = candidates.into_iter().filter(|p| p.exists()).collect();
    if roots.is_empty() {
        vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
    } else {
        roots
    }
}

/// A single stderr line rewritten whenever the whole percentage changes.
struct ProgressLine {
    enabled: bool,
    last:    Option<Option<u8>>,
    drawn:   bool,
}

impl ProgressLine {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
            drawn: false,
        }
    }

    fn update(&mut self, p: ScanProgress) {
        if !self.enabled {
            return;
        }
        let pct = p.percent();
        if self.last == Some(pct) {
            return;
        }
        self.last = Some(pct);
        self.drawn = true;

        let mut err = std::io::stderr().lock();
        let _ = match pct {
            Some(pct) => write!(err, "\r{pct:>3}% ({}/{})", p.processed, p.total),
            None      => write!(err, "\rno entries"),
        };
        let _ = err.flush();
    }

    fn finish(&mut self) {
        if self.drawn {
            eprintln!();
        }
    }
}

fn print_report(keyword: &str, result: &ScanResult) {
    let stats = &result.stats;
    if result.is_empty() {
        println!("No matching files or directories.");
    } else {
        println!(
            "Found {} entries whose name contains \"{}\":",
            result.total_count, keyword
        );
        print_section("Directories", &result.directories);
        print_section("Files", &result.files);
    }

    eprintln!(
        "Visited {} entries in {:.1}s ({} entries/sec), {} skipped{}",
        stats.processed,
        stats.duration.as_secs_f64(),
        stats.entries_per_sec,
        stats.errors,
        if stats.cancelled { ", cancelled" } else { "" },
    );
}

fn print_section(title: &str, paths: &[PathBuf]) {
    println!("  {title}:");
    if paths.is_empty() {
        println!("    - none");
    }
    for path in paths {
        println!("    - {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_and_dirs_are_trimmed() {
        let args = CliArgs::try_parse_from(["namescan", "  Foo ", "-d", " /srv/a ", "-d", "/srv/b"]).unwrap();
        let (keyword, roots) = search_inputs(&args);

        assert_eq!(keyword, "Foo");
        assert_eq!(roots, vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]);
    }

    #[test]
    fn blank_dirs_fall_back_to_defaults() {
        let args = CliArgs::try_parse_from(["namescan", "x", "-d", "   "]).unwrap();
        let (_, roots) = search_inputs(&args);

        assert_eq!(roots, default_roots());
        assert!(!roots.is_empty());
    }

    #[test]
    fn keyword_defaults_to_match_all() {
        let args = CliArgs::try_parse_from(["namescan", "-d", "."]).unwrap();
        let (keyword, _) = search_inputs(&args);
        assert!(keyword.is_empty());
    }
}
