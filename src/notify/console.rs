//! Colored console output for extraction runs.
//!
//! Status lines go to stderr so that stdout carries nothing but URLs.

use crate::normalize::ResultSet;
use crate::types::{PageReport, ParseStatus, ScriptStatus};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Console output handler with colors and formatting.
#[derive(Debug, Clone)]
pub struct ConsoleOutput {
    verbose: bool,
    quiet: bool,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Handler that prints nothing; the default for library use.
    pub fn silent() -> Self {
        Self::new(false, true)
    }

    pub fn print_banner(&self) {
        if self.quiet {
            return;
        }

        eprintln!();
        eprintln!("{}", "╔══════════════════════════════════════════════╗".cyan());
        eprintln!(
            "{}",
            format!("║  URLHARVEST v{:<32}║", env!("CARGO_PKG_VERSION")).cyan()
        );
        eprintln!("{}", "║  URL extraction from HTML and JavaScript     ║".cyan());
        eprintln!("{}", "╚══════════════════════════════════════════════╝".cyan());
        eprintln!();
    }

    /// Print scan start message.
    pub fn print_scan_start(&self, target: &str) {
        if self.quiet {
            return;
        }

        eprintln!(
            "{} Scanning: {}",
            "[*]".bright_blue(),
            target.bright_white()
        );
    }

    /// Print scan progress (only in verbose mode).
    pub fn print_progress(&self, message: &str) {
        if self.quiet || !self.verbose {
            return;
        }

        eprintln!("{} {}", "[.]".dimmed(), message.dimmed());
    }

    /// Print info message.
    pub fn print_info(&self, message: &str) {
        if self.quiet {
            return;
        }

        eprintln!("{} {}", "[*]".bright_blue(), message);
    }

    /// Print per-page summary.
    pub fn print_summary(&self, report: &PageReport) {
        if self.quiet {
            return;
        }

        let failed_scripts = report
            .scripts
            .iter()
            .filter(|s| !matches!(s.status, ScriptStatus::Parsed { .. }))
            .count();

        eprintln!();
        eprintln!("{}", "=== Extraction Summary ===".bright_cyan());
        eprintln!("  Target:    {}", report.target);
        eprintln!("  Duration:  {:.2}s", report.duration_secs);
        if let Some(markup) = report.markup {
            eprintln!("  Markup:    {}", format_parse_status(markup));
        }
        eprintln!(
            "  Scripts:   {} ({} not scanned)",
            report.scripts.len(),
            failed_scripts
        );

        if report.urls.is_empty() {
            eprintln!("  {}", "No URLs found.".yellow());
        } else {
            eprintln!(
                "  {}",
                format!("URLs found: {}", report.urls.len()).green().bold()
            );
        }

        if !report.errors.is_empty() {
            eprintln!();
            eprintln!("{}", "Errors encountered:".yellow());
            for error in &report.errors {
                eprintln!("  - {}", error.dimmed());
            }
        }

        eprintln!();
    }

    /// Create a progress bar.
    pub fn create_progress_bar(&self, total: u64, message: &str) -> Option<ProgressBar> {
        if self.quiet || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Print URLs to stdout, one per line.
pub fn print_urls(urls: &ResultSet) {
    for url in urls {
        println!("{}", url);
    }
}

/// Format parse status with color.
fn format_parse_status(status: ParseStatus) -> colored::ColoredString {
    match status {
        ParseStatus::Clean => "clean".green(),
        ParseStatus::Degraded { errors } => format!("degraded ({} errors)", errors).yellow(),
        ParseStatus::Failed => "failed".red(),
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::silent()
    }
}
