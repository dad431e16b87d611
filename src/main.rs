//! urlharvest - URL extraction from web pages and their JavaScript.
//!
//! CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use urlharvest::notify::{self, ConsoleOutput};
use urlharvest::{Config, HttpFetcher, OutputFormat, ResultSet, Scanner};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let filter = if config.verbose {
        EnvFilter::new("urlharvest=debug,info")
    } else if config.quiet {
        EnvFilter::new("urlharvest=error")
    } else {
        EnvFilter::new("urlharvest=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

async fn run(config: Config) -> Result<(), ExitCode> {
    // Load targets
    let targets = match config.load_targets() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to load targets: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    if targets.is_empty() {
        error!("No targets specified. Use positional arguments or -f <file>.");
        return Err(ExitCode::FAILURE);
    }

    let fetcher = match HttpFetcher::new(config.http_config(), config.rate_limit) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    let console = ConsoleOutput::new(config.verbose, config.quiet);
    if !config.no_banner {
        console.print_banner();
    }

    let scanner = Scanner::new(fetcher, config.scan_options()).with_console(console.clone());
    let reports = scanner.scan_multiple(&targets, config.parallel).await;

    let mut urls = ResultSet::new();
    for report in &reports {
        urls.extend(report.urls.clone());
    }

    if let Some(ref report_path) = config.report {
        if let Err(e) = notify::file::write_reports(report_path, &reports) {
            error!("Failed to write report file: {}", e);
            return Err(ExitCode::FAILURE);
        }
        info!("Report written to: {:?}", report_path);
    }

    match config.output_path() {
        Some(path) => {
            let written = if config.output == OutputFormat::Json {
                notify::file::write_json(&path, &urls)
            } else {
                notify::file::write_text(&path, &urls)
            };
            if let Err(e) = written {
                error!("Failed to write output file: {}", e);
                return Err(ExitCode::FAILURE);
            }
            info!("Results written to: {:?}", path);
            console.print_info(&format!("{} unique URLs collected", urls.len()));
        }
        None => notify::print_urls(&urls),
    }

    if reports.iter().all(|r| !r.page_loaded()) {
        error!("No target could be loaded");
        return Err(ExitCode::FAILURE);
    }

    Ok(())
}
