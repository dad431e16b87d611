//! Main scanner orchestrating fetching, scanning and normalization.

use crate::discovery::{hash_content, Fetch};
use crate::normalize::{normalize, NormalizedUrl, ResultSet};
use crate::notify::ConsoleOutput;
use crate::parser::{inline, markup, AstParser, ScriptElement};
use crate::types::{
    PageReport, Result, ScriptOrigin, ScriptRecord, ScriptStatus, UrlHarvestError,
};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use url::Url;

/// Scripts above this size are not parsed.
pub const MAX_SCRIPT_BYTES: usize = 5 * 1024 * 1024; // 5MB

/// Tuning for one [`Scanner`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Scripts fetched and parsed at once per page.
    pub concurrency: usize,
    /// Upper bound on every single fetch.
    pub fetch_timeout: Duration,
    pub max_script_bytes: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            fetch_timeout: Duration::from_secs(30),
            max_script_bytes: MAX_SCRIPT_BYTES,
        }
    }
}

enum ScriptJob {
    External(NormalizedUrl),
    Inline { index: usize, text: String },
}

struct ScriptOutcome {
    record: ScriptRecord,
    candidates: Vec<String>,
}

/// Extracts URLs from pages and the scripts they load.
///
/// Holds no per-page state, so one scanner can serve concurrent extractions.
pub struct Scanner<F> {
    fetcher: F,
    options: ScanOptions,
    ast_parser: AstParser,
    console: ConsoleOutput,
}

impl<F: Fetch> Scanner<F> {
    /// Create a new scanner on top of `fetcher`.
    pub fn new(fetcher: F, options: ScanOptions) -> Self {
        Self {
            fetcher,
            options,
            ast_parser: AstParser::new(),
            console: ConsoleOutput::silent(),
        }
    }

    /// Report progress through `console`.
    pub fn with_console(mut self, console: ConsoleOutput) -> Self {
        self.console = console;
        self
    }

    /// All URLs found on `page_url` and in its scripts.
    ///
    /// Never fails: when the page itself cannot be loaded the set is empty.
    pub async fn extract_page(&self, page_url: &str) -> ResultSet {
        self.scan(page_url).await.urls
    }

    /// Scan a single target URL.
    pub async fn scan(&self, target: &str) -> PageReport {
        let start_time = Instant::now();
        self.console.print_scan_start(target);

        let mut report = PageReport::new(target);
        self.scan_into(&mut report).await;
        report.duration_secs = start_time.elapsed().as_secs_f64();

        self.console.print_summary(&report);
        report
    }

    /// Scan several targets, at most `parallel` at a time, keeping input order.
    pub async fn scan_multiple(&self, targets: &[String], parallel: usize) -> Vec<PageReport> {
        stream::iter(targets)
            .map(|target| self.scan(target))
            .buffered(parallel.max(1))
            .collect::<Vec<_>>()
            .await
    }

    async fn scan_into(&self, report: &mut PageReport) {
        let base = match Url::parse(&report.target) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid target URL {}: {}", report.target, e);
                report
                    .errors
                    .push(format!("Invalid target URL {}: {}", report.target, e));
                return;
            }
        };

        let body = match self.fetch_with_timeout(base.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error loading page {}: {}", base, e);
                report.errors.push(format!("Failed to load page: {}", e));
                return;
            }
        };

        // The markup tree is not Send; finish with it before the next await.
        let scripts = {
            let page = markup::scan(&body);
            let from_markup = report.urls.admit_all(&page.candidates, &base);
            let from_inline = report.urls.admit_all(inline::scan(&page.tree), &base);
            self.console.print_progress(&format!(
                "Markup gave {} URLs, inline blocks {} more",
                from_markup, from_inline
            ));
            report.markup = Some(page.status);
            page.tree.scripts()
        };

        let jobs = plan_scripts(scripts, &base);
        self.console
            .print_progress(&format!("Scanning {} scripts...", jobs.len()));

        for outcome in self.run_script_jobs(jobs).await {
            let added = report.urls.admit_all(&outcome.candidates, &base);
            trace!("{:?} added {} URLs", outcome.record.origin, added);

            if let ScriptStatus::FetchFailed { ref error } = outcome.record.status {
                report.errors.push(format!("Failed to load script: {}", error));
            }
            report.scripts.push(outcome.record);
        }
    }

    async fn run_script_jobs(&self, jobs: Vec<ScriptJob>) -> Vec<ScriptOutcome> {
        let pb = self
            .console
            .create_progress_bar(jobs.len() as u64, "Scanning scripts");
        let progress: Option<&ProgressBar> = pb.as_ref();

        let outcomes = stream::iter(jobs)
            .map(move |job| async move {
                let outcome = self.run_script_job(job).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                outcome
            })
            .buffered(self.options.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        outcomes
    }

    async fn run_script_job(&self, job: ScriptJob) -> ScriptOutcome {
        match job {
            ScriptJob::Inline { index, text } => {
                self.scan_script(ScriptOrigin::Inline { index }, &text)
            }
            ScriptJob::External(url) => {
                let origin = ScriptOrigin::External {
                    url: url.to_string(),
                };
                match self.fetch_with_timeout(url.as_str()).await {
                    Ok(body) => self.scan_script(origin, &body),
                    Err(e) => {
                        warn!("Error loading script {}: {}", url, e);
                        ScriptOutcome {
                            record: ScriptRecord {
                                origin,
                                bytes: 0,
                                content_hash: None,
                                status: ScriptStatus::FetchFailed {
                                    error: e.to_string(),
                                },
                                candidates: 0,
                            },
                            candidates: Vec::new(),
                        }
                    }
                }
            }
        }
    }

    fn scan_script(&self, origin: ScriptOrigin, body: &str) -> ScriptOutcome {
        let content_hash = Some(hash_content(body));

        if body.len() > self.options.max_script_bytes {
            debug!("Skipping large script ({} bytes): {:?}", body.len(), origin);
            return ScriptOutcome {
                record: ScriptRecord {
                    origin,
                    bytes: body.len(),
                    content_hash,
                    status: ScriptStatus::TooLarge,
                    candidates: 0,
                },
                candidates: Vec::new(),
            };
        }

        let label = match &origin {
            ScriptOrigin::External { url } => url.clone(),
            ScriptOrigin::Inline { index } => format!("inline script #{}", index),
        };
        let scan = self.ast_parser.scan(body, &label);

        ScriptOutcome {
            record: ScriptRecord {
                origin,
                bytes: body.len(),
                content_hash,
                status: ScriptStatus::Parsed { parse: scan.status },
                candidates: scan.candidates.len(),
            },
            candidates: scan.candidates,
        }
    }

    async fn fetch_with_timeout(&self, url: &str) -> Result<String> {
        match tokio::time::timeout(self.options.fetch_timeout, self.fetcher.get(url)).await {
            Ok(result) => result,
            Err(_) => Err(UrlHarvestError::Timeout(url.to_string())),
        }
    }
}

/// Turn the page's script elements into work items.
///
/// External sources are resolved against the page and fetched once each.
fn plan_scripts(scripts: Vec<ScriptElement>, base: &Url) -> Vec<ScriptJob> {
    let mut jobs = Vec::new();
    let mut queued: HashSet<NormalizedUrl> = HashSet::new();
    let mut inline_index = 0;

    for script in scripts {
        match script {
            ScriptElement::External(src) => match normalize(&src, base) {
                Ok(url) => {
                    if queued.insert(url.clone()) {
                        jobs.push(ScriptJob::External(url));
                    } else {
                        trace!("Script {} already queued", url);
                    }
                }
                Err(rejection) => debug!("Not fetching script {:?}: {}", src, rejection),
            },
            ScriptElement::Inline(text) => {
                jobs.push(ScriptJob::Inline {
                    index: inline_index,
                    text,
                });
                inline_index += 1;
            }
        }
    }

    jobs
}
