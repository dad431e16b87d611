//! Configuration handling for the extractor.

use crate::discovery::fetch_budget;
use crate::scanner::{ScanOptions, MAX_SCRIPT_BYTES};
use crate::types::HttpConfig;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Extract URLs from a web page and the JavaScript it loads.
#[derive(Parser, Debug, Clone)]
#[command(name = "urlharvest")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Target URL(s) to analyze
    #[arg(required_unless_present = "file")]
    pub targets: Vec<String>,

    /// File containing URLs to analyze (one per line)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
    pub output: OutputFormat,

    /// Output file for json/text formats (defaults to output.json / output.text)
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Write per-page reports (scripts, parse status, errors) as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Maximum retries for failed requests
    #[arg(long, default_value = "2")]
    pub max_retries: u32,

    /// Rate limit (requests per second)
    #[arg(long, default_value = "10")]
    pub rate_limit: u32,

    /// Custom User-Agent string
    #[arg(long, env = "URLHARVEST_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Scripts fetched concurrently per page
    #[arg(long, default_value = "8")]
    pub concurrency: usize,

    /// Number of targets to scan in parallel
    #[arg(long, short = 'p', default_value = "1")]
    pub parallel: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: print only the URLs
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,
}

/// Where extracted URLs go.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One URL per line on stdout
    Console,
    /// JSON array of strings in a file
    Json,
    /// Newline-delimited URLs in a file
    Text,
}

impl OutputFormat {
    /// Default file name for file-backed formats.
    pub fn default_file(self) -> Option<&'static Path> {
        match self {
            OutputFormat::Console => None,
            OutputFormat::Json => Some(Path::new("output.json")),
            OutputFormat::Text => Some(Path::new("output.text")),
        }
    }
}

impl Config {
    /// Get HTTP configuration from the command line.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout_secs: self.timeout,
            max_retries: self.max_retries,
            user_agent: self.user_agent.clone().unwrap_or_else(|| {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
            }),
        }
    }

    /// Orchestrator tuning from the command line.
    pub fn scan_options(&self) -> ScanOptions {
        // Retries happen inside one fetch, so the outer bound covers all of them.
        ScanOptions {
            concurrency: self.concurrency.max(1),
            fetch_timeout: fetch_budget(&self.http_config()),
            max_script_bytes: MAX_SCRIPT_BYTES,
        }
    }

    /// File the URL list is written to, if the format uses one.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_file
            .clone()
            .or_else(|| self.output.default_file().map(Path::to_path_buf))
            .filter(|_| self.output != OutputFormat::Console)
    }

    /// Load targets from file if specified.
    pub fn load_targets(&self) -> crate::types::Result<Vec<String>> {
        let mut targets = self.targets.clone();

        if let Some(ref file_path) = self.file {
            let content = std::fs::read_to_string(file_path)?;
            for line in content.lines() {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    targets.push(trimmed.to_string());
                }
            }
        }

        Ok(targets.into_iter().map(|t| normalize_target(&t)).collect())
    }
}

/// Prefix scheme-less targets with `https://`.
fn normalize_target(target: &str) -> String {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["urlharvest", "https://example.com"]);
        assert_eq!(config.output, OutputFormat::Console);
        assert_eq!(config.output_path(), None);
        assert_eq!(config.targets, vec!["https://example.com"]);
    }

    #[test]
    fn test_output_formats() {
        let json = Config::parse_from(["urlharvest", "-o", "json", "example.com"]);
        assert_eq!(json.output_path(), Some(PathBuf::from("output.json")));

        let text = Config::parse_from(["urlharvest", "-o", "text", "example.com"]);
        assert_eq!(text.output_path(), Some(PathBuf::from("output.text")));

        let text = Config::parse_from([
            "urlharvest",
            "--output",
            "text",
            "--output-file",
            "/tmp/urls.txt",
            "example.com",
        ]);
        assert_eq!(text.output_path(), Some(PathBuf::from("/tmp/urls.txt")));

        assert!(Config::try_parse_from(["urlharvest", "-o", "xml", "example.com"]).is_err());
    }

    #[test]
    fn test_target_required() {
        assert!(Config::try_parse_from(["urlharvest"]).is_err());
    }

    #[test]
    fn test_load_targets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# targets").unwrap();
        writeln!(file, "a.example.com").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  http://b.example.com/path  ").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = Config::parse_from(["urlharvest", "-f", &path, "c.example.com"]);

        assert_eq!(
            config.load_targets().unwrap(),
            vec![
                "https://c.example.com",
                "https://a.example.com",
                "http://b.example.com/path",
            ]
        );
    }

    #[test]
    fn test_scan_options_cover_retries() {
        let config = Config::parse_from([
            "urlharvest",
            "--timeout",
            "10",
            "--max-retries",
            "2",
            "--concurrency",
            "0",
            "x.test",
        ]);
        let options = config.scan_options();
        assert_eq!(options.concurrency, 1);
        assert!(options.fetch_timeout >= Duration::from_secs(30));
    }

    #[test]
    fn test_scan_options_cover_retry_backoff() {
        let config = Config::parse_from([
            "urlharvest",
            "--timeout",
            "1",
            "--max-retries",
            "8",
            "x.test",
        ]);
        // 9 attempts of 1s plus 0.5s * (1 + 2 + ... + 8) of pauses
        assert!(config.scan_options().fetch_timeout >= Duration::from_secs(27));
    }

    #[test]
    fn test_scan_options_huge_timeout() {
        let config = Config::parse_from([
            "urlharvest",
            "--timeout",
            "18446744073709551615",
            "x.test",
        ]);
        assert!(config.scan_options().fetch_timeout >= Duration::from_secs(u64::MAX));
    }
}
