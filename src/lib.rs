//! urlharvest - URL extraction from web pages and their JavaScript.
//!
//! This library finds resource references by:
//! - Walking link-bearing HTML attributes (`a`, `link`, `script`, `img`, `iframe`)
//! - Matching URLs in inline `<script>` text and CSS `url(...)` in `<style>` blocks
//! - Parsing inline and external JavaScript with an AST and collecting URL literals
//! - Resolving everything against the page and keeping only unique http(s) URLs
//!
//! # Example
//!
//! ```no_run
//! use urlharvest::{HttpFetcher, HttpConfig, ScanOptions, Scanner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetcher = HttpFetcher::new(HttpConfig::default(), 10).unwrap();
//!     let scanner = Scanner::new(fetcher, ScanOptions::default());
//!     let urls = scanner.extract_page("https://example.com").await;
//!     println!("Found {} URLs", urls.len());
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod normalize;
pub mod notify;
pub mod parser;
pub mod scanner;
pub mod types;

pub use config::{Config, OutputFormat};
pub use discovery::{Fetch, HttpFetcher};
pub use normalize::{normalize, NormalizedUrl, Rejection, ResultSet};
pub use scanner::{ScanOptions, Scanner};
pub use types::{
    HttpConfig, PageReport, ParseStatus, Result, ScriptOrigin, ScriptRecord, ScriptStatus,
    UrlHarvestError,
};
