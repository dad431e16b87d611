//! Content retrieval.
//!
//! The only place in the crate that touches the network. Scanners receive
//! text; the [`Fetch`] trait is how the orchestrator gets it.

pub mod fetcher;

pub use fetcher::{fetch_budget, hash_content, Fetch, HttpFetcher};
