//! Output for extraction results.
//!
//! This module handles:
//! - Colored console status and plain URL listing
//! - JSON and text output files

pub mod console;
pub mod file;

pub use console::{print_urls, ConsoleOutput};
