//! Candidate URL scanners.
//!
//! This module handles extracting candidate URL strings from:
//! - HTML link-bearing attributes (`markup`)
//! - Inline `<script>`/`<style>` text via regexes (`inline`)
//! - JavaScript string literals via AST (`ast_parser`)
//!
//! Scanners are pure: they take text or a tree and return strings. Turning
//! those strings into URLs is the job of [`crate::normalize`].

pub mod ast_parser;
pub mod inline;
pub mod markup;

pub use ast_parser::{AstParser, ScriptScan};
pub use markup::{MarkupScan, MarkupTree, ScriptElement};
