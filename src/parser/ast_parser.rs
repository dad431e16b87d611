//! AST-based JavaScript scanner using oxc_parser.

use crate::types::ParseStatus;
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast::visit::walk;
use oxc_ast::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;
use tracing::{debug, trace};

/// Result of scanning one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptScan {
    /// String literals that start with `http://` or `https://`.
    pub candidates: Vec<String>,
    pub status: ParseStatus,
}

/// AST-based scanner for absolute URLs in JavaScript string literals.
#[derive(Clone, Default)]
pub struct AstParser;

impl AstParser {
    /// Create a new AST scanner.
    pub fn new() -> Self {
        Self
    }

    /// Parse `content` and collect absolute URL literals.
    ///
    /// `label` only appears in log lines.
    pub fn scan(&self, content: &str, label: &str) -> ScriptScan {
        let module = SourceType::default().with_module(true).with_jsx(true);
        let script = SourceType::default().with_module(false).with_jsx(true);

        // Bundles are usually modules; old inline code may use sloppy-mode
        // constructs that only parse as a classic script.
        let attempt = parse_and_visit(content, module);
        let attempt = if attempt.panicked {
            trace!("Module parse aborted for {}, retrying as script", label);
            parse_and_visit(content, script)
        } else {
            attempt
        };

        if attempt.panicked {
            debug!(
                "Failed to parse {} ({} errors), no URLs taken from it",
                label, attempt.errors
            );
            return ScriptScan {
                candidates: Vec::new(),
                status: ParseStatus::Failed,
            };
        }

        // We continue even with parse errors (common in minified code)
        if attempt.errors > 0 {
            trace!(
                "Parse had {} errors for {}, continuing...",
                attempt.errors,
                label
            );
        }

        debug!(
            "Extracted {} URL literals from AST: {}",
            attempt.urls.len(),
            label
        );

        ScriptScan {
            candidates: attempt.urls,
            status: ParseStatus::from_error_count(attempt.errors),
        }
    }
}

struct Attempt {
    urls: Vec<String>,
    errors: usize,
    panicked: bool,
}

fn parse_and_visit(content: &str, source_type: SourceType) -> Attempt {
    let allocator = Allocator::default();
    let parser_result = Parser::new(&allocator, content, source_type).parse();

    let mut visitor = UrlLiteralVisitor::default();
    if !parser_result.panicked {
        visitor.visit_program(&parser_result.program);
    }

    Attempt {
        urls: visitor.urls,
        errors: parser_result.errors.len(),
        panicked: parser_result.panicked,
    }
}

fn is_absolute_web_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Visitor collecting URL-looking string values from every node kind.
///
/// The default `Visit` walk reaches every expression, statement and JSX
/// attribute, so only the two leaf kinds that hold string data are hooked.
#[derive(Default)]
struct UrlLiteralVisitor {
    urls: Vec<String>,
}

impl UrlLiteralVisitor {
    fn add(&mut self, value: &str) {
        if is_absolute_web_url(value) {
            self.urls.push(value.to_string());
        }
    }
}

impl<'a> Visit<'a> for UrlLiteralVisitor {
    fn visit_string_literal(&mut self, lit: &StringLiteral<'a>) {
        self.add(lit.value.as_str());
    }

    fn visit_template_literal(&mut self, lit: &TemplateLiteral<'a>) {
        for quasi in lit.quasis.iter() {
            let text = quasi.value.cooked.as_ref().unwrap_or(&quasi.value.raw);
            self.add(text.as_str());
        }
        walk::walk_template_literal(self, lit);
    }
}
