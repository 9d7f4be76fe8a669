//! Component B — the diagnostic engine, and the payload-less parse-error
//! sentinel (§7, §9 "Error propagation").
//!
//! Grounded in the teacher's `display_messages.rs` rendering shape and the
//! `compiler_errors.rs` legacy `CompileError`/`ErrorType` family, simplified
//! per the spec's explicit guidance to a single sentinel failure type: the
//! diagnostic content lives here, not in the `Err` payload.

use crate::source_manager::SourceManager;
use crate::span::Span;
use saying::say;
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    pub level: Level,
}

/// A parse failure that carries no information of its own. The actual
/// message and span were already pushed onto the owning [`DiagnosticEngine`]
/// at the point of failure; this type exists only so fallible parser
/// functions have a uniform `Result<T, ParsingError>` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsingError;

impl std::fmt::Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parsing failed; see diagnostics")
    }
}

impl std::error::Error for ParsingError {}

#[derive(Default)]
pub struct DiagnosticEngine {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        DiagnosticEngine::default()
    }

    pub fn report_error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            span,
            message: message.into(),
            level: Level::Error,
        });
    }

    pub fn report_warning(&mut self, span: Span, message: impl Into<String>) {
        self.warnings.push(Diagnostic {
            span,
            message: message.into(),
            level: Level::Warning,
        });
    }

    pub fn level_count(&self, level: Level) -> usize {
        match level {
            Level::Error => self.errors.len(),
            Level::Warning => self.warnings.len(),
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Renders every diagnostic at `level` to stderr: `LEVEL in <path>:<line>:<col>`
    /// followed by the offending source line and a caret underline.
    /// Failure to open a source file is reported but does not abort the
    /// rendering of the remaining diagnostics.
    pub fn render(&self, level: Level, source_manager: &SourceManager) {
        let diagnostics = match level {
            Level::Error => &self.errors,
            Level::Warning => &self.warnings,
        };

        for diagnostic in diagnostics {
            self.render_one(diagnostic, source_manager);
        }
    }

    fn render_one(&self, diagnostic: &Diagnostic, source_manager: &SourceManager) {
        let path = source_manager.resolve(diagnostic.span.file_id);
        let label = match diagnostic.level {
            Level::Error => "error",
            Level::Warning => "warning",
        };

        let header = format!(
            "{label} in {}:{}:{}",
            path.display(),
            diagnostic.span.line,
            diagnostic.span.col_start
        );

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                say!(red: "{header}\n  {} (could not open source: {err})", diagnostic.message);
                return;
            }
        };

        let line_text = source
            .lines()
            .nth((diagnostic.span.line.saturating_sub(1)) as usize)
            .unwrap_or("");

        let gutter = format!("{} | ", diagnostic.span.line);
        let caret_offset = gutter.len() + diagnostic.span.col_start.saturating_sub(1) as usize;
        let caret_width = diagnostic
            .span
            .col_end
            .saturating_sub(diagnostic.span.col_start)
            .max(1) as usize;

        let mut rendered = String::new();
        let _ = writeln!(rendered, "{header}");
        let _ = writeln!(rendered, "{gutter}{line_text}");
        let _ = writeln!(
            rendered,
            "{}{} {}",
            " ".repeat(caret_offset),
            "^".repeat(caret_width),
            diagnostic.message
        );

        match diagnostic.level {
            Level::Error => say!(red: "{rendered}"),
            Level::Warning => say!(yellow: "{rendered}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_count_independently() {
        let mut engine = DiagnosticEngine::new();
        engine.report_error(Span::default(), "bad token");
        engine.report_warning(Span::default(), "unused `;`");
        engine.report_warning(Span::default(), "unused `;`");
        assert_eq!(engine.level_count(Level::Error), 1);
        assert_eq!(engine.level_count(Level::Warning), 2);
        assert!(engine.has_errors());
    }
}
