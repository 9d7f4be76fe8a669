//! Component M (ambient) — run-time-gated logging (§4.12, §9 "Global mutable
//! logging").
//!
//! Grounded in the teacher's `compiler_dev_logging.rs`, which gates `saying`
//! output behind compile-time Cargo features (`show_tokens`, `show_ast`, …).
//! This crate follows the spec's explicit redesign note instead: an
//! explicit `LogOptions` value threaded through the `ParseContext`, checked
//! at the call site, so logging can be toggled per run rather than per
//! build.

use saying::say;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub scanner: bool,
    pub parser: bool,
    pub codegen: bool,
    pub typechecker: bool,
    pub general: bool,
}

impl LogOptions {
    /// Parses the CLI's comma-separated `log_flags` (`p,l,c,t,g`), §6/§4.13.
    pub fn from_flags(flags: &str) -> Self {
        let mut options = LogOptions::default();
        for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag {
                "p" => options.parser = true,
                "l" => options.scanner = true,
                "c" => options.codegen = true,
                "t" => options.typechecker = true,
                "g" => options.general = true,
                _ => {}
            }
        }
        options
    }
}

/// Logs a scanner-stage line if `options.scanner` is set.
pub fn scanner_log(options: &LogOptions, message: impl std::fmt::Display) {
    if options.scanner {
        say!(blue: "[scanner] {message}");
    }
}

/// Logs a parser-stage line if `options.parser` is set.
pub fn parser_log(options: &LogOptions, message: impl std::fmt::Display) {
    if options.parser {
        say!(cyan: "[parser] {message}");
    }
}

/// Logs a driver/general-stage line if `options.general` is set.
pub fn driver_log(options: &LogOptions, message: impl std::fmt::Display) {
    if options.general {
        say!(green: "[driver] {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_flags_and_ignores_unknown_ones() {
        let opts = LogOptions::from_flags("p,t,zz");
        assert!(opts.parser);
        assert!(opts.typechecker);
        assert!(!opts.scanner);
        assert!(!opts.codegen);
        assert!(!opts.general);
    }

    #[test]
    fn empty_flags_enable_nothing() {
        let opts = LogOptions::from_flags("");
        assert!(!opts.parser && !opts.scanner && !opts.codegen && !opts.typechecker && !opts.general);
    }
}
