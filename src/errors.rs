//! Terse error-raising macros (§7), grounded in the teacher's
//! `return_syntax_error!`/`return_type_error!` family, simplified to the
//! spec's single payload-less [`crate::diagnostics::ParsingError`] sentinel:
//! the message and span are recorded on the diagnostic engine; the `Err`
//! itself carries nothing.

#[macro_export]
macro_rules! lexical_error {
    ($ctx:expr, $span:expr, $($msg:tt)+) => {{
        $ctx.diagnostics.report_error($span, format!($($msg)+));
        return Err($crate::diagnostics::ParsingError);
    }};
}

#[macro_export]
macro_rules! syntax_error {
    ($ctx:expr, $span:expr, $($msg:tt)+) => {{
        $ctx.diagnostics.report_error($span, format!($($msg)+));
        return Err($crate::diagnostics::ParsingError);
    }};
}

#[macro_export]
macro_rules! semantic_error {
    ($ctx:expr, $span:expr, $($msg:tt)+) => {{
        $ctx.diagnostics.report_error($span, format!($($msg)+));
        return Err($crate::diagnostics::ParsingError);
    }};
}

#[macro_export]
macro_rules! warn_diagnostic {
    ($ctx:expr, $span:expr, $($msg:tt)+) => {{
        $ctx.diagnostics.report_warning($span, format!($($msg)+));
    }};
}
