//! Source locations shared by every token, type and AST node.

/// A byte range within one registered source file.
///
/// `file_id` indexes the [`crate::source_manager::SourceManager`]; `line` is
/// 1-based; `col_start`/`col_end` are 1-based, inclusive-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub file_id: i32,
    pub line: u32,
    pub col_start: u32,
    pub col_end: u32,
}

impl Span {
    pub fn new(file_id: i32, line: u32, col_start: u32, col_end: u32) -> Self {
        Span {
            file_id,
            line,
            col_start,
            col_end,
        }
    }

    /// True when `other` immediately follows this span on the same line with
    /// no gap, e.g. the two `Greater` tokens of a written `>>`.
    pub fn immediately_followed_by(&self, other: &Span) -> bool {
        self.file_id == other.file_id
            && self.line == other.line
            && self.col_end + 1 == other.col_start
    }
}
