//! Component I — the parser core: the hand-written Pratt/precedence-climbing
//! state machine (§4.9).

mod declarations;
mod expressions;
mod statements;
mod types;

pub use declarations::parse_compilation_unit;

use crate::ast::Block;
use crate::diagnostics::ParsingError;
use crate::parse_context::ParseContext;
use crate::scanner::Scanner;
use crate::span::Span;
use crate::string_interning::StringId;
use crate::tokens::{Token, TokenKind};
use crate::{syntax_error, warn_diagnostic};

/// Holds the 3-token lookahead window (`previous`, `current`, `next`) and
/// drives the scanner (§4.9, "Framing").
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    pub file_id: i32,
    previous: Token,
    current: Token,
    next: Token,
}

impl<'a> Parser<'a> {
    pub fn new(ctx: &mut ParseContext, file_id: i32, source: &'a str) -> Self {
        let scanner = Scanner::new(file_id, source);
        let bootstrap_span = Span::new(file_id, 1, 1, 1);
        let placeholder = Token::new(TokenKind::EndOfFile, ctx.strings.intern(""), bootstrap_span);

        let mut parser = Parser {
            scanner,
            file_id,
            previous: placeholder.clone(),
            current: placeholder.clone(),
            next: placeholder,
        };

        // Two initial advances populate `current` and `next` (§4.9 "Framing").
        parser.current = parser.scanner_next(ctx);
        parser.next = parser.scanner_next(ctx);
        parser
    }

    fn scanner_next(&mut self, ctx: &mut ParseContext) -> Token {
        self.scanner.scan_next(&mut ctx.strings)
    }

    pub fn advance(&mut self, ctx: &mut ParseContext) {
        crate::logging::parser_log(&ctx.options, format!("advance past {:?}", self.current.kind));
        self.previous = std::mem::replace(&mut self.current, std::mem::replace(&mut self.next, self.scanner_next(ctx)));
    }

    pub fn previous(&self) -> &Token {
        &self.previous
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn peek_next(&self) -> &Token {
        &self.next
    }

    pub fn current_span(&self) -> Span {
        self.current.span
    }

    pub fn is_eof(&self) -> bool {
        self.current.kind.is_eof()
    }

    /// Consumes `current` if it matches `kind`, advancing past it.
    pub fn eat(&mut self, ctx: &mut ParseContext, kind: &TokenKind) -> bool {
        if &self.current.kind == kind {
            self.advance(ctx);
            true
        } else {
            false
        }
    }

    /// Requires `current` to match `kind`, with a "did you mean" hint when
    /// the previous+current pair is a known split compound operator
    /// (§7 "Syntax").
    pub fn expect(
        &mut self,
        ctx: &mut ParseContext,
        kind: TokenKind,
        expected_literal: &str,
    ) -> Result<(), ParsingError> {
        if self.current.kind == kind {
            self.advance(ctx);
            return Ok(());
        }

        if let Some(hint) = split_compound_hint(&self.previous.kind, &self.current.kind) {
            syntax_error!(
                ctx,
                self.current_span(),
                "expected '{expected_literal}', found {:?} (did you mean '{hint}'?)",
                self.current.kind
            );
        }

        syntax_error!(
            ctx,
            self.current_span(),
            "expected '{expected_literal}', found {:?}",
            self.current.kind
        );
    }

    pub fn expect_identifier(&mut self, ctx: &mut ParseContext) -> Result<StringId, ParsingError> {
        match self.current.kind.clone() {
            TokenKind::Identifier(id) => {
                self.advance(ctx);
                Ok(id)
            }
            other => {
                syntax_error!(ctx, self.current_span(), "expected an identifier, found {other:?}");
            }
        }
    }

    /// Skips a redundant `;` following a statement/item that already closed
    /// with `}` (§4.10, §7 "Warning"), reporting it unless `Config.disable_warnings`
    /// is set.
    pub fn eat_unnecessary_semicolon_warning(&mut self, ctx: &mut ParseContext) {
        if self.current.kind == TokenKind::Semicolon {
            if !ctx.disable_warnings {
                warn_diagnostic!(ctx, self.current_span(), "unnecessary ';'");
            }
            self.advance(ctx);
        }
    }
}

/// Known two-character operators that the scanner could have split into
/// adjacent single-character tokens because the first token was consumed in
/// a different context (e.g. `>` closing a generic list, then `=` for
/// assignment instead of the intended `>=`).
fn split_compound_hint(previous: &TokenKind, current: &TokenKind) -> Option<&'static str> {
    match (previous, current) {
        (TokenKind::Greater, TokenKind::Greater) => Some(">>"),
        (TokenKind::Greater, TokenKind::Equal) => Some(">="),
        (TokenKind::Less, TokenKind::Equal) => Some("<="),
        (TokenKind::Equal, TokenKind::Equal) => Some("=="),
        (TokenKind::Bang, TokenKind::Equal) => Some("!="),
        _ => None,
    }
}

/// Parses a `{ … }` block: opening brace already consumed by the caller is
/// NOT assumed; this consumes both braces.
pub(crate) fn parse_block(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Block, ParsingError> {
    parser.expect(ctx, TokenKind::LeftBrace, "{")?;
    let mut statements = Vec::new();
    while parser.current().kind != TokenKind::RightBrace && !parser.is_eof() {
        statements.push(statements::parse_statement(ctx, parser)?);
    }
    parser.expect(ctx, TokenKind::RightBrace, "}")?;
    Ok(statements)
}
