//! §4.9.2 — statement parsing and control-flow rules.

use super::expressions::parse_expression;
use super::{parse_block, Parser};
use crate::ast::{ExprKind, ForStmt, Stmt, SwitchArm, SwitchStmt, VarDecl};
use crate::diagnostics::ParsingError;
use crate::parse_context::ParseContext;
use crate::span::Span;
use crate::syntax_error;
use crate::tokens::TokenKind;
use crate::types::OperatorKind;

/// Statements whose grammar already closes with a `}` (`if`/`for`/`while`/
/// `switch`/a bare block, and `@complete switch`) take no terminating `;`;
/// every other form is `;`-terminated and the `;` is mandatory (§4.9.2,
/// §7 "Warning" scopes the unnecessary-`;` warning to a stray `;` *after*
/// one of these closing braces, not to the mandatory terminator below).
pub fn parse_statement(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    match parser.current().kind.clone() {
        TokenKind::If => {
            let stmt = parse_if(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(stmt)
        }
        TokenKind::For => {
            let stmt = parse_for(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(stmt)
        }
        TokenKind::While => {
            let stmt = parse_while(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(stmt)
        }
        TokenKind::Switch => {
            let stmt = parse_switch(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(stmt)
        }
        TokenKind::LeftBrace => {
            let stmt = Stmt::Block(parse_block(ctx, parser)?);
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(stmt)
        }
        TokenKind::At => {
            let stmt = parse_directive_statement(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(stmt)
        }
        TokenKind::Var => {
            let stmt = parse_var_decl(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(stmt)
        }
        TokenKind::Const => {
            let stmt = parse_const_decl(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(stmt)
        }
        TokenKind::Return => {
            let stmt = parse_return(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(stmt)
        }
        TokenKind::Defer => {
            let stmt = parse_defer(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(stmt)
        }
        TokenKind::Break => {
            let stmt = parse_break(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(stmt)
        }
        TokenKind::Continue => {
            let stmt = parse_continue(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(stmt)
        }
        _ => {
            let expr = parse_expression(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(Stmt::Expr(expr))
        }
    }
}

/// `@complete` is the only statement-position directive (§4.9.7); it must
/// immediately precede a `switch`.
fn parse_directive_statement(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let at_span = parser.current_span();
    parser.advance(ctx);
    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;
    if ctx.strings.resolve(name) != "complete" {
        syntax_error!(ctx, name_span, "unknown statement directive '@{}'", ctx.strings.resolve(name));
    }
    if parser.current().kind != TokenKind::Switch {
        syntax_error!(ctx, at_span, "'@complete' must immediately precede a 'switch' statement");
    }
    let mut stmt = parse_switch(ctx, parser)?;
    if let Stmt::Switch(switch) = &mut stmt {
        switch.complete = true;
    }
    Ok(stmt)
}

fn parse_var_decl(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let start = parser.current_span();
    parser.advance(ctx); // 'var'

    // `var (a [:T], b, …) = expr` destructuring form.
    if parser.current().kind == TokenKind::LeftParen {
        parser.advance(ctx);
        let mut names = Vec::new();
        loop {
            let name = parser.expect_identifier(ctx)?;
            let ty = if parser.eat(ctx, &TokenKind::Colon) {
                Some(super::types::parse_type(ctx, parser)?)
            } else {
                None
            };
            names.push((name, ty));
            if !parser.eat(ctx, &TokenKind::Comma) {
                break;
            }
        }
        parser.expect(ctx, TokenKind::RightParen, ")")?;
        parser.expect(ctx, TokenKind::Equal, "=")?;
        let value = parse_expression(ctx, parser)?;
        let span = Span::new(start.file_id, start.line, start.col_start, value.span.col_end);
        return Ok(Stmt::VarDecl(VarDecl::Destructure { names, value, span }));
    }

    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;

    let ty = if parser.eat(ctx, &TokenKind::Colon) {
        Some(super::types::parse_type(ctx, parser)?)
    } else {
        None
    };

    let value = if parser.eat(ctx, &TokenKind::Equal) {
        Some(parse_expression(ctx, parser)?)
    } else {
        None
    };

    if ty.is_none() && value.is_none() {
        syntax_error!(ctx, name_span, "'var {}' needs a type annotation, an initializer, or both", ctx.strings.resolve(name));
    }

    let end = value.as_ref().map(|v| v.span).unwrap_or(name_span);
    let span = Span::new(start.file_id, start.line, start.col_start, end.col_end);
    Ok(Stmt::VarDecl(VarDecl::Single { name, ty, value, span }))
}

fn parse_const_decl(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let start = parser.current_span();
    parser.advance(ctx); // 'const'
    let name = parser.expect_identifier(ctx)?;
    parser.expect(ctx, TokenKind::Equal, "=")?;
    let value = parse_expression(ctx, parser)?;
    let span = Span::new(start.file_id, start.line, start.col_start, value.span.col_end);
    ctx.constants.define(name, value.clone());
    Ok(Stmt::ConstDecl { name, value, span })
}

fn parse_if(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let mut branches = Vec::new();
    let mut else_block = None;

    parser.advance(ctx); // 'if'
    let condition = parse_expression(ctx, parser)?;
    let body = parse_block(ctx, parser)?;
    branches.push((condition, body));

    loop {
        if parser.current().kind != TokenKind::Else {
            break;
        }
        parser.advance(ctx);
        if parser.current().kind == TokenKind::If {
            parser.advance(ctx);
            let condition = parse_expression(ctx, parser)?;
            let body = parse_block(ctx, parser)?;
            branches.push((condition, body));
        } else {
            else_block = Some(parse_block(ctx, parser)?);
            break;
        }
    }

    Ok(Stmt::If { branches, else_block })
}

/// §4.9.2: `for { }` (infinite), `for (expr) { }` (for-each, auto-binds
/// `it`/`it_index`), `for (name[, idx]: expr) { }` (named for-each), and
/// `for (start .. end [: step]) { }` (range). Only for-each may name the
/// index; a named range is a syntax error.
fn parse_for(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    parser.advance(ctx); // 'for'
    ctx.enter_loop();
    let stmt = parse_for_inner(ctx, parser);
    ctx.exit_loop();
    Ok(Stmt::For(stmt?))
}

fn parse_for_inner(ctx: &mut ParseContext, parser: &mut Parser) -> Result<ForStmt, ParsingError> {
    if parser.current().kind == TokenKind::LeftBrace {
        return Ok(ForStmt::Infinite(parse_block(ctx, parser)?));
    }

    parser.expect(ctx, TokenKind::LeftParen, "(")?;

    // Named form: `(name[, idx]: expr)`. Look ahead past a leading
    // identifier for `,` or `:` to tell it apart from a bare expression
    // that merely starts with an identifier.
    if let TokenKind::Identifier(name) = parser.current().kind {
        if matches!(parser.peek_next().kind, TokenKind::Comma | TokenKind::Colon) {
            parser.advance(ctx); // name
            let mut index = None;
            if parser.eat(ctx, &TokenKind::Comma) {
                index = Some(parser.expect_identifier(ctx)?);
            }
            let colon_span = parser.current_span();
            parser.expect(ctx, TokenKind::Colon, ":")?;
            let collection = parse_expression(ctx, parser)?;
            if parser.current().kind == TokenKind::DotDot {
                syntax_error!(ctx, colon_span, "a range 'for' may not name a loop variable");
            }
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            let body = parse_block(ctx, parser)?;
            return Ok(ForStmt::ForEachNamed { name, index, collection, body });
        }
    }

    let first = parse_expression(ctx, parser)?;
    if parser.current().kind == TokenKind::DotDot {
        parser.advance(ctx);
        let end = parse_expression(ctx, parser)?;
        let step = if parser.eat(ctx, &TokenKind::Colon) {
            Some(parse_expression(ctx, parser)?)
        } else {
            None
        };
        parser.expect(ctx, TokenKind::RightParen, ")")?;
        let body = parse_block(ctx, parser)?;
        return Ok(ForStmt::Range { start: first, end, step, body });
    }

    parser.expect(ctx, TokenKind::RightParen, ")")?;
    let body = parse_block(ctx, parser)?;
    // Anonymous for-each auto-binds `it`/`it_index` in `body`'s scope; that
    // binding is a later pass's concern, not the parser's.
    Ok(ForStmt::ForEach { collection: first, body })
}

fn parse_while(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    parser.advance(ctx); // 'while'
    let condition = parse_expression(ctx, parser)?;
    ctx.enter_loop();
    let body = parse_block(ctx, parser);
    ctx.exit_loop();
    Ok(Stmt::While { condition, body: body? })
}

/// `switch (expr[, cmp_op]) { pattern[, pattern...] -> stmt ... else -> stmt }`
/// (§4.9.2).
fn parse_switch(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    parser.advance(ctx); // 'switch'
    parser.expect(ctx, TokenKind::LeftParen, "(")?;
    let scrutinee = parse_expression(ctx, parser)?;

    let mut cmp_op = OperatorKind::Equality;
    if parser.eat(ctx, &TokenKind::Comma) {
        let op_span = parser.current_span();
        cmp_op = match parser.current().kind {
            TokenKind::EqualEqual => OperatorKind::Equality,
            TokenKind::BangEqual => OperatorKind::NotEqual,
            TokenKind::Less => OperatorKind::Less,
            TokenKind::LessEqual => OperatorKind::LessEqual,
            TokenKind::Greater => OperatorKind::Greater,
            TokenKind::GreaterEqual => OperatorKind::GreaterEqual,
            other => syntax_error!(ctx, op_span, "expected a comparison operator, found {other:?}"),
        };
        parser.advance(ctx);
    }
    parser.expect(ctx, TokenKind::RightParen, ")")?;

    parser.expect(ctx, TokenKind::LeftBrace, "{")?;
    let mut arms = Vec::new();
    let mut else_arm = None;

    while parser.current().kind != TokenKind::RightBrace && !parser.is_eof() {
        if parser.current().kind == TokenKind::Else {
            parser.advance(ctx);
            parser.expect(ctx, TokenKind::Arrow, "->")?;
            else_arm = Some(Box::new(parse_statement(ctx, parser)?));
            continue;
        }

        let mut patterns = Vec::new();
        loop {
            patterns.push(parse_expression(ctx, parser)?);
            if !parser.eat(ctx, &TokenKind::Comma) {
                break;
            }
        }
        parser.expect(ctx, TokenKind::Arrow, "->")?;
        let body = Box::new(parse_statement(ctx, parser)?);
        arms.push(SwitchArm { patterns, body });
    }
    parser.expect(ctx, TokenKind::RightBrace, "}")?;

    Ok(Stmt::Switch(SwitchStmt {
        scrutinee,
        cmp_op,
        arms,
        else_arm,
        complete: false,
    }))
}

fn parse_return(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let span = parser.current_span();
    parser.advance(ctx); // 'return'
    let mut values = Vec::new();
    if !matches!(parser.current().kind, TokenKind::Semicolon | TokenKind::RightBrace) {
        loop {
            values.push(parse_expression(ctx, parser)?);
            if !parser.eat(ctx, &TokenKind::Comma) {
                break;
            }
        }
    }
    Ok(Stmt::Return(values, span))
}

/// The deferred operand must be a call expression (§4.9.2 "Control-flow rules").
fn parse_defer(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let span = parser.current_span();
    parser.advance(ctx); // 'defer'
    let expr = parse_expression(ctx, parser)?;
    if !matches!(expr.kind, ExprKind::Call { .. } | ExprKind::GenericCall { .. }) {
        syntax_error!(ctx, expr.span, "'defer' only accepts a call expression");
    }
    Ok(Stmt::Defer(expr, span))
}

fn parse_loop_control_count(ctx: &mut ParseContext, parser: &mut Parser) -> Result<u32, ParsingError> {
    if let TokenKind::IntLiteral(value, _) = parser.current().kind {
        if value < 1 {
            syntax_error!(ctx, parser.current_span(), "a break/continue level must be at least 1");
        }
        parser.advance(ctx);
        return Ok(value as u32);
    }
    if matches!(parser.current().kind, TokenKind::FloatLiteral(_, _)) {
        syntax_error!(ctx, parser.current_span(), "a break/continue level must be an integer literal, found a float literal");
    }
    Ok(1)
}

fn parse_break(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let span = parser.current_span();
    parser.advance(ctx); // 'break'
    let count = parse_loop_control_count(ctx, parser)?;
    if count > ctx.current_loop_depth() {
        syntax_error!(
            ctx,
            span,
            "'break {count}' exceeds the current loop nesting depth ({})",
            ctx.current_loop_depth()
        );
    }
    Ok(Stmt::Break { count, span })
}

fn parse_continue(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Stmt, ParsingError> {
    let span = parser.current_span();
    parser.advance(ctx); // 'continue'
    let count = parse_loop_control_count(ctx, parser)?;
    if count > ctx.current_loop_depth() {
        syntax_error!(
            ctx,
            span,
            "'continue {count}' exceeds the current loop nesting depth ({})",
            ctx.current_loop_depth()
        );
    }
    Ok(Stmt::Continue { count, span })
}
