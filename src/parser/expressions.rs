//! §4.9.3 — expression parsing: the precedence climb from assignment down
//! to primary, plus the "salient rules" (chained comparisons, the `>>`
//! heuristic, generic-call disambiguation, user operators, constant
//! inlining, initializers, trailing lambdas).

use super::{parse_block, Parser};
use crate::ast::{Directive, Expr, ExprKind};
use crate::diagnostics::ParsingError;
use crate::parse_context::ParseContext;
use crate::span::Span;
use crate::syntax_error;
use crate::tokens::TokenKind;
use crate::types::OperatorKind;

fn merge(left: Span, right: Span) -> Span {
    Span::new(left.file_id, left.line, left.col_start, right.col_end)
}

pub fn parse_expression(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    parse_assignment(ctx, parser)
}

fn parse_assignment(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let target = parse_logical_or(ctx, parser)?;

    let compound_op = match parser.current().kind {
        TokenKind::Equal => None,
        TokenKind::PlusEqual => Some(OperatorKind::Add),
        TokenKind::MinusEqual => Some(OperatorKind::Subtract),
        TokenKind::StarEqual => Some(OperatorKind::Multiply),
        TokenKind::SlashEqual => Some(OperatorKind::Divide),
        TokenKind::PercentEqual => Some(OperatorKind::Modulus),
        TokenKind::AmpEqual => Some(OperatorKind::BitAnd),
        TokenKind::PipeEqual => Some(OperatorKind::BitOr),
        TokenKind::CaretEqual => Some(OperatorKind::BitXor),
        TokenKind::ShlEqual => Some(OperatorKind::Shl),
        TokenKind::ShrEqual => Some(OperatorKind::Shr),
        _ => return Ok(target),
    };

    parser.advance(ctx);
    let value = parse_assignment(ctx, parser)?;
    let span = merge(target.span, value.span);

    // `x <op>= y` desugars to `x = x <op> y` (§4.9.3 "Assignment desugaring").
    let value = match compound_op {
        None => value,
        Some(op) => Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(target.clone()),
                right: Box::new(value),
            },
            span,
        ),
    };

    Ok(Expr::new(
        ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        },
        span,
    ))
}

macro_rules! left_assoc_binary {
    ($name:ident, $next:ident, { $($token:pat => $op:expr),+ $(,)? }) => {
        fn $name(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
            let mut left = $next(ctx, parser)?;
            loop {
                let op = match parser.current().kind {
                    $($token => $op,)+
                    _ => break,
                };
                parser.advance(ctx);
                let right = $next(ctx, parser)?;
                let span = merge(left.span, right.span);
                left = Expr::new(
                    ExprKind::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                );
            }
            Ok(left)
        }
    };
}

left_assoc_binary!(parse_logical_or, parse_logical_and, { TokenKind::PipePipe => OperatorKind::Or });
left_assoc_binary!(parse_logical_and, parse_bitand, { TokenKind::AmpAmp => OperatorKind::And });
left_assoc_binary!(parse_bitand, parse_bitxor, { TokenKind::Amp => OperatorKind::BitAnd });
left_assoc_binary!(parse_bitxor, parse_bitor, { TokenKind::Caret => OperatorKind::BitXor });
left_assoc_binary!(parse_bitor, parse_equality, { TokenKind::Pipe => OperatorKind::BitOr });
left_assoc_binary!(parse_equality, parse_comparison, {
    TokenKind::EqualEqual => OperatorKind::Equality,
    TokenKind::BangEqual => OperatorKind::NotEqual,
});

fn comparison_op(kind: &TokenKind) -> Option<OperatorKind> {
    Some(match kind {
        TokenKind::Less => OperatorKind::Less,
        TokenKind::LessEqual => OperatorKind::LessEqual,
        TokenKind::Greater => OperatorKind::Greater,
        TokenKind::GreaterEqual => OperatorKind::GreaterEqual,
        _ => return None,
    })
}

/// §4.9.3 "Chained comparisons": `a < b < c` desugars to `(a<b) && (b<c)`
/// by grafting the previous comparison's right-hand operand as the new
/// comparison's left operand (§8 item 7).
fn parse_comparison(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let first = parse_shift(ctx, parser)?;

    let Some(op) = comparison_op(&parser.current().kind) else {
        return Ok(first);
    };
    parser.advance(ctx);
    let mut right = parse_shift(ctx, parser)?;
    let mut span = merge(first.span, right.span);
    let mut result = Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(first),
            right: Box::new(right.clone()),
        },
        span,
    );

    while let Some(op) = comparison_op(&parser.current().kind) {
        parser.advance(ctx);
        let new_right = parse_shift(ctx, parser)?;
        let compare_span = merge(right.span, new_right.span);
        let new_compare = Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(right),
                right: Box::new(new_right.clone()),
            },
            compare_span,
        );
        span = merge(span, compare_span);
        result = Expr::new(
            ExprKind::Binary {
                op: OperatorKind::And,
                left: Box::new(result),
                right: Box::new(new_compare),
            },
            span,
        );
        right = new_right;
    }

    Ok(result)
}

/// §4.3/§9: the scanner always emits two adjacent `Greater` tokens for a
/// written `>>`; only here, with both tokens' spans in hand, do we decide
/// whether they form a shift (§8 item 3).
fn parse_shift(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let mut left = parse_additive(ctx, parser)?;
    loop {
        if parser.current().kind == TokenKind::Shl {
            parser.advance(ctx);
            let right = parse_additive(ctx, parser)?;
            let span = merge(left.span, right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op: OperatorKind::Shl,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
            continue;
        }

        if parser.current().kind == TokenKind::Greater {
            let first_span = parser.current_span();
            if parser.peek_next().kind == TokenKind::Greater
                && first_span.immediately_followed_by(&parser.peek_next().span)
            {
                parser.advance(ctx); // first '>'
                parser.advance(ctx); // second '>'
                let right = parse_additive(ctx, parser)?;
                let span = merge(left.span, right.span);
                left = Expr::new(
                    ExprKind::Binary {
                        op: OperatorKind::Shr,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                );
                continue;
            }
        }

        break;
    }
    Ok(left)
}

left_assoc_binary!(parse_additive, parse_multiplicative, {
    TokenKind::Plus => OperatorKind::Add,
    TokenKind::Minus => OperatorKind::Subtract,
});
left_assoc_binary!(parse_multiplicative, parse_enum_access, {
    TokenKind::Star => OperatorKind::Multiply,
    TokenKind::Slash => OperatorKind::Divide,
    TokenKind::Percent => OperatorKind::Modulus,
});

/// `Color::Red` (§ GLOSSARY "enum-access").
fn parse_enum_access(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let base = parse_infix_user_call(ctx, parser)?;
    if parser.current().kind != TokenKind::DoubleColon {
        return Ok(base);
    }

    let ExprKind::Identifier(enum_name) = base.kind else {
        syntax_error!(ctx, base.span, "'::' may only follow an enum type name");
    };

    parser.advance(ctx);
    let element_span = parser.current_span();
    let element = parser.expect_identifier(ctx)?;
    let span = merge(base.span, element_span);
    Ok(Expr::new(
        ExprKind::EnumAccess {
            enum_name,
            element,
        },
        span,
    ))
}

/// §4.9.3 "User operators": an identifier registered `Infix` is recognized
/// as a binary call once a left operand has been parsed (§8 item 6, S6).
fn parse_infix_user_call(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let mut left = parse_prefix_user_call_and_unary(ctx, parser)?;
    loop {
        let TokenKind::Identifier(name) = parser.current().kind else {
            break;
        };
        if ctx.functions.get(&name) != Some(&crate::ast::FunctionKind::Infix) {
            break;
        }

        let callee_span = parser.current_span();
        parser.advance(ctx);
        let right = parse_prefix_user_call_and_unary(ctx, parser)?;
        let span = merge(left.span, right.span);
        let callee = Expr::new(ExprKind::Identifier(name), callee_span);
        left = Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args: vec![left, right],
            },
            span,
        );
    }
    Ok(left)
}

/// Unary prefix operators, and user-defined `Prefix` identifiers.
fn parse_prefix_user_call_and_unary(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let op = match parser.current().kind {
        TokenKind::Minus => Some(OperatorKind::Negate),
        TokenKind::Bang => Some(OperatorKind::Not),
        TokenKind::Tilde => Some(OperatorKind::BitNot),
        TokenKind::Star => Some(OperatorKind::Multiply), // deref
        TokenKind::Amp => Some(OperatorKind::BitAnd),     // address-of
        TokenKind::PlusPlus => Some(OperatorKind::Increment),
        TokenKind::MinusMinus => Some(OperatorKind::Decrement),
        _ => None,
    };

    if let Some(op) = op {
        let op_span = parser.current_span();
        parser.advance(ctx);
        let operand = parse_prefix_user_call_and_unary(ctx, parser)?;
        let span = merge(op_span, operand.span);
        return Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ));
    }

    if let TokenKind::Identifier(name) = parser.current().kind {
        if ctx.functions.get(&name) == Some(&crate::ast::FunctionKind::Prefix) {
            let callee_span = parser.current_span();
            parser.advance(ctx);
            let operand = parse_prefix_user_call_and_unary(ctx, parser)?;
            let span = merge(callee_span, operand.span);
            let callee = Expr::new(ExprKind::Identifier(name), callee_span);
            return Ok(Expr::new(
                ExprKind::Call {
                    callee: Box::new(callee),
                    args: vec![operand],
                },
                span,
            ));
        }
    }

    parse_postfix_chain(ctx, parser)
}

/// `call/index/member/generic-call`, `.count`, postfix `++`/`--`, and
/// user-defined `Postfix` identifiers, all folded into one left-to-right
/// chain over a primary operand.
fn parse_postfix_chain(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let mut expr = parse_primary(ctx, parser)?;

    loop {
        match parser.current().kind.clone() {
            TokenKind::Dot => {
                parser.advance(ctx);
                let field_span = parser.current_span();
                let field = parser.expect_identifier(ctx)?;
                let span = merge(expr.span, field_span);
                expr = if ctx.strings.resolve(field) == "count" {
                    Expr::new(
                        ExprKind::EnumAttribute {
                            base: Box::new(expr),
                            attribute: field,
                        },
                        span,
                    )
                } else {
                    Expr::new(
                        ExprKind::Member {
                            base: Box::new(expr),
                            field,
                        },
                        span,
                    )
                };
            }

            TokenKind::LeftBracket => {
                parser.advance(ctx);
                let index = parse_expression(ctx, parser)?;
                let close_span = parser.current_span();
                parser.expect(ctx, TokenKind::RightBracket, "]")?;
                let span = merge(expr.span, close_span);
                expr = Expr::new(
                    ExprKind::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            }

            TokenKind::LeftParen => {
                let (args, span) = parse_call_args(ctx, parser, expr.span)?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            }

            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if parser.current().kind == TokenKind::PlusPlus {
                    OperatorKind::Increment
                } else {
                    OperatorKind::Decrement
                };
                let op_span = parser.current_span();
                parser.advance(ctx);
                let span = merge(expr.span, op_span);
                expr = Expr::new(
                    ExprKind::Postfix {
                        op,
                        operand: Box::new(expr),
                    },
                    span,
                );
            }

            TokenKind::Identifier(name) if ctx.functions.get(&name) == Some(&crate::ast::FunctionKind::Postfix) => {
                let op_span = parser.current_span();
                parser.advance(ctx);
                let span = merge(expr.span, op_span);
                let callee = Expr::new(ExprKind::Identifier(name), op_span);
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(callee),
                        args: vec![expr],
                    },
                    span,
                );
            }

            _ => break,
        }
    }

    Ok(expr)
}

fn parse_call_args(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    callee_span: Span,
) -> Result<(Vec<Expr>, Span), ParsingError> {
    parser.advance(ctx); // '('
    let mut args = Vec::new();
    while parser.current().kind != TokenKind::RightParen {
        args.push(parse_expression(ctx, parser)?);
        if !parser.eat(ctx, &TokenKind::Comma) {
            break;
        }
    }
    let close_span = parser.current_span();
    parser.expect(ctx, TokenKind::RightParen, ")")?;

    // `f(…)` followed directly by `{` appends a trailing lambda argument
    // (§4.9.3 "Trailing-lambda call").
    let mut span = merge(callee_span, close_span);
    if parser.current().kind == TokenKind::LeftBrace {
        let lambda = parse_bare_lambda(ctx, parser)?;
        span = merge(span, lambda.span);
        args.push(lambda);
    }

    Ok((args, span))
}

fn parse_bare_lambda(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let start = parser.current_span();
    let body = parse_block(ctx, parser)?;
    let span = merge(start, parser.previous().span);
    Ok(Expr::new(
        ExprKind::Lambda {
            params: Vec::new(),
            body: Box::new(body),
        },
        span,
    ))
}

fn parse_primary(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let span = parser.current_span();

    match parser.current().kind.clone() {
        TokenKind::IntLiteral(value, _) => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::IntLiteral(value), span))
        }
        TokenKind::FloatLiteral(value, _) => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::FloatLiteral(value), span))
        }
        TokenKind::StringLiteral(id) => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::StringLiteral(id), span))
        }
        TokenKind::CharLiteral(value) => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::CharLiteral(value), span))
        }
        TokenKind::True => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::BoolLiteral(true), span))
        }
        TokenKind::False => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::BoolLiteral(false), span))
        }
        TokenKind::Null => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::Null, span))
        }
        TokenKind::Undefined => {
            parser.advance(ctx);
            Ok(Expr::new(ExprKind::Undefined, span))
        }

        TokenKind::LeftParen => {
            parser.advance(ctx);
            let inner = parse_expression(ctx, parser)?;
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Ok(inner)
        }

        TokenKind::LeftBrace => parse_bare_lambda(ctx, parser),

        TokenKind::Cast => {
            parser.advance(ctx);
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let target_type = super::types::parse_type(ctx, parser)?;
            parser.expect(ctx, TokenKind::Comma, ",")?;
            let operand = parse_expression(ctx, parser)?;
            let close_span = parser.current_span();
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Ok(Expr::new(
                ExprKind::Cast {
                    target_type,
                    operand: Box::new(operand),
                },
                merge(span, close_span),
            ))
        }

        TokenKind::TypeSize => {
            parser.advance(ctx);
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let ty = super::types::parse_type(ctx, parser)?;
            let close_span = parser.current_span();
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Ok(Expr::new(ExprKind::TypeSize(ty), merge(span, close_span)))
        }

        TokenKind::TypeAlign => {
            parser.advance(ctx);
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let ty = super::types::parse_type(ctx, parser)?;
            let close_span = parser.current_span();
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Ok(Expr::new(ExprKind::TypeAlign(ty), merge(span, close_span)))
        }

        TokenKind::ValueSize => {
            parser.advance(ctx);
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let operand = parse_expression(ctx, parser)?;
            let close_span = parser.current_span();
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Ok(Expr::new(
                ExprKind::ValueSize(Box::new(operand)),
                merge(span, close_span),
            ))
        }

        TokenKind::At => parse_expression_directive(ctx, parser),

        TokenKind::Identifier(name) => parse_identifier_primary(ctx, parser, name, span),

        other => {
            syntax_error!(ctx, span, "unexpected token in expression: {other:?}");
        }
    }
}

fn parse_expression_directive(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Expr, ParsingError> {
    let at_span = parser.current_span();
    parser.advance(ctx);
    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;
    let text = ctx.strings.resolve(name).to_string();

    let directive = match text.as_str() {
        "line" => Directive::Line,
        "column" => Directive::Column,
        "filepath" => Directive::FilePath,
        "infinity" => Directive::Infinity,
        "infinity32" => Directive::Infinity32,
        "infinity64" => Directive::Infinity64,
        "max_value" => {
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let ty = super::types::parse_type(ctx, parser)?;
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Directive::MaxValue(ty)
        }
        "min_value" => {
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let ty = super::types::parse_type(ctx, parser)?;
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            Directive::MinValue(ty)
        }
        _ => {
            syntax_error!(ctx, name_span, "unknown directive '@{text}' in expression position");
        }
    };

    Ok(Expr::new(ExprKind::Directive(directive), merge(at_span, parser.previous().span)))
}

fn parse_identifier_primary(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    name: crate::string_interning::StringId,
    span: Span,
) -> Result<Expr, ParsingError> {
    parser.advance(ctx);

    let is_struct = ctx.structs.contains_key(&name);
    let is_registered_function = ctx.functions.contains_key(&name);

    // §4.9.3 "Initializers": a struct name followed by '(', '{' or '<'.
    if is_struct
        && matches!(
            parser.current().kind,
            TokenKind::LeftParen | TokenKind::LeftBrace | TokenKind::Less
        )
    {
        return parse_initializer(ctx, parser, name, span);
    }

    // §4.9.3 "Generic call disambiguation": '<' after a registered function
    // starts a generic-argument list; otherwise it is left for the
    // comparison level to consume as `<` (§8 item 4).
    if is_registered_function && parser.current().kind == TokenKind::Less {
        return parse_generic_call(ctx, parser, name, span);
    }

    // §4.9.3 "Trailing-lambda call": `f { … }` where `f` is a registered
    // function.
    if is_registered_function && parser.current().kind == TokenKind::LeftBrace {
        let lambda = parse_bare_lambda(ctx, parser)?;
        let call_span = merge(span, lambda.span);
        let callee = Expr::new(ExprKind::Identifier(name), span);
        return Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args: vec![lambda],
            },
            call_span,
        ));
    }

    // §4.9.3 "Compile-time constants": replaced in place by the stored
    // expression (§8 item 9); constants are not visible as plain identifiers
    // once defined, so this check takes priority over a bare reference.
    if let Some(value) = ctx.constants.lookup(name) {
        let mut inlined = value.clone();
        inlined.span = span;
        return Ok(inlined);
    }

    Ok(Expr::new(ExprKind::Identifier(name), span))
}

fn parse_generic_call(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    name: crate::string_interning::StringId,
    name_span: Span,
) -> Result<Expr, ParsingError> {
    parser.advance(ctx); // '<'
    let mut type_args = Vec::new();
    while parser.current().kind != TokenKind::Greater {
        type_args.push(super::types::parse_type(ctx, parser)?);
        if !parser.eat(ctx, &TokenKind::Comma) {
            break;
        }
    }
    parser.expect(ctx, TokenKind::Greater, ">")?;

    if parser.current().kind != TokenKind::LeftParen {
        syntax_error!(
            ctx,
            parser.current_span(),
            "expected '(' to begin the argument list of a generic call, found {:?}",
            parser.current().kind
        );
    }

    let (args, close_span) = parse_call_args(ctx, parser, name_span)?;
    let callee = Expr::new(ExprKind::Identifier(name), name_span);
    Ok(Expr::new(
        ExprKind::GenericCall {
            callee: Box::new(callee),
            type_args,
            args,
        },
        close_span,
    ))
}

fn parse_initializer(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    name: crate::string_interning::StringId,
    name_span: Span,
) -> Result<Expr, ParsingError> {
    let mut type_args = Vec::new();
    if parser.current().kind == TokenKind::Less {
        parser.advance(ctx);
        while parser.current().kind != TokenKind::Greater {
            type_args.push(super::types::parse_type(ctx, parser)?);
            if !parser.eat(ctx, &TokenKind::Comma) {
                break;
            }
        }
        parser.expect(ctx, TokenKind::Greater, ">")?;
    }

    let mut args = Vec::new();
    let mut end_span = name_span;
    if parser.current().kind == TokenKind::LeftParen {
        parser.advance(ctx);
        while parser.current().kind != TokenKind::RightParen {
            args.push(parse_expression(ctx, parser)?);
            if !parser.eat(ctx, &TokenKind::Comma) {
                break;
            }
        }
        end_span = parser.current_span();
        parser.expect(ctx, TokenKind::RightParen, ")")?;
    }

    let mut trailing_lambda = None;
    if parser.current().kind == TokenKind::LeftBrace {
        let lambda_block = parse_block(ctx, parser)?;
        end_span = parser.previous().span;
        trailing_lambda = Some(Box::new(lambda_block));
    }

    Ok(Expr::new(
        ExprKind::Initializer {
            type_name: name,
            type_args,
            args,
            trailing_lambda,
        },
        merge(name_span, end_span),
    ))
}
