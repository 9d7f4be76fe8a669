//! §4.9.4 — type parsing.

use super::Parser;
use crate::diagnostics::ParsingError;
use crate::parse_context::ParseContext;
use crate::syntax_error;
use crate::tokens::TokenKind;
use crate::types::{FunctionType, StructType, Type};

pub fn parse_type(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Type, ParsingError> {
    match parser.current().kind.clone() {
        TokenKind::Star => {
            parser.advance(ctx);
            let inner = parse_type(ctx, parser)?;
            Ok(Type::Pointer(Box::new(inner)))
        }

        TokenKind::Fun => {
            parser.advance(ctx);
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let mut params = Vec::new();
            while parser.current().kind != TokenKind::RightParen {
                params.push(parse_type(ctx, parser)?);
                if !parser.eat(ctx, &TokenKind::Comma) {
                    break;
                }
            }
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            let return_type = parse_type(ctx, parser)?;
            Ok(Type::Function(FunctionType {
                params,
                return_type: Box::new(return_type),
                has_varargs: false,
                varargs_elem: None,
                is_generic: false,
                generic_params: Vec::new(),
            }))
        }

        TokenKind::LeftParen => {
            parser.advance(ctx);
            let mut fields = Vec::new();
            while parser.current().kind != TokenKind::RightParen {
                fields.push(parse_type(ctx, parser)?);
                if !parser.eat(ctx, &TokenKind::Comma) {
                    break;
                }
            }
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            if fields.len() < 2 {
                syntax_error!(ctx, parser.current_span(), "a tuple type needs at least 2 fields");
            }
            let name = ctx.strings.intern(&crate::types::mangle_tuple(&fields, &ctx.strings));
            Ok(Type::Tuple(name, fields))
        }

        TokenKind::LeftBracket => parse_array_type(ctx, parser, false),

        TokenKind::At => {
            // `@vec [N]T` — the only type-position directive (§4.9.7).
            let directive_span = parser.current_span();
            parser.advance(ctx);
            let name = parser.expect_identifier(ctx)?;
            if ctx.strings.resolve(name) != "vec" {
                syntax_error!(ctx, directive_span, "unknown type directive '@{}'", ctx.strings.resolve(name));
            }
            parse_array_type(ctx, parser, true)
        }

        TokenKind::Identifier(name) => {
            parser.advance(ctx);
            resolve_identifier_type(ctx, parser, name)
        }

        other => {
            syntax_error!(ctx, parser.current_span(), "expected a type, found {other:?}");
        }
    }
}

fn parse_array_type(ctx: &mut ParseContext, parser: &mut Parser, is_vector: bool) -> Result<Type, ParsingError> {
    parser.expect(ctx, TokenKind::LeftBracket, "[")?;
    let size_span = parser.current_span();
    let size = match parser.current().kind.clone() {
        TokenKind::IntLiteral(value, _) if value >= 0 => {
            parser.advance(ctx);
            value as u32
        }
        _ => {
            syntax_error!(ctx, size_span, "array size must be a non-negative integer literal");
        }
    };
    parser.expect(ctx, TokenKind::RightBracket, "]")?;
    let element_span = parser.current_span();
    let element = parse_type(ctx, parser)?;
    if element.is_void_type() {
        syntax_error!(ctx, element_span, "an array element type cannot be 'void'");
    }

    if is_vector {
        Ok(Type::StaticVector(Box::new(element), size))
    } else {
        Ok(Type::StaticArray(Box::new(element), size))
    }
}

fn resolve_identifier_type(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    name: crate::string_interning::StringId,
) -> Result<Type, ParsingError> {
    let name_span = parser.previous().span;

    // A struct identifier followed by `<…>` is a generic instantiation.
    if parser.current().kind == TokenKind::Less {
        if let Some(struct_type) = ctx.structs.get(&name).cloned() {
            return parse_generic_struct_args(ctx, parser, struct_type, name_span);
        }
    }

    if let Some(struct_type) = ctx.structs.get(&name).cloned() {
        if struct_type.is_generic {
            syntax_error!(
                ctx,
                name_span,
                "generic struct '{}' must be used with type arguments",
                ctx.strings.resolve(name)
            );
        }
        return Ok(Type::Struct(struct_type));
    }

    if let Some(enum_type) = ctx.enums.get(&name).cloned() {
        return Ok(Type::Enum(enum_type));
    }

    if ctx.generic_parameter_names.contains(&name) {
        return Ok(Type::GenericParameter(name));
    }

    if Some(name) == ctx.current_struct_name {
        ctx.current_struct_unknown_fields += 1;
        return Ok(Type::None);
    }

    if ctx.aliases.contains(name) {
        return Ok(ctx.aliases.resolve(name).clone());
    }

    syntax_error!(
        ctx,
        name_span,
        "unknown type '{}': not an alias, struct, enum, or generic parameter",
        ctx.strings.resolve(name)
    );
}

fn parse_generic_struct_args(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    base: StructType,
    name_span: crate::span::Span,
) -> Result<Type, ParsingError> {
    if !base.is_generic {
        syntax_error!(
            ctx,
            name_span,
            "'{}' is not a generic struct; it cannot take type arguments",
            ctx.strings.resolve(base.name)
        );
    }

    parser.advance(ctx); // consume '<'
    let mut args = Vec::new();
    while parser.current().kind != TokenKind::Greater {
        args.push(parse_type(ctx, parser)?);
        if !parser.eat(ctx, &TokenKind::Comma) {
            break;
        }
    }
    parser.expect(ctx, TokenKind::Greater, ">")?;

    if args.len() != base.generic_params.len() {
        syntax_error!(
            ctx,
            name_span,
            "'{}' expects {} type argument(s), found {}",
            ctx.strings.resolve(base.name),
            base.generic_params.len(),
            args.len()
        );
    }

    Ok(Type::GenericStruct(base, args))
}
