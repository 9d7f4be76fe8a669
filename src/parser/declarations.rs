//! §4.9.1 — top-level productions, and the entry point `parse_compilation_unit`.

use super::expressions::parse_expression;
use super::{parse_block, Parser};
use crate::ast::{CompilationUnit, FunctionDecl, FunctionKind, Item, VarDecl};
use crate::diagnostics::ParsingError;
use crate::parse_context::ParseContext;
use crate::span::Span;
use crate::string_interning::StringId;
use crate::syntax_error;
use crate::tokens::TokenKind;
use crate::types::{EnumType, OperatorKind, StructType, Type};

/// Loops until EOF, dispatching at top level (§4.9 "Framing").
pub fn parse_compilation_unit(ctx: &mut ParseContext, parser: &mut Parser) -> Result<CompilationUnit, ParsingError> {
    let mut unit = CompilationUnit::default();
    while !parser.is_eof() {
        match parse_item(ctx, parser) {
            Ok(item) => unit.tree_nodes.push(item),
            Err(ParsingError) => synchronize(ctx, parser),
        }
    }
    Ok(unit)
}

/// Skips tokens up to the next item-starting keyword so one malformed
/// top-level declaration does not abort the whole file's diagnostics.
fn synchronize(ctx: &mut ParseContext, parser: &mut Parser) {
    while !parser.is_eof() {
        if matches!(
            parser.current().kind,
            TokenKind::Import
                | TokenKind::Load
                | TokenKind::Type
                | TokenKind::Fun
                | TokenKind::Operator
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Struct
                | TokenKind::Enum
        ) {
            return;
        }
        parser.advance(ctx);
    }
}

/// Items whose grammar closes with a `}` (`struct`/`enum`), or that consume
/// their own terminating `;` internally (`fun`/`operator`, both block- and
/// `= expr ;`-bodied, and the `@extern`/`@intrinsic`/`@prefix`/`@infix`/
/// `@postfix` directive forms that dispatch to them), only get the
/// stray-semicolon warning check; `import`/`load`/`type`/`var`/`const` have
/// no closing brace of their own, so their `;` is mandatory (§4.9.1, §7
/// "Warning" scopes the unnecessary-`;` warning to a stray `;` after a
/// closing brace, not to these mandatory terminators).
fn parse_item(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    match parser.current().kind.clone() {
        TokenKind::Import => {
            let item = parse_import_or_load(ctx, parser, true)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(item)
        }
        TokenKind::Load => {
            let item = parse_import_or_load(ctx, parser, false)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(item)
        }
        TokenKind::Type => {
            let item = parse_type_alias(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(item)
        }
        TokenKind::Var => {
            let item = parse_top_level_var(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(item)
        }
        TokenKind::Const => {
            let item = parse_top_level_const(ctx, parser)?;
            parser.expect(ctx, TokenKind::Semicolon, ";")?;
            Ok(item)
        }
        TokenKind::Fun => {
            let item = parse_function(ctx, parser, false, None, FunctionKind::Normal)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(item)
        }
        TokenKind::Operator => {
            let item = parse_operator_function(ctx, parser, None)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(item)
        }
        TokenKind::Struct => {
            let item = parse_struct(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(item)
        }
        TokenKind::Enum => {
            let item = parse_enum(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(item)
        }
        TokenKind::At => {
            let item = parse_directive_item(ctx, parser)?;
            parser.eat_unnecessary_semicolon_warning(ctx);
            Ok(item)
        }
        other => {
            syntax_error!(ctx, parser.current_span(), "expected a top-level declaration, found {other:?}");
        }
    }
}

/// `@extern fun ...` and `@intrinsic("name") fun ...` (§4.9.7, declaration
/// context), and the `@prefix`/`@infix`/`@postfix` kind-directive, which
/// precedes either:
/// - `operator <symbol> (...)`, overloading a literal operator token under
///   its mangled name (§4.9.6); or
/// - `fun <name>(...)`, an ordinary named function that the expression
///   parser additionally treats as a word-operator (§8 scenario S6: `1 plus
///   2` calls `plus` because it was declared `@infix fun plus(...)`).
fn parse_directive_item(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    parser.advance(ctx); // '@'
    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;
    match ctx.strings.resolve(name) {
        "extern" => {
            parser.expect(ctx, TokenKind::Fun, "fun")?;
            parse_function(ctx, parser, true, None, FunctionKind::Normal)
        }
        "intrinsic" => {
            parser.expect(ctx, TokenKind::LeftParen, "(")?;
            let intrinsic_name = expect_string_literal(ctx, parser)?;
            parser.expect(ctx, TokenKind::RightParen, ")")?;
            parser.expect(ctx, TokenKind::Fun, "fun")?;
            parse_function(ctx, parser, false, Some(intrinsic_name), FunctionKind::Normal)
        }
        "prefix" => parse_kind_directed_declaration(ctx, parser, FunctionKind::Prefix),
        "infix" => parse_kind_directed_declaration(ctx, parser, FunctionKind::Infix),
        "postfix" => parse_kind_directed_declaration(ctx, parser, FunctionKind::Postfix),
        other => syntax_error!(ctx, name_span, "unknown declaration directive '@{other}'"),
    }
}

fn parse_kind_directed_declaration(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    kind: FunctionKind,
) -> Result<Item, ParsingError> {
    match parser.current().kind {
        TokenKind::Operator => parse_operator_function(ctx, parser, Some(kind)),
        TokenKind::Fun => parse_function(ctx, parser, false, None, kind),
        other => syntax_error!(
            ctx,
            parser.current_span(),
            "expected 'operator' or 'fun' after a @prefix/@infix/@postfix directive, found {other:?}"
        ),
    }
}

fn expect_string_literal(ctx: &mut ParseContext, parser: &mut Parser) -> Result<StringId, ParsingError> {
    let span = parser.current_span();
    match parser.current().kind.clone() {
        TokenKind::StringLiteral(id) => {
            parser.advance(ctx);
            Ok(id)
        }
        other => syntax_error!(ctx, span, "expected a string literal, found {other:?}"),
    }
}

/// `import "name"` / `load "name"`, or a braced list `{ "a" "b" ... }` of
/// independent module names (§4.9.1).
fn parse_import_or_load(ctx: &mut ParseContext, parser: &mut Parser, is_import: bool) -> Result<Item, ParsingError> {
    let span = parser.current_span();
    parser.advance(ctx); // 'import' | 'load'

    let mut names = Vec::new();
    if parser.eat(ctx, &TokenKind::LeftBrace) {
        while parser.current().kind != TokenKind::RightBrace && !parser.is_eof() {
            names.push(expect_string_literal(ctx, parser)?);
        }
        parser.expect(ctx, TokenKind::RightBrace, "}")?;
    } else {
        names.push(expect_string_literal(ctx, parser)?);
    }

    Ok(if is_import {
        Item::Import(names, span)
    } else {
        Item::Load(names, span)
    })
}

fn parse_type_alias(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    let span = parser.current_span();
    parser.advance(ctx); // 'type'
    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;
    if !ctx.name_is_available_for_declaration(name) {
        syntax_error!(ctx, name_span, "'{}' is already declared", ctx.strings.resolve(name));
    }
    parser.expect(ctx, TokenKind::Equal, "=")?;
    let ty = super::types::parse_type(ctx, parser)?;
    ctx.aliases.define(name, ty.clone());
    Ok(Item::TypeAlias { name, ty, span })
}

fn parse_params(ctx: &mut ParseContext, parser: &mut Parser) -> Result<(Vec<crate::ast::Param>, bool, Option<Type>), ParsingError> {
    parser.expect(ctx, TokenKind::LeftParen, "(")?;
    let mut params = Vec::new();
    let mut has_varargs = false;
    let mut varargs_elem = None;

    while parser.current().kind != TokenKind::RightParen {
        if parser.current().kind == TokenKind::Varargs {
            parser.advance(ctx);
            has_varargs = true;
            if parser.current().kind != TokenKind::RightParen {
                varargs_elem = Some(super::types::parse_type(ctx, parser)?);
            }
            break;
        }

        let param_span = parser.current_span();
        let name = parser.expect_identifier(ctx)?;
        let ty = super::types::parse_type(ctx, parser)?;
        params.push(crate::ast::Param { name, ty, span: param_span });

        if !parser.eat(ctx, &TokenKind::Comma) {
            break;
        }
    }
    parser.expect(ctx, TokenKind::RightParen, ")")?;
    Ok((params, has_varargs, varargs_elem))
}

fn parse_function(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    is_extern: bool,
    intrinsic: Option<StringId>,
    kind: FunctionKind,
) -> Result<Item, ParsingError> {
    let start = parser.current_span();
    parser.advance(ctx); // 'fun'

    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;

    let generic_params = parse_optional_generic_params(ctx, parser)?;
    ctx.generic_parameter_names = generic_params.clone();

    let (params, has_varargs, varargs_elem) = parse_params(ctx, parser)?;
    let return_type = if matches!(
        parser.current().kind,
        TokenKind::LeftBrace | TokenKind::Semicolon | TokenKind::Equal
    ) {
        Type::Void
    } else {
        super::types::parse_type(ctx, parser)?
    };

    let body = if is_extern || intrinsic.is_some() {
        // A bare prototype has no block and no `= expr` body, so the `;`
        // that ends the declaration is never consumed by anything else.
        parser.expect(ctx, TokenKind::Semicolon, ";")?;
        None
    } else {
        ctx.enter_function_scope();
        let block = parse_function_body(ctx, parser);
        ctx.exit_function_scope();
        Some(block?)
    };

    ctx.generic_parameter_names.clear();

    let decl = FunctionDecl {
        name,
        params,
        return_type,
        has_varargs,
        varargs_elem,
        generic_params,
        kind,
        operator: None,
        is_extern,
        intrinsic,
        body,
        name_span,
    };
    ctx.functions.insert(name, kind);
    let _ = start;
    Ok(Item::Function(decl))
}

/// A function/operator body is either a block `{ ... }` or a single
/// expression `= expr ;`, desugared to a block containing one `return` (§8
/// scenarios S1/S6 both occur in the corpus).
fn parse_function_body(ctx: &mut ParseContext, parser: &mut Parser) -> Result<crate::ast::Block, ParsingError> {
    if parser.eat(ctx, &TokenKind::Equal) {
        let span = parser.current_span();
        let value = parse_expression(ctx, parser)?;
        parser.expect(ctx, TokenKind::Semicolon, ";")?;
        return Ok(vec![crate::ast::Stmt::Return(vec![value], span)]);
    }
    parse_block(ctx, parser)
}

fn parse_optional_generic_params(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Vec<StringId>, ParsingError> {
    if parser.current().kind != TokenKind::Less {
        return Ok(Vec::new());
    }
    parser.advance(ctx);
    let mut names = Vec::new();
    loop {
        names.push(parser.expect_identifier(ctx)?);
        if !parser.eat(ctx, &TokenKind::Comma) {
            break;
        }
    }
    parser.expect(ctx, TokenKind::Greater, ">")?;
    Ok(names)
}

/// `[@prefix|@infix|@postfix] operator <symbol> (params) [return] { body }`
/// (§4.9.1, §4.9.6). There is no user-chosen function name: the declaration
/// is recorded under its mangled name (§4.4) so callers see it as a normal
/// identifier. When no kind directive precedes `operator`, the kind is
/// inferred from arity (2 params -> infix, else the op's own overloadable
/// unary kind).
fn parse_operator_function(
    ctx: &mut ParseContext,
    parser: &mut Parser,
    forced_kind: Option<FunctionKind>,
) -> Result<Item, ParsingError> {
    parser.advance(ctx); // 'operator'
    let op_span = parser.current_span();
    let op = parse_operator_symbol(ctx, parser)?;

    let (params, has_varargs, varargs_elem) = parse_params(ctx, parser)?;

    let kind = match forced_kind {
        Some(kind) => kind,
        None if params.len() == 2 => FunctionKind::Infix,
        None if op.is_prefix_overloadable() => FunctionKind::Prefix,
        None => FunctionKind::Postfix,
    };

    let arity_ok = match kind {
        FunctionKind::Prefix => op.is_prefix_overloadable(),
        FunctionKind::Infix => op.is_infix_overloadable(),
        FunctionKind::Postfix => op.is_postfix_overloadable(),
        FunctionKind::Normal => false,
    };
    if !arity_ok {
        syntax_error!(ctx, op_span, "operator '{}' cannot be declared @{:?}", op.symbol(), kind);
    }

    let expected_arity = if kind == FunctionKind::Infix { 2 } else { 1 };
    if params.len() != expected_arity {
        syntax_error!(
            ctx,
            op_span,
            "a @{:?} '{}' operator function needs exactly {} parameter(s), found {}",
            kind,
            op.symbol(),
            expected_arity,
            params.len()
        );
    }

    let return_type = if matches!(parser.current().kind, TokenKind::LeftBrace | TokenKind::Equal) {
        Type::Void
    } else {
        super::types::parse_type(ctx, parser)?
    };

    ctx.enter_function_scope();
    let body = parse_function_body(ctx, parser);
    ctx.exit_function_scope();

    let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
    let mangled = crate::types::mangle_operator_function(op, &param_types, &ctx.strings);
    let name = ctx.strings.intern(&mangled);

    let decl = FunctionDecl {
        name,
        params,
        return_type,
        has_varargs,
        varargs_elem,
        generic_params: Vec::new(),
        kind,
        operator: Some(op),
        is_extern: false,
        intrinsic: None,
        body: Some(body?),
        name_span: op_span,
    };
    ctx.functions.insert(name, kind);
    Ok(Item::Function(decl))
}

fn parse_operator_symbol(ctx: &mut ParseContext, parser: &mut Parser) -> Result<OperatorKind, ParsingError> {
    let span = parser.current_span();
    let op = match parser.current().kind.clone() {
        TokenKind::Plus => OperatorKind::Add,
        TokenKind::Minus => OperatorKind::Subtract,
        TokenKind::Star => OperatorKind::Multiply,
        TokenKind::Slash => OperatorKind::Divide,
        TokenKind::Percent => OperatorKind::Modulus,
        TokenKind::Amp => OperatorKind::BitAnd,
        TokenKind::Pipe => OperatorKind::BitOr,
        TokenKind::Caret => OperatorKind::BitXor,
        TokenKind::Shl => OperatorKind::Shl,
        TokenKind::EqualEqual => OperatorKind::Equality,
        TokenKind::BangEqual => OperatorKind::NotEqual,
        TokenKind::Less => OperatorKind::Less,
        TokenKind::LessEqual => OperatorKind::LessEqual,
        TokenKind::GreaterEqual => OperatorKind::GreaterEqual,
        TokenKind::AmpAmp => OperatorKind::And,
        TokenKind::PipePipe => OperatorKind::Or,
        TokenKind::Bang => OperatorKind::Not,
        TokenKind::Tilde => OperatorKind::BitNot,
        TokenKind::PlusPlus => OperatorKind::Increment,
        TokenKind::MinusMinus => OperatorKind::Decrement,
        TokenKind::Greater => {
            // `>>` is two adjacent `Greater` tokens even in an operator
            // declaration header (§4.3, §9).
            if parser.peek_next().kind == TokenKind::Greater
                && parser.current_span().immediately_followed_by(&parser.peek_next().span)
            {
                parser.advance(ctx);
                OperatorKind::Shr
            } else {
                OperatorKind::Greater
            }
        }
        other => syntax_error!(ctx, span, "expected an operator symbol, found {other:?}"),
    };
    parser.advance(ctx);
    Ok(op)
}

fn parse_top_level_var(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    let start = parser.current_span();
    parser.advance(ctx); // 'var'
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
    Ok(Item::VarDecl(VarDecl::Single { name, ty, value, span }))
}

fn parse_top_level_const(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    let start = parser.current_span();
    parser.advance(ctx); // 'const'
    let name = parser.expect_identifier(ctx)?;
    parser.expect(ctx, TokenKind::Equal, "=")?;
    let value = parse_expression(ctx, parser)?;
    let span = Span::new(start.file_id, start.line, start.col_start, value.span.col_end);
    ctx.constants.define(name, value.clone());
    Ok(Item::ConstDecl { name, value, span })
}

/// `struct Name[<T, ...>] [@packed] [@extern] { field Type; ... }` (§4.9.1,
/// §4.9.5, §8 scenario S3 — no `:` before the field's type).
fn parse_struct(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    parser.advance(ctx); // 'struct'
    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;
    if !ctx.name_is_available_for_declaration(name) {
        syntax_error!(ctx, name_span, "'{}' is already declared", ctx.strings.resolve(name));
    }

    let generic_params = parse_optional_generic_params(ctx, parser)?;
    ctx.generic_parameter_names = generic_params.clone();

    let mut is_extern = false;
    let mut is_packed = false;
    while parser.current().kind == TokenKind::At {
        parser.advance(ctx);
        let directive_span = parser.current_span();
        let directive = parser.expect_identifier(ctx)?;
        match ctx.strings.resolve(directive) {
            "packed" => is_packed = true,
            "extern" => is_extern = true,
            other => syntax_error!(ctx, directive_span, "unknown struct directive '@{other}'"),
        }
    }

    ctx.current_struct_name = Some(name);
    ctx.current_struct_unknown_fields = 0;

    parser.expect(ctx, TokenKind::LeftBrace, "{")?;
    let mut field_names = Vec::new();
    let mut field_types = Vec::new();
    while parser.current().kind != TokenKind::RightBrace && !parser.is_eof() {
        let field_name = parser.expect_identifier(ctx)?;
        let field_type = super::types::parse_type(ctx, parser)?;
        field_names.push(field_name);
        field_types.push(field_type);
        parser.eat(ctx, &TokenKind::Semicolon);
    }
    parser.expect(ctx, TokenKind::RightBrace, "}")?;

    // §4.9.5: every `Type::None` placeholder left by a field referencing the
    // struct's own name must be rewritten to a self pointer, and the
    // tracked count must return to zero.
    let self_pointer = Type::Pointer(Box::new(Type::Struct(StructType {
        name,
        field_names: field_names.clone(),
        field_types: field_types.clone(),
        generic_params: generic_params.clone(),
        is_packed,
        is_generic: !generic_params.is_empty(),
        is_extern,
    })));
    let mut remaining = ctx.current_struct_unknown_fields;
    for ty in field_types.iter_mut() {
        rewrite_self_reference(ty, &self_pointer, &mut remaining);
    }
    if remaining != 0 {
        syntax_error!(ctx, name_span, "internal error: {remaining} self-reference placeholder(s) left unresolved in '{}'", ctx.strings.resolve(name));
    }

    ctx.current_struct_name = None;
    ctx.current_struct_unknown_fields = 0;
    ctx.generic_parameter_names.clear();

    let is_generic = !generic_params.is_empty();
    let struct_type = StructType {
        name,
        field_names,
        field_types,
        generic_params,
        is_packed,
        is_generic,
        is_extern,
    };
    ctx.structs.insert(name, struct_type.clone());
    Ok(Item::StructDecl(Type::Struct(struct_type)))
}

fn rewrite_self_reference(ty: &mut Type, replacement: &Type, remaining: &mut u32) {
    match ty {
        Type::None => {
            *ty = replacement.clone();
            *remaining = remaining.saturating_sub(1);
        }
        Type::Pointer(inner) => rewrite_self_reference(inner, replacement, remaining),
        Type::StaticArray(inner, _) | Type::StaticVector(inner, _) => {
            rewrite_self_reference(inner, replacement, remaining)
        }
        Type::Tuple(_, fields) => {
            for field in fields.iter_mut() {
                rewrite_self_reference(field, replacement, remaining);
            }
        }
        _ => {}
    }
}

/// `enum Name : T { A, B = 3, ... }` (§4.9.1).
fn parse_enum(ctx: &mut ParseContext, parser: &mut Parser) -> Result<Item, ParsingError> {
    parser.advance(ctx); // 'enum'
    let name_span = parser.current_span();
    let name = parser.expect_identifier(ctx)?;
    if !ctx.name_is_available_for_declaration(name) {
        syntax_error!(ctx, name_span, "'{}' is already declared", ctx.strings.resolve(name));
    }

    let element_type = if parser.eat(ctx, &TokenKind::Colon) {
        super::types::parse_type(ctx, parser)?
    } else {
        Type::Number(crate::types::NumberKind::I32)
    };

    parser.expect(ctx, TokenKind::LeftBrace, "{")?;
    let mut values: Vec<(StringId, u32)> = Vec::new();
    let mut next_value: u32 = 0;
    let mut seen_explicit = std::collections::HashSet::new();
    // §3 invariants: an enum is either all-explicit or all-implicit. Once an
    // explicit value has appeared, every later field must also carry one
    // (§8 scenario S4: `Red, Green = 5, Blue` flags the error at `Blue`, the
    // first field after the mode was established that lacks one).
    let mut explicit_mode = false;
    while parser.current().kind != TokenKind::RightBrace && !parser.is_eof() {
        let element_span = parser.current_span();
        let element_name = parser.expect_identifier(ctx)?;
        let is_explicit = parser.current().kind == TokenKind::Equal;
        if explicit_mode && !is_explicit {
            syntax_error!(ctx, element_span, "must add explicit value to all enum fields or to no one");
        }
        let value = if is_explicit {
            explicit_mode = true;
            parser.advance(ctx); // '='
            let value_span = parser.current_span();
            match parser.current().kind.clone() {
                TokenKind::IntLiteral(v, _) if v >= 0 => {
                    parser.advance(ctx);
                    let v = v as u32;
                    if !seen_explicit.insert(v) {
                        syntax_error!(ctx, value_span, "duplicate explicit enum value {v}");
                    }
                    v
                }
                other => syntax_error!(ctx, value_span, "expected a non-negative integer literal, found {other:?}"),
            }
        } else {
            next_value
        };
        next_value = value + 1;
        values.push((element_name, value));
        if !parser.eat(ctx, &TokenKind::Comma) {
            break;
        }
    }
    parser.expect(ctx, TokenKind::RightBrace, "}")?;

    let enum_type = EnumType {
        name,
        values,
        element_type: Box::new(element_type),
    };
    ctx.enums.insert(name, enum_type.clone());
    Ok(Item::EnumDecl(Type::Enum(enum_type)))
}
