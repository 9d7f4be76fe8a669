//! End-to-end scenarios straight from the testable-properties section:
//! each parses a literal source string through the public API and checks
//! the exact structural shape the scenario describes.

use la_compiler::ast::{ExprKind, ForStmt, FunctionKind, Item, Stmt, VarDecl};
use la_compiler::logging::LogOptions;
use la_compiler::parse_context::ParseContext;
use la_compiler::parser::{self, Parser};
use la_compiler::types::{NumberKind, Type};

fn parse(source: &str) -> (ParseContext, la_compiler::ast::CompilationUnit) {
    let mut ctx = ParseContext::new(LogOptions::default());
    let mut parser = Parser::new(&mut ctx, 0, source);
    let unit = parser::parse_compilation_unit(&mut ctx, &mut parser).expect("parser returns Ok even with diagnostics queued");
    (ctx, unit)
}

#[test]
fn s1_main_returning_zero() {
    let (ctx, unit) = parse("fun main() int32 { return 0; }");
    assert!(!ctx.diagnostics.has_errors());
    assert_eq!(unit.tree_nodes.len(), 1);

    let Item::Function(decl) = &unit.tree_nodes[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(ctx.strings.resolve(decl.name), "main");
    assert!(decl.params.is_empty());
    assert_eq!(decl.return_type, Type::Number(NumberKind::I32));
    let body = decl.body.as_ref().expect("main has a body");
    assert_eq!(body.len(), 1);
    match &body[0] {
        Stmt::Return(values, _) => {
            assert_eq!(values.len(), 1);
            assert_eq!(values[0].kind, ExprKind::IntLiteral(0));
        }
        other => panic!("expected a return statement, found {other:?}"),
    }
}

#[test]
fn s2_alias_table_and_var_type() {
    let (mut ctx, unit) = parse("type byte = uint8; var x: byte = 42;");
    assert!(!ctx.diagnostics.has_errors());

    let byte_id = ctx.strings.intern("byte");
    assert!(ctx.aliases.contains(byte_id));
    assert_eq!(*ctx.aliases.resolve(byte_id), Type::Number(NumberKind::U8));

    let Item::VarDecl(VarDecl::Single { ty, value, .. }) = &unit.tree_nodes[1] else {
        panic!("expected a single var declaration");
    };
    assert_eq!(ty.as_ref(), Some(&Type::Number(NumberKind::U8)));
    match value.as_ref().map(|v| &v.kind) {
        Some(ExprKind::IntLiteral(42)) => {}
        other => panic!("expected the integer literal 42, found {other:?}"),
    }
}

#[test]
fn s3_struct_self_reference_and_pointer_var() {
    let (ctx, unit) = parse(
        "struct Node { next *Node; v int32; }\n\
         var head: *Node = null;",
    );
    assert!(!ctx.diagnostics.has_errors());
    assert_eq!(unit.tree_nodes.len(), 2);

    let Item::StructDecl(Type::Struct(node)) = &unit.tree_nodes[0] else {
        panic!("expected a struct declaration");
    };
    assert_eq!(ctx.strings.resolve(node.name), "Node");
    assert_eq!(node.field_types.len(), 2);
    match &node.field_types[0] {
        Type::Pointer(inner) => assert!(matches!(**inner, Type::Struct(ref s) if s.name == node.name)),
        other => panic!("expected the first field to be *Node, found {other:?}"),
    }
    assert_eq!(node.field_types[1], Type::Number(NumberKind::I32));
    assert_eq!(ctx.current_struct_unknown_fields, 0);

    let Item::VarDecl(VarDecl::Single { ty, .. }) = &unit.tree_nodes[1] else {
        panic!("expected a single var declaration");
    };
    match ty.as_ref().unwrap() {
        Type::Pointer(inner) => assert!(matches!(**inner, Type::Struct(ref s) if s.name == node.name)),
        other => panic!("expected head's type to be *Node, found {other:?}"),
    }

    // No `Type::None` placeholder may remain anywhere in the published struct.
    fn has_none(ty: &Type) -> bool {
        match ty {
            Type::None => true,
            Type::Pointer(inner) | Type::StaticArray(inner, _) | Type::StaticVector(inner, _) => has_none(inner),
            Type::Tuple(_, fields) => fields.iter().any(has_none),
            _ => false,
        }
    }
    assert!(!node.field_types.iter().any(has_none));
}

#[test]
fn s4_enum_mixed_explicit_values_is_rejected_at_the_offending_field() {
    let (ctx, _unit) = parse("enum Color { Red, Green = 5, Blue, }");
    assert!(ctx.diagnostics.has_errors());
    let errors = ctx.diagnostics.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("must add explicit value to all enum fields or to no one"));

    // The offending field is `Blue`, the third identifier on the line.
    let blue_col = "enum Color { Red, Green = 5, ".len() as u32 + 1;
    assert_eq!(errors[0].span.col_start, blue_col);
}

#[test]
fn s5_break_past_loop_depth_is_an_error() {
    let (ctx, _unit) = parse("fun main() void { for { break 2; } }");
    assert!(ctx.diagnostics.has_errors());
    assert!(ctx
        .diagnostics
        .errors()
        .iter()
        .any(|d| d.message.contains("exceeds the current loop nesting depth")));
}

#[test]
fn s6_infix_word_operator_is_registered_and_dispatched() {
    let (ctx, unit) = parse(
        "fun add(a int32, b int32) int32 = a + b;\n\
         @infix fun plus(a int32, b int32) int32 = a + b;\n\
         fun main() int32 { return 1 plus 2; }",
    );
    assert!(!ctx.diagnostics.has_errors());
    assert_eq!(unit.tree_nodes.len(), 3);

    let plus_id = ctx.strings.intern("plus");
    assert_eq!(ctx.functions.get(&plus_id), Some(&FunctionKind::Infix));

    let Item::Function(main_decl) = &unit.tree_nodes[2] else {
        panic!("expected main's function declaration");
    };
    let body = main_decl.body.as_ref().unwrap();
    let Stmt::Return(values, _) = &body[0] else {
        panic!("expected a return statement");
    };
    match &values[0].kind {
        ExprKind::Call { callee, args } => {
            assert_eq!(callee.kind, ExprKind::Identifier(plus_id));
            assert_eq!(args.len(), 2);
            assert_eq!(args[0].kind, ExprKind::IntLiteral(1));
            assert_eq!(args[1].kind, ExprKind::IntLiteral(2));
        }
        other => panic!("expected 1 plus 2 to parse as a call, found {other:?}"),
    }
}

#[test]
fn for_range_with_a_named_index_is_rejected() {
    let (ctx, _unit) = parse("fun main() void { for (i: 0 .. 10) { } }");
    assert!(ctx.diagnostics.has_errors());
    assert!(ctx
        .diagnostics
        .errors()
        .iter()
        .any(|d| d.message.contains("may not name a loop variable")));
}

#[test]
fn for_each_named_binds_element_and_index() {
    let (ctx, unit) = parse("fun main() void { for (item, idx: items) { } }");
    assert!(!ctx.diagnostics.has_errors());
    let Item::Function(decl) = &unit.tree_nodes[0] else {
        panic!("expected a function declaration");
    };
    let Stmt::For(ForStmt::ForEachNamed { name, index, .. }) = &decl.body.as_ref().unwrap()[0] else {
        panic!("expected a named for-each statement");
    };
    assert_eq!(ctx.strings.resolve(*name), "item");
    assert_eq!(index.map(|i| ctx.strings.resolve(i).to_string()), Some("idx".to_string()));
}

#[test]
fn switch_parses_parenthesized_scrutinee_and_arrow_arms() {
    let (ctx, unit) = parse(
        "fun main() void {\n\
           switch (1, <) {\n\
             2 -> a;\n\
             else -> b;\n\
           }\n\
         }",
    );
    assert!(!ctx.diagnostics.has_errors());
    let Item::Function(decl) = &unit.tree_nodes[0] else {
        panic!("expected a function declaration");
    };
    let Stmt::Switch(switch) = &decl.body.as_ref().unwrap()[0] else {
        panic!("expected a switch statement");
    };
    assert_eq!(switch.cmp_op, la_compiler::types::OperatorKind::Less);
    assert_eq!(switch.arms.len(), 1);
    assert!(switch.else_arm.is_some());
}

#[test]
fn import_and_load_each_accept_a_braced_list_of_independent_names() {
    let (ctx, unit) = parse(r#"import { "a" "b" }; load "c";"#);
    assert!(!ctx.diagnostics.has_errors());
    assert_eq!(unit.tree_nodes.len(), 2);

    let Item::Import(names, _) = &unit.tree_nodes[0] else {
        panic!("expected an import item");
    };
    let resolved: Vec<&str> = names.iter().map(|id| ctx.strings.resolve(*id)).collect();
    assert_eq!(resolved, vec!["a", "b"]);

    let Item::Load(names, _) = &unit.tree_nodes[1] else {
        panic!("expected a load item");
    };
    assert_eq!(ctx.strings.resolve(names[0]), "c");
}

#[test]
fn chained_comparison_desugars_to_an_and_of_two_comparisons() {
    let (ctx, unit) = parse("fun main() void { a < b < c; }");
    assert!(!ctx.diagnostics.has_errors());
    let Item::Function(decl) = &unit.tree_nodes[0] else {
        panic!("expected a function declaration");
    };
    let Stmt::Expr(expr) = &decl.body.as_ref().unwrap()[0] else {
        panic!("expected an expression statement");
    };
    match &expr.kind {
        ExprKind::Binary { op, left, right } => {
            assert_eq!(*op, la_compiler::types::OperatorKind::And);
            assert!(matches!(left.kind, ExprKind::Binary { op: la_compiler::types::OperatorKind::Less, .. }));
            assert!(matches!(right.kind, ExprKind::Binary { op: la_compiler::types::OperatorKind::Less, .. }));
        }
        other => panic!("expected a chained comparison to desugar to And(..), found {other:?}"),
    }
}

#[test]
fn right_shift_needs_no_space_between_the_two_greater_tokens() {
    let (ctx, unit) = parse("fun main() void { a >> b; }");
    assert!(!ctx.diagnostics.has_errors());
    let Item::Function(decl) = &unit.tree_nodes[0] else {
        panic!("expected a function declaration");
    };
    let Stmt::Expr(expr) = &decl.body.as_ref().unwrap()[0] else {
        panic!("expected an expression statement");
    };
    assert!(matches!(expr.kind, ExprKind::Binary { op: la_compiler::types::OperatorKind::Shr, .. }));
}

#[test]
fn spaced_greater_greater_is_two_comparisons_not_a_shift() {
    // `a > > b` can't be a valid comparison chain either (no right operand
    // for the first `>`), so it surfaces as a syntax error rather than ever
    // being treated as a shift.
    let (ctx, _unit) = parse("fun main() void { a > > b; }");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn constant_is_inlined_and_not_visible_as_a_plain_identifier() {
    let (ctx, unit) = parse("fun main() int32 { const x = 7; return x; }");
    assert!(!ctx.diagnostics.has_errors());
    let Item::Function(decl) = &unit.tree_nodes[0] else {
        panic!("expected a function declaration");
    };
    let body = decl.body.as_ref().unwrap();
    let Stmt::Return(values, _) = &body[1] else {
        panic!("expected a return statement");
    };
    assert_eq!(values[0].kind, ExprKind::IntLiteral(7));
}

#[test]
fn user_operator_mangled_names_differ_by_parameter_types() {
    let (ctx, unit) = parse(
        "operator + (a int32, b int32) int32 { return a; }\n\
         operator + (a float64, b float64) float64 { return a; }",
    );
    assert!(!ctx.diagnostics.has_errors());
    let Item::Function(int_decl) = &unit.tree_nodes[0] else {
        panic!("expected an operator-function declaration");
    };
    let Item::Function(float_decl) = &unit.tree_nodes[1] else {
        panic!("expected an operator-function declaration");
    };
    assert_ne!(int_decl.name, float_decl.name);
    assert_eq!(ctx.strings.resolve(int_decl.name), "operator$+$int32$int32");
    assert_eq!(ctx.strings.resolve(float_decl.name), "operator$+$float64$float64");
}
