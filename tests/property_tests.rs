//! Property tests for the scanner/parser's more combinatorial invariants,
//! grounded in the pack's `property_tests.rs` style (`proptest!` blocks, one
//! property per block) rather than the teacher's own test layout, since the
//! teacher doesn't exercise its declared `proptest` dependency itself.

use la_compiler::ast::{ExprKind, Item, Stmt};
use la_compiler::logging::LogOptions;
use la_compiler::parse_context::ParseContext;
use la_compiler::parser::{self, Parser};
use la_compiler::types::OperatorKind;
use proptest::prelude::*;

fn parse(source: &str) -> (ParseContext, la_compiler::ast::CompilationUnit) {
    let mut ctx = ParseContext::new(LogOptions::default());
    let mut parser = Parser::new(&mut ctx, 0, source);
    let unit = parser::parse_compilation_unit(&mut ctx, &mut parser)
        .expect("parser returns Ok even with diagnostics queued");
    (ctx, unit)
}

fn comparison_symbol(idx: usize) -> &'static str {
    const SYMBOLS: [&str; 4] = ["<", "<=", "==", "!="];
    SYMBOLS[idx % SYMBOLS.len()]
}

/// §8 item 7 generalized beyond the spec's two-operand example: a chain of
/// `k` comparisons desugars to a left-associative fold of `And` over `k - 1`
/// comparison nodes, never a flat n-ary node.
fn assert_left_folded_chain(expr: &la_compiler::ast::Expr, chain_len: usize) {
    if chain_len == 1 {
        assert!(matches!(expr.kind, ExprKind::Binary { op, .. } if op != OperatorKind::And));
        return;
    }
    match &expr.kind {
        ExprKind::Binary { op: OperatorKind::And, left, right } => {
            assert!(matches!(right.kind, ExprKind::Binary { op, .. } if op != OperatorKind::And));
            assert_left_folded_chain(left, chain_len - 1);
        }
        other => panic!("expected a left-folded And chain, found {other:?}"),
    }
}

proptest! {
    #[test]
    fn chained_comparisons_fold_left_regardless_of_length(
        operand_count in 3usize..7,
        op_choice in 0usize..4,
    ) {
        let names: Vec<String> = (0..operand_count).map(|i| format!("v{i}")).collect();
        let symbol = comparison_symbol(op_choice);
        let chain = names.join(&format!(" {symbol} "));
        let source = format!("fun main() void {{ {chain}; }}");

        let (ctx, unit) = parse(&source);
        prop_assert!(!ctx.diagnostics.has_errors());
        let Item::Function(decl) = &unit.tree_nodes[0] else {
            panic!("expected a function declaration");
        };
        let Stmt::Expr(expr) = &decl.body.as_ref().unwrap()[0] else {
            panic!("expected an expression statement");
        };
        assert_left_folded_chain(expr, operand_count - 1);
    }
}

proptest! {
    #[test]
    fn round_trip_lexing_on_arbitrary_identifier_sequences(
        names in proptest::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,8}", 1..6),
    ) {
        use la_compiler::scanner::Scanner;
        use la_compiler::string_interning::StringTable;

        let source = names.join(" ");
        let mut strings = StringTable::new();
        let mut scanner = Scanner::new(0, &source);
        let mut rebuilt = String::new();
        let mut cursor: u32 = 1;
        loop {
            let token = scanner.scan_next(&mut strings);
            if token.kind.is_eof() {
                break;
            }
            let start = (token.span.col_start - 1) as usize;
            let end = token.span.col_end as usize;
            rebuilt.push_str(&" ".repeat(start - (cursor - 1) as usize));
            rebuilt.push_str(&source[start..end]);
            cursor = token.span.col_end + 1;
        }
        prop_assert_eq!(rebuilt, source);
    }
}
