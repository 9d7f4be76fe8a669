//! Component F — the AST model: a tagged union of statements and
//! expressions where every node carries a source span.

use crate::span::Span;
use crate::string_interning::StringId;
use crate::types::{FunctionType, OperatorKind, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(StringId),
    CharLiteral(char),
    BoolLiteral(bool),
    Null,
    Undefined,
    Identifier(StringId),

    Unary {
        op: OperatorKind,
        operand: Box<Expr>,
    },
    Binary {
        op: OperatorKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Chained-comparison desugaring target (§4.9.3, §8 item 7):
    /// `a < b < c` becomes `And(Binary(<, a, b), Binary(<, b, c))`, which is
    /// just `Binary { op: And, .. }` over two comparison nodes.
    Postfix {
        op: OperatorKind,
        operand: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// An ordinary or user-defined-operator call: `f(a, b)`, or the
    /// desugared form of an infix/prefix/postfix user operator.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `f<T, U>(a, b)` — only valid when `f` names a registered function
    /// or generic struct (§4.9.3 "Generic call disambiguation").
    GenericCall {
        callee: Box<Expr>,
        type_args: Vec<Type>,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: StringId,
    },
    /// `Color::Red`.
    EnumAccess {
        enum_name: StringId,
        element: StringId,
    },
    /// `x.count` — the sole built-in enum attribute (§4.9.3).
    EnumAttribute {
        base: Box<Expr>,
        attribute: StringId,
    },
    /// `Type(args…) [trailing lambda]` constructor call (§4.9.3 "Initializers").
    Initializer {
        type_name: StringId,
        type_args: Vec<Type>,
        args: Vec<Expr>,
        trailing_lambda: Option<Box<Block>>,
    },
    /// A bare `{ … }` lambda argument appended to a call (§4.9.3 "Trailing-lambda call").
    Lambda {
        params: Vec<Param>,
        body: Box<Block>,
    },
    Cast {
        target_type: Type,
        operand: Box<Expr>,
    },
    TypeSize(Type),
    TypeAlign(Type),
    ValueSize(Box<Expr>),
    Directive(Directive),
}

/// Expression-position directives (§4.9.7).
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Line,
    Column,
    FilePath,
    MaxValue(Type),
    MinValue(Type),
    Infinity,
    Infinity32,
    Infinity64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: StringId,
    pub ty: Type,
    pub span: Span,
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub enum VarDecl {
    Single {
        name: StringId,
        ty: Option<Type>,
        value: Option<Expr>,
        span: Span,
    },
    Destructure {
        /// Each bound name with its optional `:T` hint (§4.9.1).
        names: Vec<(StringId, Option<Type>)>,
        value: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForStmt {
    Infinite(Block),
    ForEach {
        collection: Expr,
        body: Block,
    },
    ForEachNamed {
        name: StringId,
        index: Option<StringId>,
        collection: Expr,
        body: Block,
    },
    Range {
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Block,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchArm {
    pub patterns: Vec<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub scrutinee: Expr,
    pub cmp_op: OperatorKind,
    pub arms: Vec<SwitchArm>,
    pub else_arm: Option<Box<Stmt>>,
    /// Set by a `@complete` directive (§4.9.7); exhaustiveness is checked by
    /// a later pass, not here.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    ConstDecl {
        name: StringId,
        value: Expr,
        span: Span,
    },
    If {
        branches: Vec<(Expr, Block)>,
        else_block: Option<Block>,
    },
    For(ForStmt),
    While {
        condition: Expr,
        body: Block,
    },
    Switch(SwitchStmt),
    Return(Vec<Expr>, Span),
    /// The operand is constrained to a call expression by the parser (§4.9.2).
    Defer(Expr, Span),
    Break {
        count: u32,
        span: Span,
    },
    Continue {
        count: u32,
        span: Span,
    },
    Block(Block),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Normal,
    Prefix,
    Infix,
    Postfix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: StringId,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub has_varargs: bool,
    pub varargs_elem: Option<Type>,
    pub generic_params: Vec<StringId>,
    pub kind: FunctionKind,
    /// Set when this declaration came from an `operator` production.
    pub operator: Option<OperatorKind>,
    pub is_extern: bool,
    pub intrinsic: Option<StringId>,
    /// `None` for a bare prototype (`@extern`/`@intrinsic`).
    pub body: Option<Block>,
    pub name_span: Span,
}

impl FunctionDecl {
    pub fn signature(&self) -> FunctionType {
        FunctionType {
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: Box::new(self.return_type.clone()),
            has_varargs: self.has_varargs,
            varargs_elem: self.varargs_elem.clone().map(Box::new),
            is_generic: !self.generic_params.is_empty(),
            generic_params: self.generic_params.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Import(Vec<StringId>, Span),
    Load(Vec<StringId>, Span),
    TypeAlias {
        name: StringId,
        ty: Type,
        span: Span,
    },
    Function(FunctionDecl),
    VarDecl(VarDecl),
    ConstDecl {
        name: StringId,
        value: Expr,
        span: Span,
    },
    StructDecl(Type),
    EnumDecl(Type),
}

/// The final artifact handed to the (external) code generator / type
/// checker, per §6: "`CompilationUnit = { tree_nodes: [Statement] }`".
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub tree_nodes: Vec<Item>,
}
