//! Component E — the type model — and Component (4.4) — its helpers.

use crate::string_interning::{StringId, StringTable};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I1,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumberKind {
    pub fn is_integer(self) -> bool {
        !matches!(self, NumberKind::F32 | NumberKind::F64)
    }

    pub fn name(self) -> &'static str {
        match self {
            NumberKind::I1 => "int1",
            NumberKind::I8 => "int8",
            NumberKind::I16 => "int16",
            NumberKind::I32 => "int32",
            NumberKind::I64 => "int64",
            NumberKind::U8 => "uint8",
            NumberKind::U16 => "uint16",
            NumberKind::U32 => "uint32",
            NumberKind::U64 => "uint64",
            NumberKind::F32 => "float32",
            NumberKind::F64 => "float64",
        }
    }
}

/// The overloadable operator identity used both by `operator` declarations
/// and by AST binary/unary/postfix nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Equality,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Not,
    BitNot,
    Negate,
    Increment,
    Decrement,
}

impl OperatorKind {
    pub fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Add => "+",
            OperatorKind::Subtract => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Divide => "/",
            OperatorKind::Modulus => "%",
            OperatorKind::BitAnd => "&",
            OperatorKind::BitOr => "|",
            OperatorKind::BitXor => "^",
            OperatorKind::Shl => "<<",
            OperatorKind::Shr => ">>",
            OperatorKind::Equality => "==",
            OperatorKind::NotEqual => "!=",
            OperatorKind::Less => "<",
            OperatorKind::LessEqual => "<=",
            OperatorKind::Greater => ">",
            OperatorKind::GreaterEqual => ">=",
            OperatorKind::And => "&&",
            OperatorKind::Or => "||",
            OperatorKind::Not => "!",
            OperatorKind::BitNot => "~",
            OperatorKind::Negate => "neg",
            OperatorKind::Increment => "++",
            OperatorKind::Decrement => "--",
        }
    }

    /// Operators that may be declared `@prefix` (arity 1).
    pub fn is_prefix_overloadable(self) -> bool {
        matches!(
            self,
            OperatorKind::Not | OperatorKind::BitNot | OperatorKind::Negate
        )
    }

    /// Operators that may be declared `@infix` (arity 2).
    pub fn is_infix_overloadable(self) -> bool {
        matches!(
            self,
            OperatorKind::Add
                | OperatorKind::Subtract
                | OperatorKind::Multiply
                | OperatorKind::Divide
                | OperatorKind::Modulus
                | OperatorKind::BitAnd
                | OperatorKind::BitOr
                | OperatorKind::BitXor
                | OperatorKind::Shl
                | OperatorKind::Shr
                | OperatorKind::Equality
                | OperatorKind::NotEqual
                | OperatorKind::Less
                | OperatorKind::LessEqual
                | OperatorKind::Greater
                | OperatorKind::GreaterEqual
                | OperatorKind::And
                | OperatorKind::Or
        )
    }

    /// Operators that may be declared `@postfix` (arity 1).
    pub fn is_postfix_overloadable(self) -> bool {
        matches!(self, OperatorKind::Increment | OperatorKind::Decrement)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: StringId,
    pub field_names: Vec<StringId>,
    pub field_types: Vec<Type>,
    pub generic_params: Vec<StringId>,
    pub is_packed: bool,
    pub is_generic: bool,
    pub is_extern: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub return_type: Box<Type>,
    pub has_varargs: bool,
    pub varargs_elem: Option<Box<Type>>,
    pub is_generic: bool,
    pub generic_params: Vec<StringId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: StringId,
    /// Insertion-ordered per §9 ("use ordered maps ... for the enum values
    /// map as well; ordering is part of the spec").
    pub values: Vec<(StringId, u32)>,
    pub element_type: Box<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number(NumberKind),
    Void,
    /// Temporary placeholder for a struct's self-reference during its own
    /// declaration (§4.9.5). Must not survive publication of the struct.
    None,
    Pointer(Box<Type>),
    StaticArray(Box<Type>, u32),
    StaticVector(Box<Type>, u32),
    Function(FunctionType),
    Struct(StructType),
    GenericStruct(StructType, Vec<Type>),
    GenericParameter(StringId),
    Tuple(StringId, Vec<Type>),
    Enum(EnumType),
    EnumElement(StringId, Box<Type>),
}

impl Type {
    pub fn is_integer_type(&self) -> bool {
        matches!(self, Type::Number(n) if n.is_integer())
    }

    pub fn is_void_type(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_struct_type(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    pub fn is_generic_struct_type(&self) -> bool {
        matches!(self, Type::GenericStruct(..))
    }

    pub fn is_enum_type(&self) -> bool {
        matches!(self, Type::Enum(_))
    }

    pub fn is_enum_element_type(&self) -> bool {
        matches!(self, Type::EnumElement(..))
    }

    pub fn is_none_placeholder(&self) -> bool {
        matches!(self, Type::None)
    }

    /// Canonical diagnostic-facing name.
    pub fn display(&self, strings: &StringTable) -> String {
        match self {
            Type::Number(kind) => kind.name().to_string(),
            Type::Void => "void".to_string(),
            Type::None => "<unresolved self-reference>".to_string(),
            Type::Pointer(inner) => format!("*{}", inner.display(strings)),
            Type::StaticArray(elem, size) => format!("[{size}]{}", elem.display(strings)),
            Type::StaticVector(elem, size) => format!("@vec [{size}]{}", elem.display(strings)),
            Type::Function(f) => {
                let params: Vec<String> = f.params.iter().map(|p| p.display(strings)).collect();
                format!("fun ({}) {}", params.join(", "), f.return_type.display(strings))
            }
            Type::Struct(s) => strings.resolve(s.name).to_string(),
            Type::GenericStruct(base, args) => {
                let args: Vec<String> = args.iter().map(|a| a.display(strings)).collect();
                format!("{}<{}>", strings.resolve(base.name), args.join(", "))
            }
            Type::GenericParameter(name) => strings.resolve(*name).to_string(),
            Type::Tuple(name, _) => strings.resolve(*name).to_string(),
            Type::Enum(e) => strings.resolve(e.name).to_string(),
            Type::EnumElement(enum_name, _) => strings.resolve(*enum_name).to_string(),
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A stable mangled name for a tuple type, e.g. `(int32, int32)` -> `tuple$int32$int32`.
pub fn mangle_tuple(field_types: &[Type], strings: &StringTable) -> String {
    let parts: Vec<String> = field_types.iter().map(|t| t.display(strings)).collect();
    format!("tuple${}", parts.join("$"))
}

/// A stable mangled name for a user-defined operator function: a pure
/// function of `(op_kind, param_types)` so two declarations with different
/// parameter types never collide (§4.4, §8 item 8).
pub fn mangle_operator_function(op: OperatorKind, param_types: &[Type], strings: &StringTable) -> String {
    let parts: Vec<String> = param_types.iter().map(|t| t.display(strings)).collect();
    format!("operator${}${}", op.symbol(), parts.join("$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_mangling_is_a_pure_function_of_kind_and_params() {
        let strings = StringTable::new();
        let i32_t = vec![Type::Number(NumberKind::I32), Type::Number(NumberKind::I32)];
        let f64_t = vec![Type::Number(NumberKind::F64), Type::Number(NumberKind::F64)];

        let a = mangle_operator_function(OperatorKind::Add, &i32_t, &strings);
        let b = mangle_operator_function(OperatorKind::Add, &i32_t, &strings);
        let c = mangle_operator_function(OperatorKind::Add, &f64_t, &strings);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn predicates_partition_the_sum_type() {
        let mut strings = StringTable::new();
        let struct_ty = Type::Struct(StructType {
            name: strings.intern("Node"),
            field_names: vec![],
            field_types: vec![],
            generic_params: vec![],
            is_packed: false,
            is_generic: false,
            is_extern: false,
        });
        assert!(struct_ty.is_struct_type());
        assert!(!struct_ty.is_enum_type());
    }
}
