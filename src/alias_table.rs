//! Component G — named type aliases, pre-populated with primitives (§4.5).

use crate::string_interning::{StringId, StringTable};
use crate::types::{NumberKind, Type};
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct AliasTable {
    aliases: FxHashMap<StringId, Type>,
}

impl AliasTable {
    /// Pre-populates the table with `int1, int8, ..., uint64, float32,
    /// float64, char = int8, uchar = uint8, void`.
    pub fn with_primitives(strings: &mut StringTable) -> Self {
        let mut table = AliasTable::default();
        let primitives: &[(&str, Type)] = &[
            ("int1", Type::Number(NumberKind::I1)),
            ("int8", Type::Number(NumberKind::I8)),
            ("int16", Type::Number(NumberKind::I16)),
            ("int32", Type::Number(NumberKind::I32)),
            ("int64", Type::Number(NumberKind::I64)),
            ("uint8", Type::Number(NumberKind::U8)),
            ("uint16", Type::Number(NumberKind::U16)),
            ("uint32", Type::Number(NumberKind::U32)),
            ("uint64", Type::Number(NumberKind::U64)),
            ("float32", Type::Number(NumberKind::F32)),
            ("float64", Type::Number(NumberKind::F64)),
            ("char", Type::Number(NumberKind::I8)),
            ("uchar", Type::Number(NumberKind::U8)),
            ("void", Type::Void),
        ];

        for (name, ty) in primitives {
            let id = strings.intern(name);
            table.aliases.insert(id, ty.clone());
        }

        table
    }

    pub fn contains(&self, name: StringId) -> bool {
        self.aliases.contains_key(&name)
    }

    /// No overwrite check: the caller (the parser, at `type` declaration
    /// sites) must already have enforced uniqueness against structs/enums.
    pub fn define(&mut self, name: StringId, ty: Type) {
        self.aliases.insert(name, ty);
    }

    /// Caller must have checked `contains` first.
    pub fn resolve(&self, name: StringId) -> &Type {
        self.aliases
            .get(&name)
            .expect("resolve called without checking contains")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_preloaded() {
        let mut strings = StringTable::new();
        let table = AliasTable::with_primitives(&mut strings);
        let byte = strings.intern("uint8");
        assert!(table.contains(byte));
        assert_eq!(*table.resolve(byte), Type::Number(NumberKind::U8));
    }

    #[test]
    fn define_then_resolve_round_trips() {
        let mut strings = StringTable::new();
        let mut table = AliasTable::with_primitives(&mut strings);
        let name = strings.intern("byte");
        table.define(name, Type::Number(NumberKind::U8));
        assert!(table.contains(name));
    }
}
