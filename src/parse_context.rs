//! Component J — the Parse Context: one per compilation, threaded into
//! every recursive parser invocation so all sources share one symbol space
//! (§4.7).

use crate::alias_table::AliasTable;
use crate::ast::{Expr, FunctionKind};
use crate::diagnostics::DiagnosticEngine;
use crate::logging::LogOptions;
use crate::scoped_map::ScopedMap;
use crate::source_manager::SourceManager;
use crate::string_interning::{StringId, StringTable};
use crate::types::{EnumType, StructType};
use rustc_hash::FxHashMap;

pub struct ParseContext {
    pub options: LogOptions,
    pub diagnostics: DiagnosticEngine,
    pub source_manager: SourceManager,
    pub strings: StringTable,
    pub aliases: AliasTable,
    /// Name -> kind, consulted mid-expression to recognize user-defined
    /// prefix/infix/postfix calls (§4.9.3 "User operators").
    pub functions: FxHashMap<StringId, FunctionKind>,
    pub structs: FxHashMap<StringId, StructType>,
    pub enums: FxHashMap<StringId, EnumType>,
    pub constants: ScopedMap<Expr>,
    /// Populated while parsing a single generic function/struct prototype;
    /// cleared immediately after that declaration completes (§3 Lifecycles).
    pub generic_parameter_names: Vec<StringId>,
    /// Incremented for each `None` placeholder field inside the struct
    /// currently being declared; must return to zero before publication
    /// (§3 Invariants, §4.9.5).
    pub current_struct_unknown_fields: u32,
    pub current_struct_name: Option<StringId>,
    /// Entering a function or lambda pushes a fresh 0; exiting pops
    /// (§4.9.2 "Control-flow rules").
    pub loop_levels_stack: Vec<u32>,
    /// `Config.disable_warnings` (§4.11, §7 "Warning"), set by the driver
    /// after construction. `LogOptions` is a distinct, CLI-verbosity-only
    /// concern and is never the gate for a diagnostic warning.
    pub disable_warnings: bool,
}

impl ParseContext {
    pub fn new(options: LogOptions) -> Self {
        let mut strings = StringTable::new();
        let aliases = AliasTable::with_primitives(&mut strings);
        ParseContext {
            options,
            diagnostics: DiagnosticEngine::new(),
            source_manager: SourceManager::new(),
            strings,
            aliases,
            functions: FxHashMap::default(),
            structs: FxHashMap::default(),
            enums: FxHashMap::default(),
            constants: ScopedMap::new(),
            generic_parameter_names: Vec::new(),
            current_struct_unknown_fields: 0,
            current_struct_name: None,
            loop_levels_stack: vec![0],
            disable_warnings: false,
        }
    }

    /// A type alias, struct, enum, and generic-parameter name in one
    /// declaration must be mutually disjoint (§3 Invariants).
    pub fn name_is_available_for_declaration(&self, name: StringId) -> bool {
        !self.aliases.contains(name)
            && !self.structs.contains_key(&name)
            && !self.enums.contains_key(&name)
            && !self.generic_parameter_names.contains(&name)
    }

    pub fn enter_loop(&mut self) {
        if let Some(depth) = self.loop_levels_stack.last_mut() {
            *depth += 1;
        }
    }

    pub fn exit_loop(&mut self) {
        if let Some(depth) = self.loop_levels_stack.last_mut() {
            *depth = depth.saturating_sub(1);
        }
    }

    pub fn current_loop_depth(&self) -> u32 {
        *self.loop_levels_stack.last().unwrap_or(&0)
    }

    pub fn enter_function_scope(&mut self) {
        self.loop_levels_stack.push(0);
    }

    pub fn exit_function_scope(&mut self) {
        if self.loop_levels_stack.len() > 1 {
            self.loop_levels_stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names_are_unavailable_for_redeclaration() {
        let mut ctx = ParseContext::new(LogOptions::default());
        let name = ctx.strings.intern("int32");
        assert!(!ctx.name_is_available_for_declaration(name));
    }

    #[test]
    fn loop_depth_tracks_nesting_and_resets_per_function() {
        let mut ctx = ParseContext::new(LogOptions::default());
        assert_eq!(ctx.current_loop_depth(), 0);
        ctx.enter_loop();
        ctx.enter_loop();
        assert_eq!(ctx.current_loop_depth(), 2);
        ctx.enter_function_scope();
        assert_eq!(ctx.current_loop_depth(), 0);
        ctx.exit_function_scope();
        assert_eq!(ctx.current_loop_depth(), 2);
    }
}
