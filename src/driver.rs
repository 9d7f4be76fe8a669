//! Component K — the Compilation Driver (§4.8): registers, scans, and
//! parses a root file, then recursively resolves `import`/`load` against one
//! shared [`ParseContext`].
//!
//! Grounded in the teacher's `module_dependencies.rs` (path resolution,
//! already-visited tracking) and `headers/parse_file_headers.rs` (reading a
//! file's header items before the rest of the body).

use crate::ast::{CompilationUnit, Item};
use crate::config::Config;
use crate::logging::driver_log;
use crate::parse_context::ParseContext;
use crate::parser::{self, Parser};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub struct CompilationDriver {
    pub ctx: ParseContext,
    pub config: Config,
}

impl CompilationDriver {
    pub fn new(config: Config) -> Self {
        Self::with_options(config, crate::logging::LogOptions::default())
    }

    pub fn with_options(config: Config, options: crate::logging::LogOptions) -> Self {
        let mut ctx = ParseContext::new(options);
        ctx.disable_warnings = config.disable_warnings;
        CompilationDriver { ctx, config }
    }

    /// Compiles the entry file and every file it transitively `import`s or
    /// `load`s, merging all of their top-level items into one unit in
    /// registration order.
    pub fn compile(&mut self, entry_path: &Path) -> CompilationUnit {
        let mut unit = CompilationUnit::default();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();
        queue.push_back(entry_path.to_path_buf());

        while let Some(path) = queue.pop_front() {
            if self.ctx.source_manager.is_registered(&path) {
                continue;
            }

            driver_log(&self.ctx.options, format!("compiling {}", path.display()));
            let file_id = self.ctx.source_manager.register(&path);

            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(err) => {
                    self.ctx.diagnostics.report_error(
                        crate::span::Span::new(file_id, 1, 1, 1),
                        format!("could not read '{}': {err}", path.display()),
                    );
                    continue;
                }
            };

            let mut parser = Parser::new(&mut self.ctx, file_id, &source);
            match parser::parse_compilation_unit(&mut self.ctx, &mut parser) {
                Ok(file_unit) => {
                    for item in &file_unit.tree_nodes {
                        for next in self.resolve_dependency(&path, item) {
                            queue.push_back(next);
                        }
                    }
                    unit.tree_nodes.extend(file_unit.tree_nodes);
                }
                Err(_) => {
                    // Diagnostics were already recorded; move on to the rest
                    // of the queue so one bad file doesn't stop the whole run.
                }
            }
        }

        unit
    }

    /// `import "name"` / `import { "a" "b" ... }` resolves each name against
    /// [`Config::lib_dir`]; `load` resolves each name relative to the
    /// importing file's own directory (§4.8, §6, §4.9.1). Each name is an
    /// independent file, not a path component of one nested path.
    fn resolve_dependency(&self, importing_file: &Path, item: &Item) -> Vec<PathBuf> {
        let (names, is_import) = match item {
            Item::Import(names, _) => (names, true),
            Item::Load(names, _) => (names, false),
            _ => return Vec::new(),
        };

        names
            .iter()
            .map(|id| {
                let relative = PathBuf::from(self.ctx.strings.resolve(*id)).with_extension("la");
                if is_import {
                    self.config.lib_dir.join(&relative)
                } else {
                    importing_file
                        .parent()
                        .unwrap_or_else(|| Path::new("."))
                        .join(&relative)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_file_with_no_dependencies_compiles() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.la");
        let mut file = std::fs::File::create(&entry).unwrap();
        writeln!(file, "const answer = 42;").unwrap();

        let mut driver = CompilationDriver::new(Config::new(entry.clone()));
        let unit = driver.compile(&entry);

        assert_eq!(unit.tree_nodes.len(), 1);
        assert!(!driver.ctx.diagnostics.has_errors());
    }

    #[test]
    fn load_pulls_in_a_sibling_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.la");
        let sibling = dir.path().join("util.la");
        std::fs::write(&sibling, "const util_answer = 1;\n").unwrap();
        std::fs::write(&entry, "load util;\nconst main_answer = 2;\n").unwrap();

        let mut driver = CompilationDriver::new(Config::new(entry.clone()));
        let unit = driver.compile(&entry);

        assert_eq!(unit.tree_nodes.len(), 3); // load item + 2 consts
        assert!(!driver.ctx.diagnostics.has_errors());
    }
}
