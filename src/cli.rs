//! Component N (ambient) — the command-line front end (§4.13), grounded in
//! the teacher's `projects/cli.rs` command-dispatch shape, narrowed to this
//! crate's single concern: driving the parser, not building/serving
//! anything.

use crate::config::Config;
use crate::diagnostics::Level;
use crate::driver::CompilationDriver;
use crate::logging::LogOptions;
use saying::say;
use std::path::{Path, PathBuf};

/// §6: `compiler <command> <path> [log_flags]`, `command ∈ {check, compile,
/// emit-ir, generate-code, gen-ast}`. `compile`/`emit-ir`/`generate-code` all
/// run the same front-end pipeline as `check`; this crate stops at handing
/// code-gen a `CompilationUnit` (§1, §6), so they report that the next stage
/// is an external collaborator rather than performing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check(PathBuf),
    Compile(PathBuf),
    EmitIr(PathBuf),
    GenerateCode(PathBuf),
    /// Parse and pretty-print the resulting AST to stdout.
    GenAst(PathBuf),
    Help,
}

pub struct CliArgs {
    pub command: Command,
    pub log_options: LogOptions,
}

/// Parses `argv[1..]` (§4.13): `lac <command> <path> [--log=p,l,c,t,g]`, or
/// no/unknown args for help.
pub fn parse_args(args: &[String]) -> CliArgs {
    let mut log_options = LogOptions::default();
    let mut positional = Vec::new();

    for arg in args {
        if let Some(flags) = arg.strip_prefix("--log=") {
            log_options = LogOptions::from_flags(flags);
        } else {
            positional.push(arg.clone());
        }
    }

    let path = || positional.get(1).map(PathBuf::from);
    let command = match positional.first().map(String::as_str) {
        Some("check") => path().map(Command::Check).unwrap_or(Command::Help),
        Some("compile") => path().map(Command::Compile).unwrap_or(Command::Help),
        Some("emit-ir") => path().map(Command::EmitIr).unwrap_or(Command::Help),
        Some("generate-code") => path().map(Command::GenerateCode).unwrap_or(Command::Help),
        Some("gen-ast") => path().map(Command::GenAst).unwrap_or(Command::Help),
        _ => Command::Help,
    };

    CliArgs { command, log_options }
}

/// Runs a parsed command; returns a process exit code (0 on success, 1 on
/// usage error or a compile error), matching the teacher's `start_cli`
/// contract.
pub fn run(args: CliArgs) -> i32 {
    match args.command {
        Command::Help => {
            print_help();
            0
        }
        Command::Check(path) => run_check(&path, args.log_options, Stage::Check),
        Command::Compile(path) => run_check(&path, args.log_options, Stage::Compile),
        Command::EmitIr(path) => run_check(&path, args.log_options, Stage::EmitIr),
        Command::GenerateCode(path) => run_check(&path, args.log_options, Stage::GenerateCode),
        Command::GenAst(path) => run_check(&path, args.log_options, Stage::GenAst),
    }
}

enum Stage {
    Check,
    Compile,
    EmitIr,
    GenerateCode,
    GenAst,
}

/// Recursively collects every `.la` file under `path`, or returns `path`
/// itself if it is already a file (§6 "walked recursively for `.la` files").
fn collect_source_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(path) else {
        return files;
    };
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let entry_path = entry.path();
        if entry_path.is_dir() {
            files.extend(collect_source_files(&entry_path));
        } else if entry_path.extension().is_some_and(|ext| ext == "la") {
            files.push(entry_path);
        }
    }
    files
}

fn run_check(path: &Path, log_options: LogOptions, stage: Stage) -> i32 {
    if !path.exists() {
        say!(red: "error: '{}' does not exist", path.display());
        return 1;
    }

    let entries = collect_source_files(path);
    if entries.is_empty() {
        say!(red: "error: no '.la' files found under '{}'", path.display());
        return 1;
    }

    let config = Config::load(path.to_path_buf());
    let mut driver = CompilationDriver::with_options(config, log_options);
    let mut unit = crate::ast::CompilationUnit::default();
    for entry in &entries {
        let file_unit = driver.compile(entry);
        unit.tree_nodes.extend(file_unit.tree_nodes);
    }

    driver.ctx.diagnostics.render(Level::Warning, &driver.ctx.source_manager);
    driver.ctx.diagnostics.render(Level::Error, &driver.ctx.source_manager);

    if driver.ctx.diagnostics.has_errors() {
        say!(red: "compilation failed: {} error(s)", driver.ctx.diagnostics.level_count(Level::Error));
        return 1;
    }

    match stage {
        Stage::GenAst => println!("{unit:#?}"),
        Stage::Check => say!(green: "ok: {} top-level item(s)", unit.tree_nodes.len()),
        Stage::Compile | Stage::EmitIr | Stage::GenerateCode => {
            say!(green: "ok: {} top-level item(s); front end only, handing off to an external code generator is out of scope here", unit.tree_nodes.len());
        }
    }

    0
}

fn print_help() {
    println!("lac — a front end for .la source files");
    println!();
    println!("USAGE:");
    println!("    lac check <path> [--log=p,l,c,t,g]          parse a file (or every .la file under a directory) and report diagnostics");
    println!("    lac compile <path> [--log=p,l,c,t,g]        parse and hand off to an external code generator (out of scope here)");
    println!("    lac emit-ir <path> [--log=p,l,c,t,g]        parse and hand off to an external IR emitter (out of scope here)");
    println!("    lac generate-code <path> [--log=p,l,c,t,g]  parse and hand off to an external code generator (out of scope here)");
    println!("    lac gen-ast <path> [--log=p,l,c,t,g]        parse and print the resulting AST");
    println!();
    println!("--log flags: p=parser l=scanner c=codegen t=typechecker g=general");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_help() {
        let args = parse_args(&[]);
        assert_eq!(args.command, Command::Help);
    }

    #[test]
    fn check_with_path_and_log_flags() {
        let args = parse_args(&[
            "check".to_string(),
            "main.la".to_string(),
            "--log=p,g".to_string(),
        ]);
        assert_eq!(args.command, Command::Check(PathBuf::from("main.la")));
        assert!(args.log_options.parser);
        assert!(args.log_options.general);
        assert!(!args.log_options.scanner);
    }

    #[test]
    fn all_five_spec_commands_parse() {
        assert_eq!(
            parse_args(&["compile".to_string(), "a.la".to_string()]).command,
            Command::Compile(PathBuf::from("a.la"))
        );
        assert_eq!(
            parse_args(&["emit-ir".to_string(), "a.la".to_string()]).command,
            Command::EmitIr(PathBuf::from("a.la"))
        );
        assert_eq!(
            parse_args(&["generate-code".to_string(), "a.la".to_string()]).command,
            Command::GenerateCode(PathBuf::from("a.la"))
        );
        assert_eq!(
            parse_args(&["gen-ast".to_string(), "a.la".to_string()]).command,
            Command::GenAst(PathBuf::from("a.la"))
        );
    }

    #[test]
    fn unknown_command_is_help() {
        let args = parse_args(&["frobnicate".to_string(), "a.la".to_string()]);
        assert_eq!(args.command, Command::Help);
    }
}
