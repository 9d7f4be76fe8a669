use std::env;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let parsed = la_compiler::cli::parse_args(&args);
    let code = la_compiler::cli::run(parsed);
    std::process::exit(code);
}
