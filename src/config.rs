//! Component L (ambient) — project configuration (§4.11).
//!
//! Grounded in the teacher's `settings.rs` `Config`/`Default` pair: a
//! project-wide config struct loaded from a TOML file when present, and
//! fully defaulted otherwise rather than failing the run.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub entry_path: PathBuf,
    /// `import "X"` resolves against this fixed prefix (§6).
    pub lib_dir: PathBuf,
    pub release: bool,
    pub disable_warnings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry_path: PathBuf::new(),
            lib_dir: PathBuf::from("lib"),
            release: false,
            disable_warnings: false,
        }
    }
}

impl Config {
    pub fn new(entry_path: PathBuf) -> Self {
        Config {
            entry_path,
            ..Config::default()
        }
    }

    /// Loads `compiler.toml` next to `entry_path`'s directory, if present.
    /// A missing file, or any key missing from it, falls back to defaults —
    /// this never hard-fails the run (teacher's pattern of always
    /// constructing a complete `Config`).
    pub fn load(entry_path: PathBuf) -> Self {
        let config_path = entry_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("compiler.toml");

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Config::default(),
        };

        config.entry_path = entry_path;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(PathBuf::from("/nonexistent/path/main.la"));
        assert_eq!(config.lib_dir, PathBuf::from("lib"));
        assert!(!config.release);
    }
}
