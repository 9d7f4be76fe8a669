//! Component A — stable integer IDs for source file paths.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct SourceManager {
    paths: Vec<PathBuf>,
    by_path: FxHashMap<PathBuf, i32>,
}

impl SourceManager {
    pub fn new() -> Self {
        SourceManager::default()
    }

    /// Assigns a fresh, monotonically increasing ID on first registration.
    /// Re-registering the same path returns the same ID (idempotent).
    pub fn register(&mut self, path: impl AsRef<Path>) -> i32 {
        let path = path.as_ref();
        if let Some(id) = self.by_path.get(path) {
            return *id;
        }

        let id = self.paths.len() as i32;
        self.paths.push(path.to_path_buf());
        self.by_path.insert(path.to_path_buf(), id);
        id
    }

    pub fn resolve(&self, file_id: i32) -> &Path {
        &self.paths[file_id as usize]
    }

    pub fn is_registered(&self, path: impl AsRef<Path>) -> bool {
        self.by_path.contains_key(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrations_are_distinct_and_round_trip() {
        let mut sm = SourceManager::new();
        let a = sm.register("lib/math.la");
        let b = sm.register("src/main.la");
        assert_ne!(a, b);
        assert_eq!(sm.resolve(a), Path::new("lib/math.la"));
        assert_eq!(sm.resolve(b), Path::new("src/main.la"));
    }

    #[test]
    fn re_registration_is_idempotent() {
        let mut sm = SourceManager::new();
        let a = sm.register("src/main.la");
        let a2 = sm.register("src/main.la");
        assert_eq!(a, a2);
        assert!(sm.is_registered("src/main.la"));
        assert!(!sm.is_registered("src/other.la"));
    }
}
