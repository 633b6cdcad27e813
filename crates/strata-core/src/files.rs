//! The virtual file set handed to the diagram compiler.
//!
//! Paths are relative to the resolution base directory and always use `/`
//! separators. Insertion order is the order files were discovered.

use indexmap::IndexMap;

/// In-memory mapping from relative path to source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualFileSet {
    entry: String,
    files: IndexMap<String, String>,
}

impl VirtualFileSet {
    /// Creates a file set whose entry point is `entry`.
    ///
    /// The entry file is inserted with its source text.
    pub fn new(entry: impl Into<String>, source: impl Into<String>) -> Self {
        let entry = entry.into();
        let mut files = IndexMap::new();
        files.insert(entry.clone(), source.into());
        Self { entry, files }
    }

    /// Adds a file. Returns `false` if the path was already present, in which
    /// case the existing text is kept.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) -> bool {
        let path = path.into();
        if self.files.contains_key(&path) {
            return false;
        }
        self.files.insert(path, source.into());
        true
    }

    /// Returns the entry file's path.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Returns the entry file's source text.
    pub fn entry_source(&self) -> &str {
        self.files
            .get(&self.entry)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over the file paths in discovery order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Returns the underlying path → text map.
    pub fn files(&self) -> &IndexMap<String, String> {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_contains_entry() {
        let files = VirtualFileSet::new("main.d2", "a -> b");
        assert_eq!(files.entry(), "main.d2");
        assert_eq!(files.entry_source(), "a -> b");
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_insert_keeps_first_text() {
        let mut files = VirtualFileSet::new("main.d2", "");
        assert!(files.insert("lib/x.d2", "first"));
        assert!(!files.insert("lib/x.d2", "second"));
        assert_eq!(files.get("lib/x.d2"), Some("first"));
    }

    #[test]
    fn test_paths_in_discovery_order() {
        let mut files = VirtualFileSet::new("main.d2", "");
        files.insert("z.d2", "");
        files.insert("a.d2", "");
        let paths: Vec<_> = files.paths().collect();
        assert_eq!(paths, vec!["main.d2", "z.d2", "a.d2"]);
    }
}
