//! Library documents: footprints and symbols stored as JSON.
//!
//! This is the exchange format the command line tool reads and writes. It
//! mirrors the object model one to one.
//!
//! ```json
//! {
//!   "footprints": [ { "name": "R_0603", "reference": { ... }, "value": { ... } } ],
//!   "symbols": [ { "name": "R", "fields": [ ... ], "draw": [ ... ] } ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, LibraryResult};
use crate::model::{Footprint, Symbol};

/// A set of footprints and symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Footprints in the document.
    #[serde(default)]
    pub footprints: Vec<Footprint>,
    /// Symbols in the document.
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

impl Library {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a library document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document.
    pub fn open(path: impl AsRef<Path>) -> LibraryResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| LibraryError::file_read(path, e))?;
        serde_json::from_str(&contents).map_err(|e| LibraryError::parse(path, e))
    }

    /// Writes the library to a file as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be serialised or written.
    pub fn save(&self, path: impl AsRef<Path>) -> LibraryResult<()> {
        let path = path.as_ref();
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|source| LibraryError::Serialize { source })?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| LibraryError::file_write(path, e))
    }

    /// Finds a footprint by name.
    #[must_use]
    pub fn footprint(&self, name: &str) -> Option<&Footprint> {
        self.footprints.iter().find(|f| f.name == name)
    }

    /// Finds a symbol by name.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Total number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.footprints.len() + self.symbols.len()
    }

    /// Returns true if the library contains no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty() && self.symbols.is_empty()
    }
}

/// Expands the given paths into library documents.
///
/// Files are taken as-is; directories are searched recursively for `*.json`.
/// The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns an error if a directory path cannot be turned into a search pattern.
pub fn discover_documents(paths: &[PathBuf]) -> LibraryResult<Vec<PathBuf>> {
    let mut found = Vec::new();

    for path in paths {
        if !path.is_dir() {
            found.push(path.clone());
            continue;
        }

        let pattern = path.join("**").join("*.json").display().to_string();
        let entries = glob::glob(&pattern).map_err(|source| LibraryError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        // Unreadable entries are skipped
        found.extend(entries.filter_map(Result::ok).filter(|p| p.is_file()));
    }

    found.sort();
    found.dedup();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses() {
        let lib: Library = serde_json::from_str("{}").unwrap();
        assert!(lib.is_empty());
    }

    #[test]
    fn lookup_by_name() {
        let mut lib = Library::new();
        lib.footprints.push(Footprint::new("R_0603"));
        lib.symbols.push(Symbol::new("R"));

        assert_eq!(lib.len(), 2);
        assert!(lib.footprint("R_0603").is_some());
        assert!(lib.symbol("R").is_some());
        assert!(lib.symbol("C").is_none());
    }

    #[test]
    fn open_missing_file_fails() {
        let result = Library::open("/nonexistent/library.json");
        assert!(matches!(result, Err(LibraryError::FileRead { .. })));
    }

    #[test]
    fn discover_searches_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(nested.join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = discover_documents(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().is_some_and(|e| e == "json")));
    }
}
