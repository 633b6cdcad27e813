//! Import graph resolution.
//!
//! Diagram sources pull in other files with spread imports (`...@path`) and
//! named imports (`name: @path`). The engine never touches the disk, so every
//! file reachable from the entry must be read up front into a
//! [`VirtualFileSet`].
//!
//! References resolve against the directory of the file that contains them.
//! When nothing is found there, the reference is retried once relative to the
//! base directory. Targets that still cannot be read are skipped with a
//! warning; only an unreadable entry file is an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let files = strata::imports::resolve_imports(Path::new("main.d2"), Path::new("docs"))
//!     .expect("entry file must be readable");
//! for path in files.paths() {
//!     println!("{path}");
//! }
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Component, Path, PathBuf},
    sync::OnceLock,
};

use log::{debug, info, warn};
use regex::Regex;

use strata_core::files::VirtualFileSet;

use crate::{config::DEFAULT_EXTENSION, error::StrataError};

/// Resolves the import graph of `entry` with the default extension.
///
/// See [`ImportResolver::resolve`].
///
/// # Errors
///
/// Returns [`StrataError::Read`] if the entry file cannot be read.
pub fn resolve_imports(entry: &Path, base_dir: &Path) -> Result<VirtualFileSet, StrataError> {
    ImportResolver::new(base_dir).resolve(entry)
}

/// Reads an entry file and everything it imports, transitively.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    base_dir: PathBuf,
    extension: String,
}

impl ImportResolver {
    /// Creates a resolver rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the extension (without the dot) appended to bare references.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Builds the virtual file set reachable from `entry`.
    ///
    /// `entry` may be given relative to the base directory or as a path that
    /// starts with it. Keys of the returned set are relative to the base
    /// directory and use `/` separators.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Read`] if the entry file cannot be read. Unreadable
    /// imports are logged and skipped.
    pub fn resolve(&self, entry: &Path) -> Result<VirtualFileSet, StrataError> {
        let entry_key = self.entry_key(entry);
        info!(entry = entry_key, base_dir:? = self.base_dir; "Resolving imports");

        let entry_path = self.base_dir.join(&entry_key);
        let source = fs::read_to_string(&entry_path)
            .map_err(|err| StrataError::new_read_error(err, entry_path))?;
        let mut files = VirtualFileSet::new(entry_key.clone(), source);

        let mut seen = HashSet::from([entry_key.clone()]);
        let mut failed = HashSet::new();
        let mut worklist = vec![entry_key];

        while let Some(current) = worklist.pop() {
            let references = scan_references(files.get(&current).unwrap_or_default());
            let dir = parent_key(&current);

            for reference in references {
                let file_name = self.file_name_for(&reference);
                let mut resolved = false;
                let mut attempted = false;

                for key in candidate_keys(dir, &file_name) {
                    if seen.contains(&key) {
                        resolved = true;
                        break;
                    }
                    if failed.contains(&key) {
                        continue;
                    }

                    attempted = true;
                    match fs::read_to_string(self.base_dir.join(&key)) {
                        Ok(text) => {
                            debug!(path = key, from = current; "Resolved import");
                            seen.insert(key.clone());
                            files.insert(key.clone(), text);
                            worklist.push(key);
                            resolved = true;
                            break;
                        }
                        Err(err) => {
                            debug!(path = key, err:err; "Import candidate not readable");
                            failed.insert(key);
                        }
                    }
                }

                if !resolved && attempted {
                    warn!(reference, from = current; "Skipping unresolved import");
                }
            }
        }

        info!(files_count = files.len(); "Imports resolved");
        Ok(files)
    }

    fn entry_key(&self, entry: &Path) -> String {
        let relative = entry.strip_prefix(&self.base_dir).unwrap_or(entry);
        normalize(&path_to_key(relative))
    }

    fn file_name_for(&self, reference: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if reference.ends_with(&suffix) {
            reference.to_string()
        } else {
            format!("{reference}{suffix}")
        }
    }
}

/// Extracts import references from source text in order of appearance.
///
/// Comment lines (starting with `#`) are ignored. Quoted references keep
/// their inner text.
pub fn scan_references(source: &str) -> Vec<String> {
    static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
    let re = IMPORT_RE.get_or_init(|| {
        Regex::new(r#"(?:\.\.\.|:\s*)@(?:"([^"]+)"|([^\s;{}\[\]"]+))"#).expect("valid regex")
    });

    source
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| re.captures_iter(line))
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Candidate keys for a reference: directory-relative first, then
/// base-relative. A leading `/` anchors the reference at the base directory.
fn candidate_keys(dir: &str, file_name: &str) -> Vec<String> {
    if let Some(anchored) = file_name.strip_prefix('/') {
        return vec![normalize(anchored)];
    }

    let relative = if dir.is_empty() {
        normalize(file_name)
    } else {
        normalize(&format!("{dir}/{file_name}"))
    };
    let rooted = normalize(file_name);

    if relative == rooted {
        vec![relative]
    } else {
        vec![relative, rooted]
    }
}

/// Directory part of a key, or `""` at the base directory.
fn parent_key(key: &str) -> &str {
    key.rfind('/').map_or("", |index| &key[..index])
}

fn path_to_key(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Folds `.` and `..` segments lexically. Leading `..` segments that climb
/// above the base directory are kept.
fn normalize(key: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in key.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    parts.join("/")
}
