//! Error types for Strata operations.
//!
//! This module provides the main error type [`StrataError`] which wraps
//! the error conditions that can occur while resolving, compiling, rendering
//! and exporting a diagram.

use std::{io, path::PathBuf};

use thiserror::Error;

use strata_core::files::VirtualFileSet;

use crate::engine::EngineError;

/// The main error type for Strata operations.
///
/// # Compile Variant
///
/// The `Compile` variant keeps the virtual file set that was handed to the
/// engine so that callers can map engine messages back onto source text.
#[derive(Debug, Error)]
pub enum StrataError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Compile error: {err}")]
    Compile {
        err: EngineError,
        files: Box<VirtualFileSet>,
    },

    #[error("Render error for {}: {err}", target_label(.target))]
    Render { target: String, err: EngineError },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StrataError {
    /// Create a new `Compile` error with the file set that failed to compile.
    pub fn new_compile_error(err: EngineError, files: &VirtualFileSet) -> Self {
        Self::Compile {
            err,
            files: Box::new(files.clone()),
        }
    }

    /// Create a new `Read` error for a file that could not be read.
    pub fn new_read_error(source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new `Render` error for the given target path.
    pub fn new_render_error(err: EngineError, target: impl Into<String>) -> Self {
        Self::Render {
            target: target.into(),
            err,
        }
    }
}

/// Human-readable name of a target path; the empty path is the root board.
pub fn target_label(target: &str) -> String {
    if target.is_empty() {
        "root diagram".to_string()
    } else {
        format!("target `{target}`")
    }
}
