//! The diagram engine collaborator.
//!
//! Strata does not parse, lay out or draw diagrams itself. A [`DiagramEngine`]
//! compiles a [`VirtualFileSet`] into a [`Compilation`] and renders single
//! targets of that compilation to SVG. [`ProcessEngine`] is the production
//! implementation, talking to an external bridge process; tests substitute
//! their own implementations.

mod process;
mod protocol;

pub use process::ProcessEngine;

use std::io;

use thiserror::Error;

use strata_core::{diagram::Compilation, files::VirtualFileSet, options::CompileOptions};

/// Errors reported by a [`DiagramEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start diagram engine `{command}`: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("diagram engine I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("diagram engine exited unexpectedly")]
    Closed,

    #[error("malformed diagram engine response: {0}")]
    Protocol(String),

    /// The engine ran but rejected the request, typically a syntax error.
    #[error("{0}")]
    Failed(String),
}

/// A diagram compiler and renderer.
///
/// Calls are strictly sequential; an implementation may keep state between
/// them (for example a long-running child process).
pub trait DiagramEngine {
    /// Compiles the file set starting at its entry file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the engine cannot be reached or the source
    /// does not compile.
    fn compile(
        &mut self,
        files: &VirtualFileSet,
        options: &CompileOptions,
    ) -> Result<Compilation, EngineError>;

    /// Renders one target of a compilation to an SVG string.
    ///
    /// `target` is a layer path such as `layers.auth`, or `""` for the root.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the engine cannot be reached or rendering fails.
    fn render(&mut self, compilation: &Compilation, target: &str) -> Result<String, EngineError>;
}

impl<E: DiagramEngine + ?Sized> DiagramEngine for &mut E {
    fn compile(
        &mut self,
        files: &VirtualFileSet,
        options: &CompileOptions,
    ) -> Result<Compilation, EngineError> {
        (**self).compile(files, options)
    }

    fn render(&mut self, compilation: &Compilation, target: &str) -> Result<String, EngineError> {
        (**self).render(compilation, target)
    }
}
