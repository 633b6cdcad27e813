//! Strata Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Strata library
//! and command-line tool. It includes:
//!
//! - **Diagram**: The structural view of a compiled diagram ([`diagram`] module)
//! - **Layers**: The navigable layer/scenario/step tree ([`layer`] module)
//! - **Options**: Compile options handed to the diagram engine ([`options`] module)
//! - **Files**: The in-memory file set passed to the compiler ([`files`] module)
//! - **Images**: Rendered images keyed by target path ([`images`] module)

pub mod diagram;
pub mod files;
pub mod images;
pub mod layer;
pub mod options;
