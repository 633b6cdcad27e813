//! Command-line argument definitions for the Strata CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, document title,
//! compile options, configuration file selection, and logging verbosity.

use clap::Parser;

use strata::options::LayoutEngine;

/// Pre-render a layered diagram into a self-contained HTML document
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output HTML file (defaults to `<input stem>.html`)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Document title (defaults to the diagram's title or the input file stem)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Layout engine (dagre, elk)
    #[arg(short, long)]
    pub layout: Option<LayoutEngine>,

    /// Theme identifier
    #[arg(long = "theme")]
    pub theme_id: Option<i64>,

    /// Render in hand-drawn sketch style
    #[arg(short, long)]
    pub sketch: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
