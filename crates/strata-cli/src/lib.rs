//! Strata CLI library
//!
//! This module contains the core CLI logic for the `prerender` tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::{Path, PathBuf};

use log::info;

use strata::{
    Prerenderer, StrataError,
    config::AppConfig,
    engine::{DiagramEngine, ProcessEngine},
    export,
};

/// Run the Strata CLI application
///
/// Loads the configuration, starts the configured diagram engine bridge and
/// pre-renders the input file into a self-contained HTML document.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `StrataError` for:
/// - Configuration loading errors
/// - File I/O errors
/// - Compile errors
/// - Render errors
pub fn run(args: &Args) -> Result<(), StrataError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let engine = ProcessEngine::new(app_config.engine());
    run_with_engine(args, app_config, engine).map(|_| ())
}

/// Run the pipeline with an explicit configuration and engine.
///
/// Command-line compile options override the configuration. Returns the path
/// of the written document.
///
/// # Errors
///
/// Returns the first error from pre-rendering, assembly or writing. Nothing
/// is written when an error occurs.
pub fn run_with_engine<E: DiagramEngine>(
    args: &Args,
    app_config: AppConfig,
    engine: E,
) -> Result<PathBuf, StrataError> {
    let input = Path::new(&args.input);
    let output = output_path(args);
    info!(
        input_path = args.input,
        output_path:? = output;
        "Processing diagram"
    );

    let app_config = apply_overrides(args, app_config);
    let mut prerenderer = Prerenderer::new(app_config, engine);
    let document = prerenderer.prerender(input)?;

    let title = args
        .title
        .clone()
        .or_else(|| document.title().map(str::to_string))
        .unwrap_or_else(|| input_stem(input));
    let html = prerenderer.export_html(&document, &title)?;

    export::write_atomic(&output, &html)?;

    info!(output_file:? = output, title; "HTML exported successfully");
    Ok(output)
}

/// Applies `-l`, `--theme` and `-s` on top of the configured render section.
fn apply_overrides(args: &Args, app_config: AppConfig) -> AppConfig {
    let mut render = app_config.render().clone();
    if let Some(layout) = args.layout {
        render = render.with_layout(layout);
    }
    if let Some(theme_id) = args.theme_id {
        render = render.with_theme_id(theme_id);
    }
    if args.sketch {
        render = render.with_sketch(true);
    }
    app_config.with_render(render)
}

fn output_path(args: &Args) -> PathBuf {
    match &args.output {
        Some(output) => PathBuf::from(output),
        None => PathBuf::from(format!("{}.html", input_stem(Path::new(&args.input)))),
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diagram".to_string())
}
