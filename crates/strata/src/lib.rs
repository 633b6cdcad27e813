//! Strata - Browse and pre-render layered diagram documents.
//!
//! A diagram document may declare layers, scenarios and steps: named
//! sub-diagrams that are rendered independently. Strata resolves a document's
//! imports, compiles it through an external [`DiagramEngine`], renders every
//! sub-diagram and assembles the results into a single offline HTML file.

pub mod config;
pub mod engine;
pub mod export;
pub mod imports;
pub mod layers;
pub mod svg;

mod error;

pub use strata_core::{diagram, files, images, layer, options};

pub use error::{StrataError, target_label};

use std::path::Path;

use log::{debug, error, info, trace};

use strata_core::{
    diagram::Compilation,
    files::VirtualFileSet,
    images::RenderedImages,
    layer::{self as layer_tree, LayerNode},
};

use config::AppConfig;
use engine::DiagramEngine;
use imports::ImportResolver;

/// Pipeline for turning a diagram file into a pre-rendered document.
///
/// Steps run strictly in order: resolve imports, compile, render the root,
/// then render every layer path in pre-order. The first failure aborts the run.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use strata::{Prerenderer, config::AppConfig, engine::ProcessEngine};
///
/// let config = AppConfig::default();
/// let engine = ProcessEngine::new(config.engine());
/// let mut prerenderer = Prerenderer::new(config, engine);
///
/// let document = prerenderer
///     .prerender(Path::new("docs/system.d2"))
///     .expect("Failed to pre-render");
///
/// let html = prerenderer
///     .export_html(&document, "System")
///     .expect("Failed to assemble");
/// ```
pub struct Prerenderer<E> {
    config: AppConfig,
    engine: E,
}

impl<E: DiagramEngine> Prerenderer<E> {
    /// Create a new pipeline with the given configuration and engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `engine` - The diagram compiler/renderer
    pub fn new(config: AppConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the engine, consuming the pipeline.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Reads `entry` and every file it imports.
    ///
    /// Imports resolve against the entry file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Read`] if the entry file cannot be read.
    pub fn resolve(&self, entry: &Path) -> Result<VirtualFileSet, StrataError> {
        let base_dir = entry.parent().unwrap_or_else(|| Path::new(""));
        ImportResolver::new(base_dir)
            .with_extension(self.config.imports().extension())
            .resolve(entry)
    }

    /// Compiles a file set with the configured compile options.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Compile`] if the engine fails.
    pub fn compile(&mut self, files: &VirtualFileSet) -> Result<Compilation, StrataError> {
        let options = self.config.render().compile_options();
        info!(
            entry = files.entry(),
            layout:% = options.layout(),
            theme_id = options.theme_id(),
            sketch = options.sketch();
            "Compiling diagram"
        );

        let compilation = self.engine.compile(files, &options).map_err(|err| {
            error!(entry = files.entry(), err:% = err; "Compilation failed");
            StrataError::new_compile_error(err, files)
        })?;

        debug!("Diagram compiled successfully");
        trace!(diagram:? = compilation.diagram(); "Compiled diagram");
        Ok(compilation)
    }

    /// Renders the root and every layer path, normalizing image dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Render`] naming the first target that failed.
    pub fn render_all(
        &mut self,
        compilation: &Compilation,
        layers: &[LayerNode],
    ) -> Result<RenderedImages, StrataError> {
        let targets = layer_tree::flatten(layers);
        info!(targets_count = targets.len() + 1; "Rendering targets");

        let mut images = RenderedImages::new();
        for target in std::iter::once(String::new()).chain(targets) {
            let svg = self.engine.render(compilation, &target).map_err(|err| {
                error!(target_path = target, err:% = err; "Render failed");
                StrataError::new_render_error(err, target.as_str())
            })?;
            debug!(target_path = target, bytes = svg.len(); "Target rendered");

            let svg = svg::normalize_dimensions(&svg).into_owned();
            images.insert(target, svg);
        }

        Ok(images)
    }

    /// Runs the whole pipeline for `entry` up to, but not including, assembly.
    ///
    /// # Errors
    ///
    /// Returns the first I/O, compile or render error.
    pub fn prerender(&mut self, entry: &Path) -> Result<Prerendered, StrataError> {
        info!(input_path:? = entry; "Pre-rendering diagram");

        let files = self.resolve(entry)?;
        let compilation = self.compile(&files)?;

        let layers = layers::extract_layers(compilation.diagram());
        let title = layers::root_title(compilation.diagram());
        let images = self.render_all(&compilation, &layers)?;

        info!(images_count = images.len(); "Diagram pre-rendered");
        Ok(Prerendered {
            title,
            layers,
            images,
        })
    }

    /// Assembles a pre-rendered diagram into an HTML document.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Serialize`] if the payload cannot be serialized.
    pub fn export_html(&self, document: &Prerendered, title: &str) -> Result<String, StrataError> {
        export::assemble(
            title,
            document.layers(),
            document.images(),
            self.config.export(),
        )
    }
}

/// The output of [`Prerenderer::prerender`].
#[derive(Debug, Clone)]
pub struct Prerendered {
    title: Option<String>,
    layers: Vec<LayerNode>,
    images: RenderedImages,
}

impl Prerendered {
    /// Title declared on the root board, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    pub fn images(&self) -> &RenderedImages {
        &self.images
    }
}
