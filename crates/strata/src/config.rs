//! Configuration types for Strata.
//!
//! This module provides configuration structures that control how the diagram
//! engine is started, how diagrams are compiled, and what the exported
//! document links to. All types implement [`serde::Deserialize`] for loading
//! from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`EngineConfig`] - The bridge command wrapping the diagram compiler.
//! - [`RenderConfig`] - Layout engine, theme and sketch mode.
//! - [`ExportConfig`] - Viewer assets referenced by the exported document.
//! - [`ImportConfig`] - Import resolution settings.
//!
//! # Example
//!
//! ```
//! # use strata::config::AppConfig;
//! let config: AppConfig = toml::from_str(r#"
//!     [render]
//!     layout = "elk"
//!     theme_id = 200
//! "#).unwrap();
//! assert_eq!(config.render().theme_id(), 200);
//! assert_eq!(config.imports().extension(), "d2");
//! ```

use serde::Deserialize;

use strata_core::options::{CompileOptions, LayoutEngine};

/// Command used to start the diagram engine bridge unless configured otherwise.
pub const DEFAULT_ENGINE_COMMAND: &str = "strata-d2-bridge";

/// Source file extension appended to import references that lack it.
pub const DEFAULT_EXTENSION: &str = "d2";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine bridge section.
    #[serde(default)]
    engine: EngineConfig,

    /// Compile settings section.
    #[serde(default)]
    render: RenderConfig,

    /// Export settings section.
    #[serde(default)]
    export: ExportConfig,

    /// Import resolution section.
    #[serde(default)]
    imports: ImportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        engine: EngineConfig,
        render: RenderConfig,
        export: ExportConfig,
        imports: ImportConfig,
    ) -> Self {
        Self {
            engine,
            render,
            export,
            imports,
        }
    }

    /// Returns a copy with the compile settings replaced.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    pub fn imports(&self) -> &ImportConfig {
        &self.imports
    }
}

/// The external process that wraps the diagram compiler/renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Executable to run.
    #[serde(default = "default_engine_command")]
    command: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    args: Vec<String>,
}

impl EngineConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            args: Vec::new(),
        }
    }
}

/// Compile settings handed to the engine.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RenderConfig {
    /// [`LayoutEngine`] used by the compiler.
    #[serde(default)]
    layout: LayoutEngine,

    /// Numeric theme identifier.
    #[serde(default)]
    theme_id: i64,

    /// Hand-drawn rendering.
    #[serde(default)]
    sketch: bool,
}

impl RenderConfig {
    pub fn new(layout: LayoutEngine, theme_id: i64, sketch: bool) -> Self {
        Self {
            layout,
            theme_id,
            sketch,
        }
    }

    pub fn with_layout(mut self, layout: LayoutEngine) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_theme_id(mut self, theme_id: i64) -> Self {
        self.theme_id = theme_id;
        self
    }

    pub fn with_sketch(mut self, sketch: bool) -> Self {
        self.sketch = sketch;
        self
    }

    pub fn layout(&self) -> LayoutEngine {
        self.layout
    }

    pub fn theme_id(&self) -> i64 {
        self.theme_id
    }

    pub fn sketch(&self) -> bool {
        self.sketch
    }

    /// Returns the [`CompileOptions`] described by this section.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::new(self.layout, self.sketch, self.theme_id)
    }
}

/// Assets referenced by the exported document.
///
/// There is no default viewer; a document exported without one carries its
/// payload but is not interactive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// URL of the interactive viewer script.
    #[serde(default)]
    viewer_script: Option<String>,

    /// Optional stylesheet URL linked from the document head.
    #[serde(default)]
    viewer_stylesheet: Option<String>,
}

impl ExportConfig {
    pub fn new(viewer_script: impl Into<String>, viewer_stylesheet: Option<String>) -> Self {
        Self {
            viewer_script: Some(viewer_script.into()),
            viewer_stylesheet,
        }
    }

    pub fn viewer_script(&self) -> Option<&str> {
        self.viewer_script.as_deref()
    }

    pub fn viewer_stylesheet(&self) -> Option<&str> {
        self.viewer_stylesheet.as_deref()
    }
}

/// Import resolution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Extension (without the dot) appended to bare import references.
    #[serde(default = "default_extension")]
    extension: String,
}

impl ImportConfig {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

fn default_engine_command() -> String {
    DEFAULT_ENGINE_COMMAND.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.engine().command(), DEFAULT_ENGINE_COMMAND);
        assert!(config.engine().args().is_empty());
        assert_eq!(config.render().layout(), LayoutEngine::Dagre);
        assert_eq!(config.render().theme_id(), 0);
        assert!(!config.render().sketch());
        assert_eq!(config.export().viewer_script(), None);
        assert_eq!(config.export().viewer_stylesheet(), None);
        assert_eq!(config.imports().extension(), "d2");
    }

    #[test]
    fn test_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [engine]
            command = "node"
            args = ["bridge.mjs"]

            [render]
            layout = "elk"
            theme_id = 300
            sketch = true

            [export]
            viewer_script = "viewer.js"
            viewer_stylesheet = "viewer.css"

            [imports]
            extension = "diagram"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine().command(), "node");
        assert_eq!(config.engine().args(), ["bridge.mjs".to_string()]);
        assert_eq!(
            config.render().compile_options(),
            CompileOptions::new(LayoutEngine::Elk, true, 300)
        );
        assert_eq!(config.export().viewer_script(), Some("viewer.js"));
        assert_eq!(config.export().viewer_stylesheet(), Some("viewer.css"));
        assert_eq!(config.imports().extension(), "diagram");
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[render]\nlayout = \"tala\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_render_overrides() {
        let render = RenderConfig::default()
            .with_layout(LayoutEngine::Elk)
            .with_theme_id(4)
            .with_sketch(true);
        let config = AppConfig::default().with_render(render);

        assert_eq!(config.render().layout(), LayoutEngine::Elk);
        assert_eq!(config.render().theme_id(), 4);
        assert!(config.render().sketch());
    }
}
