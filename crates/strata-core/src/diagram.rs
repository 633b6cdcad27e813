//! Structural view of a compiled diagram.
//!
//! The diagram engine returns a compiled diagram as a JSON object. Strata only
//! needs a small part of it: the shape list (for titles) and the nested
//! layer, scenario and step collections. Everything else is kept verbatim in
//! an `extra` map so the object can be handed back to the renderer untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layer::LayerKind;

/// A compiled (sub-)diagram as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CompiledDiagram {
    #[serde(default)]
    name: String,

    #[serde(default)]
    shapes: Option<Vec<Shape>>,

    #[serde(default)]
    layers: Option<Vec<CompiledDiagram>>,

    #[serde(default)]
    scenarios: Option<Vec<CompiledDiagram>>,

    #[serde(default)]
    steps: Option<Vec<CompiledDiagram>>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl CompiledDiagram {
    /// Creates an empty diagram with the given board name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a shape.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shapes.get_or_insert_with(Vec::new).push(shape);
        self
    }

    /// Appends a child board to the collection matching `kind`.
    pub fn with_child(mut self, kind: LayerKind, child: CompiledDiagram) -> Self {
        let collection = match kind {
            LayerKind::Layer => &mut self.layers,
            LayerKind::Scenario => &mut self.scenarios,
            LayerKind::Step => &mut self.steps,
        };
        collection.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Returns the board name within its parent collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shapes declared directly on this board.
    pub fn shapes(&self) -> &[Shape] {
        self.shapes.as_deref().unwrap_or_default()
    }

    /// Returns the child boards declared in the collection matching `kind`.
    pub fn children(&self, kind: LayerKind) -> &[CompiledDiagram] {
        let collection = match kind {
            LayerKind::Layer => &self.layers,
            LayerKind::Scenario => &self.scenarios,
            LayerKind::Step => &self.steps,
        };
        collection.as_deref().unwrap_or_default()
    }

    /// Returns engine fields Strata does not interpret.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// A shape on a compiled board.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Shape {
    id: String,

    #[serde(default)]
    label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Shape {
    /// Creates a shape with the given absolute identifier and label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Sets the label language (for example `markdown`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// Default per-target render options reported by the engine.
///
/// The options are opaque to Strata apart from the `target` key it sets for
/// each render call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RenderOptions(Map<String, Value>);

impl RenderOptions {
    /// Wraps a JSON object of render options.
    pub fn new(options: Map<String, Value>) -> Self {
        Self(options)
    }

    /// Returns a copy of the options with `target` set to the given path.
    pub fn for_target(&self, target: &str) -> Map<String, Value> {
        let mut options = self.0.clone();
        options.insert("target".to_string(), Value::String(target.to_string()));
        options
    }

    /// Returns the raw options object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The result of one compile call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    diagram: CompiledDiagram,
    render_options: RenderOptions,
}

impl Compilation {
    pub fn new(diagram: CompiledDiagram, render_options: RenderOptions) -> Self {
        Self {
            diagram,
            render_options,
        }
    }

    pub fn diagram(&self) -> &CompiledDiagram {
        &self.diagram
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }
}
