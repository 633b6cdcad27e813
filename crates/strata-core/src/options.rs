//! Compile options passed to the diagram engine.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Layout engine used by the diagram compiler.
///
/// - `Dagre` - Hierarchical layout (default)
/// - `Elk` - Eclipse Layout Kernel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutEngine {
    #[default]
    Dagre,
    Elk,
}

impl FromStr for LayoutEngine {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dagre" => Ok(Self::Dagre),
            "elk" => Ok(Self::Elk),
            _ => Err("Unsupported layout engine"),
        }
    }
}

impl From<LayoutEngine> for &'static str {
    fn from(val: LayoutEngine) -> Self {
        match val {
            LayoutEngine::Dagre => "dagre",
            LayoutEngine::Elk => "elk",
        }
    }
}

impl Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Options for a single compile call.
///
/// Serializes to the engine's field names (`layout`, `sketch`, `themeID`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompileOptions {
    layout: LayoutEngine,
    sketch: bool,
    #[serde(rename = "themeID")]
    theme_id: i64,
}

impl CompileOptions {
    pub fn new(layout: LayoutEngine, sketch: bool, theme_id: i64) -> Self {
        Self {
            layout,
            sketch,
            theme_id,
        }
    }

    pub fn layout(&self) -> LayoutEngine {
        self.layout
    }

    pub fn sketch(&self) -> bool {
        self.sketch
    }

    pub fn theme_id(&self) -> i64 {
        self.theme_id
    }
}
