//! JSON-line protocol spoken with the engine bridge.
//!
//! Each request is one JSON object on the bridge's stdin; each response is one
//! JSON object on its stdout.
//!
//! ```text
//! → {"op":"compile","fs":{"main.d2":"..."},"inputPath":"main.d2","options":{"layout":"dagre","sketch":false,"themeID":0}}
//! ← {"ok":true,"diagram":{...},"renderOptions":{...}}
//! → {"op":"render","diagram":{...},"options":{...,"target":"layers.auth"}}
//! ← {"ok":true,"svg":"<svg ...>"}
//! ← {"ok":false,"error":"main.d2:3:1: ..."}
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use strata_core::{
    diagram::{Compilation, CompiledDiagram, RenderOptions},
    options::CompileOptions,
};

use super::EngineError;

/// A request sent to the bridge.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(super) enum Request<'a> {
    Compile {
        fs: &'a IndexMap<String, String>,
        #[serde(rename = "inputPath")]
        input_path: &'a str,
        options: &'a CompileOptions,
    },
    Render {
        diagram: &'a CompiledDiagram,
        options: Map<String, Value>,
    },
}

/// A response read from the bridge.
#[derive(Debug, Default, Deserialize)]
pub(super) struct Response {
    ok: bool,

    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    diagram: Option<CompiledDiagram>,

    #[serde(default, rename = "renderOptions")]
    render_options: Option<RenderOptions>,

    #[serde(default)]
    svg: Option<String>,
}

impl Response {
    /// Parses one response line.
    pub(super) fn parse(line: &str) -> Result<Self, EngineError> {
        serde_json::from_str(line.trim_end()).map_err(|err| EngineError::Protocol(err.to_string()))
    }

    fn check(self) -> Result<Self, EngineError> {
        if self.ok {
            Ok(self)
        } else {
            Err(EngineError::Failed(
                self.error
                    .unwrap_or_else(|| "diagram engine reported an unspecified failure".to_string()),
            ))
        }
    }

    /// Converts a compile response into a [`Compilation`].
    pub(super) fn into_compilation(self) -> Result<Compilation, EngineError> {
        let response = self.check()?;
        let diagram = response
            .diagram
            .ok_or_else(|| EngineError::Protocol("compile response has no diagram".to_string()))?;
        Ok(Compilation::new(
            diagram,
            response.render_options.unwrap_or_default(),
        ))
    }

    /// Converts a render response into the SVG string.
    pub(super) fn into_svg(self) -> Result<String, EngineError> {
        self.check()?
            .svg
            .ok_or_else(|| EngineError::Protocol("render response has no svg".to_string()))
    }
}
