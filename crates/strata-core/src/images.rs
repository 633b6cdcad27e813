//! Rendered images keyed by target path.

use indexmap::IndexMap;
use serde::Serialize;

/// Mapping from target path to rendered SVG.
///
/// The empty path is the document root. Entries keep render order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedImages(IndexMap<String, String>);

impl RenderedImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the image for `path`, replacing any earlier one.
    pub fn insert(&mut self, path: impl Into<String>, svg: impl Into<String>) {
        self.0.insert(path.into(), svg.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Returns the root diagram's image.
    pub fn root(&self) -> Option<&str> {
        self.get("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
