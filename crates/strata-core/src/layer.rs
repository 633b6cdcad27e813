//! The navigable layer/scenario/step hierarchy.
//!
//! A compiled diagram may declare three kinds of named sub-diagrams. Each one
//! is represented by a [`LayerNode`] whose [`path`](LayerNode::path) is the
//! fully-qualified dotted address used both as the render target and as the
//! key into [`RenderedImages`](crate::images::RenderedImages).
//!
//! # Example
//!
//! ```
//! # use strata_core::layer::{LayerKind, LayerNode, flatten};
//! let timeout = LayerNode::new(LayerKind::Scenario, "timeout", "layers.auth");
//! let auth = LayerNode::new(LayerKind::Layer, "auth", "").with_child(timeout);
//!
//! assert_eq!(auth.path(), "layers.auth");
//! assert_eq!(
//!     flatten(&[auth]),
//!     vec!["layers.auth", "layers.auth.scenarios.timeout"]
//! );
//! ```

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The kind of a sub-diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Layer,
    Scenario,
    Step,
}

impl LayerKind {
    /// All kinds, in the order their collections are walked.
    pub const ALL: [LayerKind; 3] = [LayerKind::Layer, LayerKind::Scenario, LayerKind::Step];

    /// Returns the collection keyword used as a path segment.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Layer => "layers",
            Self::Scenario => "scenarios",
            Self::Step => "steps",
        }
    }
}

impl From<LayerKind> for &'static str {
    fn from(val: LayerKind) -> Self {
        match val {
            LayerKind::Layer => "layer",
            LayerKind::Scenario => "scenario",
            LayerKind::Step => "step",
        }
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A node in the navigable hierarchy.
///
/// Nodes are built once per compile and never mutated afterwards; the
/// `with_*` methods exist for construction only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LayerNode {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: LayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    children: Vec<LayerNode>,
}

impl LayerNode {
    /// Creates a node named `name` under the node at `parent_path`.
    ///
    /// An empty `parent_path` denotes the document root.
    ///
    /// # Arguments
    ///
    /// * `kind` - Which collection the node was declared in.
    /// * `name` - Identifier within the parent's collection.
    /// * `parent_path` - Path of the parent node, or `""` at the root.
    pub fn new(kind: LayerKind, name: impl Into<String>, parent_path: &str) -> Self {
        let name = name.into();
        let path = child_path(parent_path, kind, &name);
        Self {
            name,
            path,
            kind,
            title: None,
            children: Vec::new(),
        }
    }

    /// Sets the human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the optional title.
    pub fn with_optional_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: LayerNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child nodes, preserving their order.
    pub fn with_children(mut self, children: impl IntoIterator<Item = LayerNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the title if present, otherwise the bare name.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn children(&self) -> &[LayerNode] {
        &self.children
    }
}

/// Joins a parent path, a collection keyword and a name into a target path.
///
/// ```
/// # use strata_core::layer::{LayerKind, child_path};
/// assert_eq!(child_path("", LayerKind::Layer, "auth"), "layers.auth");
/// assert_eq!(
///     child_path("layers.auth", LayerKind::Scenario, "timeout"),
///     "layers.auth.scenarios.timeout"
/// );
/// ```
pub fn child_path(parent_path: &str, kind: LayerKind, name: &str) -> String {
    if parent_path.is_empty() {
        format!("{}.{name}", kind.keyword())
    } else {
        format!("{parent_path}.{}.{name}", kind.keyword())
    }
}

/// Flattens a forest into the pre-order list of target paths.
///
/// Every node is visited exactly once and parents precede their children.
/// Siblings keep their original order.
pub fn flatten(nodes: &[LayerNode]) -> Vec<String> {
    let mut paths = Vec::new();
    // Reversed so the first sibling is popped first.
    let mut stack: Vec<&LayerNode> = nodes.iter().rev().collect();

    while let Some(node) = stack.pop() {
        paths.push(node.path.clone());
        stack.extend(node.children.iter().rev());
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forest() -> Vec<LayerNode> {
        let auth = LayerNode::new(LayerKind::Layer, "auth", "")
            .with_child(LayerNode::new(
                LayerKind::Scenario,
                "timeout",
                "layers.auth",
            ))
            .with_child(
                LayerNode::new(LayerKind::Step, "one", "layers.auth")
                    .with_child(LayerNode::new(LayerKind::Layer, "zoom", "layers.auth.steps.one")),
            );
        let billing = LayerNode::new(LayerKind::Layer, "billing", "");
        vec![auth, billing]
    }

    #[test]
    fn test_paths_follow_collection_keywords() {
        let forest = sample_forest();
        assert_eq!(forest[0].path(), "layers.auth");
        assert_eq!(forest[0].children()[0].path(), "layers.auth.scenarios.timeout");
        assert_eq!(forest[0].children()[1].path(), "layers.auth.steps.one");
        assert_eq!(
            forest[0].children()[1].children()[0].path(),
            "layers.auth.steps.one.layers.zoom"
        );
    }

    #[test]
    fn test_flatten_pre_order() {
        let paths = flatten(&sample_forest());
        assert_eq!(
            paths,
            vec![
                "layers.auth",
                "layers.auth.scenarios.timeout",
                "layers.auth.steps.one",
                "layers.auth.steps.one.layers.zoom",
                "layers.billing",
            ]
        );
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let node = LayerNode::new(LayerKind::Layer, "auth", "");
        assert_eq!(node.display_name(), "auth");

        let titled = node.with_title("Authentication");
        assert_eq!(titled.display_name(), "Authentication");
    }

    #[test]
    fn test_serialized_shape() {
        let node = LayerNode::new(LayerKind::Scenario, "timeout", "layers.auth");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "timeout",
                "path": "layers.auth.scenarios.timeout",
                "type": "scenario",
                "children": [],
            })
        );
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn kind_strategy() -> impl Strategy<Value = LayerKind> {
        prop_oneof![
            Just(LayerKind::Layer),
            Just(LayerKind::Scenario),
            Just(LayerKind::Step),
        ]
    }

    /// Shape of a forest without paths: (kind, children) per node.
    #[derive(Debug, Clone)]
    struct Sketch(LayerKind, Vec<Sketch>);

    fn sketch_strategy() -> impl Strategy<Value = Vec<Sketch>> {
        let leaf = kind_strategy().prop_map(|kind| Sketch(kind, Vec::new()));
        let tree = leaf.prop_recursive(4, 48, 4, |inner| {
            (kind_strategy(), prop::collection::vec(inner, 0..4))
                .prop_map(|(kind, children)| Sketch(kind, children))
        });
        prop::collection::vec(tree, 0..5)
    }

    /// Names siblings by index so every path in the forest is unique.
    fn build(sketches: &[Sketch], parent_path: &str) -> Vec<LayerNode> {
        sketches
            .iter()
            .enumerate()
            .map(|(index, Sketch(kind, children))| {
                let node = LayerNode::new(*kind, format!("n{index}"), parent_path);
                let children = build(children, node.path());
                node.with_children(children)
            })
            .collect()
    }

    fn recursive_pre_order(nodes: &[LayerNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.path().to_string());
            recursive_pre_order(node.children(), out);
        }
    }

    fn count(nodes: &[LayerNode]) -> usize {
        nodes.iter().map(|n| 1 + count(n.children())).sum()
    }

    // ===================
    // Property Test Functions
    // ===================

    /// The explicit-stack walk must agree with a recursive pre-order walk.
    fn check_flatten_matches_recursive(forest: &[LayerNode]) -> Result<(), TestCaseError> {
        let mut expected = Vec::new();
        recursive_pre_order(forest, &mut expected);
        prop_assert_eq!(flatten(forest), expected);
        Ok(())
    }

    /// Every node appears exactly once.
    fn check_flatten_visits_each_node_once(forest: &[LayerNode]) -> Result<(), TestCaseError> {
        let paths = flatten(forest);
        prop_assert_eq!(paths.len(), count(forest));

        let mut deduped = paths.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), paths.len());
        Ok(())
    }

    /// A child's path is always listed after its parent's path.
    fn check_parents_precede_children(forest: &[LayerNode]) -> Result<(), TestCaseError> {
        let paths = flatten(forest);
        for (index, path) in paths.iter().enumerate() {
            for earlier in &paths[..index] {
                prop_assert!(
                    !earlier.starts_with(&format!("{path}.")),
                    "{earlier} listed before its ancestor {path}"
                );
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn flatten_matches_recursive(sketches in sketch_strategy()) {
            check_flatten_matches_recursive(&build(&sketches, ""))?;
        }

        #[test]
        fn flatten_visits_each_node_once(sketches in sketch_strategy()) {
            check_flatten_visits_each_node_once(&build(&sketches, ""))?;
        }

        #[test]
        fn parents_precede_children(sketches in sketch_strategy()) {
            check_parents_precede_children(&build(&sketches, ""))?;
        }
    }
}
