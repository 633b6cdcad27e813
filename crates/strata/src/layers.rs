//! Layer tree extraction from a compiled diagram.
//!
//! Walks the layers, scenarios and steps of a [`CompiledDiagram`] and builds
//! the matching [`LayerNode`] forest, attaching a title to each node when the
//! board declares a title shape.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use strata_core::{
    diagram::{CompiledDiagram, Shape},
    layer::{LayerKind, LayerNode},
};

/// Top-level namespace holding diagram configuration rather than content.
const RESERVED_NAMESPACE: &str = "vars";

/// Builds the navigable layer forest of a compiled diagram.
///
/// Collections are visited in the order layers, scenarios, steps; within a
/// collection the engine's order is kept.
pub fn extract_layers(diagram: &CompiledDiagram) -> Vec<LayerNode> {
    let layers = extract_children(diagram, "");
    debug!(root_count = layers.len(); "Layer tree extracted");
    layers
}

/// Returns the title of the root board, if it declares one.
pub fn root_title(diagram: &CompiledDiagram) -> Option<String> {
    extract_title(diagram.shapes())
}

fn extract_children(diagram: &CompiledDiagram, parent_path: &str) -> Vec<LayerNode> {
    LayerKind::ALL
        .iter()
        .flat_map(|&kind| {
            diagram.children(kind).iter().map(move |child| {
                let node = LayerNode::new(kind, child.name(), parent_path)
                    .with_optional_title(extract_title(child.shapes()));
                let children = extract_children(child, node.path());
                node.with_children(children)
            })
        })
        .collect()
}

/// Finds the first title shape and derives a display title from its label.
fn extract_title(shapes: &[Shape]) -> Option<String> {
    shapes
        .iter()
        .find(|shape| is_title_shape(shape.id()))
        .map(|shape| title_from_label(shape.label(), shape.language()))
}

fn is_title_shape(id: &str) -> bool {
    let in_reserved = id == RESERVED_NAMESPACE
        || id
            .strip_prefix(RESERVED_NAMESPACE)
            .is_some_and(|rest| rest.starts_with('.'));
    !in_reserved && (id == "title" || id.ends_with(".title"))
}

/// Derives a single-line title from a shape label.
///
/// Markdown blocks (`|md ... |`) are unwrapped first. A heading line wins;
/// otherwise the first non-empty line is used; otherwise the raw label.
fn title_from_label(label: &str, language: Option<&str>) -> String {
    static HEADING_RE: OnceLock<Regex> = OnceLock::new();
    let heading = HEADING_RE
        .get_or_init(|| Regex::new(r"^\s*#{1,6}\s+(.*?)[\s#]*$").expect("valid regex"));

    let text = strip_markdown_block(label);
    let is_markdown = text.len() != label.len() || language == Some("markdown");

    if is_markdown || text.lines().any(|line| heading.is_match(line)) {
        let found = text
            .lines()
            .filter_map(|line| heading.captures(line))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|title| !title.is_empty());
        if let Some(title) = found {
            return title.to_string();
        }
    }

    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(label)
        .to_string()
}

/// Removes a `|md ... |` wrapper (any number of pipes) if present.
fn strip_markdown_block(label: &str) -> &str {
    let trimmed = label.trim();
    let pipes = trimmed.len() - trimmed.trim_start_matches('|').len();
    if pipes == 0 {
        return label;
    }

    let Some(body) = trimmed[pipes..].strip_prefix("md") else {
        return label;
    };
    body.trim_end().trim_end_matches('|')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(name: &str) -> CompiledDiagram {
        CompiledDiagram::new(name)
    }

    #[test]
    fn test_paths_for_nested_scenario() {
        let diagram = board("").with_child(
            LayerKind::Layer,
            board("auth").with_child(LayerKind::Scenario, board("timeout")),
        );

        let layers = extract_layers(&diagram);

        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].path(), "layers.auth");
        assert_eq!(layers[0].kind(), LayerKind::Layer);
        assert_eq!(layers[0].children()[0].path(), "layers.auth.scenarios.timeout");
        assert_eq!(layers[0].children()[0].kind(), LayerKind::Scenario);
    }

    #[test]
    fn test_collection_order_and_engine_order() {
        let diagram = board("")
            .with_child(LayerKind::Step, board("s1"))
            .with_child(LayerKind::Scenario, board("b"))
            .with_child(LayerKind::Layer, board("z"))
            .with_child(LayerKind::Layer, board("a"))
            .with_child(LayerKind::Step, board("s0"));

        let paths: Vec<_> = extract_layers(&diagram)
            .iter()
            .map(|node| node.path().to_string())
            .collect();

        assert_eq!(
            paths,
            vec!["layers.z", "layers.a", "scenarios.b", "steps.s1", "steps.s0"]
        );
    }

    #[test]
    fn test_title_from_plain_label() {
        let diagram = board("").with_child(
            LayerKind::Layer,
            board("auth").with_shape(Shape::new("title", "\n  Authentication flow\nmore")),
        );

        let layers = extract_layers(&diagram);
        assert_eq!(layers[0].title(), Some("Authentication flow"));
    }

    #[test]
    fn test_title_from_markdown_block() {
        let shape = Shape::new("page.title", "|md\n  intro text\n  ## Sign in ##\n|");
        let diagram = board("").with_child(LayerKind::Layer, board("auth").with_shape(shape));

        assert_eq!(extract_layers(&diagram)[0].title(), Some("Sign in"));
    }

    #[test]
    fn test_title_from_markdown_language() {
        let shape = Shape::new("title", "Preface\n# Checkout").with_language("markdown");
        assert_eq!(extract_title(&[shape]), Some("Checkout".to_string()));
    }

    #[test]
    fn test_markdown_without_heading_uses_first_line() {
        let shape = Shape::new("title", "|md\n\n  plain words\n|");
        assert_eq!(extract_title(&[shape]), Some("plain words".to_string()));
    }

    #[test]
    fn test_blank_label_falls_back_to_raw() {
        let shape = Shape::new("title", "   ");
        assert_eq!(extract_title(&[shape]), Some("   ".to_string()));
    }

    #[test]
    fn test_reserved_namespace_excluded() {
        let shapes = [
            Shape::new("vars.title", "Config"),
            Shape::new("subtitle", "Not a title"),
            Shape::new("header.title", "Real"),
        ];
        assert_eq!(extract_title(&shapes), Some("Real".to_string()));
    }

    #[test]
    fn test_no_title_shape() {
        let diagram = board("")
            .with_child(LayerKind::Layer, board("auth").with_shape(Shape::new("a", "A")));
        let layers = extract_layers(&diagram);
        assert_eq!(layers[0].title(), None);
        assert_eq!(layers[0].display_name(), "auth");
    }

    #[test]
    fn test_root_title() {
        let diagram = board("").with_shape(Shape::new("title", "# System overview"));
        assert_eq!(root_title(&diagram), Some("System overview".to_string()));
        assert_eq!(root_title(&board("")), None);
    }

    #[test]
    fn test_is_title_shape() {
        assert!(is_title_shape("title"));
        assert!(is_title_shape("a.b.title"));
        assert!(!is_title_shape("subtitle"));
        assert!(!is_title_shape("title.text"));
        assert!(!is_title_shape("vars.title"));
        assert!(!is_title_shape("vars.d2-config.title"));
        assert!(is_title_shape("variables.title"));
    }
}
