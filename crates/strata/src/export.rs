//! Static HTML export.
//!
//! An exported document is a single HTML file that inlines the layer tree and
//! every rendered image as a JSON payload, and loads the interactive viewer
//! from an external script when one is configured. The viewer reads the payload from the
//! [`PAYLOAD_GLOBAL`] global at load time.

use std::{fmt::Write as _, fs, io::Write as _, path::Path};

use log::{debug, info, warn};
use serde::Serialize;
use tempfile::NamedTempFile;

use strata_core::{images::RenderedImages, layer::LayerNode};

use crate::{config::ExportConfig, error::StrataError};

/// Name of the global the viewer reads its data from.
pub const PAYLOAD_GLOBAL: &str = "window.__STRATA_DATA__";

/// The data embedded in an exported document.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    title: &'a str,
    layers: &'a [LayerNode],
    svgs: &'a RenderedImages,
}

/// Assembles a self-contained HTML document.
///
/// # Arguments
///
/// * `title` - Document title, shown in the browser and passed to the viewer.
/// * `layers` - The navigable layer forest.
/// * `images` - Rendered images keyed by layer path (`""` for the root).
/// * `assets` - Viewer script and stylesheet locations.
///
/// # Errors
///
/// Returns [`StrataError::Serialize`] if the payload cannot be serialized.
pub fn assemble(
    title: &str,
    layers: &[LayerNode],
    images: &RenderedImages,
    assets: &ExportConfig,
) -> Result<String, StrataError> {
    let payload = serde_json::to_string(&Payload {
        title,
        layers,
        svgs: images,
    })?;
    let payload = escape_script_payload(&payload);
    if assets.viewer_script().is_none() {
        warn!("No viewer script configured; set `[export] viewer_script` to make the document interactive");
    }
    debug!(payload_bytes = payload.len(), images_count = images.len(); "Payload serialized");

    let mut html = String::with_capacity(payload.len() + 1024);
    write_document(&mut html, title, &payload, assets)
        .expect("Writing to String buffer is infallible");
    Ok(html)
}

fn write_document(
    out: &mut String,
    title: &str,
    payload: &str,
    assets: &ExportConfig,
) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    )?;
    writeln!(out, "<title>{}</title>", escape_html(title))?;
    if let Some(stylesheet) = assets.viewer_stylesheet() {
        writeln!(
            out,
            "<link rel=\"stylesheet\" href=\"{}\">",
            escape_html(stylesheet)
        )?;
    }
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div id=\"app\"></div>")?;
    writeln!(out, "<script>{PAYLOAD_GLOBAL} = {payload};</script>")?;
    if let Some(script) = assets.viewer_script() {
        writeln!(out, "<script src=\"{}\"></script>", escape_html(script))?;
    }
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

/// Escapes text for use in HTML content and double-quoted attributes.
///
/// ```
/// # use strata::export::escape_html;
/// assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes serialized JSON so it can sit inside a `<script>` element.
///
/// Angle brackets and ampersands become JSON unicode escapes, so the payload
/// can never close the surrounding element while still decoding to the same
/// value. Line and paragraph separators are escaped as well.
pub fn escape_script_payload(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Writes `contents` to `path` atomically.
///
/// The document is written to a temporary file in the destination directory
/// and renamed into place, so a failed write never leaves a partial file.
///
/// # Errors
///
/// Returns [`StrataError::Io`] if the destination directory does not exist
/// or the file cannot be written.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StrataError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(StrataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("output directory `{}` does not exist", dir.display()),
        )));
    }

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|err| StrataError::Io(err.error))?;

    let bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or_default();
    info!(path:? = path, bytes; "Document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use strata_core::layer::LayerKind;
    use tempfile::tempdir;

    use super::*;

    fn sample() -> (Vec<LayerNode>, RenderedImages) {
        let layers = vec![
            LayerNode::new(LayerKind::Layer, "auth", "")
                .with_title("Auth")
                .with_child(LayerNode::new(LayerKind::Scenario, "timeout", "layers.auth")),
        ];
        let mut images = RenderedImages::new();
        images.insert("", "<svg viewBox=\"0 0 1 1\"></svg>");
        images.insert("layers.auth", "<svg><text>a & b</text></svg>");
        images.insert("layers.auth.scenarios.timeout", "<svg></svg>");
        (layers, images)
    }

    /// Extracts the JSON assigned to the payload global.
    fn embedded_payload(html: &str) -> serde_json::Value {
        let start = html.find(PAYLOAD_GLOBAL).unwrap() + PAYLOAD_GLOBAL.len() + " = ".len();
        let end = start + html[start..].find(";</script>").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_title_is_escaped() {
        let (layers, images) = sample();
        let html = assemble(
            "<script>alert(1)</script>",
            &layers,
            &images,
            &ExportConfig::default(),
        )
        .unwrap();

        assert!(html.contains("<title>&lt;script&gt;alert(1)&lt;/script&gt;</title>"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn test_payload_has_no_raw_markup() {
        let (layers, images) = sample();
        let html = assemble("t", &layers, &images, &ExportConfig::default()).unwrap();

        let start = html.find(PAYLOAD_GLOBAL).unwrap();
        let end = start + html[start..].find("</script>").unwrap();
        let script_body = &html[start..end];
        assert!(!script_body.contains('<'));
        assert!(!script_body.contains('>'));
        assert!(!script_body.contains('&'));
    }

    #[test]
    fn test_payload_round_trips() {
        let (layers, images) = sample();
        let html = assemble("</script><b>", &layers, &images, &ExportConfig::default()).unwrap();
        let payload = embedded_payload(&html);

        assert_eq!(payload["title"], "</script><b>");
        assert_eq!(payload["layers"][0]["path"], "layers.auth");
        assert_eq!(payload["layers"][0]["type"], "layer");
        assert_eq!(payload["layers"][0]["title"], "Auth");
        assert_eq!(
            payload["layers"][0]["children"][0]["path"],
            "layers.auth.scenarios.timeout"
        );
        assert_eq!(payload["svgs"]["layers.auth"], "<svg><text>a & b</text></svg>");
        assert_eq!(payload["svgs"][""], "<svg viewBox=\"0 0 1 1\"></svg>");
    }

    #[test]
    fn test_viewer_assets_referenced() {
        let (layers, images) = sample();
        let assets = ExportConfig::new("https://example.com/v.js?a=1&b=2", Some("v.css".into()));
        let html = assemble("t", &layers, &images, &assets).unwrap();

        assert!(html.contains("<script src=\"https://example.com/v.js?a=1&amp;b=2\"></script>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"v.css\">"));
    }

    #[test]
    fn test_no_viewer_script_by_default() {
        let (layers, images) = sample();
        let html = assemble("t", &layers, &images, &ExportConfig::default()).unwrap();

        assert!(!html.contains("<script src="));
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains(PAYLOAD_GLOBAL));
    }

    #[test]
    fn test_escape_script_payload_separators() {
        assert_eq!(
            escape_script_payload("\u{2028}\u{2029}"),
            "\\u2028\\u2029"
        );
    }

    #[test]
    fn test_write_atomic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.html");

        write_atomic(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");

        // Overwrites an existing file.
        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.html");

        assert!(matches!(write_atomic(&path, "x"), Err(StrataError::Io(_))));
        assert!(!path.exists());
    }
}
