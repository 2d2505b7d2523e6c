//! SVG export serializer.
//!
//! Renders a [`SceneView`] as an SVG document using the [`svg`] crate:
//! a background `<rect>`, one `<rect>` per patch marker colored by
//! selection state, and the fitted shape as vector primitives. The
//! two-point circle exports its three boundary radii as a group of
//! `<circle>` elements instead of the raster bands.
//!
//! Coordinates are canvas pixels, so the SVG overlays the PNG frame
//! exactly (minus the control strip).
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::{Circle, Description, Element, Ellipse, Group, Rectangle, Title};
use svg::node::{Node, Text};

use patchfit::{Color, FitMode, FittedShape, PatchIndex, SceneView};

/// Stroke width of exported outlines, in pixels.
const STROKE_WIDTH: f64 = 2.0;

/// Metadata to embed in the SVG document.
///
/// Every field is optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized session configuration, emitted inside `<metadata>` as
    /// a namespaced `<patchfit:session>` element so exported files carry
    /// machine-parseable settings.
    pub config_json: Option<&'a str>,
}

/// Serialize a scene into an SVG document string.
///
/// # Examples
///
/// ```
/// use patchfit::{FitMode, PatchIndex, Session, SessionConfig};
/// use patchfit_export::{SvgMetadata, to_svg};
///
/// let mut session = Session::new(SessionConfig::default(), FitMode::CentroidCircle).unwrap();
/// session.toggle(PatchIndex::new(2, 3)).unwrap();
/// let metadata = SvgMetadata {
///     title: Some("demo"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&session.scene(), &metadata);
/// assert!(svg.contains("<title>demo</title>"));
/// assert!(svg.contains(r##"fill="#0000ff""##));
/// ```
#[must_use]
pub fn to_svg(scene: &SceneView<'_>, metadata: &SvgMetadata<'_>) -> String {
    let size = scene.grid.canvas_size();
    let mut doc = Document::new()
        .set("width", size)
        .set("height", size)
        .set("viewBox", (0, 0, size, size));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    if let Some(config_json) = metadata.config_json {
        let mut session_el = Element::new("patchfit:session");
        session_el.assign("xmlns:patchfit", "urn:patchfit:session:1");
        session_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(session_el);
        doc = doc.add(metadata_el);
    }

    doc = doc.add(
        Rectangle::new()
            .set("width", size)
            .set("height", size)
            .set("fill", scene.palette.background.hex()),
    );

    let marker = scene.grid.marker_size();
    let mut markers = Group::new().set("id", "markers");
    for idx in scene.grid.indices() {
        let (x, y) = scene.grid.top_left_px(idx);
        markers = markers.add(
            Rectangle::new()
                .set("x", x)
                .set("y", y)
                .set("width", marker)
                .set("height", marker)
                .set("fill", marker_color(scene, idx).hex()),
        );
    }
    doc = doc.add(markers);

    if let Some(shape) = scene.shape {
        doc = doc.add(shape_group(scene, shape));
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Marker color of one patch, matching the raster renderer.
fn marker_color(scene: &SceneView<'_>, idx: PatchIndex) -> Color {
    let palette = scene.palette;
    match scene.shape {
        Some(FittedShape::TwoPointCircle {
            center_patch, ring, ..
        }) => {
            if ring.contains(&idx) {
                palette.selected
            } else if *center_patch == idx {
                palette.accent
            } else {
                palette.unselected
            }
        }
        _ if scene.mode == FitMode::TwoPointCircle && scene.click.down() == Some(idx) => {
            palette.accent
        }
        _ if scene.selection.contains(idx) => palette.selected,
        _ => palette.unselected,
    }
}

fn shape_group(scene: &SceneView<'_>, shape: &FittedShape) -> Group {
    let selected = scene.palette.selected.hex();
    let accent = scene.palette.accent.hex();
    let group = Group::new()
        .set("id", "shape")
        .set("fill", "none")
        .set("stroke-width", STROKE_WIDTH);

    match shape {
        FittedShape::Circle { center, radius } => group
            .add(outline_circle(center.x, center.y, *radius, &selected))
            .add(
                Circle::new()
                    .set("cx", center.x)
                    .set("cy", center.y)
                    .set("r", 1)
                    .set("fill", selected.as_str()),
            ),
        FittedShape::Ellipse {
            center,
            semi_axes,
            rotation,
        } => group.add(
            Ellipse::new()
                .set("cx", center.x)
                .set("cy", center.y)
                .set("rx", semi_axes[0])
                .set("ry", semi_axes[1])
                .set(
                    "transform",
                    format!("rotate({} {} {})", rotation.to_degrees(), center.x, center.y),
                )
                .set("stroke", selected),
        ),
        FittedShape::TwoPointCircle {
            center,
            target_radius,
            min_radius,
            max_radius,
            ..
        } => group
            .add(
                outline_circle(center.x, center.y, *min_radius, &accent)
                    .set("data-boundary", "min"),
            )
            .add(
                outline_circle(center.x, center.y, *max_radius, &accent)
                    .set("data-boundary", "max"),
            )
            .add(
                outline_circle(center.x, center.y, *target_radius, &selected)
                    .set("data-boundary", "target"),
            ),
    }
}

fn outline_circle(cx: f64, cy: f64, r: f64, stroke: &str) -> Circle {
    Circle::new()
        .set("cx", cx)
        .set("cy", cy)
        .set("r", r)
        .set("stroke", stroke)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use patchfit::{Session, SessionConfig};

    use super::*;

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    // --- Document structure ---

    #[test]
    fn empty_scene_has_one_marker_per_patch() {
        let session = Session::new(SessionConfig::default(), FitMode::Ellipse).unwrap();
        let svg = to_svg(&session.scene(), &no_meta());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"viewBox="0 0 540 540""#));
        assert_eq!(count(&svg, r##"fill="#969696""##), 400);
        assert!(!svg.contains(r#"id="shape""#));
    }

    #[test]
    fn metadata_is_embedded_and_escaped() {
        let session = Session::new(SessionConfig::default(), FitMode::Ellipse).unwrap();
        let metadata = SvgMetadata {
            title: Some("a < b"),
            description: Some("replay"),
            config_json: Some(r#"{"grid_dimension":20}"#),
        };
        let svg = to_svg(&session.scene(), &metadata);
        assert!(svg.contains("<title>a &lt; b</title>"));
        assert!(svg.contains("<desc>replay</desc>"));
        assert!(svg.contains("<patchfit:session"));
        assert!(svg.contains("grid_dimension"));
    }

    // --- Shapes ---

    #[test]
    fn selected_markers_and_circle() {
        let mut session = Session::new(SessionConfig::default(), FitMode::CentroidCircle).unwrap();
        session.toggle(PatchIndex::new(10, 7)).unwrap();
        session.toggle(PatchIndex::new(10, 13)).unwrap();
        session.generate().unwrap();
        let svg = to_svg(&session.scene(), &no_meta());
        assert_eq!(count(&svg, r##"fill="#0000ff""##), 3);
        assert!(svg.contains(r#"r="81""#));
        assert!(svg.contains(r#"cx="275""#));
        assert!(svg.contains(r#"id="shape""#));
    }

    #[test]
    fn ellipse_is_rotated() {
        let mut session = Session::new(SessionConfig::default(), FitMode::Ellipse).unwrap();
        for (row, col) in [(5, 10), (15, 10), (10, 4), (10, 16), (7, 14), (13, 6)] {
            session.toggle(PatchIndex::new(row, col)).unwrap();
        }
        session.generate().unwrap();
        let svg = to_svg(&session.scene(), &no_meta());
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains("rotate("));
    }

    #[test]
    fn two_point_exports_boundary_set() {
        let mut session = Session::new(SessionConfig::default(), FitMode::TwoPointCircle).unwrap();
        session.press(PatchIndex::new(10, 10)).unwrap();
        session.release(PatchIndex::new(10, 13)).unwrap();
        let svg = to_svg(&session.scene(), &no_meta());
        assert!(svg.contains(r#"data-boundary="min""#));
        assert!(svg.contains(r#"data-boundary="max""#));
        assert!(svg.contains(r#"data-boundary="target""#));
        // Center marker plus the accent min/max outlines.
        assert_eq!(count(&svg, r##"fill="#ff0000""##), 1);
        assert_eq!(count(&svg, r##"stroke="#ff0000""##), 2);
    }

    #[test]
    fn pending_center_is_accent() {
        let mut session = Session::new(SessionConfig::default(), FitMode::TwoPointCircle).unwrap();
        session.press(PatchIndex::new(1, 1)).unwrap();
        let svg = to_svg(&session.scene(), &no_meta());
        assert_eq!(count(&svg, r##"fill="#ff0000""##), 1);
    }
}
