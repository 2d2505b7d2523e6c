//! Shared types for the patchfit core.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can handle rendered frames
/// without depending on `image` directly.
pub use image::RgbImage;

/// A 2D point in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Position of a patch on the grid.
///
/// Ordering is row-major, which keeps iteration over selected patches
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatchIndex {
    /// Row, counted from the top.
    pub row: u32,
    /// Column, counted from the left.
    pub col: u32,
}

impl PatchIndex {
    /// Create a new patch index.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for PatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row {}, col {})", self.row, self.col)
    }
}

/// An RGB color that survives serialization.
///
/// `image::Rgb` does not implement serde traits, so palettes store
/// plain channel triples and convert at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

impl Color {
    /// White.
    pub const WHITE: Self = Self([255, 255, 255]);
    /// Neutral gray used for unselected markers.
    pub const GRAY: Self = Self([150, 150, 150]);
    /// Blue.
    pub const BLUE: Self = Self([0, 0, 255]);
    /// Red.
    pub const RED: Self = Self([255, 0, 0]);

    /// The color as an `image` pixel.
    #[must_use]
    pub const fn rgb(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }

    /// CSS hex notation, e.g. `#0000ff`.
    #[must_use]
    pub fn hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        color.rgb()
    }
}

/// Colors used when painting the canvas.
///
/// The colors are part of the output contract: markers and shapes are
/// distinguished by exact equality, and the two-point boundary scan
/// classifies pixels by comparing against [`selected`](Self::selected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Canvas background.
    pub background: Color,
    /// Marker of a patch that is not selected.
    pub unselected: Color,
    /// Marker of a selected patch, and the fitted shape (accent A).
    pub selected: Color,
    /// Two-point center marker and inner/outer boundary band (accent B).
    pub accent: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            unselected: Color::GRAY,
            selected: Color::BLUE,
            accent: Color::RED,
        }
    }
}

/// Which fitting strategy a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Center from a mouse-down, radius from the following mouse-up.
    TwoPointCircle,
    /// Centroid of the selection with the mean distance as radius.
    #[default]
    CentroidCircle,
    /// Direct least-squares conic fit over the selection.
    Ellipse,
}

impl FitMode {
    /// Whether the mode works on the toggled selection (and a Generate
    /// action) rather than on a click pair.
    #[must_use]
    pub const fn uses_selection(self) -> bool {
        !matches!(self, Self::TwoPointCircle)
    }

    /// The right-button action that resets a session in this mode.
    ///
    /// The click-pair mode resets on press; the button-driven modes reset
    /// on release.
    #[must_use]
    pub const fn reset_action(self) -> PointerAction {
        match self {
            Self::TwoPointCircle => PointerAction::Down,
            Self::CentroidCircle | Self::Ellipse => PointerAction::Up,
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TwoPointCircle => "two-point circle",
            Self::CentroidCircle => "centroid circle",
            Self::Ellipse => "ellipse",
        })
    }
}

/// A mouse button reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Selection button.
    Left,
    /// Reset button.
    Right,
}

/// Whether a pointer event is a press or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    /// Button pressed.
    Down,
    /// Button released.
    Up,
}

/// A single input event delivered by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Mouse button event at a canvas pixel.
    Pointer {
        /// Pixel column.
        x: u32,
        /// Pixel row.
        y: u32,
        /// Which button.
        button: MouseButton,
        /// Press or release.
        action: PointerAction,
    },
    /// The labeled Generate button was pressed.
    Generate,
}

/// Session operations, named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Toggle a patch in the selection.
    Toggle,
    /// Capture the two-point center.
    Press,
    /// Capture the two-point circumference point.
    Release,
    /// Run the multi-point fitter.
    Generate,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toggle => "toggle",
            Self::Press => "press",
            Self::Release => "release",
            Self::Generate => "generate",
        })
    }
}

/// A fitted shape, produced once per successful fit and held until reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedShape {
    /// Centroid mean-radius circle.
    Circle {
        /// Circle center in pixels.
        center: Point,
        /// Mean distance of the selected points from `center`.
        radius: f64,
    },
    /// Least-squares ellipse.
    Ellipse {
        /// Ellipse center in pixels.
        center: Point,
        /// Semi-axes `[major, minor]` in pixels.
        semi_axes: [f64; 2],
        /// Angle of the major axis from +x, in radians (−π/2, π/2].
        rotation: f64,
    },
    /// Two-point radius circle with its boundary diagnostics.
    TwoPointCircle {
        /// Patch picked on mouse-down.
        center_patch: PatchIndex,
        /// Center pixel of `center_patch`.
        center: Point,
        /// Pixel distance between the two picked patch centers.
        radius: f64,
        /// Grid cells drawn as the approximate circle.
        ring: Vec<PatchIndex>,
        /// Midpoint of `min_radius` and `max_radius`.
        target_radius: f64,
        /// Nearest ring pixel from `center`.
        min_radius: f64,
        /// Farthest ring pixel from `center`.
        max_radius: f64,
    },
}

impl FittedShape {
    /// Center of the shape in pixels.
    #[must_use]
    pub const fn center(&self) -> Point {
        match self {
            Self::Circle { center, .. }
            | Self::Ellipse { center, .. }
            | Self::TwoPointCircle { center, .. } => *center,
        }
    }
}

/// How a [`FitError`] should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The operation was a no-op; the user can correct and retry.
    Warning,
    /// The caller passed something the core rejects.
    Error,
}

/// Errors reported by session operations.
///
/// None of these are fatal: every failing operation leaves the session
/// in its prior state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// A patch index or pixel outside the grid.
    #[error("patch (row {row}, col {col}) is outside the {dimension}x{dimension} grid")]
    OutOfBounds {
        /// Offending row.
        row: u32,
        /// Offending column.
        col: u32,
        /// Grid rows and columns.
        dimension: u32,
    },

    /// Not enough selected points for the active fitter.
    #[error("need at least {required} selected point(s) to generate, have {selected}")]
    InsufficientPoints {
        /// Minimum point count.
        required: usize,
        /// Current point count.
        selected: usize,
    },

    /// The point set does not determine a proper shape.
    #[error("the selected points do not determine an ellipse")]
    DegenerateFit,

    /// A shape is already fitted; reset before fitting again.
    #[error("a shape is already fitted; reset to start over")]
    Locked,

    /// The action has no meaning in the active mode.
    #[error("{action} is not available in {mode} mode")]
    UnsupportedAction {
        /// Requested action.
        action: Action,
        /// Active mode.
        mode: FitMode,
    },

    /// Session configuration is invalid.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl FitError {
    /// Classify the error for reporting.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::OutOfBounds { .. } | Self::InvalidConfig(_) => Severity::Error,
            Self::InsufficientPoints { .. }
            | Self::DegenerateFit
            | Self::Locked
            | Self::UnsupportedAction { .. } => Severity::Warning,
        }
    }
}

/// Configuration for a selection-and-fit session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Marker edge length in pixels. A patch cell is three markers wide.
    pub marker_size: u32,

    /// Number of patch rows (and columns).
    pub grid_dimension: u32,

    /// Height of the control strip below the canvas in the
    /// button-driven modes. Ignored in two-point mode.
    pub control_strip_height: u32,

    /// Truncate the centroid center to whole pixels before measuring
    /// the mean radius.
    pub snap_center_to_pixel: bool,

    /// Contract colors.
    pub palette: Palette,
}

impl SessionConfig {
    /// Default marker edge in pixels.
    pub const DEFAULT_MARKER_SIZE: u32 = 9;
    /// Default grid rows and columns.
    pub const DEFAULT_GRID_DIMENSION: u32 = 20;
    /// Default control strip height in pixels.
    pub const DEFAULT_CONTROL_STRIP_HEIGHT: u32 = 100;
    /// Largest frame, in pixels, a session will allocate.
    pub const MAX_FRAME_PIXELS: u64 = 64 * 1024 * 1024;

    /// Check the invariants the grid depends on.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidConfig`] when the marker size or grid
    /// dimension is zero, the canvas would not fit in `u32` pixels, or
    /// the frame exceeds [`MAX_FRAME_PIXELS`](Self::MAX_FRAME_PIXELS).
    pub fn validate(&self) -> Result<(), FitError> {
        if self.marker_size == 0 {
            return Err(FitError::InvalidConfig(
                "marker_size must be at least 1".to_string(),
            ));
        }
        if self.grid_dimension == 0 {
            return Err(FitError::InvalidConfig(
                "grid_dimension must be at least 1".to_string(),
            ));
        }
        let Some((width, height)) = self
            .marker_size
            .checked_mul(3)
            .and_then(|cell| cell.checked_mul(self.grid_dimension))
            .and_then(|canvas| Some((canvas, canvas.checked_add(self.control_strip_height)?)))
        else {
            return Err(FitError::InvalidConfig(format!(
                "a {0}x{0} grid of {1}px markers overflows the canvas",
                self.grid_dimension, self.marker_size,
            )));
        };
        let pixels = u64::from(width) * u64::from(height);
        if pixels > Self::MAX_FRAME_PIXELS {
            return Err(FitError::InvalidConfig(format!(
                "a {width}x{height} frame exceeds {} pixels",
                Self::MAX_FRAME_PIXELS,
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            marker_size: Self::DEFAULT_MARKER_SIZE,
            grid_dimension: Self::DEFAULT_GRID_DIMENSION,
            control_strip_height: Self::DEFAULT_CONTROL_STRIP_HEIGHT,
            snap_center_to_pixel: false,
            palette: Palette::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance_to_self_is_zero() {
        let p = Point::new(7.0, 11.0);
        assert!(p.distance(p).abs() < f64::EPSILON);
    }

    // --- PatchIndex tests ---

    #[test]
    fn patch_index_orders_row_major() {
        assert!(PatchIndex::new(0, 5) < PatchIndex::new(1, 0));
        assert!(PatchIndex::new(2, 1) < PatchIndex::new(2, 3));
    }

    #[test]
    fn patch_index_display() {
        assert_eq!(PatchIndex::new(3, 4).to_string(), "(row 3, col 4)");
    }

    // --- Color tests ---

    #[test]
    fn color_hex() {
        assert_eq!(Color::BLUE.hex(), "#0000ff");
        assert_eq!(Color::GRAY.hex(), "#969696");
    }

    #[test]
    fn default_palette_colors_are_distinct() {
        let p = Palette::default();
        let all = [p.background, p.unselected, p.selected, p.accent];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    // --- FitMode tests ---

    #[test]
    fn reset_action_depends_on_mode() {
        assert_eq!(FitMode::TwoPointCircle.reset_action(), PointerAction::Down);
        assert_eq!(FitMode::CentroidCircle.reset_action(), PointerAction::Up);
        assert_eq!(FitMode::Ellipse.reset_action(), PointerAction::Up);
    }

    // --- FitError tests ---

    #[test]
    fn severity_classification() {
        assert_eq!(
            FitError::InsufficientPoints {
                required: 6,
                selected: 2
            }
            .severity(),
            Severity::Warning,
        );
        assert_eq!(FitError::Locked.severity(), Severity::Warning);
        assert_eq!(
            FitError::OutOfBounds {
                row: 20,
                col: 0,
                dimension: 20
            }
            .severity(),
            Severity::Error,
        );
    }

    #[test]
    fn error_display() {
        let err = FitError::InsufficientPoints {
            required: 6,
            selected: 5,
        };
        assert_eq!(
            err.to_string(),
            "need at least 6 selected point(s) to generate, have 5",
        );
        let err = FitError::UnsupportedAction {
            action: Action::Generate,
            mode: FitMode::TwoPointCircle,
        };
        assert_eq!(
            err.to_string(),
            "generate is not available in two-point circle mode",
        );
    }

    // --- SessionConfig tests ---

    #[test]
    fn config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.marker_size, 9);
        assert_eq!(config.grid_dimension, 20);
        assert_eq!(config.control_strip_height, 100);
        assert!(!config.snap_center_to_pixel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_marker() {
        let config = SessionConfig {
            marker_size: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(FitError::InvalidConfig(_))));
    }

    #[test]
    fn config_rejects_overflowing_canvas() {
        let config = SessionConfig {
            marker_size: u32::MAX / 2,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(FitError::InvalidConfig(_))));
    }

    #[test]
    fn config_rejects_oversized_frame() {
        // Fits u32 per axis but would need terabytes of pixels.
        let config = SessionConfig {
            marker_size: 100_000,
            grid_dimension: 10_000,
            ..SessionConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, FitError::InvalidConfig(_)));
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn config_accepts_large_frame_under_cap() {
        // 2046x2146 pixels.
        let config = SessionConfig {
            marker_size: 1,
            grid_dimension: 2048 / 3,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_json_fills_missing_fields() {
        let config: SessionConfig = serde_json::from_str(r#"{"grid_dimension": 8}"#).unwrap();
        assert_eq!(config.grid_dimension, 8);
        assert_eq!(config.marker_size, SessionConfig::DEFAULT_MARKER_SIZE);
    }

    #[test]
    fn input_event_json_shape() {
        let event: InputEvent = serde_json::from_str(
            r#"{"event": "pointer", "x": 10, "y": 20, "button": "left", "action": "up"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InputEvent::Pointer {
                x: 10,
                y: 20,
                button: MouseButton::Left,
                action: PointerAction::Up,
            },
        );
        let generate: InputEvent = serde_json::from_str(r#"{"event": "generate"}"#).unwrap();
        assert_eq!(generate, InputEvent::Generate);
    }
}
