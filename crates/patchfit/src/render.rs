//! Canvas renderer.
//!
//! Rendering is a pure function of an immutable [`SceneView`]: the
//! renderer owns a pre-painted background (white canvas with a gray
//! marker per patch) and every frame starts from a copy of it.

use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::boundary::{self, BoundaryRadii};
use crate::fit::ellipse::ellipse_of;
use crate::fit::{ClickPair, TwoPointFit};
use crate::grid::PatchGrid;
use crate::selection::SelectionState;
use crate::types::{FitMode, FittedShape, PatchIndex, Palette, Point, RgbImage};

/// Segments in the polygon approximating an ellipse outline.
pub const ELLIPSE_SEGMENTS: usize = 360;

/// Everything a frame is rendered from, borrowed from a session.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    /// Grid geometry.
    pub grid: &'a PatchGrid,
    /// Contract colors.
    pub palette: &'a Palette,
    /// Active fitter.
    pub mode: FitMode,
    /// Toggled patches.
    pub selection: &'a SelectionState,
    /// Two-point capture.
    pub click: &'a ClickPair,
    /// Shape held until reset.
    pub shape: Option<&'a FittedShape>,
}

/// Paints frames for one grid and palette.
#[derive(Debug, Clone)]
pub struct Renderer {
    grid: PatchGrid,
    palette: Palette,
    background: RgbImage,
}

impl Renderer {
    /// Pre-paint the background: the canvas plus `strip_height` rows of
    /// control strip below it.
    #[must_use]
    pub fn new(grid: PatchGrid, palette: Palette, strip_height: u32) -> Self {
        let size = grid.canvas_size();
        let mut background = RgbImage::from_pixel(
            size,
            size.saturating_add(strip_height),
            palette.background.rgb(),
        );
        let unselected = palette.unselected.rgb();
        for idx in grid.indices() {
            fill_marker(&mut background, &grid, idx, unselected);
        }
        Self {
            grid,
            palette,
            background,
        }
    }

    /// The empty frame.
    #[must_use]
    pub const fn background(&self) -> &RgbImage {
        &self.background
    }

    /// Frame width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.background.width()
    }

    /// Frame height in pixels, control strip included.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.background.height()
    }

    /// Fill the marker square of `index` with `color`.
    pub fn paint_marker(&self, frame: &mut RgbImage, index: PatchIndex, color: Rgb<u8>) {
        fill_marker(frame, &self.grid, index, color);
    }

    /// The frame the boundary scan reads: center marker in the accent
    /// color and ring cells in the selected color, nothing else.
    #[must_use]
    pub fn ring_frame(&self, fit: &TwoPointFit) -> RgbImage {
        let mut frame = self.background.clone();
        self.paint_ring(&mut frame, fit.center_patch, &fit.ring);
        frame
    }

    /// Measure the boundary radii of a two-point fit from its rendered
    /// ring.
    #[must_use]
    pub fn measure_ring(&self, fit: &TwoPointFit) -> Option<BoundaryRadii> {
        BoundaryRadii::measure(&self.ring_frame(fit), fit.center, self.palette.selected.rgb())
    }

    /// Render a complete frame.
    #[must_use]
    pub fn render(&self, scene: &SceneView<'_>) -> RgbImage {
        let mut frame = self.background.clone();
        let selected = self.palette.selected.rgb();

        for idx in scene.selection.iter() {
            self.paint_marker(&mut frame, idx, selected);
        }

        match scene.shape {
            Some(FittedShape::Circle { center, radius }) => {
                boundary::paint_circle(&mut frame, *center, *radius, selected);
                put_point(&mut frame, *center, selected);
            }
            Some(shape @ FittedShape::Ellipse { .. }) => {
                if let Some(ellipse) = ellipse_of(shape) {
                    stroke_closed(&mut frame, &ellipse.sample_points(ELLIPSE_SEGMENTS), selected);
                }
            }
            Some(FittedShape::TwoPointCircle {
                center_patch,
                center,
                ring,
                target_radius,
                min_radius,
                max_radius,
                ..
            }) => {
                self.paint_ring(&mut frame, *center_patch, ring);
                let radii = BoundaryRadii {
                    min: *min_radius,
                    max: *max_radius,
                    target: *target_radius,
                };
                boundary::paint_bands(&mut frame, *center, &radii, &self.palette);
            }
            None => {
                if scene.mode == FitMode::TwoPointCircle {
                    if let Some(down) = scene.click.down() {
                        self.paint_marker(&mut frame, down, self.palette.accent.rgb());
                    }
                }
            }
        }
        frame
    }

    fn paint_ring(&self, frame: &mut RgbImage, center: PatchIndex, ring: &[PatchIndex]) {
        self.paint_marker(frame, center, self.palette.accent.rgb());
        for idx in ring {
            self.paint_marker(frame, *idx, self.palette.selected.rgb());
        }
    }
}

fn fill_marker(frame: &mut RgbImage, grid: &PatchGrid, index: PatchIndex, color: Rgb<u8>) {
    let (x, y) = grid.top_left_px(index);
    let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
        return;
    };
    let size = grid.marker_size();
    draw_filled_rect_mut(frame, Rect::at(x, y).of_size(size, size), color);
}

/// Paint the pixel nearest to `p`, if it lies in the frame.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn put_point(frame: &mut RgbImage, p: Point, color: Rgb<u8>) {
    let (x, y) = (p.x.round(), p.y.round());
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < frame.width() && y < frame.height() {
        frame.put_pixel(x, y, color);
    }
}

/// Stroke the closed polygon through `points`, one pixel wide.
#[allow(clippy::cast_possible_truncation)]
fn stroke_closed(frame: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    let Some(&last) = points.last() else {
        return;
    };
    let mut prev = last;
    for &p in points {
        draw_line_segment_mut(
            frame,
            (prev.x as f32, prev.y as f32),
            (p.x as f32, p.y as f32),
            color,
        );
        prev = p;
    }
}
