//! Patch grid: maps the continuous canvas onto square selectable patches.
//!
//! Each patch is a cell of `3 * marker_size` pixels. The marker for a
//! patch is a `marker_size` square anchored at the cell's top-left
//! corner. Fitting math uses a fixed reference pixel inside the marker,
//! offset `(marker_size + 1) / 2` from the top-left corner on each axis.

use crate::types::{FitError, PatchIndex, Point, SessionConfig};

/// Immutable grid geometry shared by every component of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    marker_size: u32,
    cell_size: u32,
    dimension: u32,
}

impl PatchGrid {
    /// Build a grid of `dimension x dimension` patches with
    /// `marker_size`-pixel markers.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidConfig`] for a zero marker size or
    /// dimension, or when the canvas size overflows `u32`.
    pub fn new(marker_size: u32, dimension: u32) -> Result<Self, FitError> {
        SessionConfig {
            marker_size,
            grid_dimension: dimension,
            control_strip_height: 0,
            ..SessionConfig::default()
        }
        .validate()?;
        Ok(Self {
            marker_size,
            cell_size: marker_size * 3,
            dimension,
        })
    }

    /// Build the grid described by a session configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PatchGrid::new`].
    pub fn from_config(config: &SessionConfig) -> Result<Self, FitError> {
        config.validate()?;
        Self::new(config.marker_size, config.grid_dimension)
    }

    /// Marker edge length in pixels.
    #[must_use]
    pub const fn marker_size(&self) -> u32 {
        self.marker_size
    }

    /// Cell edge length in pixels (`3 * marker_size`).
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Rows (and columns) of the grid.
    #[must_use]
    pub const fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Canvas edge length in pixels (`dimension * cell_size`).
    #[must_use]
    pub const fn canvas_size(&self) -> u32 {
        self.dimension * self.cell_size
    }

    /// Offset of the reference pixel from a marker's top-left corner.
    #[must_use]
    pub const fn center_offset(&self) -> u32 {
        (self.marker_size + 1) / 2
    }

    /// Whether `index` lies on the grid.
    #[must_use]
    pub const fn contains(&self, index: PatchIndex) -> bool {
        index.row < self.dimension && index.col < self.dimension
    }

    /// Validate an index against the grid.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::OutOfBounds`] if either coordinate is outside
    /// `0..dimension`.
    pub fn check(&self, index: PatchIndex) -> Result<PatchIndex, FitError> {
        if self.contains(index) {
            Ok(index)
        } else {
            Err(FitError::OutOfBounds {
                row: index.row,
                col: index.col,
                dimension: self.dimension,
            })
        }
    }

    /// Resolve a pixel to the patch whose cell contains it.
    ///
    /// No bounds check: pixels past the canvas produce indices past the
    /// grid. Use [`locate`](Self::locate) for validated input.
    #[must_use]
    pub const fn pixel_to_index(&self, x: u32, y: u32) -> PatchIndex {
        PatchIndex::new(y / self.cell_size, x / self.cell_size)
    }

    /// Resolve a pixel to a patch, rejecting pixels off the grid.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::OutOfBounds`] when the pixel lies outside the
    /// canvas (e.g. in the control strip).
    pub fn locate(&self, x: u32, y: u32) -> Result<PatchIndex, FitError> {
        self.check(self.pixel_to_index(x, y))
    }

    /// Integer reference pixel of a patch, used by all distance math.
    #[must_use]
    pub const fn center_px(&self, index: PatchIndex) -> (u32, u32) {
        let offset = self.center_offset();
        (
            index.col * self.cell_size + offset,
            index.row * self.cell_size + offset,
        )
    }

    /// Reference pixel of a patch as a [`Point`].
    #[must_use]
    pub fn center(&self, index: PatchIndex) -> Point {
        let (x, y) = self.center_px(index);
        Point::new(f64::from(x), f64::from(y))
    }

    /// Top-left pixel of a patch's marker square.
    #[must_use]
    pub const fn top_left_px(&self, index: PatchIndex) -> (u32, u32) {
        (index.col * self.cell_size, index.row * self.cell_size)
    }

    /// Every patch on the grid in row-major order.
    pub fn indices(&self) -> impl Iterator<Item = PatchIndex> + use<> {
        let dimension = self.dimension;
        (0..dimension).flat_map(move |row| (0..dimension).map(move |col| PatchIndex::new(row, col)))
    }
}
