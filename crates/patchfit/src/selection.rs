//! Selection state: the set of toggled patches plus the running
//! aggregates the circle fitter consumes.
//!
//! Membership is tracked here, never read back from rendered pixels.
//! The centroid sum is kept in exact integer pixels so that toggling a
//! patch twice restores the aggregate bit-for-bit.

use std::collections::BTreeSet;

use crate::grid::PatchGrid;
use crate::types::{FitError, PatchIndex, Point};

/// Result of toggling a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The patch was added to the selection.
    Selected,
    /// The patch was removed from the selection.
    Deselected,
}

/// Toggled patches and their aggregate position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<PatchIndex>,
    sum_x: u64,
    sum_y: u64,
}

impl SelectionState {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `index` if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::OutOfBounds`] for an index off the grid; the
    /// selection is left untouched.
    pub fn toggle(&mut self, grid: &PatchGrid, index: PatchIndex) -> Result<Toggle, FitError> {
        let index = grid.check(index)?;
        let (x, y) = grid.center_px(index);
        if self.selected.remove(&index) {
            self.sum_x -= u64::from(x);
            self.sum_y -= u64::from(y);
            Ok(Toggle::Deselected)
        } else {
            self.selected.insert(index);
            self.sum_x += u64::from(x);
            self.sum_y += u64::from(y);
            Ok(Toggle::Selected)
        }
    }

    /// Whether `index` is currently selected.
    #[must_use]
    pub fn contains(&self, index: PatchIndex) -> bool {
        self.selected.contains(&index)
    }

    /// Number of selected patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Mean reference pixel of the selection, `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        Some(Point::new(self.sum_x as f64 / n, self.sum_y as f64 / n))
    }

    /// Mean reference pixel truncated to whole pixels, `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapped_centroid(&self) -> Option<Point> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as u64;
        Some(Point::new(
            (self.sum_x / n) as f64,
            (self.sum_y / n) as f64,
        ))
    }

    /// Selected patches in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = PatchIndex> + '_ {
        self.selected.iter().copied()
    }

    /// Reference pixels of the selected patches.
    #[must_use]
    pub fn points(&self, grid: &PatchGrid) -> Vec<Point> {
        self.iter().map(|idx| grid.center(idx)).collect()
    }

    /// Forget every selected patch and zero the aggregates.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
