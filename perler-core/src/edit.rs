//! Color replacement on a pattern.
//!
//! Every edit produces a new [`PatternData`]; the input is never touched.
//! Counts of the result come from a full rescan of its grid.

use tracing::debug;

use crate::color::BeadColor;
use crate::error::CoreError;
use crate::pattern::PatternData;

/// A single color replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Reassign every cell whose color id is `target`.
    ReplaceAll { target: String, with: BeadColor },
    /// Reassign exactly the cell at `(x, y)`.
    ReplaceCell { x: u32, y: u32, with: BeadColor },
}

impl Edit {
    /// Apply the edit, returning the edited pattern.
    ///
    /// Fails without side effects when a cell coordinate is out of bounds.
    pub fn apply(&self, pattern: &PatternData) -> crate::Result<PatternData> {
        match self {
            Edit::ReplaceAll { target, with } => Ok(replace_global(pattern, target, with)),
            Edit::ReplaceCell { x, y, with } => replace_single(pattern, *x, *y, with),
        }
    }
}

/// Replace every `target` cell with `with`.
///
/// A target that does not occur yields an unchanged copy.
pub fn replace_global(pattern: &PatternData, target: &str, with: &BeadColor) -> PatternData {
    let (width, height) = (pattern.width(), pattern.height());
    let mut grid = pattern.clone().into_grid();
    let mut replaced = 0usize;
    for bead in grid.iter_mut().flatten() {
        if bead.id == target {
            *bead = with.clone();
            replaced += 1;
        }
    }
    debug!(target, to = %with.id, replaced, "Global color replace");
    PatternData::from_valid_grid(width, height, grid)
}

/// Replace the single cell at `(x, y)` with `with`.
pub fn replace_single(
    pattern: &PatternData,
    x: u32,
    y: u32,
    with: &BeadColor,
) -> crate::Result<PatternData> {
    let (width, height) = (pattern.width(), pattern.height());
    if x >= width || y >= height {
        return Err(CoreError::CellOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }
    let mut grid = pattern.clone().into_grid();
    grid[y as usize][x as usize] = with.clone();
    debug!(x, y, to = %with.id, "Single cell replace");
    Ok(PatternData::from_valid_grid(width, height, grid))
}
