use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::BeadColor;
use crate::error::CoreError;
use crate::hidden::HiddenSet;

/// A finalized bead grid plus its per-color bead counts.
///
/// The grid is row-major: `grid[y][x]`. `counts` is always derived from the
/// grid by a full scan, so it can never drift from the cells it describes.
/// Construction (including deserialization) rejects grids whose shape does
/// not match `width`/`height`; counts supplied by a producer are ignored and
/// re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPattern")]
pub struct PatternData {
    width: u32,
    height: u32,
    grid: Vec<Vec<BeadColor>>,
    counts: BTreeMap<String, u32>,
}

/// Wire form of [`PatternData`], validated on the way in.
#[derive(Deserialize)]
struct RawPattern {
    width: u32,
    height: u32,
    grid: Vec<Vec<BeadColor>>,
}

impl TryFrom<RawPattern> for PatternData {
    type Error = CoreError;

    fn try_from(raw: RawPattern) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.grid)
    }
}

impl PatternData {
    /// Build a pattern from row-major rows, validating the shape.
    pub fn new(width: u32, height: u32, grid: Vec<Vec<BeadColor>>) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        if grid.len() != height as usize {
            return Err(CoreError::GridShape {
                width,
                height,
                reason: format!("expected {height} rows, got {}", grid.len()),
            });
        }
        if let Some((y, row)) = grid
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width as usize)
        {
            return Err(CoreError::GridShape {
                width,
                height,
                reason: format!("row {y} has {} cells, expected {width}", row.len()),
            });
        }
        Ok(Self::from_valid_grid(width, height, grid))
    }

    /// Build a pattern by evaluating `cell(x, y)` for every position.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut cell: impl FnMut(u32, u32) -> BeadColor,
    ) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let grid = (0..height)
            .map(|y| (0..width).map(|x| cell(x, y)).collect())
            .collect();
        Ok(Self::from_valid_grid(width, height, grid))
    }

    /// Wrap an already shape-checked grid, re-deriving counts.
    pub(crate) fn from_valid_grid(width: u32, height: u32, grid: Vec<Vec<BeadColor>>) -> Self {
        debug_assert_eq!(grid.len(), height as usize);
        let counts = count_colors(&grid);
        Self {
            width,
            height,
            grid,
            counts,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major cells, `grid()[y][x]`.
    pub fn grid(&self) -> &[Vec<BeadColor>] {
        &self.grid
    }

    /// The cell at `(x, y)`, or `None` when out of bounds.
    pub fn cell(&self, x: u32, y: u32) -> Option<&BeadColor> {
        self.grid.get(y as usize)?.get(x as usize)
    }

    /// Beads per color id. Ids with no cells are absent.
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    /// Number of cells using `id` (zero when absent).
    pub fn count(&self, id: &str) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Beads whose color is not hidden.
    pub fn visible_count(&self, hidden: &HiddenSet) -> u64 {
        self.counts
            .iter()
            .filter(|(id, _)| !hidden.contains(id))
            .map(|(_, &n)| n as u64)
            .sum()
    }

    pub(crate) fn into_grid(self) -> Vec<Vec<BeadColor>> {
        self.grid
    }
}

/// Count cells per color id with a full scan of `grid`.
pub fn count_colors(grid: &[Vec<BeadColor>]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for bead in grid.iter().flatten() {
        *counts.entry(bead.id.clone()).or_insert(0) += 1;
    }
    counts
}
