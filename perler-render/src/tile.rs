use crate::error::RenderError;

/// Default tile size in cells: one standard 29×29 peg board.
pub const DEFAULT_CHUNK: u32 = 29;

/// A rectangular block of cells, in absolute pattern coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRegion {
    /// Absolute column of the top-left cell.
    pub x: u32,
    /// Absolute row of the top-left cell.
    pub y: u32,
    /// Width in cells (may be smaller at the right edge).
    pub width: u32,
    /// Height in cells (may be smaller at the bottom edge).
    pub height: u32,
}

impl GridRegion {
    /// The whole of a `width`×`height` pattern.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Number of cells in this region.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the region is non-empty and lies inside a `width`×`height` grid.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// User-chosen tile size for paginated export, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpec {
    pub chunk_width: u32,
    pub chunk_height: u32,
}

impl Default for TileSpec {
    fn default() -> Self {
        Self {
            chunk_width: DEFAULT_CHUNK,
            chunk_height: DEFAULT_CHUNK,
        }
    }
}

impl TileSpec {
    pub fn new(chunk_width: u32, chunk_height: u32) -> crate::Result<Self> {
        let spec = Self {
            chunk_width,
            chunk_height,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.chunk_width == 0 || self.chunk_height == 0 {
            return Err(RenderError::InvalidTileSize {
                width: self.chunk_width,
                height: self.chunk_height,
            });
        }
        Ok(())
    }

    /// `(rows, cols)` of tiles needed to cover a `width`×`height` pattern.
    pub fn layout(&self, width: u32, height: u32) -> crate::Result<(u32, u32)> {
        self.validate()?;
        Ok((
            height.div_ceil(self.chunk_height),
            width.div_ceil(self.chunk_width),
        ))
    }
}

/// One page of a paginated export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Zero-based tile row.
    pub row: u32,
    /// Zero-based tile column.
    pub col: u32,
    pub region: GridRegion,
}

impl Tile {
    /// `pattern_row{r}_col{c}`, one-based.
    pub fn filename(&self) -> String {
        format!("pattern_row{}_col{}", self.row + 1, self.col + 1)
    }

    /// Heading printed on the tile, one-based.
    pub fn title(&self) -> String {
        let (r, c) = (self.row + 1, self.col + 1);
        format!("Part {r}-{c} (Row {r}, Col {c})")
    }
}

/// Partition a `width`×`height` pattern into tiles, row-major.
///
/// The last row and column may be partial; no tile ever extends past the
/// pattern and no tile is empty.
pub fn build_tile_grid(width: u32, height: u32, spec: &TileSpec) -> crate::Result<Vec<Tile>> {
    let (rows, cols) = spec.layout(width, height)?;
    let mut tiles = Vec::with_capacity(rows as usize * cols as usize);
    for row in 0..rows {
        let y = row * spec.chunk_height;
        let h = spec.chunk_height.min(height - y);
        for col in 0..cols {
            let x = col * spec.chunk_width;
            let w = spec.chunk_width.min(width - x);
            tiles.push(Tile {
                row,
                col,
                region: GridRegion {
                    x,
                    y,
                    width: w,
                    height: h,
                },
            });
        }
    }
    Ok(tiles)
}
