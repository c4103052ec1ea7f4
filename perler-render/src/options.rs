use perler_core::HiddenSet;

use crate::error::RenderError;
use crate::text::FontSet;

/// Default cell edge in the labeled export, in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 50;
/// Default ruler margin on the top and left, in pixels.
pub const DEFAULT_MARGIN: u32 = 80;
/// Height of the title band when a title is present.
pub const TITLE_BAND_HEIGHT: u32 = 80;
/// Title text size in pixels.
pub const TITLE_FONT_SIZE: f32 = 40.0;

/// Absolute column/row numbers are labeled on multiples of this.
pub const RULER_INTERVAL: u32 = 5;
/// Heavy reference lines are drawn on multiples of this.
pub const BLOCK_INTERVAL: u32 = 10;

/// How a bead is drawn inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeMode {
    #[default]
    Circle,
    Square,
}

/// Which edges of a rendered region get heavy block lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockEdgePolicy {
    /// Heavy lines on absolute multiples of the block interval (never at
    /// absolute 0), plus a heavy border around the whole region.
    #[default]
    Border,
    /// Heavy lines only on absolute multiples of the block interval,
    /// absolute 0 included. Other region edges get a thin outline.
    AbsoluteOnly,
}

/// Everything that shapes one labeled raster.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Cell edge in pixels.
    pub cell_size: u32,
    /// Ruler margin in pixels, added once to each dimension.
    pub margin: u32,
    pub shape: ShapeMode,
    pub title: Option<String>,
    /// Colors drawn as empty cells.
    pub hidden: HiddenSet,
    /// Overlay each bead's color id.
    pub show_labels: bool,
    pub block_edges: BlockEdgePolicy,
    pub fonts: FontSet,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            margin: DEFAULT_MARGIN,
            shape: ShapeMode::default(),
            title: None,
            hidden: HiddenSet::new(),
            show_labels: true,
            block_edges: BlockEdgePolicy::default(),
            fonts: FontSet::default(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> crate::Result<()> {
        if self.cell_size == 0 {
            return Err(RenderError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    /// A copy with a different title.
    pub fn with_title(&self, title: Option<String>) -> Self {
        Self {
            title,
            ..self.clone()
        }
    }

    pub fn title_band(&self) -> u32 {
        if self.title.is_some() {
            TITLE_BAND_HEIGHT
        } else {
            0
        }
    }

    /// Ruler number size, scaled with the cell.
    pub fn ruler_font_size(&self) -> f32 {
        self.cell_size as f32 * 0.48
    }

    /// Color id label size, scaled with the cell.
    pub fn label_font_size(&self) -> f32 {
        self.cell_size as f32 * 0.4
    }

    /// Gap between a cell edge and its bead.
    pub fn bead_inset(&self) -> f32 {
        match self.shape {
            ShapeMode::Circle => (self.cell_size as f32 * 0.08).max(0.5),
            ShapeMode::Square => (self.cell_size as f32 * 0.04).max(0.5),
        }
    }

    /// Thin cell border width.
    pub fn cell_line_width(&self) -> f32 {
        if self.cell_size >= 20 {
            2.0
        } else {
            1.0
        }
    }

    /// Heavy block line width.
    pub fn block_line_width(&self) -> f32 {
        self.cell_line_width() * 2.0
    }
}
