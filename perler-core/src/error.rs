use thiserror::Error;

/// Errors originating from the pattern model and edit engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid pattern dimensions: {width}×{height} (both must be > 0)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("grid shape does not match {width}×{height}: {reason}")]
    GridShape {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("cell ({x}, {y}) is outside the {width}×{height} grid")]
    CellOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("invalid color {0:?} (expected #RRGGBB or #RGB)")]
    InvalidColor(String),

    #[error("duplicate color id {0:?} in palette")]
    DuplicateColorId(String),

    #[error("palette import failed: {0}")]
    PaletteImport(String),

    #[error("palette store: {0}")]
    Storage(String),
}
