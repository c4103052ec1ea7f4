use thiserror::Error;

/// Errors originating from the rendering and export pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid tile size: {width}×{height} cells (both must be > 0)")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("invalid cell size: {0} px (must be > 0)")]
    InvalidCellSize(u32),

    #[error("region {x},{y} {width}×{height} does not fit the {grid_width}×{grid_height} pattern")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        grid_width: u32,
        grid_height: u32,
    },

    #[error("cannot allocate a {width}×{height} surface")]
    SurfaceAllocation { width: u64, height: u64 },

    #[error("export aborted")]
    Aborted,

    #[error("invalid font: {0}")]
    Font(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] perler_core::CoreError),
}
