pub mod error;
pub mod export;
pub mod materials;
pub mod options;
pub mod rasterizer;
pub mod renderer;
pub mod surface;
pub mod text;
pub mod tile;

pub use error::RenderError;
pub use export::{encode_png, write_png, ExportMetadata};
pub use materials::{material_rows, render_materials, MaterialRow, MaterialTable};
pub use options::{BlockEdgePolicy, RenderOptions, ShapeMode};
pub use rasterizer::{render_preview, render_region};
pub use renderer::{export_full, export_materials, export_tiles, ExportProgress, ExportedImage};
pub use surface::Surface;
pub use text::{
    draw_text, BlockFace, FallbackFace, FontSet, OutlineFace, TextAlign, TextFace, TextStyle,
};
pub use tile::{build_tile_grid, GridRegion, Tile, TileSpec};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
