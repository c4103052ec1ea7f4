pub mod color;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod hidden;
pub mod interaction;
pub mod palette;
pub mod pattern;
pub mod session;
pub mod store;

// Re-export primary types for convenience.
pub use color::{BeadColor, Rgb};
pub use edit::Edit;
pub use error::CoreError;
pub use geometry::{CellIndex, ScreenPoint, ViewGeometry, ViewportState, ZoomLimits};
pub use hidden::HiddenSet;
pub use interaction::{InteractionState, PointerEvent, ViewCommand, ViewportController};
pub use palette::{parse_palette_csv, Palette};
pub use pattern::PatternData;
pub use session::SessionState;
pub use store::{JsonPaletteStore, MemoryPaletteStore, PaletteLibrary, PaletteStore};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
