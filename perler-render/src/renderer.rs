use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use perler_core::{BeadColor, HiddenSet, PatternData};

use crate::error::RenderError;
use crate::materials::{render_materials, MaterialTable};
use crate::options::RenderOptions;
use crate::rasterizer::render_region;
use crate::surface::Surface;
use crate::text::FontSet;
use crate::tile::{build_tile_grid, GridRegion, Tile, TileSpec};

// ---------------------------------------------------------------------------
// Progress and abort
// ---------------------------------------------------------------------------

/// Shared between an export and the shell driving it.
///
/// Aborting never interrupts a tile that is already being drawn; it makes
/// the export discard everything and return [`RenderError::Aborted`]. The
/// abort stays raised, including for later exports, until [`reset`] is
/// called, so an abort issued just before an export starts is not lost.
///
/// [`reset`]: ExportProgress::reset
#[derive(Debug, Default)]
pub struct ExportProgress {
    aborted: AtomicBool,
    done: AtomicUsize,
    total: AtomicUsize,
}

impl ExportProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Clear the abort flag and both counters so the object can drive
    /// another export.
    pub fn reset(&self) {
        self.aborted.store(false, Ordering::SeqCst);
        self.start(0);
    }

    /// Restart the counters for an export of `total` tiles. The abort flag
    /// is left as is.
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One named raster handed to the persistence layer. Filenames carry no
/// extension; the encoder picks it.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub filename: String,
    pub surface: Surface,
    /// Set for tiled export pages.
    pub tile: Option<Tile>,
}

/// `perler-pattern-w{W}-h{H}`
pub fn full_export_filename(pattern: &PatternData) -> String {
    format!("perler-pattern-w{}-h{}", pattern.width(), pattern.height())
}

/// `perler-materials-{W}x{H}`
pub fn materials_filename(pattern: &PatternData) -> String {
    format!("perler-materials-{}x{}", pattern.width(), pattern.height())
}

// ---------------------------------------------------------------------------
// Whole pattern
// ---------------------------------------------------------------------------

/// Render the whole pattern as one labeled image.
///
/// The title is `"{W}x{H}"`, prefixed with `options.title` when one is set.
pub fn export_full(pattern: &PatternData, options: &RenderOptions) -> crate::Result<ExportedImage> {
    let start = Instant::now();
    let size = format!("{}x{}", pattern.width(), pattern.height());
    let title = match &options.title {
        Some(prefix) => format!("{prefix} - {size}"),
        None => size,
    };
    let options = options.with_title(Some(title));
    let surface = render_region(
        pattern,
        GridRegion::full(pattern.width(), pattern.height()),
        &options,
    )?;
    info!(
        elapsed_ms = start.elapsed().as_millis(),
        width = surface.width,
        height = surface.height,
        "Full export complete"
    );
    Ok(ExportedImage {
        filename: full_export_filename(pattern),
        surface,
        tile: None,
    })
}

// ---------------------------------------------------------------------------
// Tiled export
// ---------------------------------------------------------------------------

/// Split the pattern into tiles and render each one, in parallel.
///
/// The result is ordered by `(row, col)` regardless of completion order.
/// Each tile gets its own title; `options.title` is ignored. A bad
/// [`TileSpec`] or render option fails before any tile is drawn.
pub fn export_tiles(
    pattern: &PatternData,
    spec: &TileSpec,
    options: &RenderOptions,
    progress: &ExportProgress,
) -> crate::Result<Vec<ExportedImage>> {
    let start = Instant::now();
    let tiles = build_tile_grid(pattern.width(), pattern.height(), spec)?;
    options.validate()?;
    progress.start(tiles.len());
    debug!(
        tile_count = tiles.len(),
        chunk_width = spec.chunk_width,
        chunk_height = spec.chunk_height,
        "Starting tiled export"
    );
    if progress.is_aborted() {
        return Err(RenderError::Aborted);
    }

    let results: Vec<Option<ExportedImage>> = tiles
        .par_iter()
        .map(|tile| -> crate::Result<Option<ExportedImage>> {
            if progress.is_aborted() {
                return Ok(None);
            }
            let tile_options = options.with_title(Some(tile.title()));
            let surface = render_region(pattern, tile.region, &tile_options)?;
            progress.inc();
            debug!(row = tile.row, col = tile.col, "Tile rendered");
            Ok(Some(ExportedImage {
                filename: tile.filename(),
                surface,
                tile: Some(*tile),
            }))
        })
        .collect::<crate::Result<_>>()?;

    // Partial output is never returned.
    if progress.is_aborted() {
        info!("Tiled export aborted");
        return Err(RenderError::Aborted);
    }
    let images: Vec<ExportedImage> = results
        .into_iter()
        .collect::<Option<_>>()
        .ok_or(RenderError::Aborted)?;

    info!(
        elapsed_ms = start.elapsed().as_millis(),
        tiles = images.len(),
        "Tiled export complete"
    );
    Ok(images)
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Render the material table under its export filename.
///
/// `None` when nothing qualifies for the list.
pub fn export_materials(
    pattern: &PatternData,
    colors: &[BeadColor],
    hidden: &HiddenSet,
    exclude_hidden: bool,
    title: &str,
    fonts: &FontSet,
) -> crate::Result<Option<ExportedImage>> {
    let table = render_materials(pattern, colors, hidden, exclude_hidden, title, fonts)?;
    Ok(match table {
        MaterialTable::Empty => None,
        MaterialTable::Rendered(surface) => Some(ExportedImage {
            filename: materials_filename(pattern),
            surface,
            tile: None,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use perler_core::Rgb;

    fn checker(width: u32, height: u32) -> PatternData {
        let a = BeadColor::new("A", "Ash", Rgb::new(30, 30, 30));
        let b = BeadColor::new("B", "Butter", Rgb::new(250, 240, 160));
        PatternData::from_fn(width, height, |x, y| if (x + y) % 2 == 0 { a.clone() } else { b.clone() })
            .unwrap()
    }

    #[test]
    fn full_export_names_and_titles() {
        let p = checker(6, 4);
        let img = export_full(&p, &RenderOptions::default()).unwrap();
        assert_eq!(img.filename, "perler-pattern-w6-h4");
        assert_eq!(img.surface.height, 4 * 50 + 80 + 80);
        assert!(img.tile.is_none());
    }

    #[test]
    fn tiles_come_back_in_row_major_order() {
        let p = checker(7, 5);
        let progress = ExportProgress::new();
        let opts = RenderOptions {
            cell_size: 4,
            margin: 10,
            ..RenderOptions::default()
        };
        let images = export_tiles(&p, &TileSpec::new(3, 2).unwrap(), &opts, &progress).unwrap();
        assert_eq!(images.len(), 9);
        let names: Vec<&str> = images.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names[0], "pattern_row1_col1");
        assert_eq!(names[1], "pattern_row1_col2");
        assert_eq!(names[3], "pattern_row2_col1");
        assert_eq!(names[8], "pattern_row3_col3");
        assert_eq!(progress.progress(), (9, 9));
    }

    #[test]
    fn aborted_export_returns_nothing() {
        let p = checker(10, 10);
        let progress = ExportProgress::new();
        progress.abort();
        let result = export_tiles(&p, &TileSpec::default(), &RenderOptions::default(), &progress);
        assert!(matches!(result, Err(RenderError::Aborted)));
        assert_eq!(progress.progress().0, 0);
    }

    #[test]
    fn progress_can_be_reused_after_reset() {
        let p = checker(6, 6);
        let spec = TileSpec::new(3, 3).unwrap();
        let opts = RenderOptions {
            cell_size: 4,
            margin: 10,
            ..RenderOptions::default()
        };
        let progress = ExportProgress::new();
        progress.abort();
        assert!(matches!(
            export_tiles(&p, &spec, &opts, &progress),
            Err(RenderError::Aborted)
        ));
        // Still aborted until the shell resets it.
        assert!(progress.is_aborted());

        progress.reset();
        assert!(!progress.is_aborted());
        assert_eq!(progress.progress(), (0, 0));
        let images = export_tiles(&p, &spec, &opts, &progress).unwrap();
        assert_eq!(images.len(), 4);
        assert_eq!(progress.progress(), (4, 4));
    }

    #[test]
    fn bad_tile_spec_fails_before_rendering() {
        let p = checker(10, 10);
        let progress = ExportProgress::new();
        let spec = TileSpec { chunk_width: 0, chunk_height: 5 };
        let result = export_tiles(&p, &spec, &RenderOptions::default(), &progress);
        assert!(matches!(result, Err(RenderError::InvalidTileSize { .. })));
        assert_eq!(progress.progress(), (0, 0));
    }

    #[test]
    fn materials_export_is_named_or_absent() {
        let p = checker(3, 3);
        let colors = vec![
            BeadColor::new("A", "Ash", Rgb::new(30, 30, 30)),
            BeadColor::new("B", "Butter", Rgb::new(250, 240, 160)),
        ];
        let fonts = FontSet::default();
        let img = export_materials(&p, &colors, &HiddenSet::new(), true, "List", &fonts)
            .unwrap()
            .unwrap();
        assert_eq!(img.filename, "perler-materials-3x3");

        let hidden: HiddenSet = ["A", "B"].into_iter().collect();
        assert!(export_materials(&p, &colors, &hidden, true, "List", &fonts)
            .unwrap()
            .is_none());
    }
}
