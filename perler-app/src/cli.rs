// ============================================================================
// Perler CLI: headless export and editing of bead patterns
// ============================================================================
//
// Usage examples:
//   perler export heart.json -o out/
//   perler tiles heart.json --chunk 29x29 -o out/ --hide H01
//   perler materials heart.json --palette hama.csv
//   perler replace heart.json --from H01 --to H18 --palette hama.csv -o heart2.json
//   perler import-palette hama.csv --name "Hama Midi"
//
// Patterns are JSON documents `{ "width", "height", "grid": [[{id, name, hex}]] }`.
// Palettes are CSV (`id,name,hex`) or JSON (a palette object or a color list).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use perler_core::{
    parse_palette_csv, BeadColor, Edit, HiddenSet, JsonPaletteStore, Palette, PaletteStore,
    PatternData,
};
use perler_render::{
    export_full, export_materials, export_tiles, write_png, ExportMetadata, ExportProgress,
    ExportedImage, FontSet, RenderOptions, ShapeMode, TileSpec,
};

use crate::preferences::ExportPreferences;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Perler bead pattern exporter.
#[derive(Parser, Debug)]
#[command(
    name = "perler",
    version,
    about = "Render bead patterns to printable PNG sheets and material lists"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the whole pattern as one labeled PNG.
    Export {
        /// Pattern JSON file.
        pattern: PathBuf,
        /// Output directory (default from preferences).
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Title prefix (default from preferences).
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Split the pattern into peg-board sized tiles, one PNG each.
    Tiles {
        pattern: PathBuf,
        /// Tile size in cells, `WxH` or a single number for squares.
        #[arg(long, value_name = "WxH", value_parser = parse_chunk)]
        chunk: Option<TileSpec>,
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Render the shopping list of bead colors.
    Materials {
        pattern: PathBuf,
        /// Palette CSV/JSON. Defaults to the active stored palette.
        #[arg(long, value_name = "FILE")]
        palette: Option<PathBuf>,
        /// List hidden colors too, faded.
        #[arg(long)]
        include_hidden: bool,
        #[arg(long, default_value = "Materials")]
        title: String,
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Replace a color everywhere, or one cell.
    Replace {
        pattern: PathBuf,
        /// Color id to replace everywhere.
        #[arg(long, value_name = "ID")]
        from: Option<String>,
        /// Single cell to replace, zero-based `X,Y`.
        #[arg(long, value_name = "X,Y", value_parser = parse_cell, conflicts_with = "from")]
        at: Option<(u32, u32)>,
        /// Replacement color id, looked up in the palette.
        #[arg(long, value_name = "ID")]
        to: String,
        #[arg(long, value_name = "FILE")]
        palette: Option<PathBuf>,
        /// Where to write the edited pattern (default: stdout).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Add a CSV palette to the custom palette library and select it.
    ImportPalette {
        file: PathBuf,
        #[arg(long)]
        name: String,
        /// Palette library file (default from preferences).
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,
    },
    /// List, select or remove custom palettes.
    Palettes {
        #[arg(long, value_name = "ID")]
        select: Option<String>,
        #[arg(long, value_name = "ID", conflicts_with = "select")]
        remove: Option<String>,
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,
    },
    /// Change saved export defaults.
    Config {
        #[arg(long)]
        cell_size: Option<u32>,
        #[arg(long, value_parser = parse_chunk, value_name = "WxH")]
        chunk: Option<TileSpec>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Restore every default first.
        #[arg(long)]
        reset: bool,
    },
}

/// Look of the rendered images.
#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Color id to leave empty. Repeatable.
    #[arg(long = "hide", value_name = "ID")]
    pub hide: Vec<String>,
    /// Square beads instead of circles.
    #[arg(long)]
    pub square: bool,
    /// No color id labels on beads.
    #[arg(long)]
    pub no_labels: bool,
    /// Cell edge in pixels.
    #[arg(long, value_name = "PX")]
    pub cell_size: Option<u32>,
    /// TTF/OTF font for all text.
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,
    /// Heavy lines only on real 10-cell boundaries.
    #[arg(long)]
    pub absolute_edges: bool,
}

fn parse_chunk(s: &str) -> Result<TileSpec, String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{v}' is not a whole number"))
    };
    let (w, h) = match s.split_once(['x', 'X']) {
        Some((w, h)) => (parse(w)?, parse(h)?),
        None => {
            let n = parse(s)?;
            (n, n)
        }
    };
    TileSpec::new(w, h).map_err(|e| e.to_string())
}

fn parse_cell(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x = x.trim().parse().map_err(|_| format!("bad column '{x}'"))?;
    let y = y.trim().parse().map_err(|_| format!("bad row '{y}'"))?;
    Ok((x, y))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run one command and return an OS exit code.
pub fn run(cli: Cli, prefs: ExportPreferences) -> ExitCode {
    let result = match cli.command {
        Command::Export {
            pattern,
            output,
            title,
            style,
        } => cmd_export(&prefs, &pattern, output, title, &style),
        Command::Tiles {
            pattern,
            chunk,
            output,
            style,
        } => cmd_tiles(&prefs, &pattern, chunk, output, &style),
        Command::Materials {
            pattern,
            palette,
            include_hidden,
            title,
            output,
            style,
        } => cmd_materials(&prefs, &pattern, palette.as_deref(), include_hidden, &title, output, &style),
        Command::Replace {
            pattern,
            from,
            at,
            to,
            palette,
            output,
        } => cmd_replace(&prefs, &pattern, from, at, &to, palette.as_deref(), output.as_deref()),
        Command::ImportPalette { file, name, store } => {
            cmd_import_palette(&prefs, &file, &name, store)
        }
        Command::Palettes {
            select,
            remove,
            store,
        } => cmd_palettes(&prefs, select, remove, store),
        Command::Config {
            cell_size,
            chunk,
            title,
            output_dir,
            reset,
        } => {
            cmd_config(prefs, cell_size, chunk, title, output_dir, reset);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_export(
    prefs: &ExportPreferences,
    pattern_path: &Path,
    output: Option<PathBuf>,
    title: Option<String>,
    style: &StyleArgs,
) -> Result<(), String> {
    let pattern = load_pattern(pattern_path)?;
    let title = title.unwrap_or_else(|| prefs.app_title.clone());
    let options = render_options(prefs, style, Some(title))?;
    let image = export_full(&pattern, &options).map_err(|e| e.to_string())?;
    let dir = output.unwrap_or_else(|| prefs.output_dir());
    let meta = metadata(&pattern, &image, None);
    let path = save_image(&dir, &image, &meta)?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_tiles(
    prefs: &ExportPreferences,
    pattern_path: &Path,
    chunk: Option<TileSpec>,
    output: Option<PathBuf>,
    style: &StyleArgs,
) -> Result<(), String> {
    let pattern = load_pattern(pattern_path)?;
    let spec = chunk.unwrap_or_else(|| prefs.tile_spec());
    let options = render_options(prefs, style, None)?;
    let progress = ExportProgress::new();
    let images = export_tiles(&pattern, &spec, &options, &progress).map_err(|e| e.to_string())?;

    let dir = output.unwrap_or_else(|| prefs.output_dir());
    let start = Instant::now();
    for image in &images {
        let meta = metadata(&pattern, image, None);
        let path = save_image(&dir, image, &meta)?;
        println!("{}", path.display());
    }
    info!(
        tiles = images.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Wrote tiles to {}",
        dir.display()
    );
    Ok(())
}

fn cmd_materials(
    prefs: &ExportPreferences,
    pattern_path: &Path,
    palette_path: Option<&Path>,
    include_hidden: bool,
    title: &str,
    output: Option<PathBuf>,
    style: &StyleArgs,
) -> Result<(), String> {
    let pattern = load_pattern(pattern_path)?;
    let palette = resolve_palette(prefs, palette_path, &pattern)?;
    let hidden: HiddenSet = style.hide.iter().cloned().collect();
    let fonts = load_fonts(prefs, style)?;
    let exclude_hidden = !include_hidden && prefs.exclude_hidden_from_materials;

    let image = export_materials(&pattern, &palette.colors, &hidden, exclude_hidden, title, &fonts)
        .map_err(|e| e.to_string())?;
    let Some(image) = image else {
        warn!("Material list is empty");
        println!("No beads to list: every used color is hidden or missing from the palette.");
        return Ok(());
    };
    let dir = output.unwrap_or_else(|| prefs.output_dir());
    let meta = metadata(&pattern, &image, Some(&palette));
    let path = save_image(&dir, &image, &meta)?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_replace(
    prefs: &ExportPreferences,
    pattern_path: &Path,
    from: Option<String>,
    at: Option<(u32, u32)>,
    to: &str,
    palette_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), String> {
    let pattern = load_pattern(pattern_path)?;
    let palette = resolve_palette(prefs, palette_path, &pattern)?;
    let with = palette
        .get(to)
        .cloned()
        .ok_or_else(|| format!("color '{to}' is not in palette '{}'", palette.name))?;

    let edit = match (from, at) {
        (Some(target), None) => Edit::ReplaceAll { target, with },
        (None, Some((x, y))) => Edit::ReplaceCell { x, y, with },
        _ => return Err("give exactly one of --from ID or --at X,Y".into()),
    };
    let edited = edit.apply(&pattern).map_err(|e| e.to_string())?;
    info!(
        to,
        before = pattern.count(to),
        after = edited.count(to),
        "Replaced colors"
    );

    let json = serde_json::to_string_pretty(&edited)
        .map_err(|e| format!("Failed to serialize pattern: {e}"))?;
    match output {
        Some(path) => fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_import_palette(
    prefs: &ExportPreferences,
    file: &Path,
    name: &str,
    store: Option<PathBuf>,
) -> Result<(), String> {
    let text = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let colors = parse_palette_csv(&text).map_err(|e| e.to_string())?;
    let store = JsonPaletteStore::new(store.unwrap_or_else(|| prefs.palette_store_path()));
    let mut library = store.load().map_err(|e| e.to_string())?;
    let count = colors.len();
    let id = library.add_custom(name, colors).map_err(|e| e.to_string())?;
    store.save(&library).map_err(|e| e.to_string())?;
    println!("Imported {count} colors as '{name}' ({id})");
    Ok(())
}

fn cmd_palettes(
    prefs: &ExportPreferences,
    select: Option<String>,
    remove: Option<String>,
    store: Option<PathBuf>,
) -> Result<(), String> {
    let store = JsonPaletteStore::new(store.unwrap_or_else(|| prefs.palette_store_path()));
    let mut library = store.load().map_err(|e| e.to_string())?;

    if let Some(id) = remove {
        if !library.remove_custom(&id) {
            return Err(format!("no custom palette '{id}'"));
        }
        store.save(&library).map_err(|e| e.to_string())?;
    } else if let Some(id) = select {
        if !library.custom.iter().any(|p| p.id == id) {
            return Err(format!("no custom palette '{id}'"));
        }
        library.select(id);
        store.save(&library).map_err(|e| e.to_string())?;
    }

    let active = library.active(&[]).map(|p| p.id.clone());
    for palette in library.all(&[]) {
        let mark = if Some(&palette.id) == active.as_ref() { "*" } else { " " };
        println!("{mark} {:<12} {:<24} {} colors", palette.id, palette.name, palette.len());
    }
    Ok(())
}

fn cmd_config(
    prefs: ExportPreferences,
    cell_size: Option<u32>,
    chunk: Option<TileSpec>,
    title: Option<String>,
    output_dir: Option<PathBuf>,
    reset: bool,
) {
    let mut prefs = if reset { ExportPreferences::default() } else { prefs };
    if let Some(cell_size) = cell_size {
        prefs.cell_size = cell_size;
    }
    if let Some(spec) = chunk {
        prefs.chunk_width = spec.chunk_width;
        prefs.chunk_height = spec.chunk_height;
    }
    if let Some(title) = title {
        prefs.app_title = title;
    }
    if let Some(dir) = output_dir {
        prefs.output_dir = dir.display().to_string();
    }
    prefs.save();
    match serde_json::to_string_pretty(&prefs) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize preferences: {e}"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load_pattern(path: &Path) -> Result<PatternData, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read pattern {}: {e}", path.display()))?;
    let pattern: PatternData = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid pattern {}: {e}", path.display()))?;
    info!(
        width = pattern.width(),
        height = pattern.height(),
        colors = pattern.counts().len(),
        "Loaded pattern {}",
        path.display()
    );
    Ok(pattern)
}

/// Load a palette file: CSV by extension, otherwise JSON (a palette object
/// or a bare color list).
fn load_palette(path: &Path) -> Result<Palette, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read palette {}: {e}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "palette".into());
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let colors = parse_palette_csv(&text).map_err(|e| e.to_string())?;
        return Palette::new(stem.clone(), stem, colors).map_err(|e| e.to_string());
    }
    if let Ok(palette) = serde_json::from_str::<Palette>(&text) {
        return Palette::new(palette.id, palette.name, palette.colors).map_err(|e| e.to_string());
    }
    let colors: Vec<BeadColor> = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid palette {}: {e}", path.display()))?;
    Palette::new(stem.clone(), stem, colors).map_err(|e| e.to_string())
}

/// The palette given on the command line, else the active stored one, else
/// the colors the pattern itself uses.
fn resolve_palette(
    prefs: &ExportPreferences,
    palette_path: Option<&Path>,
    pattern: &PatternData,
) -> Result<Palette, String> {
    if let Some(path) = palette_path {
        return load_palette(path);
    }
    let store = JsonPaletteStore::new(prefs.palette_store_path());
    match store.load() {
        Ok(library) => {
            if let Some(active) = library.active(&[]) {
                info!(id = %active.id, "Using stored palette");
                return Ok(active.clone());
            }
        }
        Err(e) => warn!("Ignoring palette store: {e}"),
    }
    Ok(palette_from_pattern(pattern))
}

/// Colors in order of first appearance, row-major.
fn palette_from_pattern(pattern: &PatternData) -> Palette {
    let mut colors: Vec<BeadColor> = Vec::new();
    for bead in pattern.grid().iter().flatten() {
        if !colors.iter().any(|c| c.id == bead.id) {
            colors.push(bead.clone());
        }
    }
    Palette {
        id: "pattern".into(),
        name: "Pattern colors".into(),
        colors,
    }
}

fn load_fonts(prefs: &ExportPreferences, style: &StyleArgs) -> Result<FontSet, String> {
    let path = style.font.clone().or_else(|| {
        (!prefs.font_path.is_empty()).then(|| PathBuf::from(&prefs.font_path))
    });
    match path {
        Some(path) => {
            let bytes = fs::read(&path)
                .map_err(|e| format!("Failed to read font {}: {e}", path.display()))?;
            FontSet::from_font_bytes(bytes).map_err(|e| e.to_string())
        }
        None => Ok(FontSet::default()),
    }
}

fn render_options(
    prefs: &ExportPreferences,
    style: &StyleArgs,
    title: Option<String>,
) -> Result<RenderOptions, String> {
    let options = RenderOptions {
        cell_size: style.cell_size.unwrap_or(prefs.cell_size),
        margin: prefs.margin,
        shape: if style.square { ShapeMode::Square } else { prefs.shape() },
        title,
        hidden: style.hide.iter().cloned().collect(),
        show_labels: prefs.show_labels && !style.no_labels,
        block_edges: if style.absolute_edges {
            perler_render::BlockEdgePolicy::AbsoluteOnly
        } else {
            prefs.block_edges()
        },
        fonts: load_fonts(prefs, style)?,
    };
    options.validate().map_err(|e| e.to_string())?;
    Ok(options)
}

fn metadata(pattern: &PatternData, image: &ExportedImage, palette: Option<&Palette>) -> ExportMetadata {
    ExportMetadata {
        grid_width: pattern.width(),
        grid_height: pattern.height(),
        tile: image.tile,
        palette_name: palette.map(|p| p.name.clone()),
        title: image.tile.map(|t| t.title()),
    }
}

fn save_image(dir: &Path, image: &ExportedImage, meta: &ExportMetadata) -> Result<PathBuf, String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
    let path = dir.join(format!("{}.png", image.filename));
    write_png(&image.surface, &path, meta).map_err(|e| e.to_string())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use perler_core::Rgb;

    #[test]
    fn chunk_accepts_pairs_and_squares() {
        assert_eq!(parse_chunk("10x12").unwrap(), TileSpec::new(10, 12).unwrap());
        assert_eq!(parse_chunk("29").unwrap(), TileSpec::default());
        assert!(parse_chunk("0x5").is_err());
        assert!(parse_chunk("axb").is_err());
    }

    #[test]
    fn cell_parses_x_then_y() {
        assert_eq!(parse_cell("3, 7").unwrap(), (3, 7));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("-1,2").is_err());
    }

    #[test]
    fn tiles_command_parses_style() {
        let cli = Cli::try_parse_from([
            "perler", "tiles", "p.json", "--chunk", "10x10", "--hide", "H01", "--hide", "H02",
            "--square", "--no-labels",
        ])
        .unwrap();
        let Command::Tiles { chunk, style, .. } = cli.command else {
            panic!("expected tiles");
        };
        assert_eq!(chunk, Some(TileSpec::new(10, 10).unwrap()));
        assert_eq!(style.hide, vec!["H01", "H02"]);
        assert!(style.square && style.no_labels);
    }

    #[test]
    fn replace_rejects_both_targets() {
        let err = Cli::try_parse_from([
            "perler", "replace", "p.json", "--from", "H01", "--at", "1,1", "--to", "H02",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn style_overrides_preferences() {
        let prefs = ExportPreferences::default();
        let style = StyleArgs {
            hide: vec!["H01".into()],
            square: true,
            no_labels: true,
            cell_size: Some(20),
            font: None,
            absolute_edges: true,
        };
        let o = render_options(&prefs, &style, None).unwrap();
        assert_eq!(o.cell_size, 20);
        assert_eq!(o.shape, ShapeMode::Square);
        assert!(!o.show_labels);
        assert!(o.hidden.contains("H01"));
        assert_eq!(o.block_edges, perler_render::BlockEdgePolicy::AbsoluteOnly);

        let bad = StyleArgs {
            cell_size: Some(0),
            ..StyleArgs::default()
        };
        assert!(render_options(&prefs, &bad, None).is_err());
    }

    #[test]
    fn pattern_palette_keeps_first_appearance_order() {
        let a = BeadColor::new("A", "A", Rgb::new(1, 1, 1));
        let b = BeadColor::new("B", "B", Rgb::new(2, 2, 2));
        let p = PatternData::from_fn(3, 2, |x, y| if x == 2 && y == 0 { b.clone() } else { a.clone() })
            .unwrap();
        let palette = palette_from_pattern(&p);
        let ids: Vec<&str> = palette.colors.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn csv_and_json_palettes_load() {
        let dir = std::env::temp_dir().join("perler_test_cli_palettes");
        fs::create_dir_all(&dir).unwrap();
        let csv = dir.join("hama.csv");
        fs::write(&csv, "id,name,hex\nH01,White,#ffffff\nH18,Black,000000\n").unwrap();
        let palette = load_palette(&csv).unwrap();
        assert_eq!(palette.name, "hama");
        assert_eq!(palette.len(), 2);

        let json = dir.join("list.json");
        fs::write(&json, r##"[{"id":"A","name":"Red","hex":"#ff0000"}]"##).unwrap();
        let palette = load_palette(&json).unwrap();
        assert_eq!(palette.get("A").unwrap().color, Rgb::new(255, 0, 0));
        let _ = fs::remove_dir_all(&dir);
    }
}
