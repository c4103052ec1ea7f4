//! PNG encoding with embedded pattern metadata (tEXt chunks, or iTXt for
//! values outside Latin-1 such as CJK palette names).

use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::surface::Surface;
use crate::tile::Tile;

const SOFTWARE: &str = "Perler";

/// Metadata to embed in an exported PNG as text chunks.
#[derive(Debug, Clone, Default)]
pub struct ExportMetadata {
    /// Size of the whole pattern in cells.
    pub grid_width: u32,
    pub grid_height: u32,
    /// Set for tiled export pages.
    pub tile: Option<Tile>,
    pub palette_name: Option<String>,
    /// Free-form title, usually the one drawn on the image.
    pub title: Option<String>,
}

/// Encode `surface` as an RGBA PNG in memory.
pub fn encode_png(surface: &Surface, metadata: &ExportMetadata) -> crate::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_encoded(&mut bytes, surface, metadata)?;
    Ok(bytes)
}

/// Write `surface` as a PNG file at `path`.
///
/// Uses the `png` crate directly so the pattern description survives in
/// tEXt chunks readable by exiftool and most image viewers.
pub fn write_png(surface: &Surface, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_encoded(&mut writer, surface, metadata)?;
    writer.flush()?;
    debug!(
        "Exported PNG {}x{} to {}",
        surface.width,
        surface.height,
        path.display()
    );
    Ok(())
}

fn write_encoded<W: Write>(
    writer: W,
    surface: &Surface,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let encode_err = |e: png::EncodingError| RenderError::Encode(e.to_string());

    let mut encoder = png::Encoder::new(writer, surface.width, surface.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    add_text(&mut encoder, "Software".to_string(), SOFTWARE.to_string())?;
    add_text(&mut encoder, "Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata) {
        add_text(&mut encoder, key, value)?;
    }

    let mut png_writer = encoder.write_header().map_err(encode_err)?;
    png_writer
        .write_image_data(&surface.pixels)
        .map_err(encode_err)?;
    png_writer.finish().map_err(encode_err)?;
    Ok(())
}

/// tEXt for Latin-1 values, which every viewer reads; iTXt (UTF-8) otherwise.
fn add_text<W: Write>(
    encoder: &mut png::Encoder<'_, W>,
    keyword: String,
    value: String,
) -> crate::Result<()> {
    let result = if is_latin1(&value) {
        encoder.add_text_chunk(keyword, value)
    } else {
        encoder.add_itxt_chunk(keyword, value)
    };
    result.map_err(|e| RenderError::Encode(e.to_string()))
}

fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| (c as u32) <= 0xFF)
}

fn build_description(meta: &ExportMetadata) -> String {
    let mut desc = format!("Bead pattern {}x{}", meta.grid_width, meta.grid_height);
    if let Some(tile) = &meta.tile {
        let r = tile.region;
        desc.push_str(&format!(
            ", part {}-{} (columns {}-{}, rows {}-{})",
            tile.row + 1,
            tile.col + 1,
            r.x + 1,
            r.x + r.width,
            r.y + 1,
            r.y + r.height,
        ));
    }
    desc
}

fn build_metadata_pairs(meta: &ExportMetadata) -> Vec<(String, String)> {
    let mut pairs = vec![(
        "Perler.GridSize".to_string(),
        format!("{}x{}", meta.grid_width, meta.grid_height),
    )];
    if let Some(tile) = &meta.tile {
        pairs.push(("Perler.TileRow".into(), (tile.row + 1).to_string()));
        pairs.push(("Perler.TileCol".into(), (tile.col + 1).to_string()));
        pairs.push((
            "Perler.TileOrigin".into(),
            format!("{},{}", tile.region.x, tile.region.y),
        ));
    }
    if let Some(palette) = &meta.palette_name {
        pairs.push(("Perler.Palette".into(), palette.clone()));
    }
    if let Some(title) = &meta.title {
        pairs.push(("Title".into(), title.clone()));
    }
    pairs
}
