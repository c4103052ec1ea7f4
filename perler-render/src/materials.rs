//! Material (shopping list) table: one row per bead color used, most used
//! first.

use tracing::debug;

use perler_core::{BeadColor, HiddenSet, PatternData, Rgb};

use crate::surface::Surface;
use crate::text::{draw_text, FontSet, TextAlign, TextStyle};

const ROW_HEIGHT: u32 = 80;
const HEADER_HEIGHT: u32 = 120;
const PADDING: u32 = 40;
const SWATCH_COL: u32 = 100;
const ID_COL: u32 = 160;
const NAME_COL: u32 = 300;
const COUNT_COL: u32 = 160;
/// Full table image width.
pub const TABLE_WIDTH: u32 = PADDING * 2 + SWATCH_COL + ID_COL + NAME_COL + COUNT_COL;

const SWATCH_RADIUS: f32 = 24.0;
const TITLE_SIZE: f32 = 40.0;
const TEXT_SIZE: f32 = 28.0;
/// Alpha for hidden rows that are listed but marked as excluded (0.3).
const HIDDEN_ROW_ALPHA: u8 = 77;

const ZEBRA_COLOR: Rgb = Rgb::new(0xf8, 0xfa, 0xfc);
const SWATCH_STROKE: Rgb = Rgb::new(0xcb, 0xd5, 0xe1);
const ID_COLOR: Rgb = Rgb::new(0x64, 0x74, 0x8b);
const NAME_COLOR: Rgb = Rgb::new(0x33, 0x41, 0x55);
const COUNT_COLOR: Rgb = Rgb::new(0x0f, 0x17, 0x2a);
const BORDER_COLOR: Rgb = Rgb::new(0xe2, 0xe8, 0xf0);

/// One line of the material list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRow<'a> {
    pub color: &'a BeadColor,
    pub count: u32,
    /// Listed but hidden in the pattern.
    pub hidden: bool,
}

/// Result of [`render_materials`]: a picture, or nothing worth listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialTable {
    Empty,
    Rendered(Surface),
}

impl MaterialTable {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_surface(self) -> Option<Surface> {
        match self {
            Self::Empty => None,
            Self::Rendered(surface) => Some(surface),
        }
    }
}

/// Palette colors that occur in `pattern`, sorted by count descending.
///
/// Ties keep palette order. Colors missing from the pattern's counts are
/// skipped, and hidden colors are dropped when `exclude_hidden` is set.
pub fn material_rows<'a>(
    pattern: &PatternData,
    colors: &'a [BeadColor],
    hidden: &HiddenSet,
    exclude_hidden: bool,
) -> Vec<MaterialRow<'a>> {
    let mut rows: Vec<MaterialRow<'a>> = colors
        .iter()
        .filter_map(|color| {
            let count = pattern.count(&color.id);
            let is_hidden = hidden.contains(&color.id);
            (count > 0 && !(exclude_hidden && is_hidden)).then_some(MaterialRow {
                color,
                count,
                hidden: is_hidden,
            })
        })
        .collect();
    // `sort_by` is stable, which keeps palette order on equal counts.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Draw the material table for `pattern` against a palette's colors.
///
/// Returns [`MaterialTable::Empty`] instead of a blank image when no color
/// qualifies.
pub fn render_materials(
    pattern: &PatternData,
    colors: &[BeadColor],
    hidden: &HiddenSet,
    exclude_hidden: bool,
    title: &str,
    fonts: &FontSet,
) -> crate::Result<MaterialTable> {
    let rows = material_rows(pattern, colors, hidden, exclude_hidden);
    if rows.is_empty() {
        debug!("No materials to list");
        return Ok(MaterialTable::Empty);
    }

    let n = rows.len() as u64;
    let height = HEADER_HEIGHT as u64 + n * ROW_HEIGHT as u64 + PADDING as u64 * 2;
    let mut surface = Surface::white(TABLE_WIDTH as u64, height)?;

    let title_style = TextStyle::new(
        fonts.bold.as_ref(),
        TITLE_SIZE,
        TextAlign::Center,
        NAME_COLOR.with_alpha(255),
    );
    draw_text(
        &mut surface,
        title,
        (TABLE_WIDTH as f32 / 2.0, (PADDING + 40) as f32),
        &title_style,
    );

    let pad = PADDING as f32;
    let row_h = ROW_HEIGHT as f32;
    let inner_w = (TABLE_WIDTH - PADDING * 2) as f32;
    for (index, row) in rows.iter().enumerate() {
        let cy = (PADDING + HEADER_HEIGHT) as f32 + index as f32 * row_h;
        if index % 2 == 0 {
            surface.fill_rect(pad, cy - row_h / 2.0, inner_w, row_h, ZEBRA_COLOR.with_alpha(255));
        }
        let alpha = if row.hidden && !exclude_hidden {
            HIDDEN_ROW_ALPHA
        } else {
            255
        };

        let mut x = pad;
        let swatch_x = x + SWATCH_COL as f32 / 2.0;
        surface.fill_circle(swatch_x, cy, SWATCH_RADIUS, row.color.color.with_alpha(alpha));
        surface.stroke_circle(swatch_x, cy, SWATCH_RADIUS, 2.0, SWATCH_STROKE.with_alpha(alpha));
        x += SWATCH_COL as f32;

        let id_style = TextStyle::new(
            fonts.mono.as_ref(),
            TEXT_SIZE,
            TextAlign::Left,
            ID_COLOR.with_alpha(alpha),
        );
        draw_text(&mut surface, &row.color.id, (x, cy), &id_style);
        x += ID_COL as f32;

        let name_style = TextStyle::new(
            fonts.regular.as_ref(),
            TEXT_SIZE,
            TextAlign::Left,
            NAME_COLOR.with_alpha(alpha),
        );
        draw_text(&mut surface, &row.color.name, (x, cy), &name_style);
        x += NAME_COL as f32;

        let count_right = x + COUNT_COL as f32 - 20.0;
        let count_style = TextStyle::new(
            fonts.bold.as_ref(),
            TEXT_SIZE,
            TextAlign::Right,
            COUNT_COLOR.with_alpha(alpha),
        );
        draw_text(&mut surface, &row.count.to_string(), (count_right, cy), &count_style);
    }

    surface.stroke_rect(
        pad,
        (PADDING + HEADER_HEIGHT) as f32 - row_h / 2.0,
        inner_w,
        n as f32 * row_h,
        4.0,
        BORDER_COLOR.with_alpha(255),
    );
    debug!(rows = rows.len(), height, "Rendered material table");
    Ok(MaterialTable::Rendered(surface))
}
