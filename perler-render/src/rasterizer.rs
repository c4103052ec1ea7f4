//! The labeled cell rasterizer and the live preview renderer.
//!
//! [`render_region`] draws a block of cells the way it is printed: white
//! background, optional title band, absolute rulers, bead shapes with color
//! id labels and heavy 10×10 reference lines. Because the region carries its
//! absolute offset, a tile cut from the middle of a large pattern still shows
//! the rulers and block lines of the full pattern.

use tracing::debug;

use perler_core::{BeadColor, HiddenSet, PatternData, Rgb};

use crate::error::RenderError;
use crate::options::{
    BlockEdgePolicy, RenderOptions, ShapeMode, BLOCK_INTERVAL, RULER_INTERVAL, TITLE_FONT_SIZE,
};
use crate::surface::Surface;
use crate::text::{draw_text, TextAlign, TextStyle};
use crate::tile::GridRegion;

const TITLE_COLOR: Rgb = Rgb::new(0x33, 0x41, 0x55);
const RULER_COLOR: Rgb = Rgb::new(0x64, 0x74, 0x8b);
const CELL_BORDER_COLOR: Rgb = Rgb::new(0xe2, 0xe8, 0xf0);
const BLOCK_LINE_COLOR: Rgb = Rgb::new(0x94, 0xa3, 0xb8);

/// Whether an absolute one-based ruler number gets a label.
///
/// The first and last index of the region are always labeled, then every
/// multiple of [`RULER_INTERVAL`].
pub fn is_ruler_label(absolute: u32, is_last: bool) -> bool {
    absolute == 1 || absolute % RULER_INTERVAL == 0 || is_last
}

/// Render `region` of `pattern` as a labeled raster.
///
/// The surface is `region.width * cell + margin` wide and
/// `region.height * cell + margin + title band` tall.
pub fn render_region(
    pattern: &PatternData,
    region: GridRegion,
    options: &RenderOptions,
) -> crate::Result<Surface> {
    options.validate()?;
    if !region.fits(pattern.width(), pattern.height()) {
        return Err(RenderError::RegionOutOfBounds {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            grid_width: pattern.width(),
            grid_height: pattern.height(),
        });
    }

    let cell = options.cell_size as u64;
    let margin = options.margin as u64;
    let band = options.title_band() as u64;
    let mut surface = Surface::white(
        region.width as u64 * cell + margin,
        region.height as u64 * cell + margin + band,
    )?;
    debug!(
        x = region.x,
        y = region.y,
        width = surface.width,
        height = surface.height,
        "Rendering region"
    );

    if let Some(title) = &options.title {
        let title_x = surface.width as f32 / 2.0;
        let style = TextStyle::new(
            options.fonts.bold.as_ref(),
            TITLE_FONT_SIZE,
            TextAlign::Center,
            TITLE_COLOR.with_alpha(255),
        );
        draw_text(&mut surface, title, (title_x, band as f32 / 2.0), &style);
    }

    draw_rulers(&mut surface, region, options);

    let cell = options.cell_size as f32;
    let origin_x = options.margin as f32;
    let origin_y = (options.margin + options.title_band()) as f32;

    for y in 0..region.height {
        for x in 0..region.width {
            let Some(bead) = pattern.cell(region.x + x, region.y + y) else {
                continue;
            };
            let left = origin_x + x as f32 * cell;
            let top = origin_y + y as f32 * cell;
            surface.stroke_rect(
                left,
                top,
                cell,
                cell,
                options.cell_line_width(),
                CELL_BORDER_COLOR.with_alpha(255),
            );
            if options.hidden.contains(&bead.id) {
                continue;
            }
            draw_bead(
                &mut surface,
                left,
                top,
                cell,
                options.shape,
                options.bead_inset(),
                bead.color,
            );
            if options.show_labels {
                draw_label(&mut surface, bead, left + cell / 2.0, top + cell / 2.0, options);
            }
        }
    }

    draw_block_lines(&mut surface, region, origin_x, origin_y, options);
    Ok(surface)
}

fn draw_rulers(surface: &mut Surface, region: GridRegion, options: &RenderOptions) {
    let style = TextStyle::new(
        options.fonts.bold.as_ref(),
        options.ruler_font_size(),
        TextAlign::Center,
        RULER_COLOR.with_alpha(255),
    );
    let cell = options.cell_size as f32;
    let margin = options.margin as f32;
    let band = options.title_band() as f32;

    for x in 0..region.width {
        let absolute = region.x + x + 1;
        if is_ruler_label(absolute, x == region.width - 1) {
            let cx = margin + x as f32 * cell + cell / 2.0;
            draw_text(surface, &absolute.to_string(), (cx, band + margin / 2.0), &style);
        }
    }
    for y in 0..region.height {
        let absolute = region.y + y + 1;
        if is_ruler_label(absolute, y == region.height - 1) {
            let cy = band + margin + y as f32 * cell + cell / 2.0;
            draw_text(surface, &absolute.to_string(), (margin / 2.0, cy), &style);
        }
    }
}

fn draw_bead(
    surface: &mut Surface,
    left: f32,
    top: f32,
    cell: f32,
    shape: ShapeMode,
    inset: f32,
    color: Rgb,
) {
    let rgba = color.with_alpha(255);
    match shape {
        ShapeMode::Circle => {
            let radius = cell / 2.0 - inset;
            surface.fill_circle(left + cell / 2.0, top + cell / 2.0, radius, rgba);
        }
        ShapeMode::Square => {
            let side = cell - 2.0 * inset;
            surface.fill_rect(left + inset, top + inset, side, side, rgba);
        }
    }
}

fn draw_label(surface: &mut Surface, bead: &BeadColor, cx: f32, cy: f32, options: &RenderOptions) {
    let style = TextStyle::new(
        options.fonts.bold.as_ref(),
        options.label_font_size(),
        TextAlign::Center,
        bead.color.contrast_text().with_alpha(255),
    );
    draw_text(surface, &bead.id, (cx, cy), &style);
}

/// Heavy 10×10 reference lines plus the region edges, per the options'
/// [`BlockEdgePolicy`].
fn draw_block_lines(
    surface: &mut Surface,
    region: GridRegion,
    origin_x: f32,
    origin_y: f32,
    options: &RenderOptions,
) {
    let cell = options.cell_size as f32;
    let heavy = options.block_line_width();
    let heavy_color = BLOCK_LINE_COLOR.with_alpha(255);
    let grid_w = region.width as f32 * cell;
    let grid_h = region.height as f32 * cell;

    let on_block = |absolute: u32| match options.block_edges {
        BlockEdgePolicy::Border => absolute != 0 && absolute % BLOCK_INTERVAL == 0,
        BlockEdgePolicy::AbsoluteOnly => absolute % BLOCK_INTERVAL == 0,
    };

    if options.block_edges == BlockEdgePolicy::AbsoluteOnly {
        surface.stroke_rect(
            origin_x,
            origin_y,
            grid_w,
            grid_h,
            options.cell_line_width(),
            CELL_BORDER_COLOR.with_alpha(255),
        );
    }

    for i in 0..=region.width {
        if on_block(region.x + i) {
            let x = origin_x + i as f32 * cell;
            surface.vline(x, origin_y, origin_y + grid_h, heavy, heavy_color);
        }
    }
    for i in 0..=region.height {
        if on_block(region.y + i) {
            let y = origin_y + i as f32 * cell;
            surface.hline(y, origin_x, origin_x + grid_w, heavy, heavy_color);
        }
    }

    if options.block_edges == BlockEdgePolicy::Border {
        surface.stroke_rect(origin_x, origin_y, grid_w, grid_h, heavy, heavy_color);
    }
}

/// Render the live preview of the whole pattern.
///
/// Transparent background, no rulers or labels. Hidden cells stay
/// transparent. Circles are inset half a pixel; squares fill the cell.
pub fn render_preview(
    pattern: &PatternData,
    hidden: &HiddenSet,
    shape: ShapeMode,
    cell_size: u32,
) -> crate::Result<Surface> {
    if cell_size == 0 {
        return Err(RenderError::InvalidCellSize(cell_size));
    }
    let cell = cell_size as u64;
    let mut surface =
        Surface::transparent(pattern.width() as u64 * cell, pattern.height() as u64 * cell)?;
    let cell = cell_size as f32;
    let inset = match shape {
        ShapeMode::Circle => 0.5,
        ShapeMode::Square => 0.0,
    };
    for (y, row) in pattern.grid().iter().enumerate() {
        for (x, bead) in row.iter().enumerate() {
            if hidden.contains(&bead.id) {
                continue;
            }
            let (left, top) = (x as f32 * cell, y as f32 * cell);
            draw_bead(&mut surface, left, top, cell, shape, inset, bead.color);
        }
    }
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::WHITE;

    fn two_color(width: u32, height: u32) -> PatternData {
        let red = BeadColor::new("R", "Red", Rgb::new(255, 0, 0));
        let blue = BeadColor::new("B", "Blue", Rgb::new(0, 0, 255));
        PatternData::from_fn(width, height, |x, _| if x % 2 == 0 { red.clone() } else { blue.clone() })
            .unwrap()
    }

    fn plain_options() -> RenderOptions {
        RenderOptions {
            show_labels: false,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn surface_size_follows_region_and_title() {
        let p = two_color(12, 7);
        let o = plain_options();
        let s = render_region(&p, GridRegion::full(12, 7), &o).unwrap();
        assert_eq!((s.width, s.height), (12 * 50 + 80, 7 * 50 + 80));

        let titled = o.with_title(Some("12x7".into()));
        let s = render_region(&p, GridRegion { x: 2, y: 1, width: 3, height: 4 }, &titled).unwrap();
        assert_eq!((s.width, s.height), (3 * 50 + 80, 4 * 50 + 80 + 80));
    }

    #[test]
    fn bead_centre_has_bead_color() {
        let p = two_color(4, 4);
        let s = render_region(&p, GridRegion::full(4, 4), &plain_options()).unwrap();
        // Cell (0, 0) centre and cell (1, 0) centre.
        assert_eq!(s.pixel(80 + 25, 80 + 25), [255, 0, 0, 255]);
        assert_eq!(s.pixel(80 + 75, 80 + 25), [0, 0, 255, 255]);
    }

    #[test]
    fn hidden_cells_are_left_empty() {
        let p = two_color(4, 4);
        let o = RenderOptions {
            hidden: HiddenSet::new().with("R"),
            ..plain_options()
        };
        let s = render_region(&p, GridRegion::full(4, 4), &o).unwrap();
        assert_eq!(s.pixel(80 + 25, 80 + 25), WHITE);
        assert_eq!(s.pixel(80 + 75, 80 + 25), [0, 0, 255, 255]);
    }

    #[test]
    fn square_mode_fills_near_corners() {
        let p = two_color(2, 2);
        let o = RenderOptions {
            shape: ShapeMode::Square,
            ..plain_options()
        };
        let s = render_region(&p, GridRegion::full(2, 2), &o).unwrap();
        // Inset is 2px; a circle would leave (5, 5) inside the cell white.
        assert_eq!(s.pixel(80 + 5, 80 + 5), [255, 0, 0, 255]);
        let c = render_region(&p, GridRegion::full(2, 2), &plain_options()).unwrap();
        assert_eq!(c.pixel(80 + 5, 80 + 5), WHITE);
    }

    #[test]
    fn region_outside_pattern_is_rejected() {
        let p = two_color(5, 5);
        let r = GridRegion { x: 3, y: 0, width: 3, height: 5 };
        assert!(matches!(
            render_region(&p, r, &plain_options()),
            Err(RenderError::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn zero_cell_size_is_rejected_before_drawing() {
        let p = two_color(5, 5);
        let o = RenderOptions {
            cell_size: 0,
            ..plain_options()
        };
        assert!(matches!(
            render_region(&p, GridRegion::full(5, 5), &o),
            Err(RenderError::InvalidCellSize(0))
        ));
        assert!(render_preview(&p, &HiddenSet::new(), ShapeMode::Circle, 0).is_err());
    }

    #[test]
    fn ruler_labels_first_last_and_fifths() {
        let labeled: Vec<u32> = (0..12)
            .map(|x| 1 + x)
            .filter(|&abs| is_ruler_label(abs, abs == 12))
            .collect();
        assert_eq!(labeled, vec![1, 5, 10, 12]);
        assert!(is_ruler_label(15, false));
        assert!(!is_ruler_label(16, false));
    }

    /// Column `local` of the ruler band above the grid, as pixels.
    fn ruler_strip(s: &Surface, local: u32) -> Vec<[u8; 4]> {
        let x0 = 80 + local * 50;
        (0..76)
            .flat_map(|y| (x0..x0 + 50).map(move |x| (x, y)))
            .map(|(x, y)| s.pixel(x, y))
            .collect()
    }

    #[test]
    fn offset_tile_rulers_show_absolute_numbers() {
        let p = two_color(20, 2);
        let o = plain_options();
        let s = render_region(&p, GridRegion { x: 10, y: 0, width: 10, height: 2 }, &o).unwrap();

        // Local column 4 is absolute 15 and carries exactly that label.
        let mut expected = Surface::white(s.width as u64, s.height as u64).unwrap();
        let style = TextStyle::new(
            o.fonts.bold.as_ref(),
            o.ruler_font_size(),
            TextAlign::Center,
            RULER_COLOR.with_alpha(255),
        );
        draw_text(&mut expected, "15", (80.0 + 4.0 * 50.0 + 25.0, 40.0), &style);
        assert!(ruler_strip(&s, 4).iter().any(|&px| px != WHITE));
        assert_eq!(ruler_strip(&s, 4), ruler_strip(&expected, 4));

        // Local column 0 is absolute 11: no label, although it is the tile's first column.
        assert!(ruler_strip(&s, 0).iter().all(|&px| px == WHITE));
        // The last column is always labeled (absolute 20).
        assert!(ruler_strip(&s, 9).iter().any(|&px| px != WHITE));

        // The same column at the pattern origin is absolute 1 and labeled.
        let origin = render_region(&p, GridRegion { x: 0, y: 0, width: 10, height: 2 }, &o).unwrap();
        assert!(ruler_strip(&origin, 0).iter().any(|&px| px != WHITE));
        assert_ne!(ruler_strip(&origin, 4), ruler_strip(&s, 4));
    }

    #[test]
    fn block_line_at_absolute_ten_inside_tile() {
        // A tile starting at column 5 has absolute 10 at local edge 5.
        let p = two_color(20, 2);
        let o = plain_options();
        let s = render_region(&p, GridRegion { x: 5, y: 0, width: 10, height: 2 }, &o).unwrap();
        let line_x = 80 + 5 * 50;
        let mid_y = 80 + 25;
        // Heavy slate line sits on the boundary.
        assert_eq!(s.pixel(line_x, mid_y), BLOCK_LINE_COLOR.with_alpha(255));
        // Local edge 4 (absolute 9) only has the thin cell border.
        assert_eq!(s.pixel(80 + 4 * 50 - 2, mid_y), WHITE);
    }

    #[test]
    fn edge_policies_differ_on_unaligned_edges() {
        let p = two_color(20, 3);
        let region = GridRegion { x: 3, y: 0, width: 4, height: 3 };
        let border = render_region(&p, region, &plain_options()).unwrap();
        let absolute = render_region(
            &p,
            region,
            &RenderOptions {
                block_edges: BlockEdgePolicy::AbsoluteOnly,
                ..plain_options()
            },
        )
        .unwrap();
        // Left edge sits on absolute 3: heavy under Border only.
        let px = (80 - 2, 80 + 75);
        assert_eq!(border.pixel(px.0, px.1), BLOCK_LINE_COLOR.with_alpha(255));
        assert_eq!(absolute.pixel(px.0, px.1), WHITE);
        // Top edge sits on absolute 0: heavy under both.
        let top = (80 + 75, 80);
        assert_eq!(border.pixel(top.0, top.1), BLOCK_LINE_COLOR.with_alpha(255));
        assert_eq!(absolute.pixel(top.0, top.1), BLOCK_LINE_COLOR.with_alpha(255));
    }

    #[test]
    fn labels_use_contrast_color() {
        let black = BeadColor::new("K", "Black", Rgb::BLACK);
        let p = PatternData::from_fn(1, 1, |_, _| black.clone()).unwrap();
        let o = RenderOptions::default();
        let s = render_region(&p, GridRegion::full(1, 1), &o).unwrap();
        // Only look well inside the black disc.
        let has_white_text = (97..113)
            .flat_map(|y| (97..113).map(move |x| (x, y)))
            .any(|(x, y)| s.pixel(x, y) == WHITE);
        assert!(has_white_text);
    }

    #[test]
    fn preview_is_transparent_where_hidden() {
        let p = two_color(3, 2);
        let s = render_preview(&p, &HiddenSet::new().with("B"), ShapeMode::Square, 12).unwrap();
        assert_eq!((s.width, s.height), (36, 24));
        assert_eq!(s.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(s.pixel(18, 6), [0, 0, 0, 0]);

        let c = render_preview(&p, &HiddenSet::new(), ShapeMode::Circle, 12).unwrap();
        assert_eq!(c.pixel(6, 6), [255, 0, 0, 255]);
        assert_eq!(c.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let p = two_color(9, 9);
        let o = RenderOptions::default().with_title(Some("9x9".into()));
        let a = render_region(&p, GridRegion::full(9, 9), &o).unwrap();
        let b = render_region(&p, GridRegion::full(9, 9), &o).unwrap();
        assert_eq!(a, b);
    }
}
