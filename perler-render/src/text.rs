//! Text faces and single-line text drawing.
//!
//! Renderers only need short labels: ruler numbers, color ids, names and
//! counts. A [`TextFace`] turns a string into pixel coverage; [`FontSet`]
//! picks a face per role. The default set draws digits and upper-case ids
//! with the built-in [`BlockFace`] and everything else (lower case, accents,
//! Cyrillic, CJK when a system font provides it) with outline faces through
//! [`FallbackFace`]. Callers that want their own typography load an
//! [`OutlineFace`] from TTF/OTF bytes.

use std::fmt;
use std::sync::{Arc, OnceLock};

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::surface::Surface;

/// A source of glyph coverage for one line of text.
///
/// Text is laid out in a box `advance(text, size)` wide and `size` tall,
/// with its origin at the top-left corner.
pub trait TextFace: Send + Sync + fmt::Debug {
    /// Width of `text` at pixel size `size`.
    fn advance(&self, text: &str, size: f32) -> f32;

    /// Call `plot(x, y, coverage)` for each covered pixel, relative to the
    /// box origin.
    fn rasterize(&self, text: &str, size: f32, plot: &mut dyn FnMut(i64, i64, f32));
}

/// Horizontal anchor of the `x` passed to [`draw_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// How one line of text is drawn.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub face: &'a dyn TextFace,
    pub size: f32,
    pub align: TextAlign,
    pub color: [u8; 4],
}

impl<'a> TextStyle<'a> {
    pub fn new(face: &'a dyn TextFace, size: f32, align: TextAlign, color: [u8; 4]) -> Self {
        Self {
            face,
            size,
            align,
            color,
        }
    }
}

/// Draw one line of text anchored at `(x, y)`, with its vertical middle at `y`.
pub fn draw_text(surface: &mut Surface, text: &str, (x, y): (f32, f32), style: &TextStyle<'_>) {
    if text.is_empty() || style.size <= 0.0 {
        return;
    }
    let width = style.face.advance(text, style.size);
    let left = match style.align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    let ox = left.round() as i64;
    let oy = (y - style.size / 2.0).round() as i64;
    let color = style.color;
    style.face.rasterize(text, style.size, &mut |px, py, coverage| {
        surface.blend_pixel(ox + px, oy + py, color, coverage);
    });
}

// ---------------------------------------------------------------------------
// Font set
// ---------------------------------------------------------------------------

static EMBEDDED_REGULAR: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static EMBEDDED_BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// Faces used for each text role.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Arc<dyn TextFace>,
    pub bold: Arc<dyn TextFace>,
    /// Color ids in the material table.
    pub mono: Arc<dyn TextFace>,
}

impl FontSet {
    /// Use one face for every role.
    pub fn uniform(face: Arc<dyn TextFace>) -> Self {
        Self {
            regular: face.clone(),
            bold: face.clone(),
            mono: face,
        }
    }

    /// Load a TTF/OTF font and use it for every role.
    ///
    /// Characters the font lacks fall back to the embedded and system faces.
    pub fn from_font_bytes(bytes: Vec<u8>) -> crate::Result<Self> {
        let mut outlines = vec![OutlineFace::from_bytes(bytes)?];
        outlines.extend(fallback_outlines(EMBEDDED_REGULAR));
        Ok(Self::uniform(Arc::new(FallbackFace::new(None, outlines))))
    }
}

impl Default for FontSet {
    /// Block face for digits, upper-case ids and ASCII punctuation; the
    /// embedded DejaVu Sans (then a system CJK font, when one is installed)
    /// for any text the block face cannot spell exactly.
    fn default() -> Self {
        let bold: Arc<dyn TextFace> = Arc::new(FallbackFace::new(
            Some(BlockFace::BOLD),
            fallback_outlines(EMBEDDED_BOLD),
        ));
        Self {
            regular: Arc::new(FallbackFace::new(
                Some(BlockFace::REGULAR),
                fallback_outlines(EMBEDDED_REGULAR),
            )),
            mono: bold.clone(),
            bold,
        }
    }
}

/// The embedded face parsed from `bytes`, followed by the system CJK face.
fn fallback_outlines(bytes: &'static [u8]) -> Vec<OutlineFace> {
    let mut faces = Vec::with_capacity(2);
    match FontArc::try_from_slice(bytes) {
        Ok(font) => faces.push(OutlineFace { font }),
        Err(e) => warn!("Embedded font unusable: {e}"),
    }
    if let Some(cjk) = system_cjk_face() {
        faces.push(cjk);
    }
    faces
}

/// A CJK-capable system font, looked up once per process.
pub fn system_cjk_face() -> Option<OutlineFace> {
    static CJK: OnceLock<Option<OutlineFace>> = OnceLock::new();
    CJK.get_or_init(discover_system_cjk_face).clone()
}

fn discover_system_cjk_face() -> Option<OutlineFace> {
    let candidates: &[&str] = &[
        #[cfg(target_os = "windows")]
        "C:\\Windows\\Fonts\\msyh.ttc",
        #[cfg(target_os = "windows")]
        "C:\\Windows\\Fonts\\simsun.ttc",
        #[cfg(target_os = "windows")]
        "C:\\Windows\\Fonts\\YuGothR.ttc",
        #[cfg(target_os = "windows")]
        "C:\\Windows\\Fonts\\malgun.ttf",
        #[cfg(target_os = "linux")]
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        #[cfg(target_os = "linux")]
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        #[cfg(target_os = "linux")]
        "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
        #[cfg(target_os = "linux")]
        "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        #[cfg(target_os = "linux")]
        "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
        #[cfg(target_os = "linux")]
        "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
        #[cfg(target_os = "macos")]
        "/System/Library/Fonts/PingFang.ttc",
        #[cfg(target_os = "macos")]
        "/System/Library/Fonts/Hiragino Sans GB.ttc",
        #[cfg(target_os = "macos")]
        "/Library/Fonts/Arial Unicode.ttf",
    ];
    for path in candidates {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        match OutlineFace::from_bytes(bytes) {
            Ok(face) => {
                debug!("Using CJK fallback font {path}");
                return Some(face);
            }
            Err(e) => warn!("Skipping font {path}: {e}"),
        }
    }
    debug!("No system CJK font found");
    None
}

// ---------------------------------------------------------------------------
// Block face
// ---------------------------------------------------------------------------

/// Glyph grid: 5 columns by 7 rows, one bit per dot, MSB = leftmost of 5.
type Glyph = [u8; 7];

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Em box height in dots: the glyph plus one dot above and below.
const EM_DOTS: f32 = 9.0;
/// Horizontal advance in dots, including one dot of spacing.
const ADVANCE_DOTS: f32 = 6.0;

const MISSING: Glyph = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

/// The exact glyph for `ch`; no case folding.
fn glyph(ch: char) -> Option<Glyph> {
    let g = match ch {
        ' ' => [0; GLYPH_ROWS],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '×' => [0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x00],
        _ => return None,
    };
    Some(g)
}

/// Built-in 5×7 dot-matrix face.
///
/// Used alone, lower case is drawn with upper-case shapes and anything else
/// outside the table as a hollow box. [`FallbackFace`] only hands it text it
/// [`covers`](BlockFace::covers) exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFace {
    /// Dots are drawn this many extra dots wide to the right.
    pub embolden: f32,
}

impl BlockFace {
    pub const REGULAR: Self = Self { embolden: 0.0 };
    pub const BOLD: Self = Self { embolden: 0.5 };

    /// Whether `ch` has its own glyph in the table.
    pub fn covers(ch: char) -> bool {
        glyph(ch).is_some()
    }

    fn dot(size: f32) -> f32 {
        size / EM_DOTS
    }
}

impl TextFace for BlockFace {
    fn advance(&self, text: &str, size: f32) -> f32 {
        let n = text.chars().count();
        if n == 0 {
            return 0.0;
        }
        // No trailing spacing after the last glyph.
        (n as f32 * ADVANCE_DOTS - 1.0) * Self::dot(size)
    }

    fn rasterize(&self, text: &str, size: f32, plot: &mut dyn FnMut(i64, i64, f32)) {
        let dot = Self::dot(size);
        for (i, ch) in text.chars().enumerate() {
            let rows = glyph(ch)
                .or_else(|| glyph(ch.to_ascii_uppercase()))
                .unwrap_or(MISSING);
            let gx = i as f32 * ADVANCE_DOTS * dot;
            for (r, &bits) in rows.iter().enumerate().take(GLYPH_ROWS) {
                for c in 0..GLYPH_COLS {
                    if (bits >> (GLYPH_COLS - 1 - c)) & 1 == 0 {
                        continue;
                    }
                    let x0 = gx + c as f32 * dot;
                    let y0 = (r as f32 + 1.0) * dot;
                    let x1 = x0 + dot * (1.0 + self.embolden);
                    let y1 = y0 + dot;
                    let (ix0, iy0) = (x0.round() as i64, y0.round() as i64);
                    // At least one pixel per dot so tiny labels stay visible.
                    let ix1 = (x1.round() as i64).max(ix0 + 1);
                    let iy1 = (y1.round() as i64).max(iy0 + 1);
                    for py in iy0..iy1 {
                        for px in ix0..ix1 {
                            plot(px, py, 1.0);
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Outline face
// ---------------------------------------------------------------------------

/// A TrueType/OpenType face rasterized with `ab_glyph`.
#[derive(Clone)]
pub struct OutlineFace {
    font: FontArc,
}

impl fmt::Debug for OutlineFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFace")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl OutlineFace {
    pub fn from_bytes(bytes: Vec<u8>) -> crate::Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Whether the font maps `ch` to a real glyph rather than `.notdef`.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.glyph_id(ch).0 != 0
    }
}

impl TextFace for OutlineFace {
    fn advance(&self, text: &str, size: f32) -> f32 {
        layout(std::slice::from_ref(self), text, size).1
    }

    fn rasterize(&self, text: &str, size: f32, plot: &mut dyn FnMut(i64, i64, f32)) {
        rasterize_outlines(std::slice::from_ref(self), text, size, plot);
    }
}

struct PlacedGlyph {
    face: usize,
    id: GlyphId,
    x: f32,
}

/// Pen positions (left-aligned at x = 0) and total advance. Each character
/// comes from the first face that has it, or from `faces[0]` as `.notdef`.
fn layout(faces: &[OutlineFace], text: &str, size: f32) -> (Vec<PlacedGlyph>, f32) {
    let scale = PxScale::from(size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor = 0.0f32;
    let mut last: Option<(usize, GlyphId)> = None;
    for ch in text.chars() {
        let face = faces.iter().position(|f| f.has_glyph(ch)).unwrap_or(0);
        let Some(outline) = faces.get(face) else {
            break;
        };
        let id = outline.font.glyph_id(ch);
        let scaled = outline.font.as_scaled(scale);
        if let Some((prev_face, prev)) = last {
            // Kerning pairs only make sense within one font.
            if prev_face == face {
                cursor += scaled.kern(prev, id);
            }
        }
        glyphs.push(PlacedGlyph { face, id, x: cursor });
        cursor += scaled.h_advance(id);
        last = Some((face, id));
    }
    (glyphs, cursor)
}

fn rasterize_outlines(
    faces: &[OutlineFace],
    text: &str,
    size: f32,
    plot: &mut dyn FnMut(i64, i64, f32),
) {
    let Some(primary) = faces.first() else {
        return;
    };
    let scale = PxScale::from(size);
    let scaled = primary.font.as_scaled(scale);
    // Centre the primary face's ascent..descent span inside the em box.
    let baseline = size / 2.0 + (scaled.ascent() + scaled.descent()) / 2.0;
    let (glyphs, _) = layout(faces, text, size);
    for placed in glyphs {
        let font = &faces[placed.face].font;
        let glyph = placed
            .id
            .with_scale_and_position(scale, point(placed.x, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (bx, by) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| {
                plot(bx + gx as i64, by + gy as i64, coverage);
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback face
// ---------------------------------------------------------------------------

/// A block face for the text it spells exactly, outline faces for the rest.
///
/// The choice is made per string so one label never mixes dot-matrix and
/// outline glyphs.
#[derive(Debug, Clone)]
pub struct FallbackFace {
    block: Option<BlockFace>,
    outlines: Vec<OutlineFace>,
}

impl FallbackFace {
    pub fn new(block: Option<BlockFace>, outlines: Vec<OutlineFace>) -> Self {
        Self { block, outlines }
    }

    fn block_for(&self, text: &str) -> Option<&BlockFace> {
        let block = self.block.as_ref()?;
        (self.outlines.is_empty() || text.chars().all(BlockFace::covers)).then_some(block)
    }
}

impl TextFace for FallbackFace {
    fn advance(&self, text: &str, size: f32) -> f32 {
        match self.block_for(text) {
            Some(block) => block.advance(text, size),
            None => layout(&self.outlines, text, size).1,
        }
    }

    fn rasterize(&self, text: &str, size: f32, plot: &mut dyn FnMut(i64, i64, f32)) {
        match self.block_for(text) {
            Some(block) => block.rasterize(text, size, plot),
            None => rasterize_outlines(&self.outlines, text, size, plot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::WHITE;

    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn ink_bounds(s: &Surface) -> Option<(u32, u32, u32, u32)> {
        let mut b: Option<(u32, u32, u32, u32)> = None;
        for y in 0..s.height {
            for x in 0..s.width {
                if s.pixel(x, y) != WHITE {
                    b = Some(match b {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        b
    }

    /// Anti-aliased edges leave pixels that are neither paper nor ink.
    fn has_partial_coverage(s: &Surface) -> bool {
        (0..s.height).any(|y| (0..s.width).any(|x| ![WHITE, BLACK].contains(&s.pixel(x, y))))
    }

    fn draw(face: &dyn TextFace, text: &str) -> Surface {
        let mut s = Surface::white(240, 40).unwrap();
        let style = TextStyle::new(face, 24.0, TextAlign::Left, BLACK);
        draw_text(&mut s, text, (10.0, 20.0), &style);
        s
    }

    #[test]
    fn block_advance_scales_with_size() {
        let face = BlockFace::REGULAR;
        assert_eq!(face.advance("", 18.0), 0.0);
        assert!((face.advance("A", 18.0) - 10.0).abs() < 1e-4);
        assert!((face.advance("AB", 18.0) - 22.0).abs() < 1e-4);
    }

    #[test]
    fn centred_text_is_centred() {
        let mut s = Surface::white(100, 40).unwrap();
        let style = TextStyle::new(&BlockFace::REGULAR, 18.0, TextAlign::Center, BLACK);
        draw_text(&mut s, "88", (50.0, 20.0), &style);
        let (x0, y0, x1, y1) = ink_bounds(&s).unwrap();
        let cx = (x0 + x1 + 1) as f32 / 2.0;
        let cy = (y0 + y1 + 1) as f32 / 2.0;
        assert!((cx - 50.0).abs() <= 1.0, "cx = {cx}");
        assert!((cy - 20.0).abs() <= 1.0, "cy = {cy}");
    }

    #[test]
    fn right_aligned_text_ends_at_anchor() {
        let mut s = Surface::white(100, 40).unwrap();
        let style = TextStyle::new(&BlockFace::REGULAR, 18.0, TextAlign::Right, BLACK);
        draw_text(&mut s, "1", (80.0, 20.0), &style);
        let (_, _, x1, _) = ink_bounds(&s).unwrap();
        assert!(x1 < 80 && x1 >= 77, "x1 = {x1}");
    }

    #[test]
    fn spaces_draw_nothing() {
        let mut s = Surface::white(50, 20).unwrap();
        let style = TextStyle::new(&BlockFace::BOLD, 18.0, TextAlign::Center, BLACK);
        draw_text(&mut s, "   ", (25.0, 10.0), &style);
        assert!(ink_bounds(&s).is_none());
    }

    #[test]
    fn tiny_text_still_inks() {
        let mut s = Surface::white(20, 20).unwrap();
        let style = TextStyle::new(&BlockFace::REGULAR, 3.0, TextAlign::Center, BLACK);
        draw_text(&mut s, "1", (10.0, 10.0), &style);
        assert!(ink_bounds(&s).is_some());
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        assert!(matches!(
            OutlineFace::from_bytes(vec![0, 1, 2, 3]),
            Err(RenderError::Font(_))
        ));
    }

    #[test]
    fn block_face_covers_exact_case_only() {
        assert!(BlockFace::covers('H'));
        assert!(BlockFace::covers('7'));
        assert!(BlockFace::covers(' '));
        assert!(!BlockFace::covers('h'));
        assert!(!BlockFace::covers('Ж'));
        assert!(!BlockFace::covers('我'));
    }

    #[test]
    fn default_set_keeps_digits_on_block_face() {
        let fonts = FontSet::default();
        assert_eq!(draw(fonts.bold.as_ref(), "15"), draw(&BlockFace::BOLD, "15"));
        assert!(!has_partial_coverage(&draw(fonts.bold.as_ref(), "H01")));
    }

    #[test]
    fn non_latin_names_are_drawn_with_outline_glyphs() {
        let fonts = FontSet::default();
        let name = "Жёлтый";
        let drawn = draw(fonts.regular.as_ref(), name);
        let boxes = draw(&BlockFace::REGULAR, name);
        assert!(ink_bounds(&drawn).is_some());
        assert_ne!(drawn, boxes);
        assert!(has_partial_coverage(&drawn));
        assert!(!has_partial_coverage(&boxes));
    }

    #[test]
    fn lower_case_ids_keep_their_case() {
        let fonts = FontSet::default();
        let lower = draw(fonts.bold.as_ref(), "h01");
        let upper = draw(fonts.bold.as_ref(), "H01");
        assert!(ink_bounds(&lower).is_some());
        assert_ne!(lower, upper);
        assert!(has_partial_coverage(&lower));
    }

    #[test]
    fn cjk_names_use_a_system_font_when_installed() {
        let Some(cjk) = system_cjk_face() else {
            return;
        };
        assert!(cjk.has_glyph('我'));
        let drawn = draw(FontSet::default().regular.as_ref(), "我的色板");
        assert!(ink_bounds(&drawn).is_some());
        assert_ne!(drawn, draw(&BlockFace::REGULAR, "我的色板"));
    }

    #[test]
    fn user_font_still_falls_back() {
        let fonts = FontSet::from_font_bytes(EMBEDDED_BOLD.to_vec()).unwrap();
        assert!(fonts.regular.advance("Ab", 20.0) > 0.0);
        assert!(ink_bounds(&draw(fonts.mono.as_ref(), "Ab")).is_some());
    }
}
