use crate::error::RenderError;

/// Largest surface we agree to allocate (256 Mpx, 1 GiB of RGBA).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 28;

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// An RGBA raster surface with the handful of drawing operations the
/// pattern renderers need.
///
/// Coordinates are in pixels with `(0, 0)` at the top-left corner; pixel
/// `(x, y)` covers the square `[x, x+1) × [y, y+1)`. Drawing outside the
/// surface is clipped. Colors are straight (non-premultiplied) RGBA and
/// composite source-over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl Surface {
    /// Allocate a surface filled with `fill`.
    ///
    /// Fails instead of aborting when the size overflows, exceeds
    /// [`MAX_SURFACE_PIXELS`], or the allocation itself is refused.
    pub fn new(width: u64, height: u64, fill: [u8; 4]) -> crate::Result<Self> {
        let too_big = || RenderError::SurfaceAllocation { width, height };
        let (w, h) = (
            u32::try_from(width).map_err(|_| too_big())?,
            u32::try_from(height).map_err(|_| too_big())?,
        );
        let pixel_count = width.checked_mul(height).ok_or_else(too_big)?;
        if w == 0 || h == 0 || pixel_count > MAX_SURFACE_PIXELS {
            return Err(too_big());
        }
        let byte_len = usize::try_from(pixel_count * 4).map_err(|_| too_big())?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(byte_len).map_err(|_| too_big())?;
        for _ in 0..pixel_count {
            pixels.extend_from_slice(&fill);
        }
        Ok(Self {
            width: w,
            height: h,
            pixels,
        })
    }

    pub fn white(width: u64, height: u64) -> crate::Result<Self> {
        Self::new(width, height, WHITE)
    }

    pub fn transparent(width: u64, height: u64) -> crate::Result<Self> {
        Self::new(width, height, TRANSPARENT)
    }

    /// The pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Composite `color` onto one pixel with partial `coverage` in `0..=1`.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: [u8; 4], coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let sa = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst = &mut self.pixels[i..i + 4];
        if sa >= 1.0 {
            dst.copy_from_slice(&color);
            return;
        }
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let v = (color[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Fill the pixels whose centres fall inside the rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = (x.round() as i64).max(0);
        let y0 = (y.round() as i64).max(0);
        let x1 = ((x + w).round() as i64).min(self.width as i64);
        let y1 = ((y + h).round() as i64).min(self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    /// Stroke a rectangle outline of `line_width`, centred on its edges.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: [u8; 4]) {
        let half = line_width / 2.0;
        // Top and bottom span the full outer width; sides fill in between
        // so corners are not blended twice.
        self.fill_rect(x - half, y - half, w + line_width, line_width, color);
        self.fill_rect(x - half, y + h - half, w + line_width, line_width, color);
        self.fill_rect(x - half, y + half, line_width, h - line_width, color);
        self.fill_rect(x + w - half, y + half, line_width, h - line_width, color);
    }

    /// Vertical line centred on `x`, from `y0` to `y1`.
    pub fn vline(&mut self, x: f32, y0: f32, y1: f32, line_width: f32, color: [u8; 4]) {
        self.fill_rect(x - line_width / 2.0, y0, line_width, y1 - y0, color);
    }

    /// Horizontal line centred on `y`, from `x0` to `x1`.
    pub fn hline(&mut self, y: f32, x0: f32, x1: f32, line_width: f32, color: [u8; 4]) {
        self.fill_rect(x0, y - line_width / 2.0, x1 - x0, line_width, color);
    }

    /// Anti-aliased filled disc.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
        self.ring(cx, cy, f32::NEG_INFINITY, radius, color);
    }

    /// Anti-aliased circle outline of `line_width`, centred on `radius`.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, line_width: f32, color: [u8; 4]) {
        let half = line_width / 2.0;
        self.ring(cx, cy, radius - half, radius + half, color);
    }

    /// Fill the annulus `inner <= d <= outer` with one pixel of edge falloff.
    fn ring(&mut self, cx: f32, cy: f32, inner: f32, outer: f32, color: [u8; 4]) {
        if outer <= 0.0 {
            return;
        }
        let x0 = ((cx - outer).floor() as i64 - 1).max(0);
        let y0 = ((cy - outer).floor() as i64 - 1).max(0);
        let x1 = ((cx + outer).ceil() as i64 + 1).min(self.width as i64);
        let y1 = ((cy + outer).ceil() as i64 + 1).min(self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                let outside = (outer - d + 0.5).clamp(0.0, 1.0);
                let inside = (d - inner + 0.5).clamp(0.0, 1.0);
                let coverage = outside.min(inside);
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, coverage);
                }
            }
        }
    }
}
