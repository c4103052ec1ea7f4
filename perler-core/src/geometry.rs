use crate::error::CoreError;

/// Default zoom bounds for the interactive view.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Preview cell size in screen pixels at zoom 1.
pub const PREVIEW_CELL_SIZE: f64 = 12.0;

/// A point in screen pixels, relative to the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A grid cell address, `(column, row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub x: u32,
    pub y: u32,
}

impl CellIndex {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Inclusive zoom bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn new(min: f64, max: f64) -> crate::Result<Self> {
        if !(min > 0.0 && min.is_finite() && max.is_finite() && min <= max) {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom limits must satisfy 0 < min <= max, got {min}..{max}"),
            });
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
        }
    }
}

/// Interactive zoom and pan. Pan is in screen pixels and unconstrained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewportState {
    /// Shift the pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Set zoom (clamped), keeping the grid point under `focal` fixed on screen.
    ///
    /// With no focal point the zoom pivots on the viewport center, which
    /// leaves pan untouched.
    pub fn zoom_about(
        &mut self,
        zoom: f64,
        focal: Option<ScreenPoint>,
        geometry: &ViewGeometry,
        limits: &ZoomLimits,
    ) {
        let new_zoom = limits.clamp(zoom);
        if let Some(f) = focal {
            let (cx, cy) = geometry.center();
            // Unzoomed offset of the focal point from the grid center.
            let wx = (f.x - cx - self.pan_x) / self.zoom;
            let wy = (f.y - cy - self.pan_y) / self.zoom;
            self.pan_x = f.x - cx - wx * new_zoom;
            self.pan_y = f.y - cy - wy * new_zoom;
        }
        self.zoom = new_zoom;
    }

    /// Whether this is the untouched initial view.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Fixed layout facts needed to map between screen and grid space.
///
/// The grid's unzoomed pixel extent is centred in the viewport; zoom scales
/// about that centre and pan is applied after scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    /// Viewport width in screen pixels.
    pub viewport_width: f64,
    /// Viewport height in screen pixels.
    pub viewport_height: f64,
    /// Cell edge length in unzoomed pixels.
    pub cell_size: f64,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl ViewGeometry {
    pub fn new(
        viewport_width: f64,
        viewport_height: f64,
        cell_size: f64,
        grid_width: u32,
        grid_height: u32,
    ) -> crate::Result<Self> {
        if grid_width == 0 || grid_height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: grid_width,
                height: grid_height,
            });
        }
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(CoreError::InvalidViewport {
                reason: format!("cell size must be positive and finite, got {cell_size}"),
            });
        }
        if !(viewport_width >= 0.0 && viewport_height >= 0.0)
            || !viewport_width.is_finite()
            || !viewport_height.is_finite()
        {
            return Err(CoreError::InvalidViewport {
                reason: format!("viewport size must be finite and >= 0, got {viewport_width}×{viewport_height}"),
            });
        }
        Ok(Self {
            viewport_width,
            viewport_height,
            cell_size,
            grid_width,
            grid_height,
        })
    }

    /// Viewport centre in screen pixels.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.viewport_width / 2.0, self.viewport_height / 2.0)
    }

    /// Unzoomed pixel extent of the whole grid.
    #[inline]
    pub fn grid_extent(&self) -> (f64, f64) {
        (
            self.grid_width as f64 * self.cell_size,
            self.grid_height as f64 * self.cell_size,
        )
    }

    /// Map a continuous grid position (in cells, origin at the grid's
    /// top-left corner) to a screen point.
    #[inline]
    pub fn grid_to_screen(&self, state: &ViewportState, gx: f64, gy: f64) -> ScreenPoint {
        let (cx, cy) = self.center();
        let (ew, eh) = self.grid_extent();
        ScreenPoint::new(
            cx + state.pan_x + state.zoom * (gx * self.cell_size - ew / 2.0),
            cy + state.pan_y + state.zoom * (gy * self.cell_size - eh / 2.0),
        )
    }

    /// Screen position of a cell's centre.
    #[inline]
    pub fn cell_center(&self, state: &ViewportState, cell: CellIndex) -> ScreenPoint {
        self.grid_to_screen(state, cell.x as f64 + 0.5, cell.y as f64 + 0.5)
    }

    /// Inverse of [`grid_to_screen`](Self::grid_to_screen): continuous grid
    /// position under a screen point.
    #[inline]
    pub fn screen_to_grid(&self, state: &ViewportState, p: ScreenPoint) -> (f64, f64) {
        let (cx, cy) = self.center();
        let (ew, eh) = self.grid_extent();
        (
            ((p.x - cx - state.pan_x) / state.zoom + ew / 2.0) / self.cell_size,
            ((p.y - cy - state.pan_y) / state.zoom + eh / 2.0) / self.cell_size,
        )
    }

    /// The cell under a screen point, or `None` outside the grid.
    pub fn hit_test(&self, state: &ViewportState, p: ScreenPoint) -> Option<CellIndex> {
        let (gx, gy) = self.screen_to_grid(state, p);
        let (gx, gy) = (gx.floor(), gy.floor());
        if !gx.is_finite() || !gy.is_finite() || gx < 0.0 || gy < 0.0 {
            return None;
        }
        if gx >= self.grid_width as f64 || gy >= self.grid_height as f64 {
            return None;
        }
        Some(CellIndex::new(gx as u32, gy as u32))
    }
}
