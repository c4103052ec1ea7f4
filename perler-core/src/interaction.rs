//! Pointer and gesture handling for the interactive pattern view.
//!
//! The host shell translates its native input into [`PointerEvent`]s and
//! feeds them to a [`ViewportController`] in arrival order. The controller
//! updates its [`ViewportState`] and answers with a [`ViewCommand`] when the
//! shell needs to act (repaint, or a cell was tapped).

use tracing::debug;

use crate::geometry::{CellIndex, ScreenPoint, ViewGeometry, ViewportState, ZoomLimits};

/// Maximum pointer travel, in screen pixels, still treated as a tap.
pub const TAP_THRESHOLD: f64 = 5.0;
/// Zoom change per wheel delta unit.
pub const WHEEL_SENSITIVITY: f64 = 0.001;
/// Zoom change per pixel of pinch distance change.
pub const PINCH_SENSITIVITY: f64 = 0.005;

/// Pointer identifier as reported by the host (mouse = 0, touches by id).
pub type PointerId = u64;

/// Host input, already in viewport-relative screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { id: PointerId, pos: ScreenPoint },
    Move { id: PointerId, pos: ScreenPoint },
    Up { id: PointerId, pos: ScreenPoint },
    /// Pointer cancel, focus loss, or the pointer leaving the view.
    Cancel,
    /// Scroll wheel. Positive `delta_y` zooms out.
    Wheel {
        delta_y: f64,
        pos: Option<ScreenPoint>,
    },
}

/// What the shell should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// The view transform changed.
    Redraw,
    /// A tap landed on this cell.
    SelectCell(CellIndex),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging {
        pointer: PointerId,
        origin: ScreenPoint,
        last: ScreenPoint,
    },
    Pinching {
        pointers: [(PointerId, ScreenPoint); 2],
        last_distance: f64,
    },
}

/// Tunables for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    pub tap_threshold: f64,
    pub wheel_sensitivity: f64,
    pub pinch_sensitivity: f64,
    pub limits: ZoomLimits,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            tap_threshold: TAP_THRESHOLD,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            pinch_sensitivity: PINCH_SENSITIVITY,
            limits: ZoomLimits::default(),
        }
    }
}

/// Pan/zoom state machine with tap-to-select hit testing.
#[derive(Debug, Clone)]
pub struct ViewportController {
    view: ViewportState,
    geometry: ViewGeometry,
    config: InteractionConfig,
    state: InteractionState,
}

impl ViewportController {
    pub fn new(geometry: ViewGeometry) -> Self {
        Self::with_config(geometry, InteractionConfig::default())
    }

    pub fn with_config(geometry: ViewGeometry, config: InteractionConfig) -> Self {
        Self {
            view: ViewportState::default(),
            geometry,
            config,
            state: InteractionState::Idle,
        }
    }

    pub fn view(&self) -> &ViewportState {
        &self.view
    }

    pub fn geometry(&self) -> &ViewGeometry {
        &self.geometry
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Viewport resized or grid dimensions changed. Keeps zoom and pan.
    pub fn set_geometry(&mut self, geometry: ViewGeometry) {
        self.geometry = geometry;
    }

    /// Back to zoom 1, no pan, no gesture in progress.
    pub fn reset(&mut self) {
        self.view = ViewportState::default();
        self.state = InteractionState::Idle;
    }

    pub fn is_default_view(&self) -> bool {
        self.view.is_default()
    }

    /// Process one host event.
    pub fn handle(&mut self, event: PointerEvent) -> Option<ViewCommand> {
        match event {
            PointerEvent::Down { id, pos } => self.pointer_down(id, pos),
            PointerEvent::Move { id, pos } => self.pointer_move(id, pos),
            PointerEvent::Up { id, pos } => self.pointer_up(id, pos),
            PointerEvent::Cancel => {
                self.state = InteractionState::Idle;
                None
            }
            PointerEvent::Wheel { delta_y, pos } => {
                let target = self.view.zoom - delta_y * self.config.wheel_sensitivity;
                self.set_zoom(target, pos)
            }
        }
    }

    /// Apply a zoom target (clamped), pivoting on `focal` when given.
    fn set_zoom(&mut self, zoom: f64, focal: Option<ScreenPoint>) -> Option<ViewCommand> {
        let before = self.view;
        self.view
            .zoom_about(zoom, focal, &self.geometry, &self.config.limits);
        (self.view != before).then_some(ViewCommand::Redraw)
    }

    fn pointer_down(&mut self, id: PointerId, pos: ScreenPoint) -> Option<ViewCommand> {
        match self.state {
            InteractionState::Idle => {
                self.state = InteractionState::Dragging {
                    pointer: id,
                    origin: pos,
                    last: pos,
                };
            }
            InteractionState::Dragging { pointer, last, .. } if pointer != id => {
                let last_distance = last.distance(pos);
                debug!(last_distance, "Pinch started");
                self.state = InteractionState::Pinching {
                    pointers: [(pointer, last), (id, pos)],
                    last_distance,
                };
            }
            // Same pointer pressed again, or a third finger: nothing to do.
            _ => {}
        }
        None
    }

    fn pointer_move(&mut self, id: PointerId, pos: ScreenPoint) -> Option<ViewCommand> {
        match self.state {
            InteractionState::Dragging {
                pointer,
                origin,
                last,
            } if pointer == id => {
                self.state = InteractionState::Dragging {
                    pointer,
                    origin,
                    last: pos,
                };
                let (dx, dy) = (pos.x - last.x, pos.y - last.y);
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                self.view.pan_by(dx, dy);
                Some(ViewCommand::Redraw)
            }
            InteractionState::Pinching {
                mut pointers,
                last_distance,
            } => {
                let Some(slot) = pointers.iter_mut().find(|(pid, _)| *pid == id) else {
                    return None;
                };
                slot.1 = pos;
                let distance = pointers[0].1.distance(pointers[1].1);
                self.state = InteractionState::Pinching {
                    pointers,
                    last_distance: distance,
                };
                let target =
                    self.view.zoom + (distance - last_distance) * self.config.pinch_sensitivity;
                self.set_zoom(target, None)
            }
            _ => None,
        }
    }

    fn pointer_up(&mut self, id: PointerId, pos: ScreenPoint) -> Option<ViewCommand> {
        match self.state {
            InteractionState::Dragging { pointer, origin, .. } if pointer == id => {
                self.state = InteractionState::Idle;
                if origin.distance(pos) > self.config.tap_threshold {
                    return None;
                }
                let cell = self.geometry.hit_test(&self.view, pos)?;
                debug!(x = cell.x, y = cell.y, "Cell tapped");
                Some(ViewCommand::SelectCell(cell))
            }
            InteractionState::Pinching { pointers, .. }
                if pointers.iter().any(|(pid, _)| *pid == id) =>
            {
                self.state = InteractionState::Idle;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MAX_ZOOM, MIN_ZOOM, PREVIEW_CELL_SIZE};

    fn controller() -> ViewportController {
        let g = ViewGeometry::new(400.0, 400.0, PREVIEW_CELL_SIZE, 10, 10).unwrap();
        ViewportController::new(g)
    }

    fn p(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn drag_pans_by_cumulative_delta() {
        let mut c = controller();
        c.handle(PointerEvent::Down { id: 0, pos: p(10.0, 10.0) });
        assert_eq!(
            c.handle(PointerEvent::Move { id: 0, pos: p(20.0, 15.0) }),
            Some(ViewCommand::Redraw)
        );
        c.handle(PointerEvent::Move { id: 0, pos: p(50.0, 5.0) });
        assert_eq!(c.view().pan_x, 40.0);
        assert_eq!(c.view().pan_y, -5.0);
        assert_eq!(c.handle(PointerEvent::Up { id: 0, pos: p(50.0, 5.0) }), None);
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn tap_selects_cell_under_pointer() {
        let mut c = controller();
        // Grid spans 140..260 on both axes at zoom 1.
        c.handle(PointerEvent::Down { id: 0, pos: p(145.0, 259.0) });
        let cmd = c.handle(PointerEvent::Up { id: 0, pos: p(147.0, 258.0) });
        assert_eq!(cmd, Some(ViewCommand::SelectCell(CellIndex::new(0, 9))));
    }

    #[test]
    fn tap_outside_grid_selects_nothing() {
        let mut c = controller();
        c.handle(PointerEvent::Down { id: 0, pos: p(5.0, 5.0) });
        assert_eq!(c.handle(PointerEvent::Up { id: 0, pos: p(5.0, 5.0) }), None);
    }

    #[test]
    fn cancel_returns_to_idle_without_selection() {
        let mut c = controller();
        c.handle(PointerEvent::Down { id: 0, pos: p(200.0, 200.0) });
        assert_eq!(c.handle(PointerEvent::Cancel), None);
        assert_eq!(c.state(), InteractionState::Idle);
        assert_eq!(c.handle(PointerEvent::Up { id: 0, pos: p(200.0, 200.0) }), None);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut c = controller();
        for _ in 0..100 {
            c.handle(PointerEvent::Wheel { delta_y: -500.0, pos: None });
            assert!(c.view().zoom <= MAX_ZOOM);
        }
        assert_eq!(c.view().zoom, MAX_ZOOM);
        for _ in 0..100 {
            c.handle(PointerEvent::Wheel { delta_y: 500.0, pos: Some(p(10.0, 10.0)) });
            assert!(c.view().zoom >= MIN_ZOOM);
        }
        assert_eq!(c.view().zoom, MIN_ZOOM);
        // Already at the bound: nothing to redraw.
        assert_eq!(c.handle(PointerEvent::Wheel { delta_y: 100.0, pos: None }), None);
    }

    #[test]
    fn pinch_zooms_by_distance_change() {
        let mut c = controller();
        c.handle(PointerEvent::Down { id: 1, pos: p(100.0, 200.0) });
        c.handle(PointerEvent::Down { id: 2, pos: p(200.0, 200.0) });
        assert!(matches!(c.state(), InteractionState::Pinching { .. }));
        c.handle(PointerEvent::Move { id: 2, pos: p(300.0, 200.0) });
        // 100px wider * 0.005 = +0.5
        assert!((c.view().zoom - 1.5).abs() < 1e-9);
        c.handle(PointerEvent::Move { id: 1, pos: p(150.0, 200.0) });
        // 50px narrower * 0.005 = -0.25
        assert!((c.view().zoom - 1.25).abs() < 1e-9);
        // Lifting a finger ends the gesture without a tap.
        assert_eq!(c.handle(PointerEvent::Up { id: 1, pos: p(150.0, 200.0) }), None);
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn reset_restores_default_view() {
        let mut c = controller();
        c.handle(PointerEvent::Wheel { delta_y: -200.0, pos: None });
        assert!(!c.is_default_view());
        c.reset();
        assert!(c.is_default_view());
    }
}
