use tracing::debug;

use crate::edit::Edit;
use crate::geometry::{ViewGeometry, PREVIEW_CELL_SIZE};
use crate::hidden::HiddenSet;
use crate::interaction::{PointerEvent, ViewCommand, ViewportController};
use crate::pattern::PatternData;

/// Edits kept for undo.
pub const MAX_HISTORY: usize = 50;

/// The single active document: pattern, hidden colors, view and history.
///
/// Passed by reference to whatever needs it; nothing here is global.
#[derive(Debug, Clone)]
pub struct SessionState {
    pattern: PatternData,
    hidden: HiddenSet,
    controller: ViewportController,
    undo: Vec<PatternData>,
    redo: Vec<PatternData>,
}

impl SessionState {
    /// Start a session on `pattern`, shown in a viewport of the given size.
    pub fn new(
        pattern: PatternData,
        viewport_width: f64,
        viewport_height: f64,
    ) -> crate::Result<Self> {
        let geometry = ViewGeometry::new(
            viewport_width,
            viewport_height,
            PREVIEW_CELL_SIZE,
            pattern.width(),
            pattern.height(),
        )?;
        Ok(Self {
            pattern,
            hidden: HiddenSet::new(),
            controller: ViewportController::new(geometry),
            undo: Vec::new(),
            redo: Vec::new(),
        })
    }

    pub fn pattern(&self) -> &PatternData {
        &self.pattern
    }

    pub fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    /// Replace the document wholesale (new source image or grid size).
    ///
    /// Clears history and hidden colors and resets the view.
    pub fn load_pattern(&mut self, pattern: PatternData) -> crate::Result<()> {
        let g = *self.controller.geometry();
        let geometry = ViewGeometry::new(
            g.viewport_width,
            g.viewport_height,
            g.cell_size,
            pattern.width(),
            pattern.height(),
        )?;
        self.controller.set_geometry(geometry);
        self.controller.reset();
        self.pattern = pattern;
        self.hidden = HiddenSet::new();
        self.undo.clear();
        self.redo.clear();
        debug!(
            width = self.pattern.width(),
            height = self.pattern.height(),
            "Loaded pattern"
        );
        Ok(())
    }

    /// Apply an edit. On error nothing changes.
    pub fn apply(&mut self, edit: &Edit) -> crate::Result<()> {
        let next = edit.apply(&self.pattern)?;
        let prev = std::mem::replace(&mut self.pattern, next);
        self.undo.push(prev);
        if self.undo.len() > MAX_HISTORY {
            self.undo.remove(0);
        }
        self.redo.clear();
        Ok(())
    }

    /// Step back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(prev) => {
                let current = std::mem::replace(&mut self.pattern, prev);
                self.redo.push(current);
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.pattern, next);
                self.undo.push(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Flip one color between hidden and shown.
    pub fn toggle_hidden(&mut self, id: &str) {
        self.hidden = self.hidden.toggled(id);
    }

    pub fn set_hidden(&mut self, hidden: HiddenSet) {
        self.hidden = hidden;
    }

    /// Beads that will actually be placed (hidden colors excluded).
    pub fn visible_bead_count(&self) -> u64 {
        self.pattern.visible_count(&self.hidden)
    }

    /// Feed one pointer event to the view controller.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<ViewCommand> {
        self.controller.handle(event)
    }

    /// The host viewport changed size.
    pub fn resize(&mut self, viewport_width: f64, viewport_height: f64) -> crate::Result<()> {
        let g = *self.controller.geometry();
        self.controller.set_geometry(ViewGeometry::new(
            viewport_width,
            viewport_height,
            g.cell_size,
            g.grid_width,
            g.grid_height,
        )?);
        Ok(())
    }
}
