use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color::BeadColor;
use crate::error::CoreError;
use crate::palette::Palette;

// ---------------------------------------------------------------------------
// Palette library
// ---------------------------------------------------------------------------

/// User-imported palettes plus the current selection.
///
/// Built-in palettes are supplied by the caller and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteLibrary {
    #[serde(default)]
    pub custom: Vec<Palette>,
    #[serde(default)]
    pub selected: Option<String>,
}

impl PaletteLibrary {
    /// Built-ins first, then custom palettes in import order.
    pub fn all<'a>(&'a self, builtins: &'a [Palette]) -> impl Iterator<Item = &'a Palette> {
        builtins.iter().chain(self.custom.iter())
    }

    /// The selected palette, or the first available one if the selection is
    /// unset or stale.
    pub fn active<'a>(&'a self, builtins: &'a [Palette]) -> Option<&'a Palette> {
        let selected = self.selected.as_deref();
        self.all(builtins)
            .find(|p| Some(p.id.as_str()) == selected)
            .or_else(|| self.all(builtins).next())
    }

    /// Add an imported palette and select it. Returns the new palette id.
    pub fn add_custom(
        &mut self,
        name: impl Into<String>,
        colors: Vec<BeadColor>,
    ) -> crate::Result<String> {
        let id = self.next_custom_id();
        let palette = Palette::new(id.clone(), name, colors)?;
        info!(id = %palette.id, colors = palette.len(), "Added custom palette");
        self.custom.push(palette);
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Remove a custom palette. Clears the selection if it pointed there.
    /// Returns whether anything was removed.
    pub fn remove_custom(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|p| p.id != id);
        let removed = self.custom.len() != before;
        if removed && self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        removed
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    fn next_custom_id(&self) -> String {
        let next = self
            .custom
            .iter()
            .filter_map(|p| p.id.strip_prefix("custom_")?.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);
        format!("custom_{next}")
    }
}

// ---------------------------------------------------------------------------
// Storage port
// ---------------------------------------------------------------------------

/// Persistence for the palette library. Injected into the session so the
/// core never depends on a particular storage medium.
pub trait PaletteStore {
    /// Read the stored library. A missing store yields an empty library.
    fn load(&self) -> crate::Result<PaletteLibrary>;
    fn save(&self, library: &PaletteLibrary) -> crate::Result<()>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonPaletteStore {
    path: PathBuf,
}

impl JsonPaletteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PaletteStore for JsonPaletteStore {
    fn load(&self) -> crate::Result<PaletteLibrary> {
        if !self.path.exists() {
            debug!("No palette store at {}", self.path.display());
            return Ok(PaletteLibrary::default());
        }
        let json = fs::read_to_string(&self.path)
            .map_err(|e| CoreError::Storage(format!("failed to read {}: {e}", self.path.display())))?;
        let library: PaletteLibrary = serde_json::from_str(&json)
            .map_err(|e| CoreError::Storage(format!("failed to parse {}: {e}", self.path.display())))?;
        info!(
            custom = library.custom.len(),
            "Loaded palettes from {}",
            self.path.display()
        );
        Ok(library)
    }

    fn save(&self, library: &PaletteLibrary) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::Storage(format!("failed to create directory: {e}")))?;
        }
        let json = serde_json::to_string_pretty(library)
            .map_err(|e| CoreError::Storage(format!("failed to serialize palettes: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| CoreError::Storage(format!("failed to write {}: {e}", self.path.display())))?;
        debug!("Saved palettes to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the library in memory only.
#[derive(Debug, Default)]
pub struct MemoryPaletteStore {
    library: Mutex<PaletteLibrary>,
}

impl MemoryPaletteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaletteStore for MemoryPaletteStore {
    fn load(&self) -> crate::Result<PaletteLibrary> {
        self.library
            .lock()
            .map(|l| l.clone())
            .map_err(|_| CoreError::Storage("palette store lock poisoned".into()))
    }

    fn save(&self, library: &PaletteLibrary) -> crate::Result<()> {
        let mut guard = self
            .library
            .lock()
            .map_err(|_| CoreError::Storage("palette store lock poisoned".into()))?;
        *guard = library.clone();
        Ok(())
    }
}
