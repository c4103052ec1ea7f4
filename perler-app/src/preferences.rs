use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use perler_render::{BlockEdgePolicy, ShapeMode, TileSpec};

// ---------------------------------------------------------------------------
// Export preferences
// ---------------------------------------------------------------------------

/// Defaults applied to every export unless overridden on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPreferences {
    /// Prefix of the whole-pattern export title.
    #[serde(default = "default_app_title")]
    pub app_title: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
    #[serde(default = "default_margin")]
    pub margin: u32,
    /// Draw square beads instead of circles.
    #[serde(default)]
    pub square_beads: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    /// Only draw heavy lines on real 10-cell boundaries, even at tile edges.
    #[serde(default)]
    pub absolute_block_edges: bool,
    #[serde(default = "default_chunk")]
    pub chunk_width: u32,
    #[serde(default = "default_chunk")]
    pub chunk_height: u32,
    #[serde(default = "default_true")]
    pub exclude_hidden_from_materials: bool,
    /// TTF/OTF font for labels. Empty means the built-in block face.
    #[serde(default)]
    pub font_path: String,
    /// Where exports are written. Empty means the current directory.
    #[serde(default)]
    pub output_dir: String,
    /// Custom palette library. Empty means `palettes.json` next to the executable.
    #[serde(default)]
    pub palette_store: String,
}

fn default_app_title() -> String {
    "Perler".to_string()
}
fn default_cell_size() -> u32 {
    50
}
fn default_margin() -> u32 {
    80
}
fn default_true() -> bool {
    true
}
fn default_chunk() -> u32 {
    29
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            app_title: default_app_title(),
            cell_size: default_cell_size(),
            margin: default_margin(),
            square_beads: false,
            show_labels: true,
            absolute_block_edges: false,
            chunk_width: default_chunk(),
            chunk_height: default_chunk(),
            exclude_hidden_from_materials: true,
            font_path: String::new(),
            output_dir: String::new(),
            palette_store: String::new(),
        }
    }
}

impl ExportPreferences {
    /// Load preferences from next to the executable, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Persist preferences next to the executable.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<ExportPreferences>(&json) {
                    Ok(prefs) => {
                        info!("Loaded preferences from {}", path.display());
                        return prefs;
                    }
                    Err(e) => {
                        error!("Failed to parse preferences: {e}");
                    }
                },
                Err(e) => {
                    error!("Failed to read preferences file: {e}");
                }
            }
        } else {
            debug!("No preferences file at {}", path.display());
        }
        Self::default()
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences");
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    pub fn shape(&self) -> ShapeMode {
        if self.square_beads {
            ShapeMode::Square
        } else {
            ShapeMode::Circle
        }
    }

    pub fn block_edges(&self) -> BlockEdgePolicy {
        if self.absolute_block_edges {
            BlockEdgePolicy::AbsoluteOnly
        } else {
            BlockEdgePolicy::Border
        }
    }

    pub fn tile_spec(&self) -> TileSpec {
        TileSpec {
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        if self.output_dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.output_dir)
        }
    }

    pub fn palette_store_path(&self) -> PathBuf {
        if self.palette_store.is_empty() {
            crate::app_dir::palette_store_path()
        } else {
            PathBuf::from(&self.palette_store)
        }
    }
}

fn config_path() -> PathBuf {
    crate::app_dir::exe_directory().join("preferences.json")
}
