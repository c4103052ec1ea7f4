//! Directory where the executable lives. Preferences and the palette store
//! are kept next to the binary so a copied install carries its settings.

use std::path::PathBuf;

/// Directory containing the running executable. Falls back to current directory if unavailable.
pub fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Default location of the custom palette library.
pub fn palette_store_path() -> PathBuf {
    exe_directory().join("palettes.json")
}
