use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::{BeadColor, Rgb};
use crate::error::CoreError;

/// A named, ordered set of bead colors.
///
/// Order matters: the material table breaks count ties by palette order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub id: String,
    pub name: String,
    pub colors: Vec<BeadColor>,
}

impl Palette {
    /// Create a palette, rejecting duplicate color ids.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        colors: Vec<BeadColor>,
    ) -> crate::Result<Self> {
        let mut seen = HashSet::with_capacity(colors.len());
        for c in &colors {
            if !seen.insert(c.id.as_str()) {
                return Err(CoreError::DuplicateColorId(c.id.clone()));
            }
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            colors,
        })
    }

    /// Look up a color by id.
    pub fn get(&self, id: &str) -> Option<&BeadColor> {
        self.colors.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Parse an `id,name,hex` CSV document into bead colors.
///
/// A leading header row is skipped when it mentions both `id` and `hex`.
/// Quoted fields may contain commas. Rows with fewer than three fields or an
/// empty id/hex are skipped, as are rows whose hex does not parse. Later
/// duplicates of an id are dropped so the result can always build a
/// [`Palette`].
pub fn parse_palette_csv(text: &str) -> crate::Result<Vec<BeadColor>> {
    let has_header = text
        .lines()
        .next()
        .map(|first| {
            let lower = first.to_lowercase();
            lower.contains("id") && lower.contains("hex")
        })
        .unwrap_or(false);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut colors = Vec::new();
    let mut seen = HashSet::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CoreError::PaletteImport(e.to_string()))?;
        if record.len() < 3 {
            continue;
        }
        let id = record[0].trim();
        let name = record[1].trim();
        let hex = record[2].trim();
        if id.is_empty() || hex.is_empty() {
            continue;
        }
        let color = match Rgb::from_hex(hex) {
            Ok(c) => c,
            Err(e) => {
                warn!(line, "Skipping palette row: {e}");
                continue;
            }
        };
        if !seen.insert(id.to_string()) {
            warn!(line, id, "Skipping duplicate palette id");
            continue;
        }
        colors.push(BeadColor::new(id, name, color));
    }

    if colors.is_empty() {
        return Err(CoreError::PaletteImport(
            "no rows with id, name and hex columns".into(),
        ));
    }
    debug!(count = colors.len(), "Parsed palette CSV");
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_header_and_quotes() {
        let csv = "ID,Name,Hex\nH01,White,#FFFFFF\n\"H02\",\"Red, Bright\",ff0000\n";
        let colors = parse_palette_csv(csv).unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].id, "H01");
        assert_eq!(colors[1].name, "Red, Bright");
        assert_eq!(colors[1].color, Rgb::new(255, 0, 0));
    }

    #[test]
    fn parses_without_header() {
        let colors = parse_palette_csv("A1,Black,000000\r\nA2,Gray,#808080").unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[1].color, Rgb::new(128, 128, 128));
    }

    #[test]
    fn skips_short_and_invalid_rows() {
        let csv = "A1,Black\n\nA2,Gray,#808080\nA3,Bad,#zzzzzz\n,NoId,#123456\n";
        let colors = parse_palette_csv(csv).unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].id, "A2");
    }

    #[test]
    fn empty_import_is_an_error() {
        assert!(matches!(
            parse_palette_csv("id,name,hex\n"),
            Err(CoreError::PaletteImport(_))
        ));
    }

    #[test]
    fn palette_rejects_duplicate_ids() {
        let colors = vec![
            BeadColor::new("A", "one", Rgb::BLACK),
            BeadColor::new("A", "two", Rgb::WHITE),
        ];
        assert!(matches!(
            Palette::new("p", "P", colors),
            Err(CoreError::DuplicateColorId(id)) if id == "A"
        ));
    }
}
