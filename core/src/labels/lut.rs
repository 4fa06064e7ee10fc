use crate::error::{RadiomicsError, Result};
use crate::types::Rgb;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// LUT shipped with the crate, covering the `aparc+aseg` labels
const EMBEDDED_LUT: &str = include_str!("../../data/FreeSurferColorLUT.txt");

/// One row of a FreeSurfer color lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutEntry {
    pub name: String,
    pub color: Rgb,
}

/// FreeSurfer color lookup table
///
/// Parsed from the `FreeSurferColorLUT.txt` format: one
/// `id name r g b a` row per label, `#` comments and blank lines ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorLut {
    entries: BTreeMap<i32, LutEntry>,
}

impl ColorLut {
    /// The LUT embedded in the crate
    pub fn embedded() -> Self {
        // The embedded table is checked by the tests below
        Self::parse(EMBEDDED_LUT).unwrap_or_default()
    }

    /// Reads a LUT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| {
            RadiomicsError::InvalidConfig(format!("{}: {}", path.display(), e))
        })
    }

    /// Parses LUT text
    ///
    /// # Errors
    ///
    /// Returns an error naming the first malformed line
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut entries = BTreeMap::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let id = fields
                .next()
                .and_then(|s| s.parse::<i32>().ok())
                .ok_or_else(|| format!("line {}: missing label id", index + 1))?;
            let name = fields
                .next()
                .ok_or_else(|| format!("line {}: missing structure name", index + 1))?;
            let rest: Vec<&str> = fields.collect();
            let color =
                Rgb::parse(&rest.join(" ")).map_err(|e| format!("line {}: {}", index + 1, e))?;

            entries.insert(
                id,
                LutEntry {
                    name: name.to_string(),
                    color,
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn get(&self, id: i32) -> Option<&LutEntry> {
        self.entries.get(&id)
    }

    /// Structure name for a label, `Unknown-<id>` if absent
    pub fn name(&self, id: i32) -> String {
        self.get(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("Unknown-{}", id))
    }

    /// Display color for a label, black if absent
    pub fn color(&self, id: i32) -> Rgb {
        self.get(id).map(|e| e.color).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
