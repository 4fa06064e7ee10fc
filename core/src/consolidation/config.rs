use crate::error::{RadiomicsError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const DEFAULT_DROPPED_COLUMNS: &str = include_str!("../../config/dropped_columns.txt");
const DEFAULT_DROPPED_STRUCTURES: &str = include_str!("../../config/dropped_structures.txt");

/// Older feature tables spell the id column this way; it is always dropped
pub const LEGACY_COLOR_ID_COLUMN: &str = "Color ID";

/// Parses a denylist: one entry per line, `#` comments and blank lines ignored
pub fn parse_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn read_list(path: &Path) -> Result<HashSet<String>> {
    let text = fs::read_to_string(path).map_err(|e| {
        RadiomicsError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(parse_list(&text))
}

/// Columns and structures removed from feature tables before pivoting
///
/// All filters use hard exclusion: a dropped column never reaches the
/// cohort table, and a dropped structure contributes no columns at all.
///
/// # Example
///
/// ```
/// use radiocohort_core::TransformConfig;
///
/// let config = TransformConfig::default();
/// assert!(config.drops_column("RGB"));
/// assert!(config.drops_structure("Optic-Chiasm"));
/// assert!(!config.drops_structure("Left-Hippocampus"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    /// Column names removed from every table
    pub dropped_columns: HashSet<String>,

    /// `StructName` values whose rows are removed from every table
    pub dropped_structures: HashSet<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            dropped_columns: parse_list(DEFAULT_DROPPED_COLUMNS),
            dropped_structures: parse_list(DEFAULT_DROPPED_STRUCTURES),
        }
    }
}

impl TransformConfig {
    /// Creates a TransformConfig that drops nothing
    ///
    /// # Example
    ///
    /// ```
    /// use radiocohort_core::TransformConfig;
    ///
    /// let permissive = TransformConfig::permissive();
    /// assert!(permissive.dropped_columns.is_empty());
    /// assert!(!permissive.drops_structure("CC_Central"));
    /// ```
    pub fn permissive() -> Self {
        Self {
            dropped_columns: HashSet::new(),
            dropped_structures: HashSet::new(),
        }
    }

    /// Default lists, each optionally replaced by a list file
    ///
    /// # Errors
    ///
    /// Returns an error if a given file cannot be read
    pub fn from_files(columns: Option<&Path>, structures: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = columns {
            config.dropped_columns = read_list(path)?;
        }
        if let Some(path) = structures {
            config.dropped_structures = read_list(path)?;
        }
        Ok(config)
    }

    /// Builder: Replace the dropped columns
    pub fn with_dropped_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropped_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: Replace the dropped structures
    pub fn with_dropped_structures<I, S>(mut self, structures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropped_structures = structures.into_iter().map(Into::into).collect();
        self
    }

    pub fn drops_column(&self, column: &str) -> bool {
        column == LEGACY_COLOR_ID_COLUMN || self.dropped_columns.contains(column)
    }

    pub fn drops_structure(&self, structure: &str) -> bool {
        self.dropped_structures.contains(structure)
    }
}
