use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Ledger file name at the root of the master directory
pub const LEDGER_FILE: &str = "processed_folders.csv";

#[derive(Debug, Serialize, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Folder")]
    folder: String,
}

/// Append-only record of folders whose features were extracted
///
/// A folder in the ledger is never processed again. The file is only
/// ever rewritten whole, through a temporary file renamed into place, so
/// an interrupted run leaves either the old or the new ledger.
#[derive(Debug, Clone)]
pub struct ProcessedLedger {
    path: PathBuf,
    folders: Vec<String>,
    index: HashSet<String>,
}

impl ProcessedLedger {
    /// Loads the ledger at `path`; a missing file is an empty ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut ledger = Self {
            path,
            folders: Vec::new(),
            index: HashSet::new(),
        };

        if !ledger.path.exists() {
            return Ok(ledger);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&ledger.path)?;
        for row in reader.deserialize::<LedgerRow>() {
            ledger.insert(row?.folder);
        }

        Ok(ledger)
    }

    fn insert(&mut self, folder: String) -> bool {
        if self.index.insert(folder.clone()) {
            self.folders.push(folder);
            true
        } else {
            false
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, folder: &str) -> bool {
        self.index.contains(folder)
    }

    /// Folders in the order they were recorded
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Records new folders and persists the ledger
    ///
    /// Folders already present are ignored. Returns how many were added;
    /// nothing is written when that is zero.
    pub fn append<I, S>(&mut self, folders: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for folder in folders {
            if self.insert(folder.into()) {
                added += 1;
            }
        }
        if added > 0 {
            self.persist()?;
        }
        Ok(added)
    }

    fn persist(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::Writer::from_writer(temp.as_file_mut());
            for folder in &self.folders {
                writer.serialize(LedgerRow {
                    folder: folder.clone(),
                })?;
            }
            writer.flush()?;
        }
        temp.as_file_mut().flush()?;
        temp.persist(&self.path)?;
        Ok(())
    }
}
