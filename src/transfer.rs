// JSON import/export of kountdowns

use crate::kountdown::{KountdownData, columns};
use crate::store::Store;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

/// Root key of the export document
pub const KOUNTDOWNS_KEY: &str = "kountdowns";

/// Suggested file name for exports
pub const DEFAULT_EXPORT_NAME: &str = "exported_kountdowns.json";

/// File-type filter label for export/import dialogs
pub const JSON_FILTER: &str = "JSON (*.json)";

/// On-disk export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KountdownsDocument {
    pub kountdowns: Vec<KountdownData>,
}

/// A kountdown read from an import file, not yet in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedKountdown {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub date: String,
    pub colour: String,
}

// ============================================================================
// Export
// ============================================================================

/// Writes the whole store to a JSON file
pub struct Exporter;

impl Exporter {
    /// Build the export document from every stored kountdown, in natural order
    pub fn create_document(store: &Store) -> Result<KountdownsDocument> {
        let kountdowns = store.all()?.iter().map(KountdownData::from).collect();
        Ok(KountdownsDocument { kountdowns })
    }

    /// Export to `path`; `None` (cancelled picker) is a no-op
    ///
    /// Returns `true` only if the file was fully written.
    pub fn export_to_file(store: &Store, path: Option<&Path>) -> bool {
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            debug!("No export path chosen, skipping export");
            return false;
        };

        match Self::write_document(store, path) {
            Ok(count) => {
                info!(path = ?path, count, "Exported kountdowns");
                true
            }
            Err(e) => {
                error!(path = ?path, error = ?e, "Failed to export kountdowns");
                false
            }
        }
    }

    fn write_document(store: &Store, path: &Path) -> Result<usize> {
        let document = Self::create_document(store)?;
        let json = serde_json::to_string_pretty(&document).context("Failed to serialize kountdowns")?;
        write_atomic(path, json.as_bytes())?;
        Ok(document.kountdowns.len())
    }
}

/// Replace `path` with `contents` via a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path)
        .map_err(|e| eyre!("Failed to replace {}: {}", path.display(), e.error))?;
    Ok(())
}

// ============================================================================
// Import
// ============================================================================

type ImportObserver = Box<dyn FnMut(&[ImportedKountdown])>;

/// Reads kountdowns from a JSON file into a staging list
///
/// Each successful import replaces the staging list and notifies observers.
/// Nothing is written to the store; the caller adds the staged kountdowns.
pub struct Importer {
    default_colour: String,
    imported: Vec<ImportedKountdown>,
    observers: Vec<ImportObserver>,
}

impl Importer {
    /// `default_colour` fills in kountdowns that carry no `colour` key
    pub fn new(default_colour: impl Into<String>) -> Self {
        Self {
            default_colour: default_colour.into(),
            imported: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Register a callback run after every completed import
    pub fn on_import_completed<F>(&mut self, observer: F)
    where
        F: FnMut(&[ImportedKountdown]) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// The current staging list
    pub fn imported(&self) -> &[ImportedKountdown] {
        &self.imported
    }

    /// Import from `path`
    ///
    /// A missing path, missing or unreadable file, or malformed JSON leaves
    /// the staging list untouched. Returns `true` if the list was replaced.
    pub fn import_from_file(&mut self, path: Option<&Path>) -> bool {
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            debug!("No import path chosen, skipping import");
            return false;
        };

        if !path.is_file() {
            debug!(path = ?path, "Import file does not exist");
            return false;
        }

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = ?path, error = ?e, "Import file is not readable");
                return false;
            }
        };

        match self.import_bytes(&data) {
            Ok(()) => {
                info!(path = ?path, count = self.imported.len(), "Imported kountdowns");
                true
            }
            Err(e) => {
                error!(path = ?path, error = %e, "Failed to parse JSON");
                false
            }
        }
    }

    /// Parse an in-memory document and replace the staging list
    pub fn import_bytes(&mut self, data: &[u8]) -> Result<()> {
        let document: Value = serde_json::from_slice(data)?;
        self.imported = self.parse_document(&document);

        for observer in &mut self.observers {
            observer(&self.imported);
        }
        Ok(())
    }

    fn parse_document(&self, document: &Value) -> Vec<ImportedKountdown> {
        let Some(entries) = document.get(KOUNTDOWNS_KEY).and_then(Value::as_array) else {
            debug!("No kountdowns array in document");
            return Vec::new();
        };

        let empty = Map::new();
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let obj = entry.as_object().unwrap_or(&empty);
                let colour = if obj.contains_key(columns::COLOUR) {
                    text(obj, columns::COLOUR)
                } else {
                    self.default_colour.clone()
                };

                ImportedKountdown {
                    index,
                    name: text(obj, columns::NAME),
                    description: text(obj, columns::DESCRIPTION),
                    date: text(obj, columns::DATE),
                    colour,
                }
            })
            .collect()
    }
}

/// String value of `key`, or empty text if missing or not a string
fn text(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}
