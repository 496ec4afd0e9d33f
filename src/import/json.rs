//! Species data files in JSON: a top-level array with one object per species

use std::path::Path;

use serde::de::DeserializeOwned;

use super::{sha256_hex, ImportStats, RowOutcome};
use crate::core::catalog::Catalog;
use crate::core::error::{CatalogError, Result};

/// A JSON species data format
pub trait JsonImporter {
    /// Name recorded in the import ledger
    const NAME: &'static str;

    type Entry: DeserializeOwned;

    /// Apply one array element
    fn apply_entry(&self, catalog: &Catalog, entry: &Self::Entry) -> Result<RowOutcome>;
}

/// Import a UTF-8 JSON file and record it in the ledger
pub fn import_json_file<I: JsonImporter>(
    catalog: &Catalog,
    importer: &I,
    path: &Path,
) -> Result<ImportStats> {
    let bytes = std::fs::read(path)?;
    let text = std::str::from_utf8(&bytes).map_err(|e| CatalogError::Encoding(e.to_string()))?;
    let digest = sha256_hex(&bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    catalog.atomically(|cat| {
        let stats = import_json_text(cat, importer, path, text)?;
        cat.record_import_run(
            I::NAME,
            &file_name,
            &digest,
            stats.rows,
            stats.created,
            stats.updated,
            stats.skipped,
        )?;
        Ok(stats)
    })
}

/// Apply every entry of a JSON array, all or nothing
pub fn import_json_text<I: JsonImporter>(
    catalog: &Catalog,
    importer: &I,
    source: &Path,
    text: &str,
) -> Result<ImportStats> {
    let entries: Vec<I::Entry> = serde_json::from_str(text)?;

    catalog.atomically(|cat| {
        let mut stats = ImportStats::default();
        for (idx, entry) in entries.iter().enumerate() {
            let outcome = importer
                .apply_entry(cat, entry)
                .map_err(|e| CatalogError::ImportEntry {
                    file: source.to_path_buf(),
                    entry: idx + 1,
                    source: Box::new(e),
                })?;
            stats.record(outcome);
        }
        tracing::info!(
            importer = I::NAME,
            rows = stats.rows,
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            "import finished"
        );
        Ok(stats)
    })
}

/// Created when the species was new, updated otherwise
pub(super) fn species_outcome(existed: bool) -> RowOutcome {
    if existed {
        RowOutcome::Updated
    } else {
        RowOutcome::Created
    }
}
