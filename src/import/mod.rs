//! Batch importers for antwiki.org and antmaps.org exports and species
//! data files
//!
//! The antwiki exports are UTF-16 encoded, tab-separated files with a header
//! line. Each file is applied inside a single savepoint: if any row fails,
//! nothing from the file is kept and the error names the offending line.
//! JSON species data files follow the same rule per array entry.

mod ant_sizes;
mod antmaps;
mod distribution;
mod json;
mod nuptial_flights;
mod synonyms;
mod valid_species;

pub use ant_sizes::{AntSizeEntry, AntSizes};
pub use antmaps::{
    import_antmaps_ids, import_antmaps_species, parse_antmaps_species, AntmapsIdReport,
};
pub use distribution::WorldDistribution;
pub use json::{import_json_file, import_json_text, JsonImporter};
pub use nuptial_flights::{CountryRef, NuptialFlightEntry, NuptialFlights};
pub use synonyms::Synonyms;
pub use valid_species::ValidSpecies;

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::catalog::Catalog;
use crate::core::error::{CatalogError, Result};
use crate::core::taxonomy::token_count;

/// What a single row did to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
    Skipped,
}

/// Row counts of one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub rows: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
}

impl ImportStats {
    fn record(&mut self, outcome: RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// A tab-separated antwiki export format
pub trait Importer {
    /// Name recorded in the import ledger
    const NAME: &'static str;

    /// Apply one data row
    fn apply_row(&self, catalog: &Catalog, row: &StringRecord) -> Result<RowOutcome>;
}

/// Import a UTF-16 encoded export file and record it in the ledger
pub fn import_file<I: Importer>(catalog: &Catalog, importer: &I, path: &Path) -> Result<ImportStats> {
    let bytes = std::fs::read(path)?;
    let text = decode_utf16(&bytes)?;
    let digest = sha256_hex(&bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    catalog.atomically(|cat| {
        let stats = import_text(cat, importer, path, &text)?;
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

/// Import already decoded text (header line included)
///
/// `source` only names the input in error messages.
pub fn import_text<I: Importer>(
    catalog: &Catalog,
    importer: &I,
    source: &Path,
    text: &str,
) -> Result<ImportStats> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    catalog.atomically(|cat| {
        let mut stats = ImportStats::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let outcome = importer
                .apply_row(cat, &record)
                .map_err(|e| CatalogError::Import {
                    file: source.to_path_buf(),
                    line,
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

/// Column value, empty when the row is too short
pub(crate) fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

/// Subspecies rows are not stored: a row is one when its subspecies column
/// is filled or its taxon name has more than two words
pub(crate) fn is_subspecies(taxon: &str, subspecies_column: Option<&str>) -> bool {
    subspecies_column.is_some_and(|s| !s.trim().is_empty()) || token_count(taxon) > 2
}

/// Decode UTF-16 text, honouring a byte order mark (little-endian without one)
pub fn decode_utf16(bytes: &[u8]) -> Result<String> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return Err(CatalogError::Encoding(format!(
            "odd number of bytes ({})",
            body.len()
        )));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|e| CatalogError::Encoding(e.to_string()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
