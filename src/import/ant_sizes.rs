//! Body sizes per caste
//!
//! `[{"name": "Lasius niger", "worker_size_min": 3.5, "worker_size_max": 5,
//!    "queen_size_min": 8, "queen_size_max": 9, ...}]`, sizes in mm. A caste
//! whose bounds are both missing is left alone; a single bound is used for
//! both ends.

use serde::Deserialize;

use super::json::{species_outcome, JsonImporter};
use super::RowOutcome;
use crate::core::catalog::{AntSize, Caste, Catalog};
use crate::core::error::Result;

pub struct AntSizes;

#[derive(Debug, Deserialize)]
pub struct AntSizeEntry {
    pub name: String,
    #[serde(default)]
    pub worker_size_min: Option<f64>,
    #[serde(default)]
    pub worker_size_max: Option<f64>,
    #[serde(default)]
    pub queen_size_min: Option<f64>,
    #[serde(default)]
    pub queen_size_max: Option<f64>,
    #[serde(default)]
    pub male_size_min: Option<f64>,
    #[serde(default)]
    pub male_size_max: Option<f64>,
}

impl AntSizeEntry {
    fn size(&self, caste: Caste) -> Option<AntSize> {
        let (min, max) = match caste {
            Caste::Worker => (self.worker_size_min, self.worker_size_max),
            Caste::Queen => (self.queen_size_min, self.queen_size_max),
            Caste::Male => (self.male_size_min, self.male_size_max),
        };
        let (minimum, maximum) = match (min, max) {
            (None, None) => return None,
            (Some(min), Some(max)) => (min, max),
            (Some(v), None) | (None, Some(v)) => (v, v),
        };
        Some(AntSize {
            caste,
            minimum,
            maximum,
        })
    }
}

impl JsonImporter for AntSizes {
    const NAME: &'static str = "ant-sizes";

    type Entry = AntSizeEntry;

    fn apply_entry(&self, catalog: &Catalog, entry: &AntSizeEntry) -> Result<RowOutcome> {
        let sizes: Vec<AntSize> = Caste::ALL.iter().filter_map(|&c| entry.size(c)).collect();
        if sizes.is_empty() {
            tracing::debug!(species = %entry.name, "no sizes given");
            return Ok(RowOutcome::Skipped);
        }

        let existed = catalog.species_by_name(entry.name.trim())?.is_some();
        let species = catalog.get_or_create_species(entry.name.trim())?;
        for size in &sizes {
            catalog.set_ant_size(species.id, size)?;
        }
        Ok(species_outcome(existed))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::error::{CatalogError, ErrorKind};
    use crate::import::import_json_text;

    #[test]
    fn test_imports_sizes_per_caste() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.get_or_create_species("Formica rufa").unwrap();
        let stats = import_json_text(
            &catalog,
            &AntSizes,
            Path::new("ant-sizes.json"),
            r#"[
                {"name": "Lasius niger", "worker_size_min": 3.5, "worker_size_max": 5,
                 "queen_size_min": 8, "queen_size_max": 9,
                 "male_size_min": null, "male_size_max": null},
                {"name": "Formica rufa", "worker_size_min": 4.5},
                {"name": "Myrmica rubra"}
            ]"#,
        )
        .unwrap();
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.skipped, 1);

        let niger = catalog.species_by_name("Lasius niger").unwrap().unwrap();
        let sizes = catalog.ant_sizes(niger.id).unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].caste, Caste::Worker);
        assert_eq!(sizes[0].maximum, 5.0);

        let rufa = catalog.species_by_name("Formica rufa").unwrap().unwrap();
        let worker = catalog.ant_size(rufa.id, Caste::Worker).unwrap().unwrap();
        assert_eq!((worker.minimum, worker.maximum), (4.5, 4.5));
        assert!(catalog.species_by_name("Myrmica rubra").unwrap().is_none());
    }

    #[test]
    fn test_bad_entry_aborts_file() {
        let catalog = Catalog::open_in_memory().unwrap();
        let err = import_json_text(
            &catalog,
            &AntSizes,
            Path::new("ant-sizes.json"),
            r#"[
                {"name": "Lasius niger", "worker_size_min": 3.5, "worker_size_max": 5},
                {"name": "Lasius flavus", "queen_size_min": 9, "queen_size_max": 7}
            ]"#,
        )
        .unwrap_err();

        match &err {
            CatalogError::ImportEntry { entry, source, .. } => {
                assert_eq!(*entry, 2);
                assert_eq!(source.kind(), ErrorKind::Validation);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(catalog.statistics().unwrap().species, 0);
    }

    #[test]
    fn test_malformed_json_is_storage_error() {
        let catalog = Catalog::open_in_memory().unwrap();
        let err = import_json_text(&catalog, &AntSizes, Path::new("x.json"), r#"{"name": 1}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
