//! antmaps.org payloads saved to disk
//!
//! `species.json?bentity_id=…` lists the species of one region and
//! `bentities.json` maps antmaps region keys to region names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::catalog::{Catalog, DistributionSync};
use crate::core::error::{CatalogError, Result};

#[derive(Debug, Deserialize)]
struct SpeciesPayload {
    species: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct EntitiesPayload {
    bentities: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    key: Option<String>,
    display: String,
}

/// Outcome of matching antmaps region keys to catalog regions
#[derive(Debug, Clone, Default, Serialize)]
pub struct AntmapsIdReport {
    pub updated: Vec<String>,
    pub not_found: Vec<String>,
    pub ambiguous: Vec<String>,
}

/// Species names from an antmaps `species.json` payload
pub fn parse_antmaps_species(json: &str) -> Result<Vec<String>> {
    let payload: SpeciesPayload = serde_json::from_str(json)?;
    Ok(payload.species.into_iter().map(|s| s.display).collect())
}

/// Mark every species listed in an antmaps payload as native to `region`
pub fn import_antmaps_species(
    catalog: &Catalog,
    region: &str,
    path: &Path,
) -> Result<DistributionSync> {
    let region = catalog.resolve_region(region)?;
    let bytes = std::fs::read(path)?;
    let json = std::str::from_utf8(&bytes).map_err(|e| CatalogError::Encoding(e.to_string()))?;
    let names = parse_antmaps_species(json)?;
    let digest = super::sha256_hex(&bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    catalog.atomically(|cat| {
        let report = cat.add_or_update_distributions(region.id, &names)?;
        tracing::info!(
            region = %region.name,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped.len(),
            "antmaps species synced"
        );
        cat.record_import_run(
            "antmaps",
            &file_name,
            &digest,
            names.len() as u64,
            report.created,
            report.updated,
            report.skipped.len() as u64,
        )?;
        Ok(report)
    })
}

/// Store antmaps region keys on regions whose name matches exactly
pub fn import_antmaps_ids(catalog: &Catalog, path: &Path) -> Result<AntmapsIdReport> {
    let payload: EntitiesPayload = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    catalog.atomically(|cat| {
        let mut report = AntmapsIdReport::default();
        for entity in payload.bentities {
            let matches: Vec<_> = cat
                .find_regions_by_name(&entity.display)?
                .into_iter()
                .filter(|r| r.name == entity.display)
                .collect();
            match matches.as_slice() {
                [region] => {
                    cat.set_antmaps_id(region.id, entity.key.as_deref())?;
                    report.updated.push(entity.display);
                }
                [] => report.not_found.push(entity.display),
                _ => report.ambiguous.push(entity.display),
            }
        }
        Ok(report)
    })
}
