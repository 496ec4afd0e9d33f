//! antwiki world distribution list
//!
//! Columns: 1 genus, 2 species epithet, 3 subspecies, 4 country,
//! 5 subregion, 6 introduced marker ("Yes" means introduced).

use csv::StringRecord;

use super::{field, is_subspecies, Importer, RowOutcome};
use crate::core::catalog::{Catalog, Upsert};
use crate::core::error::Result;

const INTRODUCED: &str = "Yes";

pub struct WorldDistribution;

impl Importer for WorldDistribution {
    const NAME: &'static str = "world-distribution";

    fn apply_row(&self, catalog: &Catalog, row: &StringRecord) -> Result<RowOutcome> {
        let epithet = field(row, 2);
        let taxon = format!("{} {}", field(row, 1), epithet);
        if epithet.is_empty() || is_subspecies(&taxon, Some(field(row, 3))) {
            return Ok(RowOutcome::Skipped);
        }

        let native = field(row, 6) != INTRODUCED;
        let species = catalog.get_or_create_species(&taxon)?;
        let (country, _) = catalog.get_or_create_country(field(row, 4))?;

        let mut created = matches!(
            catalog.upsert_distribution(species.id, country.id, Some(native))?.1,
            Upsert::Created
        );

        let sub_region = field(row, 5);
        if !sub_region.is_empty() {
            let (region, _) = catalog.get_or_create_subregion(sub_region, country.id)?;
            created |= matches!(
                catalog.upsert_distribution(species.id, region.id, Some(native))?.1,
                Upsert::Created
            );
        }

        Ok(if created {
            RowOutcome::Created
        } else {
            RowOutcome::Updated
        })
    }
}
