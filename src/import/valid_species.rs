//! antwiki list of valid species
//!
//! Columns: 0 taxon, 1 subfamily, 2 tribe, 3 genus, 4 species group,
//! 6 subspecies, 8 author, 9 year.

use csv::StringRecord;

use super::{field, is_subspecies, Importer, RowOutcome};
use crate::core::catalog::{Catalog, SpeciesUpdate};
use crate::core::error::{CatalogError, Result};
use crate::core::taxonomy::Rank;

pub struct ValidSpecies;

/// Every taxon on the antwiki list belongs to the ant family
const FAMILY: &str = "Formicidae";

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl Importer for ValidSpecies {
    const NAME: &'static str = "valid-species";

    fn apply_row(&self, catalog: &Catalog, row: &StringRecord) -> Result<RowOutcome> {
        let taxon = field(row, 0);
        if is_subspecies(taxon, Some(field(row, 6))) {
            return Ok(RowOutcome::Skipped);
        }

        let sub_family = field(row, 1);
        let tribe = field(row, 2);
        let genus = field(row, 3);
        let year = match field(row, 9) {
            "" => None,
            y => Some(y.parse::<i32>().map_err(|_| {
                CatalogError::Invalid(format!("year '{}' of {} is not a number", y, taxon))
            })?),
        };

        let existed = catalog.species_by_name(taxon)?.is_some();
        let species = catalog.get_or_create_species(taxon)?;
        catalog.update_species(
            species.id,
            &SpeciesUpdate {
                author: non_empty(field(row, 8)),
                year,
                group: non_empty(field(row, 4)),
                ..Default::default()
            },
        )?;

        let genus_id = if genus.is_empty() {
            species.genus_id
        } else {
            let record = catalog.get_or_create_rank(Rank::Genus, genus)?;
            catalog.set_species_genus(species.id, record.id)?;
            Some(record.id)
        };

        let sub_family_id = match sub_family {
            "" => None,
            name => {
                let family = catalog.get_or_create_rank(Rank::Family, FAMILY)?;
                let record = catalog.get_or_create_rank(Rank::SubFamily, name)?;
                catalog.set_sub_family_family(record.id, family.id)?;
                Some(record.id)
            }
        };

        if let Some(genus_id) = genus_id {
            if !tribe.is_empty() {
                let tribe = catalog.get_or_create_rank(Rank::Tribe, tribe)?;
                catalog.set_genus_tribe(genus_id, tribe.id)?;
                if let Some(sub_family_id) = sub_family_id {
                    catalog.set_tribe_sub_family(tribe.id, sub_family_id)?;
                }
            } else if let Some(sub_family_id) = sub_family_id {
                catalog.set_genus_sub_family(genus_id, sub_family_id)?;
            }
        }

        Ok(if existed {
            RowOutcome::Updated
        } else {
            RowOutcome::Created
        })
    }
}
