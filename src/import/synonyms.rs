//! antwiki synonym list
//!
//! Columns: 0 taxon name, 8 currently valid name, 9 status.

use csv::StringRecord;

use super::{field, Importer, RowOutcome};
use crate::core::catalog::Catalog;
use crate::core::error::Result;
use crate::core::taxonomy::token_count;

pub struct Synonyms;

impl Importer for Synonyms {
    const NAME: &'static str = "synonyms";

    fn apply_row(&self, catalog: &Catalog, row: &StringRecord) -> Result<RowOutcome> {
        let taxon = field(row, 0);
        let valid_name = field(row, 8);
        let status = field(row, 9);

        if status != "synonym" || token_count(taxon) != 2 || token_count(valid_name) != 2 {
            return Ok(RowOutcome::Skipped);
        }

        let invalid = catalog.species_by_name(taxon)?;
        let valid = catalog.species_by_name(valid_name)?;
        let mut outcome = RowOutcome::Updated;

        match (&invalid, &valid) {
            (Some(old), None) => {
                catalog.rename_species(old.id, valid_name)?;
                tracing::debug!(from = taxon, to = valid_name, "renamed synonym");
            }
            (Some(old), Some(current)) => {
                catalog.set_species_valid(old.id, false)?;
                catalog.repoint_flights(old.id, current.id)?;
                tracing::debug!(invalid = taxon, valid = valid_name, "invalidated synonym");
            }
            (None, None) => outcome = RowOutcome::Created,
            (None, Some(_)) => {}
        }

        let species = catalog.get_or_create_species(valid_name)?;
        catalog.add_invalid_name(species.id, taxon)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::NaiveDate;

    use super::*;
    use crate::core::catalog::{FlightFilter, NewFlight, NewRegion, RegionType, SpottingType};
    use crate::import::{import_text, ImportStats};

    const HEADER: &str = "Taxon\tc1\tc2\tc3\tc4\tc5\tc6\tc7\tValid\tStatus\n";

    fn row(taxon: &str, valid: &str, status: &str) -> String {
        format!("{taxon}\t\t\t\t\t\t\t\t{valid}\t{status}\n")
    }

    fn run(catalog: &Catalog, rows: &[String]) -> ImportStats {
        let text = format!("{}{}", HEADER, rows.concat());
        import_text(catalog, &Synonyms, Path::new("synonyms.tsv"), &text).unwrap()
    }

    #[test]
    fn test_rename_when_only_invalid_exists() {
        let catalog = Catalog::open_in_memory().unwrap();
        let old = catalog.get_or_create_species("Acanthomyops claviger").unwrap();

        run(&catalog, &[row("Acanthomyops claviger", "Lasius claviger", "synonym")]);

        assert!(catalog.species_by_name("Acanthomyops claviger").unwrap().is_none());
        let renamed = catalog.species_by_name("Lasius claviger").unwrap().unwrap();
        assert_eq!(renamed.id, old.id);
        assert_eq!(
            catalog.invalid_names(renamed.id).unwrap(),
            vec!["Acanthomyops claviger"]
        );
    }

    #[test]
    fn test_both_exist_invalidates_and_moves_flights() {
        let catalog = Catalog::open_in_memory().unwrap();
        let old = catalog.get_or_create_species("Acanthomyops claviger").unwrap();
        let current = catalog.get_or_create_species("Lasius claviger").unwrap();
        let country = catalog
            .create_region(&NewRegion::new("Germany", RegionType::Country).code("DE"))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 8, 1).unwrap();
        catalog
            .add_flight(&NewFlight::new(
                old.id,
                country.id,
                SpottingType::Flight,
                date,
                "Berlin",
                52.5,
                13.4,
            ))
            .unwrap();

        run(&catalog, &[row("Acanthomyops claviger", "Lasius claviger", "synonym")]);

        let old = catalog.species(old.id).unwrap().unwrap();
        assert!(!old.valid);
        assert_eq!(
            catalog.invalid_names(current.id).unwrap(),
            vec!["Acanthomyops claviger"]
        );
        let flights = catalog.list_flights(&FlightFilter::default()).unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].species_id, current.id);
    }

    #[test]
    fn test_skips_non_synonyms_and_trinomials() {
        let catalog = Catalog::open_in_memory().unwrap();
        let stats = run(
            &catalog,
            &[
                row("Lasius alienus", "Lasius alienus", "valid"),
                row("Lasius niger alienus", "Lasius alienus", "synonym"),
                row("Lasius alienoides", "Lasius alienus americanus", "synonym"),
            ],
        );
        assert_eq!(stats.skipped, 3);
        assert_eq!(catalog.statistics().unwrap().species, 0);
    }

    #[test]
    fn test_rerun_does_not_duplicate_alias() {
        let catalog = Catalog::open_in_memory().unwrap();
        let rows = [row("Formica dorsata", "Formica rufa", "synonym")];
        let first = run(&catalog, &rows);
        let second = run(&catalog, &rows);

        assert_eq!(first.created, 1);
        assert_eq!(second.updated, 1);
        let rufa = catalog.species_by_name("Formica rufa").unwrap().unwrap();
        assert_eq!(catalog.invalid_names(rufa.id).unwrap().len(), 1);
    }
}
