//! Biology and keeping data of species: colony traits, body sizes,
//! descriptions and the months a species swarms in

use rusqlite::{params, params_from_iter, OptionalExtension, ToSql};

use super::flights::parse_optional;
use super::regions::placeholders;
use super::taxa::{language_code, like_pattern};
use super::{
    AntSize, Caste, Catalog, NuptialFlightMonths, SpeciesBiology, SpeciesDescription,
    SpeciesSize, SpeciesUpdate, Upsert,
};
use crate::core::error::{CatalogError, Result};

/// Name filters shorter than this are ignored by the flight calendar
const MIN_CALENDAR_FILTER_LEN: usize = 3;

/// Months from `start` to `end` inclusive, wrapping over the year end
///
/// `(11, 2)` gives November, December, January and February.
pub fn months_from_range(start: u32, end: u32) -> Result<Vec<u32>> {
    if !(1..=12).contains(&start) || !(1..=12).contains(&end) {
        return Err(CatalogError::Invalid(format!(
            "months must lie between 1 and 12, got {} - {}",
            start, end
        )));
    }
    if start <= end {
        Ok((start..=end).collect())
    } else {
        Ok((start..=12).chain(1..=end).collect())
    }
}

fn validate_size(size: &AntSize) -> Result<()> {
    if !size.minimum.is_finite() || !size.maximum.is_finite() || size.minimum <= 0.0 {
        return Err(CatalogError::Invalid(format!(
            "{} must be a positive length in mm",
            size.caste.label().to_lowercase()
        )));
    }
    if size.minimum > size.maximum {
        return Err(CatalogError::Invalid(format!(
            "minimum {} size {} is greater than maximum {}",
            size.caste.as_str().to_lowercase(),
            size.minimum,
            size.maximum
        )));
    }
    Ok(())
}

impl Catalog {
    pub fn species_biology(&self, species_id: i64) -> Result<SpeciesBiology> {
        let biology = self
            .conn
            .query_row(
                r#"SELECT colony_structure, worker_polymorphism, founding,
                          flight_climate, nutrition, hibernation
                   FROM species_biology WHERE species_id = ?1"#,
                params![species_id],
                |row| {
                    Ok(SpeciesBiology {
                        colony_structure: parse_optional(0, row.get(0)?)?,
                        worker_polymorphism: row.get(1)?,
                        founding: parse_optional(2, row.get(2)?)?,
                        flight_climate: parse_optional(3, row.get(3)?)?,
                        nutrition: parse_optional(4, row.get(4)?)?,
                        hibernation: parse_optional(5, row.get(5)?)?,
                    })
                },
            )
            .optional()?;
        Ok(biology.unwrap_or_default())
    }

    pub(super) fn update_biology(&self, species_id: i64, update: &SpeciesUpdate) -> Result<()> {
        self.conn.execute(
            r#"INSERT INTO species_biology
                 (species_id, colony_structure, worker_polymorphism, founding,
                  flight_climate, nutrition, hibernation)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT (species_id) DO UPDATE SET
                 colony_structure = COALESCE(excluded.colony_structure, colony_structure),
                 worker_polymorphism = COALESCE(excluded.worker_polymorphism, worker_polymorphism),
                 founding = COALESCE(excluded.founding, founding),
                 flight_climate = COALESCE(excluded.flight_climate, flight_climate),
                 nutrition = COALESCE(excluded.nutrition, nutrition),
                 hibernation = COALESCE(excluded.hibernation, hibernation)"#,
            params![
                species_id,
                update.colony_structure.map(|c| c.code()),
                update.worker_polymorphism,
                update.founding.map(|f| f.code()),
                update.flight_climate.map(|c| c.code()),
                update.nutrition.map(|n| n.code()),
                update.hibernation.map(|h| h.code()),
            ],
        )?;
        tracing::debug!(species_id, "updated species biology");
        Ok(())
    }

    // =====================================================================
    // Sizes
    // =====================================================================

    /// Record the size range of one caste, replacing an earlier one
    pub fn set_ant_size(&self, species_id: i64, size: &AntSize) -> Result<Upsert> {
        validate_size(size)?;
        if self.species(species_id)?.is_none() {
            return Err(CatalogError::not_found("species", species_id.to_string()));
        }

        let existed = self.ant_size(species_id, size.caste)?.is_some();
        self.conn.execute(
            r#"INSERT INTO ant_sizes (species_id, caste, minimum, maximum)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT (species_id, caste) DO UPDATE SET
                 minimum = excluded.minimum,
                 maximum = excluded.maximum"#,
            params![species_id, size.caste.as_str(), size.minimum, size.maximum],
        )?;
        Ok(if existed {
            Upsert::Updated
        } else {
            Upsert::Created
        })
    }

    /// Forget the size of one caste; false if none was recorded
    pub fn remove_ant_size(&self, species_id: i64, caste: Caste) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM ant_sizes WHERE species_id = ?1 AND caste = ?2",
            params![species_id, caste.as_str()],
        )?;
        Ok(removed > 0)
    }

    pub fn ant_size(&self, species_id: i64, caste: Caste) -> Result<Option<AntSize>> {
        Ok(self
            .conn
            .query_row(
                "SELECT minimum, maximum FROM ant_sizes WHERE species_id = ?1 AND caste = ?2",
                params![species_id, caste.as_str()],
                |row| {
                    Ok(AntSize {
                        caste,
                        minimum: row.get(0)?,
                        maximum: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    /// Recorded sizes of a species, workers first
    pub fn ant_sizes(&self, species_id: i64) -> Result<Vec<AntSize>> {
        let mut sizes = Vec::new();
        for caste in Caste::ALL {
            if let Some(size) = self.ant_size(species_id, caste)? {
                sizes.push(size);
            }
        }
        Ok(sizes)
    }

    /// Every species with a recorded worker size, ordered by name
    pub fn worker_sizes(&self) -> Result<Vec<SpeciesSize>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT s.id, s.name, z.minimum, z.maximum
               FROM ant_sizes z
               JOIN species s ON s.id = z.species_id
               WHERE z.caste = ?1
               ORDER BY s.name"#,
        )?;
        let rows = stmt.query_map(params![Caste::Worker.as_str()], |row| {
            Ok(SpeciesSize {
                species_id: row.get(0)?,
                species: row.get(1)?,
                minimum: row.get(2)?,
                maximum: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // =====================================================================
    // Descriptions
    // =====================================================================

    /// Set the description of a species in one language
    pub fn set_description(
        &self,
        species_id: i64,
        language: &str,
        description: &str,
    ) -> Result<Upsert> {
        let language = language_code(language)?;
        let description = description.trim();
        if description.is_empty() {
            return Err(CatalogError::Invalid("description must not be empty".into()));
        }
        if self.species(species_id)?.is_none() {
            return Err(CatalogError::not_found("species", species_id.to_string()));
        }

        let existed: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM species_descriptions WHERE species_id = ?1 AND language = ?2)",
            params![species_id, language],
            |row| row.get(0),
        )?;
        self.conn.execute(
            r#"INSERT INTO species_descriptions (species_id, language, description)
               VALUES (?1, ?2, ?3)
               ON CONFLICT (species_id, language) DO UPDATE SET description = excluded.description"#,
            params![species_id, language, description],
        )?;
        Ok(if existed {
            Upsert::Updated
        } else {
            Upsert::Created
        })
    }

    pub fn descriptions(&self, species_id: i64) -> Result<Vec<SpeciesDescription>> {
        let mut stmt = self.conn.prepare(
            "SELECT language, description FROM species_descriptions WHERE species_id = ?1 ORDER BY language",
        )?;
        let rows = stmt.query_map(params![species_id], |row| {
            Ok(SpeciesDescription {
                language: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // =====================================================================
    // Known flight months
    // =====================================================================

    /// Replace the known flight months of a species
    pub fn set_flight_months(&self, species_id: i64, months: &[u32]) -> Result<Vec<u32>> {
        if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(CatalogError::Invalid(format!("{} is not a month", bad)));
        }
        if self.species(species_id)?.is_none() {
            return Err(CatalogError::not_found("species", species_id.to_string()));
        }

        self.atomically(|cat| {
            cat.conn.execute(
                "DELETE FROM species_flight_months WHERE species_id = ?1",
                params![species_id],
            )?;
            for month in months {
                cat.conn.execute(
                    "INSERT OR IGNORE INTO species_flight_months (species_id, month) VALUES (?1, ?2)",
                    params![species_id, month],
                )?;
            }
            cat.known_flight_months(species_id)
        })
    }

    /// Known flight months of a species, ascending
    pub fn known_flight_months(&self, species_id: i64) -> Result<Vec<u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT month FROM species_flight_months WHERE species_id = ?1 ORDER BY month",
        )?;
        let rows = stmt.query_map(params![species_id], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Valid species with known flight months
    ///
    /// `name` narrows by a substring of the species name once it has at
    /// least three characters. `region` keeps species distributed in any
    /// region the identifier matches.
    pub fn flight_calendar(
        &self,
        name: Option<&str>,
        region: Option<&str>,
    ) -> Result<Vec<NuptialFlightMonths>> {
        let mut sql = String::from(
            r#"SELECT s.id, s.name, m.month
               FROM species s
               JOIN species_flight_months m ON m.species_id = s.id
               WHERE s.valid = 1"#,
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(name) = name.map(str::trim) {
            if name.chars().count() >= MIN_CALENDAR_FILTER_LEN {
                params.push(Box::new(like_pattern(name)));
                sql.push_str(&format!(" AND s.name LIKE ?{} ESCAPE '\\'", params.len()));
            }
        }

        if let Some(region) = region {
            let ids = self.region_ids_matching(region)?;
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM distributions d WHERE d.species_id = s.id AND d.region_id IN ({}))",
                placeholders(ids.len(), params.len() + 1)
            ));
            for id in ids {
                params.push(Box::new(id));
            }
        }
        sql.push_str(" ORDER BY s.name, m.month");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut calendar: Vec<NuptialFlightMonths> = Vec::new();
        for row in rows {
            let (species_id, species, month) = row?;
            match calendar.last_mut() {
                Some(last) if last.species_id == species_id => last.months.push(month),
                _ => calendar.push(NuptialFlightMonths {
                    species_id,
                    species,
                    months: vec![month],
                }),
            }
        }
        Ok(calendar)
    }

    /// Store the months observed often enough in flight reports as the
    /// known flight months
    ///
    /// Species whose reports reach the threshold in no month are left as
    /// they are.
    pub fn store_observed_flight_months(
        &self,
        species: Option<&str>,
        min_count: u64,
    ) -> Result<Vec<NuptialFlightMonths>> {
        let observed = self.flight_months(species, min_count)?;
        self.atomically(|cat| {
            let mut stored = Vec::with_capacity(observed.len());
            for entry in observed {
                let record = cat
                    .species_by_name(&entry.species)?
                    .ok_or_else(|| CatalogError::not_found("species", entry.species.as_str()))?;
                let months = cat.set_flight_months(record.id, &entry.months)?;
                tracing::info!(species = %record.name, ?months, "stored flight months");
                stored.push(NuptialFlightMonths {
                    species_id: record.id,
                    species: record.name,
                    months,
                });
            }
            Ok(stored)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{
        ColonyStructure, Founding, Hibernation, NewFlight, NewRegion, Nutrition, RegionType,
        SpottingType,
    };
    use crate::core::error::ErrorKind;

    #[test]
    fn test_months_from_range_wraps_year_end() {
        assert_eq!(months_from_range(6, 8).unwrap(), vec![6, 7, 8]);
        assert_eq!(months_from_range(11, 2).unwrap(), vec![11, 12, 1, 2]);
        assert_eq!(months_from_range(7, 7).unwrap(), vec![7]);
        assert!(months_from_range(0, 5).is_err());
        assert!(months_from_range(3, 13).is_err());
    }

    #[test]
    fn test_update_species_sets_biology() {
        let catalog = Catalog::open_in_memory().unwrap();
        let species = catalog.get_or_create_species("Lasius niger").unwrap();
        assert_eq!(catalog.species_biology(species.id).unwrap(), SpeciesBiology::default());

        catalog
            .update_species(
                species.id,
                &SpeciesUpdate {
                    colony_structure: Some(ColonyStructure::Monogynous),
                    founding: Some(Founding::Claustral),
                    worker_polymorphism: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        catalog
            .update_species(
                species.id,
                &SpeciesUpdate {
                    nutrition: Some(Nutrition::Omnivorous),
                    hibernation: Some(Hibernation::Long),
                    ..Default::default()
                },
            )
            .unwrap();

        let biology = catalog.species_biology(species.id).unwrap();
        assert_eq!(biology.colony_structure, Some(ColonyStructure::Monogynous));
        assert_eq!(biology.founding, Some(Founding::Claustral));
        assert_eq!(biology.worker_polymorphism, Some(false));
        assert_eq!(biology.nutrition, Some(Nutrition::Omnivorous));
        assert_eq!(biology.hibernation, Some(Hibernation::Long));
        assert_eq!(biology.flight_climate, None);
    }

    #[test]
    fn test_update_unknown_species_leaves_no_biology() {
        let catalog = Catalog::open_in_memory().unwrap();
        let err = catalog
            .update_species(
                42,
                &SpeciesUpdate {
                    hibernation: Some(Hibernation::No),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_ant_sizes() {
        let catalog = Catalog::open_in_memory().unwrap();
        let niger = catalog.get_or_create_species("Lasius niger").unwrap();
        let rufa = catalog.get_or_create_species("Formica rufa").unwrap();

        let queen = AntSize {
            caste: Caste::Queen,
            minimum: 8.0,
            maximum: 9.0,
        };
        let worker = AntSize {
            caste: Caste::Worker,
            minimum: 3.0,
            maximum: 5.0,
        };
        assert_eq!(catalog.set_ant_size(niger.id, &queen).unwrap(), Upsert::Created);
        assert_eq!(catalog.set_ant_size(niger.id, &worker).unwrap(), Upsert::Created);
        let worker = AntSize { maximum: 5.5, ..worker };
        assert_eq!(catalog.set_ant_size(niger.id, &worker).unwrap(), Upsert::Updated);

        let sizes = catalog.ant_sizes(niger.id).unwrap();
        assert_eq!(sizes, vec![worker, queen]);

        catalog
            .set_ant_size(
                rufa.id,
                &AntSize {
                    caste: Caste::Worker,
                    minimum: 4.5,
                    maximum: 9.0,
                },
            )
            .unwrap();
        let workers: Vec<String> = catalog
            .worker_sizes()
            .unwrap()
            .into_iter()
            .map(|s| s.species)
            .collect();
        assert_eq!(workers, vec!["Formica rufa", "Lasius niger"]);

        assert!(catalog.remove_ant_size(niger.id, Caste::Queen).unwrap());
        assert!(!catalog.remove_ant_size(niger.id, Caste::Queen).unwrap());
    }

    #[test]
    fn test_ant_size_validation() {
        let catalog = Catalog::open_in_memory().unwrap();
        let species = catalog.get_or_create_species("Lasius niger").unwrap();
        for (minimum, maximum) in [(5.0, 3.0), (0.0, 3.0), (-1.0, 3.0), (f64::NAN, 3.0)] {
            let err = catalog
                .set_ant_size(
                    species.id,
                    &AntSize {
                        caste: Caste::Male,
                        minimum,
                        maximum,
                    },
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{minimum} - {maximum}");
        }
        assert!(catalog.ant_sizes(species.id).unwrap().is_empty());

        let err = catalog
            .set_ant_size(
                999,
                &AntSize {
                    caste: Caste::Male,
                    minimum: 3.0,
                    maximum: 4.0,
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_descriptions_one_per_language() {
        let catalog = Catalog::open_in_memory().unwrap();
        let species = catalog.get_or_create_species("Lasius niger").unwrap();

        assert_eq!(
            catalog.set_description(species.id, "EN", "Common garden ant.").unwrap(),
            Upsert::Created
        );
        catalog.set_description(species.id, "de", "Schwarze Wegameise.").unwrap();
        assert_eq!(
            catalog.set_description(species.id, "en", "The black garden ant.").unwrap(),
            Upsert::Updated
        );

        let descriptions = catalog.descriptions(species.id).unwrap();
        assert_eq!(descriptions.len(), 2);
        assert_eq!(descriptions[0].language, "de");
        assert_eq!(descriptions[1].description, "The black garden ant.");

        assert!(catalog.set_description(species.id, "eng", "x").is_err());
        assert!(catalog.set_description(species.id, "en", "  ").is_err());
    }

    #[test]
    fn test_known_flight_months_replace() {
        let catalog = Catalog::open_in_memory().unwrap();
        let species = catalog.get_or_create_species("Lasius niger").unwrap();

        let months = catalog.set_flight_months(species.id, &[8, 6, 7, 7]).unwrap();
        assert_eq!(months, vec![6, 7, 8]);
        let months = catalog.set_flight_months(species.id, &[7]).unwrap();
        assert_eq!(months, vec![7]);

        assert!(catalog.set_flight_months(species.id, &[13]).is_err());
        assert_eq!(catalog.known_flight_months(species.id).unwrap(), vec![7]);
        assert!(catalog.set_flight_months(species.id, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_flight_calendar_filters() {
        let catalog = Catalog::open_in_memory().unwrap();
        let de = catalog
            .create_region(&NewRegion::new("Germany", RegionType::Country).code("DE"))
            .unwrap();
        let niger = catalog.get_or_create_species("Lasius niger").unwrap();
        let flavus = catalog.get_or_create_species("Lasius flavus").unwrap();
        let rufa = catalog.get_or_create_species("Formica rufa").unwrap();
        catalog.get_or_create_species("Myrmica rubra").unwrap();
        catalog.set_flight_months(niger.id, &[6, 7, 8]).unwrap();
        catalog.set_flight_months(flavus.id, &[7, 8]).unwrap();
        catalog.set_flight_months(rufa.id, &[4, 5]).unwrap();
        catalog.set_species_valid(flavus.id, false).unwrap();
        catalog.upsert_distribution(rufa.id, de.id, Some(true)).unwrap();

        let names = |name: Option<&str>, region: Option<&str>| -> Vec<String> {
            catalog
                .flight_calendar(name, region)
                .unwrap()
                .into_iter()
                .map(|m| m.species)
                .collect()
        };
        assert_eq!(names(None, None), vec!["Formica rufa", "Lasius niger"]);
        assert_eq!(names(Some("lasius"), None), vec!["Lasius niger"]);
        assert_eq!(names(Some("la"), None).len(), 2);
        assert_eq!(names(None, Some("DE")), vec!["Formica rufa"]);

        let calendar = catalog.flight_calendar(Some("niger"), None).unwrap();
        assert_eq!(calendar[0].months, vec![6, 7, 8]);
        assert_eq!(
            catalog.flight_calendar(None, Some("XX")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_store_observed_flight_months() {
        let catalog = Catalog::open_in_memory().unwrap();
        let de = catalog
            .create_region(&NewRegion::new("Germany", RegionType::Country).code("DE"))
            .unwrap();
        let niger = catalog.get_or_create_species("Lasius niger").unwrap();
        let rubra = catalog.get_or_create_species("Myrmica rubra").unwrap();
        catalog.set_flight_months(rubra.id, &[8, 9]).unwrap();

        for date in ["2020-07-10", "2021-07-11", "2022-07-12", "2022-06-01"] {
            let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
            let flight = NewFlight::new(
                niger.id,
                de.id,
                SpottingType::Flight,
                date,
                "Marienplatz, Munich",
                48.137,
                11.575,
            );
            catalog.add_flight(&flight).unwrap();
        }

        let stored = catalog.store_observed_flight_months(None, 3).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].species, "Lasius niger");
        assert_eq!(catalog.known_flight_months(niger.id).unwrap(), vec![7]);
        assert_eq!(catalog.known_flight_months(rubra.id).unwrap(), vec![8, 9]);
    }
}
