//! Known swarming seasons
//!
//! `[{"name": "Lasius niger", "nuptial_flight_start": 6,
//!    "nuptial_flight_end": 8, "countries": [{"code": "DE"}]}]`. The month
//! range wraps over the year end and replaces the species' known flight
//! months. Listed countries are recorded as distributions.

use serde::Deserialize;

use super::json::{species_outcome, JsonImporter};
use super::RowOutcome;
use crate::core::catalog::{months_from_range, Catalog};
use crate::core::error::Result;

pub struct NuptialFlights;

#[derive(Debug, Deserialize)]
pub struct NuptialFlightEntry {
    pub name: String,
    pub nuptial_flight_start: u32,
    pub nuptial_flight_end: u32,
    #[serde(default)]
    pub countries: Vec<CountryRef>,
}

#[derive(Debug, Deserialize)]
pub struct CountryRef {
    pub code: String,
}

impl JsonImporter for NuptialFlights {
    const NAME: &'static str = "nuptial-flights";

    type Entry = NuptialFlightEntry;

    fn apply_entry(&self, catalog: &Catalog, entry: &NuptialFlightEntry) -> Result<RowOutcome> {
        let months = months_from_range(entry.nuptial_flight_start, entry.nuptial_flight_end)?;
        let name = entry.name.trim();

        let existed = catalog.species_by_name(name)?.is_some();
        let species = catalog.get_or_create_species(name)?;
        catalog.set_flight_months(species.id, &months)?;

        for country in &entry.countries {
            let region = catalog.resolve_region(&country.code)?;
            if catalog.distribution(species.id, region.id)?.is_none() {
                catalog.upsert_distribution(species.id, region.id, None)?;
            }
        }
        Ok(species_outcome(existed))
    }
}
