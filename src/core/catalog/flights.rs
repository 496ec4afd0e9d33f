//! Nuptial flight sightings and their monthly aggregation

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    parse_datetime, Catalog, Flight, FlightFilter, FlightMonths, MonthlyFrequency, NewFlight,
    Temperature, Velocity,
};
use crate::core::error::{CatalogError, Result};

/// Flights needed in a month before it counts as a flight month
pub const DEFAULT_MIN_FLIGHT_COUNT: u64 = 3;

const FLIGHT_SELECT: &str = r#"SELECT f.id, f.species_id, s.name, f.species_note, f.spotting_type,
              f.date, f.start_time, f.end_time, f.address, f.latitude, f.longitude,
              f.country_id, f.state, f.city, f.temperature_value, f.temperature_unit,
              f.humidity, f.wind_speed_value, f.wind_speed_unit, f.rain, f.sky_condition,
              f.comment, f.link, f.reviewed, f.created_at, f.updated_at
       FROM flights f
       JOIN species s ON s.id = f.species_id"#;

pub(super) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(super) fn parse_optional<T>(idx: usize, value: Option<String>) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.map(|v| parse_column(idx, v)).transpose()
}

fn flight_from_row(row: &Row<'_>) -> rusqlite::Result<Flight> {
    let temperature = match (row.get::<_, Option<f64>>(14)?, row.get::<_, Option<String>>(15)?) {
        (Some(value), Some(unit)) => Some(Temperature {
            value,
            unit: parse_column(15, unit)?,
        }),
        _ => None,
    };
    let wind_speed = match (row.get::<_, Option<f64>>(17)?, row.get::<_, Option<String>>(18)?) {
        (Some(value), Some(unit)) => Some(Velocity {
            value,
            unit: parse_column(18, unit)?,
        }),
        _ => None,
    };

    Ok(Flight {
        id: row.get(0)?,
        species_id: row.get(1)?,
        species: row.get(2)?,
        species_note: row.get(3)?,
        spotting_type: parse_column(4, row.get(4)?)?,
        date: parse_column(5, row.get(5)?)?,
        start_time: parse_optional(6, row.get(6)?)?,
        end_time: parse_optional(7, row.get(7)?)?,
        address: row.get(8)?,
        latitude: row.get(9)?,
        longitude: row.get(10)?,
        country_id: row.get(11)?,
        state: row.get(12)?,
        city: row.get(13)?,
        temperature,
        humidity: row.get(16)?,
        wind_speed,
        rain: parse_optional(19, row.get(19)?)?,
        sky_condition: parse_optional(20, row.get(20)?)?,
        comment: row.get(21)?,
        link: row.get(22)?,
        reviewed: row.get(23)?,
        created_at: parse_datetime(row.get(24)?),
        updated_at: parse_datetime(row.get(25)?),
    })
}

/// Check a flight report against the field rules
///
/// `today` is the latest allowed flight date.
pub fn validate_flight(flight: &NewFlight, today: NaiveDate) -> Result<()> {
    if flight.date > today {
        return Err(CatalogError::Invalid(format!(
            "flight date {} lies in the future",
            flight.date
        )));
    }
    if flight.address.trim().is_empty() {
        return Err(CatalogError::Invalid("address must not be empty".into()));
    }
    if !(-90.0..=90.0).contains(&flight.latitude) {
        return Err(CatalogError::Invalid(format!(
            "latitude {} is outside -90..90",
            flight.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&flight.longitude) {
        return Err(CatalogError::Invalid(format!(
            "longitude {} is outside -180..180",
            flight.longitude
        )));
    }
    match (flight.start_time, flight.end_time) {
        (Some(_), None) => {
            return Err(CatalogError::Invalid("a start time needs an end time".into()));
        }
        (None, Some(_)) => {
            return Err(CatalogError::Invalid("an end time needs a start time".into()));
        }
        (Some(start), Some(end)) if start > end => {
            return Err(CatalogError::Invalid(format!(
                "start time {} is after end time {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        _ => {}
    }
    if matches!(flight.humidity, Some(h) if h < 0) {
        return Err(CatalogError::Invalid("humidity must not be negative".into()));
    }
    if matches!(flight.wind_speed, Some(w) if w.value < 0.0) {
        return Err(CatalogError::Invalid("wind speed must not be negative".into()));
    }
    Ok(())
}

impl Catalog {
    /// Store a new, unreviewed flight report
    pub fn add_flight(&self, flight: &NewFlight) -> Result<Flight> {
        validate_flight(flight, Utc::now().date_naive())?;
        if self.species(flight.species_id)?.is_none() {
            return Err(CatalogError::not_found("species", flight.species_id.to_string()));
        }
        if self.region(flight.country_id)?.is_none() {
            return Err(CatalogError::not_found("region", flight.country_id.to_string()));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"INSERT INTO flights
                 (species_id, species_note, spotting_type, date, start_time, end_time,
                  address, latitude, longitude, country_id, state, city,
                  temperature_value, temperature_unit, humidity,
                  wind_speed_value, wind_speed_unit, rain, sky_condition,
                  comment, link, reviewed, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, 0, ?22, ?22)"#,
            params![
                flight.species_id,
                flight.species_note,
                flight.spotting_type.code(),
                flight.date.to_string(),
                flight.start_time.map(|t| t.to_string()),
                flight.end_time.map(|t| t.to_string()),
                flight.address.trim(),
                flight.latitude,
                flight.longitude,
                flight.country_id,
                flight.state,
                flight.city,
                flight.temperature.map(|t| t.value),
                flight.temperature.map(|t| t.unit.code()),
                flight.humidity,
                flight.wind_speed.map(|w| w.value),
                flight.wind_speed.map(|w| w.unit.code()),
                flight.rain.map(|r| r.code()),
                flight.sky_condition.map(|s| s.code()),
                flight.comment,
                flight.link,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, species_id = flight.species_id, date = %flight.date, "added flight");

        self.flight(id)?
            .ok_or_else(|| CatalogError::not_found("flight", id.to_string()))
    }

    pub fn flight(&self, id: i64) -> Result<Option<Flight>> {
        let sql = format!("{} WHERE f.id = ?1", FLIGHT_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![id], flight_from_row)
            .optional()?)
    }

    /// Flights matching a filter, most recent first
    pub fn list_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>> {
        let mut sql = format!("{} WHERE 1=1", FLIGHT_SELECT);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(species_id) = filter.species_id {
            sql.push_str(" AND f.species_id = ?");
            params_vec.push(Box::new(species_id));
        }

        if let Some(country_id) = filter.country_id {
            sql.push_str(" AND f.country_id = ?");
            params_vec.push(Box::new(country_id));
        }

        if filter.unreviewed_only {
            sql.push_str(" AND f.reviewed = 0");
        }

        sql.push_str(" ORDER BY f.date DESC, f.id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), flight_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Mark a flight as reviewed by staff
    pub fn review_flight(&self, id: i64) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE flights SET reviewed = 1, updated_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )?;
        if updated == 0 {
            return Err(CatalogError::not_found("flight", id.to_string()));
        }
        Ok(())
    }

    /// Move all flights of one species to another; returns how many moved
    pub fn repoint_flights(&self, from_species: i64, to_species: i64) -> Result<usize> {
        let moved = self.conn.execute(
            "UPDATE flights SET species_id = ?2, updated_at = ?3 WHERE species_id = ?1",
            params![from_species, to_species, Utc::now().to_rfc3339()],
        )?;
        if moved > 0 {
            tracing::debug!(from_species, to_species, moved, "repointed flights");
        }
        Ok(moved)
    }

    /// Number of flights per calendar month, across all years
    ///
    /// The species is given by id, name or slug; `country` by id, code or slug.
    pub fn flight_frequency_per_month(
        &self,
        species: &str,
        country: Option<&str>,
    ) -> Result<MonthlyFrequency> {
        let species = self.resolve_species(species)?;
        let country_id = country
            .map(|c| self.resolve_region(c).map(|r| r.id))
            .transpose()?;

        let mut stmt = self.conn.prepare(
            r#"SELECT CAST(strftime('%m', date) AS INTEGER), COUNT(*)
               FROM flights
               WHERE species_id = ?1 AND (?2 IS NULL OR country_id = ?2)
               GROUP BY 1"#,
        )?;
        let rows = stmt.query_map(params![species.id, country_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = [0u64; 12];
        for row in rows {
            let (month, count) = row?;
            if let Some(slot) = usize::try_from(month - 1).ok().and_then(|i| counts.get_mut(i)) {
                *slot = count as u64;
            }
        }
        Ok(MonthlyFrequency::new(counts))
    }

    /// Months in which species were seen flying at least `min_count` times
    ///
    /// With `species` set only that species is reported; otherwise every
    /// species that has at least one qualifying month, ordered by name.
    pub fn flight_months(&self, species: Option<&str>, min_count: u64) -> Result<Vec<FlightMonths>> {
        let species_id = species
            .map(|s| self.resolve_species(s).map(|s| s.id))
            .transpose()?;

        let mut stmt = self.conn.prepare(
            r#"SELECT s.name, CAST(strftime('%m', f.date) AS INTEGER), COUNT(*)
               FROM flights f
               JOIN species s ON s.id = f.species_id
               WHERE (?1 IS NULL OR f.species_id = ?1)
               GROUP BY s.id, 2
               ORDER BY s.name"#,
        )?;
        let rows = stmt.query_map(params![species_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut grouped: Vec<(String, [u64; 12])> = Vec::new();
        for row in rows {
            let (name, month, count) = row?;
            if grouped.last().map(|(n, _)| n != &name).unwrap_or(true) {
                grouped.push((name, [0; 12]));
            }
            if let Some((_, counts)) = grouped.last_mut() {
                if let Some(slot) = usize::try_from(month - 1).ok().and_then(|i| counts.get_mut(i)) {
                    *slot = count as u64;
                }
            }
        }

        Ok(grouped
            .into_iter()
            .filter_map(|(species, counts)| {
                let months: Vec<u32> = (1..=12u32)
                    .filter(|m| counts[(*m - 1) as usize] >= min_count)
                    .collect();
                if months.is_empty() {
                    return None;
                }
                Some(FlightMonths {
                    species,
                    counts: MonthlyFrequency::new(counts),
                    months,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{NewRegion, Rain, RegionType, SpottingType, VelocityUnit};
    use crate::core::error::ErrorKind;

    fn setup() -> (Catalog, i64, i64) {
        let catalog = Catalog::open_in_memory().unwrap();
        let species = catalog.get_or_create_species("Lasius niger").unwrap();
        let country = catalog
            .create_region(&NewRegion::new("Germany", RegionType::Country).code("DE"))
            .unwrap();
        (catalog, species.id, country.id)
    }

    fn flight_on(species_id: i64, country_id: i64, date: &str) -> NewFlight {
        NewFlight::new(
            species_id,
            country_id,
            SpottingType::Flight,
            date.parse().unwrap(),
            "Marienplatz, München",
            48.137,
            11.575,
        )
    }

    #[test]
    fn test_add_and_read_flight() {
        let (catalog, species_id, country_id) = setup();
        let mut report = flight_on(species_id, country_id, "2020-07-14");
        report.start_time = Some("17:30:00".parse().unwrap());
        report.end_time = Some("19:00:00".parse().unwrap());
        report.humidity = Some(60);
        report.wind_speed = Some(Velocity {
            value: 5.0,
            unit: VelocityUnit::Kmh,
        });
        report.rain = Some(Rain::Before);

        let flight = catalog.add_flight(&report).unwrap();
        assert_eq!(flight.species, "Lasius niger");
        assert!(!flight.reviewed);
        assert_eq!(flight.time_str().as_deref(), Some("17:30 - 19:00"));
        assert_eq!(flight.rain, Some(Rain::Before));
        assert_eq!(flight.wind_speed.map(|w| w.unit), Some(VelocityUnit::Kmh));

        catalog.review_flight(flight.id).unwrap();
        assert!(catalog.flight(flight.id).unwrap().unwrap().reviewed);
        assert_eq!(
            catalog.review_flight(9999).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_flight_validation() {
        let today: NaiveDate = "2021-05-01".parse().unwrap();
        let ok = flight_on(1, 1, "2021-05-01");
        assert!(validate_flight(&ok, today).is_ok());

        let future = flight_on(1, 1, "2021-05-02");
        assert!(validate_flight(&future, today).is_err());

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.latitude = 91.0;
        assert!(validate_flight(&bad, today).is_err());

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.longitude = -180.5;
        assert!(validate_flight(&bad, today).is_err());

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.humidity = Some(-1);
        assert!(validate_flight(&bad, today).is_err());

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.address = "  ".into();
        assert!(validate_flight(&bad, today).is_err());

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.start_time = Some("19:00:00".parse().unwrap());
        bad.end_time = Some("17:00:00".parse().unwrap());
        let err = validate_flight(&bad, today).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("19:00"));

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.end_time = Some("17:00:00".parse().unwrap());
        assert!(validate_flight(&bad, today).is_err());

        let mut bad = flight_on(1, 1, "2021-04-01");
        bad.start_time = Some("17:00:00".parse().unwrap());
        assert!(validate_flight(&bad, today).is_err());

        let mut single = flight_on(1, 1, "2021-04-01");
        single.start_time = Some("17:00:00".parse().unwrap());
        single.end_time = single.start_time;
        assert!(validate_flight(&single, today).is_ok());
    }

    #[test]
    fn test_add_flight_rejects_backwards_time_range() {
        let (catalog, species_id, country_id) = setup();
        let mut report = flight_on(species_id, country_id, "2020-07-14");
        report.start_time = Some("19:00:00".parse().unwrap());
        report.end_time = Some("17:00:00".parse().unwrap());
        assert!(catalog.add_flight(&report).is_err());
        assert!(catalog.list_flights(&FlightFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_frequency_single_june_flight() {
        let (catalog, species_id, country_id) = setup();
        catalog
            .add_flight(&flight_on(species_id, country_id, "2019-06-21"))
            .unwrap();

        let freq = catalog
            .flight_frequency_per_month("Lasius niger", None)
            .unwrap();
        assert_eq!(freq.iter().count(), 12);
        for (i, (month, count)) in freq.iter().enumerate() {
            if month == "June" {
                assert_eq!(count, 1);
            } else {
                assert_eq!(count, 0, "{month} at {i}");
            }
        }
    }

    #[test]
    fn test_frequency_without_flights_is_all_zero() {
        let (catalog, _, _) = setup();
        let freq = catalog
            .flight_frequency_per_month("lasius-niger", None)
            .unwrap();
        assert_eq!(freq.total(), 0);
        assert_eq!(freq.counts().len(), 12);
    }

    #[test]
    fn test_frequency_restricted_to_country() {
        let (catalog, species_id, de) = setup();
        let fr = catalog
            .create_region(&NewRegion::new("France", RegionType::Country).code("FR"))
            .unwrap();
        catalog.add_flight(&flight_on(species_id, de, "2019-07-01")).unwrap();
        catalog.add_flight(&flight_on(species_id, de, "2020-07-03")).unwrap();
        catalog.add_flight(&flight_on(species_id, fr.id, "2020-08-03")).unwrap();

        let all = catalog
            .flight_frequency_per_month(&species_id.to_string(), None)
            .unwrap();
        assert_eq!(all.get(7), Some(2));
        assert_eq!(all.get(8), Some(1));

        let german = catalog
            .flight_frequency_per_month("Lasius niger", Some("DE"))
            .unwrap();
        assert_eq!(german.get(7), Some(2));
        assert_eq!(german.get(8), Some(0));
    }

    #[test]
    fn test_flight_months_threshold() {
        let (catalog, species_id, country_id) = setup();
        for date in ["2018-07-01", "2019-07-10", "2020-07-20", "2020-08-01"] {
            catalog
                .add_flight(&flight_on(species_id, country_id, date))
                .unwrap();
        }

        let months = catalog
            .flight_months(None, DEFAULT_MIN_FLIGHT_COUNT)
            .unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].species, "Lasius niger");
        assert_eq!(months[0].months, vec![7]);

        let months = catalog.flight_months(Some("Lasius niger"), 1).unwrap();
        assert_eq!(months[0].months, vec![7, 8]);
        assert!(catalog.flight_months(None, 4).unwrap().is_empty());
    }

    #[test]
    fn test_repoint_flights() {
        let (catalog, species_id, country_id) = setup();
        let other = catalog.get_or_create_species("Lasius platythorax").unwrap();
        catalog
            .add_flight(&flight_on(species_id, country_id, "2020-07-01"))
            .unwrap();

        assert_eq!(catalog.repoint_flights(species_id, other.id).unwrap(), 1);
        let flights = catalog
            .list_flights(&FlightFilter {
                species_id: Some(other.id),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].species, "Lasius platythorax");
    }
}
