//! Regions and species distributions

use rusqlite::{params, params_from_iter, OptionalExtension, Row, ToSql};

use super::{
    Catalog, Distribution, DistributionSync, NewRegion, RedListStatus, Region, RegionSpecies,
    RegionType, Upsert,
};
use crate::core::error::{CatalogError, Result};
use crate::core::taxonomy::slugify;

use super::taxa::like_pattern;

const REGION_SELECT: &str = r#"SELECT id, code, name, official_name, antwiki_name, slug,
              region_type, parent_id, ant_list_complete, antmaps_id
       FROM regions"#;

fn region_from_row(row: &Row<'_>) -> rusqlite::Result<Region> {
    Ok(Region {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        official_name: row.get(3)?,
        antwiki_name: row.get(4)?,
        slug: row.get(5)?,
        region_type: RegionType::from(row.get::<_, String>(6)?.as_str()),
        parent_id: row.get(7)?,
        ant_list_complete: row.get(8)?,
        antmaps_id: row.get(9)?,
    })
}

/// `?n, ?n+1, ...` for `count` numbered parameters starting at `first`
pub(super) fn placeholders(count: usize, first: usize) -> String {
    (first..first + count)
        .map(|n| format!("?{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn distribution_from_row(row: &Row<'_>) -> rusqlite::Result<Distribution> {
    Ok(Distribution {
        id: row.get(0)?,
        species_id: row.get(1)?,
        region_id: row.get(2)?,
        native: row.get(3)?,
        protected: row.get(4)?,
        red_list_status: parse_red_list(row.get(5)?),
    })
}

fn parse_red_list(value: Option<String>) -> Option<RedListStatus> {
    value.and_then(|s| s.parse().ok())
}

impl Catalog {
    // =====================================================================
    // Regions
    // =====================================================================

    pub fn create_region(&self, region: &NewRegion) -> Result<Region> {
        let name = region.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Invalid("region name must not be empty".into()));
        }
        if let Some(parent_id) = region.parent_id {
            if self.region(parent_id)?.is_none() {
                return Err(CatalogError::not_found("region", parent_id.to_string()));
            }
        }

        self.conn.execute(
            r#"INSERT INTO regions
                 (code, name, official_name, antwiki_name, slug, region_type, parent_id)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                region.code,
                name,
                region.official_name,
                region.antwiki_name,
                slugify(name),
                region.region_type.as_str(),
                region.parent_id
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name, region_type = %region.region_type, "created region");

        self.region(id)?
            .ok_or_else(|| CatalogError::not_found("region", id.to_string()))
    }

    pub fn region(&self, id: i64) -> Result<Option<Region>> {
        let sql = format!("{} WHERE id = ?1", REGION_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![id], region_from_row)
            .optional()?)
    }

    /// Resolve a region from a numeric id, its code or its slug
    ///
    /// The id is tried first; codes match exactly, slugs ignore case.
    pub fn resolve_region(&self, ident: &str) -> Result<Region> {
        let mut matches = self.regions_matching(ident)?;
        if matches.len() > 1 {
            let exact: Vec<usize> = matches
                .iter()
                .enumerate()
                .filter(|(_, r)| r.code.as_deref() == Some(ident))
                .map(|(i, _)| i)
                .collect();
            if let [i] = exact[..] {
                return Ok(matches.swap_remove(i));
            }
            let candidates = matches
                .iter()
                .map(|r| format!("{} ({})", r.name, r.id))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CatalogError::Ambiguous {
                what: "region",
                key: ident.to_string(),
                candidates,
            });
        }
        matches
            .pop()
            .ok_or_else(|| CatalogError::not_found("region", ident))
    }

    /// Every region an identifier can stand for
    ///
    /// A numeric id names at most one region. Otherwise all regions whose
    /// code equals `ident` or whose slug matches it case-insensitively are
    /// returned, so "georgia" finds both the country and the US state.
    pub fn regions_matching(&self, ident: &str) -> Result<Vec<Region>> {
        if let Ok(id) = ident.parse::<i64>() {
            if let Some(region) = self.region(id)? {
                return Ok(vec![region]);
            }
        }

        let sql = format!(
            "{} WHERE code = ?1 OR lower(slug) = lower(?1) ORDER BY id",
            REGION_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![ident], region_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub(super) fn region_ids_matching(&self, ident: &str) -> Result<Vec<i64>> {
        let ids: Vec<i64> = self
            .regions_matching(ident)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            return Err(CatalogError::not_found("region", ident));
        }
        Ok(ids)
    }

    /// Regions whose name, official name or antwiki name equals `name`
    pub fn find_regions_by_name(&self, name: &str) -> Result<Vec<Region>> {
        let sql = format!(
            "{} WHERE name = ?1 OR official_name = ?1 OR antwiki_name = ?1 ORDER BY id",
            REGION_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![name], region_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Find a country by any of its names, creating it if unknown
    pub fn get_or_create_country(&self, name: &str) -> Result<(Region, Upsert)> {
        let existing = self
            .find_regions_by_name(name)?
            .into_iter()
            .find(|r| r.region_type == RegionType::Country);
        match existing {
            Some(region) => Ok((region, Upsert::Updated)),
            None => Ok((
                self.create_region(&NewRegion::new(name, RegionType::Country))?,
                Upsert::Created,
            )),
        }
    }

    /// Find a subregion of `country_id` by any of its names, creating it if unknown
    pub fn get_or_create_subregion(&self, name: &str, country_id: i64) -> Result<(Region, Upsert)> {
        let existing = self
            .find_regions_by_name(name)?
            .into_iter()
            .find(|r| r.region_type == RegionType::Subregion && r.parent_id == Some(country_id));
        match existing {
            Some(region) => Ok((region, Upsert::Updated)),
            None => Ok((
                self.create_region(
                    &NewRegion::new(name, RegionType::Subregion).parent(country_id),
                )?,
                Upsert::Created,
            )),
        }
    }

    pub fn list_regions(&self, region_type: Option<&RegionType>) -> Result<Vec<Region>> {
        match region_type {
            Some(t) => self.query_regions(
                &format!("{} WHERE region_type = ?1 ORDER BY name", REGION_SELECT),
                params![t.as_str()],
            ),
            None => self.query_regions(&format!("{} ORDER BY name", REGION_SELECT), []),
        }
    }

    pub fn countries(&self) -> Result<Vec<Region>> {
        self.list_regions(Some(&RegionType::Country))
    }

    /// Regions with at least one distribution record
    pub fn regions_with_ants(&self) -> Result<Vec<Region>> {
        self.query_regions(
            &format!(
                "{} WHERE id IN (SELECT region_id FROM distributions) ORDER BY name",
                REGION_SELECT
            ),
            [],
        )
    }

    /// Countries with ants, optionally only those whose species list is complete
    pub fn countries_with_ants(&self, complete_only: bool) -> Result<Vec<Region>> {
        let mut sql = format!(
            "{} WHERE region_type = 'Country' AND id IN (SELECT region_id FROM distributions)",
            REGION_SELECT
        );
        if complete_only {
            sql.push_str(" AND ant_list_complete = 1");
        }
        sql.push_str(" ORDER BY name");
        self.query_regions(&sql, [])
    }

    /// Subregions with ants whose parent country has the given code
    pub fn states_with_ants_and_country(&self, country_code: &str) -> Result<Vec<Region>> {
        let sql = format!(
            r#"{} WHERE id IN (SELECT region_id FROM distributions)
                 AND parent_id IN (SELECT id FROM regions
                                   WHERE region_type = 'Country' AND code = ?1)
               ORDER BY name"#,
            REGION_SELECT
        );
        self.query_regions(&sql, params![country_code])
    }

    /// Regions a species is distributed in
    pub fn regions_of_species(&self, species_id: i64) -> Result<Vec<Region>> {
        self.query_regions(
            &format!(
                "{} WHERE id IN (SELECT region_id FROM distributions WHERE species_id = ?1) ORDER BY name",
                REGION_SELECT
            ),
            params![species_id],
        )
    }

    fn query_regions(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Region>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, region_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn set_ant_list_complete(&self, region_id: i64, complete: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE regions SET ant_list_complete = ?2 WHERE id = ?1",
            params![region_id, complete],
        )?;
        if updated == 0 {
            return Err(CatalogError::not_found("region", region_id.to_string()));
        }
        Ok(())
    }

    pub fn set_antmaps_id(&self, region_id: i64, antmaps_id: Option<&str>) -> Result<()> {
        self.conn.execute(
            "UPDATE regions SET antmaps_id = ?2 WHERE id = ?1",
            params![region_id, antmaps_id],
        )?;
        Ok(())
    }

    // =====================================================================
    // Distributions
    // =====================================================================

    pub fn distribution(&self, species_id: i64, region_id: i64) -> Result<Option<Distribution>> {
        Ok(self
            .conn
            .query_row(
                r#"SELECT id, species_id, region_id, native, protected, red_list_status
                   FROM distributions WHERE species_id = ?1 AND region_id = ?2"#,
                params![species_id, region_id],
                distribution_from_row,
            )
            .optional()?)
    }

    /// Record that a species occurs in a region
    ///
    /// There is at most one distribution per (species, region); an existing
    /// row only gets its native flag updated.
    pub fn upsert_distribution(
        &self,
        species_id: i64,
        region_id: i64,
        native: Option<bool>,
    ) -> Result<(Distribution, Upsert)> {
        let outcome = match self.distribution(species_id, region_id)? {
            Some(existing) => {
                self.update_native(existing.id, native)?;
                Upsert::Updated
            }
            None => match self.insert_distribution(species_id, region_id, native)? {
                (_, true) => Upsert::Created,
                (existing_id, false) => {
                    self.update_native(existing_id, native)?;
                    Upsert::Updated
                }
            },
        };

        let distribution = self.distribution(species_id, region_id)?.ok_or_else(|| {
            CatalogError::not_found("distribution", format!("{}/{}", species_id, region_id))
        })?;
        Ok((distribution, outcome))
    }

    /// Insert a distribution row; `false` with the existing id when a
    /// concurrent writer created it first
    fn insert_distribution(
        &self,
        species_id: i64,
        region_id: i64,
        native: Option<bool>,
    ) -> Result<(i64, bool)> {
        let key = format!("{}/{}", species_id, region_id);
        let (id, created) = self.insert_or_reread(
            |conn| {
                conn.execute(
                    "INSERT INTO distributions (species_id, region_id, native) VALUES (?1, ?2, ?3)",
                    params![species_id, region_id, native],
                )?;
                Ok(conn.last_insert_rowid())
            },
            |cat| Ok(cat.distribution(species_id, region_id)?.map(|d| d.id)),
            "distribution",
            &key,
        )?;
        if created {
            tracing::debug!(species_id, region_id, ?native, "created distribution");
        }
        Ok((id, created))
    }

    fn update_native(&self, distribution_id: i64, native: Option<bool>) -> Result<()> {
        self.conn.execute(
            "UPDATE distributions SET native = ?2 WHERE id = ?1",
            params![distribution_id, native],
        )?;
        Ok(())
    }

    pub fn set_distribution_protected(
        &self,
        species_id: i64,
        region_id: i64,
        protected: bool,
    ) -> Result<()> {
        self.update_distribution(
            "UPDATE distributions SET protected = ?3 WHERE species_id = ?1 AND region_id = ?2",
            species_id,
            region_id,
            protected,
        )
    }

    pub fn set_red_list_status(
        &self,
        species_id: i64,
        region_id: i64,
        status: Option<RedListStatus>,
    ) -> Result<()> {
        self.update_distribution(
            "UPDATE distributions SET red_list_status = ?3 WHERE species_id = ?1 AND region_id = ?2",
            species_id,
            region_id,
            status.map(|s| s.as_str()),
        )
    }

    fn update_distribution(
        &self,
        sql: &str,
        species_id: i64,
        region_id: i64,
        value: impl rusqlite::ToSql,
    ) -> Result<()> {
        let updated = self
            .conn
            .execute(sql, params![species_id, region_id, value])?;
        if updated == 0 {
            return Err(CatalogError::not_found(
                "distribution",
                format!("{}/{}", species_id, region_id),
            ));
        }
        Ok(())
    }

    /// Species of a region with their distribution attributes
    ///
    /// Fails with not-found when the region has no species at all; a name
    /// filter that matches nothing yields an empty list.
    pub fn species_in_region(
        &self,
        ident: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<RegionSpecies>> {
        let ids = self.region_ids_matching(ident)?;
        let region_list = placeholders(ids.len(), 1);

        let total: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM distributions WHERE region_id IN ({})",
                region_list
            ),
            params_from_iter(ids.iter()),
            |row| row.get(0),
        )?;
        if total == 0 {
            return Err(CatalogError::not_found("species for region", ident));
        }

        let pattern = like_pattern(name_filter.unwrap_or("").trim());
        let sql = format!(
            r#"SELECT s.id, s.name, d.native, d.protected, d.red_list_status
               FROM distributions d
               JOIN species s ON s.id = d.species_id
               WHERE d.region_id IN ({}) AND s.name LIKE ?{} ESCAPE '\'
               ORDER BY s.name, d.region_id"#,
            region_list,
            ids.len() + 1
        );
        let mut params: Vec<Box<dyn ToSql>> = ids
            .iter()
            .map(|id| Box::new(*id) as Box<dyn ToSql>)
            .collect();
        params.push(Box::new(pattern));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(RegionSpecies {
                id: row.get(0)?,
                name: row.get(1)?,
                native: row.get(2)?,
                protected: row.get(3)?,
                red_list_status: parse_red_list(row.get(4)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Names of species found in region `a` but not in region `b`
    ///
    /// Each side covers every region its identifier matches.
    pub fn species_diff(&self, a: &str, b: &str) -> Result<Vec<String>> {
        self.compare_regions(a, b, "NOT EXISTS")
    }

    /// Names of species found in both regions
    pub fn species_common(&self, a: &str, b: &str) -> Result<Vec<String>> {
        self.compare_regions(a, b, "EXISTS")
    }

    fn compare_regions(&self, a: &str, b: &str, exists: &str) -> Result<Vec<String>> {
        let (a, b) = (self.region_ids_matching(a)?, self.region_ids_matching(b)?);
        let sql = format!(
            r#"SELECT DISTINCT s.name FROM species s
               JOIN distributions d ON d.species_id = s.id
               WHERE d.region_id IN ({})
                 AND {} (SELECT 1 FROM distributions o
                         WHERE o.species_id = s.id AND o.region_id IN ({}))
               ORDER BY s.name COLLATE BINARY"#,
            placeholders(a.len(), 1),
            exists,
            placeholders(b.len(), a.len() + 1),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(a.iter().chain(b.iter())), |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Mark every named species as native in a region
    ///
    /// Missing species are created. Names that are not valid binomials are
    /// logged and reported back instead of failing the whole batch.
    pub fn add_or_update_distributions(
        &self,
        region_id: i64,
        names: &[String],
    ) -> Result<DistributionSync> {
        if self.region(region_id)?.is_none() {
            return Err(CatalogError::not_found("region", region_id.to_string()));
        }

        self.atomically(|cat| {
            let mut report = DistributionSync::default();
            for name in names {
                let name = name.trim();
                let species = match cat.get_or_create_species(name) {
                    Ok(species) => species,
                    Err(e @ CatalogError::InvalidName { .. }) => {
                        tracing::warn!(name, error = %e, "skipping species");
                        report.skipped.push(name.to_string());
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                match cat.upsert_distribution(species.id, region_id, Some(true))?.1 {
                    Upsert::Created => report.created += 1,
                    Upsert::Updated => report.updated += 1,
                }
            }
            Ok(report)
        })
    }
}
