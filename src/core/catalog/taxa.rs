//! Taxonomy: ranks, genera and species

use rusqlite::{params, OptionalExtension, Row};

use super::{Catalog, CommonName, Genus, RankRecord, Species, SpeciesFilter, SpeciesUpdate};
use crate::core::error::{is_unique_violation, CatalogError, Result};
use crate::core::taxonomy::{slugify, Binomial, Rank};

const SPECIES_SELECT: &str = r#"SELECT s.id, s.name, s.slug, s.genus_id, g.name, s.ordering,
              s.author, s.year, s.species_group, s.valid
       FROM species s
       LEFT JOIN genera g ON g.id = s.genus_id"#;

const GENUS_SELECT: &str = r#"SELECT g.id, g.name, g.slug, t.name, sf.name, f.name
       FROM genera g
       LEFT JOIN tribes t ON t.id = g.tribe_id
       LEFT JOIN sub_families sf ON sf.id = COALESCE(g.sub_family_id, t.sub_family_id)
       LEFT JOIN families f ON f.id = sf.family_id"#;

/// `%text%` for a LIKE ... ESCAPE '\' clause, with wildcards in `text` taken literally
pub(super) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Lower-cased language code of at most two letters
pub(super) fn language_code(language: &str) -> Result<String> {
    if language.is_empty() || language.len() > 2 {
        return Err(CatalogError::Invalid(format!(
            "language must be a two letter code, got '{}'",
            language
        )));
    }
    Ok(language.to_lowercase())
}

fn species_from_row(row: &Row<'_>) -> rusqlite::Result<Species> {
    Ok(Species {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        genus_id: row.get(3)?,
        genus: row.get(4)?,
        ordering: row.get(5)?,
        author: row.get(6)?,
        year: row.get(7)?,
        group: row.get(8)?,
        valid: row.get(9)?,
    })
}

fn genus_from_row(row: &Row<'_>) -> rusqlite::Result<Genus> {
    Ok(Genus {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        tribe: row.get(3)?,
        sub_family: row.get(4)?,
        family: row.get(5)?,
    })
}

impl Catalog {
    // =====================================================================
    // Ranks above species
    // =====================================================================

    pub fn rank_exists(&self, rank: Rank, name: &str) -> Result<bool> {
        Ok(self.rank_by_name(rank, name)?.is_some())
    }

    pub fn rank_by_name(&self, rank: Rank, name: &str) -> Result<Option<RankRecord>> {
        let sql = format!("SELECT id, name, slug FROM {} WHERE name = ?1", rank.table());
        let record = self
            .conn
            .query_row(&sql, params![name], |row| {
                Ok(RankRecord {
                    id: row.get(0)?,
                    rank,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                })
            })
            .optional()?;
        Ok(record)
    }

    /// Look up a family, subfamily, tribe or genus by name, creating it if needed
    pub fn get_or_create_rank(&self, rank: Rank, name: &str) -> Result<RankRecord> {
        if rank == Rank::Species {
            return Err(CatalogError::Invalid(
                "species are created through get_or_create_species".into(),
            ));
        }
        rank.validate(name)?;

        if let Some(existing) = self.rank_by_name(rank, name)? {
            return Ok(existing);
        }

        let slug = slugify(name);
        let sql = format!("INSERT INTO {} (name, slug) VALUES (?1, ?2)", rank.table());
        let (record, created) = self.insert_or_reread(
            |conn| {
                conn.execute(&sql, params![name, slug])?;
                Ok(RankRecord {
                    id: conn.last_insert_rowid(),
                    rank,
                    name: name.to_string(),
                    slug: slug.clone(),
                })
            },
            |cat| cat.rank_by_name(rank, name),
            rank.as_str(),
            name,
        )?;
        if created {
            tracing::debug!(rank = %rank, name, "created rank");
        }
        Ok(record)
    }

    pub fn set_sub_family_family(&self, sub_family_id: i64, family_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE sub_families SET family_id = ?2 WHERE id = ?1",
            params![sub_family_id, family_id],
        )?;
        Ok(())
    }

    pub fn set_tribe_sub_family(&self, tribe_id: i64, sub_family_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE tribes SET sub_family_id = ?2 WHERE id = ?1",
            params![tribe_id, sub_family_id],
        )?;
        Ok(())
    }

    pub fn set_genus_tribe(&self, genus_id: i64, tribe_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE genera SET tribe_id = ?2 WHERE id = ?1",
            params![genus_id, tribe_id],
        )?;
        Ok(())
    }

    pub fn set_genus_sub_family(&self, genus_id: i64, sub_family_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE genera SET sub_family_id = ?2 WHERE id = ?1",
            params![genus_id, sub_family_id],
        )?;
        Ok(())
    }

    // =====================================================================
    // Genera
    // =====================================================================

    pub fn genus(&self, id: i64) -> Result<Option<Genus>> {
        let sql = format!("{} WHERE g.id = ?1", GENUS_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![id], genus_from_row)
            .optional()?)
    }

    pub fn genus_by_name(&self, name: &str) -> Result<Option<Genus>> {
        let sql = format!("{} WHERE g.name = ?1", GENUS_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![name], genus_from_row)
            .optional()?)
    }

    pub fn list_genera(&self) -> Result<Vec<Genus>> {
        let sql = format!("{} ORDER BY g.name", GENUS_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], genus_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Genera with at least one species distributed in the given country
    pub fn genera_by_country_code(&self, code: &str) -> Result<Vec<Genus>> {
        let sql = format!(
            r#"{} WHERE g.id IN (
                   SELECT s.genus_id FROM species s
                   JOIN distributions d ON d.species_id = s.id
                   JOIN regions r ON r.id = d.region_id
                   WHERE r.region_type = 'Country' AND r.code = ?1)
               ORDER BY g.name"#,
            GENUS_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![code], genus_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // =====================================================================
    // Species
    // =====================================================================

    pub fn species(&self, id: i64) -> Result<Option<Species>> {
        let sql = format!("{} WHERE s.id = ?1", SPECIES_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![id], species_from_row)
            .optional()?)
    }

    pub fn species_by_name(&self, name: &str) -> Result<Option<Species>> {
        let sql = format!("{} WHERE s.name = ?1", SPECIES_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![name], species_from_row)
            .optional()?)
    }

    /// Resolve a species from a numeric id, an exact name or a slug
    pub fn resolve_species(&self, ident: &str) -> Result<Species> {
        if let Ok(id) = ident.parse::<i64>() {
            if let Some(species) = self.species(id)? {
                return Ok(species);
            }
        }
        if let Some(species) = self.species_by_name(ident)? {
            return Ok(species);
        }

        let sql = format!("{} WHERE s.slug = lower(?1)", SPECIES_SELECT);
        self.conn
            .query_row(&sql, params![ident], species_from_row)
            .optional()?
            .ok_or_else(|| CatalogError::not_found("species", ident))
    }

    /// Return the species with this binomial name, creating it (and its
    /// genus) when it does not exist yet
    pub fn get_or_create_species(&self, name: &str) -> Result<Species> {
        let binomial = Binomial::parse(name)?;
        if let Some(existing) = self.species_by_name(name)? {
            return Ok(existing);
        }

        self.atomically(|cat| {
            let (species, _) = cat.insert_species(&binomial)?;
            Ok(species)
        })
    }

    /// Create a new species, failing if the name is already taken
    pub fn add_species(&self, name: &str) -> Result<Species> {
        let binomial = Binomial::parse(name)?;
        if self.species_by_name(name)?.is_some() {
            return Err(CatalogError::already_exists("species", name));
        }

        self.atomically(|cat| match cat.insert_species(&binomial)? {
            (species, true) => Ok(species),
            (_, false) => Err(CatalogError::already_exists("species", name)),
        })
    }

    /// Insert a species under its genus; `false` when a concurrent writer won
    fn insert_species(&self, binomial: &Binomial) -> Result<(Species, bool)> {
        let genus = self.get_or_create_rank(Rank::Genus, binomial.genus())?;
        let name = binomial.to_string();
        let slug = slugify(&name);

        let (id, created) = self.insert_or_reread(
            |conn| {
                conn.execute(
                    "INSERT INTO species (name, slug, genus_id) VALUES (?1, ?2, ?3)",
                    params![name, slug, genus.id],
                )?;
                Ok(conn.last_insert_rowid())
            },
            |cat| Ok(cat.species_by_name(&name)?.map(|s| s.id)),
            "species",
            &name,
        )?;
        if created {
            tracing::debug!(species = %name, genus = %genus.name, "created species");
        }

        let species = self
            .species(id)?
            .ok_or_else(|| CatalogError::not_found("species", name.as_str()))?;
        Ok((species, created))
    }

    /// Species by id, or the "<Genus> sp." placeholder of a genus
    pub fn get_or_create_with_genus_or_species_id(
        &self,
        genus_id: Option<i64>,
        species_id: Option<i64>,
    ) -> Result<Species> {
        if let Some(id) = species_id {
            return self
                .species(id)?
                .ok_or_else(|| CatalogError::not_found("species", id.to_string()));
        }

        let genus_id = genus_id
            .ok_or_else(|| CatalogError::Invalid("either a genus or a species is required".into()))?;
        let genus = self
            .genus(genus_id)?
            .ok_or_else(|| CatalogError::not_found("genus", genus_id.to_string()))?;
        let generic = Binomial::generic(&genus.name)?;
        self.get_or_create_species(&generic.to_string())
    }

    /// Give a species a new binomial name, moving it to the new genus
    pub fn rename_species(&self, species_id: i64, new_name: &str) -> Result<Species> {
        let binomial = Binomial::parse(new_name)?;

        self.atomically(|cat| {
            let genus = cat.get_or_create_rank(Rank::Genus, binomial.genus())?;
            let updated = cat
                .conn
                .execute(
                    "UPDATE species SET name = ?2, slug = ?3, genus_id = ?4 WHERE id = ?1",
                    params![species_id, new_name, slugify(new_name), genus.id],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        CatalogError::already_exists("species", new_name)
                    } else {
                        e.into()
                    }
                })?;
            if updated == 0 {
                return Err(CatalogError::not_found("species", species_id.to_string()));
            }
            tracing::debug!(species_id, name = new_name, "renamed species");
            cat.species(species_id)?
                .ok_or_else(|| CatalogError::not_found("species", species_id.to_string()))
        })
    }

    pub fn set_species_valid(&self, species_id: i64, valid: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE species SET valid = ?2 WHERE id = ?1",
            params![species_id, valid],
        )?;
        if updated == 0 {
            return Err(CatalogError::not_found("species", species_id.to_string()));
        }
        Ok(())
    }

    pub fn set_species_genus(&self, species_id: i64, genus_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE species SET genus_id = ?2 WHERE id = ?1",
            params![species_id, genus_id],
        )?;
        Ok(())
    }

    /// Apply the set fields of `update`; biology fields go to the species' biology row
    pub fn update_species(&self, species_id: i64, update: &SpeciesUpdate) -> Result<Species> {
        self.atomically(|cat| cat.update_species_row(species_id, update))
    }

    fn update_species_row(&self, species_id: i64, update: &SpeciesUpdate) -> Result<Species> {
        let updated = self.conn.execute(
            r#"UPDATE species SET
                 author = COALESCE(?2, author),
                 year = COALESCE(?3, year),
                 species_group = COALESCE(?4, species_group),
                 ordering = COALESCE(?5, ordering)
               WHERE id = ?1"#,
            params![
                species_id,
                update.author,
                update.year,
                update.group,
                update.ordering
            ],
        )?;
        if updated == 0 {
            return Err(CatalogError::not_found("species", species_id.to_string()));
        }
        if update.touches_biology() {
            self.update_biology(species_id, update)?;
        }
        self.species(species_id)?
            .ok_or_else(|| CatalogError::not_found("species", species_id.to_string()))
    }

    /// Record an obsolete name for a species; returns false if already known
    pub fn add_invalid_name(&self, species_id: i64, name: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO invalid_names (name, species_id) VALUES (?1, ?2)",
            params![name, species_id],
        )?;
        Ok(inserted > 0)
    }

    pub fn invalid_names(&self, species_id: i64) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM invalid_names WHERE species_id = ?1 ORDER BY name")?;
        let rows = stmt.query_map(params![species_id], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn add_common_name(&self, species_id: i64, name: &str, language: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CatalogError::Invalid("common name must not be empty".into()));
        }
        let language = language_code(language)?;
        self.conn.execute(
            "INSERT INTO common_names (name, language, species_id) VALUES (?1, ?2, ?3)",
            params![name.trim(), language, species_id],
        )?;
        Ok(())
    }

    pub fn common_names(&self, species_id: i64) -> Result<Vec<CommonName>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, language FROM common_names WHERE species_id = ?1 ORDER BY language, name",
        )?;
        let rows = stmt.query_map(params![species_id], |row| {
            Ok(CommonName {
                name: row.get(0)?,
                language: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Case-insensitive substring search over names, common names and
    /// invalid names; "Genus sp." placeholders are left out
    pub fn search_species(&self, text: &str) -> Result<Vec<Species>> {
        let sql = format!(
            r#"{} WHERE s.name NOT LIKE '% sp.'
                 AND (s.name LIKE ?1 ESCAPE '\'
                      OR EXISTS (SELECT 1 FROM common_names c
                                 WHERE c.species_id = s.id AND c.name LIKE ?1 ESCAPE '\')
                      OR EXISTS (SELECT 1 FROM invalid_names i
                                 WHERE i.species_id = s.id AND i.name LIKE ?1 ESCAPE '\'))
               ORDER BY s.name"#,
            SPECIES_SELECT
        );
        let pattern = like_pattern(text.trim());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern], species_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Species matching a filter, ordered by genus, display ordering and name
    pub fn list_species(&self, filter: &SpeciesFilter) -> Result<Vec<Species>> {
        let mut sql = format!("{} WHERE 1=1", SPECIES_SELECT);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref genus) = filter.genus {
            sql.push_str(" AND g.name = ?");
            params_vec.push(Box::new(genus.clone()));
        }

        if let Some(ref code) = filter.country_code {
            sql.push_str(
                r#" AND EXISTS (SELECT 1 FROM distributions d
                              JOIN regions r ON r.id = d.region_id
                              WHERE d.species_id = s.id
                                AND r.region_type = 'Country' AND r.code = ?)"#,
            );
            params_vec.push(Box::new(code.clone()));
        }

        if let Some(ref code) = filter.region_code {
            sql.push_str(
                r#" AND EXISTS (SELECT 1 FROM distributions d
                              JOIN regions r ON r.id = d.region_id
                              JOIN regions p ON p.id = r.parent_id
                              WHERE d.species_id = s.id
                                AND p.region_type = 'Country' AND r.code = ?)"#,
            );
            params_vec.push(Box::new(code.clone()));
        }

        if filter.valid_only {
            sql.push_str(" AND s.valid = 1");
        }

        sql.push_str(" ORDER BY g.name, s.ordering, s.name");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), species_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn species_by_genus(&self, genus: &str) -> Result<Vec<Species>> {
        self.list_species(&SpeciesFilter {
            genus: Some(genus.to_string()),
            ..Default::default()
        })
    }

    pub fn species_by_country_code(&self, code: &str) -> Result<Vec<Species>> {
        self.list_species(&SpeciesFilter {
            country_code: Some(code.to_string()),
            ..Default::default()
        })
    }

    pub fn species_by_country_code_and_genus(&self, code: &str, genus: &str) -> Result<Vec<Species>> {
        self.list_species(&SpeciesFilter {
            genus: Some(genus.to_string()),
            country_code: Some(code.to_string()),
            ..Default::default()
        })
    }

    pub fn species_by_region_code(&self, code: &str) -> Result<Vec<Species>> {
        self.list_species(&SpeciesFilter {
            region_code: Some(code.to_string()),
            ..Default::default()
        })
    }
}
