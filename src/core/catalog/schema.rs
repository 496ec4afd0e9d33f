//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{Catalog, SCHEMA_VERSION};
use crate::core::error::{CatalogError, Result};

impl Catalog {
    /// Create all tables that do not exist yet and record the schema version
    pub(super) fn init_schema(&self) -> Result<()> {
        if let Some(version) = self.schema_version()? {
            if version > SCHEMA_VERSION {
                return Err(CatalogError::Invalid(format!(
                    "database schema version {} is newer than supported version {}",
                    version, SCHEMA_VERSION
                )));
            }
        }

        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Taxonomic ranks above species
            CREATE TABLE IF NOT EXISTS families (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sub_families (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL,
                family_id INTEGER REFERENCES families(id) ON DELETE SET NULL
            );

            CREATE TABLE IF NOT EXISTS tribes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL,
                sub_family_id INTEGER REFERENCES sub_families(id) ON DELETE SET NULL
            );

            CREATE TABLE IF NOT EXISTS genera (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL,
                tribe_id INTEGER REFERENCES tribes(id) ON DELETE SET NULL,
                sub_family_id INTEGER REFERENCES sub_families(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_genera_slug ON genera(slug);

            -- Species
            CREATE TABLE IF NOT EXISTS species (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL,
                genus_id INTEGER REFERENCES genera(id) ON DELETE SET NULL,
                ordering INTEGER NOT NULL DEFAULT 1,
                author TEXT,
                year INTEGER,
                species_group TEXT,
                valid INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_species_slug ON species(slug);
            CREATE INDEX IF NOT EXISTS idx_species_genus ON species(genus_id);
            CREATE INDEX IF NOT EXISTS idx_species_ordering ON species(ordering);

            CREATE TABLE IF NOT EXISTS invalid_names (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                UNIQUE (species_id, name)
            );

            CREATE TABLE IF NOT EXISTS common_names (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                language TEXT NOT NULL,
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_common_names_species ON common_names(species_id);

            -- Biology and keeping attributes (one row per species, added in v2)
            CREATE TABLE IF NOT EXISTS species_biology (
                species_id INTEGER PRIMARY KEY REFERENCES species(id) ON DELETE CASCADE,
                colony_structure TEXT,
                worker_polymorphism INTEGER,
                founding TEXT,
                flight_climate TEXT,
                nutrition TEXT,
                hibernation TEXT
            );

            CREATE TABLE IF NOT EXISTS ant_sizes (
                id INTEGER PRIMARY KEY,
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                caste TEXT NOT NULL,
                minimum REAL NOT NULL,
                maximum REAL NOT NULL,
                UNIQUE (species_id, caste)
            );
            CREATE INDEX IF NOT EXISTS idx_ant_sizes_caste ON ant_sizes(caste);

            CREATE TABLE IF NOT EXISTS species_descriptions (
                id INTEGER PRIMARY KEY,
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                language TEXT NOT NULL,
                description TEXT NOT NULL,
                UNIQUE (species_id, language)
            );

            CREATE TABLE IF NOT EXISTS species_flight_months (
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                PRIMARY KEY (species_id, month)
            );

            -- Regions (country -> subregion tree)
            CREATE TABLE IF NOT EXISTS regions (
                id INTEGER PRIMARY KEY,
                code TEXT,
                name TEXT NOT NULL,
                official_name TEXT,
                antwiki_name TEXT,
                slug TEXT NOT NULL,
                region_type TEXT NOT NULL,
                parent_id INTEGER REFERENCES regions(id) ON DELETE SET NULL,
                ant_list_complete INTEGER NOT NULL DEFAULT 0,
                antmaps_id TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_regions_code ON regions(code);
            CREATE INDEX IF NOT EXISTS idx_regions_slug ON regions(slug);
            CREATE INDEX IF NOT EXISTS idx_regions_type ON regions(region_type);
            CREATE INDEX IF NOT EXISTS idx_regions_parent ON regions(parent_id);

            -- Species <-> region
            CREATE TABLE IF NOT EXISTS distributions (
                id INTEGER PRIMARY KEY,
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                region_id INTEGER NOT NULL REFERENCES regions(id) ON DELETE CASCADE,
                native INTEGER,
                protected INTEGER,
                red_list_status TEXT,
                UNIQUE (species_id, region_id)
            );
            CREATE INDEX IF NOT EXISTS idx_distributions_region ON distributions(region_id);

            -- Nuptial flight sightings
            CREATE TABLE IF NOT EXISTS flights (
                id INTEGER PRIMARY KEY,
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                species_note TEXT,
                spotting_type TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT,
                end_time TEXT,
                address TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                country_id INTEGER NOT NULL REFERENCES regions(id) ON DELETE CASCADE,
                state TEXT,
                city TEXT,
                temperature_value REAL,
                temperature_unit TEXT,
                humidity INTEGER,
                wind_speed_value REAL,
                wind_speed_unit TEXT,
                rain TEXT,
                sky_condition TEXT,
                comment TEXT,
                link TEXT,
                reviewed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_flights_species ON flights(species_id);
            CREATE INDEX IF NOT EXISTS idx_flights_country ON flights(country_id);
            CREATE INDEX IF NOT EXISTS idx_flights_date ON flights(date);

            -- Ledger of successful file imports
            CREATE TABLE IF NOT EXISTS import_runs (
                id INTEGER PRIMARY KEY,
                importer TEXT NOT NULL,
                file_name TEXT NOT NULL,
                sha256 TEXT NOT NULL,
                rows INTEGER NOT NULL,
                created INTEGER NOT NULL,
                updated INTEGER NOT NULL,
                skipped INTEGER NOT NULL,
                imported_at TEXT NOT NULL
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Schema version stored in the database, if it has been initialized
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let has_table: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        if has_table == 0 {
            return Ok(None);
        }

        let version = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get::<_, Option<i32>>(0)
            })
            .optional()?
            .flatten();
        Ok(version)
    }

    /// Drop every table
    ///
    /// The caller is expected to run `init_schema` afterwards.
    pub(super) fn drop_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS import_runs;
            DROP TABLE IF EXISTS flights;
            DROP TABLE IF EXISTS distributions;
            DROP TABLE IF EXISTS regions;
            DROP TABLE IF EXISTS species_flight_months;
            DROP TABLE IF EXISTS species_descriptions;
            DROP TABLE IF EXISTS ant_sizes;
            DROP TABLE IF EXISTS species_biology;
            DROP TABLE IF EXISTS common_names;
            DROP TABLE IF EXISTS invalid_names;
            DROP TABLE IF EXISTS species;
            DROP TABLE IF EXISTS genera;
            DROP TABLE IF EXISTS tribes;
            DROP TABLE IF EXISTS sub_families;
            DROP TABLE IF EXISTS families;
            DROP TABLE IF EXISTS schema_version;
            "#,
        )?;
        Ok(())
    }
}
