//! Taxonomic naming rules
//!
//! Species are identified by their binomial name ("Genus species"). The genus
//! of a species is never stored separately by the caller: it is derived from
//! the first token of the name. Ranks above species (genus, tribe, subfamily,
//! family) are a single capitalized word.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::CatalogError;

static RANK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+$").expect("valid rank regex"));

static SPECIES_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+ [a-z.]+$").expect("valid species regex"));

static SLUG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug regex"));

static SLUG_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid slug regex"));

/// Epithet used for placeholder species of a genus ("Lasius sp.")
pub const GENERIC_EPITHET: &str = "sp.";

/// Taxonomic ranks stored in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Family,
    SubFamily,
    Tribe,
    Genus,
    Species,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Family => "family",
            Rank::SubFamily => "subfamily",
            Rank::Tribe => "tribe",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }

    /// Table holding records of this rank
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Rank::Family => "families",
            Rank::SubFamily => "sub_families",
            Rank::Tribe => "tribes",
            Rank::Genus => "genera",
            Rank::Species => "species",
        }
    }

    /// Check a name against the naming convention of this rank
    pub fn validate(&self, name: &str) -> Result<(), CatalogError> {
        let re = match self {
            Rank::Species => &*SPECIES_NAME,
            _ => &*RANK_NAME,
        };
        if re.is_match(name) {
            Ok(())
        } else {
            Err(CatalogError::InvalidName {
                rank: *self,
                name: name.to_string(),
            })
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed "Genus species" name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binomial {
    genus: String,
    epithet: String,
}

impl Binomial {
    /// Parse a binomial, reporting why the name was rejected
    pub fn parse(name: &str) -> Result<Self, CatalogError> {
        Rank::Species.validate(name)?;
        // The regex guarantees exactly one space
        let (genus, epithet) = name.split_once(' ').ok_or_else(|| CatalogError::InvalidName {
            rank: Rank::Species,
            name: name.to_string(),
        })?;
        Ok(Self {
            genus: genus.to_string(),
            epithet: epithet.to_string(),
        })
    }

    /// Placeholder species for a genus whose species is unknown
    pub fn generic(genus: &str) -> Result<Self, CatalogError> {
        Rank::Genus.validate(genus)?;
        Ok(Self {
            genus: genus.to_string(),
            epithet: GENERIC_EPITHET.to_string(),
        })
    }

    pub fn genus(&self) -> &str {
        &self.genus
    }

    pub fn epithet(&self) -> &str {
        &self.epithet
    }

    pub fn is_generic(&self) -> bool {
        self.epithet == GENERIC_EPITHET
    }
}

impl FromStr for Binomial {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Binomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.genus, self.epithet)
    }
}

/// Number of whitespace separated tokens in a taxon name
pub fn token_count(name: &str) -> usize {
    name.split_whitespace().count()
}

/// Convert a name into a URL slug ("Lasius niger" -> "lasius-niger")
///
/// Non-ASCII characters are dropped, everything except word characters,
/// whitespace and dashes is removed, and runs of whitespace/dashes collapse
/// into a single dash.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.chars().filter(|c| c.is_ascii()).collect();
    let stripped = SLUG_STRIP.replace_all(&ascii, "");
    let lowered = stripped.trim().to_lowercase();
    SLUG_DASH
        .replace_all(&lowered, "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}
