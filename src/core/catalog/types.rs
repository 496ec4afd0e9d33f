//! Catalog record types
//!
//! Plain records returned by catalog queries, plus the small enums stored as
//! text columns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::error::CatalogError;
use crate::core::taxonomy::Rank;

// =========================================================================
// Taxonomy
// =========================================================================

/// A family, subfamily or tribe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankRecord {
    pub id: i64,
    pub rank: Rank,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genus {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub tribe: Option<String>,
    pub sub_family: Option<String>,
    pub family: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Species {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub genus_id: Option<i64>,
    pub genus: Option<String>,
    pub ordering: i32,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub group: Option<String>,
    pub valid: bool,
}

impl Species {
    /// Name with underscores instead of spaces, as used by antwiki.org
    pub fn name_underscore(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// Optional attribute changes for a species; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct SpeciesUpdate {
    pub author: Option<String>,
    pub year: Option<i32>,
    pub group: Option<String>,
    pub ordering: Option<i32>,
    pub colony_structure: Option<ColonyStructure>,
    pub worker_polymorphism: Option<bool>,
    pub founding: Option<Founding>,
    pub flight_climate: Option<FlightClimate>,
    pub nutrition: Option<Nutrition>,
    pub hibernation: Option<Hibernation>,
}

impl SpeciesUpdate {
    pub(crate) fn touches_biology(&self) -> bool {
        self.colony_structure.is_some()
            || self.worker_polymorphism.is_some()
            || self.founding.is_some()
            || self.flight_climate.is_some()
            || self.nutrition.is_some()
            || self.hibernation.is_some()
    }
}

/// Filter for species listings; all set criteria must match
#[derive(Debug, Clone, Default)]
pub struct SpeciesFilter {
    /// Genus name
    pub genus: Option<String>,
    /// Code of a region of type Country the species is distributed in
    pub country_code: Option<String>,
    /// Code of a subregion (whose parent is a Country) the species is distributed in
    pub region_code: Option<String>,
    /// Hide species marked invalid
    pub valid_only: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonName {
    pub name: String,
    pub language: String,
}

// =========================================================================
// Biology & keeping
// =========================================================================

/// Number of queens in a colony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColonyStructure {
    #[serde(rename = "MONO")]
    Monogynous,
    #[serde(rename = "OLIGO")]
    Oligogynous,
    #[serde(rename = "POLY")]
    Polygynous,
}

impl ColonyStructure {
    pub fn code(&self) -> &'static str {
        match self {
            ColonyStructure::Monogynous => "MONO",
            ColonyStructure::Oligogynous => "OLIGO",
            ColonyStructure::Polygynous => "POLY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColonyStructure::Monogynous => "Monogynous",
            ColonyStructure::Oligogynous => "Oligogynous",
            ColonyStructure::Polygynous => "Polygynous",
        }
    }
}

impl FromStr for ColonyStructure {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MONO" | "MONOGYNOUS" => Ok(ColonyStructure::Monogynous),
            "OLIGO" | "OLIGOGYNOUS" => Ok(ColonyStructure::Oligogynous),
            "POLY" | "POLYGYNOUS" => Ok(ColonyStructure::Polygynous),
            _ => Err(CatalogError::Invalid(format!("unknown colony structure '{}'", s))),
        }
    }
}

/// How a young queen founds her colony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Founding {
    #[serde(rename = "c")]
    Claustral,
    #[serde(rename = "sc")]
    SemiClaustral,
    #[serde(rename = "sp")]
    SocialParasitic,
    #[serde(rename = "spp")]
    SocialParasiticWithPupae,
}

impl Founding {
    pub fn code(&self) -> &'static str {
        match self {
            Founding::Claustral => "c",
            Founding::SemiClaustral => "sc",
            Founding::SocialParasitic => "sp",
            Founding::SocialParasiticWithPupae => "spp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Founding::Claustral => "claustral (queen does not need any food)",
            Founding::SemiClaustral => "semi-claustral (queen needs to be fed during founding)",
            Founding::SocialParasitic => {
                "social parasitic (queen needs workers of suitable ant species)"
            }
            Founding::SocialParasiticWithPupae => {
                "social parasitic (founding can be done with pupae of suitable ant species)"
            }
        }
    }
}

impl FromStr for Founding {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "claustral" => Ok(Founding::Claustral),
            "sc" | "semi-claustral" => Ok(Founding::SemiClaustral),
            "sp" | "social-parasitic" => Ok(Founding::SocialParasitic),
            "spp" | "social-parasitic-pupae" => Ok(Founding::SocialParasiticWithPupae),
            _ => Err(CatalogError::Invalid(format!("unknown founding type '{}'", s))),
        }
    }
}

/// Weather a species prefers for its nuptial flights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightClimate {
    #[serde(rename = "m")]
    Moderate,
    #[serde(rename = "w")]
    Warm,
    #[serde(rename = "s")]
    Sticky,
}

impl FlightClimate {
    pub fn code(&self) -> &'static str {
        match self {
            FlightClimate::Moderate => "m",
            FlightClimate::Warm => "w",
            FlightClimate::Sticky => "s",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightClimate::Moderate => "Moderate temperature",
            FlightClimate::Warm => "Warm temperature",
            FlightClimate::Sticky => "Sticky weather",
        }
    }
}

impl FromStr for FlightClimate {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m" | "moderate" => Ok(FlightClimate::Moderate),
            "w" | "warm" => Ok(FlightClimate::Warm),
            "s" | "sticky" => Ok(FlightClimate::Sticky),
            _ => Err(CatalogError::Invalid(format!("unknown flight climate '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Nutrition {
    Leaves,
    Omnivorous,
    Seeds,
    SugarInsects,
}

impl Nutrition {
    pub fn code(&self) -> &'static str {
        match self {
            Nutrition::Leaves => "LEAVES",
            Nutrition::Omnivorous => "OMNIVOROUS",
            Nutrition::Seeds => "SEEDS",
            Nutrition::SugarInsects => "SUGAR_INSECTS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Nutrition::Leaves => "Leaves, grass and other vegetables",
            Nutrition::Omnivorous => {
                "Omnivorous (sugar water, honey, insects, meat, seeds, nuts etc.)"
            }
            Nutrition::Seeds => "Mainly seeds and nuts but dead insects and sugar water, honey too",
            Nutrition::SugarInsects => "Insects, meat, sugar water, honey etc.",
        }
    }
}

impl FromStr for Nutrition {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "LEAVES" => Ok(Nutrition::Leaves),
            "OMNIVOROUS" => Ok(Nutrition::Omnivorous),
            "SEEDS" => Ok(Nutrition::Seeds),
            "SUGAR_INSECTS" => Ok(Nutrition::SugarInsects),
            _ => Err(CatalogError::Invalid(format!("unknown nutrition '{}'", s))),
        }
    }
}

/// Whether and how long a colony needs a winter rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Hibernation {
    No,
    Long,
    Short,
}

impl Hibernation {
    pub fn code(&self) -> &'static str {
        match self {
            Hibernation::No => "NO",
            Hibernation::Long => "LONG",
            Hibernation::Short => "SHORT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Hibernation::No => "No",
            Hibernation::Long => "yes: end of September until end of March",
            Hibernation::Short => "yes: end of November until end of February",
        }
    }
}

impl FromStr for Hibernation {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NO" => Ok(Hibernation::No),
            "LONG" => Ok(Hibernation::Long),
            "SHORT" => Ok(Hibernation::Short),
            _ => Err(CatalogError::Invalid(format!("unknown hibernation '{}'", s))),
        }
    }
}

/// Biology and keeping attributes of a species; unset until someone records them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpeciesBiology {
    pub colony_structure: Option<ColonyStructure>,
    pub worker_polymorphism: Option<bool>,
    pub founding: Option<Founding>,
    pub flight_climate: Option<FlightClimate>,
    pub nutrition: Option<Nutrition>,
    pub hibernation: Option<Hibernation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Caste {
    Worker,
    Queen,
    Male,
}

impl Caste {
    pub const ALL: [Caste; 3] = [Caste::Worker, Caste::Queen, Caste::Male];

    pub fn as_str(&self) -> &'static str {
        match self {
            Caste::Worker => "WORKER",
            Caste::Queen => "QUEEN",
            Caste::Male => "MALE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Caste::Worker => "Worker size",
            Caste::Queen => "Queen size",
            Caste::Male => "Male size",
        }
    }
}

impl FromStr for Caste {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WORKER" => Ok(Caste::Worker),
            "QUEEN" => Ok(Caste::Queen),
            "MALE" => Ok(Caste::Male),
            _ => Err(CatalogError::Invalid(format!("unknown caste '{}'", s))),
        }
    }
}

impl fmt::Display for Caste {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body length range of one caste, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AntSize {
    pub caste: Caste,
    pub minimum: f64,
    pub maximum: f64,
}

impl fmt::Display for AntSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minimum == self.maximum {
            write!(f, "{} mm", self.minimum)
        } else {
            write!(f, "{} - {} mm", self.minimum, self.maximum)
        }
    }
}

/// Worker size of one species, for size listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesSize {
    pub species_id: i64,
    pub species: String,
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesDescription {
    pub language: String,
    pub description: String,
}

/// Months a species is known to swarm in, as stored on the species
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NuptialFlightMonths {
    pub species_id: i64,
    pub species: String,
    /// Months (1..=12), ascending
    pub months: Vec<u32>,
}

impl NuptialFlightMonths {
    /// One flag per calendar month, January first
    pub fn flags(&self) -> [u8; 12] {
        let mut flags = [0; 12];
        for &month in &self.months {
            if let Some(flag) = (month as usize).checked_sub(1).and_then(|i| flags.get_mut(i)) {
                *flag = 1;
            }
        }
        flags
    }
}

// =========================================================================
// Regions & distribution
// =========================================================================

/// Kind of region; countries and their subregions are the two that the
/// importers and queries care about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum RegionType {
    Country,
    Subregion,
    Other(String),
}

impl RegionType {
    pub fn as_str(&self) -> &str {
        match self {
            RegionType::Country => "Country",
            RegionType::Subregion => "Subregion",
            RegionType::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for RegionType {
    fn from(s: &str) -> Self {
        match s {
            "Country" => RegionType::Country,
            "Subregion" => RegionType::Subregion,
            other => RegionType::Other(other.to_string()),
        }
    }
}

impl From<RegionType> for String {
    fn from(t: RegionType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub id: i64,
    pub code: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    pub antwiki_name: Option<String>,
    pub slug: String,
    pub region_type: RegionType,
    pub parent_id: Option<i64>,
    pub ant_list_complete: bool,
    pub antmaps_id: Option<String>,
}

impl Region {
    /// Link to the region's page on antwiki.org
    pub fn antwiki_url(&self) -> String {
        let name = self.antwiki_name.as_deref().unwrap_or(&self.name);
        format!("http://www.antwiki.org/wiki/{}", name.replace(' ', "_"))
    }
}

#[derive(Debug, Clone)]
pub struct NewRegion {
    pub name: String,
    pub code: Option<String>,
    pub region_type: RegionType,
    pub parent_id: Option<i64>,
    pub official_name: Option<String>,
    pub antwiki_name: Option<String>,
}

impl NewRegion {
    pub fn new(name: impl Into<String>, region_type: RegionType) -> Self {
        Self {
            name: name.into(),
            code: None,
            region_type,
            parent_id: None,
            official_name: None,
            antwiki_name: None,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// IUCN red list categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedListStatus {
    NotOnRedList,
    LeastConcern,
    NearThreatened,
    Vulnerable,
    Endangered,
    CriticallyEndangered,
    ExtinctInWild,
    Extinct,
}

impl RedListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedListStatus::NotOnRedList => "NOT_ON_RED_LIST",
            RedListStatus::LeastConcern => "LEAST_CONCERN",
            RedListStatus::NearThreatened => "NEAR_THREATENED",
            RedListStatus::Vulnerable => "VULNERABLE",
            RedListStatus::Endangered => "ENDANGERED",
            RedListStatus::CriticallyEndangered => "CRITICALLY_ENDANGERED",
            RedListStatus::ExtinctInWild => "EXTINCT_IN_WILD",
            RedListStatus::Extinct => "EXTINCT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RedListStatus::NotOnRedList => "Not on red list",
            RedListStatus::LeastConcern => "Least Concern",
            RedListStatus::NearThreatened => "Near Threatened",
            RedListStatus::Vulnerable => "Vulnerable",
            RedListStatus::Endangered => "Endangered",
            RedListStatus::CriticallyEndangered => "Critically Endangered",
            RedListStatus::ExtinctInWild => "Extinct in the Wild",
            RedListStatus::Extinct => "Extinct",
        }
    }
}

impl FromStr for RedListStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "NOT_ON_RED_LIST" => Ok(RedListStatus::NotOnRedList),
            "LEAST_CONCERN" => Ok(RedListStatus::LeastConcern),
            "NEAR_THREATENED" => Ok(RedListStatus::NearThreatened),
            "VULNERABLE" => Ok(RedListStatus::Vulnerable),
            "ENDANGERED" => Ok(RedListStatus::Endangered),
            "CRITICALLY_ENDANGERED" => Ok(RedListStatus::CriticallyEndangered),
            "EXTINCT_IN_WILD" => Ok(RedListStatus::ExtinctInWild),
            "EXTINCT" => Ok(RedListStatus::Extinct),
            _ => Err(CatalogError::Invalid(format!("unknown red list status '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub id: i64,
    pub species_id: i64,
    pub region_id: i64,
    pub native: Option<bool>,
    pub protected: Option<bool>,
    pub red_list_status: Option<RedListStatus>,
}

/// A species occurring in a region, with the distribution attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSpecies {
    pub id: i64,
    pub name: String,
    pub native: Option<bool>,
    pub protected: Option<bool>,
    pub red_list_status: Option<RedListStatus>,
}

/// Outcome of a find-or-create style write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Result of marking a list of species as present in a region
#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionSync {
    pub created: u64,
    pub updated: u64,
    /// Names that are not valid binomials and were left out
    pub skipped: Vec<String>,
}

// =========================================================================
// Flights
// =========================================================================

/// What was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpottingType {
    #[serde(rename = "F")]
    Flight,
    #[serde(rename = "FP")]
    FlightPreparation,
    #[serde(rename = "Q")]
    QueenWingless,
    #[serde(rename = "QW")]
    QueenWinged,
    #[serde(rename = "M")]
    Male,
}

impl SpottingType {
    pub fn code(&self) -> &'static str {
        match self {
            SpottingType::Flight => "F",
            SpottingType::FlightPreparation => "FP",
            SpottingType::QueenWingless => "Q",
            SpottingType::QueenWinged => "QW",
            SpottingType::Male => "M",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpottingType::Flight => "Nuptial Flight",
            SpottingType::FlightPreparation => "Flight preparation",
            SpottingType::QueenWingless => "Wingless (dealated) queen",
            SpottingType::QueenWinged => "Winged (alate) queen",
            SpottingType::Male => "Male",
        }
    }
}

impl FromStr for SpottingType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "F" => Ok(SpottingType::Flight),
            "FP" => Ok(SpottingType::FlightPreparation),
            "Q" => Ok(SpottingType::QueenWingless),
            "QW" => Ok(SpottingType::QueenWinged),
            "M" => Ok(SpottingType::Male),
            _ => Err(CatalogError::Invalid(format!("unknown spotting type '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rain {
    No,
    During,
    Before,
    After,
}

impl Rain {
    pub fn code(&self) -> &'static str {
        match self {
            Rain::No => "NO",
            Rain::During => "DURING",
            Rain::Before => "BEFORE",
            Rain::After => "AFTER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rain::No => "No recent rain",
            Rain::During => "Rain during spotting",
            Rain::Before => "Rain before spotting",
            Rain::After => "Rain after spotting",
        }
    }
}

impl FromStr for Rain {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NO" => Ok(Rain::No),
            "DURING" => Ok(Rain::During),
            "BEFORE" => Ok(Rain::Before),
            "AFTER" => Ok(Rain::After),
            _ => Err(CatalogError::Invalid(format!("unknown rain value '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkyCondition {
    Clear,
    MClear,
    PCloudy,
    MCloudy,
    Cloudy,
    Fair,
}

impl SkyCondition {
    pub fn code(&self) -> &'static str {
        match self {
            SkyCondition::Clear => "CLEAR",
            SkyCondition::MClear => "MCLEAR",
            SkyCondition::PCloudy => "PCLOUDY",
            SkyCondition::MCloudy => "MCLOUDY",
            SkyCondition::Cloudy => "CLOUDY",
            SkyCondition::Fair => "FAIR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkyCondition::Clear => "Clear / Sunny",
            SkyCondition::MClear => "Mostly Clear / Mostly Sunny",
            SkyCondition::PCloudy => "Partly Cloudy / Partly Sunny",
            SkyCondition::MCloudy => "Mostly Cloudy / Considerable Cloudiness",
            SkyCondition::Cloudy => "Cloudy",
            SkyCondition::Fair => "Fair",
        }
    }
}

impl FromStr for SkyCondition {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CLEAR" => Ok(SkyCondition::Clear),
            "MCLEAR" => Ok(SkyCondition::MClear),
            "PCLOUDY" => Ok(SkyCondition::PCloudy),
            "MCLOUDY" => Ok(SkyCondition::MCloudy),
            "CLOUDY" => Ok(SkyCondition::Cloudy),
            "FAIR" => Ok(SkyCondition::Fair),
            _ => Err(CatalogError::Invalid(format!("unknown sky condition '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn code(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub fn celsius(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Celsius => self.value,
            TemperatureUnit::Fahrenheit => (self.value - 32.0) / 1.8,
        }
    }

    pub fn fahrenheit(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Fahrenheit => self.value,
            TemperatureUnit::Celsius => self.value * 1.8 + 32.0,
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            TemperatureUnit::Celsius => {
                write!(f, "{:.1} °C ({:.1} °F)", self.celsius(), self.fahrenheit())
            }
            TemperatureUnit::Fahrenheit => {
                write!(f, "{:.1} °F ({:.1} °C)", self.fahrenheit(), self.celsius())
            }
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "C" => Ok(TemperatureUnit::Celsius),
            "F" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(CatalogError::Invalid(format!("unknown temperature unit '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VelocityUnit {
    Kmh,
    Mph,
}

impl VelocityUnit {
    pub fn code(&self) -> &'static str {
        match self {
            VelocityUnit::Kmh => "KMH",
            VelocityUnit::Mph => "MPH",
        }
    }
}

impl FromStr for VelocityUnit {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KMH" => Ok(VelocityUnit::Kmh),
            "MPH" => Ok(VelocityUnit::Mph),
            _ => Err(CatalogError::Invalid(format!("unknown velocity unit '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Velocity {
    pub value: f64,
    pub unit: VelocityUnit,
}

impl Velocity {
    pub const MPH_TO_KMH: f64 = 1.609344;

    pub fn kmh(&self) -> f64 {
        match self.unit {
            VelocityUnit::Kmh => self.value,
            VelocityUnit::Mph => self.value * Self::MPH_TO_KMH,
        }
    }

    pub fn mph(&self) -> f64 {
        match self.unit {
            VelocityUnit::Mph => self.value,
            VelocityUnit::Kmh => self.value / Self::MPH_TO_KMH,
        }
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            VelocityUnit::Kmh => write!(f, "{:.1} km/h ({:.1} mph)", self.kmh(), self.mph()),
            VelocityUnit::Mph => write!(f, "{:.1} mph ({:.1} km/h)", self.mph(), self.kmh()),
        }
    }
}

/// A flight report as submitted, before it is stored
#[derive(Debug, Clone)]
pub struct NewFlight {
    pub species_id: i64,
    pub species_note: Option<String>,
    pub spotting_type: SpottingType,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: i64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub temperature: Option<Temperature>,
    pub humidity: Option<i32>,
    pub wind_speed: Option<Velocity>,
    pub rain: Option<Rain>,
    pub sky_condition: Option<SkyCondition>,
    pub comment: Option<String>,
    pub link: Option<String>,
}

impl NewFlight {
    /// Minimal report with only the required fields filled in
    pub fn new(
        species_id: i64,
        country_id: i64,
        spotting_type: SpottingType,
        date: NaiveDate,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            species_id,
            species_note: None,
            spotting_type,
            date,
            start_time: None,
            end_time: None,
            address: address.into(),
            latitude,
            longitude,
            country_id,
            state: None,
            city: None,
            temperature: None,
            humidity: None,
            wind_speed: None,
            rain: None,
            sky_condition: None,
            comment: None,
            link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flight {
    pub id: i64,
    pub species_id: i64,
    pub species: String,
    pub species_note: Option<String>,
    pub spotting_type: SpottingType,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: i64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub temperature: Option<Temperature>,
    pub humidity: Option<i32>,
    pub wind_speed: Option<Velocity>,
    pub rain: Option<Rain>,
    pub sky_condition: Option<SkyCondition>,
    pub comment: Option<String>,
    pub link: Option<String>,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flight {
    /// "HH:MM" or "HH:MM - HH:MM"
    pub fn time_str(&self) -> Option<String> {
        let start = self.start_time?;
        match self.end_time {
            Some(end) if end != start => Some(format!(
                "{} - {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )),
            _ => Some(start.format("%H:%M").to_string()),
        }
    }
}

/// Filter for flight listings
#[derive(Debug, Clone, Default)]
pub struct FlightFilter {
    pub species_id: Option<i64>,
    pub country_id: Option<i64>,
    pub unreviewed_only: bool,
    pub limit: Option<usize>,
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Flight counts per calendar month, always January through December
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyFrequency([u64; 12]);

impl MonthlyFrequency {
    pub fn new(counts: [u64; 12]) -> Self {
        Self(counts)
    }

    /// Count for a month numbered 1..=12
    pub fn get(&self, month: u32) -> Option<u64> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        self.0.get(idx).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        MONTH_NAMES.iter().copied().zip(self.0.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn counts(&self) -> &[u64; 12] {
        &self.0
    }
}

impl Serialize for MonthlyFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(12))?;
        for (month, count) in self.iter() {
            map.serialize_entry(month, &count)?;
        }
        map.end()
    }
}

/// Months in which a species was seen flying often enough
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightMonths {
    pub species: String,
    pub counts: MonthlyFrequency,
    /// Months (1..=12) whose count reaches the threshold, ascending
    pub months: Vec<u32>,
}

// =========================================================================
// Statistics & ledger
// =========================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStats {
    pub schema_version: i32,
    pub families: i64,
    pub sub_families: i64,
    pub tribes: i64,
    pub genera: i64,
    pub species: i64,
    pub invalid_species: i64,
    pub regions: i64,
    pub distributions: i64,
    pub flights: i64,
    pub unreviewed_flights: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRun {
    pub id: i64,
    pub importer: String,
    pub file_name: String,
    pub sha256: String,
    pub rows: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub imported_at: DateTime<Utc>,
}
