//! CLI command implementations

pub mod completions;
pub mod db;
pub mod flight;
pub mod genus;
pub mod import;
pub mod region;
pub mod species;
