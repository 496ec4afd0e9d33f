//! antdb: ant species catalog
//!
//! Keeps ant taxonomy, the regions species are found in and reported nuptial
//! flights in a local SQLite database, and imports the antwiki.org and
//! antmaps.org exports that feed it.

pub mod cli;
pub mod core;
pub mod import;
