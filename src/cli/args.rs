//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, db::DbCommands, flight::FlightCommands, genus::GenusCommands,
    import::ImportCommands, region::RegionCommands, species::SpeciesCommands,
};

#[derive(Parser)]
#[command(name = "antdb")]
#[command(author, version, about = "Ant species catalog")]
#[command(long_about = "Catalog of ant species, their taxonomy, regional distribution and nuptial flight sightings, kept in a local SQLite database.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Catalog database (default: from config or the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Database management
    #[command(subcommand)]
    Db(DbCommands),

    /// Species management and lookups
    #[command(subcommand)]
    Species(SpeciesCommands),

    /// Genus listings
    #[command(subcommand)]
    Genus(GenusCommands),

    /// Regions and species distribution
    #[command(subcommand)]
    Region(RegionCommands),

    /// Nuptial flight sightings
    #[command(subcommand)]
    Flight(FlightCommands),

    /// Import antwiki.org and antmaps.org exports
    #[command(subcommand)]
    Import(ImportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable (tables for lists, key/value for single records)
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// YAML format
    Yaml,
}
