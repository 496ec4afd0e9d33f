//! `antdb import` command - Import antwiki.org and antmaps.org exports

use std::path::{Path, PathBuf};

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{effective_format, open_catalog};
use crate::cli::output::print_record;
use crate::cli::GlobalOpts;
use crate::core::catalog::DistributionSync;
use crate::import::{
    self, AntSizes, ImportStats, Importer, JsonImporter, NuptialFlights, Synonyms, ValidSpecies,
    WorldDistribution,
};

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Apply an antwiki synonym list (renames and invalidates species)
    Synonyms {
        /// UTF-16 tab-separated export
        file: PathBuf,
    },

    /// Import the antwiki list of valid species with their taxonomy
    ValidSpecies {
        /// UTF-16 tab-separated export
        file: PathBuf,
    },

    /// Import the antwiki world distribution list
    WorldDistribution {
        /// UTF-16 tab-separated export
        file: PathBuf,
    },

    /// Mark the species of an antmaps.org species.json as native to a region
    Antmaps {
        /// Region id, code or slug
        region: String,

        /// JSON file as returned by the antmaps species endpoint
        file: PathBuf,
    },

    /// Store antmaps.org region keys from a bentities JSON file
    AntmapsIds {
        /// JSON file as returned by the antmaps bentities endpoint
        file: PathBuf,
    },

    /// Import worker, queen and male sizes from a JSON list
    AntSizes {
        /// JSON array of {name, worker_size_min, worker_size_max, queen_size_min, ...}
        file: PathBuf,
    },

    /// Import known swarming seasons from a JSON list
    NuptialFlights {
        /// JSON array of {name, nuptial_flight_start, nuptial_flight_end, countries}
        file: PathBuf,
    },
}

pub fn run(cmd: ImportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ImportCommands::Synonyms { file } => run_antwiki(&Synonyms, &file, global),
        ImportCommands::ValidSpecies { file } => run_antwiki(&ValidSpecies, &file, global),
        ImportCommands::WorldDistribution { file } => {
            run_antwiki(&WorldDistribution, &file, global)
        }
        ImportCommands::Antmaps { region, file } => run_antmaps(&region, &file, global),
        ImportCommands::AntmapsIds { file } => run_antmaps_ids(&file, global),
        ImportCommands::AntSizes { file } => run_json(&AntSizes, &file, global),
        ImportCommands::NuptialFlights { file } => run_json(&NuptialFlights, &file, global),
    }
}

fn run_antwiki<I: Importer>(importer: &I, file: &Path, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let stats = import::import_file(&catalog, importer, file)?;
    if print_record(&stats, effective_format(global))? {
        return Ok(());
    }
    if !global.quiet {
        print_stats(file, &stats);
    }
    Ok(())
}

fn run_json<I: JsonImporter>(importer: &I, file: &Path, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let stats = import::import_json_file(&catalog, importer, file)?;
    if print_record(&stats, effective_format(global))? {
        return Ok(());
    }
    if !global.quiet {
        print_stats(file, &stats);
    }
    Ok(())
}

fn print_stats(file: &Path, stats: &ImportStats) {
    println!(
        "{} Imported {} ({} rows)",
        style("✓").green(),
        style(file.display()).cyan(),
        stats.rows
    );
    println!(
        "   {} created, {} updated, {} skipped",
        style(stats.created).green(),
        style(stats.updated).yellow(),
        style(stats.skipped).dim()
    );
}

fn run_antmaps(region: &str, file: &Path, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let report = import::import_antmaps_species(&catalog, region, file)?;
    if print_record(&report, effective_format(global))? {
        return Ok(());
    }
    if !global.quiet {
        print_sync(&report);
    }
    Ok(())
}

fn print_sync(report: &DistributionSync) {
    println!(
        "{} {} distributions created, {} updated",
        style("✓").green(),
        style(report.created).green(),
        style(report.updated).yellow()
    );
    if !report.skipped.is_empty() {
        println!(
            "{} Skipped {} invalid name(s):",
            style("!").yellow(),
            report.skipped.len()
        );
        for name in &report.skipped {
            println!("   {}", name);
        }
    }
}

fn run_antmaps_ids(file: &Path, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let report = import::import_antmaps_ids(&catalog, file)?;
    if print_record(&report, effective_format(global))? {
        return Ok(());
    }
    if !global.quiet {
        println!(
            "{} Stored antmaps ids for {} region(s)",
            style("✓").green(),
            style(report.updated.len()).cyan()
        );
        if !report.not_found.is_empty() {
            println!(
                "{} No region named: {}",
                style("!").yellow(),
                report.not_found.join(", ")
            );
        }
        if !report.ambiguous.is_empty() {
            println!(
                "{} Several regions named: {}",
                style("!").yellow(),
                report.ambiguous.join(", ")
            );
        }
    }
    Ok(())
}
