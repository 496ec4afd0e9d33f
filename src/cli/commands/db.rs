//! `antdb db` command - Create, inspect and reset the catalog database

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_catalog};
use crate::cli::output::{field, heading, print_record};
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create the database (a no-op when it already exists)
    Init,

    /// Show row counts and recent imports
    Status {
        /// Number of import runs to show
        #[arg(long, default_value = "5")]
        imports: usize,
    },

    /// Delete all data
    Reset {
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

pub fn run(cmd: DbCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DbCommands::Init => run_init(global),
        DbCommands::Status { imports } => run_status(imports, global),
        DbCommands::Reset { yes } => run_reset(yes, global),
    }
}

fn run_init(global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    if !global.quiet {
        let location = catalog
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        println!(
            "{} Catalog ready at {}",
            style("✓").green(),
            style(location).cyan()
        );
    }
    Ok(())
}

fn run_status(imports: usize, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let stats = catalog.statistics()?;
    let runs = catalog.import_runs(imports)?;

    let format = effective_format(global);
    let report = serde_json::json!({
        "database": catalog.path().map(|p| p.display().to_string()),
        "statistics": stats,
        "imports": runs,
    });
    if print_record(&report, format)? {
        return Ok(());
    }

    heading("Catalog Status");
    if let Some(path) = catalog.path() {
        field("Location", path.display());
    }
    field("Schema", stats.schema_version);
    println!();
    field("Families", style(stats.families).cyan());
    field("Subfamilies", style(stats.sub_families).cyan());
    field("Tribes", style(stats.tribes).cyan());
    field("Genera", style(stats.genera).cyan());
    field(
        "Species",
        format!(
            "{} ({} invalid)",
            style(stats.species).cyan(),
            stats.invalid_species
        ),
    );
    field("Regions", style(stats.regions).cyan());
    field("Distributions", style(stats.distributions).cyan());
    field(
        "Flights",
        format!(
            "{} ({} unreviewed)",
            style(stats.flights).cyan(),
            stats.unreviewed_flights
        ),
    );

    if !runs.is_empty() {
        println!();
        println!("  {}", style("Recent imports:").bold());
        for run in &runs {
            println!(
                "    {}  {:<18} {:<28} {} rows ({} new, {} updated, {} skipped)",
                run.imported_at.format("%Y-%m-%d %H:%M"),
                run.importer,
                run.file_name,
                run.rows,
                run.created,
                run.updated,
                run.skipped
            );
        }
    }

    Ok(())
}

fn run_reset(yes: bool, global: &GlobalOpts) -> Result<()> {
    let mut catalog = open_catalog(global)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Delete every species, region and flight from the catalog?")
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{} Reset cancelled", style("→").blue());
            return Ok(());
        }
    }

    catalog.reset()?;
    if !global.quiet {
        println!("{} Catalog reset", style("✓").green());
    }
    Ok(())
}
