//! `antdb region` command - Regions and the species distributed in them

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{effective_format, open_catalog, or_dash, yes_no};
use crate::cli::output::{field, heading, print_list, print_record, Table};
use crate::cli::GlobalOpts;
use crate::core::catalog::{NewRegion, RedListStatus, Region, RegionType};

#[derive(Subcommand, Debug)]
pub enum RegionCommands {
    /// Add a region
    Add {
        /// Display name
        name: String,

        /// Short code (e.g. ISO country code "DE")
        #[arg(long)]
        code: Option<String>,

        /// Region type ("Country", "Subregion" or any other label)
        #[arg(long = "type", short = 't', default_value = "Country")]
        region_type: String,

        /// Parent region id, code or slug
        #[arg(long)]
        parent: Option<String>,

        #[arg(long)]
        official_name: Option<String>,

        /// Page name on antwiki.org, when it differs from the name
        #[arg(long)]
        antwiki_name: Option<String>,
    },

    /// Show a region
    Show {
        /// Region id, code or slug
        region: String,
    },

    /// List regions
    List {
        /// Only regions of this type
        #[arg(long = "type", short = 't')]
        region_type: Option<String>,

        /// Only regions with at least one species
        #[arg(long)]
        with_ants: bool,

        /// Only countries whose species list is complete
        #[arg(long, conflicts_with_all = ["with_ants", "region_type", "states_of"])]
        complete_only: bool,

        /// Subregions with species of the country with this code
        #[arg(long, conflicts_with_all = ["with_ants", "region_type"])]
        states_of: Option<String>,
    },

    /// List the species of a region
    Species {
        /// Region id, code or slug
        region: String,

        /// Only species whose name contains this text
        #[arg(long, short = 'n')]
        name: Option<String>,
    },

    /// Species found in the first region but not in the second
    Diff {
        first: String,
        second: String,
    },

    /// Species found in both regions
    Common {
        first: String,
        second: String,
    },

    /// Mark the species list of a region as complete
    Complete {
        /// Region id, code or slug
        region: String,

        /// Clear the flag instead
        #[arg(long)]
        unset: bool,
    },

    /// Mark a species as protected in a region
    Protect {
        /// Region id, code or slug
        region: String,

        /// Species id, name or slug
        species: String,

        /// Clear the flag instead
        #[arg(long)]
        unset: bool,
    },

    /// Set the red list status of a species in a region
    RedList {
        /// Region id, code or slug
        region: String,

        /// Species id, name or slug
        species: String,

        /// Status such as "vulnerable" or "near-threatened"; "none" clears it
        status: String,
    },
}

pub fn run(cmd: RegionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RegionCommands::Add {
            name,
            code,
            region_type,
            parent,
            official_name,
            antwiki_name,
        } => {
            let catalog = open_catalog(global)?;
            let mut region = NewRegion::new(name, RegionType::from(region_type.as_str()));
            region.code = code;
            region.official_name = official_name;
            region.antwiki_name = antwiki_name;
            if let Some(parent) = parent {
                region = region.parent(catalog.resolve_region(&parent)?.id);
            }
            let region = catalog.create_region(&region)?;
            if !global.quiet {
                println!(
                    "{} Created {} {} (id {})",
                    style("✓").green(),
                    region.region_type,
                    style(&region.name).cyan(),
                    region.id
                );
            }
            Ok(())
        }
        RegionCommands::Show { region } => run_show(&region, global),
        RegionCommands::List {
            region_type,
            with_ants,
            complete_only,
            states_of,
        } => run_list(region_type, with_ants, complete_only, states_of, global),
        RegionCommands::Species { region, name } => run_species(&region, name.as_deref(), global),
        RegionCommands::Diff { first, second } => {
            let catalog = open_catalog(global)?;
            let names = catalog.species_diff(&first, &second)?;
            print_names(&names, global)
        }
        RegionCommands::Common { first, second } => {
            let catalog = open_catalog(global)?;
            let names = catalog.species_common(&first, &second)?;
            print_names(&names, global)
        }
        RegionCommands::Complete { region, unset } => {
            let catalog = open_catalog(global)?;
            let region = catalog.resolve_region(&region)?;
            catalog.set_ant_list_complete(region.id, !unset)?;
            if !global.quiet {
                println!(
                    "{} Species list of {} marked {}",
                    style("✓").green(),
                    style(&region.name).cyan(),
                    if unset { "incomplete" } else { "complete" }
                );
            }
            Ok(())
        }
        RegionCommands::Protect {
            region,
            species,
            unset,
        } => {
            let catalog = open_catalog(global)?;
            let region = catalog.resolve_region(&region)?;
            let species = catalog.resolve_species(&species)?;
            catalog.set_distribution_protected(species.id, region.id, !unset)?;
            if !global.quiet {
                println!(
                    "{} {} is {} in {}",
                    style("✓").green(),
                    style(&species.name).italic(),
                    if unset { "not protected" } else { "protected" },
                    style(&region.name).cyan()
                );
            }
            Ok(())
        }
        RegionCommands::RedList {
            region,
            species,
            status,
        } => {
            let catalog = open_catalog(global)?;
            let region = catalog.resolve_region(&region)?;
            let species = catalog.resolve_species(&species)?;
            let status = if status.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(status.parse::<RedListStatus>()?)
            };
            catalog.set_red_list_status(species.id, region.id, status)?;
            if !global.quiet {
                println!(
                    "{} {} in {}: {}",
                    style("✓").green(),
                    style(&species.name).italic(),
                    style(&region.name).cyan(),
                    status.map(|s| s.label()).unwrap_or("no status")
                );
            }
            Ok(())
        }
    }
}

fn run_show(ident: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let region = catalog.resolve_region(ident)?;
    if print_record(&region, effective_format(global))? {
        return Ok(());
    }

    heading(&region.name);
    field("Id", region.id);
    field("Code", or_dash(region.code.as_deref()));
    field("Type", &region.region_type);
    if let Some(official) = &region.official_name {
        field("Official name", official);
    }
    if let Some(parent_id) = region.parent_id {
        let parent = catalog
            .region(parent_id)?
            .map(|p| p.name)
            .unwrap_or_else(|| parent_id.to_string());
        field("Parent", parent);
    }
    field(
        "Species list",
        if region.ant_list_complete {
            "complete"
        } else {
            "incomplete"
        },
    );
    field("antmaps id", or_dash(region.antmaps_id.as_deref()));
    field("antwiki", region.antwiki_url());
    Ok(())
}

fn run_list(
    region_type: Option<String>,
    with_ants: bool,
    complete_only: bool,
    states_of: Option<String>,
    global: &GlobalOpts,
) -> Result<()> {
    let catalog = open_catalog(global)?;
    let regions = if let Some(code) = states_of {
        catalog.states_with_ants_and_country(&code)?
    } else if complete_only {
        catalog.countries_with_ants(true)?
    } else {
        let region_type = region_type.map(|t| RegionType::from(t.as_str()));
        match (with_ants, region_type) {
            (true, Some(RegionType::Country)) => catalog.countries_with_ants(false)?,
            (true, Some(t)) => catalog
                .regions_with_ants()?
                .into_iter()
                .filter(|r| r.region_type == t)
                .collect(),
            (true, None) => catalog.regions_with_ants()?,
            (false, t) => catalog.list_regions(t.as_ref())?,
        }
    };

    print_list(
        &regions,
        &region_table(&regions),
        effective_format(global),
        "regions",
        global.quiet,
    )
}

fn region_table(regions: &[Region]) -> Table {
    let mut table = Table::new(&["Id", "Code", "Name", "Type", "Complete"]);
    for r in regions {
        table.push(vec![
            r.id.to_string(),
            or_dash(r.code.as_deref()),
            r.name.clone(),
            r.region_type.to_string(),
            if r.ant_list_complete { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

fn run_species(ident: &str, name: Option<&str>, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.species_in_region(ident, name)?;

    let mut table = Table::new(&["Id", "Species", "Native", "Protected", "Red list"]);
    for s in &species {
        table.push(vec![
            s.id.to_string(),
            s.name.clone(),
            yes_no(s.native).to_string(),
            yes_no(s.protected).to_string(),
            s.red_list_status
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| "-".into()),
        ]);
    }
    print_list(
        &species,
        &table,
        effective_format(global),
        "species",
        global.quiet,
    )
}

fn print_names(names: &[String], global: &GlobalOpts) -> Result<()> {
    let mut table = Table::new(&["Species"]);
    for name in names {
        table.push(vec![name.clone()]);
    }
    print_list(names, &table, effective_format(global), "species", global.quiet)
}
