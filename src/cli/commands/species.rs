//! `antdb species` command - Species management and lookups

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{effective_format, open_catalog, or_dash, truncate_str};
use crate::cli::output::{field, heading, print_list, print_record, Table};
use crate::cli::GlobalOpts;
use crate::core::catalog::{
    months_from_range, AntSize, Caste, ColonyStructure, CommonName, FlightClimate, Founding,
    Hibernation, Nutrition, Region, Species, SpeciesBiology, SpeciesDescription, SpeciesFilter,
    SpeciesUpdate, Upsert, MONTH_NAMES,
};

#[derive(Subcommand, Debug)]
pub enum SpeciesCommands {
    /// Add a species by its binomial name (e.g. "Lasius niger")
    Add {
        /// Binomial name; the genus is created when missing
        name: String,
    },

    /// Show a species with its names and regions
    Show {
        /// Species id, name or slug
        species: String,
    },

    /// List species
    List {
        /// Only species of this genus
        #[arg(long, short = 'g')]
        genus: Option<String>,

        /// Only species distributed in this country (by code)
        #[arg(long, short = 'c')]
        country: Option<String>,

        /// Only species distributed in this subregion (by code)
        #[arg(long, short = 'r')]
        region: Option<String>,

        /// Include species marked invalid
        #[arg(long)]
        all: bool,

        /// Maximum number of species to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Search species by scientific, invalid or common name
    Search {
        /// Text contained in any of the names
        text: String,
    },

    /// Record an old (invalid) name of a species
    Alias {
        /// Species id, name or slug
        species: String,
        /// The invalid name
        name: String,
    },

    /// Add a common name in some language
    CommonName {
        /// Species id, name or slug
        species: String,
        /// The common name
        name: String,
        /// Two letter language code
        #[arg(long, short = 'l', default_value = "en")]
        lang: String,
    },

    /// Set descriptive, biology and keeping attributes
    Set(Box<SetArgs>),

    /// Record the size range of a caste in mm
    Size {
        /// Species id, name or slug
        species: String,
        /// WORKER, QUEEN or MALE
        caste: Caste,
        /// Minimum length (mm)
        #[arg(required_unless_present = "remove")]
        minimum: Option<f64>,
        /// Maximum length (mm); defaults to the minimum
        maximum: Option<f64>,
        /// Forget the recorded size instead
        #[arg(long, conflicts_with_all = ["minimum", "maximum"])]
        remove: bool,
    },

    /// List worker sizes of all species
    Sizes,

    /// Set the description of a species in one language
    Describe {
        /// Species id, name or slug
        species: String,
        /// Description text
        text: String,
        /// Two letter language code
        #[arg(long, short = 'l', default_value = "en")]
        lang: String,
    },

    /// Show or replace the months a species is known to swarm in
    Months {
        /// Species id, name or slug
        species: String,
        /// Months as numbers (1-12)
        #[arg(conflicts_with_all = ["from", "clear"])]
        months: Vec<u32>,
        /// First month of a range that may wrap over the year end
        #[arg(long, requires = "to", conflicts_with = "clear")]
        from: Option<u32>,
        /// Last month of the range
        #[arg(long, requires = "from")]
        to: Option<u32>,
        /// Remove all known months
        #[arg(long)]
        clear: bool,
    },

    /// Valid species with known flight months
    Calendar {
        /// Part of the species name (at least three characters)
        #[arg(long)]
        name: Option<String>,
        /// Only species of this region (id, code or slug)
        #[arg(long, short = 'r')]
        region: Option<String>,
    },

    /// Rename a species, moving it to the genus of the new name
    Rename {
        /// Species id, name or slug
        species: String,
        /// New binomial name
        new_name: String,
    },

    /// Mark a species as invalid (or valid again with --valid)
    Invalidate {
        /// Species id, name or slug
        species: String,
        /// Mark as valid instead
        #[arg(long)]
        valid: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Species id, name or slug
    pub species: String,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    /// Species group within the genus
    #[arg(long)]
    pub group: Option<String>,

    /// Sort position within the genus
    #[arg(long)]
    pub ordering: Option<i32>,

    /// MONO, OLIGO or POLY
    #[arg(long)]
    pub colony_structure: Option<ColonyStructure>,

    /// Whether workers come in different sizes (true or false)
    #[arg(long)]
    pub polymorphism: Option<bool>,

    /// c (claustral), sc (semi-claustral), sp or spp (social parasitic)
    #[arg(long)]
    pub founding: Option<Founding>,

    /// m (moderate), w (warm) or s (sticky)
    #[arg(long)]
    pub flight_climate: Option<FlightClimate>,

    /// LEAVES, OMNIVOROUS, SEEDS or SUGAR_INSECTS
    #[arg(long)]
    pub nutrition: Option<Nutrition>,

    /// NO, LONG or SHORT
    #[arg(long)]
    pub hibernation: Option<Hibernation>,
}

impl From<&SetArgs> for SpeciesUpdate {
    fn from(args: &SetArgs) -> Self {
        SpeciesUpdate {
            author: args.author.clone(),
            year: args.year,
            group: args.group.clone(),
            ordering: args.ordering,
            colony_structure: args.colony_structure,
            worker_polymorphism: args.polymorphism,
            founding: args.founding,
            flight_climate: args.flight_climate,
            nutrition: args.nutrition,
            hibernation: args.hibernation,
        }
    }
}

pub fn run(cmd: SpeciesCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SpeciesCommands::Add { name } => run_add(&name, global),
        SpeciesCommands::Show { species } => run_show(&species, global),
        SpeciesCommands::List {
            genus,
            country,
            region,
            all,
            limit,
        } => {
            let filter = SpeciesFilter {
                genus,
                country_code: country,
                region_code: region,
                valid_only: !all,
                limit,
            };
            run_list(&filter, global)
        }
        SpeciesCommands::Search { text } => run_search(&text, global),
        SpeciesCommands::Alias { species, name } => run_alias(&species, &name, global),
        SpeciesCommands::CommonName {
            species,
            name,
            lang,
        } => run_common_name(&species, &name, &lang, global),
        SpeciesCommands::Set(args) => run_set(&args.species, &SpeciesUpdate::from(&*args), global),
        SpeciesCommands::Size {
            species,
            caste,
            minimum,
            maximum,
            remove,
        } => match minimum {
            Some(minimum) if !remove => {
                let size = AntSize {
                    caste,
                    minimum,
                    maximum: maximum.unwrap_or(minimum),
                };
                run_size(&species, &size, global)
            }
            _ => run_remove_size(&species, caste, global),
        },
        SpeciesCommands::Sizes => run_sizes(global),
        SpeciesCommands::Describe {
            species,
            text,
            lang,
        } => run_describe(&species, &text, &lang, global),
        SpeciesCommands::Months {
            species,
            months,
            from,
            to,
            clear,
        } => {
            let months = match (from, to) {
                (Some(from), Some(to)) => Some(months_from_range(from, to)?),
                _ if clear || !months.is_empty() => Some(months),
                _ => None,
            };
            run_months(&species, months.as_deref(), global)
        }
        SpeciesCommands::Calendar { name, region } => {
            run_calendar(name.as_deref(), region.as_deref(), global)
        }
        SpeciesCommands::Rename { species, new_name } => run_rename(&species, &new_name, global),
        SpeciesCommands::Invalidate { species, valid } => run_invalidate(&species, valid, global),
    }
}

fn run_add(name: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.add_species(name)?;
    if !global.quiet {
        println!(
            "{} Created species {} (id {})",
            style("✓").green(),
            style(&species.name).cyan().italic(),
            species.id
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct SpeciesDetail {
    #[serde(flatten)]
    species: Species,
    biology: SpeciesBiology,
    sizes: Vec<AntSize>,
    flight_months: Vec<u32>,
    invalid_names: Vec<String>,
    common_names: Vec<CommonName>,
    descriptions: Vec<SpeciesDescription>,
    regions: Vec<Region>,
}

fn month_names(months: &[u32]) -> String {
    let names: Vec<&str> = months
        .iter()
        .filter_map(|&n| (n as usize).checked_sub(1).and_then(|i| MONTH_NAMES.get(i)))
        .copied()
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

fn print_biology(detail: &SpeciesDetail) {
    let b = &detail.biology;
    let label = |value: Option<&'static str>| value.unwrap_or("-");
    field("Colony structure", label(b.colony_structure.map(|c| c.label())));
    field(
        "Worker polymorphism",
        match b.worker_polymorphism {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        },
    );
    field("Founding", label(b.founding.map(|f| f.label())));
    field("Nutrition", label(b.nutrition.map(|n| n.label())));
    field("Hibernation", label(b.hibernation.map(|h| h.label())));
    field("Flight months", month_names(&detail.flight_months));
    field("Flight climate", label(b.flight_climate.map(|c| c.label())));
    for size in &detail.sizes {
        field(size.caste.label(), size);
    }
}

fn run_show(ident: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let detail = SpeciesDetail {
        biology: catalog.species_biology(species.id)?,
        sizes: catalog.ant_sizes(species.id)?,
        flight_months: catalog.known_flight_months(species.id)?,
        invalid_names: catalog.invalid_names(species.id)?,
        common_names: catalog.common_names(species.id)?,
        descriptions: catalog.descriptions(species.id)?,
        regions: catalog.regions_of_species(species.id)?,
        species,
    };

    if print_record(&detail, effective_format(global))? {
        return Ok(());
    }

    let s = &detail.species;
    heading(&s.name);
    field("Id", s.id);
    field("Genus", or_dash(s.genus.as_deref()));
    field("Author", or_dash(s.author.as_deref()));
    field(
        "Year",
        s.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
    );
    if let Some(group) = &s.group {
        field("Group", group);
    }
    field(
        "Status",
        if s.valid {
            style("valid").green()
        } else {
            style("invalid").red()
        },
    );
    field(
        "antwiki",
        format!("https://www.antwiki.org/wiki/{}", s.name_underscore()),
    );
    println!();
    print_biology(&detail);

    if !detail.invalid_names.is_empty() {
        println!();
        println!("  {}", style("Invalid names:").bold());
        for name in &detail.invalid_names {
            println!("    {}", style(name).italic());
        }
    }
    if !detail.common_names.is_empty() {
        println!();
        println!("  {}", style("Common names:").bold());
        for common in &detail.common_names {
            println!("    [{}] {}", common.language, common.name);
        }
    }
    for description in &detail.descriptions {
        println!();
        println!("  {} [{}]", style("Description").bold(), description.language);
        println!("    {}", description.description);
    }
    if !detail.regions.is_empty() {
        println!();
        println!(
            "  {} {}",
            style("Regions:").bold(),
            detail
                .regions
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

fn species_table(species: &[Species]) -> Table {
    let mut table = Table::new(&["Id", "Name", "Author", "Year", "Valid"]);
    for s in species {
        table.push(vec![
            s.id.to_string(),
            s.name.clone(),
            truncate_str(s.author.as_deref().unwrap_or("-"), 40),
            s.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            if s.valid { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

fn run_list(filter: &SpeciesFilter, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.list_species(filter)?;
    print_list(
        &species,
        &species_table(&species),
        effective_format(global),
        "species",
        global.quiet,
    )
}

fn run_search(text: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.search_species(text)?;
    print_list(
        &species,
        &species_table(&species),
        effective_format(global),
        "species",
        global.quiet,
    )
}

fn run_alias(ident: &str, name: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let added = catalog.add_invalid_name(species.id, name.trim())?;
    if !global.quiet {
        if added {
            println!(
                "{} {} recorded as an invalid name of {}",
                style("✓").green(),
                style(name.trim()).italic(),
                style(&species.name).cyan().italic()
            );
        } else {
            println!(
                "{} {} already has that invalid name",
                style("→").blue(),
                style(&species.name).cyan().italic()
            );
        }
    }
    Ok(())
}

fn run_common_name(ident: &str, name: &str, lang: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    catalog.add_common_name(species.id, name, lang)?;
    if !global.quiet {
        println!(
            "{} Added common name \"{}\" to {}",
            style("✓").green(),
            name.trim(),
            style(&species.name).cyan().italic()
        );
    }
    Ok(())
}

fn run_set(ident: &str, update: &SpeciesUpdate, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let species = catalog.update_species(species.id, update)?;
    if !global.quiet {
        println!(
            "{} Updated {}",
            style("✓").green(),
            style(&species.name).cyan().italic()
        );
    }
    Ok(())
}

fn run_size(ident: &str, size: &AntSize, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let outcome = catalog.set_ant_size(species.id, size)?;
    if !global.quiet {
        println!(
            "{} {} {} of {}: {}",
            style("✓").green(),
            if outcome == Upsert::Created { "Recorded" } else { "Updated" },
            size.caste.label().to_lowercase(),
            style(&species.name).cyan().italic(),
            size
        );
    }
    Ok(())
}

fn run_remove_size(ident: &str, caste: Caste, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let removed = catalog.remove_ant_size(species.id, caste)?;
    if !global.quiet {
        if removed {
            println!(
                "{} Removed {} of {}",
                style("✓").green(),
                caste.label().to_lowercase(),
                style(&species.name).cyan().italic()
            );
        } else {
            println!(
                "{} {} has no {} recorded",
                style("→").blue(),
                style(&species.name).cyan().italic(),
                caste.label().to_lowercase()
            );
        }
    }
    Ok(())
}

fn run_sizes(global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let sizes = catalog.worker_sizes()?;
    let mut table = Table::new(&["Id", "Species", "Min (mm)", "Max (mm)"]);
    for s in &sizes {
        table.push(vec![
            s.species_id.to_string(),
            s.species.clone(),
            s.minimum.to_string(),
            s.maximum.to_string(),
        ]);
    }
    print_list(
        &sizes,
        &table,
        effective_format(global),
        "sizes",
        global.quiet,
    )
}

fn run_describe(ident: &str, text: &str, lang: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let outcome = catalog.set_description(species.id, lang, text)?;
    if !global.quiet {
        println!(
            "{} {} description [{}] of {}",
            style("✓").green(),
            if outcome == Upsert::Created { "Added" } else { "Replaced" },
            lang.to_lowercase(),
            style(&species.name).cyan().italic()
        );
    }
    Ok(())
}

fn run_months(ident: &str, months: Option<&[u32]>, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let months = match months {
        Some(months) => catalog.set_flight_months(species.id, months)?,
        None => catalog.known_flight_months(species.id)?,
    };
    if print_record(&months, effective_format(global))? {
        return Ok(());
    }
    println!(
        "{}: {}",
        style(&species.name).cyan().italic(),
        month_names(&months)
    );
    Ok(())
}

fn run_calendar(name: Option<&str>, region: Option<&str>, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let calendar = catalog.flight_calendar(name, region)?;

    let mut headers: Vec<&'static str> = vec!["Species"];
    headers.extend(MONTH_NAMES.iter().map(|&m| &m[..3]));
    let mut table = Table::new(&headers);
    for entry in &calendar {
        let mut row = vec![entry.species.clone()];
        row.extend(
            entry
                .flags()
                .iter()
                .map(|&f| if f == 1 { "x" } else { "" }.to_string()),
        );
        table.push(row);
    }
    print_list(
        &calendar,
        &table,
        effective_format(global),
        "species",
        global.quiet,
    )
}

fn run_rename(ident: &str, new_name: &str, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    let old_name = species.name.clone();
    let renamed = catalog.rename_species(species.id, new_name)?;
    if !global.quiet {
        println!(
            "{} Renamed {} to {}",
            style("✓").green(),
            style(old_name).italic(),
            style(&renamed.name).cyan().italic()
        );
    }
    Ok(())
}

fn run_invalidate(ident: &str, valid: bool, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(ident)?;
    catalog.set_species_valid(species.id, valid)?;
    if !global.quiet {
        println!(
            "{} {} marked {}",
            style("✓").green(),
            style(&species.name).cyan().italic(),
            if valid { "valid" } else { "invalid" }
        );
    }
    Ok(())
}
