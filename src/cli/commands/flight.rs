//! `antdb flight` command - Nuptial flight sightings

use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{effective_format, open_catalog, or_dash, truncate_str};
use crate::cli::output::{heading, print_list, print_record, Table};
use crate::cli::GlobalOpts;
use crate::core::catalog::{
    FlightFilter, NewFlight, Rain, SkyCondition, SpottingType, Temperature, TemperatureUnit,
    Velocity, VelocityUnit, DEFAULT_MIN_FLIGHT_COUNT, MONTH_NAMES,
};

#[derive(Subcommand, Debug)]
pub enum FlightCommands {
    /// Report a flight sighting
    Add(Box<AddArgs>),

    /// List flight reports, most recent first
    List {
        /// Only flights of this species (id, name or slug)
        #[arg(long, short = 's')]
        species: Option<String>,

        /// Only flights in this country (id, code or slug)
        #[arg(long, short = 'c')]
        country: Option<String>,

        /// Only reports that have not been reviewed yet
        #[arg(long)]
        unreviewed: bool,

        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Mark flight reports as reviewed
    Review {
        /// Flight ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Number of flights of a species per calendar month
    Frequency {
        /// Species id, name or slug
        species: String,

        /// Only count flights in this country (id, code or slug)
        #[arg(long, short = 'c')]
        country: Option<String>,
    },

    /// Months in which species were seen flying repeatedly
    Months {
        /// Species id, name or slug (all species when omitted)
        species: Option<String>,

        /// Minimum number of flights for a month to count
        #[arg(long, default_value_t = DEFAULT_MIN_FLIGHT_COUNT)]
        min_count: u64,

        /// Save the months as the species' known flight months
        #[arg(long)]
        store: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Species id, name or slug
    pub species: String,

    /// Country id, code or slug
    pub country: String,

    /// Date of the sighting (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub date: NaiveDate,

    /// What was seen: F (flight), FP (preparation), Q, QW or M
    #[arg(long = "type", short = 't', default_value = "F")]
    pub spotting_type: SpottingType,

    #[arg(long)]
    pub address: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Start time (HH:MM:SS)
    #[arg(long)]
    pub start: Option<NaiveTime>,

    /// End time (HH:MM:SS)
    #[arg(long)]
    pub end: Option<NaiveTime>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Unit of --temperature: C or F
    #[arg(long, default_value = "C")]
    pub temperature_unit: TemperatureUnit,

    /// Relative humidity in percent
    #[arg(long)]
    pub humidity: Option<i32>,

    #[arg(long)]
    pub wind: Option<f64>,

    /// Unit of --wind: KMH or MPH
    #[arg(long, default_value = "KMH")]
    pub wind_unit: VelocityUnit,

    /// NO, BEFORE, DURING or AFTER
    #[arg(long)]
    pub rain: Option<Rain>,

    /// CLEAR, MCLEAR, PCLOUDY, MCLOUDY, CLOUDY or FAIR
    #[arg(long)]
    pub sky: Option<SkyCondition>,

    /// Free text about the identification
    #[arg(long)]
    pub species_note: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,

    /// Link to a photo or post
    #[arg(long)]
    pub link: Option<String>,
}

pub fn run(cmd: FlightCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FlightCommands::Add(args) => run_add(*args, global),
        FlightCommands::List {
            species,
            country,
            unreviewed,
            limit,
        } => run_list(species, country, unreviewed, limit, global),
        FlightCommands::Review { ids } => run_review(&ids, global),
        FlightCommands::Frequency { species, country } => {
            run_frequency(&species, country.as_deref(), global)
        }
        FlightCommands::Months {
            species,
            min_count,
            store,
        } => run_months(species.as_deref(), min_count, store, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let species = catalog.resolve_species(&args.species)?;
    let country = catalog.resolve_region(&args.country)?;

    let mut flight = NewFlight::new(
        species.id,
        country.id,
        args.spotting_type,
        args.date,
        args.address,
        args.lat,
        args.lng,
    );
    flight.species_note = args.species_note;
    flight.start_time = args.start;
    flight.end_time = args.end.or(args.start);
    flight.state = args.state;
    flight.city = args.city;
    flight.temperature = args.temperature.map(|value| Temperature {
        value,
        unit: args.temperature_unit,
    });
    flight.humidity = args.humidity;
    flight.wind_speed = args.wind.map(|value| Velocity {
        value,
        unit: args.wind_unit,
    });
    flight.rain = args.rain;
    flight.sky_condition = args.sky;
    flight.comment = args.comment;
    flight.link = args.link;

    let flight = catalog.add_flight(&flight)?;
    if !global.quiet {
        println!(
            "{} Recorded flight {} of {} on {} (awaiting review)",
            style("✓").green(),
            flight.id,
            style(&flight.species).cyan().italic(),
            flight.date
        );
    }
    Ok(())
}

fn run_list(
    species: Option<String>,
    country: Option<String>,
    unreviewed: bool,
    limit: Option<usize>,
    global: &GlobalOpts,
) -> Result<()> {
    let catalog = open_catalog(global)?;
    let filter = FlightFilter {
        species_id: species
            .map(|s| catalog.resolve_species(&s).map(|s| s.id))
            .transpose()?,
        country_id: country
            .map(|c| catalog.resolve_region(&c).map(|r| r.id))
            .transpose()?,
        unreviewed_only: unreviewed,
        limit,
    };
    let flights = catalog.list_flights(&filter)?;

    let mut table = Table::new(&["Id", "Date", "Time", "Species", "Type", "Address", "Reviewed"]);
    for f in &flights {
        table.push(vec![
            f.id.to_string(),
            f.date.to_string(),
            or_dash(f.time_str().as_deref()),
            f.species.clone(),
            f.spotting_type.code().to_string(),
            truncate_str(&f.address, 30),
            if f.reviewed { "yes" } else { "no" }.to_string(),
        ]);
    }
    print_list(
        &flights,
        &table,
        effective_format(global),
        "flights",
        global.quiet,
    )
}

fn run_review(ids: &[i64], global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    catalog.atomically(|cat| {
        for id in ids {
            cat.review_flight(*id)?;
        }
        Ok(())
    })?;
    if !global.quiet {
        println!(
            "{} Reviewed {} flight(s)",
            style("✓").green(),
            style(ids.len()).cyan()
        );
    }
    Ok(())
}

fn run_frequency(species: &str, country: Option<&str>, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let resolved = catalog.resolve_species(species)?;
    let frequency = catalog.flight_frequency_per_month(species, country)?;
    if print_record(&frequency, effective_format(global))? {
        return Ok(());
    }

    heading(&format!("Flights of {}", resolved.name));
    let max = frequency.counts().iter().copied().max().unwrap_or(0);
    for (month, count) in frequency.iter() {
        let width = if max == 0 { 0 } else { (count * 30).div_ceil(max) };
        println!(
            "  {:<10} {:>4}  {}",
            month,
            count,
            style("█".repeat(width as usize)).green()
        );
    }
    if !global.quiet {
        println!();
        println!("{} flights in total", style(frequency.total()).cyan());
    }
    Ok(())
}

fn run_months(
    species: Option<&str>,
    min_count: u64,
    store: bool,
    global: &GlobalOpts,
) -> Result<()> {
    let catalog = open_catalog(global)?;
    let months = catalog.flight_months(species, min_count)?;
    if store {
        let stored = catalog.store_observed_flight_months(species, min_count)?;
        if !global.quiet {
            eprintln!(
                "{} Stored flight months of {} species",
                style("✓").green(),
                style(stored.len()).cyan()
            );
        }
    }

    let mut table = Table::new(&["Species", "Months"]);
    for m in &months {
        let names: Vec<&str> = m
            .months
            .iter()
            .filter_map(|&n| (n as usize).checked_sub(1).and_then(|i| MONTH_NAMES.get(i)))
            .copied()
            .collect();
        table.push(vec![
            m.species.clone(),
            if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            },
        ]);
    }
    print_list(
        &months,
        &table,
        effective_format(global),
        "species",
        global.quiet,
    )
}
