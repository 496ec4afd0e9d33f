//! `antdb genus` command - Genus listings

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{effective_format, open_catalog, or_dash};
use crate::cli::output::{print_list, Table};
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum GenusCommands {
    /// List genera with their tribe, subfamily and family
    List {
        /// Only genera with species in this country (by code)
        #[arg(long, short = 'c')]
        country: Option<String>,
    },
}

pub fn run(cmd: GenusCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GenusCommands::List { country } => run_list(country.as_deref(), global),
    }
}

fn run_list(country: Option<&str>, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let genera = match country {
        Some(code) => catalog.genera_by_country_code(code)?,
        None => catalog.list_genera()?,
    };

    let mut table = Table::new(&["Id", "Genus", "Tribe", "Subfamily", "Family"]);
    for genus in &genera {
        table.push(vec![
            genus.id.to_string(),
            genus.name.clone(),
            or_dash(genus.tribe.as_deref()),
            or_dash(genus.sub_family.as_deref()),
            or_dash(genus.family.as_deref()),
        ]);
    }
    print_list(
        &genera,
        &table,
        effective_format(global),
        "genera",
        global.quiet,
    )
}
