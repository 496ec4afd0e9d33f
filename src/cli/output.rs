//! Output formatting shared by the list and show commands
//!
//! Lists render as a markdown table in `auto` mode and as delimited rows for
//! `tsv`/`csv`. `json` and `yaml` serialize the records themselves, so they
//! carry every field rather than only the table columns.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;

/// Column headers plus one row of cells per record
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render_markdown(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().copied());
        for row in &self.rows {
            builder.push_record(row.iter().map(String::as_str));
        }
        builder.build().with(Style::markdown()).to_string()
    }

    fn render_delimited(&self, sep: char, escape: fn(&str) -> String) -> String {
        let mut out = String::new();
        let line = |cells: Vec<String>| cells.join(&sep.to_string());
        out.push_str(&line(self.headers.iter().map(|h| escape(h)).collect()));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row.iter().map(|c| escape(c)).collect()));
            out.push('\n');
        }
        out
    }
}

fn tsv_cell(s: &str) -> String {
    s.replace(['\t', '\n'], " ")
}

/// Print a list of records in the requested format
///
/// `noun` names the records in the "N ... found" summary.
pub fn print_list<T: Serialize>(
    records: &[T],
    table: &Table,
    format: OutputFormat,
    noun: &str,
    quiet: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&records).into_diagnostic()?);
        }
        OutputFormat::Tsv => print!("{}", table.render_delimited('\t', tsv_cell)),
        OutputFormat::Csv => print!("{}", table.render_delimited(',', escape_csv)),
        OutputFormat::Auto => {
            if records.is_empty() {
                if !quiet {
                    println!("No {} found.", noun);
                }
                return Ok(());
            }
            println!("{}", table.render_markdown());
            if !quiet {
                println!();
                println!("{} {} found", style(records.len()).cyan(), noun);
            }
        }
    }
    Ok(())
}

/// Print a single record as JSON or YAML
///
/// Returns false for the human formats so the caller renders its own view.
pub fn print_record<T: Serialize>(record: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(record).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print one `label: value` line of a detail view
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<16} {}", style(format!("{}:", label)).dim(), value);
}

/// Bold title followed by a rule
pub fn heading(title: &str) {
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(50)).dim());
}
