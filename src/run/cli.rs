use anyhow::{bail, Context, Result};
use std::io::{self, Write};

use crate::api::Gateway;
use crate::catalog::cascade::Level;
use crate::catalog::store::Display;
use crate::catalog::Catalog;
use crate::models::{EntityKind, Id, Record};
use crate::ui::util::truncate;

const MAX_CELL: usize = 32;

/// Handle `--help` / `--version`. Returns whether `cmd` was one of them.
pub(crate) fn print_meta(cmd: &str) -> bool {
    match cmd {
        "--help" | "-h" | "help" => {
            print_usage();
            true
        }
        "--version" | "-V" | "version" => {
            println!("catalogtui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => false,
    }
}

pub(crate) fn as_cli<G: Gateway>(args: &[String], catalog: &mut Catalog<G>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = dispatch(&args[1..], catalog, &mut out);

    for notice in catalog.take_notices() {
        eprintln!("{:?}: {}", notice.level, notice.message);
    }
    result
}

fn dispatch<G: Gateway>(args: &[String], catalog: &mut Catalog<G>, out: &mut impl Write) -> Result<()> {
    let Some(cmd) = args.first() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];
    match cmd.as_str() {
        "list" | "ls" => cli_list(rest, catalog, out),
        "show" => cli_show(rest, catalog, out),
        "search" | "s" => cli_search(rest, catalog, out),
        "options" => cli_options(rest, catalog, out),
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("CatalogTUI - admin panel for the movement/cost catalog");
    println!();
    println!("Usage: catalogtui [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  list <entity> [page]          Print one page of a collection");
    println!("  show <entity> <id>            Print a single record");
    println!("  search <query...>             Search all four collections");
    println!("  options <entity> <parent-id>  Print cascade options for a parent");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Entities: movement-types (mt), cost-types (ct), categories (cat), concepts (con)");
}

fn parse_entity(arg: Option<&String>) -> Result<EntityKind> {
    let Some(name) = arg else {
        bail!("Missing entity (movement-types, cost-types, categories, concepts)");
    };
    EntityKind::parse(name).ok_or_else(|| anyhow::anyhow!("Unknown entity: {name}"))
}

fn parse_id(arg: Option<&String>) -> Result<Id> {
    arg.and_then(|s| Id::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing id"))
}

fn cli_list<G: Gateway>(args: &[String], catalog: &mut Catalog<G>, out: &mut impl Write) -> Result<()> {
    let kind = parse_entity(args.first())?;
    let page = match args.get(1) {
        Some(p) => p
            .parse::<usize>()
            .with_context(|| format!("Invalid page number: {p}"))?,
        None => 1,
    };

    catalog.fetch_page(kind, page);
    if catalog.collection(kind).display() == &Display::Failed {
        bail!("Could not load {kind}");
    }

    let collection = catalog.collection(kind);
    writeln!(out, "{kind}")?;
    if let Some(msg) = collection.placeholder() {
        writeln!(out, "{msg}")?;
    } else {
        for line in format_table(kind.columns(), collection.rows()) {
            writeln!(out, "{line}")?;
        }
    }
    writeln!(out)?;
    write!(out, "{}", collection.info_text())?;
    if let Some(window) = collection.window().filter(|w| w.controls_visible()) {
        write!(out, "  (page {})", window.status_text())?;
    }
    writeln!(out)?;
    Ok(())
}

fn cli_show<G: Gateway>(args: &[String], catalog: &mut Catalog<G>, out: &mut impl Write) -> Result<()> {
    let kind = parse_entity(args.first())?;
    let id = parse_id(args.get(1))?;
    let record = catalog
        .fetch_record(kind, &id)
        .with_context(|| format!("Could not load {} {id}", kind.singular()))?;

    let width = kind.columns().iter().map(|c| c.len()).max().unwrap_or(0);
    for (column, cell) in kind.columns().iter().zip(record.cells()) {
        writeln!(out, "{column:<width$}  {cell}")?;
    }
    Ok(())
}

fn cli_search<G: Gateway>(args: &[String], catalog: &mut Catalog<G>, out: &mut impl Write) -> Result<()> {
    let query = args.join(" ");
    if query.trim().is_empty() {
        bail!("Usage: catalogtui search <query>");
    }
    catalog.perform_search(&query);

    for kind in EntityKind::ALL {
        let collection = catalog.collection(kind);
        writeln!(out, "── {kind} ──")?;
        if !collection.in_search() {
            writeln!(out, "Search unavailable")?;
        } else if let Some(msg) = collection.placeholder() {
            writeln!(out, "{msg}")?;
        } else {
            for line in format_table(kind.columns(), collection.rows()) {
                writeln!(out, "{line}")?;
            }
        }
        writeln!(out, "{}", collection.info_text())?;
        writeln!(out)?;
    }
    Ok(())
}

fn cli_options<G: Gateway>(args: &[String], catalog: &mut Catalog<G>, out: &mut impl Write) -> Result<()> {
    let kind = parse_entity(args.first())?;
    let options = match kind {
        EntityKind::MovementType => {
            if !catalog.load_select_options() {
                bail!("Could not load movement types");
            }
            catalog.movement_type_options().to_vec()
        }
        EntityKind::CostType | EntityKind::Category => {
            let parent_level = if kind == EntityKind::CostType {
                Level::MovementType
            } else {
                Level::CostType
            };
            let parent = parse_id(args.get(1))?;
            catalog
                .lookup_children(parent_level, &parent)
                .ok_or_else(|| anyhow::anyhow!("Could not load {kind} for {parent}"))?
        }
        EntityKind::Concept => bail!("Concepts are not a cascade level"),
    };

    if options.is_empty() {
        writeln!(out, "No options")?;
    }
    for option in &options {
        writeln!(out, "{:>6}  {}", option.id.as_str(), option.label)?;
    }
    Ok(())
}

/// Column-aligned text rows, header first.
pub(crate) fn format_table(columns: &[&str], rows: &[Record]) -> Vec<String> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.cells().iter().map(|c| truncate(c, MAX_CELL)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(columns.to_vec())];
    lines.push(widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in &cells {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
