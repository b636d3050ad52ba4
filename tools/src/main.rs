//! report-runner: headless reporting over a payment ledger.
//!
//! Usage:
//!   report-runner --db ledger.db --populate
//!   report-runner --db ledger.db --report --group country --group post
//!   report-runner --db ledger.db --listing --preset services --json
//!   report-runner --db ledger.db --random 500 --seed 7 --report
//!   report-runner --db ledger.db --drop

use anyhow::Result;
use payreport_core::{
    config::ReportConfig,
    demo,
    engine::{Report, ReportEngine},
    error::ReportError,
    presenter::{Listing, ReportLine},
    schema::ExtensionColumn,
    store::{LedgerStore, RecordStore},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let json = has_flag(&args, "--json");
    let random = parse_arg(&args, "--random", 0usize);
    let seed = parse_arg(&args, "--seed", 42u64);
    let grouping: Vec<String> = args
        .windows(2)
        .filter(|w| w[0] == "--group")
        .map(|w| w[1].clone())
        .collect();

    let config = match flag_value(&args, "--config") {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    let extensions: Vec<ExtensionColumn> = match flag_value(&args, "--preset") {
        Some(name) => config
            .preset(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown preset '{name}'"))?
            .to_vec(),
        None => Vec::new(),
    };

    let store = LedgerStore::open(db)?;
    store.migrate()?;
    log::info!("opened ledger at {db}");

    if has_flag(&args, "--drop") {
        let deleted = store.delete_all()?;
        println!("dropped {deleted} record(s)");
    }
    if has_flag(&args, "--populate") {
        let added = demo::populate(&store)?;
        println!("populated {added} demo record(s)");
    }
    if random > 0 {
        for record in demo::random_batch(seed, random) {
            store.insert_record(record.amount, &record.metadata)?;
        }
        println!("inserted {random} random record(s) (seed {seed})");
    }

    let engine = ReportEngine::new(&store, config);

    if has_flag(&args, "--report") || !grouping.is_empty() {
        match engine.build_report_or_unfiltered(&grouping, &extensions) {
            Ok(report) => {
                let lines = engine.present_report(&report);
                if json {
                    println!("{}", serde_json::to_string_pretty(&ReportOutput::new(&report, lines))?);
                } else {
                    print_report(&report, &lines);
                }
            }
            Err(ReportError::NoData) => println!("No transactions yet."),
            Err(e) => return Err(e.into()),
        }
    }

    if has_flag(&args, "--listing") {
        match engine.build_listing(&extensions) {
            Ok(listing) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&listing)?);
                } else {
                    print_listing(&listing);
                }
            }
            Err(ReportError::NoData) => println!("No transactions yet."),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ReportOutput<'a> {
    columns: &'a [String],
    grouping_columns: &'a [String],
    lines: Vec<ReportLine>,
}

impl<'a> ReportOutput<'a> {
    fn new(report: &'a Report, lines: Vec<ReportLine>) -> Self {
        Self {
            columns: report.schema.columns(),
            grouping_columns: &report.grouping_columns,
            lines,
        }
    }
}

fn print_report(report: &Report, lines: &[ReportLine]) {
    println!("=== REPORT ===");
    println!("  columns:  {}", report.schema.columns().join(", "));
    if report.grouping_columns.is_empty() {
        println!("  grouping: (none)");
    } else {
        println!("  grouping: {}", report.grouping_columns.join(", "));
    }
    println!();
    for line in lines {
        let group: Vec<&str> = line
            .group
            .iter()
            .map(|c| c.text.as_deref().unwrap_or("-"))
            .collect();
        let label = if group.is_empty() {
            "All transactions".to_string()
        } else {
            group.join(" / ")
        };
        println!("  {label:<32} {:>6} txns  {:>14}", line.transactions, line.total);
    }
}

fn print_listing(listing: &Listing) {
    println!("{}", listing.headers.join(" | "));
    for row in &listing.rows {
        let cells: Vec<&str> = row.iter().map(|c| c.text.as_deref().unwrap_or("")).collect();
        println!("{}", cells.join(" | "));
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
