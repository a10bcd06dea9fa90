use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use edudash::data::aggregate::{summarize, AggregateSummary};
use edudash::data::filter::{FilterCriteria, FilteredView};
use edudash::data::loader::load_csv;

/// Load an institution dataset, apply filters, and print the aggregate
/// summary a dashboard would render.
#[derive(Debug, Parser)]
#[command(name = "edudash", version)]
struct Args {
    /// Path to the institutions CSV.
    input: PathBuf,

    /// Keep only these school levels (repeatable).
    #[arg(long = "level")]
    levels: Vec<String>,

    /// Keep only these founding types (repeatable).
    #[arg(long = "founder")]
    founder_types: Vec<String>,

    /// Keep only these regions (repeatable).
    #[arg(long = "region")]
    regions: Vec<String>,

    /// Keep only these subregions (repeatable).
    #[arg(long = "subregion")]
    subregions: Vec<String>,

    /// Keep only these statuses; use "unspecified" for rows without one
    /// (repeatable).
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Case-insensitive substring match on the institution name.
    #[arg(long)]
    name: Option<String>,

    /// Inclusive student-count range, as MIN..MAX.
    #[arg(long)]
    students: Option<String>,

    /// Inclusive class-count range, as MIN..MAX.
    #[arg(long)]
    classes: Option<String>,

    /// Keep only rows from this year (ignored if the file has no year
    /// column).
    #[arg(long)]
    year: Option<i32>,

    /// Emit the summary as JSON instead of a text report.
    #[arg(long)]
    json: bool,
}

fn parse_range(spec: &str) -> Result<(u32, u32)> {
    let Some((lo, hi)) = spec.split_once("..") else {
        bail!("range must be MIN..MAX, got '{spec}'");
    };
    let lo: u32 = lo.trim().parse().with_context(|| format!("bad lower bound '{lo}'"))?;
    let hi: u32 = hi.trim().parse().with_context(|| format!("bad upper bound '{hi}'"))?;
    if lo > hi {
        bail!("empty range {lo}..{hi}");
    }
    Ok((lo, hi))
}

fn criteria_from_args(args: &Args) -> Result<FilterCriteria> {
    Ok(FilterCriteria {
        levels: args.levels.iter().cloned().collect(),
        founder_types: args.founder_types.iter().cloned().collect(),
        regions: args.regions.iter().cloned().collect(),
        subregions: args.subregions.iter().cloned().collect(),
        statuses: args.statuses.iter().cloned().collect(),
        name_query: args.name.clone().unwrap_or_default(),
        student_range: args.students.as_deref().map(parse_range).transpose()?,
        class_range: args.classes.as_deref().map(parse_range).transpose()?,
        year: args.year,
    })
}

fn print_report(visible: usize, total: usize, summary: &AggregateSummary) {
    let k = &summary.kpis;
    println!("institutions: {visible} of {total}");
    println!("students:     {}", k.total_students);
    println!("classes:      {}", k.total_classes);
    println!("students/class: {:.1}", k.avg_students_per_class);
    println!("newly opened: {}", k.newly_opened);
    println!("suspended:    {}", k.suspended);

    if !summary.founder_share.is_empty() {
        println!("\nstudents by founding type:");
        for (founder, students) in &summary.founder_share {
            println!("  {founder}: {students}");
        }
    }

    if !summary.status_counts.is_empty() {
        println!("\ninstitutions by status:");
        for (status, count) in &summary.status_counts {
            println!("  {status}: {count}");
        }
    }

    if !summary.region_totals.is_empty() {
        println!("\ntop regions (students / classes):");
        for r in summary.top_regions() {
            println!("  {}: {} / {}", r.region, r.students, r.classes);
        }
    }

    if !summary.top_by_students.is_empty() {
        println!("\ntop institutions by students:");
        for e in &summary.top_by_students {
            println!("  {} ({}, {}): {}", e.name, e.level, e.region, e.value);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = load_csv(&args.input)?;
    let criteria = criteria_from_args(&args)?;
    log::info!(
        "criteria: {}",
        serde_json::to_string(&criteria).unwrap_or_default()
    );

    let view = FilteredView::apply(&dataset, &criteria);
    let summary = summarize(&view);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(view.len(), dataset.len(), &summary);
    }
    Ok(())
}
