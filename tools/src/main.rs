//! cohort-report: customer metrics from a user-data export.
//!
//! Usage:
//!   cohort-report report --input users.xlsx --as-of 2025-07-04
//!   cohort-report dashboard --input users.csv --cutoff-days 45
//!   cohort-report sample --out users.csv --rows 100 --seed 42

mod charts;
mod render;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cohort_core::{
    clock::AsOf,
    config::AnalysisConfig,
    dashboard::{run_dashboard, DashboardSession},
    derivation::LifetimeBasis,
    loader::write_csv,
    pipeline::analyze_file,
    sample::SampleGenerator,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cohort-report", version, about = "Customer lifetime value, churn and engagement quartiles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the metrics, the describe table and render the charts
    Report(ReportArgs),
    /// JSON line session with live as-of and cutoff controls
    Dashboard(DashboardArgs),
    /// Write a deterministic synthetic dataset
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct ControlArgs {
    /// Analysis date (YYYY-MM-DD); defaults to today
    #[arg(long, env = "COHORT_AS_OF")]
    as_of: Option<NaiveDate>,

    /// Days without login before a player counts as churned (7-90)
    #[arg(long, env = "COHORT_CUTOFF_DAYS")]
    cutoff_days: Option<u32>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Input .csv or spreadsheet
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    controls: ControlArgs,

    /// What ends a customer's lifetime
    #[arg(long, value_enum, default_value_t = BasisArg::LastLogin)]
    lifetime_basis: BasisArg,

    /// Bins in the join-date histogram
    #[arg(long)]
    bins: Option<usize>,

    /// Directory for the PNG charts
    #[arg(long, default_value = ".")]
    charts_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    /// Input .csv or spreadsheet
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    controls: ControlArgs,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Output CSV path
    #[arg(short, long)]
    out: PathBuf,

    #[arg(long, default_value_t = 100)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Reference date the sample is generated against; defaults to today
    #[arg(long, env = "COHORT_AS_OF")]
    as_of: Option<NaiveDate>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BasisArg {
    AsOf,
    LastLogin,
}

impl From<BasisArg> for LifetimeBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::AsOf => LifetimeBasis::AsOf,
            BasisArg::LastLogin => LifetimeBasis::LastLogin,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Report(args) => run_report(args),
        Command::Dashboard(args) => run_dashboard_session(args),
        Command::Sample(args) => run_sample(args),
    }
}

/// Resolve the as-of date once, here; everything downstream takes it as an argument.
fn resolve_as_of(flag: Option<NaiveDate>) -> AsOf {
    AsOf::new(flag.unwrap_or_else(|| Local::now().date_naive()))
}

fn build_config(controls: &ControlArgs) -> Result<AnalysisConfig> {
    let default_as_of = resolve_as_of(None);
    let mut config = match &controls.config {
        Some(path) => AnalysisConfig::load(&path.to_string_lossy(), default_as_of)?,
        None => AnalysisConfig::new(default_as_of),
    };
    if let Some(date) = controls.as_of {
        config.as_of = AsOf::new(date);
    }
    if let Some(days) = controls.cutoff_days {
        config.churn_cutoff_days = days;
    }
    config.validate()?;
    Ok(config)
}

fn run_report(args: ReportArgs) -> Result<()> {
    let mut config = build_config(&args.controls)?.with_basis(args.lifetime_basis.into());
    if let Some(bins) = args.bins {
        config.histogram_bins = bins;
    }

    let report = analyze_file(&args.input, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !args.no_charts {
        std::fs::create_dir_all(&args.charts_dir)?;
        let histogram_path = args.charts_dir.join("join_dates.png");
        let quartile_path = args.charts_dir.join("quartile_deposits.png");
        charts::render_join_histogram(&report.join_histogram, &histogram_path)?;
        charts::render_quartile_deposits(&report.quartiles, &config.currency_symbol, &quartile_path)?;
        log::info!(
            "charts written to {} and {}",
            histogram_path.display(),
            quartile_path.display()
        );
    }

    println!("{}", render::markdown_table(&report.fields));
    println!();
    print!("{}", render::console_block(&report, &config.currency_symbol));
    Ok(())
}

fn run_dashboard_session(args: DashboardArgs) -> Result<()> {
    let config = build_config(&args.controls)?;
    let mut session = DashboardSession::open(&args.input.to_string_lossy(), config)?;
    log::info!(
        "dashboard ready: {} customers, as_of={}",
        session.report().cohort_size,
        session.config().as_of
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_dashboard(&mut session, stdin.lock(), stdout.lock())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    let as_of = resolve_as_of(args.as_of);
    let records = SampleGenerator::new(args.seed, as_of).generate(args.rows);
    write_csv(&records, &args.out)?;
    println!(
        "wrote {} sample customers (seed {}, as of {as_of}) to {}",
        records.len(),
        args.seed,
        args.out.display()
    );
    Ok(())
}
