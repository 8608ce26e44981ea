mod logging;
mod report;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use jiff::civil::Date;
use nestegg_core::date_math::start_of_month;
use nestegg_core::simulation::monte_carlo_simulate_with;
use nestegg_core::{HouseholdConfig, MonteCarloConfig};

use crate::logging::init_logging;
use crate::report::ReportWriter;

#[derive(Parser, Debug)]
#[command(name = "nestegg")]
#[command(about = "Monte Carlo retirement simulator for a household")]
struct Args {
    /// Number of Monte Carlo runs
    #[arg(short = 'n', long, default_value_t = 1000)]
    runs: usize,

    /// Household configuration (JSON), or - to read stdin
    #[arg(short, long, default_value = "-")]
    config: String,

    /// Directory for reports, the summary and the log
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Byte stream the run seeds are read from
    #[arg(long)]
    entropy: Option<PathBuf>,

    /// First simulated month, YYYY-MM-DD (default: this month)
    #[arg(long)]
    start_date: Option<Date>,

    /// Also write each run's cash ledger
    #[arg(long)]
    transactions: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn load_config(source: &str) -> color_eyre::Result<HouseholdConfig> {
    let json = if source == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .wrap_err("reading configuration from stdin")?;
        json
    } else {
        std::fs::read_to_string(source).wrap_err_with(|| format!("reading configuration {source}"))?
    };
    HouseholdConfig::from_json(&json).wrap_err("parsing configuration")
}

fn run_options(args: &Args) -> MonteCarloConfig {
    let mut options = MonteCarloConfig::new(args.runs);
    if let Some(date) = args.start_date {
        let first = start_of_month(date);
        if first != date {
            tracing::warn!(%date, start = %first, "start date moved to the first of its month");
        }
        options = options.with_start_date(first);
    }
    if let Some(path) = &args.entropy {
        options = options.with_entropy_file(path);
    }
    options
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    std::fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("creating output directory {}", args.output.display()))?;
    init_logging(&args.output, &args.log_level)?;

    let config = load_config(&args.config)?;
    let options = run_options(&args);
    tracing::info!(
        household = %config.name,
        runs = options.runs,
        start = %options.start(),
        output = %args.output.display(),
        "starting simulation"
    );

    let reports = ReportWriter::new(&args.output, args.transactions);
    let summary = monte_carlo_simulate_with(&config, &options, |run| {
        reports.write_run(run).map_err(Into::into)
    })
    .wrap_err("monte carlo simulation failed")?;
    let index = reports.write_summary(&summary)?;

    println!(
        "{} runs: median balance {:.2}, median age {:.1}, {} early deaths, {} bankruptcies",
        summary.count,
        summary.median.balance.value,
        summary.median.age.value,
        summary.early_deaths.len(),
        summary.bankruptcies.len(),
    );
    println!("summary written to {}", index.display());
    tracing::info!(summary = %index.display(), "done");
    Ok(())
}
