use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use log::{error, info, LevelFilter};

use caselens::Config;

#[derive(Parser)]
#[command(name = "caselens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Support-case analytics: KPI tables, charts, and a narrative report")]
struct Cli {
    /// Accounts JSON export
    #[arg(long, default_value = "data/accounts_anonymized.json")]
    accounts: PathBuf,

    /// Support cases JSON export
    #[arg(long, default_value = "data/support_cases_anonymized.json")]
    cases: PathBuf,

    /// Output root; KPI tables and the report land in <OUT>/reports,
    /// charts in <OUT>/visualizations
    #[arg(long, default_value = "outputs")]
    out_dir: PathBuf,

    /// Chart size in pixels, WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720")]
    chart_size: String,

    /// IANA timezone used to bucket cases into calendar days
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// How many accounts to show in ranked charts
    #[arg(long, default_value_t = 15)]
    top_accounts: usize,

    /// How many countries to show in ranked charts
    #[arg(long, default_value_t = 15)]
    top_countries: usize,

    /// How many industries to show in ranked charts
    #[arg(long, default_value_t = 12)]
    top_industries: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Warn
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    if let Err(err) = execute(&cli) {
        error!("❌ {err:#}");
        process::exit(1);
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;
    let summary = caselens::run(&config).context("analysis failed")?;
    info!(
        "✅ done: {} accounts, {} cases, {} KPI tables, {}/6 charts, report at {}",
        summary.accounts,
        summary.cases,
        summary.kpi_files.len(),
        summary.charts_rendered,
        summary.report_path.display()
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let (chart_width, chart_height) = parse_chart_size(&cli.chart_size)?;
    let timezone: Tz = cli
        .timezone
        .parse()
        .map_err(|_| anyhow!("unknown timezone: {}", cli.timezone))?;
    Ok(Config {
        accounts_path: cli.accounts.clone(),
        cases_path: cli.cases.clone(),
        reports_dir: cli.out_dir.join("reports"),
        charts_dir: cli.out_dir.join("visualizations"),
        chart_width,
        chart_height,
        timezone,
        top_accounts: cli.top_accounts,
        top_countries: cli.top_countries,
        top_industries: cli.top_industries,
    })
}

fn parse_chart_size(value: &str) -> Result<(u32, u32)> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("chart size must look like 1280x720, got `{value}`"))?;
    let width: u32 = w.trim().parse().context("chart width is not a number")?;
    let height: u32 = h.trim().parse().context("chart height is not a number")?;
    if width == 0 || height == 0 {
        return Err(anyhow!("chart size must be positive, got `{value}`"));
    }
    Ok((width, height))
}
