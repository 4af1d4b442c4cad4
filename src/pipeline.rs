//! Pipeline orchestration.
//!
//! One strictly linear run: load → normalize → warehouse → KPIs → export →
//! charts → report. Load, schema, and export failures abort before any KPI
//! file is finalized; chart failures only reduce `charts_rendered`.

use std::path::PathBuf;

use log::info;

use crate::charts;
use crate::config::Config;
use crate::error::PipelineError;
use crate::export;
use crate::kpis::{self, KpiSet};
use crate::loader;
use crate::normalize;
use crate::report;
use crate::warehouse::Warehouse;

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub accounts: usize,
    pub cases: usize,
    pub kpi_files: Vec<PathBuf>,
    pub charts_rendered: usize,
    pub report_path: PathBuf,
}

/// Execute the full pipeline.
pub fn run(config: &Config) -> Result<RunSummary, PipelineError> {
    info!("📥 loading {}", config.accounts_path.display());
    let raw_accounts = loader::load_accounts(&config.accounts_path)?;
    info!("📥 loading {}", config.cases_path.display());
    let raw_cases = loader::load_cases(&config.cases_path)?;
    info!(
        "loaded {} accounts, {} support cases",
        raw_accounts.len(),
        raw_cases.len()
    );

    let accounts = normalize::normalize_accounts(raw_accounts)?;
    let cases = normalize::normalize_cases(raw_cases)?;

    let mut warehouse = Warehouse::in_memory()?;
    warehouse.load(&accounts, &cases, config.timezone)?;

    let kpi_set = kpis::compute_kpis(&warehouse)?;
    log_kpi_summary(&kpi_set);

    let kpi_files = export::export_kpis(&kpi_set, config)?;
    info!("✅ exported {} KPI tables to {}", kpi_files.len(), config.reports_dir.display());

    let charts_rendered = charts::render_all(&kpi_set, config);

    let report_path = report::write_report(&kpi_set, config)?;
    info!("✅ report written to {}", report_path.display());

    Ok(RunSummary {
        accounts: accounts.len(),
        cases: cases.len(),
        kpi_files,
        charts_rendered,
        report_path,
    })
}

fn log_kpi_summary(kpis: &KpiSet) {
    info!("📈 KPI summary:");
    info!("  cases per account: {} rows", kpis.cases_per_account.len());
    info!("  priority × status: {} rows", kpis.priority_status.len());
    info!("  industry:          {} rows", kpis.industry.len());
    info!("  country:           {} rows", kpis.country.len());
    info!("  time series:       {} rows", kpis.time_series.len());
}
