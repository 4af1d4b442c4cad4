//! Pipeline configuration.
//!
//! Everything a run needs travels in one explicit [`Config`] value; nothing is
//! read from ambient globals. Defaults follow the standard layout: inputs
//! under `data/`, outputs under `outputs/`.

use std::path::PathBuf;

use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct Config {
    /// Accounts JSON export. Default: `data/accounts_anonymized.json`.
    pub accounts_path: PathBuf,
    /// Support cases JSON export. Default: `data/support_cases_anonymized.json`.
    pub cases_path: PathBuf,
    /// Destination for the five KPI tables and the report. Default: `outputs/reports`.
    pub reports_dir: PathBuf,
    /// Destination for chart PNGs. Default: `outputs/visualizations`.
    pub charts_dir: PathBuf,
    /// Chart bitmap size in pixels. Default: 1280 × 720.
    pub chart_width: u32,
    pub chart_height: u32,
    /// Timezone used to bucket case creation timestamps into calendar days.
    /// Default: UTC. Mixed-timezone bucketing silently skews daily counts, so
    /// the zone is applied exactly once, at warehouse load.
    pub timezone: Tz,
    /// Ranked-chart limits. Defaults: 15 accounts, 15 countries, 12 industries.
    pub top_accounts: usize,
    pub top_countries: usize,
    pub top_industries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            accounts_path: PathBuf::from("data/accounts_anonymized.json"),
            cases_path: PathBuf::from("data/support_cases_anonymized.json"),
            reports_dir: PathBuf::from("outputs/reports"),
            charts_dir: PathBuf::from("outputs/visualizations"),
            chart_width: 1280,
            chart_height: 720,
            timezone: chrono_tz::UTC,
            top_accounts: 15,
            top_countries: 15,
            top_industries: 12,
        }
    }
}

impl Config {
    /// Path of the generated Markdown report.
    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join("analysis_report.md")
    }
}
