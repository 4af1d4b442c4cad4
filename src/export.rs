//! KPI exporter: one CSV per KPI table, fixed column order.
//!
//! Export is all-or-nothing: every table is first written to a temp file in
//! the destination directory, and nothing is renamed into place until the
//! whole set has been staged. A failure therefore never leaves a partial KPI
//! set behind.
//!
//! Formatting is deterministic: day averages carry two fixed decimals, and an
//! undefined average (no resolved case in the group) renders as an empty
//! cell. Identical input produces byte-identical files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::ExportError;
use crate::kpis::KpiSet;

pub const CASES_PER_ACCOUNT_FILE: &str = "kpi_cases_per_account.csv";
pub const PRIORITY_STATUS_FILE: &str = "kpi_priority_status.csv";
pub const INDUSTRY_FILE: &str = "kpi_industry.csv";
pub const COUNTRY_FILE: &str = "kpi_country.csv";
pub const TIME_SERIES_FILE: &str = "kpi_time_series.csv";

/// Write the five KPI tables into `config.reports_dir`.
///
/// Returns the final paths in a fixed order.
pub fn export_kpis(kpis: &KpiSet, config: &Config) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(&config.reports_dir).map_err(|source| ExportError::CreateDir {
        path: config.reports_dir.clone(),
        source,
    })?;

    let tables: [(&str, String); 5] = [
        (CASES_PER_ACCOUNT_FILE, render_cases_per_account(kpis)),
        (PRIORITY_STATUS_FILE, render_priority_status(kpis)),
        (INDUSTRY_FILE, render_industry(kpis)),
        (COUNTRY_FILE, render_country(kpis)),
        (TIME_SERIES_FILE, render_time_series(kpis)),
    ];

    let mut staged = Vec::with_capacity(tables.len());
    for (name, content) in tables {
        staged.push((stage(&config.reports_dir, name, &content)?, name));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, name) in staged {
        let path = config.reports_dir.join(name);
        tmp.persist(&path).map_err(|err| ExportError::Persist {
            path: path.clone(),
            source: err.error,
        })?;
        written.push(path);
    }
    Ok(written)
}

fn stage(dir: &Path, name: &str, content: &str) -> Result<NamedTempFile, ExportError> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| ExportError::Stage {
        name: name.to_string(),
        source,
    })?;
    tmp.write_all(content.as_bytes())
        .map_err(|source| ExportError::Stage {
            name: name.to_string(),
            source,
        })?;
    Ok(tmp)
}

fn render_cases_per_account(kpis: &KpiSet) -> String {
    let mut out = String::from(
        "account_sfid,account_name,account_country,account_industry,\
         total_cases,avg_resolution_days,closed_cases,open_cases\n",
    );
    for row in &kpis.cases_per_account {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            csv_field(&row.account_id),
            csv_field(&row.account_name),
            csv_field(&row.country),
            csv_field(&row.industry),
            row.total_cases,
            fmt_days(row.avg_resolution_days),
            row.closed_cases,
            row.open_cases,
        ));
    }
    out
}

fn render_priority_status(kpis: &KpiSet) -> String {
    let mut out = String::from("case_priority,case_status,case_count,avg_resolution_days\n");
    for row in &kpis.priority_status {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&row.priority),
            csv_field(&row.status),
            row.case_count,
            fmt_days(row.avg_resolution_days),
        ));
    }
    out
}

fn render_industry(kpis: &KpiSet) -> String {
    let mut out = String::from(
        "account_industry,total_accounts,total_cases,cases_per_account,avg_resolution_days\n",
    );
    for row in &kpis.industry {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&row.industry),
            row.account_count,
            row.case_count,
            fmt_days(row.cases_per_account),
            fmt_days(row.avg_resolution_days),
        ));
    }
    out
}

fn render_country(kpis: &KpiSet) -> String {
    let mut out =
        String::from("account_country,total_accounts,total_cases,avg_resolution_days\n");
    for row in &kpis.country {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&row.country),
            row.account_count,
            row.case_count,
            fmt_days(row.avg_resolution_days),
        ));
    }
    out
}

fn render_time_series(kpis: &KpiSet) -> String {
    let mut out = String::from("date,case_priority,cases_created\n");
    for row in &kpis.time_series {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&row.day),
            csv_field(&row.priority),
            row.case_count,
        ));
    }
    out
}

/// Two fixed decimals; empty cell when the value is undefined.
fn fmt_days(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => String::new(),
    }
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpis::{AccountKpiRow, CountryRow, IndustryRow, PriorityStatusRow, TimeSeriesRow};
    use pretty_assertions::assert_eq;

    fn sample() -> KpiSet {
        KpiSet {
            cases_per_account: vec![AccountKpiRow {
                account_id: "A1".into(),
                account_name: "Acme, Inc.".into(),
                country: "Germany".into(),
                industry: "Technology".into(),
                total_cases: 3,
                avg_resolution_days: Some(3.0),
                closed_cases: 2,
                open_cases: 1,
            }],
            priority_status: vec![PriorityStatusRow {
                priority: "Low".into(),
                status: "Open".into(),
                case_count: 1,
                avg_resolution_days: None,
            }],
            industry: vec![IndustryRow {
                industry: "Technology".into(),
                account_count: 1,
                case_count: 3,
                cases_per_account: Some(3.0),
                avg_resolution_days: Some(3.0),
            }],
            country: vec![CountryRow {
                country: "Germany".into(),
                account_count: 1,
                case_count: 3,
                avg_resolution_days: Some(3.0),
            }],
            time_series: vec![TimeSeriesRow {
                day: "2024-03-01".into(),
                priority: "High".into(),
                case_count: 2,
            }],
            total_accounts: 1,
            total_cases: 3,
            countries_served: 1,
            industries_served: 1,
        }
    }

    #[test]
    fn writes_all_five_tables_with_fixed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            reports_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let written = export_kpis(&sample(), &config).unwrap();
        assert_eq!(written.len(), 5);

        let account_csv = fs::read_to_string(dir.path().join(CASES_PER_ACCOUNT_FILE)).unwrap();
        assert!(account_csv.starts_with(
            "account_sfid,account_name,account_country,account_industry,\
             total_cases,avg_resolution_days,closed_cases,open_cases\n"
        ));
        // comma inside the account name stays quoted
        assert!(account_csv.contains("\"Acme, Inc.\""));

        let ps_csv = fs::read_to_string(dir.path().join(PRIORITY_STATUS_FILE)).unwrap();
        // undefined average renders as an empty cell, not zero
        assert!(ps_csv.contains("Low,Open,1,\n"));
    }

    #[test]
    fn export_is_byte_identical_across_runs() {
        let kpis = sample();
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let config_a = Config {
            reports_dir: dir_a.path().to_path_buf(),
            ..Config::default()
        };
        let config_b = Config {
            reports_dir: dir_b.path().to_path_buf(),
            ..Config::default()
        };
        export_kpis(&kpis, &config_a).unwrap();
        export_kpis(&kpis, &config_b).unwrap();
        for name in [
            CASES_PER_ACCOUNT_FILE,
            PRIORITY_STATUS_FILE,
            INDUSTRY_FILE,
            COUNTRY_FILE,
            TIME_SERIES_FILE,
        ] {
            let a = fs::read(dir_a.path().join(name)).unwrap();
            let b = fs::read(dir_b.path().join(name)).unwrap();
            assert_eq!(a, b, "{name} differs between runs");
        }
    }

    #[test]
    fn unwritable_destination_is_an_export_error() {
        let config = Config {
            reports_dir: PathBuf::from("/proc/definitely/not/writable"),
            ..Config::default()
        };
        let err = export_kpis(&sample(), &config).unwrap_err();
        assert!(matches!(err, ExportError::CreateDir { .. }));
    }

    #[test]
    fn fmt_days_is_fixed_width() {
        assert_eq!(fmt_days(Some(3.14159)), "3.14");
        assert_eq!(fmt_days(Some(1.0)), "1.00");
        assert_eq!(fmt_days(None), "");
    }
}
