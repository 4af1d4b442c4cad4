//! End-to-end pipeline tests over fixture JSON files.

use std::fs;
use std::path::Path;

use anyhow::Result;
use pretty_assertions::assert_eq;

use caselens::{Config, PipelineError};

const ACCOUNTS: &str = r#"[
    {"account_sfid": "A1", "account_name": "Acme", "account_industry": "Technology",
     "account_country": "Germany", "account_tier": "Enterprise"},
    {"account_sfid": "A2", "account_name": "Globex", "account_industry": "Finance",
     "account_country": "France", "account_tier": "Standard"}
]"#;

const CASES: &str = r#"[
    {"case_sfid": "C1", "account_sfid": "A1", "case_priority": "High", "case_status": "Closed",
     "case_created_date": "2024-03-01", "case_closed_date": "2024-03-03"},
    {"case_sfid": "C2", "account_sfid": "A1", "case_priority": "High", "case_status": "Closed",
     "case_created_date": "2024-03-01", "case_closed_date": "2024-03-05"},
    {"case_sfid": "C3", "account_sfid": "A1", "case_priority": "Low", "case_status": "Open",
     "case_created_date": "2024-03-02", "case_closed_date": null},
    {"case_sfid": "C4", "account_sfid": "A2", "case_priority": "Medium", "case_status": "Closed",
     "case_created_date": "2024-03-02", "case_closed_date": "2024-03-03"}
]"#;

fn write_fixtures(dir: &Path, accounts: &str, cases: &str) -> Config {
    let accounts_path = dir.join("accounts.json");
    let cases_path = dir.join("cases.json");
    fs::write(&accounts_path, accounts).unwrap();
    fs::write(&cases_path, cases).unwrap();
    Config {
        accounts_path,
        cases_path,
        reports_dir: dir.join("out").join("reports"),
        charts_dir: dir.join("out").join("visualizations"),
        ..Config::default()
    }
}

#[test]
fn full_run_exports_all_kpi_tables_and_the_report() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_fixtures(dir.path(), ACCOUNTS, CASES);

    let summary = caselens::run(&config)?;
    assert_eq!(summary.accounts, 2);
    assert_eq!(summary.cases, 4);
    assert_eq!(summary.kpi_files.len(), 5);
    assert!(summary.charts_rendered <= 6);
    for path in &summary.kpi_files {
        assert!(path.exists(), "missing {}", path.display());
    }
    assert!(summary.report_path.exists());

    let account_csv = fs::read_to_string(config.reports_dir.join("kpi_cases_per_account.csv"))?;
    let mut lines = account_csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "account_sfid,account_name,account_country,account_industry,\
         total_cases,avg_resolution_days,closed_cases,open_cases"
    );
    assert_eq!(
        lines.next().unwrap(),
        "A1,Acme,Germany,Technology,3,3.00,2,1"
    );
    assert_eq!(lines.next().unwrap(), "A2,Globex,France,Finance,1,1.00,1,0");

    let report = fs::read_to_string(&summary.report_path)?;
    assert!(report.contains("- Total support cases: 4"));
    Ok(())
}

#[test]
fn two_runs_produce_byte_identical_kpi_files() -> Result<()> {
    let dir_a = tempfile::tempdir()?;
    let dir_b = tempfile::tempdir()?;
    let config_a = write_fixtures(dir_a.path(), ACCOUNTS, CASES);
    let config_b = write_fixtures(dir_b.path(), ACCOUNTS, CASES);

    let summary_a = caselens::run(&config_a)?;
    let summary_b = caselens::run(&config_b)?;

    for (a, b) in summary_a.kpi_files.iter().zip(&summary_b.kpi_files) {
        assert_eq!(
            fs::read(a)?,
            fs::read(b)?,
            "{} differs between runs",
            a.display()
        );
    }
    Ok(())
}

#[test]
fn unparsable_date_aborts_before_any_output_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let broken_cases = r#"[
        {"case_sfid": "C9", "account_sfid": "A1", "case_priority": "High",
         "case_status": "Open", "case_created_date": "next tuesday"}
    ]"#;
    let config = write_fixtures(dir.path(), ACCOUNTS, broken_cases);

    let err = caselens::run(&config).unwrap_err();
    match err {
        PipelineError::Schema(schema) => {
            assert!(schema.to_string().contains("C9"), "error must name the case");
        }
        other => panic!("expected a schema error, got {other}"),
    }
    assert!(
        !config.reports_dir.exists(),
        "no output may exist after an aborted run"
    );
}

#[test]
fn missing_input_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_fixtures(dir.path(), ACCOUNTS, CASES);
    config.cases_path = dir.path().join("nope.json");

    let err = caselens::run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Load(_)));
}

#[test]
fn orphan_cases_survive_the_join_with_unknown_dimensions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let orphan_cases = r#"[
        {"case_sfid": "C1", "account_sfid": "A1", "case_priority": "High",
         "case_status": "Open", "case_created_date": "2024-03-01"},
        {"case_sfid": "C2", "account_sfid": "GHOST", "case_priority": "Low",
         "case_status": "Open", "case_created_date": "2024-03-01"}
    ]"#;
    let config = write_fixtures(dir.path(), ACCOUNTS, orphan_cases);

    caselens::run(&config)?;
    let account_csv = fs::read_to_string(config.reports_dir.join("kpi_cases_per_account.csv"))?;
    assert!(account_csv.contains("GHOST,Unknown,Unknown,Unknown,1,,0,1"));
    Ok(())
}
