//! Aggregation engine: the five KPI tables.
//!
//! Every query reads one immutable snapshot loaded by the warehouse; each run
//! recomputes everything from scratch. The join policy is a left join from
//! cases to accounts, so a case whose account is missing from the accounts
//! export still counts toward every case-level KPI with industry and country
//! reported as `"Unknown"`. Accounts with zero cases consequently do not
//! appear in the per-account table.
//!
//! Averages are taken over resolved cases only; a group with no resolved case
//! reports `None`, never zero. Every table carries a total ordering with an
//! explicit tie-break so repeated runs emit identical rows.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::PipelineError;
use crate::warehouse::Warehouse;

/// Per-account case load and resolution performance.
#[derive(Debug, Clone, Serialize)]
pub struct AccountKpiRow {
    pub account_id: String,
    pub account_name: String,
    pub country: String,
    pub industry: String,
    pub total_cases: i64,
    pub avg_resolution_days: Option<f64>,
    pub closed_cases: i64,
    pub open_cases: i64,
}

/// One cell of the priority × status partition.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityStatusRow {
    pub priority: String,
    pub status: String,
    pub case_count: i64,
    pub avg_resolution_days: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndustryRow {
    pub industry: String,
    pub account_count: i64,
    pub case_count: i64,
    pub cases_per_account: Option<f64>,
    pub avg_resolution_days: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryRow {
    pub country: String,
    pub account_count: i64,
    pub case_count: i64,
    pub avg_resolution_days: Option<f64>,
}

/// Daily case creation volume, one row per (day, priority) pair.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesRow {
    pub day: String,
    pub priority: String,
    pub case_count: i64,
}

/// The five KPI tables plus the dataset-level totals the report needs.
#[derive(Debug, Clone)]
pub struct KpiSet {
    pub cases_per_account: Vec<AccountKpiRow>,
    pub priority_status: Vec<PriorityStatusRow>,
    pub industry: Vec<IndustryRow>,
    pub country: Vec<CountryRow>,
    pub time_series: Vec<TimeSeriesRow>,
    pub total_accounts: i64,
    pub total_cases: i64,
    pub countries_served: i64,
    pub industries_served: i64,
}

pub fn compute_kpis(warehouse: &Warehouse) -> Result<KpiSet, PipelineError> {
    let conn = warehouse.conn();
    Ok(KpiSet {
        cases_per_account: cases_per_account(conn)?,
        priority_status: priority_status(conn)?,
        industry: industry(conn)?,
        country: country(conn)?,
        time_series: time_series(conn)?,
        total_accounts: scalar(conn, "SELECT COUNT(*) FROM accounts")?,
        total_cases: scalar(conn, "SELECT COUNT(*) FROM cases")?,
        countries_served: scalar(conn, "SELECT COUNT(DISTINCT account_country) FROM accounts")?,
        industries_served: scalar(conn, "SELECT COUNT(DISTINCT account_industry) FROM accounts")?,
    })
}

fn scalar(conn: &Connection, sql: &str) -> Result<i64, rusqlite::Error> {
    conn.query_row(sql, [], |row| row.get(0))
}

fn cases_per_account(conn: &Connection) -> Result<Vec<AccountKpiRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT c.account_sfid,
                COALESCE(a.account_name, 'Unknown')     AS account_name,
                COALESCE(a.account_country, 'Unknown')  AS account_country,
                COALESCE(a.account_industry, 'Unknown') AS account_industry,
                COUNT(*)                                AS total_cases,
                AVG(c.resolution_days)                  AS avg_resolution_days,
                SUM(CASE WHEN c.resolution_days IS NOT NULL THEN 1 ELSE 0 END) AS closed_cases,
                SUM(CASE WHEN c.resolution_days IS NULL THEN 1 ELSE 0 END)     AS open_cases
         FROM cases c
         LEFT JOIN accounts a ON a.account_sfid = c.account_sfid
         GROUP BY c.account_sfid
         ORDER BY total_cases DESC, c.account_sfid ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AccountKpiRow {
            account_id: row.get(0)?,
            account_name: row.get(1)?,
            country: row.get(2)?,
            industry: row.get(3)?,
            total_cases: row.get(4)?,
            avg_resolution_days: row.get(5)?,
            closed_cases: row.get(6)?,
            open_cases: row.get(7)?,
        })
    })?;
    rows.collect()
}

fn priority_status(conn: &Connection) -> Result<Vec<PriorityStatusRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT case_priority,
                case_status,
                COUNT(*)             AS case_count,
                AVG(resolution_days) AS avg_resolution_days
         FROM cases
         GROUP BY case_priority, case_status
         ORDER BY MIN(priority_rank), MIN(status_rank)",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PriorityStatusRow {
            priority: row.get(0)?,
            status: row.get(1)?,
            case_count: row.get(2)?,
            avg_resolution_days: row.get(3)?,
        })
    })?;
    rows.collect()
}

fn industry(conn: &Connection) -> Result<Vec<IndustryRow>, rusqlite::Error> {
    // account_count comes from the accounts table, so it also counts accounts
    // that never filed a case; an industry seen only through orphan cases
    // reports zero accounts and no cases_per_account ratio.
    let mut stmt = conn.prepare(
        "SELECT COALESCE(a.account_industry, 'Unknown') AS industry,
                COALESCE(MIN(reg.account_count), 0)     AS account_count,
                COUNT(*)                                AS case_count,
                AVG(c.resolution_days)                  AS avg_resolution_days
         FROM cases c
         LEFT JOIN accounts a ON a.account_sfid = c.account_sfid
         LEFT JOIN (SELECT account_industry, COUNT(*) AS account_count
                    FROM accounts GROUP BY account_industry) reg
                ON reg.account_industry = COALESCE(a.account_industry, 'Unknown')
         GROUP BY industry
         ORDER BY case_count DESC, industry ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let account_count: i64 = row.get(1)?;
        let case_count: i64 = row.get(2)?;
        Ok(IndustryRow {
            industry: row.get(0)?,
            account_count,
            case_count,
            cases_per_account: (account_count > 0)
                .then(|| case_count as f64 / account_count as f64),
            avg_resolution_days: row.get(3)?,
        })
    })?;
    rows.collect()
}

fn country(conn: &Connection) -> Result<Vec<CountryRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(a.account_country, 'Unknown') AS country,
                COALESCE(MIN(reg.account_count), 0)    AS account_count,
                COUNT(*)                               AS case_count,
                AVG(c.resolution_days)                 AS avg_resolution_days
         FROM cases c
         LEFT JOIN accounts a ON a.account_sfid = c.account_sfid
         LEFT JOIN (SELECT account_country, COUNT(*) AS account_count
                    FROM accounts GROUP BY account_country) reg
                ON reg.account_country = COALESCE(a.account_country, 'Unknown')
         GROUP BY country
         ORDER BY case_count DESC, country ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CountryRow {
            country: row.get(0)?,
            account_count: row.get(1)?,
            case_count: row.get(2)?,
            avg_resolution_days: row.get(3)?,
        })
    })?;
    rows.collect()
}

fn time_series(conn: &Connection) -> Result<Vec<TimeSeriesRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT created_day, case_priority, COUNT(*) AS case_count
         FROM cases
         GROUP BY created_day, case_priority
         ORDER BY created_day ASC, MIN(priority_rank) ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(TimeSeriesRow {
            day: row.get(0)?,
            priority: row.get(1)?,
            case_count: row.get(2)?,
        })
    })?;
    rows.collect()
}
