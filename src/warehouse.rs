//! In-memory SQL warehouse for one pipeline run.
//!
//! Normalized records are bulk-inserted into SQLite so the KPI queries can be
//! expressed as plain joins and group-bys. Two derived columns are computed
//! once at load time and shared by every query:
//!
//! - `created_day`: the case creation timestamp bucketed into a calendar day
//!   in the configured timezone;
//! - `resolution_days`: fractional days from creation to closure, NULL while
//!   the case is open.
//!
//! `priority_rank` / `status_rank` mirror the enum ranks so ordered output
//! never depends on alphabetical accidents.

use chrono_tz::Tz;
use rusqlite::{params, Connection};

use crate::types::{Account, Case};

const SCHEMA: &str = "
CREATE TABLE accounts (
    account_sfid     TEXT PRIMARY KEY,
    account_name     TEXT NOT NULL,
    account_industry TEXT NOT NULL,
    account_country  TEXT NOT NULL,
    account_tier     TEXT NOT NULL
);
CREATE TABLE cases (
    case_sfid         TEXT PRIMARY KEY,
    account_sfid      TEXT NOT NULL,
    case_priority     TEXT NOT NULL,
    priority_rank     INTEGER NOT NULL,
    case_status       TEXT NOT NULL,
    status_rank       INTEGER NOT NULL,
    case_created_date TEXT NOT NULL,
    case_closed_date  TEXT,
    created_day       TEXT NOT NULL,
    resolution_days   REAL
);
CREATE INDEX idx_cases_account ON cases(account_sfid);
CREATE INDEX idx_cases_day ON cases(created_day);
";

pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Warehouse { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Insert both collections inside one transaction.
    pub fn load(
        &mut self,
        accounts: &[Account],
        cases: &[Case],
        timezone: Tz,
    ) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO accounts
                 (account_sfid, account_name, account_industry, account_country, account_tier)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for account in accounts {
                stmt.execute(params![
                    account.id,
                    account.name,
                    account.industry,
                    account.country,
                    account.tier,
                ])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cases
                 (case_sfid, account_sfid, case_priority, priority_rank, case_status,
                  status_rank, case_created_date, case_closed_date, created_day, resolution_days)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for case in cases {
                let created_day = case
                    .created_at
                    .with_timezone(&timezone)
                    .date_naive()
                    .format("%Y-%m-%d")
                    .to_string();
                stmt.execute(params![
                    case.id,
                    case.account_id,
                    case.priority.as_str(),
                    case.priority.rank(),
                    case.status.as_str(),
                    case.status.rank(),
                    case.created_at.to_rfc3339(),
                    case.closed_at.map(|dt| dt.to_rfc3339()),
                    created_day,
                    case.resolution_days(),
                ])?;
            }
        }
        tx.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, Status};
    use chrono::{TimeZone, Utc};

    fn case_at(id: &str, iso: &str) -> Case {
        Case {
            id: id.to_string(),
            account_id: "A-1".to_string(),
            priority: Priority::Low,
            status: Status::Open,
            created_at: iso.parse().unwrap(),
            closed_at: None,
        }
    }

    #[test]
    fn day_bucketing_follows_the_configured_timezone() {
        // 03:00 UTC on March 2nd is still March 1st in Los Angeles.
        let case = case_at("C-1", "2024-03-02T03:00:00Z");

        let mut utc = Warehouse::in_memory().unwrap();
        utc.load(&[], &[case.clone()], chrono_tz::UTC).unwrap();
        let day: String = utc
            .conn()
            .query_row("SELECT created_day FROM cases", [], |row| row.get(0))
            .unwrap();
        assert_eq!(day, "2024-03-02");

        let mut la = Warehouse::in_memory().unwrap();
        la.load(&[], &[case], chrono_tz::America::Los_Angeles)
            .unwrap();
        let day: String = la
            .conn()
            .query_row("SELECT created_day FROM cases", [], |row| row.get(0))
            .unwrap();
        assert_eq!(day, "2024-03-01");
    }

    #[test]
    fn resolution_days_column_matches_the_record() {
        let mut case = case_at("C-1", "2024-03-01T00:00:00Z");
        case.status = Status::Closed;
        case.closed_at = Some(Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap());

        let mut wh = Warehouse::in_memory().unwrap();
        wh.load(&[], &[case], chrono_tz::UTC).unwrap();
        let days: f64 = wh
            .conn()
            .query_row("SELECT resolution_days FROM cases", [], |row| row.get(0))
            .unwrap();
        assert!((days - 2.5).abs() < 1e-9);
    }
}
