//! Schema normalizer: raw records in, typed records out.
//!
//! Dates are parsed into UTC timestamps (RFC 3339, `YYYY-MM-DD HH:MM:SS`, or
//! bare `YYYY-MM-DD`; naive timestamps are taken as UTC). Missing or
//! unrecognized categorical values become the `"Unknown"` sentinel so every
//! grouping key stays total. A missing id or an unparsable date fails the run
//! with a [`SchemaError`] naming the record, as does a closure timestamp that
//! precedes creation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::SchemaError;
use crate::types::{Account, Case, Priority, RawAccount, RawCase, Status, UNKNOWN};

pub fn normalize_accounts(raw: Vec<RawAccount>) -> Result<Vec<Account>, SchemaError> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let id = required_id(record.account_sfid, "account", idx, "account_sfid")?;
            Ok(Account {
                id,
                name: categorical(record.account_name),
                industry: categorical(record.account_industry),
                country: categorical(record.account_country),
                tier: categorical(record.account_tier),
            })
        })
        .collect()
}

pub fn normalize_cases(raw: Vec<RawCase>) -> Result<Vec<Case>, SchemaError> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let id = required_id(record.case_sfid, "case", idx, "case_sfid")?;

            let created_raw = record.case_created_date.ok_or_else(|| {
                SchemaError::MissingField {
                    record: format!("case {id}"),
                    field: "case_created_date",
                }
            })?;
            let created_at = parse_timestamp(&created_raw).ok_or_else(|| SchemaError::BadDate {
                record: format!("case {id}"),
                field: "case_created_date",
                value: created_raw.clone(),
            })?;

            let closed_at = match record.case_closed_date.filter(|s| !s.trim().is_empty()) {
                Some(closed_raw) => {
                    let closed = parse_timestamp(&closed_raw).ok_or_else(|| SchemaError::BadDate {
                        record: format!("case {id}"),
                        field: "case_closed_date",
                        value: closed_raw.clone(),
                    })?;
                    if closed < created_at {
                        return Err(SchemaError::ClosedBeforeCreated {
                            case_id: id,
                            created: created_at.to_rfc3339(),
                            closed: closed.to_rfc3339(),
                        });
                    }
                    Some(closed)
                }
                None => None,
            };

            Ok(Case {
                account_id: record
                    .account_sfid
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                priority: Priority::parse(record.case_priority.as_deref()),
                status: Status::parse(record.case_status.as_deref()),
                created_at,
                closed_at,
                id,
            })
        })
        .collect()
}

fn required_id(
    value: Option<String>,
    table: &str,
    index: usize,
    field: &'static str,
) -> Result<String, SchemaError> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| SchemaError::MissingField {
            record: format!("{table} #{index}"),
            field,
        })
}

fn categorical(value: Option<String>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}
