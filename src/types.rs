//! Record types for the two source datasets.
//!
//! Raw structs mirror the JSON exports field-for-field (every field optional so
//! the normalizer can reject bad records by name instead of failing inside
//! serde). Normalized structs carry canonical types: parsed UTC timestamps and
//! total categorical enums where anything unrecognized maps to `Unknown`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Sentinel for missing or unrecognized categorical values.
///
/// Grouping keys stay total: a case never drops out of a KPI table because its
/// industry or country was absent.
pub const UNKNOWN: &str = "Unknown";

/// An account record as it appears in the accounts JSON export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccount {
    pub account_sfid: Option<String>,
    pub account_name: Option<String>,
    pub account_industry: Option<String>,
    pub account_country: Option<String>,
    pub account_tier: Option<String>,
}

/// A support case record as it appears in the cases JSON export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCase {
    pub case_sfid: Option<String>,
    pub account_sfid: Option<String>,
    pub case_priority: Option<String>,
    pub case_status: Option<String>,
    pub case_created_date: Option<String>,
    pub case_closed_date: Option<String>,
}

/// Case priority. `Unknown` absorbs unrecognized input so the
/// priority × status partition stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
    Unknown,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
        Priority::Unknown,
    ];

    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("low") => Priority::Low,
            Some("medium") => Priority::Medium,
            Some("high") => Priority::High,
            Some("urgent") => Priority::Urgent,
            _ => Priority::Unknown,
        }
    }

    /// Canonical sort rank, used for every ordered output.
    pub fn rank(self) -> i64 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
            Priority::Unknown => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
            Priority::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case status, same totality rule as [`Priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Open,
    Pending,
    Closed,
    Unknown,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Open, Status::Pending, Status::Closed, Status::Unknown];

    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("open") => Status::Open,
            Some("pending") => Status::Pending,
            Some("closed") => Status::Closed,
            _ => Status::Unknown,
        }
    }

    pub fn rank(self) -> i64 {
        match self {
            Status::Open => 0,
            Status::Pending => 1,
            Status::Closed => 2,
            Status::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Pending => "Pending",
            Status::Closed => "Closed",
            Status::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub country: String,
    pub tier: String,
}

/// A normalized support case.
#[derive(Debug, Clone)]
pub struct Case {
    pub id: String,
    /// Referenced account id, `"Unknown"` when the export carried none.
    pub account_id: String,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    /// None while the case is still open.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Case {
    /// Elapsed days between creation and closure; None for open cases.
    pub fn resolution_days(&self) -> Option<f64> {
        self.closed_at
            .map(|closed| (closed - self.created_at).num_seconds() as f64 / 86_400.0)
    }
}
