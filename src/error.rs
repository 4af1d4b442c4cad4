//! Error taxonomy for the pipeline.
//!
//! Load, schema, and export failures abort the run; render failures are scoped
//! to a single chart and only downgrade the output.

use std::path::PathBuf;

use thiserror::Error;

/// Input file could not be read or is not valid JSON.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid JSON array of records: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A record is missing a required field or carries a malformed value.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{record}: missing required field `{field}`")]
    MissingField { record: String, field: &'static str },

    #[error("{record}: unparsable {field} value `{value}`")]
    BadDate {
        record: String,
        field: &'static str,
        value: String,
    },

    #[error("case {case_id}: case_closed_date {closed} is earlier than case_created_date {created}")]
    ClosedBeforeCreated {
        case_id: String,
        created: String,
        closed: String,
    },
}

/// KPI tables or the report could not be written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot stage {name}: {source}")]
    Stage {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot finalize {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single chart failed to render. Never aborts the run.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no data to plot for {0}")]
    NoData(&'static str),

    #[error("drawing failed: {0}")]
    Draw(String),
}

impl RenderError {
    pub(crate) fn draw(err: impl std::fmt::Display) -> Self {
        RenderError::Draw(err.to_string())
    }
}

/// Umbrella error for one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Export(#[from] ExportError),

    // KPI queries run against an in-memory database we control, so a SQL
    // failure means a bug, not bad input.
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}
