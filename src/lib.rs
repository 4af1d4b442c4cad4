//! caselens: batch analytics over support cases and customer accounts.
//!
//! The pipeline loads two JSON exports, normalizes them, aggregates five KPI
//! tables through an in-memory SQLite database, exports them as CSV, renders
//! charts, and writes a narrative Markdown report:
//!
//! ```text
//! loader → normalize → warehouse → kpis → { export, charts } → report
//! ```
//!
//! Each stage is a pure transformation over the previous stage's immutable
//! output; the whole run is single-threaded and recomputes from scratch.

pub mod charts;
pub mod config;
pub mod error;
pub mod export;
pub mod kpis;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod warehouse;

pub use config::Config;
pub use error::{ExportError, LoadError, PipelineError, RenderError, SchemaError};
pub use kpis::KpiSet;
pub use pipeline::{run, RunSummary};
