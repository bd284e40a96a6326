//! Result aggregation and output formatting

pub mod formatter;
pub mod report;

pub use report::{from_csv, to_csv, to_table, BatchReport, MatchResult, RunStatus, ScoreTable};
