//! Resume screener library
//!
//! Scores resumes (PDF or DOCX) against a job description by the cosine
//! similarity of their embeddings, and exports the results, in upload
//! order, as a CSV table.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod output;

pub use error::{Result, ScreenerError};
pub use config::Config;
