//! CLI interface for the resume screener

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Semantic resume screening against a job description")]
#[command(long_about = "Score PDF and DOCX resumes against a job description by embedding similarity, and export the results as CSV")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score resumes against a job description
    Screen {
        /// Resume files (PDF, DOCX), reported in the given order
        #[arg(required = true)]
        resumes: Vec<PathBuf>,

        /// Job description file (TXT, MD)
        #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Embedding model id, repo id or local path
        #[arg(short, long)]
        embedding: Option<String>,

        /// Output format: console, json, csv
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file. CSV output is always saved, by default to resume_scores.csv
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Maximum resumes processed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Display a saved CSV export
    Report {
        /// Path to a CSV file written by `screen`
        csv: PathBuf,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model id, name or Hugging Face repo id
        model: String,
    },

    /// Show model information
    Info {
        /// Model id
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Validate file extension
pub fn validate_file_extension(path: &PathBuf, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
