//! Output formatters: console summary, JSON and CSV

use crate::config::OutputFormat;
use crate::error::{Result, ScreenerError};
use crate::output::report::{to_csv, to_table, BatchReport, MatchResult, RunStatus, ScoreTable};
use crate::processing::scorer::Recommendation;
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<Vec<u8>>;
    fn supports_format(&self) -> OutputFormat;
}

/// Per-resume lines followed by a summary table.
pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
    model_name: String,
}

pub struct CsvFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    model: &'a str,
    #[serde(flatten)]
    report: &'a BatchReport,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn recommendation_color(recommendation: Recommendation) -> Color {
        match recommendation {
            Recommendation::StrongHire => Color::Green,
            Recommendation::Maybe => Color::Yellow,
            Recommendation::No => Color::Red,
            Recommendation::Error => Color::BrightRed,
        }
    }

    fn format_result(&self, index: usize, result: &MatchResult) -> String {
        let label = self.colorize(
            result.recommendation.label(),
            Self::recommendation_color(result.recommendation),
        );
        match (result.score_percent, &result.error_message) {
            (Some(score), _) => format!(
                "{:>3}. {}\n     Match Score: {:.2}%  Recommendation: {}\n",
                index + 1,
                result.document_name,
                score,
                label
            ),
            (None, message) => format!(
                "{:>3}. {}\n     {}: {}\n",
                index + 1,
                result.document_name,
                label,
                message.as_deref().unwrap_or("unknown failure")
            ),
        }
    }

    /// Render a score table; also used to re-display a saved CSV export.
    pub fn format_table(&self, table: &ScoreTable) -> String {
        let name_width = table
            .rows
            .iter()
            .map(|row| row.file_name.chars().count())
            .chain(std::iter::once(table.columns()[0].len()))
            .max()
            .unwrap_or_default();

        let columns = table.columns();
        let mut output = format!(
            "{:<name_width$}  {:>17}  {}\n",
            columns[0],
            columns[1],
            columns[2],
            name_width = name_width
        );
        output.push_str(&format!("{}\n", "-".repeat(name_width + 2 + 17 + 2 + 14)));

        for row in &table.rows {
            let score = row
                .match_score_percent
                .map(|s| format!("{:.2}", s))
                .unwrap_or_default();
            let label = self.colorize(
                row.recommendation.label(),
                Self::recommendation_color(row.recommendation),
            );
            output.push_str(&format!(
                "{:<name_width$}  {:>17}  {}\n",
                row.file_name,
                score,
                label,
                name_width = name_width
            ));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<Vec<u8>> {
        let mut output = String::new();

        output.push_str(&self.colorize("\nResume Screening Results\n\n", Color::Blue));
        for (index, result) in report.results.iter().enumerate() {
            output.push_str(&self.format_result(index, result));
        }

        output.push_str(&self.colorize("\nSummary\n", Color::Blue));
        output.push_str(&self.format_table(&to_table(report)));

        let counts = report.band_counts();
        output.push_str(&format!(
            "\nStrong Hire: {}  Maybe: {}  No: {}  Error: {}\n",
            counts.strong_hire, counts.maybe, counts.no, counts.error
        ));

        if let RunStatus::Cancelled { unprocessed } = &report.status {
            output.push_str(&self.colorize(
                &format!("\nCancelled: {} resume(s) not processed\n", unprocessed.len()),
                Color::Yellow,
            ));
            for name in unprocessed {
                output.push_str(&format!("  - {}\n", name));
            }
        }

        Ok(output.into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool, model_name: impl Into<String>) -> Self {
        Self {
            pretty,
            model_name: model_name.into(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<Vec<u8>> {
        let document = JsonReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            model: &self.model_name,
            report,
        };
        let json = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<Vec<u8>> {
        to_csv(&to_table(report))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

/// Picks the formatter for an output format.
pub fn formatter_for(format: OutputFormat, use_colors: bool, model_name: &str) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true, model_name)),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(ScreenerError::InvalidInput(format!(
            "Invalid output format: {}. Supported: console, json, csv",
            format
        ))),
    }
}

pub fn save_report_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
