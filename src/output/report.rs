//! Batch results, the score table, and CSV export

use crate::error::{DocumentError, Result, ScreenerError};
use crate::processing::scorer::{Recommendation, ScoreFragment};
use serde::{Deserialize, Serialize};

/// File name offered for the CSV download
pub const CSV_FILE_NAME: &str = "resume_scores.csv";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const CSV_HEADERS: [&str; 3] = ["FileName", "MatchScorePercent", "Recommendation"];

/// Outcome for one document of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub document_name: String,
    pub score_percent: Option<f64>,
    pub recommendation: Recommendation,
    pub error_message: Option<String>,
}

impl MatchResult {
    pub fn scored(document_name: impl Into<String>, fragment: ScoreFragment) -> Self {
        Self {
            document_name: document_name.into(),
            score_percent: Some(fragment.score_percent),
            recommendation: fragment.recommendation,
            error_message: None,
        }
    }

    pub fn failed(document_name: impl Into<String>, error: &DocumentError) -> Self {
        Self {
            document_name: document_name.into(),
            score_percent: None,
            recommendation: Recommendation::Error,
            error_message: Some(error.to_string()),
        }
    }

    pub fn from_outcome(
        document_name: impl Into<String>,
        outcome: std::result::Result<ScoreFragment, DocumentError>,
    ) -> Self {
        match outcome {
            Ok(fragment) => Self::scored(document_name, fragment),
            Err(error) => Self::failed(document_name, &error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.recommendation == Recommendation::Error
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    /// The run was stopped; these documents, in upload order, have no result
    Cancelled { unprocessed: Vec<String> },
}

/// Results of one batch run, in upload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<MatchResult>,
    pub status: RunStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub strong_hire: usize,
    pub maybe: usize,
    pub no: usize,
    pub error: usize,
}

impl BatchReport {
    pub fn completed(results: Vec<MatchResult>) -> Self {
        Self {
            results,
            status: RunStatus::Completed,
        }
    }

    pub fn cancelled(results: Vec<MatchResult>, unprocessed: Vec<String>) -> Self {
        Self {
            results,
            status: RunStatus::Cancelled { unprocessed },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn band_counts(&self) -> BandCounts {
        self.results.iter().fold(BandCounts::default(), |mut counts, result| {
            match result.recommendation {
                Recommendation::StrongHire => counts.strong_hire += 1,
                Recommendation::Maybe => counts.maybe += 1,
                Recommendation::No => counts.no += 1,
                Recommendation::Error => counts.error += 1,
            }
            counts
        })
    }
}

/// One row of the exported table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "MatchScorePercent")]
    pub match_score_percent: Option<f64>,
    #[serde(rename = "Recommendation")]
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreTable {
    pub rows: Vec<ScoreRow>,
}

impl ScoreTable {
    pub fn columns(&self) -> &'static [&'static str] {
        &CSV_HEADERS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flatten a report into table rows, keeping report order.
pub fn to_table(report: &BatchReport) -> ScoreTable {
    let rows = report
        .results
        .iter()
        .map(|result| ScoreRow {
            file_name: result.document_name.clone(),
            match_score_percent: result.score_percent,
            recommendation: result.recommendation,
        })
        .collect();
    ScoreTable { rows }
}

/// UTF-8 CSV with a header row; the score cell is blank for error rows.
pub fn to_csv(table: &ScoreTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for row in &table.rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ScreenerError::OutputFormatting(format!("Failed to flush CSV: {}", e)))
}

/// Parse a CSV export back into a table.
pub fn from_csv(bytes: &[u8]) -> Result<ScoreTable> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().ne(CSV_HEADERS.iter().copied()) {
        return Err(ScreenerError::InvalidInput(format!(
            "Unexpected CSV header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let rows = reader
        .deserialize::<ScoreRow>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    Ok(ScoreTable { rows })
}
