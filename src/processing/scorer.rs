//! Semantic similarity scoring and hiring recommendations

use crate::error::ScoringError;
use crate::processing::embeddings::{Embedding, EmbeddingProvider};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation band for one resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Hire")]
    StrongHire,
    Maybe,
    No,
    Error,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongHire => "Strong Hire",
            Recommendation::Maybe => "Maybe",
            Recommendation::No => "No",
            Recommendation::Error => "Error",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive lower bounds, in percent, of the StrongHire and Maybe bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub strong_hire: f64,
    pub maybe: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            strong_hire: 75.0,
            maybe: 50.0,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, score_percent: f64) -> Recommendation {
        if score_percent >= self.strong_hire {
            Recommendation::StrongHire
        } else if score_percent >= self.maybe {
            Recommendation::Maybe
        } else {
            Recommendation::No
        }
    }
}

/// Score and band for one resume, before it is attached to a document name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreFragment {
    pub score_percent: f64,
    pub recommendation: Recommendation,
}

/// Cosine similarity in `[-1, 1]`. Undefined, and an error, for a zero vector.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Result<f64, ScoringError> {
    if a.dimension() != b.dimension() {
        return Err(ScoringError::ProviderFailure(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.dimension(),
            b.dimension()
        )));
    }

    let dot_product: f64 = a
        .vector
        .iter()
        .zip(b.vector.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    let norm_a = a.magnitude();
    let norm_b = b.magnitude();

    if !dot_product.is_finite() || !norm_a.is_finite() || !norm_b.is_finite() {
        return Err(ScoringError::ProviderFailure(
            "embedding contains non-finite values".to_string(),
        ));
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(ScoringError::DegenerateInput);
    }

    Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// `similarity * 100` rounded to two decimals. Negative similarity stays negative.
pub fn to_score_percent(similarity: f64) -> f64 {
    (similarity * 100.0 * 100.0).round() / 100.0
}

pub struct SimilarityScorer {
    thresholds: Thresholds,
}

impl SimilarityScorer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn score(
        &self,
        resume_text: &str,
        job_text: &str,
        provider: &dyn EmbeddingProvider,
    ) -> Result<ScoreFragment, ScoringError> {
        let resume_embedding = provider.encode(resume_text)?;
        let job_embedding = provider.encode(job_text)?;
        self.score_embeddings(&resume_embedding, &job_embedding)
    }

    pub fn score_embeddings(
        &self,
        resume_embedding: &Embedding,
        job_embedding: &Embedding,
    ) -> Result<ScoreFragment, ScoringError> {
        let similarity = cosine_similarity(resume_embedding, job_embedding)?;
        let score_percent = to_score_percent(similarity);
        Ok(ScoreFragment {
            score_percent,
            recommendation: self.thresholds.classify(score_percent),
        })
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
