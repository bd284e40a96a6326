//! Batch orchestration: extract and score every resume against one job description

use crate::config::Config;
use crate::error::{DocumentError, Result, ScreenerError};
use crate::input::document::{Document, JobDescription};
use crate::input::text_extractor::DocumentExtractor;
use crate::output::report::{BatchReport, MatchResult};
use crate::processing::embeddings::EmbeddingProvider;
use crate::processing::scorer::{ScoreFragment, SimilarityScorer};
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Emitted once per finished document, in upload order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub document_name: String,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &BatchProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &BatchProgress) {
        self(progress)
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _progress: &BatchProgress) {}
}

/// Cooperative cancellation for a running batch. Clones share state.
#[derive(Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so this only returns once cancelled
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects a batch that must not start: no documents or a blank job description.
pub fn validate_batch_input(documents: &[Document], job: &JobDescription) -> Result<()> {
    if documents.is_empty() {
        return Err(ScreenerError::InvalidInput(
            "Upload at least 1 resume".to_string(),
        ));
    }
    if job.is_blank() {
        return Err(ScreenerError::InvalidInput(
            "Enter a job description".to_string(),
        ));
    }
    Ok(())
}

pub struct BatchOrchestrator {
    extractor: Arc<DocumentExtractor>,
    scorer: Arc<SimilarityScorer>,
    provider: Arc<dyn EmbeddingProvider>,
    max_concurrency: usize,
}

impl BatchOrchestrator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            extractor: Arc::new(DocumentExtractor::new()),
            scorer: Arc::new(SimilarityScorer::default()),
            provider,
            max_concurrency: 1,
        }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(provider)
            .with_scorer(SimilarityScorer::new(config.thresholds()))
            .with_max_concurrency(config.processing.max_concurrency)
    }

    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn run(&self, documents: Vec<Document>, job: JobDescription) -> Result<BatchReport> {
        self.run_with(documents, job, &NoProgress, &CancelHandle::new())
            .await
    }

    /// Score every document. Per-document failures become error rows;
    /// only a precondition violation fails the whole run.
    pub async fn run_with(
        &self,
        documents: Vec<Document>,
        job: JobDescription,
        progress: &dyn ProgressSink,
        cancel: &CancelHandle,
    ) -> Result<BatchReport> {
        validate_batch_input(&documents, &job)?;

        let start_time = Instant::now();
        let total = documents.len();
        let names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
        info!(
            "Screening {} resume(s) with {} (concurrency {})",
            total,
            self.provider.model_name(),
            self.max_concurrency
        );

        let job = Arc::new(job);
        // `buffered` yields in submission order, whatever order workers finish in
        let mut outcomes = stream::iter(documents)
            .map(|document| self.process_document(document, Arc::clone(&job)))
            .buffered(self.max_concurrency);

        let mut results: Vec<MatchResult> = Vec::with_capacity(total);
        let mut cancelled = cancel.is_cancelled();

        while !cancelled {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                }
                next = outcomes.next() => {
                    let Some(result) = next else { break };
                    results.push(result);
                    progress.on_progress(&BatchProgress {
                        completed: results.len(),
                        total,
                        document_name: names[results.len() - 1].clone(),
                    });
                }
            }
        }

        if cancelled {
            let unprocessed = names[results.len()..].to_vec();
            warn!(
                "Screening cancelled after {} of {} resume(s)",
                results.len(),
                total
            );
            return Ok(BatchReport::cancelled(results, unprocessed));
        }

        info!(
            "Screened {} resume(s) in {:.2?}",
            results.len(),
            start_time.elapsed()
        );
        Ok(BatchReport::completed(results))
    }

    async fn process_document(&self, document: Document, job: Arc<JobDescription>) -> MatchResult {
        let name = document.name.clone();
        let extractor = Arc::clone(&self.extractor);
        let scorer = Arc::clone(&self.scorer);
        let provider = Arc::clone(&self.provider);

        let outcome = tokio::task::spawn_blocking(move || {
            score_document(&extractor, &scorer, provider.as_ref(), &document, &job)
        })
        .await
        .unwrap_or_else(|e| Err(DocumentError::Worker(e.to_string())));

        match &outcome {
            Ok(fragment) => debug!(
                "{}: {:.2}% ({})",
                name, fragment.score_percent, fragment.recommendation
            ),
            Err(e) => warn!("Failed to process {}: {}", name, e),
        }
        MatchResult::from_outcome(name, outcome)
    }
}

fn score_document(
    extractor: &DocumentExtractor,
    scorer: &SimilarityScorer,
    provider: &dyn EmbeddingProvider,
    document: &Document,
    job: &JobDescription,
) -> std::result::Result<ScoreFragment, DocumentError> {
    let extracted = extractor.extract(document)?;
    let fragment = scorer.score(&extracted.text, &job.text, provider)?;
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::document::DocumentFormat;
    use crate::processing::embeddings::{Embedding, ProviderError};
    use crate::processing::scorer::Recommendation;
    use parking_lot::Mutex;

    // Extraction of real PDF/DOCX files is covered by tests/integration_tests.rs
    struct ConstantProvider;

    impl EmbeddingProvider for ConstantProvider {
        fn encode(&self, _text: &str) -> std::result::Result<Embedding, ProviderError> {
            Ok(Embedding::new(vec![1.0, 0.0]))
        }

        fn model_name(&self) -> &str {
            "constant"
        }
    }

    fn unsupported(name: &str) -> Document {
        Document::new(name, DocumentFormat::Unknown("txt".to_string()), b"text".to_vec())
    }

    fn orchestrator() -> BatchOrchestrator {
        BatchOrchestrator::new(Arc::new(ConstantProvider)).with_max_concurrency(2)
    }

    #[test]
    fn test_progress_fraction() {
        let progress = BatchProgress {
            completed: 1,
            total: 4,
            document_name: "a.pdf".to_string(),
        };
        assert_eq!(progress.fraction(), 0.25);
    }

    #[test]
    fn test_validate_batch_input() {
        let job = JobDescription::new("Rust engineer");
        assert!(matches!(
            validate_batch_input(&[], &job),
            Err(ScreenerError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_batch_input(&[unsupported("a.txt")], &JobDescription::new("   ")),
            Err(ScreenerError::InvalidInput(_))
        ));
        assert!(validate_batch_input(&[unsupported("a.txt")], &job).is_ok());
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let result = orchestrator()
            .run(Vec::new(), JobDescription::new("Rust engineer"))
            .await;
        assert!(matches!(result, Err(ScreenerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_failures_become_error_rows() {
        let documents = vec![unsupported("a.txt"), unsupported("b.txt")];
        let report = orchestrator()
            .run(documents, JobDescription::new("Rust engineer"))
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.results.len(), 2);
        for result in &report.results {
            assert_eq!(result.recommendation, Recommendation::Error);
            assert_eq!(result.score_percent, None);
            assert!(result.error_message.as_deref().unwrap().contains("unsupported"));
        }
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let documents: Vec<Document> = (0..5).map(|i| unsupported(&format!("{}.txt", i))).collect();
        let seen = Mutex::new(Vec::new());
        let sink = |p: &BatchProgress| seen.lock().push((p.fraction(), p.document_name.clone()));

        orchestrator()
            .run_with(documents, JobDescription::new("Rust engineer"), &sink, &CancelHandle::new())
            .await
            .unwrap();

        let seen = seen.into_inner();
        let fractions: Vec<f64> = seen.iter().map(|(f, _)| *f).collect();
        assert_eq!(fractions, vec![0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(seen[3].1, "3.txt");
    }

    #[tokio::test]
    async fn test_cancelled_before_start_keeps_every_name() {
        let cancel = CancelHandle::new();
        cancel.cancel();
        assert!(cancel.is_cancelled());

        let documents = vec![unsupported("a.txt"), unsupported("b.txt")];
        let report = orchestrator()
            .run_with(documents, JobDescription::new("Rust engineer"), &NoProgress, &cancel)
            .await
            .unwrap();

        assert!(report.results.is_empty());
        assert_eq!(
            report.status,
            crate::output::report::RunStatus::Cancelled {
                unprocessed: vec!["a.txt".to_string(), "b.txt".to_string()],
            }
        );
    }
}
