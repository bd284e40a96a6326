//! Embedding, scoring and batch orchestration

pub mod embeddings;
pub mod embedding_manager;
pub mod scorer;
pub mod batch;

pub use batch::{BatchOrchestrator, BatchProgress, CancelHandle, ProgressSink};
pub use embeddings::{CachedProvider, Embedding, EmbeddingProvider, StaticModelProvider};
pub use scorer::{Recommendation, SimilarityScorer, Thresholds};
