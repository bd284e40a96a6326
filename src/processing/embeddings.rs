//! Embedding providers: the model behind semantic scoring

use crate::error::{Result, ScoringError};
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;

/// A fixed-dimension vector for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Euclidean norm, accumulated in f64.
    pub fn magnitude(&self) -> f64 {
        self.vector
            .iter()
            .map(|x| (*x as f64) * (*x as f64))
            .sum::<f64>()
            .sqrt()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl From<ProviderError> for ScoringError {
    fn from(err: ProviderError) -> Self {
        ScoringError::ProviderFailure(err.0)
    }
}

/// Maps text to an embedding. Implementations must be deterministic for a
/// given model and input, and safe to call from several workers at once.
pub trait EmbeddingProvider: Send + Sync {
    fn encode(&self, text: &str) -> std::result::Result<Embedding, ProviderError>;

    fn model_name(&self) -> &str;
}

/// Model2Vec static embeddings, loaded once and shared for a whole run.
pub struct StaticModelProvider {
    model: StaticModel,
    model_name: String,
}

impl StaticModelProvider {
    /// Load from a local model directory or a Hugging Face repo id.
    pub fn load(repo_or_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", repo_or_path.display());

        let model = StaticModel::from_pretrained(
            repo_or_path,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        info!("Model loaded in {:.2?}", start_time.elapsed());
        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }
}

impl EmbeddingProvider for StaticModelProvider {
    fn encode(&self, text: &str) -> std::result::Result<Embedding, ProviderError> {
        let vector = self.model.encode_single(text);
        if vector.is_empty() {
            return Err(ProviderError(format!(
                "model {} returned an empty embedding",
                self.model_name
            )));
        }
        Ok(Embedding::new(vector))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub cache_size: usize,
    pub hits: usize,
    pub misses: usize,
    pub model_name: String,
}

/// Memoizes embeddings by text, so the job description is encoded once per run.
pub struct CachedProvider<P> {
    inner: P,
    cache: RwLock<HashMap<String, Embedding>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<P: EmbeddingProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            cache_size: self.cache.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            model_name: self.inner.model_name().to_string(),
        }
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedProvider<P> {
    fn encode(&self, text: &str) -> std::result::Result<Embedding, ProviderError> {
        if let Some(cached) = self.cache.read().get(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let embedding = self.inner.encode(text)?;
        debug!("Cached embedding for {} chars of text", text.len());
        self.cache.write().insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
