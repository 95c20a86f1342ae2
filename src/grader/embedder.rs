//! Sentence-embedding backends for the answer grader.

use anyhow::{Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::config::EmbeddingConfig;

/// Turns text into fixed-length vectors. Implementations must be safe to share
/// between requests; the server holds exactly one for its whole lifetime.
pub trait Embedder: Send + Sync {
    /// Embed every input, returning one vector per text in the same order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// Local ONNX sentence-embedding model run through `fastembed`.
pub struct FastEmbedder {
    model: TextEmbedding,
    name: String,
}

impl FastEmbedder {
    /// Loads (downloading on first use) the configured model.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let kind = model_from_name(&config.model)?;

        let mut options = InitOptions::new(kind).with_show_download_progress(config.show_download_progress);
        if let Some(ref dir) = config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        info!("Loading sentence-embedding model {}", config.model);
        let model = TextEmbedding::try_new(options)
            .with_context(|| format!("Failed to load embedding model '{}'", config.model))?;

        Ok(FastEmbedder {
            model,
            name: config.model.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.model
            .embed(texts.to_vec(), None)
            .with_context(|| format!("Embedding model '{}' failed", self.name))
    }
}

/// Maps the configured model name onto the models `fastembed` ships.
pub fn model_from_name(name: &str) -> Result<EmbeddingModel> {
    match name.trim().to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" | "sentence-transformers/all-minilm-l12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        other => anyhow::bail!(
            "Unsupported embedding model '{}'. Must be one of: all-MiniLM-L6-v2, all-MiniLM-L12-v2, bge-small-en-v1.5",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_name() {
        assert!(matches!(model_from_name("all-MiniLM-L6-v2"), Ok(EmbeddingModel::AllMiniLML6V2)));
        assert!(matches!(
            model_from_name("sentence-transformers/all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(model_from_name(" BGE-small-en-v1.5 "), Ok(EmbeddingModel::BGESmallENV15)));
        assert!(model_from_name("word2vec").is_err());
    }
}
