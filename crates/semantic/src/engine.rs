//! The narrow Embedding Engine contract: `encode(text) -> float32[D]`.
//!
//! [`Embedder`] wraps [`crate::semanticize`]/[`crate::semanticize_batch`] (which
//! already implement the ONNX/API/stub tiers and the fallback-to-stub
//! resilience behavior) and adds the one thing the core spec requires that
//! the underlying pipeline doesn't enforce on its own: every vector it
//! returns must have exactly [`crate::EMBEDDING_DIM`] components. A model
//! that disagrees is a configuration error surfaced at the first `encode`
//! call, not silently truncated or padded.

use crate::{semanticize, semanticize_batch, SemanticConfig, SemanticError, EMBEDDING_DIM};

/// Deterministic text -> fixed-dimension vector engine.
#[derive(Debug, Clone)]
pub struct Embedder {
    config: SemanticConfig,
}

impl Embedder {
    pub fn new(config: SemanticConfig) -> Self {
        Embedder { config }
    }

    /// Encode a single text into a fixed-width vector.
    pub async fn encode(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let embedding = semanticize("encode", text, &self.config).await?;
        check_dim(embedding.vector.len())?;
        Ok(embedding.vector)
    }

    /// Encode a batch, preserving input order.
    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let docs: Vec<(String, String)> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| (format!("batch-{i}"), t.clone()))
            .collect();
        let embeddings = semanticize_batch(&docs, &self.config).await?;
        let mut vectors = Vec::with_capacity(embeddings.len());
        for e in embeddings {
            check_dim(e.vector.len())?;
            vectors.push(e.vector);
        }
        Ok(vectors)
    }
}

fn check_dim(got: usize) -> Result<(), SemanticError> {
    if got != EMBEDDING_DIM {
        return Err(SemanticError::DimensionMismatch {
            expected: EMBEDDING_DIM,
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_tier_encodes_to_fixed_dimension() {
        let embedder = Embedder::new(SemanticConfig {
            tier: "fast".into(),
            ..SemanticConfig::default()
        });
        let v = embedder.encode("hello world").await.expect("encodes");
        assert_eq!(v.len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn same_text_encodes_deterministically() {
        let embedder = Embedder::new(SemanticConfig {
            tier: "fast".into(),
            ..SemanticConfig::default()
        });
        let a = embedder.encode("same text").await.unwrap();
        let b = embedder.encode("same text").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let embedder = Embedder::new(SemanticConfig {
            tier: "fast".into(),
            ..SemanticConfig::default()
        });
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = embedder.encode_batch(&texts).await.unwrap();
        let alpha = embedder.encode("alpha").await.unwrap();
        let beta = embedder.encode("beta").await.unwrap();
        assert_eq!(batch[0], alpha);
        assert_eq!(batch[1], beta);
    }
}
