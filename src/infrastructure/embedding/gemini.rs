use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::gemini;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// Gemini embedding model reached through rig. Reads `GEMINI_API_KEY`.
pub struct GeminiEmbedding {
    client: gemini::Client,
    model: String,
    dimension: usize,
}

impl GeminiEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }

    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        let model = self.client.embedding_model(&self.model);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(text.to_string())
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        let embeddings = builder
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(embeddings
            .into_iter()
            .map(|(_doc, emb)| Embedding::from(emb.first().vec))
            .collect())
    }
}

#[async_trait]
impl EmbeddingService for GeminiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_texts(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embed_texts(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(DomainError::external(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
