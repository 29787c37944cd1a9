use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, ChunkMetadata, DocumentChunk, DomainError, Embedding, SearchResult,
};
use crate::infrastructure::config::VectorStoreConfig;

/// Persistent index backed by a Qdrant collection. Points are keyed by the
/// chunk UUID and carry the chunk text in their payload.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;
        tracing::info!(collection, dimension, "qdrant collection ready");

        Ok(store)
    }

    pub async fn from_config(
        config: &VectorStoreConfig,
        dimension: usize,
    ) -> Result<Self, DomainError> {
        Self::new(&config.url, &config.collection, dimension).await
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        Ok(())
    }

    fn chunk_from_payload(payload: &HashMap<String, QdrantValue>) -> Option<DocumentChunk> {
        let chunk_id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
        let document_id: Uuid = payload.get("document_id")?.as_str()?.parse().ok()?;
        let content = payload.get("content")?.as_str()?.to_string();
        let chunk_index = usize::try_from(payload.get("chunk_index")?.as_integer()?).ok()?;
        let page = payload
            .get("page")
            .and_then(QdrantValue::as_integer)
            .and_then(|p| usize::try_from(p).ok());

        Some(DocumentChunk {
            id: chunk_id,
            document_id,
            content,
            chunk_index,
            metadata: ChunkMetadata { page },
        })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, chunk: &DocumentChunk, embedding: &Embedding) -> Result<(), DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::validation(format!(
                "embedding has {} dimensions, collection expects {}",
                embedding.dimension(),
                self.dimension
            )));
        }

        let payload: Payload = serde_json::json!({
            "chunk_id": chunk.id.to_string(),
            "document_id": chunk.document_id.to_string(),
            "content": chunk.content,
            "chunk_index": chunk.chunk_index,
            "page": chunk.metadata.page,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let point = PointStruct::new(chunk.id.to_string(), embedding.as_slice().to_vec(), payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|point| {
                Self::chunk_from_payload(&point.payload).map(|chunk| SearchResult {
                    chunk,
                    score: point.score,
                })
            })
            .collect())
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError> {
        let filter = Filter::must([Condition::matches("document_id", document_id.to_string())]);

        self.client
            .delete_points(DeletePointsBuilder::new(&self.collection).points(filter).wait(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        tracing::debug!(%document_id, "removed document vectors");
        Ok(())
    }
}
