//! The pluggable vector store abstraction (spec.md §1, §4.2): `upsert`,
//! `ann_search`, and `delete_collection`. Production deployments wire in a
//! real ANN service (Qdrant, grounded on the teacher's
//! `cortex-semantic::qdrant` client usage); tests and local runs use the
//! in-memory linear-scan implementation below.

use async_trait::async_trait;
use dashmap::DashMap;
use kato_core::error::{KatoError, Result};
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single nearest-neighbour hit: the symbol name stored alongside the
/// vector, and its distance/score from the query.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighbourHit {
    pub name: String,
    pub score: f32,
}

/// Async trait every vector backend implements. Calls may suspend on I/O
/// (spec.md §5): `upsert` and `ann_search` are the two suspension points
/// the Vector Quantizer hits.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite a vector under `name` in `collection`.
    async fn upsert(&self, collection: &str, name: &str, vector: &[f64]) -> Result<()>;

    /// Insert or overwrite a batch of vectors in one round trip.
    async fn upsert_batch(&self, collection: &str, items: &[(String, Vec<f64>)]) -> Result<()> {
        for (name, vector) in items {
            self.upsert(collection, name, vector).await?;
        }
        Ok(())
    }

    /// Return up to `k` nearest neighbours of `query` in `collection`,
    /// ordered closest-first.
    async fn ann_search(&self, collection: &str, query: &[f64], k: usize) -> Result<Vec<NeighbourHit>>;

    /// Drop the entire named collection. Called when a processor/node is
    /// deleted (spec.md §3, "Ownership & lifecycle").
    async fn delete_collection(&self, collection: &str) -> Result<()>;
}

/// In-memory, linear-scan vector store. No false negatives, deterministic
/// tie-breaking by symbol name — suitable for tests and small deployments,
/// and the default when no external vector database is configured.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: DashMap<String, DashMap<String, Vec<f64>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, collection: &str, name: &str, vector: &[f64]) -> Result<()> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(name.to_string(), vector.to_vec());
        Ok(())
    }

    async fn ann_search(&self, collection: &str, query: &[f64], k: usize) -> Result<Vec<NeighbourHit>> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut scored: Vec<NeighbourHit> = coll
            .iter()
            .map(|entry| NeighbourHit {
                name: entry.key().clone(),
                score: Self::cosine_similarity(query, entry.value()) as f32,
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.name.cmp(&b.name)));
        scored.truncate(k);
        Ok(scored)
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.collections.remove(collection);
        Ok(())
    }
}

/// Qdrant-backed vector store, grounded on the teacher's
/// `cortex-semantic::qdrant::QdrantVectorStore`. Connections are pooled and
/// shared process-wide (spec.md §5) via the `Arc<Qdrant>` client handle.
pub struct QdrantVectorStore {
    client: Arc<Qdrant>,
    dimension: u64,
}

impl QdrantVectorStore {
    pub async fn connect(url: &str, dimension: u64) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| KatoError::vector_store_unavailable(e.to_string()))?;
        info!(url, "connected to qdrant vector store");
        Ok(Self {
            client: Arc::new(client),
            dimension,
        })
    }

    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        let exists = self
            .client
            .collection_info(collection)
            .await
            .is_ok();
        if exists {
            return Ok(());
        }
        debug!(collection, "creating qdrant collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(self.dimension, Distance::Cosine)),
            )
            .await
            .map_err(|e| KatoError::vector_store_unavailable(e.to_string()))?;
        Ok(())
    }

    fn point_id(name: &str) -> String {
        // Qdrant point ids must be UUID or unsigned integer; store the
        // symbol name itself in the payload and hash it into a UUIDv5 for
        // the id field.
        uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, collection: &str, name: &str, vector: &[f64]) -> Result<()> {
        self.ensure_collection(collection).await?;
        let vector_f32: Vec<f32> = vector.iter().map(|v| *v as f32).collect();
        let point = PointStruct::new(
            Self::point_id(name),
            vector_f32,
            [("name".to_string(), name.into())],
        );
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![point]))
            .await
            .map_err(|e| KatoError::vector_store_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn ann_search(&self, collection: &str, query: &[f64], k: usize) -> Result<Vec<NeighbourHit>> {
        let query_f32: Vec<f32> = query.iter().map(|v| *v as f32).collect();
        let response = self
            .client
            .search_points(SearchPointsBuilder::new(collection, query_f32, k as u64).with_payload(true))
            .await
            .map_err(|e| KatoError::vector_store_unavailable(e.to_string()))?;
        let hits = response
            .result
            .into_iter()
            .filter_map(|p| {
                let name = p.payload.get("name")?.as_str()?.to_string();
                Some(NeighbourHit { name, score: p.score })
            })
            .collect();
        Ok(hits)
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        match self.client.delete_collection(collection).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(collection, error = %e, "failed to delete qdrant collection");
                Err(KatoError::vector_store_unavailable(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_finds_nearest_neighbours() {
        let store = InMemoryVectorStore::new();
        store.upsert("c1", "a", &[1.0, 0.0]).await.unwrap();
        store.upsert("c1", "b", &[0.0, 1.0]).await.unwrap();
        store.upsert("c1", "c", &[0.9, 0.1]).await.unwrap();

        let hits = store.ann_search("c1", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "a");
    }

    #[tokio::test]
    async fn ann_search_on_unknown_collection_is_empty() {
        let store = InMemoryVectorStore::new();
        let hits = store.ann_search("missing", &[1.0], 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn delete_collection_clears_entries() {
        let store = InMemoryVectorStore::new();
        store.upsert("c1", "a", &[1.0]).await.unwrap();
        store.delete_collection("c1").await.unwrap();
        let hits = store.ann_search("c1", &[1.0], 1).await.unwrap();
        assert!(hits.is_empty());
    }
}
