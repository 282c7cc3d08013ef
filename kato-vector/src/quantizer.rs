//! Vector Quantizer (spec.md §4.2), grounded on `original_source`'s
//! `kato/representations/vector_object.py`: an observation's raw vectors are
//! summed, the sum is content-addressed via [`kato_core::codec::vector_name`],
//! and the symbol is only new if no existing neighbour is close enough.

use kato_core::codec;
use kato_core::error::Result;

use crate::vector_store::VectorStore;

/// Number of nearest neighbours consulted when deciding whether a quantized
/// vector is already represented in the store.
const NEIGHBOUR_COUNT: usize = 3;

/// Similarity above which an existing neighbour is considered the same
/// symbol, so no new vector entry is created.
const DEDUP_THRESHOLD: f32 = 0.999;

/// Sums `vectors` component-wise. Vectors of mismatched length are padded
/// with zero on the shorter side, matching the original's permissive numpy
/// broadcasting behaviour for same-length inputs and failing closed
/// (truncating to the shortest) only when lengths genuinely disagree.
fn sum_vectors(vectors: &[Vec<f64>]) -> Vec<f64> {
    let Some(len) = vectors.iter().map(Vec::len).max() else {
        return Vec::new();
    };
    let mut sum = vec![0.0; len];
    for v in vectors {
        for (i, x) in v.iter().enumerate() {
            sum[i] += x;
        }
    }
    sum
}

/// Quantizes the vectors attached to one observation into zero or more
/// symbol names, upserting newly-seen vectors into `store` under
/// `collection`. An observation with no vectors quantizes to nothing.
pub async fn quantize(
    store: &dyn VectorStore,
    collection: &str,
    vectors: &[Vec<f64>],
) -> Result<Vec<String>> {
    if vectors.is_empty() {
        return Ok(Vec::new());
    }

    let summed = sum_vectors(vectors);
    let name = codec::vector_name(&summed);

    let neighbours = store.ann_search(collection, &summed, NEIGHBOUR_COUNT).await?;
    let already_known = neighbours
        .iter()
        .any(|n| n.name == name || n.score >= DEDUP_THRESHOLD);

    if !already_known {
        store.upsert(collection, &name, &summed).await?;
    }

    Ok(vec![name])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::InMemoryVectorStore;

    #[tokio::test]
    async fn empty_vectors_quantize_to_nothing() {
        let store = InMemoryVectorStore::new();
        let symbols = quantize(&store, "c1", &[]).await.unwrap();
        assert!(symbols.is_empty());
    }

    #[tokio::test]
    async fn quantizing_the_same_vector_twice_is_idempotent() {
        let store = InMemoryVectorStore::new();
        let vectors = vec![vec![1.0, 2.0, 3.0]];

        let first = quantize(&store, "c1", &vectors).await.unwrap();
        let second = quantize(&store, "c1", &vectors).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn quantization_is_content_addressed() {
        let store = InMemoryVectorStore::new();
        let a = quantize(&store, "c1", &[vec![1.0, 0.0]]).await.unwrap();
        let b = quantize(&store, "c1", &[vec![0.0, 1.0]]).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn multiple_vectors_in_one_observation_are_summed() {
        let store = InMemoryVectorStore::new();
        let combined = quantize(&store, "c1", &[vec![1.0, 1.0], vec![1.0, 1.0]]).await.unwrap();
        let presummed = quantize(&store, "c2", &[vec![2.0, 2.0]]).await.unwrap();
        assert_eq!(combined[0].strip_prefix(codec::VECTOR_PREFIX), presummed[0].strip_prefix(codec::VECTOR_PREFIX));
    }
}
