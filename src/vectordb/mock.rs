use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::vectordb::{DocumentChunk, IndexHit, StoredChunk, VectorDbError, VectorIndex};

/// In-memory index with brute-force cosine search and an airline equality filter.
///
/// Records the filter of every search so tests can assert on fallback attempts.
#[derive(Default)]
pub struct MockVectorIndex {
    collections: RwLock<HashMap<String, MockCollection>>,
    searches: Mutex<Vec<Option<String>>>,
    search_calls: AtomicUsize,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct MockCollection {
    vector_size: u64,
    // Insertion order, so `sample` behaves like a scroll from the start.
    chunks: Vec<DocumentChunk>,
}

impl MockVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `collection` and inserts `chunks` synchronously.
    pub fn with_chunks(
        collection: &str,
        vector_size: u64,
        chunks: Vec<DocumentChunk>,
    ) -> Result<Self, VectorDbError> {
        let index = Self::new();
        index.create(collection, vector_size);
        index.insert(collection, chunks)?;
        Ok(index)
    }

    pub fn chunk_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.chunks.len())
    }

    /// Number of `search` calls so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Airline filter of each `search` call, in call order.
    pub fn search_filters(&self) -> Vec<Option<String>> {
        self.searches.lock().clone()
    }

    /// Makes every operation fail as if the server were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), VectorDbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(VectorDbError::ConnectionFailed {
                url: "mock://".to_string(),
                message: "index unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn create(&self, name: &str, vector_size: u64) {
        self.collections
            .write()
            .entry(name.to_string())
            .or_insert(MockCollection {
                vector_size,
                chunks: Vec::new(),
            });
    }

    fn insert(&self, collection: &str, chunks: Vec<DocumentChunk>) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write();
        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for chunk in chunks {
            if chunk.embedding.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: chunk.embedding.len(),
                });
            }

            match coll.chunks.iter().position(|c| c.id == chunk.id) {
                Some(pos) => coll.chunks[pos] = chunk,
                None => coll.chunks.push(chunk),
            }
        }

        Ok(())
    }
}

impl VectorIndex for MockVectorIndex {
    async fn is_ready(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.check_available()?;
        self.create(name, vector_size);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        airline: Option<&str>,
    ) -> Result<Vec<IndexHit>, VectorDbError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches.lock().push(airline.map(str::to_string));
        self.check_available()?;

        let collections = self.collections.read();
        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        if query.len() as u64 != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: query.len(),
            });
        }

        let mut hits: Vec<IndexHit> = coll
            .chunks
            .iter()
            .filter(|c| airline.is_none_or(|a| c.metadata.airline == a))
            .map(|c| {
                IndexHit::from_similarity(
                    StoredChunk::from(c),
                    cosine_similarity(&query, &c.embedding),
                )
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });

        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn upsert_chunks(
        &self,
        collection: &str,
        chunks: Vec<DocumentChunk>,
    ) -> Result<(), VectorDbError> {
        self.check_available()?;
        self.insert(collection, chunks)
    }

    async fn count(&self, collection: &str) -> Result<u64, VectorDbError> {
        self.check_available()?;
        self.chunk_count(collection)
            .map(|n| n as u64)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: collection.to_string(),
            })
    }

    async fn sample(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<StoredChunk>, VectorDbError> {
        self.check_available()?;
        let collections = self.collections.read();
        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        Ok(coll.chunks.iter().take(limit).map(StoredChunk::from).collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
